//! Span tracking for text rewriting.
//!
//! Every editing operation in this module takes a text together with the span
//! sequence describing it, and returns the rewritten text together with a new
//! span sequence mapping each byte of that text back to the original source:
//!
//! ```text
//! original:  "Hello, my name is John Doe."
//!                               ^^^^  replace (18, 22) with "Jane"
//! edited:    "Hello, my name is Jane Doe."
//!
//! spans:     Simple(0, 18) | Composite(4, [18..22]) | Simple(22, 27)
//!            untouched       4 bytes standing in     untouched
//!                            for original 18..22
//! ```
//!
//! A span sequence always covers its text exactly, left to right; adjacent
//! spans are contiguous in the text they describe, not necessarily in the
//! original coordinate space. Edits compose: a [`Composite`](Span::Composite)
//! produced by one edit flows through later edits like any other span.
//!
//! All offsets are byte offsets and must fall on UTF-8 character boundaries.
//! Edits are always explicit, caller-supplied ranges; nothing here compares
//! two texts to infer a patch.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A direct sub-range of the original source text.
///
/// Half-open byte range `[start, end)`. Slicing the original text at this
/// range yields exactly the bytes the span stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl SimpleSpan {
    /// Create a span over `[start, end)` of the original text.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Byte length.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Synthetic text standing in for one or more edited original ranges.
///
/// `length` bytes of the edited text map back to the `replaced` ranges of the
/// original, in original left-to-right order. `replaced` is empty for purely
/// inserted text. The replacement may shrink or grow the text, so `length`
/// need not equal the sum of the `replaced` lengths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeSpan {
    /// Byte length of the synthetic text.
    pub length: usize,
    /// Original ranges the synthetic text stands in for.
    pub replaced: Vec<SimpleSpan>,
}

impl CompositeSpan {
    /// Create a composite span.
    #[must_use]
    pub fn new(length: usize, replaced: Vec<SimpleSpan>) -> Self {
        Self { length, replaced }
    }
}

/// A region of derived text, expressed relative to the original source.
///
/// Either a direct sub-range of the original ([`Simple`](Span::Simple)) or a
/// synthetic region created by an edit ([`Composite`](Span::Composite)).
/// Immutable value type, freely copyable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Span {
    /// Untouched sub-range of the original text.
    Simple(SimpleSpan),
    /// Synthetic region produced by an edit.
    Composite(CompositeSpan),
}

impl Span {
    /// Create a simple span over `[start, end)` of the original text.
    #[must_use]
    pub const fn simple(start: usize, end: usize) -> Self {
        Self::Simple(SimpleSpan::new(start, end))
    }

    /// Create a composite span of `length` bytes replacing `replaced`.
    #[must_use]
    pub fn composite(length: usize, replaced: Vec<SimpleSpan>) -> Self {
        Self::Composite(CompositeSpan::new(length, replaced))
    }

    /// Byte length of the derived text this span describes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Span::Simple(span) => span.len(),
            Span::Composite(span) => span.length,
        }
    }

    /// Check if this span describes no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<SimpleSpan> for Span {
    fn from(span: SimpleSpan) -> Self {
        Span::Simple(span)
    }
}

// =============================================================================
// Editing Operations
// =============================================================================

/// Replace each range of `text` with the corresponding replacement string.
///
/// `ranges` are sorted, non-overlapping `[start, end)` byte ranges into
/// `text`; `replacements` must have the same length as `ranges`. Each
/// substituted region becomes a [`Composite`](Span::Composite) span listing,
/// in order, every original range the consumed region mapped to. A range
/// crossing several input spans yields a single composite.
///
/// # Example
///
/// ```
/// use stemma::{replace, Span};
///
/// let text = "Hello, my name is John Doe.";
/// let spans = vec![Span::simple(0, 27)];
/// let (text, spans) = replace(text, &spans, &[(18, 22), (23, 26)], &["Jane", "Dean"])?;
/// assert_eq!(text, "Hello, my name is Jane Dean.");
/// assert_eq!(spans.len(), 5);
/// # Ok::<(), stemma::Error>(())
/// ```
///
/// # Errors
///
/// Returns a contract-violation error if the counts differ, the ranges are
/// unsorted, overlapping, out of bounds or off a char boundary, or `spans`
/// does not cover `text`.
pub fn replace<S: AsRef<str>>(
    text: &str,
    spans: &[Span],
    ranges: &[(usize, usize)],
    replacements: &[S],
) -> Result<(String, Vec<Span>)> {
    if ranges.len() != replacements.len() {
        return Err(Error::invalid_range(format!(
            "got {} ranges but {} replacement strings",
            ranges.len(),
            replacements.len()
        )));
    }
    check_coverage(text, spans)?;
    check_ranges(text, ranges)?;

    let mut new_text = String::with_capacity(text.len());
    let mut cursor = 0;
    for (&(start, end), replacement) in ranges.iter().zip(replacements) {
        new_text.push_str(&text[cursor..start]);
        new_text.push_str(replacement.as_ref());
        cursor = end;
    }
    new_text.push_str(&text[cursor..]);

    let lengths: Vec<usize> = replacements.iter().map(|r| r.as_ref().len()).collect();
    let new_spans = replace_in_spans(spans, ranges, &lengths);
    Ok((new_text, new_spans))
}

/// Remove each range of `text`.
///
/// Behaves like [`replace`] with empty replacements, except that spans which
/// become zero-length are dropped entirely instead of being kept as empty
/// composites. Removing a range strictly inside an existing composite splits
/// it into two composites, each referencing the same full `replaced` list
/// (known to be inexact, kept for compatibility with consumers of the
/// existing shape).
///
/// # Errors
///
/// Same contract checks as [`replace`].
pub fn remove(text: &str, spans: &[Span], ranges: &[(usize, usize)]) -> Result<(String, Vec<Span>)> {
    check_coverage(text, spans)?;
    check_ranges(text, ranges)?;

    let mut new_text = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end) in ranges {
        new_text.push_str(&text[cursor..start]);
        cursor = end;
    }
    new_text.push_str(&text[cursor..]);

    Ok((new_text, remove_in_spans(spans, ranges)))
}

/// Extract the concatenated text under each range, with matching spans.
///
/// No edit bookkeeping happens: simple spans are sliced, composites keep
/// their full `replaced` list against the extracted sub-length. Extracting
/// `(0, text.len())` returns the input unchanged.
///
/// # Errors
///
/// Same contract checks as [`replace`].
pub fn extract(
    text: &str,
    spans: &[Span],
    ranges: &[(usize, usize)],
) -> Result<(String, Vec<Span>)> {
    check_coverage(text, spans)?;
    check_ranges(text, ranges)?;

    let mut new_text = String::new();
    for &(start, end) in ranges {
        new_text.push_str(&text[start..end]);
    }

    Ok((new_text, extract_in_spans(spans, ranges)))
}

/// Insert each string at the corresponding byte offset of `text`.
///
/// Offsets are strictly increasing positions in `text` (before any
/// insertion). Each insertion becomes a `Composite` with an empty `replaced`
/// list, placed between the two spans its offset falls between; a span
/// containing the offset splits.
///
/// # Errors
///
/// Returns a contract-violation error if the counts differ, the offsets are
/// not strictly increasing, out of bounds or off a char boundary, or `spans`
/// does not cover `text`.
pub fn insert<S: AsRef<str>>(
    text: &str,
    spans: &[Span],
    offsets: &[usize],
    insertions: &[S],
) -> Result<(String, Vec<Span>)> {
    if offsets.len() != insertions.len() {
        return Err(Error::invalid_range(format!(
            "got {} offsets but {} insertion strings",
            offsets.len(),
            insertions.len()
        )));
    }
    check_coverage(text, spans)?;
    check_offsets(text, offsets)?;

    let mut new_text = String::with_capacity(text.len());
    let mut cursor = 0;
    for (&offset, insertion) in offsets.iter().zip(insertions) {
        new_text.push_str(&text[cursor..offset]);
        new_text.push_str(insertion.as_ref());
        cursor = offset;
    }
    new_text.push_str(&text[cursor..]);

    let lengths: Vec<usize> = insertions.iter().map(|i| i.as_ref().len()).collect();
    Ok((new_text, insert_in_spans(spans, offsets, &lengths)))
}

/// Move the `range` of `text` to `destination`.
///
/// The range is removed and its exact text reinserted with its exact spans,
/// unchanged; no composite wrapping happens since no characters are altered.
/// A destination at or past the end of the range is first shifted down by the
/// range length, so it addresses the text as it reads after removal; a
/// destination before the range start is used as-is, landing the block before
/// the shifted remainder. The destination must not fall inside the moved
/// range.
///
/// (`move` is a keyword, hence the name.)
///
/// # Errors
///
/// Same contract checks as [`replace`], plus a contract violation when the
/// destination is out of bounds, off a char boundary, or inside the range.
pub fn move_range(
    text: &str,
    spans: &[Span],
    range: (usize, usize),
    destination: usize,
) -> Result<(String, Vec<Span>)> {
    check_coverage(text, spans)?;
    check_ranges(text, &[range])?;
    let (start, end) = range;
    if destination > text.len() || !text.is_char_boundary(destination) {
        return Err(Error::invalid_range(format!(
            "destination {destination} does not fall on a char boundary of the text"
        )));
    }
    if destination > start && destination < end {
        return Err(Error::invalid_range(format!(
            "destination {destination} falls inside the moved range ({start}, {end})"
        )));
    }

    let block = &text[start..end];
    let landing = if destination >= end {
        destination - (end - start)
    } else {
        destination
    };

    let mut remaining = String::with_capacity(text.len() - block.len());
    remaining.push_str(&text[..start]);
    remaining.push_str(&text[end..]);

    let mut new_text = String::with_capacity(text.len());
    new_text.push_str(&remaining[..landing]);
    new_text.push_str(block);
    new_text.push_str(&remaining[landing..]);

    Ok((new_text, move_in_spans(spans, range, destination)))
}

/// Concatenate several `(text, spans)` pairs into one.
///
/// # Errors
///
/// Returns a contract-violation error if the counts differ or any span
/// sequence does not cover its text.
pub fn concatenate<S: AsRef<str>>(
    texts: &[S],
    spans_seqs: &[Vec<Span>],
) -> Result<(String, Vec<Span>)> {
    if texts.len() != spans_seqs.len() {
        return Err(Error::invalid_spans(format!(
            "got {} texts but {} span sequences",
            texts.len(),
            spans_seqs.len()
        )));
    }
    let mut new_text = String::new();
    let mut new_spans = Vec::new();
    for (text, spans) in texts.iter().zip(spans_seqs) {
        check_coverage(text.as_ref(), spans)?;
        new_text.push_str(text.as_ref());
        new_spans.extend(spans.iter().cloned());
    }
    Ok((new_text, new_spans))
}

// =============================================================================
// Projection Back to the Original Text
// =============================================================================

/// Project a span sequence back onto original-text coordinates.
///
/// Composite spans are flattened to their `replaced` ranges (pure insertions
/// vanish) and contiguous ranges are merged. The result addresses the raw
/// source text directly, which is what exporters and auditors need to answer
/// "where did this annotation come from".
#[must_use]
pub fn normalize_spans(spans: &[Span]) -> Vec<SimpleSpan> {
    let mut normalized: Vec<SimpleSpan> = Vec::new();
    for span in spans {
        let parts: &[SimpleSpan] = match span {
            Span::Simple(simple) => std::slice::from_ref(simple),
            Span::Composite(composite) => &composite.replaced,
        };
        for &part in parts {
            match normalized.last_mut() {
                Some(last) if last.end == part.start => last.end = part.end,
                _ => normalized.push(part),
            }
        }
    }
    normalized
}

/// Merge normalized spans separated only by small whitespace gaps.
///
/// `text` is the original source text the spans address. Two consecutive
/// spans are merged when the text between them is at most `max_gap` bytes of
/// whitespace. Useful after [`normalize_spans`] when an annotation was built
/// from text with inter-word separators edited out.
///
/// # Errors
///
/// Returns a contract-violation error if a span does not address `text`.
pub fn bridge_gaps(spans: &[SimpleSpan], text: &str, max_gap: usize) -> Result<Vec<SimpleSpan>> {
    let mut bridged: Vec<SimpleSpan> = Vec::new();
    for &span in spans {
        if span.start > span.end
            || span.end > text.len()
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            return Err(Error::invalid_range(format!(
                "span ({}, {}) does not address the source text",
                span.start, span.end
            )));
        }
        match bridged.last_mut() {
            Some(last) if span.start >= last.end => {
                let gap = &text[last.end..span.start];
                if gap.len() <= max_gap && gap.chars().all(char::is_whitespace) {
                    last.end = span.end;
                } else {
                    bridged.push(span);
                }
            }
            _ => bridged.push(span),
        }
    }
    Ok(bridged)
}

// =============================================================================
// Span Walkers
// =============================================================================

// The walkers below work purely on span sequences, in the coordinate space of
// the text the spans describe. Ranges are assumed validated by the public
// functions. They all reduce to splitting the sequence at byte offsets.

/// Split `spans` at `offset`, slicing the span that crosses it.
///
/// A sliced composite keeps its full `replaced` list on both sides.
fn split_at_offset(spans: Vec<Span>, offset: usize) -> (Vec<Span>, Vec<Span>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0usize;
    for span in spans {
        let len = span.len();
        if pos + len <= offset {
            left.push(span);
        } else if pos >= offset {
            right.push(span);
        } else {
            let cut = offset - pos;
            match span {
                Span::Simple(simple) => {
                    left.push(Span::simple(simple.start, simple.start + cut));
                    right.push(Span::simple(simple.start + cut, simple.end));
                }
                Span::Composite(composite) => {
                    left.push(Span::composite(cut, composite.replaced.clone()));
                    right.push(Span::composite(composite.length - cut, composite.replaced));
                }
            }
        }
        pos += len;
    }
    (left, right)
}

/// Original ranges that a consumed run of spans stands for, in order.
fn replaced_ranges(covered: &[Span]) -> Vec<SimpleSpan> {
    let mut replaced = Vec::new();
    for span in covered {
        match span {
            Span::Simple(simple) => replaced.push(*simple),
            Span::Composite(composite) => replaced.extend(composite.replaced.iter().copied()),
        }
    }
    replaced
}

fn replace_in_spans(
    spans: &[Span],
    ranges: &[(usize, usize)],
    replacement_lengths: &[usize],
) -> Vec<Span> {
    let mut output = Vec::new();
    let mut rest = spans.to_vec();
    let mut consumed = 0usize;
    for (&(start, end), &length) in ranges.iter().zip(replacement_lengths) {
        let (before, tail) = split_at_offset(rest, start - consumed);
        output.extend(before);
        let (covered, tail) = split_at_offset(tail, end - start);
        output.push(Span::composite(length, replaced_ranges(&covered)));
        rest = tail;
        consumed = end;
    }
    output.extend(rest);
    output
}

fn remove_in_spans(spans: &[Span], ranges: &[(usize, usize)]) -> Vec<Span> {
    let mut output = Vec::new();
    let mut rest = spans.to_vec();
    let mut consumed = 0usize;
    for &(start, end) in ranges {
        let (before, tail) = split_at_offset(rest, start - consumed);
        output.extend(before);
        let (_covered, tail) = split_at_offset(tail, end - start);
        rest = tail;
        consumed = end;
    }
    output.extend(rest);
    output
}

fn extract_in_spans(spans: &[Span], ranges: &[(usize, usize)]) -> Vec<Span> {
    let mut output = Vec::new();
    let mut rest = spans.to_vec();
    let mut consumed = 0usize;
    for &(start, end) in ranges {
        let (_before, tail) = split_at_offset(rest, start - consumed);
        let (covered, tail) = split_at_offset(tail, end - start);
        output.extend(covered);
        rest = tail;
        consumed = end;
    }
    output
}

fn insert_in_spans(spans: &[Span], offsets: &[usize], insertion_lengths: &[usize]) -> Vec<Span> {
    let mut output = Vec::new();
    let mut rest = spans.to_vec();
    let mut consumed = 0usize;
    for (&offset, &length) in offsets.iter().zip(insertion_lengths) {
        let (before, tail) = split_at_offset(rest, offset - consumed);
        output.extend(before);
        output.push(Span::composite(length, Vec::new()));
        rest = tail;
        consumed = offset;
    }
    output.extend(rest);
    output
}

fn move_in_spans(spans: &[Span], range: (usize, usize), destination: usize) -> Vec<Span> {
    let moved = extract_in_spans(spans, &[range]);
    let rest = remove_in_spans(spans, &[range]);
    let landing = if destination >= range.1 {
        destination - (range.1 - range.0)
    } else {
        destination
    };
    let (mut output, after) = split_at_offset(rest, landing);
    output.extend(moved);
    output.extend(after);
    output
}

// =============================================================================
// Contract Checks
// =============================================================================

fn total_length(spans: &[Span]) -> usize {
    spans.iter().map(Span::len).sum()
}

fn check_coverage(text: &str, spans: &[Span]) -> Result<()> {
    let total = total_length(spans);
    if total != text.len() {
        return Err(Error::invalid_spans(format!(
            "span sequence covers {total} bytes but the text is {} bytes",
            text.len()
        )));
    }
    Ok(())
}

fn check_ranges(text: &str, ranges: &[(usize, usize)]) -> Result<()> {
    let mut previous_end = 0;
    for (i, &(start, end)) in ranges.iter().enumerate() {
        if start > end {
            return Err(Error::invalid_range(format!(
                "range {i} ({start}, {end}) is reversed"
            )));
        }
        if start < previous_end {
            return Err(Error::invalid_range(format!(
                "range {i} ({start}, {end}) overlaps or is out of order with the previous range"
            )));
        }
        if end > text.len() {
            return Err(Error::invalid_range(format!(
                "range {i} ({start}, {end}) ends past the text ({} bytes)",
                text.len()
            )));
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(Error::invalid_range(format!(
                "range {i} ({start}, {end}) does not fall on char boundaries"
            )));
        }
        previous_end = end;
    }
    Ok(())
}

fn check_offsets(text: &str, offsets: &[usize]) -> Result<()> {
    let mut previous = None;
    for (i, &offset) in offsets.iter().enumerate() {
        if offset > text.len() {
            return Err(Error::invalid_range(format!(
                "offset {i} ({offset}) is past the text ({} bytes)",
                text.len()
            )));
        }
        if !text.is_char_boundary(offset) {
            return Err(Error::invalid_range(format!(
                "offset {i} ({offset}) does not fall on a char boundary"
            )));
        }
        if let Some(previous) = previous {
            if offset <= previous {
                return Err(Error::invalid_range(format!(
                    "offset {i} ({offset}) is not strictly increasing"
                )));
            }
        }
        previous = Some(offset);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

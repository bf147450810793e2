//! Property-based tests for span algebra invariants.
//!
//! The big one: whatever an edit does, the output span sequence always
//! covers the output text exactly, and untouched simple spans keep
//! addressing the original source byte-for-byte.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use stemma::{
    extract, insert, move_range, normalize_spans, remove, replace, SimpleSpan, Span,
};

fn covered_length(spans: &[Span]) -> usize {
    spans.iter().map(Span::len).sum()
}

/// ASCII text plus a non-empty range into it.
fn text_and_range() -> impl Strategy<Value = (String, usize, usize)> {
    "[a-z ]{2,60}".prop_flat_map(|text| {
        let len = text.len();
        (Just(text), 0..len).prop_flat_map(move |(text, start)| {
            ((start + 1)..=len).prop_map(move |end| (text.clone(), start, end))
        })
    })
}

/// ASCII text plus a range and a destination outside of it.
fn text_range_and_destination() -> impl Strategy<Value = (String, usize, usize, usize)> {
    text_and_range().prop_flat_map(|(text, start, end)| {
        let len = text.len();
        prop_oneof![0..=start, end..=len]
            .prop_map(move |destination| (text.clone(), start, end, destination))
    })
}

/// ASCII text plus an offset into it.
fn text_and_offset() -> impl Strategy<Value = (String, usize)> {
    "[a-z ]{1,60}".prop_flat_map(|text| {
        let len = text.len();
        (Just(text), 0..=len)
    })
}

/// Every simple span in `spans` must address the source text exactly.
fn assert_simple_spans_faithful(
    source: &str,
    derived: &str,
    spans: &[Span],
) -> std::result::Result<(), TestCaseError> {
    let mut pos = 0;
    for span in spans {
        if let Span::Simple(simple) = span {
            prop_assert_eq!(
                &derived[pos..pos + simple.len()],
                &source[simple.start..simple.end]
            );
        }
        pos += span.len();
    }
    Ok(())
}

proptest! {
    #[test]
    fn replace_keeps_spans_in_sync(
        (text, start, end) in text_and_range(),
        replacement in "[a-z]{0,12}",
    ) {
        let spans = vec![Span::simple(0, text.len())];
        let (out, out_spans) =
            replace(&text, &spans, &[(start, end)], &[replacement.as_str()]).unwrap();
        prop_assert_eq!(covered_length(&out_spans), out.len());
        assert_simple_spans_faithful(&text, &out, &out_spans)?;
    }

    #[test]
    fn remove_keeps_spans_in_sync((text, start, end) in text_and_range()) {
        let spans = vec![Span::simple(0, text.len())];
        let (out, out_spans) = remove(&text, &spans, &[(start, end)]).unwrap();
        prop_assert_eq!(covered_length(&out_spans), out.len());
        assert_simple_spans_faithful(&text, &out, &out_spans)?;
        // removal never leaves empty placeholders behind
        prop_assert!(out_spans.iter().all(|span| !span.is_empty()));
    }

    #[test]
    fn insert_keeps_spans_in_sync(
        (text, offset) in text_and_offset(),
        insertion in "[a-z]{1,12}",
    ) {
        let spans = vec![Span::simple(0, text.len())];
        let (out, out_spans) =
            insert(&text, &spans, &[offset], &[insertion.as_str()]).unwrap();
        prop_assert_eq!(covered_length(&out_spans), out.len());
        assert_simple_spans_faithful(&text, &out, &out_spans)?;
    }

    #[test]
    fn extract_of_everything_is_identity(text in "[a-z ]{1,60}") {
        let spans = vec![Span::simple(0, text.len())];
        let (out, out_spans) = extract(&text, &spans, &[(0, text.len())]).unwrap();
        prop_assert_eq!(out, text);
        prop_assert_eq!(out_spans, spans);
    }

    #[test]
    fn extract_keeps_spans_in_sync((text, start, end) in text_and_range()) {
        let spans = vec![Span::simple(0, text.len())];
        let (out, out_spans) = extract(&text, &spans, &[(start, end)]).unwrap();
        prop_assert_eq!(covered_length(&out_spans), out.len());
        prop_assert_eq!(&out, &text[start..end]);
        assert_simple_spans_faithful(&text, &out, &out_spans)?;
    }

    #[test]
    fn move_round_trips((text, start, end, destination) in text_range_and_destination()) {
        let spans = vec![Span::simple(0, text.len())];
        let (moved_text, moved_spans) =
            move_range(&text, &spans, (start, end), destination).unwrap();
        prop_assert_eq!(covered_length(&moved_spans), moved_text.len());
        assert_simple_spans_faithful(&text, &moved_text, &moved_spans)?;

        // moving the block back restores the text and, once projected onto
        // the original coordinates, an equivalent span sequence
        let length = end - start;
        let (back_text, back_spans) = if destination >= end {
            move_range(
                &moved_text,
                &moved_spans,
                (destination - length, destination),
                start,
            )
            .unwrap()
        } else {
            move_range(
                &moved_text,
                &moved_spans,
                (destination, destination + length),
                end,
            )
            .unwrap()
        };
        prop_assert_eq!(back_text, text);
        prop_assert_eq!(normalize_spans(&back_spans), normalize_spans(&spans));
    }

    #[test]
    fn insertion_vanishes_under_normalization(
        (text, offset) in text_and_offset(),
        insertion in "[a-z]{1,12}",
    ) {
        let spans = vec![Span::simple(0, text.len())];
        let (_, out_spans) = insert(&text, &spans, &[offset], &[insertion.as_str()]).unwrap();
        prop_assert_eq!(
            normalize_spans(&out_spans),
            vec![SimpleSpan::new(0, text.len())]
        );
    }

    #[test]
    fn replace_projects_back_to_the_consumed_range(
        (text, start, end) in text_and_range(),
        replacement in "[a-z]{0,12}",
    ) {
        let spans = vec![Span::simple(0, text.len())];
        let (_, out_spans) =
            replace(&text, &spans, &[(start, end)], &[replacement.as_str()]).unwrap();
        // edits neither lose nor invent source coordinates
        prop_assert_eq!(
            normalize_spans(&out_spans),
            vec![SimpleSpan::new(0, text.len())]
        );
    }
}

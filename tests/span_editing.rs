//! Editing operations over `(text, spans)` pairs, through the public API.

use stemma::{
    bridge_gaps, concatenate, extract, insert, move_range, normalize_spans, remove, replace,
    Error, SimpleSpan, Span,
};

const TEXT: &str = "Hello, my name is John Doe.";

fn simple(start: usize, end: usize) -> Span {
    Span::simple(start, end)
}

fn composite(length: usize, replaced: &[(usize, usize)]) -> Span {
    Span::composite(
        length,
        replaced.iter().map(|&(s, e)| SimpleSpan::new(s, e)).collect(),
    )
}

fn full_span() -> Vec<Span> {
    vec![simple(0, TEXT.len())]
}

#[test]
fn replace_both_names() {
    let (text, spans) =
        replace(TEXT, &full_span(), &[(18, 22), (23, 26)], &["Jane", "Dean"]).unwrap();
    assert_eq!(text, "Hello, my name is Jane Dean.");
    assert_eq!(
        spans,
        vec![
            simple(0, 18),
            composite(4, &[(18, 22)]),
            simple(22, 23),
            composite(4, &[(23, 26)]),
            simple(26, 27),
        ]
    );
}

#[test]
fn remove_greeting_and_family_name() {
    let (text, spans) = remove(TEXT, &full_span(), &[(0, 7), (22, 27)]).unwrap();
    assert_eq!(text, "my name is John");
    assert_eq!(spans, vec![simple(7, 22)]);
}

#[test]
fn extract_greeting_and_first_name() {
    let (text, spans) = extract(TEXT, &full_span(), &[(0, 7), (18, 22)]).unwrap();
    assert_eq!(text, "Hello, John");
    assert_eq!(spans, vec![simple(0, 7), simple(18, 22)]);
}

#[test]
fn extract_everything_is_identity() {
    let (text, spans) = extract(TEXT, &full_span(), &[(0, TEXT.len())]).unwrap();
    assert_eq!(text, TEXT);
    assert_eq!(spans, full_span());
}

#[test]
fn insert_into_greeting() {
    let (text, spans) = insert(TEXT, &full_span(), &[5], &[" everybody"]).unwrap();
    assert_eq!(text, "Hello everybody, my name is John Doe.");
    assert_eq!(
        spans,
        vec![simple(0, 5), composite(10, &[]), simple(5, 27)]
    );
}

#[test]
fn move_first_name_before() {
    let (text, spans) = move_range(TEXT, &full_span(), (17, 22), 5).unwrap();
    assert_eq!(text, "Hello John, my name is Doe.");
    assert_eq!(
        spans,
        vec![simple(0, 5), simple(17, 22), simple(5, 17), simple(22, 27)]
    );
}

#[test]
fn move_first_name_after() {
    let (text, spans) = move_range(TEXT, &full_span(), (17, 22), 26).unwrap();
    assert_eq!(text, "Hello, my name is Doe John.");
    assert_eq!(
        spans,
        vec![simple(0, 17), simple(22, 26), simple(17, 22), simple(26, 27)]
    );
}

#[test]
fn edits_compose_across_composites() {
    // redact, then edit across the synthetic region
    let (text, spans) = replace(TEXT, &full_span(), &[(18, 26)], &["[NAME]"]).unwrap();
    assert_eq!(text, "Hello, my name is [NAME].");

    let (text, spans) = remove(&text, &spans, &[(0, 7)]).unwrap();
    assert_eq!(text, "my name is [NAME].");
    assert_eq!(
        spans,
        vec![simple(7, 18), composite(6, &[(18, 26)]), simple(26, 27)]
    );

    // a replacement crossing simple and composite spans folds both into one
    let (text, spans) = replace(&text, &spans, &[(3, 17)], &["?"]).unwrap();
    assert_eq!(text, "my ?.");
    assert_eq!(
        spans,
        vec![
            simple(7, 10),
            composite(1, &[(10, 18), (18, 26)]),
            simple(26, 27),
        ]
    );
}

#[test]
fn multibyte_text_uses_byte_offsets() {
    let text = "Prix: 50\u{20ac}, env.";
    let spans = vec![simple(0, text.len())];
    // "50€" is bytes 6..11 (the euro sign is 3 bytes)
    let (out, out_spans) = replace(text, &spans, &[(6, 11)], &["cinquante euros"]).unwrap();
    assert_eq!(out, "Prix: cinquante euros, env.");
    assert_eq!(
        out_spans,
        vec![simple(0, 6), composite(15, &[(6, 11)]), simple(11, text.len())]
    );
}

#[test]
fn rejects_range_off_char_boundary() {
    let text = "caf\u{e9} noir";
    let spans = vec![simple(0, text.len())];
    // byte 4 is inside the two-byte "é"
    let err = remove(text, &spans, &[(0, 4)]).unwrap_err();
    assert!(matches!(err, Error::InvalidRange(_)));
}

#[test]
fn rejects_unsorted_or_overlapping_ranges() {
    let spans = full_span();
    assert!(matches!(
        replace(TEXT, &spans, &[(10, 12), (5, 7)], &["a", "b"]),
        Err(Error::InvalidRange(_))
    ));
    assert!(matches!(
        remove(TEXT, &spans, &[(5, 10), (8, 12)]),
        Err(Error::InvalidRange(_))
    ));
}

#[test]
fn rejects_count_mismatch() {
    assert!(matches!(
        replace(TEXT, &full_span(), &[(0, 5)], &["a", "b"]),
        Err(Error::InvalidRange(_))
    ));
    assert!(matches!(
        insert(TEXT, &full_span(), &[5, 10], &["x"]),
        Err(Error::InvalidRange(_))
    ));
}

#[test]
fn rejects_spans_not_covering_text() {
    let short = vec![simple(0, 5)];
    assert!(matches!(
        replace(TEXT, &short, &[(0, 5)], &["x"]),
        Err(Error::InvalidSpans(_))
    ));
}

#[test]
fn rejects_destination_inside_moved_range() {
    assert!(matches!(
        move_range(TEXT, &full_span(), (10, 20), 15),
        Err(Error::InvalidRange(_))
    ));
}

#[test]
fn concatenate_joins_texts_and_spans() {
    let (text, spans) = concatenate(
        &["John Doe", " is here"],
        &[vec![simple(18, 26)], vec![composite(8, &[])]],
    )
    .unwrap();
    assert_eq!(text, "John Doe is here");
    assert_eq!(spans, vec![simple(18, 26), composite(8, &[])]);
}

#[test]
fn concatenate_rejects_mismatched_pair() {
    assert!(matches!(
        concatenate(&["abc"], &[vec![simple(0, 2)]]),
        Err(Error::InvalidSpans(_))
    ));
}

#[test]
fn normalization_recovers_original_offsets() {
    let (text, spans) = replace(TEXT, &full_span(), &[(18, 22), (23, 26)], &["Jane", "Dean"]).unwrap();
    let (_, spans) = insert(&text, &spans, &[5], &[" there"]).unwrap();
    // insertions vanish, edits resolve to what they replaced, and the
    // contiguous pieces merge back into the full original range
    assert_eq!(normalize_spans(&spans), vec![SimpleSpan::new(0, 27)]);
}

#[test]
fn bridge_gaps_merges_small_whitespace_gaps() {
    // normalized spans of an annotation built from "John" + "Doe"
    let spans = vec![SimpleSpan::new(18, 22), SimpleSpan::new(23, 26)];
    let bridged = bridge_gaps(&spans, TEXT, 3).unwrap();
    assert_eq!(bridged, vec![SimpleSpan::new(18, 26)]);

    // a gap with visible text in it is never bridged
    let spans = vec![SimpleSpan::new(0, 5), SimpleSpan::new(7, 9)];
    let bridged = bridge_gaps(&spans, TEXT, 3).unwrap();
    assert_eq!(bridged, spans);
}

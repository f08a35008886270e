use super::*;

#[test]
fn offsets_follow_source_order() {
    let offsets: Vec<u64> = parse("[1, 2,  3]").iter().map(|s| s.offset()).collect();
    assert_eq!(offsets, vec![0, 1, 4, 8, 9]);
}

#[test]
fn crlf_counts_as_one_line() {
    let err = parse_err("{\"a\":1\r\n,,}", &Settings::default());
    // The duplicate comma sits on line 2 after one CRLF.
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 2);
}

#[test]
fn lf_and_cr_each_advance_a_line() {
    let err = parse_err("1\n\n\nx", &Settings::default());
    assert_eq!(err.position.line, 4);
    let err = parse_err("1\r\r\rx", &Settings::default());
    assert_eq!(err.position.line, 4);
}

#[test]
fn multibyte_character_advances_column_once() {
    // The 4-byte emoji occupies one column; the error on `;` lands right
    // after it.
    let err = parse_err("\"\u{1F600}\";", &Settings::default());
    assert_eq!(err.position.column, 4);
    assert_eq!(err.position.offset, 6);
}

#[test]
fn error_position_points_at_offending_byte() {
    let err = parse_err("{\"a\" 1}", &Settings::default());
    assert!(matches!(
        err.kind,
        AjisErrorKind::UnexpectedToken {
            found: TokenKind::Number,
            ..
        }
    ));
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 6);
}

#[test]
fn token_positions_are_pre_consumption() {
    let segs = parse("\n\n  [true]");
    assert_eq!(segs[0].offset(), 4);
    assert_eq!(segs[1].offset(), 5);
}

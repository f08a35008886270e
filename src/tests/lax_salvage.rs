use super::*;

#[test]
fn missing_closers_are_synthesized() {
    let segs = parse_with("[1, [2, {\"a\": 3", &Settings::lax());
    check_invariants(&segs);
    let exits = segs
        .iter()
        .filter(|s| matches!(s, Segment::ExitContainer { .. }))
        .count();
    assert_eq!(exits, 3);
    // All synthesized exits sit at the end-of-input offset.
    assert!(segs.iter().rev().take(3).all(|s| s.offset() == 15));
}

#[test]
fn dangling_member_gets_a_null() {
    let segs = parse_with("{\"a\":", &Settings::lax());
    check_invariants(&segs);
    assert_eq!(
        segs[2],
        Segment::Value {
            kind: ValueKind::Null,
            value: None,
            offset: 5,
            depth: 1,
        }
    );

    let segs = parse_with("{\"a\"", &Settings::lax());
    check_invariants(&segs);
    assert!(matches!(
        segs[2],
        Segment::Value {
            kind: ValueKind::Null,
            ..
        }
    ));
}

#[test]
fn unterminated_block_comment_salvaged() {
    let segs = parse_with("[1, 2 /* trailing", &Settings::lax());
    check_invariants(&segs);
    assert_eq!(
        segs.iter()
            .filter(|s| matches!(s, Segment::Value { .. }))
            .count(),
        2
    );
}

#[test]
fn unterminated_string_salvaged_inside_object() {
    let segs = parse_with("{\"msg\": \"hello wor", &Settings::lax());
    check_invariants(&segs);
    assert!(matches!(
        &segs[2],
        Segment::Value { kind: ValueKind::String, value: Some(v), .. }
            if v.as_str() == "hello wor"
    ));
}

#[test]
fn outside_lax_these_are_hard_errors() {
    let err = parse_err("[1, [2", &Settings::default());
    assert_eq!(err.kind, AjisErrorKind::UnexpectedEndOfInput);

    let err = parse_err("[1 /* trailing", &Settings::default());
    assert_eq!(err.kind, AjisErrorKind::UnterminatedBlockComment);
}

#[test]
fn limits_stay_hard_in_lax() {
    let mut settings = Settings::lax();
    settings.max_depth = 2;
    let err = parse_err("[[[1]]]", &settings);
    assert_eq!(err.kind, AjisErrorKind::MaxDepthExceeded { limit: 2 });

    let mut settings = Settings::lax();
    settings.numbers.max_token_bytes = Some(4);
    let err = parse_err("123456", &settings);
    assert_eq!(err.kind, AjisErrorKind::MaxTokenBytesExceeded { limit: 4 });
}

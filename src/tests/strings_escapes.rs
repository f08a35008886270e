use super::*;

fn string_value(input: &str, settings: &Settings) -> Slice {
    let segs = parse_with(input, settings);
    match &segs[0] {
        Segment::Value {
            kind: ValueKind::String,
            value: Some(v),
            ..
        } => v.clone(),
        other => panic!("expected string value, got {other:?}"),
    }
}

#[test]
fn escape_alphabet_decodes() {
    let v = string_value(
        "\"q\\\" s\\\\ sol\\/ b\\b f\\f n\\n r\\r t\\t\"",
        &Settings::default(),
    );
    assert_eq!(v.as_str(), "q\" s\\ sol/ b\u{8} f\u{c} n\n r\r t\t");
    assert!(v.flags.contains(SliceFlags::HAS_ESCAPES));
}

#[test]
fn surrogate_pair_decodes_to_one_scalar() {
    let v = string_value("\"\\uD83D\\uDE00\"", &Settings::default());
    assert_eq!(v.as_str(), "\u{1F600}");
    assert!(v.flags.contains(SliceFlags::HAS_NON_ASCII));
}

#[test]
fn lone_surrogate_is_an_error_outside_lax() {
    let err = parse_err("\"\\uD83D\"", &Settings::default());
    assert_eq!(err.kind, AjisErrorKind::InvalidEscapeSequence);

    let v = string_value("\"\\uD83D\"", &Settings::lax());
    assert_eq!(v.as_str(), "\u{FFFD}");
}

#[test]
fn short_unicode_escape() {
    let err = parse_err("\"\\u00G1\"", &Settings::default());
    assert_eq!(err.kind, AjisErrorKind::InvalidEscapeSequence);

    // Lax keeps a literal `u` and the following text.
    let v = string_value("\"\\u00G1\"", &Settings::lax());
    assert_eq!(v.as_str(), "u00G1");
}

#[test]
fn unknown_escape_rejected_outside_lax() {
    let err = parse_err("\"\\q\"", &Settings::default());
    assert_eq!(err.kind, AjisErrorKind::InvalidEscapeSequence);

    let v = string_value("\"\\q\"", &Settings::lax());
    assert_eq!(v.as_str(), "q");
}

#[test]
fn escapes_pass_through_when_decoding_disabled() {
    let mut settings = Settings::default();
    settings.strings.enable_escapes = false;
    let v = string_value("\"a\\nb\"", &settings);
    assert_eq!(v.as_str(), "a\\nb");
    assert!(v.flags.contains(SliceFlags::HAS_ESCAPES));
}

#[test]
fn single_quotes_per_mode() {
    let v = string_value("'hi'", &Settings::default());
    assert_eq!(v.as_str(), "hi");

    let mut settings = Settings::default();
    settings.strings.allow_single_quotes = false;
    let err = parse_err("'hi'", &settings);
    assert_eq!(err.kind, AjisErrorKind::UnexpectedCharacter('\''));

    let err = parse_err("'hi'", &Settings::json());
    assert_eq!(err.kind, AjisErrorKind::UnexpectedCharacter('\''));

    // A double quote inside a single-quoted string is plain content.
    let v = string_value("'say \"hi\"'", &Settings::default());
    assert_eq!(v.as_str(), "say \"hi\"");
}

#[test]
fn multiline_strings_per_mode() {
    let v = string_value("\"line1\nline2\"", &Settings::default());
    assert_eq!(v.as_str(), "line1\nline2");

    let err = parse_err("\"line1\nline2\"", &Settings::json());
    assert_eq!(err.kind, AjisErrorKind::ControlCharacterInString);

    let mut settings = Settings::default();
    settings.strings.allow_multiline = false;
    let err = parse_err("\"a\tb\"", &settings);
    assert_eq!(err.kind, AjisErrorKind::ControlCharacterInString);
}

#[test]
fn unterminated_string_salvaged_only_in_lax() {
    let err = parse_err("\"abc", &Settings::default());
    assert_eq!(err.kind, AjisErrorKind::UnterminatedString);
    assert_eq!(err.position.offset, 0);

    let segs = parse_with("\"abc", &Settings::lax());
    assert!(matches!(
        &segs[0],
        Segment::Value { kind: ValueKind::String, value: Some(v), .. } if v.as_str() == "abc"
    ));
}

#[test]
fn non_ascii_flag_on_raw_and_escaped_content() {
    let v = string_value("\"héllo\"", &Settings::default());
    assert!(v.flags.contains(SliceFlags::HAS_NON_ASCII));
    assert!(!v.flags.contains(SliceFlags::HAS_ESCAPES));

    let v = string_value("\"\\u00e9\"", &Settings::default());
    assert_eq!(v.as_str(), "é");
    assert!(v.flags.contains(SliceFlags::HAS_NON_ASCII));
}

#[test]
fn preserved_escapes_keep_raw_bytes() {
    let mut settings = Settings::default();
    settings.preserve_string_escapes = true;
    let v = string_value("\"a\\nb\\\"c\"", &settings);
    assert_eq!(v.as_str(), "a\\nb\\\"c");
    assert!(v.flags.contains(SliceFlags::HAS_ESCAPES));
}

#[test]
fn json_mode_always_decodes() {
    let mut settings = Settings::json();
    settings.preserve_string_escapes = true;
    let v = string_value("\"a\\nb\"", &settings);
    assert_eq!(v.as_str(), "a\nb");
}

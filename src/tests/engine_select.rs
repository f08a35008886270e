use super::*;
use crate::engine::{EngineKind, InputDescriptor, InputKind, parse_chunk_threshold, select_engine};

const THRESHOLD: u64 = 64 * 1024;

fn span_input() -> InputDescriptor {
    InputDescriptor {
        kind: InputKind::Span,
        len: Some(1024),
        random_access: true,
    }
}

fn pipe_input() -> InputDescriptor {
    InputDescriptor {
        kind: InputKind::Stream,
        len: None,
        random_access: false,
    }
}

fn big_file_input() -> InputDescriptor {
    InputDescriptor {
        kind: InputKind::Stream,
        len: Some(512 * 1024 * 1024),
        random_access: true,
    }
}

#[test]
fn span_inputs_always_use_the_span_engine() {
    for profile in [
        ParserProfile::Universal,
        ParserProfile::LowMemory,
        ParserProfile::HighThroughput,
    ] {
        assert_eq!(
            select_engine(profile, &span_input(), THRESHOLD),
            EngineKind::Span
        );
    }
}

#[test]
fn forward_only_streams_never_get_the_seeking_engine() {
    for profile in [
        ParserProfile::Universal,
        ParserProfile::LowMemory,
        ParserProfile::HighThroughput,
    ] {
        assert_eq!(
            select_engine(profile, &pipe_input(), THRESHOLD),
            EngineKind::BufferedStream
        );
    }
}

#[test]
fn low_memory_prefers_chunked_files() {
    assert_eq!(
        select_engine(ParserProfile::LowMemory, &big_file_input(), THRESHOLD),
        EngineKind::ChunkedFile
    );
    assert_eq!(
        select_engine(ParserProfile::Universal, &big_file_input(), THRESHOLD),
        EngineKind::BufferedStream
    );
    assert_eq!(
        select_engine(ParserProfile::HighThroughput, &big_file_input(), THRESHOLD),
        EngineKind::BufferedStream
    );
}

#[test]
fn small_files_collapse_to_span() {
    let small = InputDescriptor {
        kind: InputKind::Stream,
        len: Some(4 * 1024),
        random_access: true,
    };
    assert_eq!(
        select_engine(ParserProfile::Universal, &small, THRESHOLD),
        EngineKind::Span
    );
}

#[test]
fn threshold_suffixes_are_powers_of_1024() {
    assert_eq!(parse_chunk_threshold("64k").unwrap(), 64 * 1024);
    assert_eq!(parse_chunk_threshold("2M").unwrap(), 2 * 1024 * 1024);
    assert_eq!(parse_chunk_threshold("1G").unwrap(), 1024 * 1024 * 1024);
    assert_eq!(parse_chunk_threshold("512").unwrap(), 512);
    assert_eq!(parse_chunk_threshold(" 8k ").unwrap(), 8 * 1024);
}

#[test]
fn unknown_threshold_suffix_fails_fast() {
    for bad in ["64q", "64kb", "", "k", "-1k"] {
        let err = parse_chunk_threshold(bad).unwrap_err();
        assert!(matches!(err.kind, AjisErrorKind::InputNotSupported(_)));
    }
}

#[test]
fn threshold_errors_surface_through_parse_entry_points() {
    let mut settings = Settings::default();
    settings.stream_chunk_threshold = "64q".to_string();
    let err = parse_segments_from_reader(&b"[1]"[..], &settings).unwrap_err();
    assert!(matches!(err.kind, AjisErrorKind::InputNotSupported(_)));
}

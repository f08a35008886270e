//! Streaming AJIS parser core.
//!
//! AJIS is a JSON superset: comments, directives, trailing commas, unquoted
//! identifier keys, single-quoted and multiline strings, base-prefixed and
//! underscore-separated numbers, typed literals (`T1707489221`), `NaN` and
//! `Infinity`, and a leading `+`. Three modes select strictness: `Json`
//! (RFC-8259 strict), `Ajis` (configurable defaults), and `Lax`
//! (JavaScript-tolerant with salvage).
//!
//! The core emits a flat, causally ordered stream of [`Segment`]s instead of
//! a DOM, and ships a transform algebra over that stream (rename, drop,
//! filter, replace, select, directive binding) in [`transform`].

mod directive;
pub mod emit;
pub mod engine;
pub mod error;
pub mod events;
mod lexer;
pub mod options;
mod parser;
mod position;
mod reader;
mod segment;
#[cfg(feature = "async")]
pub mod stream;
pub mod transform;

pub use directive::{Directive, DirectiveArg};
pub use error::{AjisError, AjisErrorKind};
pub use events::{EventSink, ParseEvent, Phase, TextProvider};
pub use lexer::{Token, TokenKind};
pub use options::{
    CommentOptions, EffectiveSettings, NumberOptions, ParserProfile, Settings, StringOptions,
    TextMode,
};
pub use position::TextPosition;
pub use segment::{ContainerKind, Segment, Slice, SliceFlags, ValueKind};
#[cfg(feature = "async")]
pub use stream::{CancelToken, SegmentStream, parse_segments_async, parse_segments_async_from_path};

use std::io::Read;
use std::path::Path;

// ============================================================================
// Core API - materialized segment sequences
// ============================================================================

/// Parse an in-memory document into its full segment sequence.
///
/// # Examples
///
/// ```
/// use ajis::{parse_segments, ContainerKind, Segment, Settings, ValueKind};
///
/// let segments = parse_segments(r#"{"a":1}"#, &Settings::default())?;
/// assert_eq!(segments.len(), 4);
/// assert!(matches!(
///     segments[0],
///     Segment::EnterContainer { kind: ContainerKind::Object, offset: 0, depth: 0 }
/// ));
/// assert!(matches!(
///     segments[2],
///     Segment::Value { kind: ValueKind::Number, depth: 1, .. }
/// ));
/// # Ok::<(), ajis::AjisError>(())
/// ```
pub fn parse_segments(input: &str, settings: &Settings) -> Result<Vec<Segment>, AjisError> {
    parser::parse_span(input, settings)
}

/// Parse after first honouring any leading `#ajis` settings directives.
///
/// The leading directive lines are scanned textually, merged over
/// `settings`, and the document is parsed with the result — so a document
/// can, for example, opt itself into `Lax` with `#ajis mode value=lax`.
///
/// # Examples
///
/// ```
/// use ajis::{parse_segments_with_directives, Settings};
///
/// let doc = "#ajis mode value=lax\n{ name: 'Alice', }";
/// let segments = parse_segments_with_directives(doc, &Settings::default())?;
/// assert_eq!(segments.len(), 4);
/// # Ok::<(), ajis::AjisError>(())
/// ```
pub fn parse_segments_with_directives(
    input: &str,
    settings: &Settings,
) -> Result<Vec<Segment>, AjisError> {
    if let Some(sink) = &settings.event_sink {
        sink.event(&ParseEvent::Milestone {
            phase: Phase::DirectiveScan,
        });
    }
    let mut merged = settings.clone();
    for d in directive::scan_leading_directives(input) {
        d.apply_to(&mut merged);
    }
    parser::parse_span(input, &merged)
}

// ============================================================================
// Reader and file API
// ============================================================================

/// Parse from a forward-only blocking byte stream with a bounded,
/// compacting buffer sized by `stream_chunk_threshold`.
pub fn parse_segments_from_reader<R: Read>(
    src: R,
    settings: &Settings,
) -> Result<Vec<Segment>, AjisError> {
    let threshold = engine::parse_chunk_threshold(&settings.stream_chunk_threshold)?;
    let chunk = threshold.clamp(512, 1 << 22) as usize;
    parser::parse_stream(src, chunk, settings)
}

/// Parse a file, choosing the engine from the processing profile and the
/// file's size: whole-file span parse under the chunk threshold, bounded
/// buffered parse above it, chunked low-memory parse for
/// [`ParserProfile::LowMemory`].
pub fn parse_segments_from_path(
    path: impl AsRef<Path>,
    settings: &Settings,
) -> Result<Vec<Segment>, AjisError> {
    parser::parse_path(path.as_ref(), settings)
}

#[cfg(test)]
mod tests;

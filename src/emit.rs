//! Render a segment sequence back to compact JSON text.
//!
//! The inverse surface of the parser, for consuming transformed streams.
//! Comments and directives are skipped (plain JSON cannot carry them);
//! number slices are written verbatim, so AJIS-only forms (base prefixes,
//! separators, typed literals) round-trip as-is.

use crate::segment::{ContainerKind, Segment, Slice, ValueKind};
use std::io::{self, Write};

/// Write `seq` as compact JSON. String slices are assumed decoded (the
/// default parse settings); see [`write_segments_preserved`] for streams
/// parsed with `preserve_string_escapes`.
pub fn write_segments<W: Write>(seq: &[Segment], w: &mut W) -> io::Result<()> {
    write_impl(seq, w, true)
}

/// Like [`write_segments`] for slices that still carry their escape
/// sequences verbatim: backslashes are written through untouched.
pub fn write_segments_preserved<W: Write>(seq: &[Segment], w: &mut W) -> io::Result<()> {
    write_impl(seq, w, false)
}

/// Render to a `String`.
pub fn segments_to_string(seq: &[Segment]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_segments(seq, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_impl<W: Write>(seq: &[Segment], w: &mut W, escape_backslash: bool) -> io::Result<()> {
    // One bool per open container: does the next entry need a comma?
    let mut needs_comma: Vec<bool> = Vec::new();
    let mut after_name = false;
    for seg in seq {
        match seg {
            Segment::Comment { .. } | Segment::Directive { .. } => {}
            Segment::PropertyName { name, .. } => {
                separate(w, &mut needs_comma)?;
                write_json_string(w, name, escape_backslash)?;
                w.write_all(b":")?;
                after_name = true;
            }
            Segment::EnterContainer { kind, .. } => {
                if after_name {
                    after_name = false;
                } else {
                    separate(w, &mut needs_comma)?;
                }
                w.write_all(match kind {
                    ContainerKind::Object => b"{",
                    ContainerKind::Array => b"[",
                })?;
                needs_comma.push(false);
            }
            Segment::ExitContainer { kind, .. } => {
                needs_comma.pop();
                w.write_all(match kind {
                    ContainerKind::Object => b"}",
                    ContainerKind::Array => b"]",
                })?;
            }
            Segment::Value { kind, value, .. } => {
                if after_name {
                    after_name = false;
                } else {
                    separate(w, &mut needs_comma)?;
                }
                match kind {
                    ValueKind::Null => w.write_all(b"null")?,
                    ValueKind::Boolean => {
                        let text = value.as_ref().map(|s| s.as_str()).unwrap_or("null");
                        w.write_all(text.as_bytes())?;
                    }
                    ValueKind::Number => {
                        let text = value.as_ref().map(|s| s.as_str()).unwrap_or("0");
                        w.write_all(text.as_bytes())?;
                    }
                    ValueKind::String => match value {
                        Some(s) => write_json_string(w, s, escape_backslash)?,
                        None => w.write_all(b"\"\"")?,
                    },
                }
            }
        }
    }
    Ok(())
}

fn separate<W: Write>(w: &mut W, needs_comma: &mut [bool]) -> io::Result<()> {
    if let Some(pending) = needs_comma.last_mut() {
        if *pending {
            w.write_all(b",")?;
        }
        *pending = true;
    }
    Ok(())
}

/// Escape-run string writer: flush safe runs as single slices and emit
/// escapes only where required.
fn write_json_string<W: Write>(w: &mut W, slice: &Slice, escape_backslash: bool) -> io::Result<()> {
    let s = slice.as_str();
    w.write_all(b"\"")?;
    let bytes = s.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let escaped: Option<&[u8]> = match b {
            b'"' => Some(b"\\\""),
            b'\\' if escape_backslash => Some(b"\\\\"),
            0x08 => Some(b"\\b"),
            0x0C => Some(b"\\f"),
            b'\n' => Some(b"\\n"),
            b'\r' => Some(b"\\r"),
            b'\t' => Some(b"\\t"),
            _ => None,
        };
        let needs_hex = escaped.is_none() && b < 0x20;
        if escaped.is_none() && !needs_hex {
            continue;
        }
        if i > start {
            w.write_all(&bytes[start..i])?;
        }
        match escaped {
            Some(esc) => w.write_all(esc)?,
            None => write!(w, "\\u{:04X}", b)?,
        }
        start = i + 1;
    }
    if start < bytes.len() {
        w.write_all(&bytes[start..])?;
    }
    w.write_all(b"\"")
}

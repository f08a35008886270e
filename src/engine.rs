//! Engine selection: a pure cost model mapping `(profile, input)` to one of
//! the concrete parser engines, plus the chunk-threshold string format.

use crate::error::{AjisError, AjisErrorKind};
use crate::options::ParserProfile;
use crate::position::TextPosition;

/// What the caller is holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// The whole document is in memory.
    Span,
    /// Bytes arrive through a reader.
    Stream,
}

/// Shape of the input, as far as the caller knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDescriptor {
    pub kind: InputKind,
    pub len: Option<u64>,
    /// False for forward-only sources such as pipes and sockets.
    pub random_access: bool,
}

/// A concrete parser engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Eager single-pass lex over a contiguous buffer.
    Span,
    /// Compacting buffered lex over a forward-only reader.
    BufferedStream,
    /// Bounded-buffer chunked iteration over a seekable file.
    ChunkedFile,
}

struct Candidate {
    engine: EngineKind,
    passes: u64,
    /// In units of the chunk threshold, so profiles can weigh memory
    /// without caring about absolute sizes.
    memory_units: u64,
    requires_random_access: bool,
}

/// Pick the cheapest engine for the profile. Candidates are scored on
/// `(passes, estimated memory, random-access requirement)`; random access is
/// heavily penalised when the input cannot seek.
pub fn select_engine(
    profile: ParserProfile,
    input: &InputDescriptor,
    chunk_threshold: u64,
) -> EngineKind {
    let threshold = chunk_threshold.max(1);
    if input.kind == InputKind::Span {
        return EngineKind::Span;
    }

    // Slurping a stream fits in one pass only when the document is known to
    // fit under the threshold; otherwise it costs a second pass worth of
    // copying on top of holding the whole document.
    let span_units = input.len.map(|l| l / threshold).unwrap_or(u64::MAX >> 32);
    let span_passes = match input.len {
        Some(l) if l <= threshold => 1,
        _ => 2,
    };
    let candidates = [
        Candidate {
            engine: EngineKind::Span,
            passes: span_passes,
            memory_units: span_units,
            requires_random_access: false,
        },
        Candidate {
            engine: EngineKind::BufferedStream,
            passes: 1,
            memory_units: 4,
            requires_random_access: false,
        },
        Candidate {
            engine: EngineKind::ChunkedFile,
            passes: 1,
            memory_units: 1,
            requires_random_access: true,
        },
    ];

    let (pass_weight, memory_weight, ra_cost) = match profile {
        ParserProfile::HighThroughput => (8, 1, 8),
        ParserProfile::Universal => (4, 2, 10),
        ParserProfile::LowMemory => (1, 16, 2),
    };

    let score = |c: &Candidate| -> u64 {
        let ra = if c.requires_random_access {
            if input.random_access { ra_cost } else { 1_000_000 }
        } else {
            0
        };
        c.passes.saturating_mul(pass_weight)
            + c.memory_units.saturating_mul(memory_weight)
            + ra
    };

    candidates
        .iter()
        .min_by_key(|c| score(c))
        .map(|c| c.engine)
        .unwrap_or(EngineKind::BufferedStream)
}

/// Parse a chunk-threshold string: a decimal byte count with an optional
/// `k`/`M`/`G` suffix in powers of 1024. An unrecognised suffix fails fast.
pub fn parse_chunk_threshold(threshold: &str) -> Result<u64, AjisError> {
    let bad =
        |msg: String| AjisError::new(AjisErrorKind::InputNotSupported(msg), TextPosition::START);
    let s = threshold.trim();
    let digits_end = s
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_end == 0 {
        return Err(bad(format!("invalid chunk threshold {s:?}")));
    }
    let value: u64 = s[..digits_end]
        .parse()
        .map_err(|_| bad(format!("invalid chunk threshold {s:?}")))?;
    let multiplier: u64 = match s[digits_end..].trim() {
        "" => 1,
        "k" | "K" => 1024,
        "M" => 1024 * 1024,
        "G" => 1024 * 1024 * 1024,
        suffix => {
            return Err(bad(format!("unrecognised chunk threshold suffix {suffix:?}")));
        }
    };
    value
        .checked_mul(multiplier)
        .filter(|&v| v > 0)
        .ok_or_else(|| bad(format!("chunk threshold {s:?} out of range")))
}

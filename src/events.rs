//! Progress and diagnostic reporting.
//!
//! All observability flows through an explicit, optional sink handed in via
//! [`Settings`](crate::Settings); without one, reporting is disabled at zero
//! cost. Messages are opaque keys resolved by an optional [`TextProvider`].

use crate::position::TextPosition;

/// Coarse phase of work, attached to progress events and milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Leading scan for `#ajis` settings directives.
    DirectiveScan,
    /// Main tokenize-and-parse pass.
    Parse,
}

/// An event published to the host's sink.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// Periodic progress; `total_bytes` is present when the input length is
    /// known up front (files, spans).
    Progress {
        phase: Phase,
        processed_bytes: u64,
        total_bytes: Option<u64>,
    },
    /// A phase started or finished.
    Milestone { phase: Phase },
    /// A non-fatal finding, e.g. a duplicate key when duplicates are allowed.
    Diagnostic {
        code: u16,
        message_key: &'static str,
        position: TextPosition,
        detail: Option<String>,
    },
}

/// Host-provided event receiver. Implementations must be cheap; the parser
/// calls the sink inline between segments.
pub trait EventSink: Send + Sync {
    fn event(&self, event: &ParseEvent);
}

/// Resolves opaque message keys to localized text. Returning `None` falls
/// back to the key itself.
pub trait TextProvider: Send + Sync {
    fn resolve(&self, key: &str) -> Option<String>;
}

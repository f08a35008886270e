use super::ByteReader;
use crate::position::{PositionTracker, TextPosition};

/// Reader over a borrowed in-memory byte buffer.
///
/// Also serves as the re-lex window of the async stream parser, which seeds
/// it with the position state of the buffer's first byte.
pub(crate) struct SpanReader<'i> {
    bytes: &'i [u8],
    index: usize,
    tracker: PositionTracker,
}

impl<'i> SpanReader<'i> {
    pub(crate) fn new(bytes: &'i [u8]) -> Self {
        Self {
            bytes,
            index: 0,
            tracker: PositionTracker::new(),
        }
    }

    /// Start mid-document: `base` is the position of `bytes[0]` and
    /// `prev_was_cr` carries CRLF state across buffer compaction.
    pub(crate) fn with_state(bytes: &'i [u8], base: TextPosition, prev_was_cr: bool) -> Self {
        Self {
            bytes,
            index: 0,
            tracker: PositionTracker::with_state(base, prev_was_cr),
        }
    }

    /// Bytes consumed so far.
    pub(crate) fn consumed(&self) -> usize {
        self.index
    }

    /// Position state for handoff back to a compacting caller.
    pub(crate) fn state(&self) -> (TextPosition, bool) {
        (self.tracker.position(), self.tracker.prev_was_cr())
    }
}

impl ByteReader for SpanReader<'_> {
    fn peek(&mut self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn peek_at(&mut self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.index + ahead).copied()
    }

    fn peek_slice(&mut self) -> &[u8] {
        &self.bytes[self.index..]
    }

    fn read(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.index)?;
        self.tracker.advance(b);
        self.index += 1;
        Some(b)
    }

    fn read_span(&mut self, n: usize) -> Option<&[u8]> {
        if self.index + n > self.bytes.len() {
            return None;
        }
        let span = &self.bytes[self.index..self.index + n];
        for &b in span {
            self.tracker.advance(b);
        }
        self.index += n;
        Some(span)
    }

    fn end_of_input(&mut self) -> bool {
        self.index >= self.bytes.len()
    }

    fn position(&self) -> TextPosition {
        self.tracker.position()
    }
}

use super::ByteReader;
use crate::position::{PositionTracker, TextPosition};
use std::io::Read;

/// Reader over a blocking byte stream with a bounded internal buffer.
///
/// The buffer compacts (unread tail moved to the front) before each refill
/// and grows on demand when `read_span` or a deep `peek_at` needs more than
/// one chunk's worth of lookahead. End of input is reported only after a
/// refill returns zero bytes.
pub(crate) struct StreamReader<R: Read> {
    src: R,
    buf: Vec<u8>,
    start: usize,
    chunk: usize,
    eof: bool,
    /// Set when the underlying source fails; surfaced by the lexer as an
    /// end-of-input it can attribute to a position.
    pub(crate) io_error: Option<std::io::Error>,
    tracker: PositionTracker,
}

impl<R: Read> StreamReader<R> {
    pub(crate) fn with_chunk_size(src: R, chunk: usize) -> Self {
        let chunk = chunk.max(64);
        Self {
            src,
            buf: Vec::with_capacity(chunk),
            start: 0,
            chunk,
            eof: false,
            io_error: None,
            tracker: PositionTracker::new(),
        }
    }

    fn available(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Compact and pull the next chunk. Returns how many bytes arrived.
    fn refill(&mut self) -> usize {
        if self.eof || self.io_error.is_some() {
            return 0;
        }
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
        let old_len = self.buf.len();
        self.buf.resize(old_len + self.chunk, 0);
        match self.src.read(&mut self.buf[old_len..]) {
            Ok(0) => {
                self.buf.truncate(old_len);
                self.eof = true;
                0
            }
            Ok(n) => {
                self.buf.truncate(old_len + n);
                n
            }
            Err(e) => {
                self.buf.truncate(old_len);
                self.io_error = Some(e);
                0
            }
        }
    }

    /// Buffer at least `n` unread bytes, growing past the chunk size when
    /// needed. Returns false when the source ends first.
    fn ensure(&mut self, n: usize) -> bool {
        while self.available() < n {
            if self.refill() == 0 {
                return false;
            }
        }
        true
    }
}

impl<R: Read> ByteReader for StreamReader<R> {
    fn peek(&mut self) -> Option<u8> {
        if !self.ensure(1) {
            return None;
        }
        Some(self.buf[self.start])
    }

    fn peek_at(&mut self, ahead: usize) -> Option<u8> {
        if !self.ensure(ahead + 1) {
            return None;
        }
        Some(self.buf[self.start + ahead])
    }

    fn peek_slice(&mut self) -> &[u8] {
        if !self.ensure(1) {
            return &[];
        }
        &self.buf[self.start..]
    }

    fn read(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.tracker.advance(b);
        self.start += 1;
        Some(b)
    }

    fn read_span(&mut self, n: usize) -> Option<&[u8]> {
        if !self.ensure(n) {
            return None;
        }
        let span = &self.buf[self.start..self.start + n];
        for &b in span {
            self.tracker.advance(b);
        }
        self.start += n;
        Some(&self.buf[self.start - n..self.start])
    }

    fn end_of_input(&mut self) -> bool {
        self.peek().is_none()
    }

    fn position(&self) -> TextPosition {
        self.tracker.position()
    }
}

//! Pull-based asynchronous segment stream over a `tokio::io::AsyncRead`.
//!
//! The stream keeps a compacting byte buffer and re-lexes from the buffer
//! tail: a token (or an end-of-input condition) that touches the end of the
//! buffer while the source is still open triggers an awaited refill and a
//! retry, so a token is only ever accepted once it provably cannot extend.
//! Between two yields the producer does a bounded amount of work — one
//! token, occasionally a few for salvage — never a whole container.

use crate::error::{AjisError, AjisErrorKind};
use crate::events::{EventSink, ParseEvent, Phase};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::options::{EffectiveSettings, Settings};
use crate::parser::SegmentMachine;
use crate::position::TextPosition;
use crate::reader::SpanReader;
use crate::segment::Segment;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Cooperative cancellation flag, cloned across tasks. The parser consults
/// it between pulls, inside the member and element loops; cancellation
/// surfaces as a [`Cancelled`](AjisErrorKind::Cancelled) error before the
/// next segment is produced.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Asynchronous pull iterator over segments.
pub struct SegmentStream<R> {
    src: R,
    eff: EffectiveSettings,
    sink: Option<Arc<dyn EventSink>>,
    machine: SegmentMachine,
    /// Unconsumed document bytes; compacted after every accepted token.
    buf: Vec<u8>,
    /// Position of `buf[0]`, with the CR state carried across compaction.
    base: TextPosition,
    prev_was_cr: bool,
    scratch: Vec<u8>,
    src_eof: bool,
    finished: bool,
    started: bool,
    pending: VecDeque<Segment>,
    cancel: Option<CancelToken>,
    received: u64,
    total: Option<u64>,
}

impl<R: AsyncRead + Unpin> SegmentStream<R> {
    pub fn new(src: R, settings: &Settings) -> Result<Self, AjisError> {
        let eff = settings.effective();
        let threshold = crate::engine::parse_chunk_threshold(&settings.stream_chunk_threshold)?;
        let chunk = threshold.clamp(512, 1 << 22) as usize;
        Ok(Self {
            src,
            machine: SegmentMachine::new(eff.clone(), settings.event_sink.clone()),
            eff,
            sink: settings.event_sink.clone(),
            buf: Vec::with_capacity(chunk),
            base: TextPosition::START,
            prev_was_cr: false,
            scratch: vec![0u8; chunk],
            src_eof: false,
            finished: false,
            started: false,
            pending: VecDeque::new(),
            cancel: None,
            received: 0,
            total: None,
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_total_bytes(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Pull the next segment; `Ok(None)` once the document is complete.
    pub async fn next_segment(&mut self) -> Result<Option<Segment>, AjisError> {
        if !self.started {
            self.started = true;
            self.milestone();
        }
        loop {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    return Err(AjisError::new(AjisErrorKind::Cancelled, self.base));
                }
            }
            if let Some(seg) = self.pending.pop_front() {
                return Ok(Some(seg));
            }
            if self.finished {
                return Ok(None);
            }
            let tok = self.lex_one().await?;
            let is_end = tok.kind == TokenKind::End;
            let mut segs = Vec::new();
            self.machine.advance(tok, &mut segs)?;
            self.pending.extend(segs);
            if is_end {
                self.finished = true;
                self.milestone();
            }
        }
    }

    /// Lex one token from the buffered tail, refilling until the token no
    /// longer touches the buffer end (or the source is exhausted).
    async fn lex_one(&mut self) -> Result<Token, AjisError> {
        loop {
            enum Attempt {
                Accept(Token, usize, TextPosition, bool),
                Fail(AjisError),
                NeedMore,
            }
            let attempt = {
                let reader = SpanReader::with_state(&self.buf, self.base, self.prev_was_cr);
                let mut lexer = if self.src_eof {
                    Lexer::new(reader, &self.eff)
                } else {
                    Lexer::new_partial(reader, &self.eff)
                };
                match lexer.next_token() {
                    Ok(tok) => {
                        let consumed = lexer.reader.consumed();
                        if !self.src_eof && consumed >= self.buf.len() {
                            Attempt::NeedMore
                        } else {
                            let (pos, cr) = lexer.reader.state();
                            Attempt::Accept(tok, consumed, pos, cr)
                        }
                    }
                    Err(e)
                        if !self.src_eof
                            && matches!(e.kind, AjisErrorKind::UnexpectedEndOfInput) =>
                    {
                        Attempt::NeedMore
                    }
                    Err(e) => Attempt::Fail(e),
                }
            };
            match attempt {
                Attempt::Accept(tok, consumed, pos, cr) => {
                    self.buf.drain(..consumed);
                    self.base = pos;
                    self.prev_was_cr = cr;
                    return Ok(tok);
                }
                Attempt::Fail(e) => return Err(e),
                Attempt::NeedMore => self.refill().await?,
            }
        }
    }

    async fn refill(&mut self) -> Result<(), AjisError> {
        let n = self
            .src
            .read(&mut self.scratch)
            .await
            .map_err(|e| AjisError::io(e, self.base))?;
        if n == 0 {
            self.src_eof = true;
            return Ok(());
        }
        self.buf.extend_from_slice(&self.scratch[..n]);
        self.received += n as u64;
        if let Some(sink) = &self.sink {
            sink.event(&ParseEvent::Progress {
                phase: Phase::Parse,
                processed_bytes: self.received,
                total_bytes: self.total,
            });
        }
        Ok(())
    }

    fn milestone(&self) {
        if let Some(sink) = &self.sink {
            sink.event(&ParseEvent::Milestone { phase: Phase::Parse });
        }
    }

    /// Adapt into a `futures_core::Stream` of segments.
    pub fn into_stream(self) -> impl futures_core::Stream<Item = Result<Segment, AjisError>> {
        async_stream::try_stream! {
            let mut this = self;
            while let Some(seg) = this.next_segment().await? {
                yield seg;
            }
        }
    }
}

/// Pull-based asynchronous segment parse over any `AsyncRead` source.
pub fn parse_segments_async<R: AsyncRead + Unpin>(
    src: R,
    settings: &Settings,
) -> Result<SegmentStream<R>, AjisError> {
    SegmentStream::new(src, settings)
}

/// Asynchronous engine over a file, with progress totals from its length.
pub async fn parse_segments_async_from_path(
    path: impl AsRef<Path>,
    settings: &Settings,
) -> Result<SegmentStream<tokio::fs::File>, AjisError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AjisError::io(e, TextPosition::START))?;
    let total = file.metadata().await.ok().map(|m| m.len());
    let mut stream = SegmentStream::new(file, settings)?;
    stream.total = total;
    Ok(stream)
}

//! Segment parser: a frame state machine over the token stream.
//!
//! The grammar is encoded as one explicit machine so the sync and async
//! drivers share it: each token advances the machine and appends zero or
//! more segments (more than one only for Lax end-of-input salvage). Depth is
//! the frame count at emission time, which gives every segment the nesting
//! level of its containing container.

use crate::error::{AjisError, AjisErrorKind};
use crate::events::{EventSink, ParseEvent};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::options::{EffectiveSettings, Settings};
use crate::position::TextPosition;
use crate::reader::{ByteReader, SpanReader, StreamReader};
use crate::segment::{ContainerKind, Segment, Slice, SliceFlags, ValueKind};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Object: before a member name; `true` when a comma was just consumed.
    NameOrClose(bool),
    /// Object: between a name and its `:`.
    Colon,
    /// Object: between `:` and the member value.
    MemberValue,
    /// Object: after a member value.
    CommaOrClose,
    /// Array: before an item; `true` when a comma was just consumed.
    ItemOrClose(bool),
    /// Array: after an item.
    ItemCommaOrClose,
}

struct Frame {
    kind: ContainerKind,
    expect: Expect,
    seen_names: HashSet<Box<str>>,
}

pub(crate) struct SegmentMachine {
    opts: EffectiveSettings,
    sink: Option<Arc<dyn EventSink>>,
    frames: Vec<Frame>,
    root_seen: bool,
    finished: bool,
}

impl SegmentMachine {
    pub(crate) fn new(opts: EffectiveSettings, sink: Option<Arc<dyn EventSink>>) -> Self {
        Self {
            opts,
            sink,
            frames: Vec::new(),
            root_seen: false,
            finished: false,
        }
    }

    fn depth(&self) -> u32 {
        self.frames.len() as u32
    }

    /// Feed one token; segments are appended to `out`.
    pub(crate) fn advance(&mut self, tok: Token, out: &mut Vec<Segment>) -> Result<(), AjisError> {
        match tok.kind {
            TokenKind::Comment => {
                if self.opts.emit_comments && self.meta_emittable() {
                    let offset = tok.offset;
                    out.push(Segment::Comment {
                        text: take_text(tok),
                        offset,
                        depth: self.depth(),
                    });
                }
                Ok(())
            }
            TokenKind::Directive => {
                if self.opts.emit_directives && self.meta_emittable() {
                    let offset = tok.offset;
                    out.push(Segment::Directive {
                        text: take_text(tok),
                        offset,
                        depth: self.depth(),
                    });
                }
                Ok(())
            }
            TokenKind::End => self.on_end(tok, out),
            TokenKind::ObjectOpen => self.on_open(tok, ContainerKind::Object, out),
            TokenKind::ArrayOpen => self.on_open(tok, ContainerKind::Array, out),
            TokenKind::ObjectClose => self.on_close(tok, ContainerKind::Object, out),
            TokenKind::ArrayClose => self.on_close(tok, ContainerKind::Array, out),
            TokenKind::Colon => self.on_colon(tok),
            TokenKind::Comma => self.on_comma(tok),
            TokenKind::String | TokenKind::Identifier => self.on_string_like(tok, out),
            TokenKind::Number => self.on_primitive(tok, ValueKind::Number, out),
            TokenKind::True | TokenKind::False => {
                let text = if tok.kind == TokenKind::True {
                    "true"
                } else {
                    "false"
                };
                self.on_literal(
                    tok,
                    ValueKind::Boolean,
                    Some(Slice::new(text, SliceFlags::empty())),
                    out,
                )
            }
            TokenKind::Null => self.on_literal(tok, ValueKind::Null, None, out),
        }
    }

    /// Comments and directives may be emitted between members and around the
    /// root value, but never between a `PropertyName` and its value.
    fn meta_emittable(&self) -> bool {
        !matches!(
            self.frames.last().map(|f| f.expect),
            Some(Expect::Colon) | Some(Expect::MemberValue)
        )
    }

    fn expects_value(&self) -> bool {
        if self.finished {
            return false;
        }
        match self.frames.last() {
            Some(f) => matches!(f.expect, Expect::MemberValue | Expect::ItemOrClose(_)),
            None => !self.root_seen,
        }
    }

    /// Bookkeeping for a completed value at the current level.
    fn value_done(&mut self) {
        match self.frames.last_mut() {
            Some(f) => {
                f.expect = match f.expect {
                    Expect::MemberValue => Expect::CommaOrClose,
                    _ => Expect::ItemCommaOrClose,
                };
            }
            None => self.root_seen = true,
        }
    }

    fn on_open(
        &mut self,
        tok: Token,
        kind: ContainerKind,
        out: &mut Vec<Segment>,
    ) -> Result<(), AjisError> {
        if !self.expects_value() {
            return Err(self.unexpected(tok));
        }
        if self.depth() >= self.opts.max_depth {
            return Err(AjisError::new(
                AjisErrorKind::MaxDepthExceeded {
                    limit: self.opts.max_depth,
                },
                tok.position(),
            ));
        }
        out.push(Segment::EnterContainer {
            kind,
            offset: tok.offset,
            depth: self.depth(),
        });
        self.value_done();
        self.frames.push(Frame {
            kind,
            expect: match kind {
                ContainerKind::Object => Expect::NameOrClose(false),
                ContainerKind::Array => Expect::ItemOrClose(false),
            },
            seen_names: HashSet::new(),
        });
        Ok(())
    }

    fn on_close(
        &mut self,
        tok: Token,
        kind: ContainerKind,
        out: &mut Vec<Segment>,
    ) -> Result<(), AjisError> {
        let Some(top) = self.frames.last() else {
            return Err(self.unexpected(tok));
        };
        if top.kind != kind {
            return Err(self.unexpected(tok));
        }
        match top.expect {
            Expect::NameOrClose(after_comma) | Expect::ItemOrClose(after_comma) => {
                if after_comma && !self.opts.allow_trailing_commas {
                    return Err(AjisError::new(
                        AjisErrorKind::TrailingCommaNotAllowed,
                        tok.position(),
                    ));
                }
            }
            Expect::CommaOrClose | Expect::ItemCommaOrClose => {}
            Expect::Colon | Expect::MemberValue => return Err(self.unexpected(tok)),
        }
        self.frames.pop();
        out.push(Segment::ExitContainer {
            kind,
            offset: tok.offset,
            depth: self.depth(),
        });
        Ok(())
    }

    fn on_colon(&mut self, tok: Token) -> Result<(), AjisError> {
        match self.frames.last_mut() {
            Some(f) if f.expect == Expect::Colon => {
                f.expect = Expect::MemberValue;
                Ok(())
            }
            _ => Err(self.unexpected(tok)),
        }
    }

    fn on_comma(&mut self, tok: Token) -> Result<(), AjisError> {
        match self.frames.last_mut() {
            Some(f) if f.expect == Expect::CommaOrClose => {
                f.expect = Expect::NameOrClose(true);
                Ok(())
            }
            Some(f) if f.expect == Expect::ItemCommaOrClose => {
                f.expect = Expect::ItemOrClose(true);
                Ok(())
            }
            _ => Err(self.unexpected(tok)),
        }
    }

    fn on_string_like(&mut self, tok: Token, out: &mut Vec<Segment>) -> Result<(), AjisError> {
        let in_name_position = matches!(
            self.frames.last().map(|f| f.expect),
            Some(Expect::NameOrClose(_))
        );
        if in_name_position {
            return self.on_property_name(tok, out);
        }
        if tok.kind == TokenKind::Identifier {
            // Identifiers are only meaningful as property names.
            return Err(self.unexpected(tok));
        }
        self.on_primitive(tok, ValueKind::String, out)
    }

    fn on_property_name(&mut self, tok: Token, out: &mut Vec<Segment>) -> Result<(), AjisError> {
        let pos = tok.position();
        let offset = tok.offset;
        let name = take_text(tok);
        if let Some(max) = self.opts.max_property_name_bytes {
            if name.text.len() > max {
                return Err(AjisError::new(
                    AjisErrorKind::MaxPropertyNameBytesExceeded { limit: max },
                    pos,
                ));
            }
        }
        let depth = self.depth();
        let sink = self.sink.clone();
        let allow_duplicates = self.opts.allow_duplicate_keys;
        let Some(frame) = self.frames.last_mut() else {
            return Err(AjisError::new(
                AjisErrorKind::UnexpectedToken {
                    found: TokenKind::String,
                    expected: vec![TokenKind::End],
                },
                pos,
            ));
        };
        if !frame.seen_names.insert(name.text.clone()) {
            if let Some(sink) = &sink {
                let kind = AjisErrorKind::DuplicateKey(name.text.to_string());
                sink.event(&ParseEvent::Diagnostic {
                    code: kind.code(),
                    message_key: kind.message_key(),
                    position: pos,
                    detail: Some(name.text.to_string()),
                });
            }
            if !allow_duplicates {
                return Err(AjisError::new(
                    AjisErrorKind::DuplicateKey(name.text.to_string()),
                    pos,
                ));
            }
        }
        frame.expect = Expect::Colon;
        out.push(Segment::PropertyName {
            name,
            offset,
            depth,
        });
        Ok(())
    }

    fn on_primitive(
        &mut self,
        tok: Token,
        kind: ValueKind,
        out: &mut Vec<Segment>,
    ) -> Result<(), AjisError> {
        if !self.expects_value() {
            return Err(self.unexpected(tok));
        }
        let offset = tok.offset;
        let slice = take_text(tok);
        out.push(Segment::Value {
            kind,
            value: Some(slice),
            offset,
            depth: self.depth(),
        });
        self.value_done();
        Ok(())
    }

    fn on_literal(
        &mut self,
        tok: Token,
        kind: ValueKind,
        value: Option<Slice>,
        out: &mut Vec<Segment>,
    ) -> Result<(), AjisError> {
        if !self.expects_value() {
            return Err(self.unexpected(tok));
        }
        out.push(Segment::Value {
            kind,
            value,
            offset: tok.offset,
            depth: self.depth(),
        });
        self.value_done();
        Ok(())
    }

    fn on_end(&mut self, tok: Token, out: &mut Vec<Segment>) -> Result<(), AjisError> {
        if self.frames.is_empty() {
            if !self.root_seen {
                return Err(AjisError::new(
                    AjisErrorKind::UnexpectedEndOfInput,
                    tok.position(),
                ));
            }
            self.finished = true;
            return Ok(());
        }
        if !self.opts.salvage {
            return Err(AjisError::new(
                AjisErrorKind::UnexpectedEndOfInput,
                tok.position(),
            ));
        }
        // Missing-closer salvage: complete any dangling member with null,
        // then close every open container at the end offset.
        loop {
            let dangling_member = matches!(
                self.frames.last().map(|f| f.expect),
                Some(Expect::Colon) | Some(Expect::MemberValue)
            );
            if dangling_member {
                out.push(Segment::Value {
                    kind: ValueKind::Null,
                    value: None,
                    offset: tok.offset,
                    depth: self.frames.len() as u32,
                });
            }
            let Some(frame) = self.frames.pop() else {
                break;
            };
            out.push(Segment::ExitContainer {
                kind: frame.kind,
                offset: tok.offset,
                depth: self.depth(),
            });
        }
        self.root_seen = true;
        self.finished = true;
        Ok(())
    }

    fn unexpected(&self, tok: Token) -> AjisError {
        AjisError::new(
            AjisErrorKind::UnexpectedToken {
                found: tok.kind,
                expected: self.expected_kinds(),
            },
            tok.position(),
        )
    }

    fn expected_kinds(&self) -> Vec<TokenKind> {
        use TokenKind::*;
        let value_starters = [ObjectOpen, ArrayOpen, String, Number, True, False, Null];
        match self.frames.last() {
            None if !self.root_seen => value_starters.to_vec(),
            None => vec![End],
            Some(f) => match f.expect {
                Expect::NameOrClose(after_comma) => {
                    let mut v = vec![String];
                    if self.opts.unquoted_names {
                        v.push(Identifier);
                    }
                    if !after_comma || self.opts.allow_trailing_commas {
                        v.push(ObjectClose);
                    }
                    v
                }
                Expect::Colon => vec![Colon],
                Expect::MemberValue => value_starters.to_vec(),
                Expect::CommaOrClose => vec![Comma, ObjectClose],
                Expect::ItemOrClose(after_comma) => {
                    let mut v = value_starters.to_vec();
                    if !after_comma || self.opts.allow_trailing_commas {
                        v.push(ArrayClose);
                    }
                    v
                }
                Expect::ItemCommaOrClose => vec![Comma, ArrayClose],
            },
        }
    }
}

fn take_text(tok: Token) -> Slice {
    tok.text
        .unwrap_or_else(|| Slice::new("", SliceFlags::empty()))
}

// ============================================================================
// Sync drivers
// ============================================================================

/// Materialize the segment sequence for an in-memory document.
pub(crate) fn parse_span(input: &str, settings: &Settings) -> Result<Vec<Segment>, AjisError> {
    let eff = settings.effective();
    let mut lexer = Lexer::new(SpanReader::new(input.as_bytes()), &eff);
    let mut machine = SegmentMachine::new(eff.clone(), settings.event_sink.clone());
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_end = tok.kind == TokenKind::End;
        machine.advance(tok, &mut out)?;
        if is_end {
            break;
        }
    }
    Ok(out)
}

/// Materialize the segment sequence from a forward-only byte stream.
pub(crate) fn parse_stream<S: Read>(
    src: S,
    chunk: usize,
    settings: &Settings,
) -> Result<Vec<Segment>, AjisError> {
    let eff = settings.effective();
    let mut lexer = Lexer::new(StreamReader::with_chunk_size(src, chunk), &eff);
    let mut machine = SegmentMachine::new(eff.clone(), settings.event_sink.clone());
    let mut out = Vec::new();
    loop {
        let tok = match lexer.next_token() {
            Ok(t) => t,
            Err(e) => return Err(surface_io(&mut lexer.reader, e)),
        };
        let is_end = tok.kind == TokenKind::End;
        machine.advance(tok, &mut out)?;
        if is_end {
            break;
        }
    }
    if let Some(ioe) = lexer.reader.io_error.take() {
        return Err(AjisError::io(ioe, lexer.reader.position()));
    }
    Ok(out)
}

/// An io failure makes the stream reader look like a truncated document;
/// report the io error instead of the structural one it caused.
fn surface_io<S: Read>(reader: &mut StreamReader<S>, err: AjisError) -> AjisError {
    match reader.io_error.take() {
        Some(ioe) => AjisError::io(ioe, err.position),
        None => err,
    }
}

/// Engine-selected file parse; see [`crate::engine`].
pub(crate) fn parse_path(path: &Path, settings: &Settings) -> Result<Vec<Segment>, AjisError> {
    use crate::engine::{self, EngineKind, InputDescriptor, InputKind};

    let threshold = engine::parse_chunk_threshold(&settings.stream_chunk_threshold)?;
    let file = std::fs::File::open(path).map_err(|e| AjisError::io(e, TextPosition::START))?;
    let len = file
        .metadata()
        .map(|m| m.len())
        .map_err(|e| AjisError::io(e, TextPosition::START))?;
    let input = InputDescriptor {
        kind: InputKind::Stream,
        len: Some(len),
        random_access: true,
    };
    match engine::select_engine(settings.parser_profile, &input, threshold) {
        EngineKind::Span => {
            let mut text = String::new();
            let mut file = file;
            file.read_to_string(&mut text).map_err(|e| {
                if e.kind() == std::io::ErrorKind::InvalidData {
                    AjisError::new(AjisErrorKind::InvalidUtf8, TextPosition::START)
                } else {
                    AjisError::io(e, TextPosition::START)
                }
            })?;
            parse_span(&text, settings)
        }
        EngineKind::BufferedStream => {
            let chunk = threshold.clamp(4096, 1 << 26) as usize;
            parse_stream(file, chunk, settings)
        }
        EngineKind::ChunkedFile => {
            // Bounded-memory chunked iteration: the compacting stream reader
            // capped at the chunk threshold.
            let chunk = threshold.clamp(512, 1 << 22) as usize;
            parse_stream(file, chunk, settings)
        }
    }
}

//! Mode-sensitive tokenizer over a [`ByteReader`].
//!
//! One token per call. Whitespace is consumed silently; comments are skipped
//! unless configured for emission; a `#` at column 1 starts a directive when
//! directives are enabled. When the lexer drives a non-final buffer (the
//! async stream parser's re-lex window), running out of bytes anywhere
//! yields `UnexpectedEndOfInput` so the caller can refill and retry.

mod number;
mod string;

use crate::error::{AjisError, AjisErrorKind};
use crate::options::EffectiveSettings;
use crate::position::TextPosition;
use crate::reader::ByteReader;
use crate::segment::{Slice, SliceFlags};
use memchr::memchr2;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    Colon,
    Comma,
    String,
    Number,
    Identifier,
    True,
    False,
    Null,
    Directive,
    Comment,
    End,
}

/// A single token. `text` is present for String, Number, Identifier,
/// Directive, and Comment; absent for punctuation and literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: u64,
    pub line: u32,
    pub column: u32,
    pub text: Option<Slice>,
}

impl Token {
    fn new(kind: TokenKind, pos: TextPosition, text: Option<Slice>) -> Self {
        Self {
            kind,
            offset: pos.offset,
            line: pos.line,
            column: pos.column,
            text,
        }
    }

    fn punct(kind: TokenKind, pos: TextPosition) -> Self {
        Self::new(kind, pos, None)
    }

    pub fn position(&self) -> TextPosition {
        TextPosition {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }
}

pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// The typed-literal shape: an uppercase type prefix followed by digits.
pub(crate) fn is_typed_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let letters = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
    letters > 0
        && letters < bytes.len()
        && bytes[letters..].iter().all(|b| b.is_ascii_digit())
}

pub(crate) struct Lexer<'o, R: ByteReader> {
    pub(crate) reader: R,
    pub(crate) opts: &'o EffectiveSettings,
    /// False only inside the async stream parser's re-lex window, where the
    /// end of the buffer is not necessarily the end of the document.
    pub(crate) final_input: bool,
}

impl<'o, R: ByteReader> Lexer<'o, R> {
    pub(crate) fn new(reader: R, opts: &'o EffectiveSettings) -> Self {
        Self {
            reader,
            opts,
            final_input: true,
        }
    }

    pub(crate) fn new_partial(reader: R, opts: &'o EffectiveSettings) -> Self {
        Self {
            reader,
            opts,
            final_input: false,
        }
    }

    /// Error for running out of bytes: in a non-final buffer always the
    /// refillable `UnexpectedEndOfInput`, otherwise the given hard error.
    pub(crate) fn end_err(
        &self,
        hard: AjisErrorKind,
        hard_pos: TextPosition,
    ) -> AjisError {
        if self.final_input {
            AjisError::new(hard, hard_pos)
        } else {
            AjisError::new(AjisErrorKind::UnexpectedEndOfInput, self.reader.position())
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, AjisError> {
        loop {
            while let Some(b) = self.reader.peek() {
                match b {
                    b' ' | b'\t' | b'\r' | b'\n' => {
                        self.reader.read();
                    }
                    _ => break,
                }
            }
            let start = self.reader.position();
            let Some(b) = self.reader.peek() else {
                return Ok(Token::punct(TokenKind::End, start));
            };
            match b {
                b'{' => return Ok(self.punct_token(TokenKind::ObjectOpen, start)),
                b'}' => return Ok(self.punct_token(TokenKind::ObjectClose, start)),
                b'[' => return Ok(self.punct_token(TokenKind::ArrayOpen, start)),
                b']' => return Ok(self.punct_token(TokenKind::ArrayClose, start)),
                b':' => return Ok(self.punct_token(TokenKind::Colon, start)),
                b',' => return Ok(self.punct_token(TokenKind::Comma, start)),
                b'"' => return self.lex_string(start, b'"'),
                b'\'' => {
                    if self.opts.single_quotes {
                        return self.lex_string(start, b'\'');
                    }
                    return Err(AjisError::new(
                        AjisErrorKind::UnexpectedCharacter('\''),
                        start,
                    ));
                }
                b'/' => {
                    let tok = self.lex_comment(start)?;
                    if self.opts.emit_comments {
                        return Ok(tok);
                    }
                    // skipped as whitespace
                }
                b'#' => {
                    if start.column != 1 {
                        return Err(AjisError::new(
                            AjisErrorKind::UnexpectedCharacter('#'),
                            start,
                        ));
                    }
                    if !self.opts.directives_enabled() {
                        return Err(AjisError::new(AjisErrorKind::DirectiveNotAllowed, start));
                    }
                    return self.lex_directive(start);
                }
                b'-' | b'+' | b'0'..=b'9' => return self.lex_number(start),
                b if is_ident_start(b) => return self.lex_word(start),
                b => {
                    let ch = self.peek_char(b);
                    return Err(AjisError::new(AjisErrorKind::UnexpectedCharacter(ch), start));
                }
            }
        }
    }

    fn punct_token(&mut self, kind: TokenKind, start: TextPosition) -> Token {
        self.reader.read();
        Token::punct(kind, start)
    }

    /// Decode the char at the cursor for error reporting; multi-byte
    /// sequences degrade to U+FFFD when truncated.
    fn peek_char(&mut self, first: u8) -> char {
        if first < 0x80 {
            return first as char;
        }
        let len = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return char::REPLACEMENT_CHARACTER,
        };
        let mut buf = [0u8; 4];
        buf[0] = first;
        for (i, slot) in buf.iter_mut().enumerate().take(len).skip(1) {
            match self.reader.peek_at(i) {
                Some(b) => *slot = b,
                None => return char::REPLACEMENT_CHARACTER,
            }
        }
        std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn check_token_limit(&self, len: usize, start: TextPosition) -> Result<(), AjisError> {
        if let Some(max) = self.opts.max_token_bytes {
            if len > max {
                return Err(AjisError::new(
                    AjisErrorKind::MaxTokenBytesExceeded { limit: max },
                    start,
                ));
            }
        }
        Ok(())
    }

    fn lex_word(&mut self, start: TextPosition) -> Result<Token, AjisError> {
        let mut word = String::new();
        while let Some(b) = self.reader.peek() {
            if !is_ident_continue(b) {
                break;
            }
            word.push(b as char);
            self.reader.read();
            self.check_token_limit(word.len(), start)?;
        }
        if self.reader.peek().is_none() && !self.final_input {
            return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, start));
        }
        // Reclassify assembled text: keywords, IEEE specials, typed
        // literals, then plain identifiers where those are accepted.
        if word == "true" {
            Ok(Token::punct(TokenKind::True, start))
        } else if word == "false" {
            Ok(Token::punct(TokenKind::False, start))
        } else if word == "null" {
            Ok(Token::punct(TokenKind::Null, start))
        } else if (word == "NaN" || word == "Infinity") && self.opts.nan_and_infinity {
            Ok(Token::new(
                TokenKind::Number,
                start,
                Some(Slice::new(word, SliceFlags::empty())),
            ))
        } else if is_typed_literal(&word) {
            Ok(Token::new(
                TokenKind::Number,
                start,
                Some(Slice::new(word, SliceFlags::NUMBER_TYPED)),
            ))
        } else if self.opts.unquoted_names {
            Ok(Token::new(
                TokenKind::Identifier,
                start,
                Some(Slice::new(word, SliceFlags::IDENTIFIER_STYLE)),
            ))
        } else {
            Err(AjisError::new(
                AjisErrorKind::UnexpectedToken {
                    found: TokenKind::Identifier,
                    expected: vec![],
                },
                start,
            ))
        }
    }

    fn lex_comment(&mut self, start: TextPosition) -> Result<Token, AjisError> {
        let marker = self.reader.peek_at(1);
        match marker {
            Some(b'/') => {
                if !self.opts.line_comments {
                    return Err(AjisError::new(AjisErrorKind::CommentNotAllowed, start));
                }
                self.reader.read();
                self.reader.read();
                let content = self.take_line(start, false)?;
                self.comment_token(content, start)
            }
            Some(b'*') => {
                if !self.opts.block_comments {
                    return Err(AjisError::new(AjisErrorKind::CommentNotAllowed, start));
                }
                self.reader.read();
                self.reader.read();
                let mut content = Vec::new();
                loop {
                    // Jump to the next `*` or `/`; everything before it is
                    // plain comment content.
                    let (hit, window_len) = {
                        let window = self.reader.peek_slice();
                        (memchr2(b'*', b'/', window), window.len())
                    };
                    match hit {
                        Some(0) => {}
                        Some(p) => {
                            if let Some(span) = self.reader.read_span(p) {
                                content.extend_from_slice(span);
                            }
                        }
                        None if window_len > 0 => {
                            if let Some(span) = self.reader.read_span(window_len) {
                                content.extend_from_slice(span);
                            }
                            continue;
                        }
                        None => {
                            if !self.final_input {
                                return Err(self.end_err(
                                    AjisErrorKind::UnexpectedEndOfInput,
                                    self.reader.position(),
                                ));
                            }
                            if self.opts.salvage {
                                break;
                            }
                            return Err(AjisError::new(
                                AjisErrorKind::UnterminatedBlockComment,
                                start,
                            ));
                        }
                    }
                    let pos = self.reader.position();
                    let Some(b) = self.reader.read() else {
                        continue;
                    };
                    if b == b'*' && self.reader.peek() == Some(b'/') {
                        self.reader.read();
                        break;
                    }
                    if b == b'/'
                        && self.reader.peek() == Some(b'*')
                        && self.opts.reject_nested_blocks
                    {
                        return Err(AjisError::new(AjisErrorKind::NestedBlockComment, pos));
                    }
                    content.push(b);
                }
                self.comment_token(content, start)
            }
            None if !self.final_input => {
                Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, start))
            }
            _ => Err(AjisError::new(
                AjisErrorKind::UnexpectedCharacter('/'),
                start,
            )),
        }
    }

    /// Consume up to (not including) the next newline, jumping over plain
    /// bytes in bulk. `enforce_limit` applies `max_token_bytes` to the
    /// accumulated content (directives; comments are unbounded).
    fn take_line(
        &mut self,
        start: TextPosition,
        enforce_limit: bool,
    ) -> Result<Vec<u8>, AjisError> {
        let mut content = Vec::new();
        loop {
            let (hit, window_len) = {
                let window = self.reader.peek_slice();
                (memchr2(b'\n', b'\r', window), window.len())
            };
            match hit {
                Some(0) => break,
                Some(p) => {
                    if let Some(span) = self.reader.read_span(p) {
                        content.extend_from_slice(span);
                    }
                    if enforce_limit {
                        self.check_token_limit(content.len(), start)?;
                    }
                    break;
                }
                None if window_len > 0 => {
                    if let Some(span) = self.reader.read_span(window_len) {
                        content.extend_from_slice(span);
                    }
                    if enforce_limit {
                        self.check_token_limit(content.len(), start)?;
                    }
                }
                None => {
                    if !self.final_input {
                        return Err(self.end_err(
                            AjisErrorKind::UnexpectedEndOfInput,
                            self.reader.position(),
                        ));
                    }
                    // Newline-free tail: the line ends with the input.
                    break;
                }
            }
        }
        Ok(content)
    }

    fn comment_token(&self, content: Vec<u8>, start: TextPosition) -> Result<Token, AjisError> {
        let text = String::from_utf8(content)
            .map_err(|_| AjisError::new(AjisErrorKind::InvalidUtf8, start))?;
        Ok(Token::new(
            TokenKind::Comment,
            start,
            Some(Slice::classified(text)),
        ))
    }

    fn lex_directive(&mut self, start: TextPosition) -> Result<Token, AjisError> {
        self.reader.read(); // '#'
        let content = self.take_line(start, true)?;
        let text = String::from_utf8(content)
            .map_err(|_| AjisError::new(AjisErrorKind::InvalidUtf8, start))?;
        Ok(Token::new(
            TokenKind::Directive,
            start,
            Some(Slice::classified(text.trim().to_string())),
        ))
    }
}

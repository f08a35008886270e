//! String scanning: quote matching, escape decode or verbatim preservation,
//! multiline/control-byte policy, and Lax end-of-input salvage.

use super::{Lexer, Token, TokenKind};
use crate::error::{AjisError, AjisErrorKind};
use crate::position::TextPosition;
use crate::reader::ByteReader;
use crate::segment::{Slice, SliceFlags};

impl<R: ByteReader> Lexer<'_, R> {
    pub(super) fn lex_string(
        &mut self,
        start: TextPosition,
        quote: u8,
    ) -> Result<Token, AjisError> {
        self.reader.read(); // opening quote
        let mut out: Vec<u8> = Vec::new();
        let mut flags = SliceFlags::empty();

        loop {
            let pos = self.reader.position();
            let Some(b) = self.reader.peek() else {
                if !self.final_input {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, pos));
                }
                if self.opts.salvage {
                    break; // partial string, emitted as valid
                }
                return Err(AjisError::new(AjisErrorKind::UnterminatedString, start));
            };
            if b == quote {
                self.reader.read();
                break;
            }
            if b == b'\\' {
                flags |= SliceFlags::HAS_ESCAPES;
                self.reader.read();
                if self.opts.decode_escapes {
                    self.decode_escape(&mut out, pos)?;
                } else {
                    // Verbatim pass-through; the escaped byte is consumed so
                    // a quoted delimiter cannot terminate the string.
                    out.push(b'\\');
                    match self.reader.read() {
                        Some(e) => out.push(e),
                        None => {
                            if !self.final_input {
                                return Err(
                                    self.end_err(AjisErrorKind::UnexpectedEndOfInput, pos)
                                );
                            }
                            if self.opts.salvage {
                                break;
                            }
                            return Err(AjisError::new(
                                AjisErrorKind::UnterminatedString,
                                start,
                            ));
                        }
                    }
                }
            } else if b < 0x20 {
                if !self.opts.multiline_strings {
                    return Err(AjisError::new(
                        AjisErrorKind::ControlCharacterInString,
                        pos,
                    ));
                }
                out.push(b);
                self.reader.read();
            } else {
                out.push(b);
                self.reader.read();
            }
            self.check_string_limits(out.len(), start)?;
        }

        if out.iter().any(|&b| b > 0x7F) {
            flags |= SliceFlags::HAS_NON_ASCII;
        }
        let text = String::from_utf8(out)
            .map_err(|_| AjisError::new(AjisErrorKind::InvalidUtf8, start))?;
        Ok(Token::new(
            TokenKind::String,
            start,
            Some(Slice::new(text, flags)),
        ))
    }

    fn check_string_limits(&self, len: usize, start: TextPosition) -> Result<(), AjisError> {
        if let Some(max) = self.opts.max_string_bytes {
            if len > max {
                return Err(AjisError::new(
                    AjisErrorKind::MaxStringBytesExceeded { limit: max },
                    start,
                ));
            }
        }
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

    /// Decode one escape sequence; the backslash is already consumed and
    /// `esc_pos` points at it.
    fn decode_escape(&mut self, out: &mut Vec<u8>, esc_pos: TextPosition) -> Result<(), AjisError> {
        let Some(e) = self.reader.read() else {
            if !self.final_input {
                return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, esc_pos));
            }
            if self.opts.salvage {
                return Ok(()); // dangling backslash at end of input
            }
            return Err(AjisError::new(AjisErrorKind::UnterminatedString, esc_pos));
        };
        match e {
            b'"' => out.push(b'"'),
            b'\'' => out.push(b'\''),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => return self.decode_unicode_escape(out, esc_pos),
            other => {
                if self.opts.salvage {
                    // Lax keeps unknown escapes literally.
                    out.push(other);
                } else {
                    return Err(AjisError::new(
                        AjisErrorKind::InvalidEscapeSequence,
                        esc_pos,
                    ));
                }
            }
        }
        Ok(())
    }

    /// `\uXXXX` with surrogate-pair handling; the `u` is already consumed.
    fn decode_unicode_escape(
        &mut self,
        out: &mut Vec<u8>,
        esc_pos: TextPosition,
    ) -> Result<(), AjisError> {
        let Some(hi) = self.peek_hex4(0, esc_pos)? else {
            // Not four hex digits: hard error, or literal `u` in Lax.
            if self.opts.salvage {
                out.push(b'u');
                return Ok(());
            }
            return Err(AjisError::new(
                AjisErrorKind::InvalidEscapeSequence,
                esc_pos,
            ));
        };
        if !(0xD800..=0xDFFF).contains(&hi) {
            self.consume_ascii(4);
            push_scalar(out, hi as u32);
            return Ok(());
        }
        if (0xD800..=0xDBFF).contains(&hi) {
            // High surrogate: a low surrogate must follow as `\uXXXX`.
            let next_is_escape = match (self.reader.peek_at(4), self.reader.peek_at(5)) {
                (Some(b'\\'), Some(b'u')) => true,
                (None, _) | (_, None) if !self.final_input => {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, esc_pos));
                }
                _ => false,
            };
            if next_is_escape {
                if let Some(lo) = self.peek_hex4(6, esc_pos)? {
                    if (0xDC00..=0xDFFF).contains(&lo) {
                        self.consume_ascii(10);
                        let code = 0x1_0000
                            + (((hi as u32 - 0xD800) << 10) | (lo as u32 - 0xDC00));
                        push_scalar(out, code);
                        return Ok(());
                    }
                }
            }
        }
        // Lone or inverted surrogate.
        if self.opts.salvage {
            self.consume_ascii(4);
            push_scalar(out, char::REPLACEMENT_CHARACTER as u32);
            return Ok(());
        }
        Err(AjisError::new(
            AjisErrorKind::InvalidEscapeSequence,
            esc_pos,
        ))
    }

    /// Peek four hex digits starting `ahead` bytes past the cursor. Returns
    /// `Ok(None)` when the bytes are present but not hex.
    fn peek_hex4(
        &mut self,
        ahead: usize,
        esc_pos: TextPosition,
    ) -> Result<Option<u16>, AjisError> {
        let mut value: u16 = 0;
        for i in 0..4 {
            match self.reader.peek_at(ahead + i) {
                Some(h) if h.is_ascii_hexdigit() => {
                    value = value << 4 | (h as char).to_digit(16).unwrap_or(0) as u16;
                }
                None if !self.final_input => {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, esc_pos));
                }
                _ => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    fn consume_ascii(&mut self, n: usize) {
        for _ in 0..n {
            self.reader.read();
        }
    }
}

fn push_scalar(out: &mut Vec<u8>, code: u32) {
    if let Some(c) = char::from_u32(code) {
        let mut buf = [0u8; 4];
        out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }
}

//! Number scanning: signs, IEEE specials, base prefixes, digit separators
//! with optional grouping enforcement, and decimal fraction/exponent parts.
//! Typed literals (`T1707489221`) arrive through the identifier path in
//! `mod.rs` and never reach this scanner.

use super::{Lexer, Token, TokenKind, is_ident_continue};
use crate::error::{AjisError, AjisErrorKind};
use crate::position::TextPosition;
use crate::reader::ByteReader;
use crate::segment::{Slice, SliceFlags};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Base {
    Binary,
    Octal,
    Hex,
    Decimal,
}

impl Base {
    fn digit_ok(self, b: u8) -> bool {
        match self {
            Base::Binary => b == b'0' || b == b'1',
            Base::Octal => (b'0'..=b'7').contains(&b),
            Base::Hex => b.is_ascii_hexdigit(),
            Base::Decimal => b.is_ascii_digit(),
        }
    }

    fn flag(self) -> SliceFlags {
        match self {
            Base::Binary => SliceFlags::NUMBER_BINARY,
            Base::Octal => SliceFlags::NUMBER_OCTAL,
            Base::Hex => SliceFlags::NUMBER_HEX,
            Base::Decimal => SliceFlags::empty(),
        }
    }
}

impl<R: ByteReader> Lexer<'_, R> {
    pub(super) fn lex_number(&mut self, start: TextPosition) -> Result<Token, AjisError> {
        let mut raw = String::new();

        match self.reader.peek() {
            Some(b'-') => {
                self.reader.read();
                raw.push('-');
            }
            Some(b'+') => {
                if !self.opts.leading_plus {
                    return Err(AjisError::new(AjisErrorKind::UnexpectedCharacter('+'), start));
                }
                self.reader.read();
                raw.push('+');
            }
            _ => {}
        }

        // Signed IEEE specials: only Infinity may carry a sign.
        match self.reader.peek() {
            Some(b) if b.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(b) = self.reader.peek() {
                    if !is_ident_continue(b) {
                        break;
                    }
                    word.push(b as char);
                    self.reader.read();
                    self.check_token_limit(raw.len() + word.len(), start)?;
                }
                if self.reader.peek().is_none() && !self.final_input {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, start));
                }
                if word == "Infinity" && self.opts.nan_and_infinity {
                    raw.push_str(&word);
                    return Ok(Token::new(
                        TokenKind::Number,
                        start,
                        Some(Slice::new(raw, SliceFlags::empty())),
                    ));
                }
                return Err(AjisError::new(AjisErrorKind::InvalidNumber, start));
            }
            Some(b) if b.is_ascii_digit() => {}
            Some(_) | None => {
                if self.reader.peek().is_none() && !self.final_input {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, start));
                }
                return Err(AjisError::new(AjisErrorKind::InvalidNumber, start));
            }
        }

        // Base-prefixed integers.
        if self.reader.peek() == Some(b'0') {
            if let Some(p) = self.reader.peek_at(1) {
                let base = match p {
                    b'b' | b'B' => Some(Base::Binary),
                    b'o' | b'O' => Some(Base::Octal),
                    b'x' | b'X' => Some(Base::Hex),
                    _ => None,
                };
                if let Some(base) = base {
                    if !self.opts.base_prefixes {
                        return Err(AjisError::new(AjisErrorKind::InvalidBasePrefix, start));
                    }
                    raw.push(self.read_ascii());
                    raw.push(self.read_ascii());
                    let run = self.scan_digit_run(&mut raw, base, start)?;
                    if run.is_empty() {
                        return Err(AjisError::new(AjisErrorKind::InvalidBasePrefix, start));
                    }
                    if self.opts.enforce_grouping {
                        validate_grouping(&run, base, start)?;
                    }
                    return Ok(Token::new(
                        TokenKind::Number,
                        start,
                        Some(Slice::new(raw, base.flag())),
                    ));
                }
            } else if !self.final_input {
                // `0` at the buffer tail could still grow a prefix.
                return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, start));
            }
        }

        // Decimal integer part.
        let int_run = self.scan_digit_run(&mut raw, Base::Decimal, start)?;
        if int_run.is_empty() {
            return Err(AjisError::new(AjisErrorKind::InvalidNumber, start));
        }
        if int_run.len() > 1 && int_run.as_bytes()[0] == b'0' && int_run.as_bytes()[1].is_ascii_digit()
        {
            return Err(AjisError::new(AjisErrorKind::InvalidNumber, start));
        }
        if self.opts.enforce_grouping {
            validate_grouping(&int_run, Base::Decimal, start)?;
        }

        // Optional fraction: `.` must be followed by a digit.
        if self.reader.peek() == Some(b'.') {
            let dot_pos = self.reader.position();
            match self.reader.peek_at(1) {
                Some(d) if d.is_ascii_digit() => {
                    raw.push(self.read_ascii());
                    self.scan_digit_run(&mut raw, Base::Decimal, start)?;
                }
                None if !self.final_input => {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, dot_pos));
                }
                _ => return Err(AjisError::new(AjisErrorKind::InvalidNumber, dot_pos)),
            }
        }

        // Optional exponent.
        if matches!(self.reader.peek(), Some(b'e') | Some(b'E')) {
            let exp_pos = self.reader.position();
            let mut ahead = 1usize;
            if matches!(self.reader.peek_at(1), Some(b'+') | Some(b'-')) {
                ahead = 2;
            }
            match self.reader.peek_at(ahead) {
                Some(d) if d.is_ascii_digit() => {
                    for _ in 0..ahead {
                        raw.push(self.read_ascii());
                    }
                    self.scan_digit_run(&mut raw, Base::Decimal, start)?;
                }
                None if !self.final_input => {
                    return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, exp_pos));
                }
                _ => return Err(AjisError::new(AjisErrorKind::InvalidNumber, exp_pos)),
            }
        }

        if self.reader.peek().is_none() && !self.final_input {
            return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, start));
        }
        self.check_token_limit(raw.len(), start)?;
        Ok(Token::new(
            TokenKind::Number,
            start,
            Some(Slice::new(raw, SliceFlags::empty())),
        ))
    }

    fn read_ascii(&mut self) -> char {
        self.reader.read().unwrap_or(0) as char
    }

    /// Scan a run of digits in `base`, with `_` separators between digits
    /// when enabled. Appends to `raw` and returns just the run (digits and
    /// separators) for grouping validation.
    fn scan_digit_run(
        &mut self,
        raw: &mut String,
        base: Base,
        start: TextPosition,
    ) -> Result<String, AjisError> {
        let mut run = String::new();
        loop {
            match self.reader.peek() {
                Some(b) if base.digit_ok(b) => {
                    run.push(b as char);
                    raw.push(b as char);
                    self.reader.read();
                    self.check_token_limit(raw.len(), start)?;
                }
                Some(b'_') => {
                    let pos = self.reader.position();
                    if !self.opts.digit_separators {
                        return Err(AjisError::new(AjisErrorKind::InvalidDigitSeparator, pos));
                    }
                    // A separator must sit between two digits of the run.
                    if !run.ends_with(|c: char| base.digit_ok(c as u8)) {
                        return Err(AjisError::new(AjisErrorKind::InvalidDigitSeparator, pos));
                    }
                    match self.reader.peek_at(1) {
                        Some(d) if base.digit_ok(d) => {
                            run.push('_');
                            raw.push('_');
                            self.reader.read();
                        }
                        None if !self.final_input => {
                            return Err(self.end_err(AjisErrorKind::UnexpectedEndOfInput, pos));
                        }
                        _ => {
                            return Err(AjisError::new(
                                AjisErrorKind::InvalidDigitSeparator,
                                pos,
                            ));
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(run)
    }
}

/// Group-size rules: decimal ≤3 with the leftmost group possibly shorter,
/// binary 4, octal 3, hex uniformly 2 or 4 across non-leading groups with a
/// possibly-shorter leading group. A run with no separator is unconstrained.
fn validate_grouping(run: &str, base: Base, start: TextPosition) -> Result<(), AjisError> {
    if !run.contains('_') {
        return Ok(());
    }
    let groups: Vec<&str> = run.split('_').collect();
    let bad = || AjisError::new(AjisErrorKind::InvalidDigitSeparator, start);
    let uniform = |size: usize| -> bool {
        groups[1..].iter().all(|g| g.len() == size)
            && !groups[0].is_empty()
            && groups[0].len() <= size
    };
    match base {
        Base::Decimal | Base::Octal => {
            if !uniform(3) {
                return Err(bad());
            }
        }
        Base::Binary => {
            if !uniform(4) {
                return Err(bad());
            }
        }
        Base::Hex => {
            let size = groups.last().map(|g| g.len()).unwrap_or(0);
            if (size != 2 && size != 4) || !uniform(size) {
                return Err(bad());
            }
        }
    }
    Ok(())
}

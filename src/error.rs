//! Error taxonomy with stable numeric codes.
//!
//! Codes group by family: 1000s structure, 2000s string, 3000s number,
//! 4000s collection, 5000s host. Every error carries the [`TextPosition`]
//! of the byte that triggered it.

use crate::events::TextProvider;
use crate::lexer::TokenKind;
use crate::position::TextPosition;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AjisErrorKind {
    // Structure (1000s)
    #[error("unexpected {found:?}, expected one of {expected:?}")]
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("maximum nesting depth {limit} exceeded")]
    MaxDepthExceeded { limit: u32 },
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("nested block comments are not allowed")]
    NestedBlockComment,
    #[error("comments are not allowed here")]
    CommentNotAllowed,
    #[error("directives are not allowed here")]
    DirectiveNotAllowed,
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),

    // String (2000s)
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence")]
    InvalidEscapeSequence,
    #[error("control character in string")]
    ControlCharacterInString,

    // Number (3000s)
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid base prefix")]
    InvalidBasePrefix,
    #[error("invalid digit separator placement")]
    InvalidDigitSeparator,

    // Collection (4000s)
    #[error("duplicate object key {0:?}")]
    DuplicateKey(String),
    #[error("trailing comma is not allowed")]
    TrailingCommaNotAllowed,

    // Host (5000s)
    #[error("input not supported: {0}")]
    InputNotSupported(String),
    #[error("visitor aborted the parse")]
    VisitorAbort,
    #[error("token exceeds the {limit}-byte limit")]
    MaxTokenBytesExceeded { limit: usize },
    #[error("string exceeds the {limit}-byte limit")]
    MaxStringBytesExceeded { limit: usize },
    #[error("property name exceeds the {limit}-byte limit")]
    MaxPropertyNameBytesExceeded { limit: usize },
    #[error("parse cancelled")]
    Cancelled,
    #[error("invalid UTF-8 in input")]
    InvalidUtf8,
    #[error("io error: {0}")]
    Io(String),
}

impl AjisErrorKind {
    /// Stable numeric code; the thousands digit selects the family.
    pub fn code(&self) -> u16 {
        use AjisErrorKind::*;
        match self {
            UnexpectedToken { .. } => 1001,
            UnexpectedEndOfInput => 1002,
            MaxDepthExceeded { .. } => 1003,
            UnterminatedBlockComment => 1004,
            NestedBlockComment => 1005,
            CommentNotAllowed => 1006,
            DirectiveNotAllowed => 1007,
            UnexpectedCharacter(_) => 1008,
            UnterminatedString => 2001,
            InvalidEscapeSequence => 2002,
            ControlCharacterInString => 2003,
            InvalidNumber => 3001,
            InvalidBasePrefix => 3002,
            InvalidDigitSeparator => 3003,
            DuplicateKey(_) => 4001,
            TrailingCommaNotAllowed => 4002,
            InputNotSupported(_) => 5001,
            VisitorAbort => 5002,
            MaxTokenBytesExceeded { .. } => 5003,
            MaxStringBytesExceeded { .. } => 5004,
            MaxPropertyNameBytesExceeded { .. } => 5005,
            Cancelled => 5006,
            InvalidUtf8 => 5007,
            Io(_) => 5008,
        }
    }

    /// Opaque message key for host-side localisation.
    pub fn message_key(&self) -> &'static str {
        use AjisErrorKind::*;
        match self {
            UnexpectedToken { .. } => "ajis.error.unexpected_token",
            UnexpectedEndOfInput => "ajis.error.unexpected_end_of_input",
            MaxDepthExceeded { .. } => "ajis.error.max_depth_exceeded",
            UnterminatedBlockComment => "ajis.error.unterminated_block_comment",
            NestedBlockComment => "ajis.error.nested_block_comment",
            CommentNotAllowed => "ajis.error.comment_not_allowed",
            DirectiveNotAllowed => "ajis.error.directive_not_allowed",
            UnexpectedCharacter(_) => "ajis.error.unexpected_character",
            UnterminatedString => "ajis.error.unterminated_string",
            InvalidEscapeSequence => "ajis.error.invalid_escape_sequence",
            ControlCharacterInString => "ajis.error.control_character_in_string",
            InvalidNumber => "ajis.error.invalid_number",
            InvalidBasePrefix => "ajis.error.invalid_base_prefix",
            InvalidDigitSeparator => "ajis.error.invalid_digit_separator",
            DuplicateKey(_) => "ajis.error.duplicate_key",
            TrailingCommaNotAllowed => "ajis.error.trailing_comma_not_allowed",
            InputNotSupported(_) => "ajis.error.input_not_supported",
            VisitorAbort => "ajis.error.visitor_abort",
            MaxTokenBytesExceeded { .. } => "ajis.error.max_token_bytes_exceeded",
            MaxStringBytesExceeded { .. } => "ajis.error.max_string_bytes_exceeded",
            MaxPropertyNameBytesExceeded { .. } => "ajis.error.max_property_name_bytes_exceeded",
            Cancelled => "ajis.error.cancelled",
            InvalidUtf8 => "ajis.error.invalid_utf8",
            Io(_) => "ajis.error.io",
        }
    }
}

/// A parse error with the position of the offending byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct AjisError {
    pub kind: AjisErrorKind,
    pub position: TextPosition,
}

impl AjisError {
    pub fn new(kind: AjisErrorKind, position: TextPosition) -> Self {
        Self { kind, position }
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message_key(&self) -> &'static str {
        self.kind.message_key()
    }

    /// Resolve the user-visible message through an optional text provider.
    /// Without a provider (or when the key is unknown to it) the key itself
    /// is returned.
    pub fn resolve_message(&self, provider: Option<&dyn TextProvider>) -> String {
        let key = self.message_key();
        provider
            .and_then(|p| p.resolve(key))
            .unwrap_or_else(|| key.to_string())
    }

    pub(crate) fn io(err: std::io::Error, position: TextPosition) -> Self {
        Self::new(AjisErrorKind::Io(err.to_string()), position)
    }
}

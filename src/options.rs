//! Parse settings: the total option surface consumed by the core, plus the
//! mode presets that collapse it.

use crate::events::{EventSink, TextProvider};
use std::sync::Arc;

/// Textual strictness mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextMode {
    /// RFC-8259 strict: no comments, directives, single quotes, unquoted
    /// keys, trailing commas, base prefixes, separators, NaN/Infinity,
    /// leading `+`, or multiline strings; escapes are always decoded.
    Json,
    /// AJIS defaults; every extension individually configurable.
    #[default]
    Ajis,
    /// JavaScript-tolerant: unquoted keys, single quotes, trailing commas,
    /// comments, multiline strings, and salvage of unterminated strings,
    /// unterminated block comments, and missing closing brackets.
    Lax,
}

/// Execution profile consumed by the engine selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParserProfile {
    #[default]
    Universal,
    LowMemory,
    HighThroughput,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberOptions {
    /// Accept `0b`/`0o`/`0x` base-prefixed integers.
    pub enable_base_prefixes: bool,
    /// Accept `_` separators between digits.
    pub enable_digit_separators: bool,
    /// Additionally enforce group sizes: decimal ≤3 (leftmost may be
    /// shorter), binary 4, octal 3, hex uniformly 2 or 4.
    pub enforce_separator_grouping_rules: bool,
    /// Accept `NaN` and `Infinity` (signed `Infinity` only; `NaN` never
    /// carries a sign).
    pub allow_nan_and_infinity: bool,
    /// Accept a leading `+` on numbers.
    pub allow_leading_plus: bool,
    /// Upper bound on any assembled token's byte length. `None` = unlimited.
    pub max_token_bytes: Option<usize>,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            enable_base_prefixes: true,
            enable_digit_separators: true,
            enforce_separator_grouping_rules: false,
            allow_nan_and_infinity: true,
            allow_leading_plus: true,
            max_token_bytes: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringOptions {
    /// Accept raw newlines and other control bytes inside strings.
    pub allow_multiline: bool,
    /// Decode escape sequences. When false, escapes pass through verbatim
    /// (the `HAS_ESCAPES` flag is still set).
    pub enable_escapes: bool,
    /// Accept `'`-delimited strings.
    pub allow_single_quotes: bool,
    /// Accept bare `[A-Za-z_$][A-Za-z0-9_$]*` property names.
    pub allow_unquoted_property_names: bool,
    /// Upper bound on a string's content bytes. `None` = unlimited.
    pub max_string_bytes: Option<usize>,
    /// Upper bound on a property name's content bytes. `None` = unlimited.
    pub max_property_name_bytes: Option<usize>,
}

impl Default for StringOptions {
    fn default() -> Self {
        Self {
            allow_multiline: true,
            enable_escapes: true,
            allow_single_quotes: true,
            allow_unquoted_property_names: true,
            max_string_bytes: None,
            max_property_name_bytes: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentOptions {
    /// Accept `// …` comments running to end of line.
    pub allow_line_comments: bool,
    /// Accept `/* … */` comments.
    pub allow_block_comments: bool,
    /// Treat `/*` inside a block comment as an error.
    pub reject_nested_block_comments: bool,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            allow_line_comments: true,
            allow_block_comments: true,
            reject_nested_block_comments: true,
        }
    }
}

/// The full settings object consumed by the parsing entry points.
///
/// Cloning is cheap (the sink and provider are shared handles). Mode presets
/// never mutate the stored fields; [`Settings::effective`] computes the
/// resolved view.
#[derive(Clone)]
pub struct Settings {
    pub text_mode: TextMode,
    pub parser_profile: ParserProfile,
    /// When true, duplicate keys only raise a diagnostic through the event
    /// sink; when false they are a hard `DuplicateKey` error.
    pub allow_duplicate_keys: bool,
    /// Forced true in `Lax`, forced false in `Json`.
    pub allow_trailing_commas: bool,
    /// Forced false in `Json`.
    pub allow_directives: bool,
    pub max_depth: u32,
    /// Cutover between single-pass span parsing and buffered chunked
    /// parsing, e.g. `"64k"`. Suffixes `k`/`M`/`G` are powers of 1024.
    pub stream_chunk_threshold: String,
    pub numbers: NumberOptions,
    pub strings: StringOptions,
    pub comments: CommentOptions,
    /// Keep escape sequences verbatim in string slices instead of decoding.
    pub preserve_string_escapes: bool,
    pub emit_comment_segments: bool,
    pub emit_directive_segments: bool,
    pub event_sink: Option<Arc<dyn EventSink>>,
    pub text_provider: Option<Arc<dyn TextProvider>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_mode: TextMode::Ajis,
            parser_profile: ParserProfile::Universal,
            allow_duplicate_keys: false,
            allow_trailing_commas: false,
            allow_directives: true,
            max_depth: 256,
            stream_chunk_threshold: "64k".to_string(),
            numbers: NumberOptions::default(),
            strings: StringOptions::default(),
            comments: CommentOptions::default(),
            preserve_string_escapes: false,
            emit_comment_segments: false,
            emit_directive_segments: false,
            event_sink: None,
            text_provider: None,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("text_mode", &self.text_mode)
            .field("parser_profile", &self.parser_profile)
            .field("allow_duplicate_keys", &self.allow_duplicate_keys)
            .field("allow_trailing_commas", &self.allow_trailing_commas)
            .field("allow_directives", &self.allow_directives)
            .field("max_depth", &self.max_depth)
            .field("stream_chunk_threshold", &self.stream_chunk_threshold)
            .field("numbers", &self.numbers)
            .field("strings", &self.strings)
            .field("comments", &self.comments)
            .field("preserve_string_escapes", &self.preserve_string_escapes)
            .field("emit_comment_segments", &self.emit_comment_segments)
            .field("emit_directive_segments", &self.emit_directive_segments)
            .field("event_sink", &self.event_sink.as_ref().map(|_| ".."))
            .field("text_provider", &self.text_provider.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Settings {
    /// RFC-8259 strict preset.
    pub fn json() -> Self {
        Self {
            text_mode: TextMode::Json,
            ..Self::default()
        }
    }

    /// AJIS defaults preset.
    pub fn ajis() -> Self {
        Self::default()
    }

    /// JavaScript-tolerant preset.
    pub fn lax() -> Self {
        Self {
            text_mode: TextMode::Lax,
            ..Self::default()
        }
    }

    /// Resolve the mode overrides into the flat view the lexer and parser
    /// consume. Options not listed by the mode keep their configured values.
    pub fn effective(&self) -> EffectiveSettings {
        let mut eff = EffectiveSettings {
            mode: self.text_mode,
            allow_duplicate_keys: self.allow_duplicate_keys,
            allow_trailing_commas: self.allow_trailing_commas,
            allow_directives: self.allow_directives,
            max_depth: self.max_depth,
            base_prefixes: self.numbers.enable_base_prefixes,
            digit_separators: self.numbers.enable_digit_separators,
            enforce_grouping: self.numbers.enforce_separator_grouping_rules,
            nan_and_infinity: self.numbers.allow_nan_and_infinity,
            leading_plus: self.numbers.allow_leading_plus,
            max_token_bytes: self.numbers.max_token_bytes,
            multiline_strings: self.strings.allow_multiline,
            decode_escapes: self.strings.enable_escapes && !self.preserve_string_escapes,
            single_quotes: self.strings.allow_single_quotes,
            unquoted_names: self.strings.allow_unquoted_property_names,
            max_string_bytes: self.strings.max_string_bytes,
            max_property_name_bytes: self.strings.max_property_name_bytes,
            line_comments: self.comments.allow_line_comments,
            block_comments: self.comments.allow_block_comments,
            reject_nested_blocks: self.comments.reject_nested_block_comments,
            preserve_escapes: self.preserve_string_escapes,
            emit_comments: self.emit_comment_segments,
            emit_directives: self.emit_directive_segments,
            salvage: false,
        };
        match self.text_mode {
            TextMode::Json => {
                eff.allow_trailing_commas = false;
                eff.allow_directives = false;
                eff.base_prefixes = false;
                eff.digit_separators = false;
                eff.nan_and_infinity = false;
                eff.leading_plus = false;
                eff.multiline_strings = false;
                eff.decode_escapes = true;
                eff.preserve_escapes = false;
                eff.single_quotes = false;
                eff.unquoted_names = false;
                eff.line_comments = false;
                eff.block_comments = false;
                eff.emit_comments = false;
                eff.emit_directives = false;
            }
            TextMode::Ajis => {}
            TextMode::Lax => {
                eff.allow_trailing_commas = true;
                eff.unquoted_names = true;
                eff.single_quotes = true;
                eff.multiline_strings = true;
                eff.line_comments = true;
                eff.block_comments = true;
                eff.salvage = true;
            }
        }
        eff
    }
}

/// The flat post-mode-override option view. Every field is fully resolved;
/// lexer and parser consult this and never the raw [`Settings`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub mode: TextMode,
    pub allow_duplicate_keys: bool,
    pub allow_trailing_commas: bool,
    pub allow_directives: bool,
    pub max_depth: u32,
    pub base_prefixes: bool,
    pub digit_separators: bool,
    pub enforce_grouping: bool,
    pub nan_and_infinity: bool,
    pub leading_plus: bool,
    pub max_token_bytes: Option<usize>,
    pub multiline_strings: bool,
    pub decode_escapes: bool,
    pub single_quotes: bool,
    pub unquoted_names: bool,
    pub max_string_bytes: Option<usize>,
    pub max_property_name_bytes: Option<usize>,
    pub line_comments: bool,
    pub block_comments: bool,
    pub reject_nested_blocks: bool,
    pub preserve_escapes: bool,
    pub emit_comments: bool,
    pub emit_directives: bool,
    /// Lax-mode salvage of unterminated strings, unterminated block
    /// comments, and missing closing brackets.
    pub salvage: bool,
}

impl EffectiveSettings {
    pub(crate) fn directives_enabled(&self) -> bool {
        self.allow_directives && self.mode != TextMode::Json
    }
}

//! Directive lines: `#<namespace> <verb> [key=value ...]`.
//!
//! A directive's content (after the `#`) splits on whitespace. The namespace
//! compares case-insensitively through [`Directive::canonical_namespace`];
//! arguments are bare tokens or `key=value` pairs. The `ajis` namespace can
//! override parse settings ahead of a re-parse (see
//! [`parse_segments_with_directives`](crate::parse_segments_with_directives)).

use crate::options::{Settings, TextMode};

/// One argument token of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveArg {
    /// Present for `key=value` tokens, absent for bare ones.
    pub key: Option<String>,
    pub value: String,
}

/// A parsed directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub namespace: String,
    pub verb: Option<String>,
    pub args: Vec<DirectiveArg>,
}

impl Directive {
    /// Parse directive content (the text after the `#` marker, trimmed).
    /// Returns `None` for an empty line.
    pub fn parse(content: &str) -> Option<Directive> {
        let mut parts = content.split_whitespace();
        let namespace = parts.next()?.to_string();
        let verb = parts.next().map(|v| v.to_string());
        let args = parts
            .map(|tok| match tok.split_once('=') {
                Some((k, v)) => DirectiveArg {
                    key: Some(k.to_string()),
                    value: v.to_string(),
                },
                None => DirectiveArg {
                    key: None,
                    value: tok.to_string(),
                },
            })
            .collect();
        Some(Directive {
            namespace,
            verb,
            args,
        })
    }

    /// Uppercased namespace for canonical comparison.
    pub fn canonical_namespace(&self) -> String {
        self.namespace.to_ascii_uppercase()
    }

    /// First argument value, whether bare or `key=value`.
    pub fn first_value(&self) -> Option<&str> {
        self.args.first().map(|a| a.value.as_str())
    }

    /// Apply an `ajis`-namespace directive to settings. Unknown namespaces,
    /// verbs, and values are ignored; directives advise, they do not fail a
    /// parse.
    pub fn apply_to(&self, settings: &mut Settings) {
        if self.canonical_namespace() != "AJIS" {
            return;
        }
        match self.verb.as_deref() {
            Some("mode") => {
                if let Some(value) = self.first_value() {
                    match value.to_ascii_lowercase().as_str() {
                        "json" => settings.text_mode = TextMode::Json,
                        "ajis" => settings.text_mode = TextMode::Ajis,
                        "lax" | "lex" => settings.text_mode = TextMode::Lax,
                        _ => {}
                    }
                }
            }
            Some("trailing-commas") => {
                if let Some(value) = self.first_value() {
                    match value {
                        "on" | "true" => settings.allow_trailing_commas = true,
                        "off" | "false" => settings.allow_trailing_commas = false,
                        _ => {}
                    }
                }
            }
            Some("comments") => {
                if let Some(value) = self.first_value() {
                    match value {
                        "on" | "true" => {
                            settings.comments.allow_line_comments = true;
                            settings.comments.allow_block_comments = true;
                        }
                        "off" | "false" => {
                            settings.comments.allow_line_comments = false;
                            settings.comments.allow_block_comments = false;
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

/// Textually scan the leading directive lines of a document: blank lines and
/// `#` lines before the first value. Stops at the first line that starts
/// anything else, so a failed parse under the pre-override settings cannot
/// hide the overrides themselves.
pub(crate) fn scan_leading_directives(input: &str) -> Vec<Directive> {
    let mut out = Vec::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix('#') else {
            break;
        };
        if let Some(d) = Directive::parse(rest.trim()) {
            out.push(d);
        }
    }
    out
}

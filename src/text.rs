//! Query and description text normalization.
//!
//! Every text that lands in a training record goes through a [`TextNormalizer`].
//! Implementations must be pure and idempotent.

use std::sync::OnceLock;

use regex::Regex;

static NON_WORD: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();

fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("static pattern compiles"))
}

fn whitespace() -> &'static Regex {
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern compiles"))
}

/// Replaces tabs and line breaks with spaces so `text` fits in one field of a
/// line-oriented file.
#[must_use]
pub fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// Text-to-text cleanup applied to queries and documents.
pub trait TextNormalizer: Send + Sync {
    /// Returns the normalized form of `text`.
    fn normalize(&self, text: &str) -> String;
}

impl<F> TextNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

/// Default normalizer: lowercase, punctuation to spaces, collapsed whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextProcessor;

impl TextProcessor {
    /// Creates the default processor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TextNormalizer for TextProcessor {
    fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped = non_word().replace_all(&lowered, " ");
        whitespace().replace_all(stripped.trim(), " ").into_owned()
    }
}

/// Normalizer that returns its input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Verbatim;

impl TextNormalizer for Verbatim {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}

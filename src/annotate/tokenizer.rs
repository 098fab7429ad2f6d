//! Word tokenizer

use crate::domain::offset::CharOffsets;
use regex::Regex;
use serde::Serialize;

/// A token with char offsets into the tokenized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub start_char: usize,
    pub end_char: usize,
    pub text: String,
}

/// Splits text into tokens. Must be deterministic and side-effect free.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text`, returning tokens in text order
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Tokens are maximal runs of word characters, or single punctuation characters.
/// Whitespace is dropped.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pattern: Regex,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\w+|[^\w\s]").expect("tokenizer pattern is valid"),
        }
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let offsets = CharOffsets::new(text);
        self.pattern
            .find_iter(text)
            .filter_map(|m| {
                Some(Token {
                    start_char: offsets.byte_to_char(m.start())?,
                    end_char: offsets.byte_to_char(m.end())?,
                    text: m.as_str().to_string(),
                })
            })
            .collect()
    }
}

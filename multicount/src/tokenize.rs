//! Splits free text into tokens on a fixed delimiter class.

use regex::Regex;

/// Delimiters: space, square brackets, parentheses, comma, period.
const DELIMITERS: &str = r"[ \[\](),.]";

/// Regex-class tokenizer.  Consecutive, leading, or trailing delimiters
/// produce no empty tokens; delimiter-only input yields an empty sequence.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    delimiters: Regex,
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer {
            delimiters: Regex::new(DELIMITERS).expect("delimiter class is a valid pattern"),
        }
    }

    /// Tokens of `text`, left to right.  Never yields an empty string.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.delimiters.split(text).filter(|t| !t.is_empty())
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new()
    }
}

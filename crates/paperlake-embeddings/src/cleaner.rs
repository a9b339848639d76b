//! Summary text cleaning.
//!
//! Cleaning is deterministic and total: lowercase, replace every
//! non-alphabetic character with a space, then drop stopwords and tokens
//! shorter than the minimum length. Empty input yields empty output.

use std::collections::HashSet;

/// Pure text -> text normalization applied before embedding.
pub trait TextCleaner: Send + Sync {
    fn clean(&self, text: &str) -> String;
}

/// Minimal hardcoded stopword list, biased toward scientific abstracts.
const DEFAULT_STOPWORDS: &[&str] = &[
    // Articles and conjunctions
    "a", "an", "the", "and", "or", "but",
    // Prepositions
    "in", "on", "at", "to", "for", "of", "with", "as", "by", "from", "into", "about", "between",
    "during", "via",
    // Common auxiliary verbs
    "is", "are", "was", "were", "can", "could", "may", "might", "should", "would",
    // Pronouns
    "it", "we", "our", "this", "these", "those", "each", "both", "which",
    // Filler common in abstracts
    "that", "such", "other", "another", "also", "using", "used", "based", "than", "however",
    "although", "while", "thus", "hence",
];

const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// Stopword and short-token filter over lowercased alphabetic text.
pub struct StopwordCleaner {
    stopwords: HashSet<String>,
    min_token_len: usize,
}

impl Default for StopwordCleaner {
    fn default() -> Self {
        Self::new(
            DEFAULT_STOPWORDS.iter().map(|s| s.to_string()),
            DEFAULT_MIN_TOKEN_LEN,
        )
    }
}

impl StopwordCleaner {
    pub fn new(stopwords: impl IntoIterator<Item = String>, min_token_len: usize) -> Self {
        Self {
            stopwords: stopwords.into_iter().collect(),
            min_token_len,
        }
    }
}

impl TextCleaner for StopwordCleaner {
    fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let normalized: String = text
            .chars()
            .map(|c| {
                if c.is_ascii_alphabetic() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();

        normalized
            .split_whitespace()
            .filter(|token| token.len() >= self.min_token_len)
            .filter(|token| !self.stopwords.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner_with(stopwords: &[&str], min_len: usize) -> StopwordCleaner {
        StopwordCleaner::new(stopwords.iter().map(|s| s.to_string()), min_len)
    }

    #[test]
    fn strips_stopwords_punctuation_and_short_tokens() {
        let cleaner = cleaner_with(&["the", "is", "it"], 3);
        let out = cleaner.clean("The AI is great! It's 100% efficient.");
        assert_eq!(out, "great efficient");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let cleaner = StopwordCleaner::default();
        assert_eq!(cleaner.clean(""), "");
    }

    #[test]
    fn output_is_deterministic() {
        let cleaner = StopwordCleaner::default();
        let text = "Transformers achieve state-of-the-art results on many NLP benchmarks.";
        assert_eq!(cleaner.clean(text), cleaner.clean(text));
    }

    #[test]
    fn numbers_and_symbols_never_survive() {
        let cleaner = cleaner_with(&[], 1);
        assert_eq!(cleaner.clean("123 45.6 +++"), "");
        assert_eq!(cleaner.clean("alpha2beta"), "alpha beta");
    }

    #[test]
    fn default_list_drops_abstract_filler() {
        let cleaner = StopwordCleaner::default();
        let out = cleaner.clean("We propose a novel method based on attention.");
        assert_eq!(out, "propose novel method attention");
    }
}

// src/utils/text.rs

//! Tokenization shared by indexing and querying.

/// Split a query into lower-cased words, the same way page text is split,
/// so `"Rust,"` looks up `"rust"`.
///
/// No stemming, no stopwords, repeated words are kept.
pub fn tokenize_query(query: &str) -> Vec<String> {
    tokenize_text(query)
}

/// Split page text into lower-cased index words with punctuation stripped
/// from the edges of each word.
pub fn tokenize_text(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_query_keeps_repeats() {
        assert_eq!(
            tokenize_query("  Rust rust\tGO \n"),
            vec!["rust", "rust", "go"]
        );
    }

    #[test]
    fn test_tokenize_query_empty() {
        assert!(tokenize_query("").is_empty());
        assert!(tokenize_query("   ").is_empty());
    }

    #[test]
    fn test_query_and_text_tokens_agree() {
        assert_eq!(tokenize_query("rust, C++ ..."), vec!["rust", "c"]);
        assert_eq!(
            tokenize_query("Rust, c++!"),
            tokenize_text("rust C++")
        );
    }

    #[test]
    fn test_tokenize_text_strips_punctuation() {
        assert_eq!(
            tokenize_text("Hello, World! (rust) -- c++"),
            vec!["hello", "world", "rust", "c"]
        );
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\n b\tc "), "a b c");
    }
}

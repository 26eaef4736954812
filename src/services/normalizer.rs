use std::collections::HashSet;

use crate::services::stemmer::PorterStemmer;

/// NLTK English stop words, shared by the normalizer and the vectorizer
pub fn english_stop_words() -> HashSet<String> {
    stop_words::get(stop_words::LANGUAGE::English)
        .iter()
        .map(|word| word.to_string())
        .collect()
}

/// Turns free text into the token string the vectorizer consumes
///
/// The indexer and the query path must use the same normalizer, otherwise
/// queries and documents end up in different term spaces.
pub struct Normalizer {
    stemmer: PorterStemmer,
    stop_words: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Normalizer {
    /// Porter stemmer with the NLTK English stop-word list
    pub fn english() -> Self {
        Self {
            stemmer: PorterStemmer::new(),
            stop_words: english_stop_words(),
        }
    }

    /// Lowercase, strip everything but `[a-z0-9]` and whitespace, drop stop
    /// words, stem, and rejoin with single spaces.
    ///
    /// Punctuation is deleted rather than replaced, so "sci-fi" becomes "scifi".
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped: String = lowered
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
            .collect();

        stripped
            .split_whitespace()
            .filter(|token| !self.is_stop_word(token))
            .map(|token| self.stem(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn stem(&self, token: &str) -> String {
        self.stemmer.stem(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("Sci-Fi!"), "scifi");
        assert_eq!(normalizer.normalize("WIZARD"), "wizard");
    }

    #[test]
    fn test_empty_input() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   \n\t "), "");
        assert_eq!(normalizer.normalize("?!..."), "");
    }

    #[test]
    fn test_stop_words_removed() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("the a of"), "");
        assert!(normalizer.is_stop_word("the"));
        assert!(!normalizer.is_stop_word("wizard"));
    }

    #[test]
    fn test_stemming() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.stem("running"), "run");
        assert_eq!(normalizer.stem("flies"), "fli");
        assert_eq!(normalizer.stem("wizards"), "wizard");
        assert_eq!(normalizer.stem("magical"), "magic");
        assert_eq!(normalizer.stem("generously"), "gener");
    }

    #[test]
    fn test_collapses_whitespace() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("  wizard \n\n school  "), "wizard school");
    }

    #[test]
    fn test_normalize_is_deterministic_and_idempotent() {
        let normalizer = Normalizer::english();
        let raw = "A wizard's journeys to the magical school of Wizards!";

        let once = normalizer.normalize(raw);
        assert_eq!(once, normalizer.normalize(raw));
        assert_eq!(normalizer.normalize(&once), once);
        assert!(once.contains("wizard"));
        assert!(once.contains("magic"));
        assert!(once.contains("school"));
    }

    #[test]
    fn test_normalize_idempotent_over_plot_vocabulary() {
        let normalizer = Normalizer::english();
        let words = [
            "running", "turned", "finds", "ends", "worked", "young", "world", "new", "man",
            "home", "help", "family", "friends", "enemies", "forces", "murder", "detective",
            "killer", "castle", "dragon", "stranded", "astronauts", "fight", "return",
            "discovers", "journeys", "generously",
        ];

        for word in words {
            let once = normalizer.normalize(word);
            assert!(!once.is_empty(), "{} was dropped", word);
            assert_eq!(normalizer.normalize(&once), once, "{} -> {}", word, once);
        }
        assert_eq!(normalizer.normalize("He turned and worked"), "turn work");
    }

    #[test]
    fn test_plot_words_are_not_stop_words() {
        let normalizer = Normalizer::english();
        for word in ["young", "world", "new", "man", "home", "find", "help", "run", "turn", "end"] {
            assert!(!normalizer.is_stop_word(word), "{}", word);
        }
        assert!(normalizer.is_stop_word("and"));
        assert!(normalizer.is_stop_word("he"));
        assert!(normalizer.is_stop_word("their"));
    }

    #[test]
    fn test_separate_instances_agree() {
        let indexer = Normalizer::english();
        let query = Normalizer::default();
        let text = "Two detectives chase a serial killer through 1990s Seoul";
        assert_eq!(indexer.normalize(text), query.normalize(text));
    }
}

//! TF-IDF vectorizer over normalized storyline text.
//!
//! Weights are raw term counts times smoothed inverse document frequency,
//! `ln((1 + n) / (1 + df)) + 1`, with every row scaled to unit length.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::services::normalizer::english_stop_words;

/// Shortest token the vectorizer counts
const MIN_TOKEN_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VectorizerConfig {
    /// Keep only the most frequent terms across the corpus
    pub max_features: Option<usize>,
    /// Filter English stop words again at fit time
    pub stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(5000),
            stop_words: true,
        }
    }
}

impl VectorizerConfig {
    pub fn with_max_features(max_features: usize) -> Self {
        Self {
            max_features: Some(max_features),
            ..Self::default()
        }
    }
}

/// Sparse row of `(column, weight)` pairs sorted by column
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Builds a vector from unordered entries; zero weights are dropped
    pub fn from_entries(mut entries: Vec<(usize, f32)>) -> Self {
        entries.retain(|&(_, weight)| weight != 0.0);
        entries.sort_by_key(|&(column, _)| column);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|&(_, weight)| weight * weight)
            .sum::<f32>()
            .sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_col, a_weight) = self.entries[i];
            let (b_col, b_weight) = other.entries[j];
            match a_col.cmp(&b_col) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
        self
    }
}

/// Document-term matrix; only meaningful next to the vectorizer that built it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatrix {
    n_features: usize,
    rows: Vec<SparseVector>,
}

impl DocumentMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }
}

/// Fitted TF-IDF model with a frozen vocabulary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and IDF weights on `documents` and returns the
    /// vectorizer together with the matrix of the same documents.
    pub fn fit<S: AsRef<str>>(
        documents: &[S],
        config: VectorizerConfig,
    ) -> AppResult<(Self, DocumentMatrix)> {
        if config.max_features == Some(0) {
            return Err(AppError::InvalidInput(
                "max_features must be positive".to_string(),
            ));
        }

        let stop_words = config.stop_words.then(english_stop_words);
        let counts: Vec<HashMap<&str, u32>> = documents
            .iter()
            .map(|document| term_counts(document.as_ref(), stop_words.as_ref()))
            .collect();

        let mut corpus_frequency: HashMap<&str, u64> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for document in &counts {
            for (&term, &count) in document {
                *corpus_frequency.entry(term).or_insert(0) += u64::from(count);
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if corpus_frequency.is_empty() {
            return Err(AppError::EmptyVocabulary);
        }

        let mut terms: Vec<(&str, u64)> = corpus_frequency.into_iter().collect();
        if let Some(max_features) = config.max_features {
            if terms.len() > max_features {
                terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                terms.truncate(max_features);
            }
        }
        terms.sort_by(|a, b| a.0.cmp(b.0));

        let n_documents = documents.len() as f32;
        let idf: Vec<f32> = terms
            .iter()
            .map(|(term, _)| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(index, (term, _))| (term.to_string(), index))
            .collect();

        let vectorizer = Self {
            config,
            vocabulary,
            idf,
        };

        let rows = counts
            .iter()
            .map(|document| vectorizer.weigh(document))
            .collect();
        let matrix = DocumentMatrix {
            n_features: vectorizer.vocabulary_size(),
            rows,
        };

        tracing::info!(
            documents = documents.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "TF-IDF model fitted"
        );

        Ok((vectorizer, matrix))
    }

    /// Maps a normalized document through the frozen vocabulary.
    /// Unseen terms are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        self.weigh(&term_counts(document, None))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f32] {
        &self.idf
    }

    pub fn config(&self) -> VectorizerConfig {
        self.config
    }

    fn weigh(&self, counts: &HashMap<&str, u32>) -> SparseVector {
        let entries = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(*term)
                    .map(|&column| (column, count as f32 * self.idf[column]))
            })
            .collect();
        SparseVector::from_entries(entries).l2_normalized()
    }
}

fn term_counts<'a>(
    document: &'a str,
    stop_words: Option<&HashSet<String>>,
) -> HashMap<&'a str, u32> {
    let mut counts = HashMap::new();
    for token in document.split_whitespace() {
        if token.chars().count() < MIN_TOKEN_CHARS {
            continue;
        }
        if stop_words.is_some_and(|words| words.contains(token)) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

use crate::models::RecommendOptions;
use crate::services::vectorizer::{DocumentMatrix, SparseVector};

/// Ranked corpus rows
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    /// `(row index, score)` pairs, best first
    Matches(Vec<(usize, f32)>),
    /// No row reached the minimum score
    NoMatches,
}

/// Cosine similarity, or 0 when either vector has zero magnitude.
///
/// TF-IDF weights are non-negative, so the result lies in [0, 1]; it is
/// clamped to absorb rounding.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let norms = a.norm() * b.norm();
    if norms == 0.0 {
        return 0.0;
    }
    (a.dot(b) / norms).clamp(0.0, 1.0)
}

/// Similarity of `query` against every row of `matrix`, in row order
pub fn score_all(query: &SparseVector, matrix: &DocumentMatrix) -> Vec<f32> {
    matrix
        .rows()
        .iter()
        .map(|row| cosine_similarity(query, row))
        .collect()
}

/// Keeps rows scoring at least `min_score`, orders them by score with ties
/// going to the earlier row, and truncates to `count`.
pub fn rank(scores: &[f32], options: RecommendOptions) -> Ranking {
    let mut matches: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score >= options.min_score)
        .collect();

    if matches.is_empty() {
        return Ranking::NoMatches;
    }

    matches.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    matches.truncate(options.count);
    Ranking::Matches(matches)
}

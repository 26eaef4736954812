use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_COUNT: usize = 1;
pub const MAX_COUNT: usize = 10;
pub const DEFAULT_COUNT: usize = 5;
pub const MIN_SCORE: f32 = 0.1;
pub const MAX_SCORE: f32 = 1.0;
pub const DEFAULT_MIN_SCORE: f32 = 0.25;

/// Caller-supplied ranking limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecommendOptions {
    /// Maximum number of matches returned
    pub count: usize,
    /// Matches scoring strictly below this are dropped
    pub min_score: f32,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl RecommendOptions {
    pub fn new(count: usize, min_score: f32) -> Self {
        Self { count, min_score }
    }

    /// Rejects values outside the ranges the form controls allow
    pub fn validate(self) -> AppResult<Self> {
        if !(MIN_COUNT..=MAX_COUNT).contains(&self.count) {
            return Err(AppError::InvalidInput(format!(
                "count must be between {} and {}",
                MIN_COUNT, MAX_COUNT
            )));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.min_score) {
            return Err(AppError::InvalidInput(format!(
                "min_score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }
        Ok(self)
    }

    /// Pulls out-of-range values back to the nearest bound
    pub fn clamped(self) -> Self {
        let min_score = if self.min_score.is_nan() {
            DEFAULT_MIN_SCORE
        } else {
            self.min_score.clamp(MIN_SCORE, MAX_SCORE)
        };
        Self {
            count: self.count.clamp(MIN_COUNT, MAX_COUNT),
            min_score,
        }
    }
}

/// One recommended movie with its similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub storyline: String,
    pub score: f32,
}

/// Outcome of a recommendation request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendations {
    /// At least one movie met the threshold, best first
    Found { matches: Vec<Recommendation> },
    /// Nothing scored at or above the threshold
    NoMatches,
}

impl Recommendations {
    pub fn matches(&self) -> &[Recommendation] {
        match self {
            Recommendations::Found { matches } => matches,
            Recommendations::NoMatches => &[],
        }
    }
}

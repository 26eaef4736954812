use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    api::state::DEFAULT_SESSION_CAPACITY,
    services::{model_store::ModelPaths, vectorizer::VectorizerConfig},
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Scraped movie CSV (`Movie Name`, `Storyline`)
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// CSV written by the indexer with the extra `Cleaned_Storyline` column
    #[serde(default = "default_cleaned_corpus_path")]
    pub cleaned_corpus_path: PathBuf,

    /// Persisted TF-IDF vectorizer
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: PathBuf,

    /// Persisted document-term matrix
    #[serde(default = "default_matrix_path")]
    pub matrix_path: PathBuf,

    /// Vocabulary cap for the vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser sessions whose form state is retained
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("imdb_2024_full.csv")
}

fn default_cleaned_corpus_path() -> PathBuf {
    PathBuf::from("cleaned_imdb_2024.csv")
}

fn default_vectorizer_path() -> PathBuf {
    PathBuf::from("tfidf_vectorizer.json")
}

fn default_matrix_path() -> PathBuf {
    PathBuf::from("tfidf_matrix.json")
}

fn default_max_features() -> usize {
    5000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_capacity() -> usize {
    DEFAULT_SESSION_CAPACITY
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn model_paths(&self) -> ModelPaths {
        ModelPaths {
            vectorizer: self.vectorizer_path.clone(),
            matrix: self.matrix_path.clone(),
        }
    }

    pub fn vectorizer_config(&self) -> VectorizerConfig {
        VectorizerConfig::with_max_features(self.max_features)
    }

    /// Default file names placed under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            corpus_path: dir.join(default_corpus_path()),
            cleaned_corpus_path: dir.join(default_cleaned_corpus_path()),
            vectorizer_path: dir.join(default_vectorizer_path()),
            matrix_path: dir.join(default_matrix_path()),
            max_features: default_max_features(),
            host: default_host(),
            port: default_port(),
            session_capacity: default_session_capacity(),
        }
    }
}

/// Scraper configuration, read from `SCRAPER_*` environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct ScraperConfig {
    /// Search-results page the run starts from
    #[serde(default = "default_scraper_url")]
    pub url: String,

    /// Stop once this many records are collected
    #[serde(default = "default_max_movies")]
    pub max_movies: usize,

    /// Base delay before each detail page, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// Upper bound of the random delay added on top of `delay_secs`
    #[serde(default = "default_jitter_secs")]
    pub jitter_secs: f64,

    /// Pause after advancing to the next listing page
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: f64,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fetch attempts while waiting for a required element
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between those attempts
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: f64,

    /// CSV the collected records are written to
    #[serde(default = "default_corpus_path")]
    pub output_path: PathBuf,
}

fn default_scraper_url() -> String {
    "https://www.imdb.com/search/title/?title_type=feature&release_date=2024-01-01,2024-12-31"
        .to_string()
}

fn default_max_movies() -> usize {
    500
}

fn default_delay_secs() -> f64 {
    5.0
}

fn default_jitter_secs() -> f64 {
    3.0
}

fn default_page_delay_secs() -> f64 {
    10.0
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retries() -> u32 {
    3
}

fn default_retry_backoff_secs() -> f64 {
    1.0
}

impl ScraperConfig {
    /// Load scraper configuration from `SCRAPER_`-prefixed environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("SCRAPER_")
            .from_env::<ScraperConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load scraper config: {}", e))
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: default_scraper_url(),
            max_movies: default_max_movies(),
            delay_secs: default_delay_secs(),
            jitter_secs: default_jitter_secs(),
            page_delay_secs: default_page_delay_secs(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_backoff_secs: default_retry_backoff_secs(),
            output_path: default_corpus_path(),
        }
    }
}

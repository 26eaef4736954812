use crate::{
    config::Config,
    error::AppResult,
    services::{
        corpus,
        model_store::{self, VectorModel},
        normalizer::Normalizer,
    },
};

/// Summary of an offline indexing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub documents: usize,
    pub vocabulary: usize,
}

/// Cleans the corpus, writes the cleaned CSV, fits the TF-IDF model and
/// persists the vectorizer / matrix pair stamped with the corpus fingerprint.
pub fn build_index(config: &Config) -> AppResult<IndexReport> {
    let movies = corpus::read_movies(&config.corpus_path)?;
    let fingerprint = corpus::fingerprint(&config.corpus_path)?;

    let cleaned = corpus::clean_corpus(&movies, &Normalizer::english());
    corpus::write_cleaned(&config.cleaned_corpus_path, &cleaned)?;

    let documents: Vec<&str> = cleaned
        .iter()
        .map(|movie| movie.cleaned_storyline.as_str())
        .collect();
    let model = VectorModel::build(&documents, config.vectorizer_config())?;
    model_store::save_model(&config.model_paths(), &fingerprint, &model)?;

    let report = IndexReport {
        documents: model.matrix.n_rows(),
        vocabulary: model.vectorizer.vocabulary_size(),
    };

    tracing::info!(
        documents = report.documents,
        vocabulary = report.vocabulary,
        "Index built"
    );

    Ok(report)
}

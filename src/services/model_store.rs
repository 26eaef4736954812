//! Persistence of the vectorizer / matrix pair.
//!
//! Both artifacts record the fingerprint of the corpus they were built from.
//! A pair is only reused when both fingerprints match the current corpus, the
//! vectorizer settings are the requested ones and the shapes line up; anything
//! else triggers a rebuild of both.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    services::vectorizer::{DocumentMatrix, TfidfVectorizer, VectorizerConfig},
};

#[derive(Debug, Serialize, Deserialize)]
struct VectorizerArtifact {
    corpus_fingerprint: String,
    built_at: DateTime<Utc>,
    vectorizer: TfidfVectorizer,
}

#[derive(Debug, Serialize, Deserialize)]
struct MatrixArtifact {
    corpus_fingerprint: String,
    built_at: DateTime<Utc>,
    matrix: DocumentMatrix,
}

/// Where the two artifacts live
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub vectorizer: PathBuf,
    pub matrix: PathBuf,
}

/// Fitted vectorizer with the matrix it produced
#[derive(Debug, Clone)]
pub struct VectorModel {
    pub vectorizer: TfidfVectorizer,
    pub matrix: DocumentMatrix,
}

/// How the model in memory came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOrigin {
    /// Read back from matching artifacts
    Loaded,
    /// Fitted from the corpus because the artifacts were unusable
    Built,
}

impl VectorModel {
    /// Fits a fresh model on normalized storylines
    pub fn build<S: AsRef<str>>(documents: &[S], config: VectorizerConfig) -> AppResult<Self> {
        let (vectorizer, matrix) = TfidfVectorizer::fit(documents, config)?;
        Ok(Self { vectorizer, matrix })
    }
}

/// Writes both artifacts, stamped with the corpus fingerprint
pub fn save_model(paths: &ModelPaths, corpus_fingerprint: &str, model: &VectorModel) -> AppResult<()> {
    let built_at = Utc::now();

    write_json(
        &paths.vectorizer,
        &VectorizerArtifact {
            corpus_fingerprint: corpus_fingerprint.to_string(),
            built_at,
            vectorizer: model.vectorizer.clone(),
        },
    )?;
    write_json(
        &paths.matrix,
        &MatrixArtifact {
            corpus_fingerprint: corpus_fingerprint.to_string(),
            built_at,
            matrix: model.matrix.clone(),
        },
    )?;

    tracing::info!(
        vectorizer = %paths.vectorizer.display(),
        matrix = %paths.matrix.display(),
        "Model artifacts saved"
    );

    Ok(())
}

/// Loads the artifact pair and checks it against the current corpus
pub fn load_model(
    paths: &ModelPaths,
    corpus_fingerprint: &str,
    n_documents: usize,
    config: VectorizerConfig,
) -> AppResult<VectorModel> {
    let vectorizer: VectorizerArtifact = read_json(&paths.vectorizer)?;
    let matrix: MatrixArtifact = read_json(&paths.matrix)?;

    if vectorizer.corpus_fingerprint != corpus_fingerprint
        || matrix.corpus_fingerprint != corpus_fingerprint
    {
        return Err(AppError::Internal(
            "model artifacts were built from a different corpus".to_string(),
        ));
    }

    if vectorizer.vectorizer.config() != config {
        return Err(AppError::Internal(format!(
            "model artifacts were built with {:?}, {:?} requested",
            vectorizer.vectorizer.config(),
            config
        )));
    }

    if matrix.matrix.n_features() != vectorizer.vectorizer.vocabulary_size() {
        return Err(AppError::Internal(format!(
            "matrix has {} columns but the vocabulary has {} terms",
            matrix.matrix.n_features(),
            vectorizer.vectorizer.vocabulary_size()
        )));
    }

    if matrix.matrix.n_rows() != n_documents {
        return Err(AppError::Internal(format!(
            "matrix has {} rows but the corpus has {} movies",
            matrix.matrix.n_rows(),
            n_documents
        )));
    }

    Ok(VectorModel {
        vectorizer: vectorizer.vectorizer,
        matrix: matrix.matrix,
    })
}

/// Reuses the persisted pair when it matches the corpus, otherwise fits a new
/// one from `documents` and persists it.
pub fn load_or_build<S: AsRef<str>>(
    paths: &ModelPaths,
    corpus_fingerprint: &str,
    documents: &[S],
    config: VectorizerConfig,
) -> AppResult<(VectorModel, ModelOrigin)> {
    match load_model(paths, corpus_fingerprint, documents.len(), config) {
        Ok(model) => {
            tracing::info!(
                vocabulary = model.vectorizer.vocabulary_size(),
                documents = model.matrix.n_rows(),
                "Model artifacts loaded"
            );
            return Ok((model, ModelOrigin::Loaded));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Building recommendation engine");
        }
    }

    let model = VectorModel::build(documents, config)?;
    save_model(paths, corpus_fingerprint, &model)?;

    Ok((model, ModelOrigin::Built))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    if !path.exists() {
        return Err(AppError::NotFound(format!("{} does not exist", path.display())));
    }
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(dir: &Path) -> ModelPaths {
        ModelPaths {
            vectorizer: dir.join("vectorizer.json"),
            matrix: dir.join("matrix.json"),
        }
    }

    fn docs() -> Vec<String> {
        vec!["wizard school".to_string(), "dragon castl".to_string()]
    }

    #[test]
    fn test_builds_then_loads() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());

        let (built, origin) =
            load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();
        assert_eq!(origin, ModelOrigin::Built);
        assert!(paths.vectorizer.exists());
        assert!(paths.matrix.exists());

        let (loaded, origin) =
            load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();
        assert_eq!(origin, ModelOrigin::Loaded);
        assert_eq!(loaded.vectorizer.vocabulary(), built.vectorizer.vocabulary());
        assert_eq!(loaded.matrix.n_rows(), built.matrix.n_rows());
        assert_eq!(loaded.matrix.n_features(), built.matrix.n_features());
    }

    #[test]
    fn test_stale_fingerprint_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        load_or_build(&paths, "old", &docs(), VectorizerConfig::default()).unwrap();

        let new_docs = vec!["space alien".to_string()];
        let (model, origin) =
            load_or_build(&paths, "new", &new_docs, VectorizerConfig::default()).unwrap();
        assert_eq!(origin, ModelOrigin::Built);
        assert_eq!(model.matrix.n_rows(), 1);
        assert!(model.vectorizer.vocabulary().contains_key("alien"));
    }

    #[test]
    fn test_corrupt_artifact_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();
        std::fs::write(&paths.matrix, "not json").unwrap();

        let (_, origin) =
            load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();
        assert_eq!(origin, ModelOrigin::Built);
    }

    #[test]
    fn test_missing_half_of_pair_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();
        std::fs::remove_file(&paths.vectorizer).unwrap();

        assert!(matches!(
            load_model(&paths, "abc", 2, VectorizerConfig::default()),
            Err(AppError::NotFound(_))
        ));
        let (_, origin) =
            load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();
        assert_eq!(origin, ModelOrigin::Built);
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();

        assert!(load_model(&paths, "abc", 3, VectorizerConfig::default()).is_err());
        assert!(load_model(&paths, "abc", 2, VectorizerConfig::default()).is_ok());
    }

    #[test]
    fn test_changed_settings_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        load_or_build(&paths, "abc", &docs(), VectorizerConfig::default()).unwrap();

        let capped = VectorizerConfig::with_max_features(2);
        assert!(matches!(
            load_model(&paths, "abc", 2, capped),
            Err(AppError::Internal(_))
        ));

        let (model, origin) = load_or_build(&paths, "abc", &docs(), capped).unwrap();
        assert_eq!(origin, ModelOrigin::Built);
        assert_eq!(model.vectorizer.vocabulary_size(), 2);
        assert_eq!(model.vectorizer.config(), capped);

        let (_, origin) = load_or_build(&paths, "abc", &docs(), capped).unwrap();
        assert_eq!(origin, ModelOrigin::Loaded);
    }
}

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{CleanedMovie, Movie},
    services::normalizer::Normalizer,
};

/// Reads the movie CSV (`Movie Name`, `Storyline`)
pub fn read_movies(path: &Path) -> AppResult<Vec<Movie>> {
    if !path.exists() {
        return Err(AppError::NotFound(format!(
            "Movie database not found. Please ensure '{}' exists.",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let movies = reader
        .deserialize::<Movie>()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(path = %path.display(), movies = movies.len(), "Corpus loaded");

    Ok(movies)
}

/// Writes the movie CSV in one pass
pub fn write_movies(path: &Path, movies: &[Movie]) -> AppResult<()> {
    write_rows(path, movies)
}

/// Writes the cleaned CSV (`Movie Name`, `Storyline`, `Cleaned_Storyline`)
pub fn write_cleaned(path: &Path, movies: &[CleanedMovie]) -> AppResult<()> {
    write_rows(path, movies)
}

fn write_rows<T: serde::Serialize>(path: &Path, rows: &[T]) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = rows.len(), "CSV written");

    Ok(())
}

/// Normalizes every storyline
pub fn clean_corpus(movies: &[Movie], normalizer: &Normalizer) -> Vec<CleanedMovie> {
    movies
        .iter()
        .map(|movie| movie.cleaned(normalizer.normalize(&movie.storyline)))
        .collect()
}

/// SHA-256 of the corpus file, hex encoded
pub fn fingerprint(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

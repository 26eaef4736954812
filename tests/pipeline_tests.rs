use std::fs;

use movie_finder::{
    config::Config,
    error::AppError,
    models::{Movie, RecommendOptions},
    services::{build_index, corpus, model_store::ModelOrigin, Recommender},
};

fn write_corpus(config: &Config, movies: &[Movie]) {
    corpus::write_movies(&config.corpus_path, movies).unwrap();
}

fn movies() -> Vec<Movie> {
    vec![
        Movie::new("Wiz", "A young wizard begins his journey at a magical school."),
        Movie::new("Dragon Keep", "A knight defends a castle from an ancient dragon."),
        Movie::new("Orbit", "Astronauts stranded on a space station fight to return home."),
    ]
}

#[test]
fn test_index_then_serve() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::in_dir(dir.path());
    write_corpus(&config, &movies());

    let report = build_index(&config).unwrap();
    assert_eq!(report.documents, 3);

    let cleaned = fs::read_to_string(&config.cleaned_corpus_path).unwrap();
    assert!(cleaned.starts_with("Movie Name,Storyline,Cleaned_Storyline"));

    let recommender = Recommender::open(&config).unwrap();
    assert_eq!(recommender.origin(), ModelOrigin::Loaded);
    assert_eq!(recommender.vocabulary_size(), report.vocabulary);

    let result = recommender
        .recommend("a dragon attacks the castle", RecommendOptions::new(1, 0.1))
        .unwrap();
    assert_eq!(result.matches().len(), 1);
    assert_eq!(result.matches()[0].title, "Dragon Keep");
}

#[test]
fn test_changed_corpus_rebuilds_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::in_dir(dir.path());
    write_corpus(&config, &movies());
    build_index(&config).unwrap();

    let mut grown = movies();
    grown.push(Movie::new(
        "Deep Blue",
        "Divers discover a sunken city guarded by a giant octopus.",
    ));
    write_corpus(&config, &grown);

    let recommender = Recommender::open(&config).unwrap();
    assert_eq!(recommender.origin(), ModelOrigin::Built);
    assert_eq!(recommender.movies().len(), 4);

    let result = recommender
        .recommend("octopus in a sunken city", RecommendOptions::new(1, 0.1))
        .unwrap();
    assert_eq!(result.matches()[0].title, "Deep Blue");

    // The rebuilt pair is persisted and matches the new corpus
    let reopened = Recommender::open(&config).unwrap();
    assert_eq!(reopened.origin(), ModelOrigin::Loaded);
}

#[test]
fn test_changed_max_features_rebuilds_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::in_dir(dir.path());
    write_corpus(&config, &movies());
    let report = build_index(&config).unwrap();
    assert!(report.vocabulary > 2);

    config.max_features = 2;
    let recommender = Recommender::open(&config).unwrap();
    assert_eq!(recommender.origin(), ModelOrigin::Built);
    assert_eq!(recommender.vocabulary_size(), 2);

    let reopened = Recommender::open(&config).unwrap();
    assert_eq!(reopened.origin(), ModelOrigin::Loaded);
    assert_eq!(reopened.vocabulary_size(), 2);
}

#[test]
fn test_corrupt_artifact_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::in_dir(dir.path());
    write_corpus(&config, &movies());
    build_index(&config).unwrap();

    fs::write(&config.matrix_path, "{ not json").unwrap();

    let recommender = Recommender::open(&config).unwrap();
    assert_eq!(recommender.origin(), ModelOrigin::Built);
}

#[test]
fn test_missing_corpus_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::in_dir(dir.path());

    match Recommender::open(&config) {
        Err(AppError::NotFound(message)) => {
            assert!(message.contains("Movie database not found"))
        }
        other => panic!("expected NotFound, got {:?}", other.err()),
    }
    assert!(!config.vectorizer_path.exists());
}

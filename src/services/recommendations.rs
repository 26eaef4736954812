use rand::seq::SliceRandom;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Movie, RecommendOptions, Recommendation, Recommendations},
    services::{
        corpus,
        model_store::{self, ModelOrigin, VectorModel},
        normalizer::Normalizer,
        ranker::{self, Ranking},
        vectorizer::VectorizerConfig,
    },
};

/// Storyline similarity search over the scraped corpus
///
/// Holds the corpus, the normalizer and the vector model built from it. All
/// three are read-only once constructed.
pub struct Recommender {
    movies: Vec<Movie>,
    normalizer: Normalizer,
    model: VectorModel,
    origin: ModelOrigin,
}

impl Recommender {
    /// Pairs a corpus with its model; the matrix must have one row per movie
    pub fn new(
        movies: Vec<Movie>,
        normalizer: Normalizer,
        model: VectorModel,
        origin: ModelOrigin,
    ) -> AppResult<Self> {
        if model.matrix.n_rows() != movies.len() {
            return Err(AppError::Internal(format!(
                "model has {} rows for {} movies",
                model.matrix.n_rows(),
                movies.len()
            )));
        }

        Ok(Self {
            movies,
            normalizer,
            model,
            origin,
        })
    }

    /// Fits a model in memory without touching the disk
    pub fn from_movies(movies: Vec<Movie>, config: VectorizerConfig) -> AppResult<Self> {
        let normalizer = Normalizer::english();
        let documents = normalize_storylines(&movies, &normalizer);
        let model = VectorModel::build(&documents, config)?;
        Self::new(movies, normalizer, model, ModelOrigin::Built)
    }

    /// Loads the corpus and the persisted model, rebuilding the model when the
    /// artifacts are missing, corrupt or belong to another corpus.
    pub fn open(config: &Config) -> AppResult<Self> {
        let movies = corpus::read_movies(&config.corpus_path)?;
        let fingerprint = corpus::fingerprint(&config.corpus_path)?;
        let normalizer = Normalizer::english();
        let documents = normalize_storylines(&movies, &normalizer);

        let (model, origin) = model_store::load_or_build(
            &config.model_paths(),
            &fingerprint,
            &documents,
            config.vectorizer_config(),
        )?;

        Self::new(movies, normalizer, model, origin)
    }

    /// Ranks the corpus against a free-text plot description
    pub fn recommend(&self, query: &str, options: RecommendOptions) -> AppResult<Recommendations> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter a movie description".to_string(),
            ));
        }

        let cleaned = self.normalizer.normalize(query);
        let query_vector = self.model.vectorizer.transform(&cleaned);
        let scores = ranker::score_all(&query_vector, &self.model.matrix);

        let recommendations = match ranker::rank(&scores, options) {
            Ranking::Matches(matches) => Recommendations::Found {
                matches: matches
                    .into_iter()
                    .map(|(index, score)| {
                        let movie = &self.movies[index];
                        Recommendation {
                            title: movie.title.clone(),
                            storyline: movie.storyline.clone(),
                            score,
                        }
                    })
                    .collect(),
            },
            Ranking::NoMatches => Recommendations::NoMatches,
        };

        tracing::info!(
            query_terms = query_vector.entries().len(),
            count = options.count,
            min_score = options.min_score,
            matches = recommendations.matches().len(),
            "Recommendations computed"
        );

        Ok(recommendations)
    }

    /// Up to `n` distinct random movies with their corpus positions
    pub fn sample(&self, n: usize) -> Vec<(usize, &Movie)> {
        let mut indices: Vec<usize> = (0..self.movies.len()).collect();
        indices.shuffle(&mut rand::thread_rng());
        indices.truncate(n);
        indices
            .into_iter()
            .map(|index| (index, &self.movies[index]))
            .collect()
    }

    pub fn movie(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn origin(&self) -> ModelOrigin {
        self.origin
    }

    pub fn vocabulary_size(&self) -> usize {
        self.model.vectorizer.vocabulary_size()
    }
}

fn normalize_storylines(movies: &[Movie], normalizer: &Normalizer) -> Vec<String> {
    movies
        .iter()
        .map(|movie| normalizer.normalize(&movie.storyline))
        .collect()
}

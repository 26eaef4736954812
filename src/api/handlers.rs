use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::SessionId,
    models::{
        recommendation::{DEFAULT_COUNT, DEFAULT_MIN_SCORE, MAX_COUNT},
        RecommendOptions, Recommendations,
    },
};

use super::{
    state::{AppState, SessionState},
    views::{Outcome, PageView, EXAMPLE_QUERY},
};

/// Movies offered in the sidebar
pub const SIDEBAR_SAMPLES: usize = 3;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    pub count: Option<usize>,
    pub min_score: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct SampleForm {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub count: Option<usize>,
    pub min_score: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct SamplesQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub index: usize,
    pub title: String,
    pub storyline: String,
}

// Page handlers

/// Renders the page for the caller's session
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> AppResult<Html<String>> {
    let form = state.sessions.get(session).await;
    Ok(Html(render(&state, &form)?))
}

/// Form submission: options out of range are clamped to the controls' bounds
pub async fn submit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<SearchForm>,
) -> AppResult<Html<String>> {
    let options = RecommendOptions::new(
        form.count.unwrap_or(DEFAULT_COUNT),
        form.min_score.unwrap_or(DEFAULT_MIN_SCORE),
    )
    .clamped();

    submit_query(&state, session, form.query, Some(options)).await
}

/// Fills in the canned example and submits it
pub async fn use_example(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> AppResult<Html<String>> {
    submit_query(&state, session, EXAMPLE_QUERY.to_string(), None).await
}

/// Fills in the storyline of a corpus movie and submits it
pub async fn use_sample(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<SampleForm>,
) -> AppResult<Html<String>> {
    let storyline = state
        .recommender()?
        .movie(form.index)
        .map(|movie| movie.storyline.clone())
        .ok_or_else(|| AppError::NotFound(format!("no movie at index {}", form.index)))?;

    submit_query(&state, session, storyline, None).await
}

/// Stores the submitted form for the session and renders the results.
/// `None` options keep whatever the session last used.
async fn submit_query(
    state: &AppState,
    session: SessionId,
    query: String,
    options: Option<RecommendOptions>,
) -> AppResult<Html<String>> {
    let mut form = state.sessions.get(session).await;
    form.query = query;
    if let Some(options) = options {
        form.options = options;
    }
    form.submitted = true;

    tracing::debug!(session = %session, query_chars = form.query.len(), "Form submitted");
    state.sessions.set(session, form.clone()).await;

    Ok(Html(render(state, &form)?))
}

fn render(state: &AppState, form: &SessionState) -> AppResult<String> {
    let recommender = state.recommender().ok();

    let outcome = match (form.submitted, recommender) {
        (false, _) | (true, None) => None,
        (true, Some(_)) if form.query.trim().is_empty() => Some(Outcome::EmptyQuery),
        (true, Some(recommender)) => Some(match recommender.recommend(&form.query, form.options) {
            Ok(recommendations) => Outcome::Results(recommendations),
            Err(e) => {
                tracing::error!(error = %e, "Recommendation failed");
                Outcome::Failed(e.to_string())
            }
        }),
    };

    let samples = recommender
        .map(|r| r.sample(SIDEBAR_SAMPLES))
        .unwrap_or_default();

    state.renderer.render(&PageView {
        form,
        outcome,
        samples,
        load_error: state.load_error(),
        rebuilt: state.model_rebuilt(),
    })
}

// JSON API handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.recommender() {
        Ok(recommender) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "movies": recommender.movies().len(),
                "vocabulary": recommender.vocabulary_size(),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "error": e.to_string() })),
        ),
    }
}

/// Ranks the corpus against a plot description; out-of-range options are
/// rejected rather than clamped
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<Recommendations>> {
    let recommender = state.recommender()?;
    let options = RecommendOptions::new(
        request.count.unwrap_or(DEFAULT_COUNT),
        request.min_score.unwrap_or(DEFAULT_MIN_SCORE),
    )
    .validate()?;

    Ok(Json(recommender.recommend(&request.query, options)?))
}

/// Random movies from the corpus
pub async fn samples(
    State(state): State<AppState>,
    Query(query): Query<SamplesQuery>,
) -> AppResult<Json<Vec<SampleResponse>>> {
    let n = query.n.unwrap_or(SIDEBAR_SAMPLES).min(MAX_COUNT);

    let samples = state
        .recommender()?
        .sample(n)
        .into_iter()
        .map(|(index, movie)| SampleResponse {
            index,
            title: movie.title.clone(),
            storyline: movie.storyline.clone(),
        })
        .collect();

    Ok(Json(samples))
}

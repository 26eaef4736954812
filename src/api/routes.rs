use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_session, session_middleware};

use super::handlers;
use super::AppState;

/// Creates the main router: the HTML page, its form actions and the JSON API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/example", post(handlers::use_example))
        .route("/sample", post(handlers::use_sample))
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(session_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_session)),
        )
        .with_state(state)
}

/// JSON routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(handlers::recommend))
        .route("/samples", get(handlers::samples))
        .layer(CorsLayer::permissive())
}

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_finder::{
    api::{create_router, AppState, SessionStore},
    config::Config,
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_finder=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // A missing corpus leaves the server up with a visible error
    let recommender = tokio::task::spawn_blocking({
        let config = config.clone();
        move || Recommender::open(&config)
    })
    .await
    .context("model loading task failed")?;

    if let Err(e) = &recommender {
        tracing::error!(error = %e, corpus = %config.corpus_path.display(), "Recommendation engine unavailable");
    }
    let state = AppState::from_result(recommender)?
        .with_sessions(SessionStore::with_capacity(config.session_capacity));

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}

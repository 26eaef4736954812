use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_finder::{config::Config, services::build_index};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "movie_finder=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let report = build_index(&config)?;

    println!(
        "Indexed {} movies ({} terms) into {} and {}",
        report.documents,
        report.vocabulary,
        config.vectorizer_path.display(),
        config.matrix_path.display()
    );
    Ok(())
}

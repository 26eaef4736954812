use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_finder::{
    config::ScraperConfig,
    services::{HttpFetcher, Scraper},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "movie_finder=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ScraperConfig::from_env()?;
    let output = config.output_path.clone();
    let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))?;

    let scraper = Scraper::new(Arc::new(fetcher), config);
    let written = scraper.scrape_to_csv(&output).await?;

    println!("Saved {} movies to {}", written, output.display());
    Ok(())
}

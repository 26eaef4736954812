//! Movie scraper for IMDb search results.
//!
//! Walks the listing pages, visits every detail page once and keeps the
//! records that have both a title and a plot. Records stay in memory and are
//! written to the CSV once the run ends.

use rand::Rng;
use reqwest::Url;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::ScraperConfig,
    error::{AppError, AppResult},
    models::Movie,
    services::corpus,
};

pub mod extract;
pub mod http;

pub use http::HttpFetcher;

/// Source of page HTML
///
/// The session behind a fetcher lives for the whole run; `close` is called
/// exactly once when the run ends, whatever the outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> AppResult<String>;

    async fn close(&self) {}
}

pub struct Scraper {
    fetcher: Arc<dyn PageFetcher>,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    /// Collects movies until `max_movies` is reached or the listing runs out
    pub async fn run(&self) -> AppResult<Vec<Movie>> {
        let start = Url::parse(&self.config.url).map_err(|e| {
            AppError::InvalidInput(format!("invalid scrape URL {}: {}", self.config.url, e))
        })?;

        let movies = self.collect(start).await;
        self.fetcher.close().await;

        Ok(movies)
    }

    /// Runs the scraper and writes the CSV; nothing is written when no movie
    /// was collected.
    pub async fn scrape_to_csv(&self, path: &Path) -> AppResult<usize> {
        let movies = self.run().await?;

        if movies.is_empty() {
            return Err(AppError::Scrape(
                "Scraping failed completely: no movies collected".to_string(),
            ));
        }

        corpus::write_movies(path, &movies)?;
        tracing::info!(movies = movies.len(), path = %path.display(), "Scrape saved");

        Ok(movies.len())
    }

    async fn collect(&self, start: Url) -> Vec<Movie> {
        let mut movies = Vec::new();
        let mut seen: HashSet<Url> = HashSet::new();
        let mut page_url = start;
        let mut page = 1;

        while movies.len() < self.config.max_movies {
            let listing = match self.fetch_until(&page_url, extract::has_listing).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(page, url = %page_url, error = %e, "Listing page unavailable");
                    break;
                }
            };

            let links = extract::detail_links(&listing, &page_url);
            let shown = links.len();
            let fresh: Vec<Url> = links
                .into_iter()
                .filter(|link| seen.insert(link.clone()))
                .collect();

            tracing::info!(page, links = shown, new = fresh.len(), "Listing page loaded");

            if fresh.is_empty() {
                break;
            }

            let mut scraped_on_page = 0;
            for link in fresh {
                if movies.len() >= self.config.max_movies {
                    break;
                }

                self.pause(self.detail_delay()).await;
                match self.scrape_movie(&link).await {
                    Ok(movie) => {
                        scraped_on_page += 1;
                        tracing::info!(count = movies.len() + 1, title = %movie.title, "Movie scraped");
                        movies.push(movie);
                    }
                    Err(e) => {
                        tracing::warn!(url = %link, error = %e, "Failed to scrape movie");
                    }
                }
            }

            if movies.len() >= self.config.max_movies {
                break;
            }

            if scraped_on_page == 0 {
                tracing::warn!(page, "No movie on the listing page could be scraped");
                break;
            }

            match extract::next_page(&listing, &page_url, shown) {
                Some(next) => {
                    page_url = next;
                    page += 1;
                    self.pause(self.config.page_delay_secs).await;
                }
                None => {
                    tracing::info!(page, "Pagination ended");
                    break;
                }
            }
        }

        movies
    }

    /// Refetches `url` until `ready` accepts the HTML or attempts run out
    async fn fetch_until(&self, url: &Url, ready: fn(&str) -> bool) -> AppResult<String> {
        let mut last_error = AppError::Scrape(format!("{} was never fetched", url));

        for attempt in 1..=self.config.retries.max(1) {
            if attempt > 1 {
                self.pause(self.config.retry_backoff_secs).await;
            }

            match self.fetcher.fetch(url).await {
                Ok(html) if ready(&html) => return Ok(html),
                Ok(_) => {
                    last_error =
                        AppError::Scrape(format!("{} did not show the expected content", url));
                }
                Err(e) => last_error = e,
            }
            tracing::debug!(attempt, url = %url, error = %last_error, "Page not ready");
        }

        Err(last_error)
    }

    /// Title and plot of one detail page; the strategy chain is retried as a
    /// whole on each attempt
    async fn scrape_movie(&self, url: &Url) -> AppResult<Movie> {
        let html = self.fetch_until(url, extract::has_title).await?;
        let mut title = extract::title(&html);
        let mut plot = extract::plot(&html);

        for _ in 1..self.config.retries.max(1) {
            if plot.is_some() {
                break;
            }
            self.pause(self.config.retry_backoff_secs).await;
            if let Ok(html) = self.fetch_until(url, extract::has_title).await {
                title = extract::title(&html);
                plot = extract::plot(&html);
            }
        }

        match (title, plot) {
            (Some(title), Some(plot)) => Ok(Movie::new(title, plot)),
            (None, _) => Err(AppError::Scrape(format!("no title on {}", url))),
            (Some(title), None) => Err(AppError::Scrape(format!(
                "no plot summary available for {}",
                title
            ))),
        }
    }

    fn detail_delay(&self) -> f64 {
        let jitter = if self.config.jitter_secs > 0.0 {
            rand::thread_rng().gen_range(0.0..self.config.jitter_secs)
        } else {
            0.0
        };
        self.config.delay_secs + jitter
    }

    async fn pause(&self, secs: f64) {
        if let Ok(duration) = Duration::try_from_secs_f64(secs) {
            if !duration.is_zero() {
                tokio::time::sleep(duration).await;
            }
        }
    }
}

pub mod corpus;
pub mod indexer;
pub mod model_store;
pub mod normalizer;
pub mod ranker;
pub mod recommendations;
pub mod scraper;
pub mod stemmer;
pub mod vectorizer;

pub use indexer::{build_index, IndexReport};
pub use recommendations::Recommender;
pub use scraper::{HttpFetcher, PageFetcher, Scraper};

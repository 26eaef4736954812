pub mod movie;
pub mod recommendation;

pub use movie::{CleanedMovie, Movie};
pub use recommendation::{RecommendOptions, Recommendation, Recommendations};

//! Server-rendered HTML for the movie finder page.
//!
//! The markup lives in `templates/page.html`; values reach it through a
//! minijinja context and are HTML-escaped on output.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{
        recommendation::{MAX_COUNT, MAX_SCORE, MIN_COUNT, MIN_SCORE},
        Movie, Recommendations,
    },
};

use super::state::SessionState;

/// Query filled in by the "Use Example" button
pub const EXAMPLE_QUERY: &str = "A young wizard begins his journey at a magical school \
                                 where he makes friends and enemies, facing dark forces along the way.";

const PAGE: &str = "page.html";
const PAGE_TEMPLATE: &str = include_str!("../../templates/page.html");

/// What to show under the form
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The form was submitted without a description
    EmptyQuery,
    Results(Recommendations),
    /// The query could not be answered
    Failed(String),
}

pub struct PageView<'a> {
    pub form: &'a SessionState,
    pub outcome: Option<Outcome>,
    pub samples: Vec<(usize, &'a Movie)>,
    pub load_error: Option<&'a str>,
    pub rebuilt: bool,
}

#[derive(Debug, Serialize)]
struct Notice {
    kind: &'static str,
    message: String,
}

impl Notice {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchCard<'a> {
    title: &'a str,
    storyline: &'a str,
    score: String,
}

#[derive(Debug, Serialize)]
struct SampleCard<'a> {
    index: usize,
    title: &'a str,
    storyline: &'a str,
}

/// Similarity as a whole percentage
pub fn percent(score: f32) -> String {
    format!("{:.0}%", score * 100.0)
}

/// Holds the compiled page template
pub struct PageRenderer {
    env: Environment<'static>,
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer").finish_non_exhaustive()
    }
}

impl PageRenderer {
    pub fn new() -> AppResult<Self> {
        let mut env = Environment::new();
        env.add_template(PAGE, PAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &PageView<'_>) -> AppResult<String> {
        let mut banners = Vec::new();
        if let Some(error) = view.load_error {
            banners.push(Notice::new("error", error));
        }
        if view.rebuilt {
            banners.push(Notice::new("info", "Building recommendation engine..."));
        }

        let (results_notices, matches) = match &view.outcome {
            None => (Vec::new(), Vec::new()),
            Some(outcome) => outcome_cards(outcome),
        };

        let samples: Vec<SampleCard<'_>> = view
            .samples
            .iter()
            .map(|(index, movie)| SampleCard {
                index: *index,
                title: &movie.title,
                storyline: &movie.storyline,
            })
            .collect();

        let template = self.env.get_template(PAGE)?;
        let html = template.render(context! {
            banners,
            results_notices,
            matches,
            samples,
            query => &view.form.query,
            count => view.form.options.count,
            min_count => MIN_COUNT,
            max_count => MAX_COUNT,
            min_score => format!("{:.2}", view.form.options.min_score),
            min_score_floor => MIN_SCORE.to_string(),
            min_score_ceiling => MAX_SCORE.to_string(),
        })?;
        Ok(html)
    }
}

fn outcome_cards(outcome: &Outcome) -> (Vec<Notice>, Vec<MatchCard<'_>>) {
    match outcome {
        Outcome::EmptyQuery => (
            vec![Notice::new("warning", "Please enter a movie description")],
            Vec::new(),
        ),
        Outcome::Failed(message) => (vec![Notice::new("error", message.as_str())], Vec::new()),
        Outcome::Results(Recommendations::NoMatches) => (
            vec![Notice::new(
                "warning",
                "No magical matches found. Try a different description!",
            )],
            Vec::new(),
        ),
        Outcome::Results(Recommendations::Found { matches }) => (
            vec![Notice::new(
                "success",
                format!("Found {} magical matches!", matches.len()),
            )],
            matches
                .iter()
                .map(|recommendation| MatchCard {
                    title: &recommendation.title,
                    storyline: &recommendation.storyline,
                    score: percent(recommendation.score),
                })
                .collect(),
        ),
    }
}

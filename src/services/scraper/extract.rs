//! HTML extraction for IMDb listing and detail pages.
//!
//! Plots and pagination controls are located through ordered strategy lists;
//! the first strategy that yields a usable result wins.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// Links to detail pages on a search-results page
pub const LISTING_LINK_SELECTOR: &str = r#"a.ipc-title-link-wrapper[href*="/title/tt"]"#;

/// Title heading on a detail page
pub const TITLE_SELECTOR: &str = r#"h1[data-testid="hero__pageTitle"]"#;

/// Plot text must be longer than this to count
pub const MIN_PLOT_CHARS: usize = 50;

/// Query parameter holding the 1-based offset of a listing page
const START_PARAM: &str = "start";

/// One way of locating a piece of content on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStrategy {
    pub selector: &'static str,
    pub description: &'static str,
}

pub const PLOT_STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy {
        selector: r#"[data-testid="plot"] span"#,
        description: "standard plot",
    },
    ExtractionStrategy {
        selector: r#"[data-testid="storyline-plot-summary"]"#,
        description: "storyline section",
    },
    ExtractionStrategy {
        selector: r#"[data-testid="plot-xs_to_m"]"#,
        description: "compact plot",
    },
    ExtractionStrategy {
        selector: ".ipc-html-content-inner-div",
        description: "general content",
    },
    ExtractionStrategy {
        selector: r#"[data-testid="sub-section-summary"]"#,
        description: "summary section",
    },
    ExtractionStrategy {
        selector: ".sc-5f699a2-0.kKUuxe",
        description: "fallback class",
    },
];

/// How the listing exposes the next batch of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationControl {
    /// An anchor whose `href` is the next page
    NextLink(&'static str),
    /// A "load more" button; the next page is the current one shifted by
    /// the number of results already shown
    LoadMore(&'static str),
}

pub const PAGINATION_STRATEGIES: &[PaginationControl] = &[
    PaginationControl::NextLink(r#"a[rel="next"]"#),
    PaginationControl::NextLink("a.lister-page-next"),
    PaginationControl::LoadMore("button.ipc-see-more__button:not([disabled])"),
];

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = css, error = ?e, "Invalid CSS selector");
            None
        }
    }
}

/// Rendered text of an element with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detail-page URLs in page order, without query or fragment, deduplicated
pub fn detail_links(html: &str, base: &Url) -> Vec<Url> {
    let Some(link_selector) = selector(LISTING_LINK_SELECTOR) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut links: Vec<Url> = Vec::new();
    for element in document.select(&link_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = base.join(href) else {
            tracing::debug!(href = href, "Skipping unparsable link");
            continue;
        };
        url.set_query(None);
        url.set_fragment(None);
        if !links.contains(&url) {
            links.push(url);
        }
    }
    links
}

/// Whether the listing cards are present yet
pub fn has_listing(html: &str) -> bool {
    has_element(html, LISTING_LINK_SELECTOR)
}

/// Whether the detail page has rendered its title
pub fn has_title(html: &str) -> bool {
    has_element(html, TITLE_SELECTOR)
}

fn has_element(html: &str, css: &str) -> bool {
    let Some(selector) = selector(css) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}

/// Movie title from a detail page
pub fn title(html: &str) -> Option<String> {
    let selector = selector(TITLE_SELECTOR)?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Plot summary from the first strategy that yields enough text
pub fn plot(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for strategy in PLOT_STRATEGIES {
        let Some(selector) = selector(strategy.selector) else {
            continue;
        };
        let found = document
            .select(&selector)
            .map(element_text)
            .find(|text| text.chars().count() > MIN_PLOT_CHARS);
        if let Some(text) = found {
            tracing::debug!(strategy = strategy.description, "Plot extracted");
            return Some(text);
        }
    }
    None
}

/// URL of the next listing page, if the page offers one
pub fn next_page(html: &str, current: &Url, shown: usize) -> Option<Url> {
    let document = Html::parse_document(html);

    for control in PAGINATION_STRATEGIES {
        match *control {
            PaginationControl::NextLink(css) => {
                let Some(selector) = selector(css) else {
                    continue;
                };
                let next = document
                    .select(&selector)
                    .filter_map(|element| element.value().attr("href"))
                    .find_map(|href| current.join(href).ok());
                if next.is_some() {
                    return next;
                }
            }
            PaginationControl::LoadMore(css) => {
                let Some(selector) = selector(css) else {
                    continue;
                };
                if shown > 0 && document.select(&selector).next().is_some() {
                    return Some(advance_start(current, shown));
                }
            }
        }
    }
    None
}

/// Moves the `start` query parameter forward by `shown` results
fn advance_start(current: &Url, shown: usize) -> Url {
    let start = current
        .query_pairs()
        .find(|(key, _)| key == START_PARAM)
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(1);

    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != START_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut next = current.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(START_PARAM, &(start + shown).to_string());
    next
}

//! Platform adapters.
//!
//! Each job-board platform gets one [`SourceAdapter`] that knows its page
//! structure. Fetching, failure isolation and filtering are shared through
//! the provided [`SourceAdapter::fetch_and_extract`].

mod greenhouse;
mod lever;

pub use greenhouse::GreenhouseAdapter;
pub use lever::LeverAdapter;

use async_trait::async_trait;
use common::{JobListing, SearchQuery};
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use crate::fetch::{fetch_with_retry, PageFetcher, RetryPolicy};
use crate::registry::{PlatformType, SourceTarget};

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> PlatformType;

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
    }

    /// Parses every well-formed listing on a board page, unfiltered.
    /// Entries missing a title, location element or link are skipped. A
    /// location element with no text yields an empty location.
    fn extract_listings(&self, target: &SourceTarget, page: &str) -> Vec<JobListing>;

    /// Fetches the target's board and returns the listings matching `query`.
    ///
    /// Never fails: a source that cannot be fetched contributes nothing.
    async fn fetch_and_extract(
        &self,
        fetcher: &dyn PageFetcher,
        target: &SourceTarget,
        query: &SearchQuery,
    ) -> Vec<JobListing> {
        let url = target.endpoint_url();
        let page = match fetch_with_retry(fetcher, url, self.retry_policy()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    source = %self.platform(),
                    url = %url,
                    error = %e,
                    "Source unavailable, skipping"
                );
                return Vec::new();
            }
        };

        let listings = self.extract_listings(target, &page);
        let found = listings.len();
        let matching: Vec<JobListing> = listings
            .into_iter()
            .filter(|job| {
                query.matches_title(&job.title) && query.matches_location(&job.location)
            })
            .collect();

        debug!(
            source = %self.platform(),
            url = %url,
            found,
            matching = matching.len(),
            "Extracted listings"
        );
        matching
    }
}

/// Cleaned text of the first descendant matching `selector`, possibly empty.
fn element_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| common::clean_text(&el.text().collect::<String>()))
}

/// Like [`element_text`] but blank text counts as missing.
fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element_text(element, selector).filter(|text| !text.is_empty())
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

/// `href` of the first descendant matching `selector`.
fn first_href<'a>(element: &ElementRef<'a>, selector: &Selector) -> Option<&'a str> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
}

use common::{resolve_url, JobListing};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{element_text, first_href, first_text, selector, SourceAdapter};
use crate::fetch::RetryPolicy;
use crate::registry::{PlatformType, SourceTarget};

pub const LEVER_BASE_URL: &str = "https://jobs.lever.co";

/// Lever boards list each job as `div.posting` with an `h5` title, an
/// `a.posting-btn` apply link and a `span.sort-by-location`.
pub struct LeverAdapter {
    base_url: Url,
    retry: RetryPolicy,
    posting: Selector,
    title: Selector,
    apply_link: Selector,
    // Newer boards only link the title block.
    title_link: Selector,
    location: Selector,
}

impl Default for LeverAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LeverAdapter {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(LEVER_BASE_URL).expect("valid Lever base URL"),
            retry: RetryPolicy::default(),
            posting: selector("div.posting"),
            title: selector("h5"),
            apply_link: selector("a.posting-btn"),
            title_link: selector("a.posting-title"),
            location: selector("span.sort-by-location"),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl SourceAdapter for LeverAdapter {
    fn platform(&self) -> PlatformType {
        PlatformType::Lever
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn extract_listings(&self, target: &SourceTarget, page: &str) -> Vec<JobListing> {
        let document = Html::parse_document(page);

        let mut listings = Vec::new();
        for posting in document.select(&self.posting) {
            let (Some(title), Some(location)) = (
                first_text(&posting, &self.title),
                element_text(&posting, &self.location),
            ) else {
                continue;
            };

            let href = first_href(&posting, &self.apply_link)
                .or_else(|| first_href(&posting, &self.title_link));
            let Some(url) = href.and_then(|href| resolve_url(&self.base_url, href)) else {
                debug!(title = %title, "Lever posting without apply link");
                continue;
            };

            listings.push(JobListing::new(&title, target.company(), &location, url));
        }
        listings
    }
}

use common::{resolve_url, JobListing};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{element_text, first_href, first_text, selector, SourceAdapter};
use crate::fetch::RetryPolicy;
use crate::registry::{PlatformType, SourceTarget};

pub const GREENHOUSE_BASE_URL: &str = "https://boards.greenhouse.io";

/// Greenhouse boards list each job as `div.opening` holding the title link
/// and a `span.location`.
pub struct GreenhouseAdapter {
    base_url: Url,
    retry: RetryPolicy,
    opening: Selector,
    link: Selector,
    location: Selector,
}

impl Default for GreenhouseAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GreenhouseAdapter {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(GREENHOUSE_BASE_URL).expect("valid Greenhouse base URL"),
            retry: RetryPolicy::default(),
            opening: selector("div.opening"),
            link: selector("a"),
            location: selector("span.location"),
        }
    }

    /// Base that relative listing links are resolved against.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl SourceAdapter for GreenhouseAdapter {
    fn platform(&self) -> PlatformType {
        PlatformType::Greenhouse
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn extract_listings(&self, target: &SourceTarget, page: &str) -> Vec<JobListing> {
        let document = Html::parse_document(page);

        let mut listings = Vec::new();
        for opening in document.select(&self.opening) {
            let Some(title) = first_text(&opening, &self.link) else {
                continue;
            };
            let Some(location) = element_text(&opening, &self.location) else {
                continue;
            };
            let Some(url) = first_href(&opening, &self.link)
                .and_then(|href| resolve_url(&self.base_url, href))
            else {
                debug!(title = %title, "Greenhouse opening without usable link");
                continue;
            };

            listings.push(JobListing::new(&title, target.company(), &location, url));
        }
        listings
    }
}

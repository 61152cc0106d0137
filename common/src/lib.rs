//! Shared job model for the aggregator.
//!
//! Every source adapter produces [`JobListing`] records and every search is
//! described by a [`SearchQuery`]. The [`normalize`] module holds the text and
//! URL helpers all adapters use to build those records.

pub mod normalize;
pub mod query;

pub use normalize::{clean_text, derive_company_from_url, resolve_url};
pub use query::{QueryError, SearchQuery};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder description for listings whose body was not scraped.
pub const NO_DESCRIPTION: &str = "N/A";

/// Canonical job record returned to callers regardless of source platform.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Absolute URL of the posting. Sole identity key for deduplication.
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relevance in 0..=100, 0 when unscored.
    #[serde(default)]
    pub match_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<NaiveDate>,
}

impl JobListing {
    /// Builds a listing with the placeholder fields adapters cannot fill yet.
    ///
    /// `title` and `location` are passed through [`clean_text`].
    pub fn new(
        title: &str,
        company: impl Into<String>,
        location: &str,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: clean_text(title),
            company: company.into(),
            location: clean_text(location),
            url: url.into(),
            description: NO_DESCRIPTION.to_string(),
            tags: Vec::new(),
            match_score: 0,
            posted_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        let description = clean_text(description);
        if !description.is_empty() {
            self.description = description;
        }
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the score, clamped to 100.
    pub fn with_match_score(mut self, score: u8) -> Self {
        self.match_score = score.min(100);
        self
    }

    pub fn with_posted_at(mut self, posted_at: NaiveDate) -> Self {
        self.posted_at = Some(posted_at);
        self
    }
}

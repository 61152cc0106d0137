use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format accepted for `after_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reasons a search request is rejected before any source is queried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query parameter is required")]
    EmptyQuery,

    #[error("after_date must be formatted as YYYY-MM-DD, got {value:?}")]
    InvalidDate { value: String },
}

/// Search criteria applied to every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default)]
    pub after_date: Option<NaiveDate>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            remote_only: false,
            after_date: None,
        }
    }

    /// Builds a validated query from raw request parameters.
    ///
    /// A blank `after_date` is treated as absent.
    pub fn parse(
        query: &str,
        remote_only: bool,
        after_date: Option<&str>,
    ) -> Result<Self, QueryError> {
        let after_date = match after_date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                QueryError::InvalidDate {
                    value: raw.to_string(),
                }
            })?),
            None => None,
        };

        let search = Self {
            query: query.trim().to_string(),
            remote_only,
            after_date,
        };
        search.validate()?;
        Ok(search)
    }

    pub fn remote_only(mut self, remote_only: bool) -> Self {
        self.remote_only = remote_only;
        self
    }

    pub fn after(mut self, date: NaiveDate) -> Self {
        self.after_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        Ok(())
    }

    /// Case-insensitive substring match of the query against a title.
    pub fn matches_title(&self, title: &str) -> bool {
        title
            .to_lowercase()
            .contains(&self.query.trim().to_lowercase())
    }

    /// With `remote_only`, the location must mention "remote".
    pub fn matches_location(&self, location: &str) -> bool {
        !self.remote_only || location.to_lowercase().contains("remote")
    }

    /// Listings without a known posting date are kept.
    pub fn accepts_posted_on(&self, posted_at: Option<NaiveDate>) -> bool {
        match (self.after_date, posted_at) {
            (Some(cutoff), Some(posted)) => posted >= cutoff,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_rejects_empty_query() {
        assert_eq!(SearchQuery::parse("", false, None), Err(QueryError::EmptyQuery));
        assert_eq!(SearchQuery::parse("   ", true, None), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn test_parse_reads_date() {
        let query = SearchQuery::parse("data engineer", true, Some("2025-07-29")).unwrap();
        assert_eq!(query.after_date, Some(date(2025, 7, 29)));
        assert!(query.remote_only);
    }

    #[test]
    fn test_parse_blank_date_is_absent() {
        let query = SearchQuery::parse("rust", false, Some("")).unwrap();
        assert_eq!(query.after_date, None);
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert_eq!(
            SearchQuery::parse("rust", false, Some("29/07/2025")),
            Err(QueryError::InvalidDate {
                value: "29/07/2025".to_string()
            })
        );
    }

    #[test]
    fn test_title_match_is_case_insensitive_substring() {
        let query = SearchQuery::new("data engineer");
        assert!(query.matches_title("Senior Data Engineer"));
        assert!(!query.matches_title("Machine Learning Engineer"));
    }

    #[test]
    fn test_remote_only_requires_remote_location() {
        let query = SearchQuery::new("engineer").remote_only(true);
        assert!(query.matches_location("REMOTE - Europe"));
        assert!(!query.matches_location("São Paulo, SP (Híbrido)"));

        let anywhere = SearchQuery::new("engineer");
        assert!(anywhere.matches_location("São Paulo, SP (Híbrido)"));
    }

    #[test]
    fn test_date_cutoff_is_inclusive_and_lenient() {
        let query = SearchQuery::new("engineer").after(date(2025, 7, 29));
        assert!(query.accepts_posted_on(Some(date(2025, 7, 29))));
        assert!(query.accepts_posted_on(Some(date(2025, 8, 1))));
        assert!(!query.accepts_posted_on(Some(date(2025, 7, 28))));
        assert!(query.accepts_posted_on(None));
    }

    #[test]
    fn test_no_cutoff_accepts_everything() {
        let query = SearchQuery::new("engineer");
        assert!(query.accepts_posted_on(Some(date(1999, 1, 1))));
    }
}

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::fetch::RetryPolicy;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEARCH_DEADLINE: Duration = Duration::from_secs(15);

/// Scraper configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Per-attempt HTTP timeout
    pub fetch_timeout: Duration,
    /// Upper bound on everything one source may take, retries included
    pub search_deadline: Duration,
    pub retry: RetryPolicy,
    /// JSON registry file; the built-in registry is used when unset
    pub sources_file: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            search_deadline: DEFAULT_SEARCH_DEADLINE,
            retry: RetryPolicy::default(),
            sources_file: None,
            user_agent: None,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let retry = RetryPolicy::new(
            read_u32("JOBS_FETCH_MAX_ATTEMPTS")?.unwrap_or(defaults.retry.max_attempts),
            read_number("JOBS_FETCH_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.initial_backoff),
        );

        Ok(Self {
            fetch_timeout: read_number("JOBS_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            search_deadline: read_number("JOBS_SEARCH_DEADLINE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.search_deadline),
            retry,
            sources_file: env::var("JOBS_SOURCES_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            user_agent: env::var("JOBS_USER_AGENT")
                .ok()
                .filter(|ua| !ua.trim().is_empty()),
        })
    }
}

fn read_number(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(None),
    }
}

fn read_u32(name: &'static str) -> Result<Option<u32>, ConfigError> {
    read_number(name)?
        .map(|n| {
            u32::try_from(n).map_err(|_| ConfigError::InvalidNumber {
                name,
                value: n.to_string(),
            })
        })
        .transpose()
}

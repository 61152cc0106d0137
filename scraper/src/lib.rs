//! Job board scraper
//!
//! Queries Greenhouse and Lever boards concurrently, normalizes every posting
//! into a [`common::JobListing`] and returns one merged, deduplicated list.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use job_scraper::{Aggregator, HttpFetcher, SourceRegistry};
//!
//! let engine = Aggregator::new(
//!     Arc::new(SourceRegistry::builtin()),
//!     Arc::new(HttpFetcher::new()?),
//! );
//! let jobs = engine.search("data engineer", true, None).await?;
//! ```

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod fetch;
pub mod registry;
pub mod testing;

pub use adapters::{GreenhouseAdapter, LeverAdapter, SourceAdapter};
pub use aggregator::Aggregator;
pub use config::ScraperConfig;
pub use error::{ConfigError, RegistryError, SearchError, SourceError};
pub use fetch::{HttpFetcher, PageFetcher, RetryPolicy};
pub use registry::{PlatformType, SourceRegistry, SourceTarget};

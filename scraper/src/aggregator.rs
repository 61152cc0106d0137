//! Fans a search out to every registered board and merges the results.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use common::{JobListing, SearchQuery};
use futures::future::join_all;
use tracing::{info, warn};

use crate::adapters::{GreenhouseAdapter, LeverAdapter, SourceAdapter};
use crate::config::{ScraperConfig, DEFAULT_SEARCH_DEADLINE};
use crate::error::{Result, SearchError};
use crate::fetch::PageFetcher;
use crate::registry::{PlatformType, SourceRegistry, SourceTarget};

/// Aggregation engine. Cheap to share behind an `Arc`; holds no per-search
/// state.
pub struct Aggregator {
    registry: Arc<SourceRegistry>,
    fetcher: Arc<dyn PageFetcher>,
    adapters: HashMap<PlatformType, Arc<dyn SourceAdapter>>,
    deadline: Duration,
}

impl Aggregator {
    /// Engine with the built-in Greenhouse and Lever adapters.
    pub fn new(registry: Arc<SourceRegistry>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            registry,
            fetcher,
            adapters: HashMap::new(),
            deadline: DEFAULT_SEARCH_DEADLINE,
        }
        .with_adapter(Arc::new(GreenhouseAdapter::new()))
        .with_adapter(Arc::new(LeverAdapter::new()))
    }

    /// Engine configured from [`ScraperConfig`]: deadline and retry policy.
    pub fn from_config(
        config: &ScraperConfig,
        registry: Arc<SourceRegistry>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self::new(registry, fetcher)
            .with_deadline(config.search_deadline)
            .with_adapter(Arc::new(GreenhouseAdapter::new().with_retry(config.retry)))
            .with_adapter(Arc::new(LeverAdapter::new().with_retry(config.retry)))
    }

    /// Registers an adapter, replacing any previous one for its platform.
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(adapter.platform(), adapter);
        self
    }

    /// Maximum time one source may take before it counts as empty.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Request-boundary form of [`Aggregator::search_jobs`] taking raw
    /// parameters.
    pub async fn search(
        &self,
        query: &str,
        remote_only: bool,
        after_date: Option<&str>,
    ) -> Result<Vec<JobListing>> {
        let query = SearchQuery::parse(query, remote_only, after_date)?;
        self.search_jobs(&query).await
    }

    /// Queries every source concurrently and returns the merged listings.
    ///
    /// Sources that fail or exceed the deadline contribute nothing. Results
    /// are deduplicated by URL with the earliest registry position winning,
    /// then sorted by match score (stable).
    pub async fn search_jobs(&self, query: &SearchQuery) -> Result<Vec<JobListing>> {
        query.validate()?;

        let dispatch = self
            .registry
            .targets()
            .iter()
            .map(|target| {
                self.adapters
                    .get(&target.platform())
                    .map(|adapter| (target, Arc::clone(adapter)))
                    .ok_or_else(|| {
                        SearchError::Internal(format!(
                            "no adapter registered for platform {} ({})",
                            target.platform(),
                            target.endpoint_url()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            query = %query.query,
            remote_only = query.remote_only,
            sources = dispatch.len(),
            "Searching job boards"
        );

        // join_all keeps input order, so results line up with the registry.
        let per_source = join_all(
            dispatch
                .into_iter()
                .map(|(target, adapter)| self.fetch_source(target, adapter, query)),
        )
        .await;

        let jobs = merge(per_source, query);
        info!(query = %query.query, results = jobs.len(), "Search complete");
        Ok(jobs)
    }

    async fn fetch_source(
        &self,
        target: &SourceTarget,
        adapter: Arc<dyn SourceAdapter>,
        query: &SearchQuery,
    ) -> Vec<JobListing> {
        let work = adapter.fetch_and_extract(self.fetcher.as_ref(), target, query);
        match tokio::time::timeout(self.deadline, work).await {
            Ok(jobs) => jobs,
            Err(_) => {
                warn!(
                    source = %target.platform(),
                    url = %target.endpoint_url(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Source timed out, skipping"
                );
                Vec::new()
            }
        }
    }
}

/// Concatenates per-source results in order, drops repeated URLs, applies the
/// date cutoff and sorts by score.
fn merge(per_source: Vec<Vec<JobListing>>, query: &SearchQuery) -> Vec<JobListing> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut jobs: Vec<JobListing> = per_source
        .into_iter()
        .flatten()
        .filter(|job| seen_urls.insert(job.url.clone()))
        .filter(|job| query.accepts_posted_on(job.posted_at))
        .collect();

    // Stable: equal scores keep registry order.
    jobs.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RetryPolicy;
    use crate::testing::{greenhouse_board, lever_board, StaticFetcher, StaticResponse};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use common::QueryError;

    const GREENHOUSE: &str = "https://boards.greenhouse.io/techcorp";
    const LEVER: &str = "https://jobs.lever.co/dataflowinc";

    fn registry() -> Arc<SourceRegistry> {
        Arc::new(SourceRegistry::new(vec![
            SourceTarget::new(PlatformType::Greenhouse, GREENHOUSE).unwrap(),
            SourceTarget::new(PlatformType::Lever, LEVER).unwrap(),
        ]))
    }

    fn aggregator(fetcher: StaticFetcher) -> (Aggregator, Arc<StaticFetcher>) {
        let fetcher = Arc::new(fetcher);
        let engine = Aggregator::new(registry(), fetcher.clone())
            .with_deadline(Duration::from_millis(200))
            .with_adapter(Arc::new(GreenhouseAdapter::new().with_retry(RetryPolicy::none())))
            .with_adapter(Arc::new(LeverAdapter::new().with_retry(RetryPolicy::none())));
        (engine, fetcher)
    }

    /// Adapter serving fixed listings, standing in for a board that exposes
    /// scores and posting dates.
    struct FixtureAdapter {
        platform: PlatformType,
        jobs: Vec<JobListing>,
    }

    #[async_trait]
    impl SourceAdapter for FixtureAdapter {
        fn platform(&self) -> PlatformType {
            self.platform
        }

        fn extract_listings(&self, _target: &SourceTarget, _page: &str) -> Vec<JobListing> {
            self.jobs.clone()
        }

        async fn fetch_and_extract(
            &self,
            _fetcher: &dyn PageFetcher,
            _target: &SourceTarget,
            query: &SearchQuery,
        ) -> Vec<JobListing> {
            self.jobs
                .iter()
                .filter(|job| query.matches_title(&job.title))
                .cloned()
                .collect()
        }
    }

    fn fixture(platform: PlatformType, jobs: Vec<JobListing>) -> Arc<dyn SourceAdapter> {
        Arc::new(FixtureAdapter { platform, jobs })
    }

    fn job(title: &str, url: &str, score: u8) -> JobListing {
        JobListing::new(title, "techcorp", "Remote", url).with_match_score(score)
    }

    #[tokio::test]
    async fn test_one_source_times_out() {
        let page = greenhouse_board(&[
            ("Data Engineer", "Remote", "/techcorp/jobs/1"),
            ("Office Manager", "Remote", "/techcorp/jobs/2"),
        ]);
        let (engine, _) = aggregator(
            StaticFetcher::new()
                .with(GREENHOUSE, StaticResponse::Page(page))
                .with(LEVER, StaticResponse::Hang),
        );

        let jobs = engine.search("data engineer", false, None).await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Data Engineer");
        assert_eq!(jobs[0].url, "https://boards.greenhouse.io/techcorp/jobs/1");
    }

    #[tokio::test]
    async fn test_all_sources_down_is_empty_not_error() {
        let (engine, fetcher) = aggregator(
            StaticFetcher::new()
                .with(GREENHOUSE, StaticResponse::Status(502))
                .with(LEVER, StaticResponse::Status(404)),
        );

        let jobs = engine.search("engineer", true, None).await.unwrap();

        assert!(jobs.is_empty());
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_requests() {
        let (engine, fetcher) = aggregator(StaticFetcher::new());

        let err = engine.search("  ", false, None).await.unwrap_err();

        assert!(matches!(err, SearchError::InvalidQuery(QueryError::EmptyQuery)));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_search_jobs_validates_hand_built_query() {
        let (engine, fetcher) = aggregator(StaticFetcher::new());

        let result = engine.search_jobs(&SearchQuery::new("")).await;

        assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected() {
        let (engine, _) = aggregator(StaticFetcher::new());
        let err = engine.search("rust", false, Some("yesterday")).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(QueryError::InvalidDate { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_urls_keep_earlier_source() {
        let shared = "https://jobs.example.com/42";
        let greenhouse = greenhouse_board(&[("Data Engineer", "Remote", shared)]);
        let lever = lever_board(&[("Data Engineer II", "Remote", shared)]);
        let (engine, _) = aggregator(
            StaticFetcher::new()
                .with(GREENHOUSE, StaticResponse::Page(greenhouse))
                .with(LEVER, StaticResponse::Page(lever)),
        );

        let jobs = engine.search("data engineer", false, None).await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "techcorp");
        assert_eq!(jobs[0].title, "Data Engineer");
    }

    #[tokio::test]
    async fn test_results_follow_registry_order_not_completion_order() {
        let (engine, _) = aggregator(
            StaticFetcher::new()
                .with(
                    GREENHOUSE,
                    StaticResponse::Delayed(
                        Duration::from_millis(50),
                        greenhouse_board(&[("Data Engineer", "Remote", "/techcorp/jobs/1")]),
                    ),
                )
                .with(
                    LEVER,
                    StaticResponse::Page(lever_board(&[(
                        "Data Engineer",
                        "Remote",
                        "/dataflowinc/1",
                    )])),
                ),
        );

        let jobs = engine.search("data engineer", false, None).await.unwrap();

        let companies: Vec<_> = jobs.iter().map(|j| j.company.as_str()).collect();
        assert_eq!(companies, vec!["techcorp", "dataflowinc"]);
    }

    #[tokio::test]
    async fn test_remote_only_applies_across_sources() {
        let greenhouse = greenhouse_board(&[("Data Engineer", "Austin, TX", "/techcorp/jobs/1")]);
        let lever = lever_board(&[("Data Engineer", "Remote (EU)", "/dataflowinc/1")]);
        let (engine, _) = aggregator(
            StaticFetcher::new()
                .with(GREENHOUSE, StaticResponse::Page(greenhouse))
                .with(LEVER, StaticResponse::Page(lever)),
        );

        let jobs = engine.search("Data Engineer", true, None).await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].location, "Remote (EU)");
    }

    #[tokio::test]
    async fn test_sorted_by_score_descending() {
        let (engine, _) = aggregator(StaticFetcher::new());
        let engine = engine
            .with_adapter(fixture(
                PlatformType::Greenhouse,
                vec![
                    job("Data Engineer", "https://x.io/1", 85),
                    job("Senior Data Engineer", "https://x.io/2", 92),
                ],
            ))
            .with_adapter(fixture(
                PlatformType::Lever,
                vec![job("Data Engineer, ML", "https://x.io/3", 78)],
            ));

        let jobs = engine.search("data engineer", false, None).await.unwrap();

        let scores: Vec<u8> = jobs.iter().map(|j| j.match_score).collect();
        assert_eq!(scores, vec![92, 85, 78]);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_source_order() {
        let (engine, _) = aggregator(StaticFetcher::new());
        let engine = engine
            .with_adapter(fixture(
                PlatformType::Greenhouse,
                vec![
                    job("Engineer A", "https://x.io/a", 0),
                    job("Engineer B", "https://x.io/b", 0),
                ],
            ))
            .with_adapter(fixture(
                PlatformType::Lever,
                vec![job("Engineer C", "https://x.io/c", 0)],
            ));

        let jobs = engine.search("engineer", false, None).await.unwrap();

        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Engineer A", "Engineer B", "Engineer C"]);
    }

    #[tokio::test]
    async fn test_date_cutoff_keeps_undated_listings() {
        let cutoff = NaiveDate::from_ymd_opt(2025, 7, 29).unwrap();
        let (engine, _) = aggregator(StaticFetcher::new());
        let engine = engine
            .with_adapter(fixture(
                PlatformType::Greenhouse,
                vec![
                    job("Engineer old", "https://x.io/old", 0)
                        .with_posted_at(cutoff.pred_opt().unwrap()),
                    job("Engineer new", "https://x.io/new", 0).with_posted_at(cutoff),
                    job("Engineer undated", "https://x.io/undated", 0),
                ],
            ))
            .with_adapter(fixture(PlatformType::Lever, vec![]));

        let jobs = engine.search("engineer", false, Some("2025-07-29")).await.unwrap();

        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Engineer new", "Engineer undated"]);
    }

    #[tokio::test]
    async fn test_missing_adapter_is_internal_error() {
        let fetcher = Arc::new(StaticFetcher::new());
        let mut engine = Aggregator::new(registry(), fetcher.clone());
        engine.adapters.remove(&PlatformType::Lever);

        let err = engine.search("engineer", false, None).await.unwrap_err();

        assert!(matches!(err, SearchError::Internal(_)));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_registry_returns_empty() {
        let engine = Aggregator::new(
            Arc::new(SourceRegistry::default()),
            Arc::new(StaticFetcher::new()),
        );
        assert!(engine.search("engineer", false, None).await.unwrap().is_empty());
    }

    #[test]
    fn test_merge_dedupes_within_one_source() {
        let query = SearchQuery::new("engineer");
        let merged = merge(
            vec![vec![
                job("Engineer", "https://x.io/1", 0),
                job("Engineer (copy)", "https://x.io/1", 10),
            ]],
            &query,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Engineer");
    }
}

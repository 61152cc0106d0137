//! In-memory fetcher for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::fetch::PageFetcher;

/// Canned response for one URL.
#[derive(Debug, Clone)]
pub enum StaticResponse {
    Page(String),
    Status(u16),
    /// Respond after the given delay.
    Delayed(Duration, String),
    /// Never respond.
    Hang,
}

impl StaticResponse {
    pub fn page(body: impl Into<String>) -> Self {
        Self::Page(body.into())
    }
}

/// Serves canned pages keyed by URL and records how often each was requested.
/// Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, StaticResponse>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, response: StaticResponse) -> Self {
        self.responses.insert(normalize(url), response);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&normalize(url)).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> SourceResult<String> {
        let key = url.to_string();
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(key.clone()).or_default() += 1;
        }

        match self.responses.get(&key).cloned() {
            Some(StaticResponse::Page(body)) => Ok(body),
            Some(StaticResponse::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(StaticResponse::Hang) => std::future::pending().await,
            Some(StaticResponse::Status(status)) => Err(SourceError::Status { url: key, status }),
            None => Err(SourceError::Status {
                url: key,
                status: 404,
            }),
        }
    }
}

/// Renders a Greenhouse board page from `(title, location, href)` rows.
pub fn greenhouse_board(openings: &[(&str, &str, &str)]) -> String {
    let rows: String = openings
        .iter()
        .map(|(title, location, href)| {
            format!(
                r#"<div class="opening"><a data-mapped="true" href="{href}">{title}</a><br><span class="location">{location}</span></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><section class="level-0">{rows}</section></body></html>"#)
}

/// Renders a Lever board page from `(title, location, href)` rows.
pub fn lever_board(postings: &[(&str, &str, &str)]) -> String {
    let rows: String = postings
        .iter()
        .map(|(title, location, href)| {
            format!(
                r#"<div class="posting"><div class="posting-apply"><a class="posting-btn" href="{href}">Apply</a></div><h5>{title}</h5><div class="posting-categories"><span class="sort-by-location posting-category">{location}</span></div></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="postings-group">{rows}</div></body></html>"#)
}

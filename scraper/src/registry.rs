//! Static list of job boards queried by every search.

use std::fmt;
use std::path::Path;

use common::derive_company_from_url;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RegistryError;

/// Job-board platform family. Each has its own page structure and adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Greenhouse,
    Lever,
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greenhouse => f.write_str("greenhouse"),
            Self::Lever => f.write_str("lever"),
        }
    }
}

/// One company's listing page on a given platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTarget {
    platform: PlatformType,
    endpoint_url: Url,
    company: String,
}

impl SourceTarget {
    pub fn new(platform: PlatformType, endpoint: &str) -> Result<Self, RegistryError> {
        let endpoint_url = Url::parse(endpoint)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .ok_or_else(|| RegistryError::UnsupportedEndpoint {
                url: endpoint.to_string(),
            })?;

        let company =
            derive_company_from_url(endpoint).ok_or_else(|| RegistryError::NoCompany {
                url: endpoint.to_string(),
            })?;

        Ok(Self {
            platform,
            endpoint_url,
            company,
        })
    }

    pub fn platform(&self) -> PlatformType {
        self.platform
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint_url
    }

    /// Company name derived from the endpoint path.
    pub fn company(&self) -> &str {
        &self.company
    }
}

#[derive(Debug, Deserialize)]
struct TargetEntry {
    platform: PlatformType,
    endpoint_url: String,
}

/// Ordered set of targets. Order is significant: it decides which listing
/// survives deduplication.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    targets: Vec<SourceTarget>,
}

impl SourceRegistry {
    pub fn new(targets: Vec<SourceTarget>) -> Self {
        Self { targets }
    }

    /// Boards queried when no registry file is configured.
    pub fn builtin() -> Self {
        let defaults = [
            (PlatformType::Greenhouse, "https://boards.greenhouse.io/techcorp"),
            (PlatformType::Lever, "https://jobs.lever.co/dataflowinc"),
        ];
        Self::new(
            defaults
                .into_iter()
                .filter_map(|(platform, url)| SourceTarget::new(platform, url).ok())
                .collect(),
        )
    }

    /// Parses a JSON array of `{"platform": "...", "endpoint_url": "..."}`.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let entries: Vec<TargetEntry> = serde_json::from_str(json)?;
        let targets = entries
            .into_iter()
            .map(|entry| SourceTarget::new(entry.platform, &entry.endpoint_url))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(targets))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn targets(&self) -> &[SourceTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order() {
        let registry = SourceRegistry::builtin();
        let platforms: Vec<_> = registry.targets().iter().map(|t| t.platform()).collect();
        assert_eq!(platforms, vec![PlatformType::Greenhouse, PlatformType::Lever]);
        assert_eq!(registry.targets()[0].company(), "techcorp");
        assert_eq!(registry.targets()[1].company(), "dataflowinc");
    }

    #[test]
    fn test_from_json() {
        let registry = SourceRegistry::from_json_str(
            r#"[
                {"platform": "lever", "endpoint_url": "https://jobs.lever.co/acme/"},
                {"platform": "greenhouse", "endpoint_url": "https://boards.greenhouse.io/globex"}
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.targets()[0].platform(), PlatformType::Lever);
        assert_eq!(registry.targets()[0].company(), "acme");
        assert_eq!(registry.targets()[1].company(), "globex");
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let err = SourceRegistry::from_json_str(
            r#"[{"platform": "workday", "endpoint_url": "https://acme.workday.com/jobs"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn test_non_http_endpoint_is_rejected() {
        let err = SourceTarget::new(PlatformType::Lever, "ftp://jobs.lever.co/acme").unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedEndpoint { .. }));

        let err = SourceTarget::new(PlatformType::Lever, "jobs.lever.co/acme").unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedEndpoint { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = SourceRegistry::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_platform_display_matches_serde() {
        assert_eq!(PlatformType::Greenhouse.to_string(), "greenhouse");
        assert_eq!(
            serde_json::to_string(&PlatformType::Lever).unwrap(),
            "\"lever\""
        );
    }
}

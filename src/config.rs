//! Runtime configuration read from the environment.

use crate::analysis::Analyzer;
use crate::client::DEFAULT_USER_AGENT;
use crate::error::{CiteMapError, Result};
use crate::geocode::{GeocodeCache, NominatimClient, DEFAULT_NOMINATIM_URL};
use crate::sources::{GoogleScholarSource, OpenAlexSource, SemanticScholarSource};
use crate::types::{AnalysisLimits, SourceKind};
use std::net::SocketAddr;
use std::sync::Arc;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub default_source: SourceKind,
    pub semantic_scholar_api_key: Option<String>,
    /// Contact address for the OpenAlex polite pool.
    pub openalex_mailto: Option<String>,
    pub nominatim_url: String,
    /// User-Agent sent to Nominatim, which rejects anonymous clients.
    pub user_agent: String,
    pub limits: AnalysisLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            default_source: SourceKind::OpenAlex,
            semantic_scholar_api_key: None,
            openalex_mailto: None,
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            limits: AnalysisLimits::default(),
        }
    }
}

impl Config {
    /// Read configuration from `CITEMAP_*` and related environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("CITEMAP_BIND") {
            config.bind = parse_bind(&bind)?;
        }
        if let Some(source) = get("CITEMAP_DEFAULT_SOURCE") {
            config.default_source = parse_source(&source)?;
        }
        config.semantic_scholar_api_key = get("SEMANTIC_SCHOLAR_API_KEY");
        config.openalex_mailto = get("OPENALEX_MAILTO");
        if let Some(url) = get("NOMINATIM_URL") {
            config.nominatim_url = url;
        }
        if let Some(agent) = get("CITEMAP_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(cap) = get("CITEMAP_MAX_PAPERS_CAP") {
            config.limits.max_papers = parse_cap("CITEMAP_MAX_PAPERS_CAP", &cap)?;
        }
        if let Some(cap) = get("CITEMAP_MAX_CITATIONS_CAP") {
            config.limits.max_citations = parse_cap("CITEMAP_MAX_CITATIONS_CAP", &cap)?;
        }

        Ok(config)
    }

    /// Build an analyzer with every source and the Nominatim geocoder.
    pub fn build_analyzer(&self) -> Result<Analyzer> {
        let nominatim = NominatimClient::new(&self.nominatim_url, &self.user_agent)?;
        let analyzer = Analyzer::new(
            self.default_source,
            GeocodeCache::new(Arc::new(nominatim)),
        )
        .with_limits(self.limits)
        .with_source(Arc::new(OpenAlexSource::new(self.openalex_mailto.as_deref())?))
        .with_source(Arc::new(SemanticScholarSource::new(
            self.semantic_scholar_api_key.as_deref(),
        )?))
        .with_source(Arc::new(GoogleScholarSource::new()?));
        Ok(analyzer)
    }
}

pub fn parse_bind(value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|_| CiteMapError::Config(format!("Invalid bind address: {}", value)))
}

pub fn parse_source(value: &str) -> Result<SourceKind> {
    SourceKind::from_str_loose(value).ok_or_else(|| {
        CiteMapError::Config(format!(
            "Unknown source '{}'. Valid: openalex, semantic_scholar, google_scholar",
            value
        ))
    })
}

fn parse_cap(key: &str, value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CiteMapError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.default_source, SourceKind::OpenAlex);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("CITEMAP_BIND", "0.0.0.0:8080"),
            ("CITEMAP_DEFAULT_SOURCE", "semantic-scholar"),
            ("SEMANTIC_SCHOLAR_API_KEY", "secret"),
            ("OPENALEX_MAILTO", "me@example.org"),
            ("CITEMAP_MAX_PAPERS_CAP", "8"),
            ("CITEMAP_USER_AGENT", " "),
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.default_source, SourceKind::SemanticScholar);
        assert_eq!(config.semantic_scholar_api_key.as_deref(), Some("secret"));
        assert_eq!(config.openalex_mailto.as_deref(), Some("me@example.org"));
        assert_eq!(config.limits.max_papers, 8);
        assert_eq!(config.limits.max_citations, 10);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            from_map(&[("CITEMAP_BIND", "localhost")]),
            Err(CiteMapError::Config(_))
        ));
        assert!(matches!(
            from_map(&[("CITEMAP_DEFAULT_SOURCE", "dblp")]),
            Err(CiteMapError::Config(_))
        ));
        assert!(matches!(
            from_map(&[("CITEMAP_MAX_CITATIONS_CAP", "0")]),
            Err(CiteMapError::Config(_))
        ));
        assert!(matches!(
            from_map(&[("CITEMAP_MAX_PAPERS_CAP", "many")]),
            Err(CiteMapError::Config(_))
        ));
    }

    #[test]
    fn test_build_analyzer_registers_all_sources() {
        let analyzer = Config::default().build_analyzer().unwrap();
        assert_eq!(analyzer.available_sources(), SourceKind::ALL.to_vec());
        assert_eq!(analyzer.default_source(), SourceKind::OpenAlex);
    }
}

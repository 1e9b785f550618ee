//! Parsing of scholar profile identifiers.
//!
//! Users paste whatever they have: a Google Scholar profile URL, a Semantic
//! Scholar author page, an OpenAlex author id, or just a name.

use crate::error::{CiteMapError, Result};
use crate::types::SourceKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static GOOGLE_USER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]?user=([A-Za-z0-9_-]+)").expect("valid regex"));

static SEMANTIC_SCHOLAR_AUTHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"semanticscholar\.org/author/(?:[^/?#]+/)?(\d+)").expect("valid regex")
});

static OPENALEX_AUTHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)openalex\.org/(?:authors/)?(a\d{4,})\b").expect("valid regex")
});

static BARE_OPENALEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)a\d{4,}$").expect("valid regex"));

/// A scholar identifier extracted from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScholarIdentifier {
    /// Google Scholar profile `user=` id.
    GoogleScholar(String),
    /// Semantic Scholar numeric author id.
    SemanticScholar(String),
    /// OpenAlex author id (`A…`).
    #[serde(rename = "openalex")]
    OpenAlex(String),
    /// Free-text author name, resolved through a source's author search.
    Name(String),
}

impl ScholarIdentifier {
    /// Parse a profile URL, id, or plain name.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CiteMapError::InvalidIdentifier(
                "Empty input. Paste a profile URL (e.g. https://scholar.google.com/citations?user=XXXX) or a name".to_string(),
            ));
        }

        if let Some(id) = google_user_id(input) {
            return Ok(Self::GoogleScholar(id));
        }
        if let Some(caps) = SEMANTIC_SCHOLAR_AUTHOR.captures(input) {
            return Ok(Self::SemanticScholar(caps[1].to_string()));
        }
        if let Some(caps) = OPENALEX_AUTHOR.captures(input) {
            return Ok(Self::OpenAlex(caps[1].to_uppercase()));
        }
        if BARE_OPENALEX.is_match(input) {
            return Ok(Self::OpenAlex(input.to_uppercase()));
        }

        if looks_like_url(input) {
            return Err(CiteMapError::InvalidIdentifier(format!(
                "Unrecognised profile URL: {}",
                input
            )));
        }

        Ok(Self::Name(collapse_whitespace(input)))
    }

    /// The source this identifier belongs to, if any.
    pub fn preferred_source(&self) -> Option<SourceKind> {
        match self {
            Self::GoogleScholar(_) => Some(SourceKind::GoogleScholar),
            Self::SemanticScholar(_) => Some(SourceKind::SemanticScholar),
            Self::OpenAlex(_) => Some(SourceKind::OpenAlex),
            Self::Name(_) => None,
        }
    }

    /// Whether `source` can resolve this identifier.
    pub fn is_supported_by(&self, source: SourceKind) -> bool {
        match self.preferred_source() {
            Some(kind) => kind == source,
            None => true,
        }
    }

    /// The raw id or name.
    pub fn value(&self) -> &str {
        match self {
            Self::GoogleScholar(v)
            | Self::SemanticScholar(v)
            | Self::OpenAlex(v)
            | Self::Name(v) => v,
        }
    }
}

impl std::fmt::Display for ScholarIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoogleScholar(id) => write!(f, "google_scholar:{}", id),
            Self::SemanticScholar(id) => write!(f, "semantic_scholar:{}", id),
            Self::OpenAlex(id) => write!(f, "openalex:{}", id),
            Self::Name(name) => write!(f, "name:{}", name),
        }
    }
}

/// Extract the Google Scholar `user` id, preferring a real query pair.
fn google_user_id(input: &str) -> Option<String> {
    if let Ok(url) = Url::parse(input) {
        let is_scholar = url
            .host_str()
            .map_or(false, |h| h.starts_with("scholar.google."));
        if is_scholar {
            if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "user") {
                let valid = id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                if !id.is_empty() && valid {
                    return Some(id.into_owned());
                }
            }
        }
    }
    GOOGLE_USER.captures(input).map(|caps| caps[1].to_string())
}

fn looks_like_url(input: &str) -> bool {
    input.starts_with("http://")
        || input.starts_with("https://")
        || input.starts_with("www.")
        || (input.contains('/') && input.contains('.'))
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

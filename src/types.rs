//! Public types for citemap.
//!
//! Two layers live here: the source-neutral records every
//! [`CitationSource`](crate::sources::CitationSource) produces, and the fixed
//! JSON shapes the HTTP API returns.

use serde::{Deserialize, Serialize};

/// Which bibliographic data source to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleScholar,
    SemanticScholar,
    #[serde(rename = "openalex")]
    OpenAlex,
}

impl SourceKind {
    /// All sources, in display order.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::OpenAlex,
        SourceKind::SemanticScholar,
        SourceKind::GoogleScholar,
    ];

    /// Stable identifier used in the API and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleScholar => "google_scholar",
            Self::SemanticScholar => "semantic_scholar",
            Self::OpenAlex => "openalex",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GoogleScholar => "Google Scholar",
            Self::SemanticScholar => "Semantic Scholar",
            Self::OpenAlex => "OpenAlex",
        }
    }

    /// Parse from string (case-insensitive, common aliases accepted).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "google_scholar" | "google" | "scholar" | "gs" => Some(Self::GoogleScholar),
            "semantic_scholar" | "semanticscholar" | "semantic" | "s2" => {
                Some(Self::SemanticScholar)
            }
            "openalex" | "open_alex" | "oa" => Some(Self::OpenAlex),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Source records ---

/// The scholar whose citations are being mapped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    /// Source-specific author id.
    pub id: String,
    pub name: Option<String>,
    pub affiliation: Option<String>,
    /// Total citations across all works.
    pub citations: u64,
    pub h_index: u32,
}

/// One of the scholar's own publications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Handle used to list citing papers (paperId, work id, or `cites` cluster).
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub citations: u64,
}

/// A paper that cites one of the scholar's publications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitingPaper {
    pub title: String,
    pub year: Option<String>,
    /// Authors in byline order.
    pub authors: Vec<CitingAuthor>,
}

/// An author of a citing paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitingAuthor {
    /// Source-specific author id, when the byline links to a profile.
    pub id: Option<String>,
    pub name: String,
    /// Affiliation as printed on the paper, when the source provides it.
    pub affiliation: Option<String>,
}

impl CitingAuthor {
    pub fn new(name: impl Into<String>, affiliation: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            affiliation: affiliation.filter(|a| !a.trim().is_empty()),
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id.filter(|i| !i.is_empty());
        self
    }

    /// Key for per-author caches: the id when known, else the name.
    pub fn cache_key(&self) -> String {
        match &self.id {
            Some(id) => format!("id:{}", id),
            None => format!("name:{}", self.name),
        }
    }
}

/// A geocoded point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
    /// Address the geocoder matched.
    pub address: String,
}

// --- Output shapes ---

/// The full payload returned by `/api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub author: AuthorSummary,
    pub publications: Vec<PublicationSummary>,
    pub citing_authors: Vec<CitingAuthorEntry>,
    pub locations: Vec<Location>,
    /// Source that produced the data. Absent for demo data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub name: String,
    pub affiliation: String,
    pub citations: u64,
    pub h_index: u32,
}

impl From<&AuthorProfile> for AuthorSummary {
    fn from(profile: &AuthorProfile) -> Self {
        Self {
            name: or_unknown(profile.name.as_deref()),
            affiliation: or_unknown(profile.affiliation.as_deref()),
            citations: profile.citations,
            h_index: profile.h_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationSummary {
    pub title: String,
    pub year: String,
    pub citations: u64,
}

impl From<&Publication> for PublicationSummary {
    fn from(publication: &Publication) -> Self {
        Self {
            title: or_unknown(Some(&publication.title)),
            year: or_unknown(publication.year.as_deref()),
            citations: publication.citations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitingAuthorEntry {
    pub name: String,
    /// Cleaned affiliation; empty when unknown.
    pub affiliation: String,
    pub paper_title: String,
    pub year: String,
}

/// A map marker: one institution and the citing authors based there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub institution: String,
    pub lat: f64,
    pub lng: f64,
    /// Number of citing-author records attributed to this institution.
    pub count: u32,
    /// Up to [`MAX_LOCATION_AUTHORS`] distinct names.
    pub authors: Vec<String>,
}

/// Names listed per location.
pub const MAX_LOCATION_AUTHORS: usize = 5;

pub(crate) fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "Unknown".to_string(),
    }
}

// --- Request options ---

/// How much of the citation neighbourhood to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Publications to inspect, most cited first.
    pub max_papers: u32,
    /// Citing papers to fetch per publication.
    pub max_citations: u32,
    /// Authors taken from each citing paper's byline.
    pub authors_per_paper: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_papers: 3,
            max_citations: 5,
            authors_per_paper: 1,
        }
    }
}

impl AnalysisOptions {
    /// Apply the server caps. Zero is raised to one, and so is a zero cap.
    pub fn clamped(self, limits: &AnalysisLimits) -> Self {
        Self {
            max_papers: self.max_papers.clamp(1, limits.max_papers.max(1)),
            max_citations: self.max_citations.clamp(1, limits.max_citations.max(1)),
            authors_per_paper: self
                .authors_per_paper
                .clamp(1, limits.authors_per_paper.max(1)),
        }
    }
}

/// Upper bounds on [`AnalysisOptions`] enforced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLimits {
    pub max_papers: u32,
    pub max_citations: u32,
    pub authors_per_paper: u32,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_papers: 5,
            max_citations: 10,
            authors_per_paper: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_loose_parsing() {
        assert_eq!(SourceKind::from_str_loose("Google"), Some(SourceKind::GoogleScholar));
        assert_eq!(
            SourceKind::from_str_loose("semantic-scholar"),
            Some(SourceKind::SemanticScholar)
        );
        assert_eq!(SourceKind::from_str_loose("S2"), Some(SourceKind::SemanticScholar));
        assert_eq!(SourceKind::from_str_loose("OpenAlex"), Some(SourceKind::OpenAlex));
        assert_eq!(SourceKind::from_str_loose("dblp"), None);
    }

    #[test]
    fn test_source_kind_serde_matches_as_str() {
        for kind in SourceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_options_clamped() {
        let limits = AnalysisLimits::default();
        let opts = AnalysisOptions {
            max_papers: 50,
            max_citations: 0,
            authors_per_paper: 2,
        }
        .clamped(&limits);
        assert_eq!(opts.max_papers, 5);
        assert_eq!(opts.max_citations, 1);
        assert_eq!(opts.authors_per_paper, 2);
    }

    #[test]
    fn test_options_clamped_with_zero_caps() {
        let limits = AnalysisLimits {
            max_papers: 0,
            max_citations: 0,
            authors_per_paper: 0,
        };
        let opts = AnalysisOptions::default().clamped(&limits);
        assert_eq!(opts.max_papers, 1);
        assert_eq!(opts.max_citations, 1);
        assert_eq!(opts.authors_per_paper, 1);
    }

    #[test]
    fn test_source_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&SourceKind::OpenAlex).unwrap(),
            "\"openalex\""
        );
        let kind: SourceKind = serde_json::from_str("\"openalex\"").unwrap();
        assert_eq!(kind, SourceKind::OpenAlex);
        let kind: SourceKind = serde_json::from_str("\"semantic_scholar\"").unwrap();
        assert_eq!(kind, SourceKind::SemanticScholar);
    }

    #[test]
    fn test_author_summary_unknown_defaults() {
        let summary = AuthorSummary::from(&AuthorProfile {
            id: "x".into(),
            citations: 12,
            ..Default::default()
        });
        assert_eq!(summary.name, "Unknown");
        assert_eq!(summary.affiliation, "Unknown");
        assert_eq!(summary.citations, 12);
    }

    #[test]
    fn test_publication_summary_year() {
        let summary = PublicationSummary::from(&Publication {
            id: "p".into(),
            title: "Attention".into(),
            year: None,
            citations: 3,
        });
        assert_eq!(summary.year, "Unknown");
        assert_eq!(summary.title, "Attention");
    }

    #[test]
    fn test_citing_author_blank_affiliation_dropped() {
        let author = CitingAuthor::new("Wei Zhang", Some("  ".into()));
        assert_eq!(author.affiliation, None);
    }
}

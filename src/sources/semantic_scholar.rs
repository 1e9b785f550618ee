//! Semantic Scholar Graph API source.
//!
//! See: https://api.semanticscholar.org/api-docs/graph

use crate::client::HttpClient;
use crate::error::{CiteMapError, Result};
use crate::identifier::ScholarIdentifier;
use crate::rate_limit::RateLimiter;
use crate::sources::CitationSource;
use crate::types::{AuthorProfile, CitingAuthor, CitingPaper, Publication, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

const AUTHOR_FIELDS: &str = "name,affiliations,citationCount,hIndex";
const PAPER_FIELDS: &str = "title,year,citationCount";
const CITATION_FIELDS: &str = "title,year,authors";

/// The API caps `/author/{id}/papers` pages at 1000 rows.
const MAX_AUTHOR_PAPERS: u32 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Author {
    author_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    affiliations: Vec<String>,
    citation_count: Option<u64>,
    h_index: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct S2Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: Option<String>,
    title: Option<String>,
    year: Option<i32>,
    citation_count: Option<u64>,
    #[serde(default)]
    authors: Vec<S2AuthorRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2AuthorRef {
    author_id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Citation {
    citing_paper: Option<S2Paper>,
}

/// Source backed by the Semantic Scholar Graph API.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
}

impl SemanticScholarSource {
    /// Create a source against the public API.
    ///
    /// Requests are kept to one per second, the rate granted to API keys.
    /// The key, when given, is sent as `x-api-key` so requests count against
    /// it rather than the shared anonymous pool.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let mut client =
            HttpClient::new(DEFAULT_BASE_URL)?.with_rate_limiter(RateLimiter::new(1.0));
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            client = client.with_header("x-api-key", key)?;
        }
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (base URL, limiter, retry policy).
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }

    async fn search_author(&self, name: &str) -> Result<S2Author> {
        let page: S2Page<S2Author> = self
            .client
            .get_json(
                "/author/search",
                &[("query", name), ("fields", AUTHOR_FIELDS), ("limit", "1")],
            )
            .await?;
        page.data
            .into_iter()
            .next()
            .ok_or_else(|| CiteMapError::NotFound(format!("No Semantic Scholar author named {}", name)))
    }

    async fn author_by_id(&self, id: &str) -> Result<S2Author> {
        self.client
            .get_json(&format!("/author/{}", id), &[("fields", AUTHOR_FIELDS)])
            .await
    }

    async fn author_papers(&self, id: &str) -> Result<Vec<Publication>> {
        let limit = MAX_AUTHOR_PAPERS.to_string();
        let page: S2Page<S2Paper> = self
            .client
            .get_json(
                &format!("/author/{}/papers", id),
                &[("fields", PAPER_FIELDS), ("limit", &limit)],
            )
            .await?;
        Ok(page.data.into_iter().map(paper_to_publication).collect())
    }
}

#[async_trait]
impl CitationSource for SemanticScholarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SemanticScholar
    }

    async fn fetch_author(
        &self,
        identifier: &ScholarIdentifier,
    ) -> Result<(AuthorProfile, Vec<Publication>)> {
        let author = match identifier {
            ScholarIdentifier::SemanticScholar(id) => self.author_by_id(id).await?,
            ScholarIdentifier::Name(name) => self.search_author(name).await?,
            other => {
                return Err(CiteMapError::InvalidIdentifier(format!(
                    "Semantic Scholar cannot resolve {}",
                    other
                )))
            }
        };

        let profile = author_to_profile(author);
        if profile.id.is_empty() {
            return Err(CiteMapError::Parse("Semantic Scholar author without authorId".into()));
        }
        info!(
            "Semantic Scholar author {} ({})",
            profile.name.as_deref().unwrap_or("?"),
            profile.id
        );
        let publications = self.author_papers(&profile.id).await?;
        Ok((profile, publications))
    }

    async fn citing_papers(
        &self,
        publication: &Publication,
        limit: u32,
    ) -> Result<Vec<CitingPaper>> {
        if publication.id.is_empty() {
            return Ok(Vec::new());
        }
        let limit_str = limit.to_string();
        let page: S2Page<S2Citation> = self
            .client
            .get_json(
                &format!("/paper/{}/citations", publication.id),
                &[("fields", CITATION_FIELDS), ("limit", &limit_str)],
            )
            .await?;

        let papers: Vec<CitingPaper> = page
            .data
            .into_iter()
            .filter_map(|c| c.citing_paper)
            .map(citing_from_paper)
            .take(limit as usize)
            .collect();
        debug!("{} citing papers for {}", papers.len(), publication.id);
        Ok(papers)
    }

    async fn author_affiliation(&self, author: &CitingAuthor) -> Result<Option<String>> {
        let found = match &author.id {
            Some(id) => self.author_by_id(id).await,
            None => self.search_author(&author.name).await,
        };
        match found {
            Ok(a) => Ok(a.affiliations.into_iter().find(|s| !s.trim().is_empty())),
            Err(CiteMapError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn author_to_profile(author: S2Author) -> AuthorProfile {
    AuthorProfile {
        id: author.author_id.unwrap_or_default(),
        name: author.name,
        affiliation: author.affiliations.into_iter().next(),
        citations: author.citation_count.unwrap_or(0),
        h_index: author.h_index.unwrap_or(0),
    }
}

fn paper_to_publication(paper: S2Paper) -> Publication {
    Publication {
        id: paper.paper_id.unwrap_or_default(),
        title: paper.title.unwrap_or_default(),
        year: paper.year.map(|y| y.to_string()),
        citations: paper.citation_count.unwrap_or(0),
    }
}

fn citing_from_paper(paper: S2Paper) -> CitingPaper {
    CitingPaper {
        title: paper.title.unwrap_or_default(),
        year: paper.year.map(|y| y.to_string()),
        authors: paper
            .authors
            .into_iter()
            .filter_map(|a| {
                let name = a.name?;
                Some(CitingAuthor::new(name, None).with_id(a.author_id))
            })
            .collect(),
    }
}

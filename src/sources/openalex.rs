//! OpenAlex REST API source.
//!
//! OpenAlex attaches institutions to every authorship, so citing authors
//! usually arrive with an affiliation and no extra lookup is needed.

use crate::client::HttpClient;
use crate::error::{CiteMapError, Result};
use crate::identifier::ScholarIdentifier;
use crate::rate_limit::RateLimiter;
use crate::sources::CitationSource;
use crate::types::{AuthorProfile, CitingAuthor, CitingPaper, Publication, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// OpenAlex maximum `per-page`.
const MAX_PER_PAGE: u32 = 200;

const ID_PREFIX: &str = "https://openalex.org/";

#[derive(Debug, Deserialize)]
struct OaList<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct OaAuthor {
    id: Option<String>,
    display_name: Option<String>,
    cited_by_count: Option<u64>,
    summary_stats: Option<OaSummaryStats>,
    #[serde(default)]
    last_known_institutions: Vec<OaInstitution>,
    #[serde(default)]
    affiliations: Vec<OaAffiliation>,
}

impl OaAuthor {
    fn institution(&self) -> Option<String> {
        self.last_known_institutions
            .iter()
            .chain(self.affiliations.iter().filter_map(|a| a.institution.as_ref()))
            .find_map(|i| i.display_name.clone())
            .filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OaSummaryStats {
    h_index: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OaAffiliation {
    institution: Option<OaInstitution>,
}

#[derive(Debug, Deserialize)]
struct OaInstitution {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OaWork {
    id: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    cited_by_count: Option<u64>,
    #[serde(default)]
    authorships: Vec<OaAuthorship>,
}

#[derive(Debug, Deserialize)]
struct OaAuthorship {
    author: Option<OaAuthorRef>,
    #[serde(default)]
    institutions: Vec<OaInstitution>,
    #[serde(default)]
    raw_affiliation_strings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OaAuthorRef {
    id: Option<String>,
    display_name: Option<String>,
}

/// Source backed by the OpenAlex API.
#[derive(Debug, Clone)]
pub struct OpenAlexSource {
    client: HttpClient,
    mailto: Option<String>,
}

impl OpenAlexSource {
    /// Create a source against the public API.
    ///
    /// A `mailto` address puts requests in the polite pool.
    pub fn new(mailto: Option<&str>) -> Result<Self> {
        let client = HttpClient::new(DEFAULT_BASE_URL)?.with_rate_limiter(RateLimiter::new(5.0));
        Ok(Self::with_client(client, mailto))
    }

    /// Wrap a preconfigured client (base URL, limiter, retry policy).
    pub fn with_client(client: HttpClient, mailto: Option<&str>) -> Self {
        Self {
            client,
            mailto: mailto.filter(|m| !m.is_empty()).map(String::from),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut all: Vec<(&str, &str)> = params.to_vec();
        if let Some(mailto) = &self.mailto {
            all.push(("mailto", mailto.as_str()));
        }
        self.client.get_json(path, &all).await
    }

    async fn author_by_id(&self, id: &str) -> Result<OaAuthor> {
        self.get(&format!("/authors/{}", short_id(id)), &[]).await
    }

    async fn search_author(&self, name: &str) -> Result<OaAuthor> {
        let list: OaList<OaAuthor> = self
            .get("/authors", &[("search", name), ("per-page", "1")])
            .await?;
        list.results
            .into_iter()
            .next()
            .ok_or_else(|| CiteMapError::NotFound(format!("No OpenAlex author named {}", name)))
    }

    async fn author_works(&self, author_id: &str) -> Result<Vec<Publication>> {
        let filter = format!("author.id:{}", author_id);
        let per_page = MAX_PER_PAGE.to_string();
        let list: OaList<OaWork> = self
            .get(
                "/works",
                &[
                    ("filter", filter.as_str()),
                    ("sort", "cited_by_count:desc"),
                    ("per-page", &per_page),
                ],
            )
            .await?;
        Ok(list.results.into_iter().map(work_to_publication).collect())
    }
}

#[async_trait]
impl CitationSource for OpenAlexSource {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenAlex
    }

    async fn fetch_author(
        &self,
        identifier: &ScholarIdentifier,
    ) -> Result<(AuthorProfile, Vec<Publication>)> {
        let author = match identifier {
            ScholarIdentifier::OpenAlex(id) => self.author_by_id(id).await?,
            ScholarIdentifier::Name(name) => self.search_author(name).await?,
            other => {
                return Err(CiteMapError::InvalidIdentifier(format!(
                    "OpenAlex cannot resolve {}",
                    other
                )))
            }
        };

        let profile = AuthorProfile {
            id: author.id.as_deref().map(short_id).unwrap_or_default().to_string(),
            name: author.display_name.clone(),
            affiliation: author.institution(),
            citations: author.cited_by_count.unwrap_or(0),
            h_index: author
                .summary_stats
                .as_ref()
                .and_then(|s| s.h_index)
                .unwrap_or(0),
        };
        if profile.id.is_empty() {
            return Err(CiteMapError::Parse("OpenAlex author without id".into()));
        }
        info!(
            "OpenAlex author {} ({})",
            profile.name.as_deref().unwrap_or("?"),
            profile.id
        );

        let publications = self.author_works(&profile.id).await?;
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
        let filter = format!("cites:{}", publication.id);
        let per_page = limit.clamp(1, MAX_PER_PAGE).to_string();
        let list: OaList<OaWork> = self
            .get("/works", &[("filter", filter.as_str()), ("per-page", &per_page)])
            .await?;

        let papers: Vec<CitingPaper> = list
            .results
            .into_iter()
            .take(limit as usize)
            .map(work_to_citing)
            .collect();
        debug!("{} citing works for {}", papers.len(), publication.id);
        Ok(papers)
    }

    async fn author_affiliation(&self, author: &CitingAuthor) -> Result<Option<String>> {
        let found = match &author.id {
            Some(id) => self.author_by_id(id).await,
            None => self.search_author(&author.name).await,
        };
        match found {
            Ok(a) => Ok(a.institution()),
            Err(CiteMapError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// `https://openalex.org/W123` -> `W123`.
fn short_id(id: &str) -> &str {
    id.strip_prefix(ID_PREFIX).unwrap_or(id)
}

fn work_title(work: &OaWork) -> String {
    work.title
        .clone()
        .or_else(|| work.display_name.clone())
        .unwrap_or_default()
}

fn work_to_publication(work: OaWork) -> Publication {
    Publication {
        id: work.id.as_deref().map(short_id).unwrap_or_default().to_string(),
        title: work_title(&work),
        year: work.publication_year.map(|y| y.to_string()),
        citations: work.cited_by_count.unwrap_or(0),
    }
}

fn work_to_citing(work: OaWork) -> CitingPaper {
    let title = work_title(&work);
    let authors = work
        .authorships
        .into_iter()
        .filter_map(|ship| {
            let author = ship.author?;
            let name = author.display_name?;
            let affiliation = ship
                .institutions
                .into_iter()
                .find_map(|i| i.display_name)
                .or_else(|| ship.raw_affiliation_strings.into_iter().next());
            let id = author.id.as_deref().map(short_id).map(String::from);
            Some(CitingAuthor::new(name, affiliation).with_id(id))
        })
        .collect();

    CitingPaper {
        title,
        year: work.publication_year.map(|y| y.to_string()),
        authors,
    }
}

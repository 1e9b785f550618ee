//! Google Scholar source, scraped from public profile pages.
//!
//! Google Scholar has no API. Markup changes degrade to missing fields or
//! empty lists rather than errors; a CAPTCHA interstitial is reported as an
//! upstream failure. Requests are spaced out with jitter.

use crate::affiliation::split_authors;
use crate::client::HttpClient;
use crate::error::{CiteMapError, Result};
use crate::identifier::ScholarIdentifier;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;
use crate::sources::CitationSource;
use crate::types::{AuthorProfile, CitingAuthor, CitingPaper, Publication, SourceKind};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://scholar.google.com";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Profile rows requested per page (Scholar's maximum).
const PROFILE_PAGE_SIZE: &str = "100";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

static PROFILE_NAME: Lazy<Selector> = Lazy::new(|| selector("#gsc_prf_in"));
static PROFILE_AFFILIATION: Lazy<Selector> = Lazy::new(|| selector(".gsc_prf_il"));
static PROFILE_STATS: Lazy<Selector> = Lazy::new(|| selector("#gsc_rsb_st td.gsc_rsb_std"));
static PUB_ROW: Lazy<Selector> = Lazy::new(|| selector("tr.gsc_a_tr"));
static PUB_TITLE: Lazy<Selector> = Lazy::new(|| selector("a.gsc_a_at"));
static PUB_CITES: Lazy<Selector> = Lazy::new(|| selector("a.gsc_a_ac"));
static PUB_YEAR: Lazy<Selector> = Lazy::new(|| selector(".gsc_a_y span"));
static RESULT: Lazy<Selector> = Lazy::new(|| selector("div.gs_ri"));
static RESULT_TITLE: Lazy<Selector> = Lazy::new(|| selector("h3.gs_rt"));
static RESULT_TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static RESULT_BYLINE: Lazy<Selector> = Lazy::new(|| selector("div.gs_a"));
static BYLINE_LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static SEARCH_USER: Lazy<Selector> = Lazy::new(|| selector("div.gsc_1usr"));
static SEARCH_NAME_LINK: Lazy<Selector> = Lazy::new(|| selector(".gs_ai_name a"));
static SEARCH_AFFILIATION: Lazy<Selector> = Lazy::new(|| selector(".gs_ai_aff"));

static CITES_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]cites=([0-9,]+)").expect("valid regex"));
static USER_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]user=([A-Za-z0-9_-]+)").expect("valid regex"));
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid regex"));
static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[[A-Z]+\]\s*)+").expect("valid regex"));

/// Source that scrapes Google Scholar.
#[derive(Debug, Clone)]
pub struct GoogleScholarSource {
    client: HttpClient,
}

impl GoogleScholarSource {
    /// Create a source against scholar.google.com.
    ///
    /// Requests are spaced one to three seconds apart and are not retried.
    pub fn new() -> Result<Self> {
        let client = HttpClient::new(DEFAULT_BASE_URL)?
            .with_user_agent(BROWSER_USER_AGENT)?
            .with_rate_limiter(RateLimiter::with_interval(
                Duration::from_secs(1),
                Duration::from_secs(2),
            ))
            .with_retry(RetryConfig::none());
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (base URL, limiter, retry policy).
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let body = self.client.get_text(path, params).await?;
        if is_blocked(&body) {
            warn!("Google Scholar served a CAPTCHA for {}", path);
            return Err(CiteMapError::Upstream(
                "Google Scholar is blocking requests. Try again later or use another source"
                    .to_string(),
            ));
        }
        Ok(body)
    }

    async fn profile_page(&self, user: &str) -> Result<ProfilePage> {
        let body = self
            .fetch_page(
                "/citations",
                &[
                    ("user", user),
                    ("hl", "en"),
                    ("cstart", "0"),
                    ("pagesize", PROFILE_PAGE_SIZE),
                ],
            )
            .await?;
        Ok(parse_profile(&body))
    }

    async fn search_authors(&self, name: &str) -> Result<Option<SearchHit>> {
        let body = self
            .fetch_page(
                "/citations",
                &[("view_op", "search_authors"), ("mauthors", name), ("hl", "en")],
            )
            .await?;
        Ok(parse_author_search(&body).into_iter().next())
    }
}

#[async_trait]
impl CitationSource for GoogleScholarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GoogleScholar
    }

    async fn fetch_author(
        &self,
        identifier: &ScholarIdentifier,
    ) -> Result<(AuthorProfile, Vec<Publication>)> {
        let user = match identifier {
            ScholarIdentifier::GoogleScholar(user) => user.clone(),
            ScholarIdentifier::Name(name) => {
                let hit = self.search_authors(name).await?.ok_or_else(|| {
                    CiteMapError::NotFound(format!("No Google Scholar profile for {}", name))
                })?;
                hit.user.ok_or_else(|| {
                    CiteMapError::NotFound(format!("No Google Scholar profile for {}", name))
                })?
            }
            other => {
                return Err(CiteMapError::InvalidIdentifier(format!(
                    "Google Scholar cannot resolve {}",
                    other
                )))
            }
        };

        let page = self.profile_page(&user).await?;
        if page.name.is_none() && page.publications.is_empty() {
            return Err(CiteMapError::NotFound(format!(
                "Google Scholar profile {}",
                user
            )));
        }
        info!(
            "Google Scholar profile {} ({}), {} publications",
            page.name.as_deref().unwrap_or("?"),
            user,
            page.publications.len()
        );

        let profile = AuthorProfile {
            id: user,
            name: page.name,
            affiliation: page.affiliation,
            citations: page.citations,
            h_index: page.h_index,
        };
        Ok((profile, page.publications))
    }

    async fn citing_papers(
        &self,
        publication: &Publication,
        limit: u32,
    ) -> Result<Vec<CitingPaper>> {
        if publication.id.is_empty() {
            return Ok(Vec::new());
        }
        let num = limit.clamp(1, 20).to_string();
        let body = self
            .fetch_page(
                "/scholar",
                &[("cites", publication.id.as_str()), ("hl", "en"), ("num", &num)],
            )
            .await?;

        let mut papers = parse_citing_results(&body);
        papers.truncate(limit as usize);
        debug!("{} citing papers for cluster {}", papers.len(), publication.id);
        Ok(papers)
    }

    async fn author_affiliation(&self, author: &CitingAuthor) -> Result<Option<String>> {
        if let Some(user) = &author.id {
            return match self.profile_page(user).await {
                Ok(page) => Ok(page.affiliation),
                Err(CiteMapError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            };
        }
        Ok(self
            .search_authors(&author.name)
            .await?
            .and_then(|hit| hit.affiliation))
    }
}

// --- HTML parsing ---

#[derive(Debug, Default)]
struct ProfilePage {
    name: Option<String>,
    affiliation: Option<String>,
    citations: u64,
    h_index: u32,
    publications: Vec<Publication>,
}

#[derive(Debug)]
struct SearchHit {
    user: Option<String>,
    affiliation: Option<String>,
}

fn is_blocked(body: &str) -> bool {
    body.contains("gs_captcha_f") || body.contains("id=\"captcha\"") || body.contains("/sorry/")
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(root: ElementRef<'_>, sel: &Selector) -> Option<String> {
    root.select(sel)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

fn parse_profile(body: &str) -> ProfilePage {
    let doc = Html::parse_document(body);
    let root = doc.root_element();

    let stats: Vec<u64> = root
        .select(&PROFILE_STATS)
        .map(|td| text_of(td).replace(',', "").parse().unwrap_or(0))
        .collect();

    let publications = root
        .select(&PUB_ROW)
        .filter_map(|row| {
            let title = first_text(row, &PUB_TITLE)?;
            let cites_link = row.select(&PUB_CITES).next();
            let citations = cites_link
                .map(text_of)
                .and_then(|t| t.replace(',', "").parse().ok())
                .unwrap_or(0);
            let id = cites_link
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| CITES_PARAM.captures(href))
                .map(|caps| caps[1].to_string())
                .unwrap_or_default();
            Some(Publication {
                id,
                title,
                year: first_text(row, &PUB_YEAR),
                citations,
            })
        })
        .collect();

    ProfilePage {
        name: first_text(root, &PROFILE_NAME),
        affiliation: first_text(root, &PROFILE_AFFILIATION),
        citations: stats.first().copied().unwrap_or(0),
        h_index: stats.get(2).copied().unwrap_or(0) as u32,
        publications,
    }
}

fn parse_citing_results(body: &str) -> Vec<CitingPaper> {
    let doc = Html::parse_document(body);
    doc.root_element()
        .select(&RESULT)
        .filter_map(|result| {
            let heading = result.select(&RESULT_TITLE).next()?;
            let title = heading
                .select(&RESULT_TITLE_LINK)
                .next()
                .map(text_of)
                .unwrap_or_else(|| text_of(heading));
            let title = TITLE_TAG.replace(&title, "").trim().to_string();

            let byline = result.select(&RESULT_BYLINE).next();
            let byline_text = byline.map(text_of).unwrap_or_default();
            let mut segments = byline_text.split(" - ");
            let author_part = segments.next().unwrap_or_default();
            let year = segments
                .next()
                .and_then(|venue| YEAR.find(venue))
                .map(|m| m.as_str().to_string());

            // Linked names carry a profile id.
            let linked: Vec<(String, String)> = byline
                .map(|b| {
                    b.select(&BYLINE_LINK)
                        .filter_map(|a| {
                            let user = USER_PARAM.captures(a.value().attr("href")?)?[1].to_string();
                            Some((text_of(a), user))
                        })
                        .collect()
                })
                .unwrap_or_default();

            let authors = split_authors(author_part)
                .into_iter()
                .map(|name| {
                    let id = linked
                        .iter()
                        .find(|(linked_name, _)| *linked_name == name)
                        .map(|(_, user)| user.clone());
                    CitingAuthor::new(name, None).with_id(id)
                })
                .collect();

            Some(CitingPaper {
                title,
                year,
                authors,
            })
        })
        .collect()
}

fn parse_author_search(body: &str) -> Vec<SearchHit> {
    let doc = Html::parse_document(body);
    doc.root_element()
        .select(&SEARCH_USER)
        .map(|card| {
            let user = card
                .select(&SEARCH_NAME_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| USER_PARAM.captures(href))
                .map(|caps| caps[1].to_string());
            SearchHit {
                user,
                affiliation: first_text(card, &SEARCH_AFFILIATION),
            }
        })
        .collect()
}

//! The citation-map pipeline.
//!
//! [`Analyzer`] resolves a scholar through one of the registered sources,
//! walks the papers citing their most cited work, and groups the citing
//! authors by geocoded institution.

use crate::affiliation::clean_affiliation;
use crate::error::{CiteMapError, Result};
use crate::geocode::GeocodeCache;
use crate::identifier::ScholarIdentifier;
use crate::sources::CitationSource;
use crate::types::{
    or_unknown, AnalysisLimits, AnalysisOptions, AnalysisResult, AuthorProfile, AuthorSummary,
    CitingAuthor, CitingAuthorEntry, Location, Publication, PublicationSummary, SourceKind,
    MAX_LOCATION_AUTHORS,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Publications returned by [`Analyzer::quick_analyze`].
pub const QUICK_PUBLICATIONS: usize = 10;

/// Per-institution tally, kept in first-seen order.
#[derive(Debug, Default)]
struct Tally {
    order: Vec<String>,
    entries: HashMap<String, (u32, Vec<String>)>,
}

impl Tally {
    fn record(&mut self, institution: &str, author: &str) {
        if !self.entries.contains_key(institution) {
            self.order.push(institution.to_string());
        }
        let (count, authors) = self.entries.entry(institution.to_string()).or_default();
        *count += 1;
        if authors.len() < MAX_LOCATION_AUTHORS && !authors.iter().any(|a| a == author) {
            authors.push(author.to_string());
        }
    }

    fn into_ordered(mut self) -> Vec<(String, u32, Vec<String>)> {
        self.order
            .into_iter()
            .filter_map(|name| {
                let (count, authors) = self.entries.remove(&name)?;
                Some((name, count, authors))
            })
            .collect()
    }
}

/// Runs analyses against a fixed set of sources and a shared geocode cache.
#[derive(Clone)]
pub struct Analyzer {
    sources: HashMap<SourceKind, Arc<dyn CitationSource>>,
    geocoder: GeocodeCache,
    default_source: SourceKind,
    limits: AnalysisLimits,
    affiliations: Arc<Mutex<HashMap<String, Option<String>>>>,
}

impl Analyzer {
    /// Create an analyzer with no sources registered yet.
    pub fn new(default_source: SourceKind, geocoder: GeocodeCache) -> Self {
        Self {
            sources: HashMap::new(),
            geocoder,
            default_source,
            limits: AnalysisLimits::default(),
            affiliations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a source, replacing any previous one of the same kind.
    pub fn with_source(mut self, source: Arc<dyn CitationSource>) -> Self {
        self.sources.insert(source.kind(), source);
        self
    }

    pub fn with_limits(mut self, limits: AnalysisLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn default_source(&self) -> SourceKind {
        self.default_source
    }

    pub fn limits(&self) -> &AnalysisLimits {
        &self.limits
    }

    /// Registered sources in display order.
    pub fn available_sources(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|k| self.sources.contains_key(k))
            .collect()
    }

    /// Pick the source for `identifier`.
    ///
    /// An explicit request wins, then the identifier's own source, then the
    /// configured default.
    fn select_source(
        &self,
        identifier: &ScholarIdentifier,
        requested: Option<SourceKind>,
    ) -> Result<Arc<dyn CitationSource>> {
        let kind = requested
            .or_else(|| identifier.preferred_source())
            .unwrap_or(self.default_source);

        if !identifier.is_supported_by(kind) {
            return Err(CiteMapError::InvalidIdentifier(format!(
                "{} cannot look up {}",
                kind.display_name(),
                identifier
            )));
        }

        self.sources.get(&kind).cloned().ok_or_else(|| {
            CiteMapError::InvalidIdentifier(format!("Source {} is not enabled", kind))
        })
    }

    async fn resolve(
        &self,
        input: &str,
        requested: Option<SourceKind>,
    ) -> Result<(Arc<dyn CitationSource>, AuthorProfile, Vec<Publication>)> {
        let identifier = ScholarIdentifier::parse(input)?;
        let source = self.select_source(&identifier, requested)?;
        info!("Analyzing {} via {}", identifier, source.kind());

        match source.fetch_author(&identifier).await {
            Ok((profile, publications)) => Ok((source, profile, publications)),
            Err(e @ (CiteMapError::NotFound(_) | CiteMapError::InvalidIdentifier(_))) => Err(e),
            Err(e) => {
                warn!("Fetching {} from {} failed: {}", identifier, source.kind(), e);
                Err(CiteMapError::Upstream(format!(
                    "{} could not be reached: {}",
                    source.kind().display_name(),
                    e
                )))
            }
        }
    }

    /// Full analysis: author, top publications, citing authors and locations.
    pub async fn analyze(
        &self,
        input: &str,
        requested: Option<SourceKind>,
        options: AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let options = options.clamped(&self.limits);
        let (source, profile, mut publications) = self.resolve(input, requested).await?;

        publications.sort_by(|a, b| b.citations.cmp(&a.citations));
        publications.truncate(options.max_papers as usize);

        let mut citing_authors = Vec::new();
        let mut tally = Tally::default();

        for publication in &publications {
            if publication.citations == 0 {
                continue;
            }
            let papers = match source
                .citing_papers(publication, options.max_citations)
                .await
            {
                Ok(papers) => papers,
                Err(e) => {
                    warn!("Citations for {:?} unavailable: {}", publication.title, e);
                    continue;
                }
            };

            for paper in papers.iter().take(options.max_citations as usize) {
                let authors = paper
                    .authors
                    .iter()
                    .filter(|a| a.name.trim().chars().count() > 1)
                    .take(options.authors_per_paper as usize);

                for author in authors {
                    let affiliation = match &author.affiliation {
                        Some(aff) => clean_affiliation(aff),
                        None => self
                            .lookup_affiliation(source.as_ref(), author)
                            .await
                            .map(|aff| clean_affiliation(&aff))
                            .unwrap_or_default(),
                    };
                    let name = author.name.trim();
                    if !affiliation.is_empty() {
                        tally.record(&affiliation, name);
                    }
                    citing_authors.push(CitingAuthorEntry {
                        name: name.to_string(),
                        affiliation,
                        paper_title: or_unknown(Some(&paper.title)),
                        year: or_unknown(paper.year.as_deref()),
                    });
                }
            }
        }

        let mut locations = Vec::new();
        for (institution, count, authors) in tally.into_ordered() {
            match self.geocoder.lookup(&institution).await {
                Some(coords) => locations.push(Location {
                    institution,
                    lat: coords.lat,
                    lng: coords.lng,
                    count,
                    authors,
                }),
                None => debug!("No coordinates for {}", institution),
            }
        }

        info!(
            "{} citing authors, {} locations",
            citing_authors.len(),
            locations.len()
        );

        Ok(AnalysisResult {
            author: AuthorSummary::from(&profile),
            publications: publications.iter().map(PublicationSummary::from).collect(),
            citing_authors,
            locations,
            source: Some(source.kind()),
        })
    }

    /// Author and top publications only, without citing data.
    pub async fn quick_analyze(
        &self,
        input: &str,
        requested: Option<SourceKind>,
    ) -> Result<AnalysisResult> {
        let (source, profile, publications) = self.resolve(input, requested).await?;
        Ok(AnalysisResult {
            author: AuthorSummary::from(&profile),
            publications: publications
                .iter()
                .take(QUICK_PUBLICATIONS)
                .map(PublicationSummary::from)
                .collect(),
            citing_authors: Vec::new(),
            locations: Vec::new(),
            source: Some(source.kind()),
        })
    }

    /// Affiliation of a citing author, cached per source and author.
    ///
    /// A blocked or rate-limited source is remembered as a miss so later
    /// authors do not queue behind it. Other failures are not cached.
    async fn lookup_affiliation(
        &self,
        source: &dyn CitationSource,
        author: &CitingAuthor,
    ) -> Option<String> {
        let key = format!("{}:{}", source.kind(), author.cache_key());
        if let Some(cached) = self.affiliations.lock().await.get(&key) {
            return cached.clone();
        }

        match source.author_affiliation(author).await {
            Ok(found) => {
                self.affiliations.lock().await.insert(key, found.clone());
                found
            }
            Err(e) => {
                warn!("Affiliation lookup for {} failed: {}", author.name, e);
                if matches!(
                    e,
                    CiteMapError::Upstream(_) | CiteMapError::RateLimited { .. }
                ) {
                    self.affiliations.lock().await.insert(key, None);
                }
                None
            }
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("sources", &self.available_sources())
            .field("default_source", &self.default_source)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Fixed sample payload for trying the UI without network access.
pub fn demo_result() -> AnalysisResult {
    fn publication(title: &str, year: &str, citations: u64) -> PublicationSummary {
        PublicationSummary {
            title: title.into(),
            year: year.into(),
            citations,
        }
    }
    fn citing(name: &str, affiliation: &str, paper_title: &str, year: &str) -> CitingAuthorEntry {
        CitingAuthorEntry {
            name: name.into(),
            affiliation: affiliation.into(),
            paper_title: paper_title.into(),
            year: year.into(),
        }
    }
    fn location(institution: &str, lat: f64, lng: f64, count: u32, authors: &[&str]) -> Location {
        Location {
            institution: institution.into(),
            lat,
            lng,
            count,
            authors: authors.iter().map(|a| a.to_string()).collect(),
        }
    }

    AnalysisResult {
        author: AuthorSummary {
            name: "Demo Author".into(),
            affiliation: "Stanford University".into(),
            citations: 15000,
            h_index: 45,
        },
        publications: vec![
            publication("Deep Learning for Natural Language Processing", "2020", 500),
            publication("Attention Mechanisms in Neural Networks", "2019", 350),
            publication("Transfer Learning in Computer Vision", "2018", 280),
        ],
        citing_authors: vec![
            citing("John Smith", "MIT", "Advanced NLP", "2021"),
            citing("Maria Garcia", "University of Oxford", "Neural Networks", "2021"),
            citing("Wei Zhang", "Tsinghua University", "AI Research", "2020"),
            citing("Anna Mueller", "ETH Zurich", "Machine Learning", "2020"),
            citing("Takeshi Yamamoto", "University of Tokyo", "Deep Learning", "2019"),
        ],
        locations: vec![
            location("MIT", 42.3601, -71.0942, 5, &["John Smith", "Alice Brown"]),
            location("University of Oxford", 51.7520, -1.2577, 3, &["Maria Garcia"]),
            location("Tsinghua University", 40.0084, 116.3266, 4, &["Wei Zhang", "Li Wang"]),
            location("ETH Zurich", 47.3769, 8.5417, 2, &["Anna Mueller"]),
            location("University of Tokyo", 35.7128, 139.7621, 3, &["Takeshi Yamamoto"]),
            location("Stanford University", 37.4275, -122.1697, 6, &["Robert Lee"]),
            location("University of Cambridge", 52.2053, 0.1218, 2, &["James Wilson"]),
        ],
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeocodingService;
    use crate::types::{CitingPaper, Coordinates};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        kind: SourceKind,
        publications: Vec<Publication>,
        citing: HashMap<String, Vec<CitingPaper>>,
        affiliations: HashMap<String, String>,
        affiliation_calls: AtomicUsize,
        fail_author: bool,
        fail_affiliation: bool,
    }

    impl FakeSource {
        fn new(kind: SourceKind) -> Self {
            Self {
                kind,
                publications: Vec::new(),
                citing: HashMap::new(),
                affiliations: HashMap::new(),
                affiliation_calls: AtomicUsize::new(0),
                fail_author: false,
                fail_affiliation: false,
            }
        }
    }

    #[async_trait]
    impl CitationSource for FakeSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch_author(
            &self,
            identifier: &ScholarIdentifier,
        ) -> Result<(AuthorProfile, Vec<Publication>)> {
            if self.fail_author {
                return Err(CiteMapError::RateLimited { retry_after: None });
            }
            if identifier.value() == "Nobody" {
                return Err(CiteMapError::NotFound("Nobody".into()));
            }
            let profile = AuthorProfile {
                id: "a1".into(),
                name: Some("Ada Lovelace".into()),
                affiliation: Some("University of London".into()),
                citations: 1200,
                h_index: 12,
            };
            Ok((profile, self.publications.clone()))
        }

        async fn citing_papers(
            &self,
            publication: &Publication,
            limit: u32,
        ) -> Result<Vec<CitingPaper>> {
            if publication.id == "broken" {
                return Err(CiteMapError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(self
                .citing
                .get(&publication.id)
                .map(|p| p.iter().take(limit as usize).cloned().collect())
                .unwrap_or_default())
        }

        async fn author_affiliation(&self, author: &CitingAuthor) -> Result<Option<String>> {
            self.affiliation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_affiliation {
                return Err(CiteMapError::Upstream("CAPTCHA".into()));
            }
            Ok(self.affiliations.get(&author.name).cloned())
        }
    }

    struct FakeGeocoder;

    #[async_trait]
    impl GeocodingService for FakeGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
            let coords = match query {
                "Harvard University" => (42.37, -71.12),
                "Stanford University" => (37.43, -122.17),
                "ETH Zurich" => (47.38, 8.55),
                _ => return Ok(None),
            };
            Ok(Some(Coordinates {
                lat: coords.0,
                lng: coords.1,
                address: query.to_string(),
            }))
        }
    }

    fn publication(id: &str, citations: u64) -> Publication {
        Publication {
            id: id.into(),
            title: format!("Paper {}", id),
            year: Some("2019".into()),
            citations,
        }
    }

    fn paper(title: &str, authors: Vec<CitingAuthor>) -> CitingPaper {
        CitingPaper {
            title: title.into(),
            year: Some("2022".into()),
            authors,
        }
    }

    fn analyzer(source: FakeSource) -> Analyzer {
        Analyzer::new(
            SourceKind::OpenAlex,
            GeocodeCache::new(Arc::new(FakeGeocoder)),
        )
        .with_source(Arc::new(source))
    }

    fn populated_source() -> FakeSource {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.publications = vec![
            publication("low", 2),
            publication("top", 50),
            publication("none", 0),
            publication("mid", 10),
        ];
        source.citing.insert(
            "top".into(),
            vec![
                paper(
                    "Citing One",
                    vec![
                        CitingAuthor::new("Grace Hopper", Some("Professor at Harvard University".into())),
                        CitingAuthor::new("Second Author", Some("ETH Zurich".into())),
                    ],
                ),
                paper("Citing Two", vec![CitingAuthor::new("Alan Turing", None)]),
            ],
        );
        source.citing.insert(
            "mid".into(),
            vec![
                paper("Citing Three", vec![CitingAuthor::new("Grace Hopper", Some("Harvard University".into()))]),
                paper("Citing Four", vec![CitingAuthor::new("X", None), CitingAuthor::new("Nomad", None)]),
            ],
        );
        source
            .affiliations
            .insert("Alan Turing".into(), "PhD student, Stanford University".into());
        source
    }

    #[tokio::test]
    async fn test_analyze_groups_by_institution() {
        let result = analyzer(populated_source())
            .analyze("A5023888391", None, AnalysisOptions::default())
            .await
            .unwrap();

        assert_eq!(result.source, Some(SourceKind::OpenAlex));
        assert_eq!(result.author.name, "Ada Lovelace");

        let titles: Vec<_> = result.publications.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Paper top", "Paper mid", "Paper low"]);

        // First author only, one-letter names skipped.
        let names: Vec<_> = result.citing_authors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Grace Hopper", "Alan Turing", "Grace Hopper", "Nomad"]);
        assert_eq!(result.citing_authors[1].affiliation, "Stanford University");
        assert_eq!(result.citing_authors[3].affiliation, "");

        assert_eq!(result.locations.len(), 2);
        assert_eq!(result.locations[0].institution, "Harvard University");
        assert_eq!(result.locations[0].count, 2);
        assert_eq!(result.locations[0].authors, vec!["Grace Hopper"]);
        assert_eq!(result.locations[1].institution, "Stanford University");
    }

    #[tokio::test]
    async fn test_authors_per_paper_and_max_papers() {
        let options = AnalysisOptions {
            max_papers: 1,
            max_citations: 1,
            authors_per_paper: 2,
        };
        let result = analyzer(populated_source())
            .analyze("A5023888391", None, options)
            .await
            .unwrap();

        assert_eq!(result.publications.len(), 1);
        let names: Vec<_> = result.citing_authors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Grace Hopper", "Second Author"]);
        assert_eq!(result.locations[1].institution, "ETH Zurich");
    }

    #[tokio::test]
    async fn test_ungeocodable_affiliations_dropped() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.publications = vec![publication("p", 3)];
        source.citing.insert(
            "p".into(),
            vec![paper("C", vec![CitingAuthor::new("Someone", Some("Atlantis Institute".into()))])],
        );

        let result = analyzer(source)
            .analyze("A5023888391", None, AnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(result.citing_authors.len(), 1);
        assert_eq!(result.citing_authors[0].affiliation, "Atlantis Institute");
        assert!(result.locations.is_empty());
    }

    #[tokio::test]
    async fn test_citation_failures_are_skipped() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.publications = vec![publication("broken", 9)];

        let result = analyzer(source)
            .analyze("A5023888391", None, AnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(result.publications.len(), 1);
        assert!(result.citing_authors.is_empty());
    }

    #[tokio::test]
    async fn test_affiliation_lookups_are_cached() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.publications = vec![publication("p", 3)];
        source.citing.insert(
            "p".into(),
            vec![
                paper("C1", vec![CitingAuthor::new("Alan Turing", None)]),
                paper("C2", vec![CitingAuthor::new("Alan Turing", None)]),
            ],
        );
        source
            .affiliations
            .insert("Alan Turing".into(), "Stanford University".into());
        let source = Arc::new(source);

        let analyzer = Analyzer::new(
            SourceKind::OpenAlex,
            GeocodeCache::new(Arc::new(FakeGeocoder)),
        )
        .with_source(source.clone());

        let result = analyzer
            .analyze("A5023888391", None, AnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(result.locations[0].count, 2);
        assert_eq!(source.affiliation_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blocked_affiliation_lookup_cached_as_miss() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.fail_affiliation = true;
        source.publications = vec![publication("p", 3)];
        source.citing.insert(
            "p".into(),
            vec![
                paper("C1", vec![CitingAuthor::new("Alan Turing", None)]),
                paper("C2", vec![CitingAuthor::new("Alan Turing", None)]),
                paper("C3", vec![CitingAuthor::new("Alan Turing", None)]),
            ],
        );
        let source = Arc::new(source);

        let analyzer = Analyzer::new(
            SourceKind::OpenAlex,
            GeocodeCache::new(Arc::new(FakeGeocoder)),
        )
        .with_source(source.clone());

        let result = analyzer
            .analyze("A5023888391", None, AnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(result.citing_authors.len(), 3);
        assert!(result.citing_authors.iter().all(|c| c.affiliation.is_empty()));
        assert_eq!(source.affiliation_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_location_lists_at_most_five_authors() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.publications = vec![publication("p", 10)];
        let papers = (0..8)
            .map(|i| {
                paper(
                    &format!("C{}", i),
                    vec![CitingAuthor::new(
                        format!("Author {}", i),
                        Some("ETH Zurich".into()),
                    )],
                )
            })
            .collect();
        source.citing.insert("p".into(), papers);

        let options = AnalysisOptions {
            max_papers: 1,
            max_citations: 8,
            authors_per_paper: 1,
        };
        let result = analyzer(source)
            .with_limits(AnalysisLimits {
                max_citations: 10,
                ..AnalysisLimits::default()
            })
            .analyze("A5023888391", None, options)
            .await
            .unwrap();

        assert_eq!(result.locations.len(), 1);
        assert_eq!(result.locations[0].count, 8);
        assert_eq!(result.locations[0].authors.len(), MAX_LOCATION_AUTHORS);
        assert_eq!(result.locations[0].authors[0], "Author 0");
        assert_eq!(result.locations[0].authors[4], "Author 4");
    }

    #[tokio::test]
    async fn test_zero_limits_do_not_panic() {
        let result = analyzer(populated_source())
            .with_limits(AnalysisLimits {
                max_papers: 0,
                max_citations: 0,
                authors_per_paper: 0,
            })
            .analyze("A5023888391", None, AnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(result.publications.len(), 1);
        assert_eq!(result.citing_authors.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_upstream() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.fail_author = true;
        let err = analyzer(source)
            .analyze("Ada Lovelace", None, AnalysisOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CiteMapError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_not_found_passes_through() {
        let err = analyzer(FakeSource::new(SourceKind::OpenAlex))
            .quick_analyze("Nobody", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CiteMapError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_source_selection() {
        let analyzer = analyzer(FakeSource::new(SourceKind::OpenAlex))
            .with_source(Arc::new(FakeSource::new(SourceKind::SemanticScholar)));

        let result = analyzer.quick_analyze("Ada Lovelace", None).await.unwrap();
        assert_eq!(result.source, Some(SourceKind::OpenAlex));

        let result = analyzer
            .quick_analyze("https://www.semanticscholar.org/author/1741101", None)
            .await
            .unwrap();
        assert_eq!(result.source, Some(SourceKind::SemanticScholar));

        let result = analyzer
            .quick_analyze("Ada Lovelace", Some(SourceKind::SemanticScholar))
            .await
            .unwrap();
        assert_eq!(result.source, Some(SourceKind::SemanticScholar));

        // Mismatched source and identifier.
        let err = analyzer
            .quick_analyze("A5023888391", Some(SourceKind::SemanticScholar))
            .await
            .unwrap_err();
        assert!(matches!(err, CiteMapError::InvalidIdentifier(_)));

        // Not registered.
        let err = analyzer
            .quick_analyze("https://scholar.google.com/citations?user=JicYPdAAAAAJ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CiteMapError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_quick_analyze_keeps_source_order() {
        let mut source = FakeSource::new(SourceKind::OpenAlex);
        source.publications = (0..12).map(|i| publication(&format!("p{}", i), i)).collect();
        let result = analyzer(source).quick_analyze("Ada Lovelace", None).await.unwrap();
        assert_eq!(result.publications.len(), QUICK_PUBLICATIONS);
        assert_eq!(result.publications[0].title, "Paper p0");
        assert!(result.citing_authors.is_empty());
        assert!(result.locations.is_empty());
    }

    #[test]
    fn test_demo_result_shape() {
        let demo = demo_result();
        assert_eq!(demo.author.name, "Demo Author");
        assert_eq!(demo.publications.len(), 3);
        assert_eq!(demo.citing_authors.len(), 5);
        assert_eq!(demo.locations.len(), 7);
        assert_eq!(demo.source, None);
        let json = serde_json::to_value(&demo).unwrap();
        assert!(json.get("source").is_none());
        assert_eq!(json["locations"][0]["authors"][1], "Alice Brown");
    }
}

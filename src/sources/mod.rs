//! Bibliographic data sources.
//!
//! Each source turns a [`ScholarIdentifier`] into an author record with
//! publications, lists papers citing a publication, and can look up a citing
//! author's affiliation.

use crate::error::Result;
use crate::identifier::ScholarIdentifier;
use crate::types::{AuthorProfile, CitingAuthor, CitingPaper, Publication, SourceKind};
use async_trait::async_trait;

pub mod google_scholar;
pub mod openalex;
pub mod semantic_scholar;

pub use google_scholar::GoogleScholarSource;
pub use openalex::OpenAlexSource;
pub use semantic_scholar::SemanticScholarSource;

/// A provider of author, publication and citation records.
#[async_trait]
pub trait CitationSource: Send + Sync {
    /// Which source this is.
    fn kind(&self) -> SourceKind;

    /// Fetch the author profile and their publications.
    ///
    /// Plain names are resolved through the source's author search, taking
    /// the first hit.
    async fn fetch_author(
        &self,
        identifier: &ScholarIdentifier,
    ) -> Result<(AuthorProfile, Vec<Publication>)>;

    /// List up to `limit` papers citing `publication`.
    async fn citing_papers(&self, publication: &Publication, limit: u32)
        -> Result<Vec<CitingPaper>>;

    /// Look up the affiliation of a citing author whose paper did not carry one.
    ///
    /// Uses the source's own author id when the byline provided one, the
    /// name otherwise.
    async fn author_affiliation(&self, author: &CitingAuthor) -> Result<Option<String>>;
}

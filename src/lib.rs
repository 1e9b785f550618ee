//! # citemap
//!
//! Map where a scholar's citations come from.
//!
//! Give it a Google Scholar profile URL, a Semantic Scholar or OpenAlex author
//! URL, or a plain name. It fetches the author's most cited publications, the
//! papers citing them, cleans each citing author's affiliation and geocodes it.
//!
//! Provides:
//! - **Library**: [`Analyzer`] over pluggable [`CitationSource`]s and a cached geocoder
//! - **Service**: axum HTTP API ([`server`]) with a small map page
//! - **CLI**: `citemap` binary (feature `cli`)
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> citemap::Result<()> {
//! use citemap::{AnalysisOptions, Config};
//!
//! let analyzer = Config::from_env()?.build_analyzer()?;
//! let result = analyzer
//!     .analyze("https://www.semanticscholar.org/author/1741101", None, AnalysisOptions::default())
//!     .await?;
//! for loc in &result.locations {
//!     println!("{} ({}, {}): {}", loc.institution, loc.lat, loc.lng, loc.count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Identifiers
//!
//! ```
//! use citemap::{ScholarIdentifier, SourceKind};
//!
//! let id = ScholarIdentifier::parse("https://scholar.google.com/citations?user=JicYPdAAAAAJ&hl=en").unwrap();
//! assert_eq!(id, ScholarIdentifier::GoogleScholar("JicYPdAAAAAJ".into()));
//! assert_eq!(id.preferred_source(), Some(SourceKind::GoogleScholar));
//! ```

pub mod affiliation;
pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod geocode;
pub mod identifier;
pub mod rate_limit;
pub mod retry;
pub mod server;
pub mod sources;
pub mod types;

// Re-export key types at the crate root.
pub use analysis::{demo_result, Analyzer};
pub use config::Config;
pub use error::{CiteMapError, Result};
pub use geocode::{GeocodeCache, GeocodingService, NominatimClient};
pub use identifier::ScholarIdentifier;
pub use sources::CitationSource;
pub use types::*;

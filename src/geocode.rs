//! Free-text geocoding of institution names.
//!
//! [`NominatimClient`] talks to an OpenStreetMap Nominatim instance.
//! [`GeocodeCache`] sits in front of any [`GeocodingService`] and remembers
//! both hits and misses for the lifetime of the process.

use crate::client::HttpClient;
use crate::error::{CiteMapError, Result};
use crate::rate_limit::RateLimiter;
use crate::types::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Something that can turn a place name into coordinates.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Resolve `query`; `Ok(None)` when nothing matched.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim search client.
///
/// The public instance allows one request per second and requires an
/// identifying User-Agent.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: HttpClient,
}

impl NominatimClient {
    /// Create a client for the given Nominatim base URL.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = HttpClient::new(base_url)?
            .with_user_agent(user_agent)?
            .with_rate_limiter(RateLimiter::new(1.0));
        Ok(Self { client })
    }

    /// Wrap a preconfigured client.
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GeocodingService for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        let places: Vec<NominatimPlace> = self
            .client
            .get_json(
                "/search",
                &[("q", query), ("format", "json"), ("limit", "1")],
            )
            .await?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| CiteMapError::Parse(format!("Invalid latitude {}: {}", place.lat, e)))?;
        let lng = place
            .lon
            .parse::<f64>()
            .map_err(|e| CiteMapError::Parse(format!("Invalid longitude {}: {}", place.lon, e)))?;

        Ok(Some(Coordinates {
            lat,
            lng,
            address: place.display_name,
        }))
    }
}

/// In-memory cache of geocoding results keyed by the trimmed query.
#[derive(Clone)]
pub struct GeocodeCache {
    service: Arc<dyn GeocodingService>,
    entries: Arc<Mutex<HashMap<String, Option<Coordinates>>>>,
}

impl GeocodeCache {
    pub fn new(service: Arc<dyn GeocodingService>) -> Self {
        Self {
            service,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Geocode through the cache.
    ///
    /// Blank queries return `None` without a lookup. Upstream failures are
    /// logged and remembered as misses.
    pub async fn lookup(&self, query: &str) -> Option<Coordinates> {
        let key = query.trim();
        if key.is_empty() {
            return None;
        }

        if let Some(cached) = self.entries.lock().await.get(key) {
            debug!("Geocode cache hit: {}", key);
            return cached.clone();
        }

        let result = match self.service.geocode(key).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Geocoding failed for {}: {}", key, e);
                None
            }
        };

        self.entries
            .lock()
            .await
            .insert(key.to_string(), result.clone());
        result
    }

    /// Number of cached queries (hits and misses).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl std::fmt::Debug for GeocodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeCache").finish_non_exhaustive()
    }
}

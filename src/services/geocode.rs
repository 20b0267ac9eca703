//! Address geocoding with a primary provider, an open-data fallback and an
//! explicit in-process cache keyed by normalized address text.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cache::TtlCache;

/// Geocode results change rarely; cache for a day.
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const CACHE_MAX_ENTRIES: usize = 10_000;

/// Resolved coordinates plus the provider that produced them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub provider: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocode request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no result for address")]
    NoResult,
}

/// Primary provider response shape.
#[derive(Debug, Deserialize)]
struct PrimaryResponse {
    results: Vec<PrimaryResult>,
}

#[derive(Debug, Deserialize)]
struct PrimaryResult {
    lat: f64,
    lng: f64,
}

/// Fallback (Nominatim-style) response shape; coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct FallbackResult {
    lat: String,
    lon: String,
}

pub struct GeocodeClient {
    http: reqwest::Client,
    primary_url: String,
    primary_api_key: String,
    fallback_url: String,
    cache: TtlCache<String, GeocodeResult>,
}

impl GeocodeClient {
    pub fn new(
        primary_url: &str,
        primary_api_key: &str,
        fallback_url: &str,
    ) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fieldops/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            primary_url: primary_url.trim_end_matches('/').to_string(),
            primary_api_key: primary_api_key.to_string(),
            fallback_url: fallback_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(CACHE_TTL, CACHE_MAX_ENTRIES),
        })
    }

    /// Resolve a free-text address to coordinates.
    ///
    /// Checks the cache first, then the primary provider, then the fallback
    /// provider if the primary errors or returns nothing. Only successful
    /// resolutions are cached.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let key = normalize_address(address);
        if let Some(hit) = self.cache.get(&key).await {
            metrics::counter!("geocode_cache_hits_total").increment(1);
            return Ok(hit);
        }
        metrics::counter!("geocode_cache_misses_total").increment(1);

        let result = match self.geocode_primary(address).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "primary geocoder failed, trying fallback");
                metrics::counter!("geocode_fallbacks_total").increment(1);
                self.geocode_fallback(address).await?
            }
        };

        self.cache.insert(key, result.clone()).await;
        Ok(result)
    }

    async fn geocode_primary(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let response: PrimaryResponse = self
            .http
            .get(format!("{}/v1/geocode", self.primary_url))
            .query(&[("q", address), ("api_key", &self.primary_api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = response.results.first().ok_or(GeocodeError::NoResult)?;
        Ok(GeocodeResult {
            latitude: first.lat,
            longitude: first.lng,
            provider: "primary".to_string(),
        })
    }

    async fn geocode_fallback(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let results: Vec<FallbackResult> = self
            .http
            .get(format!("{}/search", self.fallback_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = results.first().ok_or(GeocodeError::NoResult)?;
        let latitude = first.lat.parse().map_err(|_| GeocodeError::NoResult)?;
        let longitude = first.lon.parse().map_err(|_| GeocodeError::NoResult)?;
        Ok(GeocodeResult {
            latitude,
            longitude,
            provider: "fallback".to_string(),
        })
    }
}

/// Cache key normalization: trim, lowercase, collapse internal whitespace.
/// "12 Main St" and " 12  main st " geocode identically.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_whitespace_and_case() {
        assert_eq!(normalize_address("12 Main St"), "12 main st");
        assert_eq!(normalize_address("  12   MAIN   st  "), "12 main st");
        assert_eq!(normalize_address("12\tmain\nst"), "12 main st");
    }

    #[test]
    fn normalization_of_empty_input_is_empty() {
        assert_eq!(normalize_address(""), "");
        assert_eq!(normalize_address("   "), "");
    }

    #[test]
    fn fallback_response_parses_string_coordinates() {
        let body = r#"[{"lat": "-23.5505", "lon": "-46.6333"}]"#;
        let results: Vec<FallbackResult> = serde_json::from_str(body).unwrap();
        assert_eq!(results[0].lat, "-23.5505");
        assert_eq!(results[0].lon, "-46.6333");
    }
}

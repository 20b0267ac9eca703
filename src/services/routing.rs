//! Driving-route estimation between two coordinates at a departure time.
//!
//! Results are cached by rounded origin/destination plus a 15-minute
//! departure bucket. When the provider cannot compute a route (islands,
//! unmapped areas, provider outage) a straight-line estimate is returned
//! instead of an error, since dispatch screens need a number either way.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cache::TtlCache;

const CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const CACHE_MAX_ENTRIES: usize = 10_000;

/// Departure times within the same bucket share a cache entry.
const TIME_BUCKET_SECONDS: i64 = 15 * 60;

/// Road distance exceeds straight-line distance by roughly this factor.
const FALLBACK_ROAD_FACTOR: f64 = 1.3;

/// Assumed average speed for the fallback estimate, in km/h.
const FALLBACK_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteEstimate {
    pub duration_seconds: u64,
    pub distance_meters: u64,
    /// True when the value came from the straight-line fallback rather
    /// than the routing provider.
    pub estimated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    routes: Vec<ProviderRoute>,
}

#[derive(Debug, Deserialize)]
struct ProviderRoute {
    duration: f64,
    distance: f64,
}

pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
    cache: TtlCache<String, RouteEstimate>,
}

impl RoutingClient {
    pub fn new(base_url: &str) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fieldops/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(CACHE_TTL, CACHE_MAX_ENTRIES),
        })
    }

    /// Estimate the drive from `from` to `to` departing at `depart_at`.
    /// Never fails with "no route": the fallback estimate covers that case.
    pub async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        depart_at: DateTime<Utc>,
    ) -> Result<RouteEstimate, RoutingError> {
        let key = route_cache_key(from, to, depart_at);
        if let Some(hit) = self.cache.get(&key).await {
            metrics::counter!("route_cache_hits_total").increment(1);
            return Ok(hit);
        }
        metrics::counter!("route_cache_misses_total").increment(1);

        let estimate = match self.route_provider(from, to, depart_at).await {
            Ok(Some(estimate)) => estimate,
            Ok(None) => {
                metrics::counter!("route_fallbacks_total").increment(1);
                fallback_estimate(from, to)
            }
            Err(e) => {
                tracing::warn!(error = %e, "routing provider failed, using fallback estimate");
                metrics::counter!("route_fallbacks_total").increment(1);
                fallback_estimate(from, to)
            }
        };

        self.cache.insert(key, estimate.clone()).await;
        Ok(estimate)
    }

    async fn route_provider(
        &self,
        from: Coordinates,
        to: Coordinates,
        depart_at: DateTime<Utc>,
    ) -> Result<Option<RouteEstimate>, RoutingError> {
        let coords = format!(
            "{},{};{},{}",
            from.longitude, from.latitude, to.longitude, to.latitude
        );
        let response: ProviderResponse = self
            .http
            .get(format!("{}/route/v1/driving/{}", self.base_url, coords))
            .query(&[("depart_at", depart_at.to_rfc3339())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.routes.first().map(|r| RouteEstimate {
            duration_seconds: r.duration.max(0.0) as u64,
            distance_meters: r.distance.max(0.0) as u64,
            estimated: false,
        }))
    }
}

/// Cache key: coordinates rounded to ~11m precision plus the departure
/// bucket, so repeated dispatch-board refreshes hit the cache.
fn route_cache_key(from: Coordinates, to: Coordinates, depart_at: DateTime<Utc>) -> String {
    let bucket = depart_at.timestamp().div_euclid(TIME_BUCKET_SECONDS);
    format!(
        "{:.4},{:.4}|{:.4},{:.4}|{bucket}",
        from.latitude, from.longitude, to.latitude, to.longitude
    )
}

/// Straight-line estimate used when no route is computable.
fn fallback_estimate(from: Coordinates, to: Coordinates) -> RouteEstimate {
    let straight = haversine_meters(from, to);
    let distance = straight * FALLBACK_ROAD_FACTOR;
    let duration = distance / (FALLBACK_SPEED_KMH * 1000.0 / 3600.0);
    RouteEstimate {
        duration_seconds: duration.round() as u64,
        distance_meters: distance.round() as u64,
        estimated: true,
    }
}

/// Great-circle distance in meters.
fn haversine_meters(a: Coordinates, b: Coordinates) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coords(lat: f64, lon: f64) -> Coordinates {
        Coordinates {
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let p = coords(-23.5505, -46.6333);
        assert!(haversine_meters(p, p) < 1e-6);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // São Paulo to Rio de Janeiro, roughly 360 km great-circle.
        let sp = coords(-23.5505, -46.6333);
        let rio = coords(-22.9068, -43.1729);
        let d = haversine_meters(sp, rio);
        assert!((330_000.0..390_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn fallback_estimate_is_marked_estimated() {
        let e = fallback_estimate(coords(-23.55, -46.63), coords(-23.56, -46.64));
        assert!(e.estimated);
        assert!(e.distance_meters > 0);
        assert!(e.duration_seconds > 0);
    }

    #[test]
    fn cache_key_buckets_departure_time() {
        let from = coords(-23.5505, -46.6333);
        let to = coords(-23.56, -46.64);
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let same_bucket = Utc.with_ymd_and_hms(2024, 6, 1, 9, 14, 59).unwrap();
        let next_bucket = Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).unwrap();

        assert_eq!(
            route_cache_key(from, to, t0),
            route_cache_key(from, to, same_bucket)
        );
        assert_ne!(
            route_cache_key(from, to, t0),
            route_cache_key(from, to, next_bucket)
        );
    }

    #[test]
    fn cache_key_rounds_coordinates() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let to = coords(-23.56, -46.64);
        // Difference below the fourth decimal place collapses to one key.
        let a = coords(-23.55051, -46.63331);
        let b = coords(-23.55049, -46.63329);
        assert_eq!(route_cache_key(a, to, t), route_cache_key(b, to, t));
    }
}

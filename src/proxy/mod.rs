//! The `/planes` pipeline
//!
//! A request moves through validation, admission, the upstream call and
//! enrichment, in that order. Validation comes first so that malformed
//! requests are refused without spending the caller's quota.

pub mod enrich;

use crate::config::defaults::DEFAULT_DIST_NM;
use crate::constants::messages::MISSING_COORDINATES;
use crate::coord::Coordinates;
use crate::quota::{ClientIdentity, Decision, QuotaGuard};
use crate::upstream::{AircraftFeed, UpstreamError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Query string of `GET /planes`
///
/// Kept as raw strings so that parse failures map to our own error messages.
#[derive(Debug, Clone, Default)]
pub struct PlanesQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub dist: Option<String>,
}

/// A query that passed validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidQuery {
    pub center: Coordinates,
    /// Search radius in nautical miles
    pub dist: f64,
}

/// Body of a successful `/planes` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanesResponse {
    pub ac: Vec<Value>,
}

/// Request-scoped failures of the pipeline
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<ProxyError> for crate::error::Error {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::BadRequest(msg) => crate::error::Error::InvalidCoordinates(msg),
            ProxyError::Upstream(UpstreamError::Status { status, body }) => {
                crate::error::Error::Upstream(format!("status {}: {}", status, body))
            }
            other => crate::error::Error::Upstream(other.to_string()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(name: &str, raw: &str) -> Result<f64, ProxyError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProxyError::BadRequest(format!("Invalid '{}' parameter: expected a number", name)))
}

impl PlanesQuery {
    pub fn new(lat: f64, lon: f64, dist: Option<f64>) -> Self {
        Self {
            lat: Some(lat.to_string()),
            lon: Some(lon.to_string()),
            dist: dist.map(|d| d.to_string()),
        }
    }

    /// Build from decoded query pairs; the first occurrence of a key wins
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                "dist" => &mut query.dist,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// Check presence, parseability and ranges of the parameters
    pub fn validate(&self, default_dist: f64) -> Result<ValidQuery, ProxyError> {
        let (Some(lat), Some(lon)) = (non_empty(&self.lat), non_empty(&self.lon)) else {
            return Err(ProxyError::BadRequest(MISSING_COORDINATES.to_string()));
        };

        let center = Coordinates::new(parse_number("lat", lat)?, parse_number("lon", lon)?);
        center
            .validate()
            .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

        let dist = match non_empty(&self.dist) {
            Some(raw) => parse_number("dist", raw)?,
            None => default_dist,
        };
        if dist <= 0.0 {
            return Err(ProxyError::BadRequest(
                "Invalid 'dist' parameter: must be positive".to_string(),
            ));
        }

        Ok(ValidQuery { center, dist })
    }
}

/// Serves `/planes`: validate, admit, fetch, enrich, sort
pub struct ProxyHandler {
    guard: Arc<QuotaGuard>,
    feed: AircraftFeed,
    default_dist: f64,
}

impl ProxyHandler {
    pub fn new(guard: Arc<QuotaGuard>, feed: AircraftFeed) -> Self {
        Self {
            guard,
            feed,
            default_dist: DEFAULT_DIST_NM,
        }
    }

    /// Radius used when the caller omits `dist`
    pub fn with_default_dist(mut self, dist: f64) -> Self {
        self.default_dist = dist;
        self
    }

    pub fn guard(&self) -> &QuotaGuard {
        &self.guard
    }

    /// Run one `/planes` request for `identity`
    pub async fn planes(
        &self,
        identity: &ClientIdentity,
        query: &PlanesQuery,
    ) -> Result<PlanesResponse, ProxyError> {
        let valid = query.validate(self.default_dist)?;
        self.planes_validated(identity, valid).await
    }

    /// Admission, fetch and enrichment for a query that already passed validation
    pub async fn planes_validated(
        &self,
        identity: &ClientIdentity,
        valid: ValidQuery,
    ) -> Result<PlanesResponse, ProxyError> {
        if let Decision::Denied { retry_after, .. } = self.guard.check_and_increment(identity).await {
            return Err(ProxyError::RateLimited { retry_after });
        }

        let aircraft = self.feed.fetch(valid.center, valid.dist).await?;
        debug!(client = %identity, count = aircraft.len(), "received aircraft");

        Ok(PlanesResponse {
            ac: enrich::enrich(valid.center, aircraft),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::memory::MemoryStore;
    use crate::quota::{QuotaLimit, StoreFailureMode};
    use crate::test_support::{spawn_upstream, unreachable_base_url};
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn handler(base_url: &str, hourly: u64) -> ProxyHandler {
        let guard = QuotaGuard::new(
            Arc::new(MemoryStore::new()),
            vec![QuotaLimit::hourly(hourly), QuotaLimit::monthly(10_000)],
            StoreFailureMode::Deny,
        );
        let feed = AircraftFeed::with_client(reqwest::Client::new(), base_url, "test-host", "key");
        ProxyHandler::new(Arc::new(guard), feed)
    }

    fn query(lat: Option<&str>, lon: Option<&str>, dist: Option<&str>) -> PlanesQuery {
        PlanesQuery {
            lat: lat.map(str::to_string),
            lon: lon.map(str::to_string),
            dist: dist.map(str::to_string),
        }
    }

    fn client() -> ClientIdentity {
        ClientIdentity::new("192.0.2.10")
    }

    #[test]
    fn test_validate_missing_coordinates() {
        for q in [
            query(Some("40"), None, None),
            query(None, Some("-74"), None),
            query(Some(""), Some("-74"), None),
            query(None, None, Some("5")),
        ] {
            match q.validate(5.0) {
                Err(ProxyError::BadRequest(msg)) => assert_eq!(msg, MISSING_COORDINATES),
                other => panic!("expected bad request, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_from_pairs_first_value_wins() {
        let pairs = [("lat", "40"), ("lat", "41"), ("lon", "-74"), ("dist", "10"), ("dist", "2"), ("x", "y")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));

        let valid = PlanesQuery::from_pairs(pairs).validate(5.0).unwrap();
        assert_eq!(valid.center, Coordinates::new(40.0, -74.0));
        assert_eq!(valid.dist, 10.0);
    }

    #[test]
    fn test_validate_malformed_numbers() {
        let err = query(Some("north"), Some("-74"), None).validate(5.0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid 'lat' parameter: expected a number");

        let err = query(Some("40"), Some("NaN"), None).validate(5.0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid 'lon' parameter: expected a number");

        let err = query(Some("40"), Some("-74"), Some("far")).validate(5.0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid 'dist' parameter: expected a number");

        assert!(query(Some("40"), Some("-74"), Some("0")).validate(5.0).is_err());
        assert!(query(Some("95"), Some("-74"), None).validate(5.0).is_err());
    }

    #[test]
    fn test_validate_defaults_dist() {
        let valid = query(Some("40.0"), Some("-74.0"), None).validate(5.0).unwrap();
        assert_eq!(valid.center, Coordinates::new(40.0, -74.0));
        assert_eq!(valid.dist, 5.0);

        let valid = query(Some(" 40.0 "), Some("-74.0"), Some("12.5")).validate(5.0).unwrap();
        assert_eq!(valid.center.lat, 40.0);
        assert_eq!(valid.dist, 12.5);
    }

    #[tokio::test]
    async fn test_end_to_end_enrichment() {
        let upstream = spawn_upstream(
            200,
            r#"{"ac":[{"lat":40.01,"lon":-74.0,"flight":"AB1"},{"flight":"AB2"}]}"#.to_string(),
        )
        .await;
        let handler = handler(&upstream.base_url, 500);

        let response = handler
            .planes(&client(), &query(Some("40.0"), Some("-74.0"), Some("5")))
            .await
            .unwrap();

        assert_eq!(response.ac.len(), 2);
        assert_eq!(response.ac[0]["flight"], "AB1");
        assert_eq!(response.ac[0]["lat"], json!(40.01));
        assert_abs_diff_eq!(response.ac[0]["dist"].as_f64().unwrap(), 0.6, epsilon = 0.01);
        assert_eq!(response.ac[1], json!({"flight": "AB2"}));

        assert_eq!(upstream.requests()[0].path, "/v2/lat/40/lon/-74/dist/5/");
    }

    #[tokio::test]
    async fn test_validation_precedes_admission() {
        let upstream = spawn_upstream(200, r#"{"ac":[]}"#.to_string()).await;
        // no quota at all
        let handler = handler(&upstream.base_url, 0);

        let err = handler
            .planes(&client(), &query(Some("40.0"), None, None))
            .await
            .unwrap_err();

        match err {
            ProxyError::BadRequest(msg) => assert_eq!(msg, MISSING_COORDINATES),
            other => panic!("expected bad request, got {:?}", other),
        }
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_bad_requests_do_not_consume_quota() {
        let upstream = spawn_upstream(200, r#"{"ac":[]}"#.to_string()).await;
        let handler = handler(&upstream.base_url, 1);

        for _ in 0..3 {
            assert!(handler.planes(&client(), &query(None, None, None)).await.is_err());
        }

        assert!(handler
            .planes(&client(), &query(Some("1"), Some("2"), None))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_rate_limited_skips_upstream() {
        let upstream = spawn_upstream(200, r#"{"ac":[]}"#.to_string()).await;
        let handler = handler(&upstream.base_url, 1);
        let q = query(Some("40.0"), Some("-74.0"), None);

        handler.planes(&client(), &q).await.unwrap();
        let err = handler.planes(&client(), &q).await.unwrap_err();

        assert!(matches!(err, ProxyError::RateLimited { retry_after: Some(_) }));
        assert_eq!(upstream.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_status_error() {
        let upstream = spawn_upstream(503, "rate limited".to_string()).await;
        let handler = handler(&upstream.base_url, 500);

        let err = handler
            .planes(&client(), &query(Some("40.0"), Some("-74.0"), None))
            .await
            .unwrap_err();

        match err {
            ProxyError::Upstream(UpstreamError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_unreachable() {
        let handler = handler(&unreachable_base_url().await, 500);

        let err = handler
            .planes(&client(), &query(Some("40.0"), Some("-74.0"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Upstream(UpstreamError::Transport(_))));
    }

    #[tokio::test]
    async fn test_custom_default_dist() {
        let upstream = spawn_upstream(200, r#"{"ac":[]}"#.to_string()).await;
        let handler = handler(&upstream.base_url, 500).with_default_dist(25.0);

        handler
            .planes(&client(), &query(Some("51.5"), Some("-0.12"), None))
            .await
            .unwrap();

        assert_eq!(upstream.requests()[0].path, "/v2/lat/51.5/lon/-0.12/dist/25/");
    }

    #[tokio::test]
    async fn test_planes_validated_counts_quota() {
        let upstream = spawn_upstream(200, r#"{"ac":[{"lat":40.0,"lon":-74.0}]}"#.to_string()).await;
        let handler = handler(&upstream.base_url, 1);
        let valid = PlanesQuery::new(40.0, -74.0, Some(3.0)).validate(5.0).unwrap();

        let response = handler.planes_validated(&client(), valid).await.unwrap();
        assert_eq!(response.ac[0]["dist"], json!(0.0));
        assert_eq!(upstream.requests()[0].path, "/v2/lat/40/lon/-74/dist/3/");

        let err = handler.planes_validated(&client(), valid).await.unwrap_err();
        assert!(matches!(err, ProxyError::RateLimited { .. }));
        assert_eq!(upstream.requests().len(), 1);
    }
}

//! Aircraft-tracking provider client
//!
//! Queries ADS-B Exchange (through RapidAPI) for aircraft around a point.
//! One attempt per query, no retries; the request is bounded by the
//! configured timeout.

use crate::config::UpstreamConfig;
use crate::constants::api::{RAPIDAPI_HOST_HEADER, RAPIDAPI_KEY_HEADER};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure talking to the provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("{0}")]
    Transport(String),

    /// The provider answered with something other than 200
    #[error("API returned status code {status}")]
    Status { status: u16, body: String },

    /// The provider answered 200 with a body we cannot read
    #[error("Invalid upstream payload: {0}")]
    Payload(String),
}

/// HTTP client for the aircraft feed
#[derive(Debug, Clone)]
pub struct AircraftFeed {
    client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: String,
}

impl AircraftFeed {
    /// Create a feed client from the `[upstream]` config section
    pub fn new(config: &UpstreamConfig, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.base_url, &config.host, api_key))
    }

    /// Create a feed client around an existing HTTP client
    pub fn with_client(client: reqwest::Client, base_url: &str, host: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            host: host.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Provider URL for a query around `center` within `dist` nautical miles
    pub fn url(&self, center: Coordinates, dist: f64) -> String {
        format!(
            "{}/v2/lat/{}/lon/{}/dist/{}/",
            self.base_url, center.lat, center.lng, dist
        )
    }

    /// Fetch the aircraft list around `center`
    ///
    /// Returns the provider's `ac` array as-is; a missing or null `ac` is an
    /// empty list.
    pub async fn fetch(
        &self,
        center: Coordinates,
        dist: f64,
    ) -> std::result::Result<Vec<Value>, UpstreamError> {
        let url = self.url(center, dist);
        debug!(%url, "querying aircraft feed");

        let response = self
            .client
            .get(&url)
            .header(RAPIDAPI_KEY_HEADER, &self.api_key)
            .header(RAPIDAPI_HOST_HEADER, &self.host)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "aircraft feed request failed");
                UpstreamError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "aircraft feed returned an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_aircraft(&body)
    }
}

/// Extract the `ac` array from a provider response body
pub fn parse_aircraft(body: &str) -> std::result::Result<Vec<Value>, UpstreamError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| UpstreamError::Payload(e.to_string()))?;

    let Value::Object(mut root) = value else {
        return Err(UpstreamError::Payload("expected a JSON object".to_string()));
    };

    match root.remove("ac") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(aircraft)) => Ok(aircraft),
        Some(_) => Err(UpstreamError::Payload("'ac' is not an array".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_upstream;
    use serde_json::json;

    fn feed(base_url: &str) -> AircraftFeed {
        AircraftFeed::with_client(
            reqwest::Client::new(),
            base_url,
            "adsbexchange-com1.p.rapidapi.com",
            "test-key",
        )
    }

    #[test]
    fn test_url_format() {
        let feed = feed("https://adsbexchange-com1.p.rapidapi.com/");
        let url = feed.url(Coordinates::new(40.5, -74.25), 5.0);
        assert_eq!(
            url,
            "https://adsbexchange-com1.p.rapidapi.com/v2/lat/40.5/lon/-74.25/dist/5/"
        );
    }

    #[test]
    fn test_parse_aircraft() {
        let ac = parse_aircraft(r#"{"ac":[{"flight":"AB1"},{"flight":"AB2"}],"total":2}"#).unwrap();
        assert_eq!(ac.len(), 2);
        assert_eq!(ac[1]["flight"], "AB2");
    }

    #[test]
    fn test_parse_missing_or_null_ac() {
        assert!(parse_aircraft(r#"{"msg":"No error"}"#).unwrap().is_empty());
        assert!(parse_aircraft(r#"{"ac":null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_bad_payload() {
        assert!(matches!(parse_aircraft("not json"), Err(UpstreamError::Payload(_))));
        assert!(matches!(parse_aircraft("[1,2]"), Err(UpstreamError::Payload(_))));
        assert!(matches!(parse_aircraft(r#"{"ac":5}"#), Err(UpstreamError::Payload(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_path_and_headers() {
        let upstream = spawn_upstream(200, json!({"ac": [{"flight": "AB1"}]}).to_string()).await;

        let ac = feed(&upstream.base_url)
            .fetch(Coordinates::new(40.0, -74.0), 5.0)
            .await
            .unwrap();
        assert_eq!(ac, vec![json!({"flight": "AB1"})]);

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/v2/lat/40/lon/-74/dist/5/");
        assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
        assert_eq!(
            requests[0].api_host.as_deref(),
            Some("adsbexchange-com1.p.rapidapi.com")
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status_passes_body_through() {
        let upstream = spawn_upstream(503, "rate limited".to_string()).await;

        let err = feed(&upstream.base_url)
            .fetch(Coordinates::new(40.0, -74.0), 5.0)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            UpstreamError::Status {
                status: 503,
                body: "rate limited".to_string()
            }
        );
        assert_eq!(err.to_string(), "API returned status code 503");
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let base_url = crate::test_support::unreachable_base_url().await;

        let err = feed(&base_url)
            .fetch(Coordinates::new(40.0, -74.0), 5.0)
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}

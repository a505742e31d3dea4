//! Arrivals API HTTP client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::StationId;

use super::error::UpstreamError;
use super::source::ArrivalSource;
use super::types::ArrivalsResponse;

/// Default base URL for the arrivals API.
pub const DEFAULT_BASE_URL: &str = "https://transitrouter.pages.dev/api/bmtc";

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Configuration for the arrivals client.
#[derive(Debug, Clone)]
pub struct ArrivalsConfig {
    /// Base URL for the API; `/arrivals` is appended
    pub base_url: String,
    /// Request timeout in seconds. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
    /// Value for the User-Agent header
    pub user_agent: String,
}

impl ArrivalsConfig {
    /// Create a config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: concat!("arrivals-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for ArrivalsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the upstream arrivals API.
#[derive(Debug, Clone)]
pub struct ArrivalsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArrivalsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ArrivalsConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| UpstreamError::NotConfigured("invalid user agent".to_string()))?;
        headers.insert(USER_AGENT, user_agent);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the arrivals board for one station.
    pub async fn get_arrivals(&self, station: &StationId) -> Result<ArrivalsResponse, UpstreamError> {
        let url = format!("{}/arrivals", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("stationid", station.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| UpstreamError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(MAX_ERROR_BODY).collect()),
        })
    }
}

impl ArrivalSource for ArrivalsClient {
    async fn fetch_station(
        &self,
        station: &StationId,
    ) -> Result<Arc<ArrivalsResponse>, UpstreamError> {
        self.get_arrivals(station).await.map(Arc::new)
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::{Reply, serve};
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn config_builder() {
        let config = ArrivalsConfig::new()
            .with_base_url("http://localhost:8080")
            .with_timeout(15);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn config_defaults() {
        let config = ArrivalsConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, None);
        assert!(config.user_agent.starts_with("arrivals-server/"));
    }

    #[test]
    fn client_creation() {
        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url("http://x/"));
        assert_eq!(client.unwrap().base_url, "http://x");
    }

    #[tokio::test]
    async fn fetches_and_decodes_board() {
        let base = serve(HashMap::from([(
            "20623",
            Reply::Json(json!({
                "services": [{
                    "no": "500-CA",
                    "destination": "Kempegowda",
                    "frequency": 1,
                    "next": {"duration_ms": 120000, "vehicle_id": 7}
                }]
            })),
        )]))
        .await;

        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url(base)).unwrap();
        let station = StationId::parse("20623").unwrap();
        let board = client.fetch_station(&station).await.unwrap();

        assert_eq!(board.services.len(), 1);
        assert_eq!(board.services[0].no.as_deref(), Some("500-CA"));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let base = serve(HashMap::from([(
            "20624",
            Reply::Status(StatusCode::SERVICE_UNAVAILABLE),
        )]))
        .await;

        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url(base)).unwrap();
        let station = StationId::parse("20624").unwrap();
        let err = client.get_arrivals(&station).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn unexpected_shape_is_json_error() {
        let base = serve(HashMap::from([(
            "20621",
            Reply::Json(json!({"services": "none today"})),
        )]))
        .await;

        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url(base)).unwrap();
        let station = StationId::parse("20621").unwrap();
        let err = client.get_arrivals(&station).await.unwrap_err();

        match err {
            UpstreamError::Json { body, .. } => {
                assert!(body.unwrap().contains("none today"));
            }
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let base = serve(HashMap::from([("21711", Reply::Raw("<html>oops</html>"))])).await;

        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url(base)).unwrap();
        let station = StationId::parse("21711").unwrap();
        let err = client.get_arrivals(&station).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Json { .. }));
    }

    #[tokio::test]
    async fn connection_refused_is_http_error() {
        // Bind then drop a listener to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            ArrivalsClient::new(ArrivalsConfig::new().with_base_url(format!("http://{addr}")))
                .unwrap();
        let station = StationId::parse("20623").unwrap();
        let err = client.get_arrivals(&station).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Http(_)));
    }
}

//! Upstream client error types.

/// Errors from fetching one station's arrivals.
///
/// Every variant means the same thing to the fetcher: this station
/// contributes nothing to the current batch.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// No data for this station (mock source only)
    #[error("no data for station {station}")]
    NotFound { station: String },

    /// Client could not be constructed
    #[error("not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = UpstreamError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "API error 502: Bad Gateway");

        let err = UpstreamError::Json {
            message: "missing field `services`".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("services"));

        let err = UpstreamError::NotFound {
            station: "20623".into(),
        };
        assert_eq!(err.to_string(), "no data for station 20623");
    }
}

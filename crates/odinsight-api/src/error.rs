use thiserror::Error;

/// Top-level error type for the `odinsight-api` crate.
///
/// Covers every failure mode of talking to an upstream metrics provider:
/// transport, HTTP status, and payload decoding. `odinsight-core` absorbs
/// these at the orchestrator boundary; callers of the dashboard never see them.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// Non-2xx response from the provider.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The source does not declare an endpoint for this query.
    #[error("Source '{source_name}' does not serve {query} queries")]
    Unsupported { source_name: String, query: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Status {
            status: 503,
            url: "https://example.test/x".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_not_transient() {
        let err = Error::Status {
            status: 404,
            url: "https://example.test/x".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn unsupported_names_the_query() {
        let err = Error::Unsupported {
            source_name: "Mempool.space".into(),
            query: "addresses".into(),
        };
        assert_eq!(
            err.to_string(),
            "Source 'Mempool.space' does not serve addresses queries"
        );
    }
}

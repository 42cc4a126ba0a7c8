// ── Core error types ──
//
// Errors raised inside the acquisition pipeline. The orchestrator logs and
// absorbs them per source; `Dashboard` fetch operations never return them.
// The `From<odinsight_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Source errors ────────────────────────────────────────────────
    #[error("Source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Source '{source_name}' timed out after {timeout_secs}s")]
    Timeout {
        source_name: String,
        timeout_secs: u64,
    },

    #[error("Source '{source_name}' does not serve {query} queries")]
    Unsupported { source_name: String, query: String },

    #[error("Malformed payload from '{source_name}': {message}")]
    Transform {
        source_name: String,
        message: String,
    },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Unknown chart range '{range}' (expected 1h, 24h, 7d, 30d, 90d, 180d, 1Y or All)")]
    InvalidRange { range: String },

    #[error("Unknown language '{language}' (expected zh or en)")]
    InvalidLanguage { language: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Attach the failing source's name to a transport error.
    pub fn from_api(source_name: &str, err: odinsight_api::Error) -> Self {
        match err {
            odinsight_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                source_name: source_name.to_owned(),
                timeout_secs,
            },
            odinsight_api::Error::Unsupported { source_name, query } => {
                CoreError::Unsupported { source_name, query }
            }
            odinsight_api::Error::Deserialization { message, body: _ } => CoreError::Transform {
                source_name: source_name.to_owned(),
                message,
            },
            other => CoreError::SourceUnavailable {
                source_name: source_name.to_owned(),
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn transform(source_name: &str, message: impl Into<String>) -> Self {
        CoreError::Transform {
            source_name: source_name.to_owned(),
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<odinsight_api::Error> for CoreError {
    fn from(err: odinsight_api::Error) -> Self {
        match err {
            odinsight_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            odinsight_api::Error::HttpClient(message) => CoreError::Config { message },
            other => CoreError::from_api("<unknown>", other),
        }
    }
}

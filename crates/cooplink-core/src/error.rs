// ── Core error types ──
//
// User-facing errors from cooplink-core. These are NOT API-specific --
// consumers never see raw HTTP status codes or JSON parse failures.
// The `From<cooplink_api::Error>` impl translates transport-layer
// errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cloud API unreachable: {reason}")]
    Transport { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Dispatch rejected: {message}")]
    Dispatch { message: String },

    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("Engine is shut down")]
    ShutDown,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cooplink_api::Error> for CoreError {
    fn from(err: cooplink_api::Error) -> Self {
        match err {
            cooplink_api::Error::Authentication => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            cooplink_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cooplink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::Transport {
                        reason: e.to_string(),
                    }
                }
            }
            cooplink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid base URL: {e}"),
            },
            cooplink_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            cooplink_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response shape: {message}"),
                status: None,
            },
        }
    }
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}

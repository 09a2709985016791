//! CLI error type with diagnostic codes and shell exit codes.

use miette::Diagnostic;
use thiserror::Error;

use cooplink_core::CoreError;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("authentication failed: {message}")]
    #[diagnostic(
        code(cooplink::auth),
        help("check the API key in your profile or the COOPLINK_API_KEY variable")
    )]
    Auth { message: String },

    #[error("no device matches '{device}'")]
    #[diagnostic(
        code(cooplink::not_found),
        help("run `cooplink devices list` to see known devices")
    )]
    DeviceNotFound { device: String },

    #[error("{message}")]
    #[diagnostic(code(cooplink::usage))]
    Usage { message: String },

    #[error("device '{device}' has no {subsystem}")]
    #[diagnostic(
        code(cooplink::no_subsystem),
        help("run `cooplink devices show <device>` to see what it supports")
    )]
    MissingSubsystem { device: String, subsystem: String },

    #[error("could not reach the Omlet cloud: {message}")]
    #[diagnostic(
        code(cooplink::connection),
        help("check your network connection and the configured base URL")
    )]
    Connection { message: String },

    #[error("request timed out after {timeout_secs}s")]
    #[diagnostic(code(cooplink::timeout))]
    Timeout { timeout_secs: u64 },

    #[error("{message}")]
    #[diagnostic(code(cooplink::conflict))]
    Conflict { message: String },

    #[error(transparent)]
    #[diagnostic(code(cooplink::config))]
    Config(#[from] cooplink_config::ConfigError),

    #[error("{0}")]
    #[diagnostic(code(cooplink::api))]
    Core(String),

    #[error("serialization failed: {0}")]
    #[diagnostic(code(cooplink::internal))]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(cooplink::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Auth { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Usage { .. } | Self::MissingSubsystem { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::Connection { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Core(_) | Self::Serialize(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => Self::Auth { message },
            CoreError::DeviceNotFound { device_id } => Self::DeviceNotFound { device: device_id },
            CoreError::Transport { reason } => Self::Connection { message: reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            CoreError::Validation { message } | CoreError::Dispatch { message } => {
                Self::Conflict { message }
            }
            other => Self::Core(other.to_string()),
        }
    }
}

impl From<cooplink_api::Error> for CliError {
    fn from(err: cooplink_api::Error) -> Self {
        Self::from(CoreError::from(err))
    }
}

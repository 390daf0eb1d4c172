use std::fmt;

use crate::api::Payload;

/// Discriminant callers switch on to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed (DNS, connection refused, timeout).
    Network,
    /// The server answered but rejected the request or reported an error.
    Api,
    /// A client-side business rule was violated; nothing was sent.
    Validation,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Api => "api",
            Self::Validation => "validation",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("Network error: {message} ({method} {url})")]
    Network {
        message: String,
        url: String,
        method: String,
    },

    #[error("API error (HTTP {status}): {message}")]
    Api {
        message: String,
        status: u16,
        body: Payload,
        url: String,
        method: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl DashError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Api,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status of an API failure, `None` for every other kind.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message without the kind prefix, suitable for an error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => "Network error, please try again later.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Validation(msg) => msg.clone(),
            Self::Config(e) => e.to_string(),
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;

// Error types shared by the library modules. The binary wraps these in
// `anyhow` at the top level; everything below `main` returns one of these.

use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the conversion service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key not set. Please run 'ytrss auth'")]
    MissingApiKey,

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed: {status} - {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Unexpected response at '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Job is not ready for download. status: {0}")]
    NotReady(String),

    #[error("{operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ApiError {
    /// Whether the server rejected the API key itself.
    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::MissingApiKey | ApiError::InvalidApiKey(_) => true,
            ApiError::Status { status, .. } => {
                *status == reqwest::StatusCode::UNAUTHORIZED
                    || *status == reqwest::StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API key cannot be empty")]
    Empty,

    #[error("Could not determine a config directory for the API key")]
    NoConfigDir,

    #[error("{operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_points_at_auth_command() {
        let err = ApiError::MissingApiKey;
        assert!(err.to_string().contains("ytrss auth"));
        assert!(err.is_auth());
    }

    #[test]
    fn status_errors_carry_body() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "bad key".into(),
        };
        assert!(err.is_auth());
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("bad key"));

        let err = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert!(!err.is_auth());
    }
}

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure reported by, or while talking to, the students backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Backend error ({status}): {message}")]
    Backend { status: StatusCode, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl RepositoryError {
    /// Builds a backend error from a non-success status and its raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<PostgrestErrorBody>(body).unwrap_or_default();

        let mut message = match parsed.message {
            Some(message) => message,
            None if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            None => body.trim().to_string(),
        };
        if let Some(code) = parsed.code {
            message = format!("[{code}] {message}");
        }
        if let Some(details) = parsed.details {
            message = format!("{message} ({details})");
        }

        RepositoryError::Backend { status, message }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::DecodeError(err.to_string())
        } else {
            RepositoryError::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::DecodeError(err.to_string())
    }
}

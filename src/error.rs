// Error type shared by every command. Variants map one-to-one onto the
// messages the user sees, so callers branch on the kind instead of
// string-matching.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("local path not found: {0}")]
    LocalPathNotFound(String),

    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("{}", transport_message(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("terminal input failed: {0}")]
    Prompt(String),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("server returned {}: {}", code, message),
        None => format!("request failed: {}", message),
    }
}

impl CliError {
    /// Classify a non-success HTTP response. `body` is the response text,
    /// kept as detail for the user.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let detail = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no details")
                .to_string()
        } else {
            body.trim().to_string()
        };
        match status {
            StatusCode::UNAUTHORIZED => CliError::Auth(format!("invalid or revoked API token ({})", detail)),
            StatusCode::FORBIDDEN => CliError::Permission(detail),
            StatusCode::NOT_FOUND => CliError::NotFound(detail),
            StatusCode::CONFLICT => CliError::Conflict(detail),
            other => CliError::Transport {
                status: Some(other.as_u16()),
                message: detail,
            },
        }
    }

    /// A conflict means the resource is already there, which callers treat
    /// as a warning.
    pub fn is_benign(&self) -> bool {
        matches!(self, CliError::Conflict(_))
    }

    /// Errors that do not stem from user input or a server answer.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, CliError::Io(_) | CliError::Json(_) | CliError::Prompt(_))
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        CliError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for CliError {
    fn from(err: walkdir::Error) -> Self {
        let message = err.to_string();
        match err.into_io_error() {
            Some(io) => CliError::Io(io),
            None => CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, message)),
        }
    }
}

//! Error type for backend calls

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a backend call.
///
/// Only `SessionExpired` is produced by the token renewal policy itself;
/// everything else is handed back to the caller as the server or the
/// network reported it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),

    #[error("server responded with HTTP {status}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("session expired, please sign in again")]
    SessionExpired,
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let msg = if e.is_timeout() {
            "Request timed out".to_string()
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            format!("Request failed: {}", e)
        };
        ApiError::Transport(msg)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_http_errors() {
        let err = ApiError::Status { status: 409, body: String::new() };
        assert_eq!(err.status(), Some(409));
        assert!(err.is_conflict());
        assert_eq!(ApiError::SessionExpired.status(), None);
        assert_eq!(ApiError::Transport("down".into()).status(), None);
    }
}

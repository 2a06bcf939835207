use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error body returned by the search proxy: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ProxyException {
    pub status: u16,
    pub message: String,
}

impl ProxyException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ProxyException> for ErrorBody {
    fn from(value: ProxyException) -> Self {
        Self {
            error: value.message,
        }
    }
}

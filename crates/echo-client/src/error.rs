//! Client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("No base URLs configured")]
    NoBaseUrls,

    #[error("HTTP client setup failed: {0}")]
    Setup(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server error {status} from {url}")]
    Server { url: String, status: u16, body: String },

    /// 4xx answer, decoded from the error envelope when possible.
    #[error("{code} ({status}): {message}")]
    Api { status: u16, code: String, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } | ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the next base URL should be tried.
    pub(crate) fn allows_fallback(&self) -> bool {
        matches!(self, ClientError::Transport { .. } | ClientError::Server { .. })
    }
}

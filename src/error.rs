use thiserror::Error;

/// Failures surfaced by the remote client.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, refused connection, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: u16, url: String },

    /// 404 from the API. Detail lookups treat this as "no such entity".
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("a name or id is required")]
    MissingIdentifier,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

use std::fmt;

use async_trait::async_trait;

use super::types::SearchResponse;

/// Ways a search can fail. The transcript treats them all the same;
/// the distinction only reaches the log.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Transport-level failure (DNS, connection refused, reset).
    Network(String),
    /// The service answered with a non-2xx status.
    Status { status: u16, body: String },
    /// The body was not a valid `SearchResponse`.
    Decode(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Status { status, body } => {
                write!(f, "backend returned HTTP {status}: {body}")
            }
            BackendError::Decode(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// A question-answering service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short human-readable label (shown in the title bar).
    fn name(&self) -> &str;

    /// Ask one standalone question.
    async fn search(&self, query: &str) -> Result<SearchResponse, BackendError>;
}

use async_trait::async_trait;
use thiserror::Error;

/// Why an existence check did not confirm a reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(String),
}

/// Network check that a canonical reference resolves to a live entity.
///
/// Implementations make a single attempt and must return within their
/// configured timeout.
#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    async fn check(&self, url: &str) -> Result<(), ProbeError>;
}

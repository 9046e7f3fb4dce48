use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Links collected from one submitting user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name as last seen; empty when the user has none.
    #[serde(default)]
    pub username: String,
    /// Canonical `https://t.me/<name>` links.
    #[serde(default)]
    pub links: BTreeSet<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for per-user link sets and the derived global channel set.
///
/// Implementations keep the global set equal to the union of every user's
/// links once each call returns.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Union `links` into the user's set. Empty input is a no-op.
    async fn store_links(
        &self,
        user_id: &str,
        username: &str,
        links: &BTreeSet<String>,
    ) -> StoreResult<()>;

    async fn get_user_links(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;

    async fn get_all_channels(&self) -> StoreResult<BTreeSet<String>>;

    /// Returns whether the user held `link`. Fails with
    /// [`StoreError::UnknownUser`] when the user never stored anything; an
    /// absent link is not an error.
    async fn remove_link(&self, user_id: &str, link: &str) -> StoreResult<bool>;

    /// Unknown users are a no-op.
    async fn clear_user_links(&self, user_id: &str) -> StoreResult<()>;
}

#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

pub mod extract;
pub mod pipeline;
pub mod probe;
pub mod store;
pub mod validate;

pub use extract::{LinkSyntax, extract};
pub use pipeline::{Classification, LinkPipeline, valid_links};
pub use probe::{ExistenceProbe, ProbeError};
pub use store::{LinkStore, StoreError, StoreResult, UserRecord};
pub use validate::{CANONICAL_PREFIX, INVALID_FORMAT, ValidationResult, Validator, normalize};

#[async_trait]
impl<T: ExistenceProbe + ?Sized> ExistenceProbe for Arc<T> {
    async fn check(&self, url: &str) -> Result<(), ProbeError> {
        (**self).check(url).await
    }
}

#[async_trait]
impl<T: LinkStore + ?Sized> LinkStore for Arc<T> {
    async fn store_links(
        &self,
        user_id: &str,
        username: &str,
        links: &BTreeSet<String>,
    ) -> StoreResult<()> {
        (**self).store_links(user_id, username, links).await
    }

    async fn get_user_links(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        (**self).get_user_links(user_id).await
    }

    async fn get_all_channels(&self) -> StoreResult<BTreeSet<String>> {
        (**self).get_all_channels().await
    }

    async fn remove_link(&self, user_id: &str, link: &str) -> StoreResult<bool> {
        (**self).remove_link(user_id, link).await
    }

    async fn clear_user_links(&self, user_id: &str) -> StoreResult<()> {
        (**self).clear_user_links(user_id).await
    }
}

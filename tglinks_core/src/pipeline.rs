use std::collections::{BTreeMap, BTreeSet};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::extract::extract;
use crate::probe::ExistenceProbe;
use crate::store::LinkStore;
use crate::validate::{ValidationResult, Validator};

/// What happened to one inbound message, as reported to the messaging layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The text contained no candidate at all.
    NoLinksFound,
    /// Every candidate was valid and stored.
    AllValid { count: usize },
    /// Some (possibly none) of the candidates were valid.
    Partial {
        total: usize,
        valid: usize,
        invalid: usize,
    },
    /// Valid links were found but could not be persisted.
    StorageError,
}

impl Classification {
    /// Classify a non-empty set of validation results whose valid links
    /// were persisted successfully.
    #[must_use]
    pub fn from_results(results: &BTreeMap<String, ValidationResult>) -> Self {
        let total = results.len();
        if total == 0 {
            return Self::NoLinksFound;
        }
        let valid = results.values().filter(|r| r.is_valid).count();
        if valid == total {
            Self::AllValid { count: valid }
        } else {
            Self::Partial {
                total,
                valid,
                invalid: total - valid,
            }
        }
    }
}

/// Canonical links of the valid results, deduplicated.
#[must_use]
pub fn valid_links(results: &BTreeMap<String, ValidationResult>) -> BTreeSet<String> {
    results
        .values()
        .filter(|r| r.is_valid)
        .map(|r| r.normalized.clone())
        .collect()
}

/// Extractor → Validator → Store, once per inbound message.
pub struct LinkPipeline<P, S> {
    validator: Validator<P>,
    store: S,
}

impl<P, S> LinkPipeline<P, S>
where
    P: ExistenceProbe,
    S: LinkStore,
{
    pub const fn new(validator: Validator<P>, store: S) -> Self {
        Self { validator, store }
    }

    pub const fn validator(&self) -> &Validator<P> {
        &self.validator
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Process one message from `user_id`.
    pub async fn process(&self, user_id: &str, username: &str, text: &str) -> Classification {
        let span = info_span!("message", id = %Uuid::now_v7(), user = user_id);
        self.process_inner(user_id, username, text)
            .instrument(span)
            .await
    }

    async fn process_inner(&self, user_id: &str, username: &str, text: &str) -> Classification {
        let candidates = extract(text);
        if candidates.is_empty() {
            info!("No candidates in message");
            return Classification::NoLinksFound;
        }

        let results = self.validator.validate_candidates(&candidates).await;
        self.commit(user_id, username, &results).await
    }

    /// Persist the valid links of already computed results and classify them.
    pub async fn commit(
        &self,
        user_id: &str,
        username: &str,
        results: &BTreeMap<String, ValidationResult>,
    ) -> Classification {
        let links = valid_links(results);

        if !links.is_empty() {
            if let Err(e) = self.store.store_links(user_id, username, &links).await {
                error!("Failed to store links for user {user_id}: {e}");
                return Classification::StorageError;
            }
        }

        let classification = Classification::from_results(results);
        info!(
            "Processed {} candidates, stored {} links: {classification:?}",
            results.len(),
            links.len()
        );
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use crate::store::{StoreError, StoreResult, UserRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Probe that accepts only the listed canonical links.
    struct AllowListProbe(Vec<&'static str>);

    #[async_trait]
    impl ExistenceProbe for AllowListProbe {
        async fn check(&self, url: &str) -> Result<(), ProbeError> {
            if self.0.contains(&url) {
                Ok(())
            } else {
                Err(ProbeError::Status(404))
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<HashMap<String, UserRecord>>,
        calls: Mutex<usize>,
        fail: bool,
    }

    #[async_trait]
    impl LinkStore for MemoryStore {
        async fn store_links(
            &self,
            user_id: &str,
            username: &str,
            links: &BTreeSet<String>,
        ) -> StoreResult<()> {
            *self.calls.lock().await += 1;
            if self.fail {
                return Err(StoreError::Io {
                    path: "memory".to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            let mut users = self.users.lock().await;
            let record = users.entry(user_id.to_string()).or_default();
            record.username = username.to_string();
            record.links.extend(links.iter().cloned());
            Ok(())
        }

        async fn get_user_links(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
            Ok(self.users.lock().await.get(user_id).cloned())
        }

        async fn get_all_channels(&self) -> StoreResult<BTreeSet<String>> {
            Ok(self
                .users
                .lock()
                .await
                .values()
                .flat_map(|r| r.links.iter().cloned())
                .collect())
        }

        async fn remove_link(&self, _user_id: &str, _link: &str) -> StoreResult<bool> {
            Ok(false)
        }

        async fn clear_user_links(&self, _user_id: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn pipeline(
        allowed: Vec<&'static str>,
        store: MemoryStore,
    ) -> LinkPipeline<AllowListProbe, MemoryStore> {
        LinkPipeline::new(Validator::new(AllowListProbe(allowed)), store)
    }

    #[tokio::test]
    async fn test_no_links_leaves_store_untouched() {
        let p = pipeline(vec![], MemoryStore::default());
        assert_eq!(
            p.process("1", "alice", "hello world").await,
            Classification::NoLinksFound
        );
        assert_eq!(*p.store().calls.lock().await, 0);
    }

    #[tokio::test]
    async fn test_partial_success() {
        let p = pipeline(vec!["https://t.me/validuser"], MemoryStore::default());
        let outcome = p
            .process(
                "1",
                "alice",
                "check @validuser and t.me/invalid_user_that_404s",
            )
            .await;

        assert_eq!(
            outcome,
            Classification::Partial {
                total: 2,
                valid: 1,
                invalid: 1
            }
        );
        let record = p.store().get_user_links("1").await.ok().flatten();
        assert_eq!(
            record.map(|r| r.links.into_iter().collect::<Vec<_>>()),
            Some(vec!["https://t.me/validuser".to_string()])
        );
    }

    #[tokio::test]
    async fn test_all_valid_dedups_before_storing() {
        let p = pipeline(vec!["https://t.me/example"], MemoryStore::default());
        let outcome = p.process("1", "alice", "@example t.me/example").await;

        assert_eq!(outcome, Classification::AllValid { count: 2 });
        let channels = p.store().get_all_channels().await.ok().unwrap_or_default();
        assert_eq!(channels.len(), 1);
    }

    #[tokio::test]
    async fn test_all_invalid_is_partial_and_skips_store() {
        let p = pipeline(vec![], MemoryStore::default());
        let outcome = p.process("1", "alice", "@example").await;

        assert_eq!(
            outcome,
            Classification::Partial {
                total: 1,
                valid: 0,
                invalid: 1
            }
        );
        assert_eq!(*p.store().calls.lock().await, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_distinct() {
        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let p = pipeline(vec!["https://t.me/example"], store);
        assert_eq!(
            p.process("1", "alice", "@example").await,
            Classification::StorageError
        );
    }
}

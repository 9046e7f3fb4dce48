//! End-to-end pipeline tests over the JSON store with a stubbed network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tglinks_core::{Classification, ExistenceProbe, LinkPipeline, ProbeError, Validator};
use tglinks_storage::{JsonLinkStore, LinkStore};
use uuid::Uuid;

/// Probe answering from a fixed table; unknown links time out.
struct TableProbe(HashMap<&'static str, Result<(), ProbeError>>);

#[async_trait]
impl ExistenceProbe for TableProbe {
    async fn check(&self, url: &str) -> Result<(), ProbeError> {
        self.0.get(url).cloned().unwrap_or(Err(ProbeError::Timeout))
    }
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("tglinks_pipeline_{}", Uuid::now_v7()))
}

async fn pipeline(
    dir: &Path,
    table: Vec<(&'static str, Result<(), ProbeError>)>,
) -> LinkPipeline<TableProbe, Arc<JsonLinkStore>> {
    let store = JsonLinkStore::open(dir.join("valid_links.json"), dir.join("channels.json"))
        .await
        .unwrap();
    LinkPipeline::new(
        Validator::new(TableProbe(table.into_iter().collect())),
        Arc::new(store),
    )
}

#[tokio::test]
async fn test_partial_message_stores_only_valid_link() {
    let dir = temp_dir();
    let p = pipeline(
        &dir,
        vec![
            ("https://t.me/validuser", Ok(())),
            (
                "https://t.me/invalid_user_that_404s",
                Err(ProbeError::Status(404)),
            ),
        ],
    )
    .await;

    let outcome = p
        .process(
            "42",
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

    let record = p.store().get_user_links("42").await.unwrap().unwrap();
    assert_eq!(record.username, "alice");
    assert_eq!(
        record.links.into_iter().collect::<Vec<_>>(),
        vec!["https://t.me/validuser".to_string()]
    );
    assert_eq!(p.store().get_all_channels().await.unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_message_without_links_leaves_files_untouched() {
    let dir = temp_dir();
    let p = pipeline(&dir, vec![]).await;
    let before = std::fs::read_to_string(dir.join("valid_links.json")).unwrap();

    assert_eq!(
        p.process("42", "alice", "hello world").await,
        Classification::NoLinksFound
    );

    assert_eq!(
        std::fs::read_to_string(dir.join("valid_links.json")).unwrap(),
        before
    );
    assert!(p.store().get_user_links("42").await.unwrap().is_none());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_same_channel_in_every_syntax_is_stored_once() {
    let dir = temp_dir();
    let p = pipeline(&dir, vec![("https://t.me/example", Ok(()))]).await;

    let outcome = p
        .process(
            "7",
            "",
            "@example t.me/example telegram.me/example \
             https://t.me/example https://telegram.me/example",
        )
        .await;

    assert_eq!(outcome, Classification::AllValid { count: 5 });
    let record = p.store().get_user_links("7").await.unwrap().unwrap();
    assert_eq!(record.links.len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_timed_out_links_are_not_stored() {
    let dir = temp_dir();
    let p = pipeline(&dir, vec![]).await;

    let outcome = p.process("7", "bob", "@slow_channel").await;

    assert_eq!(
        outcome,
        Classification::Partial {
            total: 1,
            valid: 0,
            invalid: 1
        }
    );
    assert!(p.store().get_user_links("7").await.unwrap().is_none());
    assert!(p.store().get_all_channels().await.unwrap().is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

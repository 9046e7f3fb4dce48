use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tglinks_core::{LinkStore, StoreError, StoreResult, UserRecord};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type UserMap = BTreeMap<String, UserRecord>;

const EMPTY_USERS: &str = "{}";
const EMPTY_GLOBAL: &str = "{\n  \"channels\": []\n}";

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct GlobalChannels {
    #[serde(default)]
    channels: BTreeSet<String>,
}

/// Parsed file content. `corrupt` marks content that failed to parse and
/// `missing` a file that did not exist; both read as the empty value.
struct Loaded<T> {
    value: T,
    corrupt: bool,
    missing: bool,
}

impl<T> Loaded<T> {
    /// The value cannot serve as a baseline for incremental updates.
    const fn untrusted(&self) -> bool {
        self.corrupt || self.missing
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn union_of(users: &UserMap) -> BTreeSet<String> {
    users
        .values()
        .flat_map(|record| record.links.iter().cloned())
        .collect()
}

/// Sibling path with `suffix` appended to the file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

/// Per-user links and the global channel set, each in its own JSON file.
///
/// One mutex serializes every operation across its whole read-modify-write.
/// Safe for a single process only: there is no file-level locking.
pub struct JsonLinkStore {
    users_path: PathBuf,
    global_path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinkStore {
    /// Open the store, creating empty files (and parent directories) when
    /// absent, then repair the global file from the user file.
    pub async fn open(
        users_path: impl Into<PathBuf>,
        global_path: impl Into<PathBuf>,
    ) -> StoreResult<Self> {
        let store = Self {
            users_path: users_path.into(),
            global_path: global_path.into(),
            lock: Mutex::new(()),
        };

        ensure_file(&store.users_path, EMPTY_USERS).await?;
        ensure_file(&store.global_path, EMPTY_GLOBAL).await?;

        if store.reconcile().await? {
            warn!(
                "Global channel file {} was out of sync and has been rebuilt",
                store.global_path.display()
            );
        }

        info!(
            "JsonLinkStore initialized: users={}, global={}",
            store.users_path.display(),
            store.global_path.display()
        );
        Ok(store)
    }

    #[must_use]
    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    #[must_use]
    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    /// Rebuild the global file from the user file when they disagree.
    ///
    /// Returns whether the global file was rewritten. Skipped while the user
    /// file is unreadable, so a corrupt user file never wipes the global set.
    pub async fn reconcile(&self) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;

        let users = self.load_users().await?;
        if users.corrupt {
            warn!("User store is corrupt, skipping reconciliation");
            return Ok(false);
        }
        self.sync_global(&users.value).await
    }

    async fn load_users(&self) -> StoreResult<Loaded<UserMap>> {
        read_json(&self.users_path).await
    }

    async fn load_global(&self) -> StoreResult<Loaded<GlobalChannels>> {
        read_json(&self.global_path).await
    }

    async fn save_users(&self, users: &Loaded<UserMap>) -> StoreResult<()> {
        write_json(&self.users_path, &users.value, users.corrupt).await
    }

    /// Recompute the global set from scratch and persist it if it changed.
    async fn sync_global(&self, users: &UserMap) -> StoreResult<bool> {
        let global = self.load_global().await?;
        let channels = union_of(users);
        if !global.untrusted() && global.value.channels == channels {
            return Ok(false);
        }
        write_json(
            &self.global_path,
            &GlobalChannels { channels },
            global.corrupt,
        )
        .await?;
        Ok(true)
    }
}

#[async_trait]
impl LinkStore for JsonLinkStore {
    async fn store_links(
        &self,
        user_id: &str,
        username: &str,
        links: &BTreeSet<String>,
    ) -> StoreResult<()> {
        if links.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().await;

        let mut users = self.load_users().await?;
        let record = users.value.entry(user_id.to_string()).or_default();
        record.username = username.to_string();
        record.links.extend(links.iter().cloned());
        self.save_users(&users).await?;

        // Without the previous user map, entries of other users may be stale.
        if users.untrusted() {
            self.sync_global(&users.value).await?;
        } else {
            let mut global = self.load_global().await?;
            if global.untrusted() {
                global.value.channels = union_of(&users.value);
            } else {
                global.value.channels.extend(links.iter().cloned());
            }
            write_json(&self.global_path, &global.value, global.corrupt).await?;
        }

        info!("Stored {} links for user {user_id}", links.len());
        Ok(())
    }

    async fn get_user_links(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_users().await?.value.remove(user_id))
    }

    async fn get_all_channels(&self) -> StoreResult<BTreeSet<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_global().await?.value.channels)
    }

    async fn remove_link(&self, user_id: &str, link: &str) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;

        let mut users = self.load_users().await?;
        let Some(record) = users.value.get_mut(user_id) else {
            return Err(StoreError::UnknownUser(user_id.to_string()));
        };

        if !record.links.remove(link) {
            debug!("Link {link} not held by user {user_id}");
            return Ok(false);
        }

        self.save_users(&users).await?;
        self.sync_global(&users.value).await?;

        info!("Removed link {link} for user {user_id}");
        Ok(true)
    }

    async fn clear_user_links(&self, user_id: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;

        let mut users = self.load_users().await?;
        let Some(record) = users.value.get_mut(user_id) else {
            return Ok(());
        };
        if record.links.is_empty() {
            return Ok(());
        }

        record.links.clear();
        self.save_users(&users).await?;
        self.sync_global(&users.value).await?;

        info!("Cleared links for user {user_id}");
        Ok(())
    }
}

async fn ensure_file(path: &Path, empty: &str) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    if !tokio::fs::try_exists(path).await.map_err(io_error(path))? {
        tokio::fs::write(path, empty).await.map_err(io_error(path))?;
        info!("Created empty store file: {}", path.display());
    }
    Ok(())
}

/// Read and parse a store file. A missing file reads as empty; so does an
/// unparsable one, which is logged and left on disk.
async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<Loaded<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Loaded {
                value: T::default(),
                corrupt: false,
                missing: true,
            });
        }
        Err(e) => return Err(io_error(path)(e)),
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Loaded {
            value,
            corrupt: false,
            missing: false,
        }),
        Err(e) => {
            warn!(
                "Corrupted store file {}: {e}; treating as empty",
                path.display()
            );
            Ok(Loaded {
                value: T::default(),
                corrupt: true,
                missing: false,
            })
        }
    }
}

/// Replace a store file atomically (temp file + rename). When the current
/// content was unparsable it is first moved aside to `<file>.corrupt-<ts>`.
async fn write_json<T: Serialize>(
    path: &Path,
    value: &T,
    preserve_corrupt: bool,
) -> StoreResult<()> {
    if preserve_corrupt && tokio::fs::try_exists(path).await.map_err(io_error(path))? {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let backup = sibling(path, &format!(".corrupt-{stamp}"));
        tokio::fs::rename(path, &backup)
            .await
            .map_err(io_error(path))?;
        warn!("Preserved corrupted store file as {}", backup.display());
    }

    let data = serde_json::to_vec_pretty(value)?;
    let tmp = sibling(path, ".tmp");
    tokio::fs::write(&tmp, data).await.map_err(io_error(&tmp))?;
    tokio::fs::rename(&tmp, path).await.map_err(io_error(path))?;
    Ok(())
}

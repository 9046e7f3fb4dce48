//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use std::sync::Arc;
use tglinks_config::Config;
use tglinks_core::{LinkPipeline, Validator};
use tglinks_providers::HttpProbe;
use tglinks_storage::JsonLinkStore;
use tglinks_telegram::BotPipeline;
use tracing::info;

mod check;
mod info;
mod init;
mod links;
mod telegram;
mod version;

pub use check::{CheckInput, CheckStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use links::{ClearInput, ClearStrategy, ListInput, ListStrategy, RemoveInput, RemoveStrategy};
pub use telegram::{TelegramInput, TelegramStrategy};
pub use version::VersionStrategy;

/// Open the link store at the configured location.
async fn open_store(config: &Config) -> anyhow::Result<Arc<JsonLinkStore>> {
    let users_path = config.storage.users_path()?;
    let global_path = config.storage.global_path()?;
    info!("Opening link store in {}", config.storage.data_dir()?.display());

    let store = JsonLinkStore::open(users_path, global_path).await?;
    Ok(Arc::new(store))
}

/// Wire the production probe and the store into a pipeline.
async fn build_pipeline(config: &Config) -> anyhow::Result<BotPipeline> {
    let probe = HttpProbe::new(&config.validator)?;
    info!(
        "Existence probe timeout: {}ms",
        config.validator.probe_timeout_ms
    );
    let store = open_store(config).await?;
    Ok(LinkPipeline::new(Validator::new(probe), store))
}

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

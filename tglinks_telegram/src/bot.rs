use crate::{Command, Error, Result};
use std::{sync::Arc, time::Duration};
use teloxide::prelude::*;
use tglinks_core::{Classification, LinkPipeline, LinkStore, StoreError, normalize};
use tglinks_providers::HttpProbe;
use tglinks_storage::JsonLinkStore;
use tokio::time::sleep;
use tracing::{info, warn};

/// Pipeline wired with the production probe and store.
pub type BotPipeline = LinkPipeline<HttpProbe, Arc<JsonLinkStore>>;

/// Result of a `/remove` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Canonical link that is no longer stored for the user.
    Removed(String),
    /// The user has links, but not this one.
    NotHeld(String),
    /// The argument is not a link in any supported syntax.
    InvalidFormat,
    /// The user never stored anything.
    UnknownUser,
}

/// Telegram bot collecting links
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    /// Extraction, validation and storage
    pipeline: Arc<BotPipeline>,
    /// Allowed chat IDs
    allowed_chats: Vec<i64>,
}

impl TelegramBot {
    /// Create a new Telegram bot
    pub fn new(token: String, pipeline: Arc<BotPipeline>, allowed_chats: &[String]) -> Self {
        // Parse allowed chat IDs
        let allowed_chats = allowed_chats
            .iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();

        Self {
            bot: Bot::new(token),
            pipeline,
            allowed_chats,
        }
    }

    /// Check if a chat is allowed
    #[must_use]
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }

    /// Run one message through the pipeline
    pub async fn process_message(
        &self,
        chat_id: i64,
        user_id: &str,
        username: &str,
        text: &str,
    ) -> Result<Classification> {
        if !self.is_allowed(chat_id) {
            return Err(Error::Unauthorized(chat_id));
        }
        Ok(self.pipeline.process(user_id, username, text).await)
    }

    /// Links stored for a user, in canonical form
    pub async fn list_links(&self, user_id: &str) -> Result<Vec<String>> {
        let record = self.pipeline.store().get_user_links(user_id).await?;
        Ok(record
            .map(|r| r.links.into_iter().collect())
            .unwrap_or_default())
    }

    /// Remove one link, given in any supported syntax
    pub async fn remove_link(&self, user_id: &str, raw: &str) -> Result<RemoveOutcome> {
        let Some(link) = normalize(raw.trim()) else {
            return Ok(RemoveOutcome::InvalidFormat);
        };

        match self.pipeline.store().remove_link(user_id, &link).await {
            Ok(true) => Ok(RemoveOutcome::Removed(link)),
            Ok(false) => Ok(RemoveOutcome::NotHeld(link)),
            Err(StoreError::UnknownUser(_)) => Ok(RemoveOutcome::UnknownUser),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn clear_links(&self, user_id: &str) -> Result<()> {
        self.pipeline.store().clear_user_links(user_id).await?;
        Ok(())
    }

    /// Test connection to Telegram API with linear backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) -> Result<()> {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(bot_user) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        bot_user
                            .user
                            .username
                            .unwrap_or_else(|| "no username".to_string()),
                        bot_user.user.id
                    );
                    return Ok(());
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");

                    // Only show detailed help on first failure
                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking api.telegram.org");
                        warn!("  - Invalid bot token");
                        warn!("  - Telegram API being temporarily unavailable");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run the bot
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await?;

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register command menu: {e}");
        }

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |_bot: Bot, msg: teloxide::types::Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}

/// Bot over a real pipeline whose store lives in `dir`.
#[cfg(test)]
pub(crate) async fn bot_in(dir: &std::path::Path) -> TelegramBot {
    use tglinks_core::Validator;
    use tglinks_providers::ProbeConfig;

    let probe = HttpProbe::new(&ProbeConfig::default())
        .unwrap_or_else(|e| panic!("probe client should build: {e}"));
    let store = JsonLinkStore::open(dir.join("valid_links.json"), dir.join("channels.json"))
        .await
        .unwrap_or_else(|e| panic!("store should open: {e}"));
    let pipeline = LinkPipeline::new(Validator::new(probe), Arc::new(store));
    TelegramBot::new("123456:TEST".to_string(), Arc::new(pipeline), &[])
}

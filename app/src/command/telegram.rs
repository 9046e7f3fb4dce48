use crate::command::CommandStrategy;
use std::sync::Arc;
use tglinks_config::{Config, TOKEN_ENV};
use tglinks_telegram::TelegramBot;
use tracing::info;

/// Input for Telegram bot command.
pub struct TelegramInput {
    /// Optional bot token (overrides config and environment)
    pub token: Option<String>,
    /// Optional allowed chat IDs (overrides config)
    pub allow_from: Option<Vec<String>>,
}

/// Strategy for running Telegram bot.
pub struct TelegramStrategy;

impl CommandStrategy for TelegramStrategy {
    type Input = TelegramInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        config.apply_token_override(input.token);

        if !config.telegram.enabled {
            anyhow::bail!("Telegram is not enabled in config. Set \"telegram.enabled\": true");
        }

        if config.telegram.token.is_empty() {
            anyhow::bail!(
                "Telegram bot token not configured. Set \"telegram.token\" in config or {TOKEN_ENV}"
            );
        }

        // Get allowed chats from input or config
        let allow_from = input
            .allow_from
            .unwrap_or_else(|| config.telegram.allow_from.clone());

        info!("Starting Telegram bot...");

        let pipeline = Arc::new(super::build_pipeline(&config).await?);
        let bot = TelegramBot::new(config.telegram.token.clone(), pipeline, &allow_from);

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}

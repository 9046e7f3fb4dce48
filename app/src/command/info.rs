use tglinks_config::Config;
use tglinks_core::LinkStore;
use tracing::info;

/// Strategy for displaying configuration information.
///
/// This strategy outputs:
/// - Telegram token (masked) and allow-list
/// - Store file locations and current sizes
/// - Existence probe settings
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        "(not set)".to_string()
    } else if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== tglinks Configuration ===\n");

        println!("Telegram:");
        println!("  Enabled: {}", config.telegram.enabled);
        println!("  Token: {}", mask_token(&config.telegram.token));
        if config.telegram.allow_from.is_empty() {
            println!("  Allowed chats: all");
        } else {
            println!(
                "  Allowed chats: {}",
                config.telegram.allow_from.join(", ")
            );
        }
        println!();

        println!("Storage:");
        println!("  User store: {}", config.storage.users_path()?.display());
        println!("  Global store: {}", config.storage.global_path()?.display());

        info!("Opening store to count channels");
        match super::open_store(&config).await {
            Ok(store) => match store.get_all_channels().await {
                Ok(channels) => println!("  Channels: {}", channels.len()),
                Err(e) => println!("  Error: {e}"),
            },
            Err(e) => {
                println!("  Status: unavailable");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Validator:");
        println!("  Probe timeout: {}ms", config.validator.probe_timeout_ms);
        println!("  Max redirects: {}", config.validator.max_redirects);
        println!("  User-Agent: {}", config.validator.user_agent);

        Ok(())
    }
}

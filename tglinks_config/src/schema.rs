use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tglinks_providers::ProbeConfig;
use tracing::info;

/// Environment variable that overrides `telegram.token`.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub validator: ProbeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "TelegramConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub token: String,
    /// Chat ids allowed to use the bot; empty means everyone.
    #[serde(default)]
    pub allow_from: Vec<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            token: String::new(),
            allow_from: Vec::new(),
        }
    }
}

impl TelegramConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Directory holding both store files; defaults to `~/tglinks/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "StorageConfig::default_user_store_file")]
    pub user_store_file: String,
    #[serde(default = "StorageConfig::default_global_store_file")]
    pub global_store_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            user_store_file: Self::default_user_store_file(),
            global_store_file: Self::default_global_store_file(),
        }
    }
}

impl StorageConfig {
    fn default_user_store_file() -> String {
        "valid_links.json".to_string()
    }

    fn default_global_store_file() -> String {
        "channels.json".to_string()
    }

    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Config::config_dir()?.join("data")),
        }
    }

    pub fn users_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.user_store_file))
    }

    pub fn global_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.global_store_file))
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "telegram": {
    "enabled": true,
    "token": "your-telegram-bot-token-here",
    "allow_from": []
  },
  "storage": {
    "user_store_file": "valid_links.json",
    "global_store_file": "channels.json"
  },
  "validator": {
    "probe_timeout_ms": 100,
    "user_agent": "Mozilla/5.0 (compatible; tglinks/1.0)",
    "max_redirects": 10
  }
}"#;

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("tglinks"))
    }

    /// Load `~/tglinks/config.json`, honouring `.env` and `TELEGRAM_BOT_TOKEN`.
    ///
    /// Without a config file the defaults are used as long as the token comes
    /// from the environment.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        let env_token = std::env::var(TOKEN_ENV).ok();

        let config_path = Self::config_dir()?.join("config.json");
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else if env_token.is_some() {
            info!("No config file, using defaults with {TOKEN_ENV}");
            Self::default()
        } else {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'tglinks init' to create config.",
                config_path.display()
            );
        };

        config.apply_token_override(env_token);
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Replace the configured token with a non-empty override.
    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.token = token;
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Put your bot token in the config (or set {TOKEN_ENV})");
        println!("   2. Run 'tglinks telegram' to start the bot");
        println!();
        println!("🔧 Configuration options:");
        println!("   - telegram.allow_from: chat ids allowed to use the bot (empty = all)");
        println!("   - storage.data_dir: where the link files live (default ~/tglinks/data)");
        println!("   - validator.probe_timeout_ms: existence check timeout");
        println!();
        Ok(())
    }
}

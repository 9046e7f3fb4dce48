//! Direct store maintenance: list, remove, clear.

use tglinks_config::Config;
use tglinks_core::{LinkStore, StoreError, normalize};

/// Input for the List command.
#[derive(Debug, Clone)]
pub struct ListInput {
    /// Show one user's links instead of the global set
    pub user: Option<String>,
}

/// Strategy for listing stored links.
#[derive(Debug, Clone, Copy)]
pub struct ListStrategy;

impl super::CommandStrategy for ListStrategy {
    type Input = ListInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        let links = match &input.user {
            Some(user) => match store.get_user_links(user).await? {
                Some(record) => {
                    println!("User {user} (@{}):", record.username);
                    record.links
                }
                None => {
                    println!("User {user} has never stored links.");
                    return Ok(());
                }
            },
            None => {
                println!("All channels:");
                store.get_all_channels().await?
            }
        };

        for (i, link) in links.iter().enumerate() {
            println!("{:>4}. {link}", i + 1);
        }
        println!("{} link(s)", links.len());
        Ok(())
    }
}

/// Input for the Remove command.
#[derive(Debug, Clone)]
pub struct RemoveInput {
    pub user: String,
    /// Link in any supported syntax
    pub link: String,
}

/// Strategy for removing one link from a user.
#[derive(Debug, Clone, Copy)]
pub struct RemoveStrategy;

impl super::CommandStrategy for RemoveStrategy {
    type Input = RemoveInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let Some(link) = normalize(input.link.trim()) else {
            anyhow::bail!("Not a Telegram link: {}", input.link);
        };

        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        match store.remove_link(&input.user, &link).await {
            Ok(true) => {
                println!("Removed {link} for user {}", input.user);
                Ok(())
            }
            Ok(false) => {
                println!("User {} does not have {link}", input.user);
                Ok(())
            }
            Err(StoreError::UnknownUser(user)) => anyhow::bail!("Unknown user: {user}"),
            Err(e) => Err(e.into()),
        }
    }
}

/// Input for the Clear command.
#[derive(Debug, Clone)]
pub struct ClearInput {
    pub user: String,
}

/// Strategy for clearing all links of a user.
#[derive(Debug, Clone, Copy)]
pub struct ClearStrategy;

impl super::CommandStrategy for ClearStrategy {
    type Input = ClearInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        store.clear_user_links(&input.user).await?;
        println!("Cleared links for user {}", input.user);
        Ok(())
    }
}

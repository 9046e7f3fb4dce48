//! Run the link pipeline from the terminal.

use tglinks_config::Config;
use tglinks_core::{Classification, ValidationResult};
use tracing::info;

/// Input parameters for the Check command strategy.
#[derive(Debug, Clone)]
pub struct CheckInput {
    /// Text to scan for links
    pub message: String,
    /// User id the valid links are stored under
    pub user: String,
    /// Display name recorded with the links
    pub username: String,
    /// Validate only, store nothing
    pub dry_run: bool,
}

fn print_result(result: &ValidationResult) {
    if result.is_valid {
        println!("  ✅ {} -> {}", result.original, result.normalized);
    } else if result.normalized.is_empty() {
        println!("  ❌ {}: {}", result.original, result.error_message);
    } else {
        println!(
            "  ❌ {} -> {}: {}",
            result.original, result.normalized, result.error_message
        );
    }
}

/// Strategy for the Check command.
#[derive(Debug, Clone, Copy)]
pub struct CheckStrategy;

impl super::CommandStrategy for CheckStrategy {
    type Input = CheckInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let pipeline = super::build_pipeline(&config).await?;

        let results = pipeline.validator().validate(&input.message).await;
        if results.is_empty() {
            println!("No links found.");
            return Ok(());
        }

        println!("Candidates:");
        for result in results.values() {
            print_result(result);
        }

        if input.dry_run {
            info!("Dry run, nothing stored");
            println!("{:?}", Classification::from_results(&results));
            return Ok(());
        }

        let classification = pipeline
            .commit(&input.user, &input.username, &results)
            .await;
        println!("{classification:?}");

        if classification == Classification::StorageError {
            anyhow::bail!("Failed to store links for user {}", input.user);
        }
        Ok(())
    }
}

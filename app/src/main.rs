#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    CheckInput, CheckStrategy, ClearInput, ClearStrategy, CommandStrategy, InfoStrategy,
    InitStrategy, ListInput, ListStrategy, RemoveInput, RemoveStrategy, TelegramInput,
    TelegramStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "tglinks")]
#[command(about = "Telegram link collector bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Run the Telegram bot
    Telegram {
        /// Bot token (overrides config and TELEGRAM_BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,

        /// Allowed chat IDs (overrides config)
        #[arg(short, long, value_delimiter = ',')]
        allow_from: Option<Vec<String>>,
    },
    /// Extract, validate and store the links in a message
    Check {
        /// Message text
        #[arg(short, long)]
        message: String,

        /// User id to store valid links under
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Display name recorded with the links
        #[arg(long, default_value = "")]
        username: String,

        /// Validate only, store nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// List stored links (all channels, or one user's)
    List {
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Remove one link from a user
    Remove {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        link: String,
    },
    /// Remove all links of a user
    Clear {
        #[arg(short, long)]
        user: String,
    },
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Telegram { token, allow_from } => {
            TelegramStrategy
                .execute(TelegramInput { token, allow_from })
                .await
        }
        Commands::Check {
            message,
            user,
            username,
            dry_run,
        } => {
            CheckStrategy
                .execute(CheckInput {
                    message,
                    user,
                    username,
                    dry_run,
                })
                .await
        }
        Commands::List { user } => ListStrategy.execute(ListInput { user }).await,
        Commands::Remove { user, link } => {
            RemoveStrategy.execute(RemoveInput { user, link }).await
        }
        Commands::Clear { user } => ClearStrategy.execute(ClearInput { user }).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

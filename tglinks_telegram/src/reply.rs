//! User-facing reply text.

use tglinks_core::Classification;

pub const WELCOME: &str = r"
Welcome to the Telegram Link Collector Bot! 🤖

I collect and validate Telegram channel and user links.
Send me any Telegram links and I'll validate and store them.

Use /help to see supported link formats.
";

pub const HELP: &str = r"
Send me Telegram links in any of these formats:

✅ Supported formats:
• https://t.me/username
• https://telegram.me/username
• t.me/username
• telegram.me/username
• @username

You can send multiple links in a single message!

Commands:
/list - show your stored links
/remove <link> - remove one link
/clear - remove all your links
";

pub const LIST_EMPTY: &str = "📭 You haven't stored any links yet.";

pub const REMOVE_USAGE: &str = "Usage: /remove <link>, e.g. /remove t.me/example";

pub const INVALID_FORMAT: &str = "❌ Invalid link format. Use /help to see supported formats.";

pub const NOTHING_STORED: &str = "📭 You have no stored links.";

pub const CLEARED: &str = "🗑 All your links have been removed.";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see what I can do.";

pub const ERROR_GENERIC: &str = "❌ Something went wrong. Please try again later.";

/// Reply for the outcome of one processed message.
#[must_use]
pub fn render(classification: Classification) -> String {
    match classification {
        Classification::NoLinksFound => {
            "❌ No Telegram links found in your message. Use /help to see supported formats."
                .to_string()
        }
        Classification::AllValid { count } => {
            format!("✅ Successfully validated and stored {count} links!")
        }
        Classification::Partial {
            total, valid: 0, ..
        } => {
            format!(
                "❌ None of the {total} links could be validated, nothing was stored. \
                 Use /help to see supported formats."
            )
        }
        Classification::Partial {
            total,
            valid,
            invalid,
        } => format!("⚠️ Processed {total} links:\n✅ Valid: {valid}\n❌ Invalid: {invalid}"),
        Classification::StorageError => {
            "❌ Your links were valid but could not be saved. Please try again later.".to_string()
        }
    }
}

/// Numbered list of a user's links.
#[must_use]
pub fn render_list<'a>(links: impl IntoIterator<Item = &'a String>) -> String {
    let lines: Vec<String> = links
        .into_iter()
        .enumerate()
        .map(|(i, link)| format!("{}. {link}", i + 1))
        .collect();

    if lines.is_empty() {
        LIST_EMPTY.to_string()
    } else {
        format!("📋 Your stored links:\n{}", lines.join("\n"))
    }
}

#[must_use]
pub fn removed(link: &str) -> String {
    format!("🗑 Removed {link}")
}

#[must_use]
pub fn not_held(link: &str) -> String {
    format!("🤷 {link} is not among your stored links. Use /list to see them.")
}

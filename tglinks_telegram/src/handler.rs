use crate::{Command, RemoveOutcome, Result, TelegramBot, reply};
use teloxide::{requests::Requester, types::Message};
use tracing::{error, info, warn};

/// Handle bot commands
pub async fn handle_command(
    bot: &TelegramBot,
    msg: &Message,
    user_id: &str,
    cmd: Command,
) -> Result<()> {
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    let text = match cmd {
        Command::Start => {
            info!("[@{username}] Command: /start");
            reply::WELCOME.to_string()
        }
        Command::Help => {
            info!("[@{username}] Command: /help");
            reply::HELP.to_string()
        }
        Command::List => {
            info!("[@{username}] Command: /list");
            reply::render_list(&bot.list_links(user_id).await?)
        }
        Command::Remove(arg) if arg.is_empty() => reply::REMOVE_USAGE.to_string(),
        Command::Remove(arg) => {
            info!("[@{username}] Command: /remove {arg}");
            match bot.remove_link(user_id, &arg).await? {
                RemoveOutcome::Removed(link) => reply::removed(&link),
                RemoveOutcome::NotHeld(link) => reply::not_held(&link),
                RemoveOutcome::InvalidFormat => reply::INVALID_FORMAT.to_string(),
                RemoveOutcome::UnknownUser => reply::NOTHING_STORED.to_string(),
            }
        }
        Command::Clear => {
            info!("[@{username}] Command: /clear");
            bot.clear_links(user_id).await?;
            reply::CLEARED.to_string()
        }
    };

    bot.bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle any message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let chat_id = msg.chat.id.0;
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0.to_string();
    let username = user.username.clone().unwrap_or_default();

    if !bot.is_allowed(chat_id) {
        warn!("Ignoring message from unauthorized chat {chat_id}");
        return Ok(());
    }

    // Check if this is a command
    if let Some(cmd) = Command::parse_from_text(text) {
        if let Err(e) = handle_command(&bot, &msg, &user_id, cmd).await {
            error!("Command failed for user {user_id}: {e}");
            bot.bot.send_message(msg.chat.id, reply::ERROR_GENERIC).await?;
        }
        return Ok(());
    }
    if text.starts_with('/') {
        bot.bot
            .send_message(msg.chat.id, reply::UNKNOWN_COMMAND)
            .await?;
        return Ok(());
    }

    info!("[@{username}] Message received from user {user_id}");

    // Show typing indicator while links are probed
    if let Err(e) = bot
        .bot
        .send_chat_action(msg.chat.id, teloxide::types::ChatAction::Typing)
        .await
    {
        warn!("Failed to send typing indicator: {e}");
    }

    let classification = bot
        .process_message(chat_id, &user_id, &username, text)
        .await?;

    info!("[@{username}] Outcome: {classification:?}");

    bot.bot
        .send_message(msg.chat.id, reply::render(classification))
        .await?;

    Ok(())
}

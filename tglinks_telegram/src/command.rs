use teloxide::types::BotCommand;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    List,
    /// Argument as typed; may be empty.
    Remove(String),
    Clear,
}

impl Command {
    fn all() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", "Start using the bot"),
            BotCommand::new("help", "Show supported link formats"),
            BotCommand::new("list", "List your stored links"),
            BotCommand::new("remove", "Remove one of your links"),
            BotCommand::new("clear", "Remove all of your links"),
        ]
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    /// Parse a slash command; `None` for plain text and unknown commands.
    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (head, args) = text
            .split_once(char::is_whitespace)
            .map_or((text, ""), |(h, a)| (h, a.trim()));

        // Remove bot mention if present (e.g., "/list@my_bot")
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/list" => Some(Self::List),
            "/remove" => Some(Self::Remove(args.to_string())),
            "/clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

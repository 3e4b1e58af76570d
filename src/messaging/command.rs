// Chat commands - Text typed by the local player
// ":dance<N>" selects dance N (default "1"); anything else is ignored

use crate::dance::DanceId;

const DANCE_PREFIX: &str = ":dance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Dance(DanceId),
}

/// Parse a chat message; None for anything that is not a recognised command
pub fn parse_chat_command(message: &str) -> Option<ChatCommand> {
    let rest = message.trim().strip_prefix(DANCE_PREFIX)?;
    let rest = rest.trim();

    if rest.is_empty() {
        return Some(ChatCommand::Dance(DanceId::new("1")));
    }
    if rest.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ChatCommand::Dance(DanceId::new(rest)))
    } else {
        None
    }
}

// Messaging - Chat commands and cross-client dance selection broadcast

pub mod channels;
pub mod command;
pub mod relay;

pub use channels::{SelectionConsumer, SelectionProducer, create_selection_channel};
pub use command::{ChatCommand, parse_chat_command};
pub use relay::{DanceRelay, DanceSelection};

//! This module aggregates all the command modules for the bot.

use crate::{Data, Error};

/// General purpose commands (help).
pub mod help;
/// Commands related to music playback.
pub mod music;

/// Every command the bot registers with the framework
pub fn all_commands() -> Vec<poise::Command<Data, Error>> {
    vec![help::help(), music::play::play(), music::queue::queue()]
}

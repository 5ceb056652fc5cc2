//! # Wildywatch Channels
//! Discord delivery transport and gateway command stream.

pub mod discord;

pub use discord::{CommandStream, DiscordChannel, DiscordConfig};

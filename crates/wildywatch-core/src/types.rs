//! Shared data types for the notifier.

use serde::{Deserialize, Serialize};

/// Sentinel rendered wherever the feed omits or mangles a value.
pub const UNKNOWN: &str = "Unknown";

/// One subscription per guild: which channel to post into and whether
/// posting is currently enabled. Entries are never deleted, only disabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub channel_id: String,
    pub enabled: bool,
}

impl Subscription {
    pub fn enabled(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            enabled: true,
        }
    }
}

/// Normalized result of one feed fetch. Valid only for the fetch that
/// produced it — never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSnapshot {
    pub current: String,
    pub next: String,
    /// Raw ISO-8601 instant of the next event, if the feed supplied one.
    pub next_time: Option<String>,
}

/// A rendered notification, built once per snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub current: String,
    pub next: String,
    pub footer: String,
}

/// Slash commands the bot understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Enable,
    Stop,
    Notify,
}

impl CommandKind {
    /// Wire name of the slash command.
    pub fn wire_name(&self) -> &'static str {
        match self {
            CommandKind::Enable => "wildy_enable",
            CommandKind::Stop => "wildy_stop",
            CommandKind::Notify => "wildy_notify",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "wildy_enable" => Some(CommandKind::Enable),
            "wildy_stop" => Some(CommandKind::Stop),
            "wildy_notify" => Some(CommandKind::Notify),
            _ => None,
        }
    }
}

/// A slash-command invocation as delivered by the gateway, with the context
/// needed to reply and to scope the action to the invoking guild/channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub command: CommandKind,
    pub interaction_id: String,
    pub interaction_token: String,
    /// Absent for DM invocations, which the handlers reject politely.
    pub guild_id: Option<String>,
    pub channel_id: String,
}

/// Aggregated outcome of one fan-out pass. Failures are keyed by guild id;
/// recording them here is what gets logged, never a swallowed exception.
#[derive(Debug, Clone, Default)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failures: Vec<(String, String)>,
}

impl BroadcastReport {
    pub fn record_delivery(&mut self) {
        self.delivered += 1;
    }

    pub fn record_failure(&mut self, guild_id: impl Into<String>, reason: impl Into<String>) {
        self.failures.push((guild_id.into(), reason.into()));
    }

    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

//! Discord channel — REST API + Gateway WebSocket.
//!
//! REST delivers embeds and interaction replies; the Gateway connection
//! receives slash-command invocations and signals session readiness.

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::watch;

use wildywatch_core::error::{Result, WildywatchError};
use wildywatch_core::traits::NotifyTransport;
use wildywatch_core::types::{CommandInvocation, CommandKind, Notification};

const API_BASE: &str = "https://discord.com/api/v10";

/// Accent color of the notification embed.
const EMBED_COLOR: u32 = 0xFF6600;

/// Discord channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Gateway intents bitmask. Slash commands arrive without privileged
    /// intents; GUILDS is enough.
    #[serde(default = "default_intents")]
    pub intents: u64,
}

fn default_intents() -> u64 {
    1 << 0 // GUILDS
}

impl DiscordConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            intents: default_intents(),
        }
    }
}

/// Discord Bot channel.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> Self {
        let client = reqwest::Client::builder()
            .default_headers({
                let mut h = reqwest::header::HeaderMap::new();
                h.insert("Authorization", format!("Bot {}", config.bot_token).parse().unwrap());
                h.insert("User-Agent", "Wildywatch/0.1".parse().unwrap());
                h
            })
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Get current bot info.
    pub async fn get_me(&self) -> Result<DiscordUser> {
        let response = self
            .client
            .get(format!("{API_BASE}/users/@me"))
            .send()
            .await
            .map_err(|e| WildywatchError::channel(format!("getMe failed: {e}")))?;
        response
            .json()
            .await
            .map_err(|e| WildywatchError::channel(format!("Invalid response: {e}")))
    }

    /// Bulk-overwrite the application's global slash commands with the three
    /// commands the bot understands. Returns how many were registered.
    pub async fn register_commands(&self, application_id: &str) -> Result<usize> {
        let url = format!("{API_BASE}/applications/{application_id}/commands");
        let body = command_definitions();

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WildywatchError::channel(format!("Command sync failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WildywatchError::channel(format!(
                "Command sync {status}: {text}"
            )));
        }

        let synced: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WildywatchError::channel(format!("Invalid sync response: {e}")))?;
        Ok(synced.as_array().map(|a| a.len()).unwrap_or(0))
    }

    /// Acknowledge an interaction with a plain text reply.
    pub async fn reply_text(
        &self,
        inv: &CommandInvocation,
        content: &str,
        ephemeral: bool,
    ) -> Result<()> {
        let mut data = serde_json::json!({ "content": content });
        if ephemeral {
            data["flags"] = serde_json::json!(1 << 6);
        }
        self.interaction_callback(inv, data).await
    }

    /// Acknowledge an interaction with the rendered notification embed.
    pub async fn reply_notification(
        &self,
        inv: &CommandInvocation,
        note: &Notification,
    ) -> Result<()> {
        let data = serde_json::json!({ "embeds": [embed_json(note)] });
        self.interaction_callback(inv, data).await
    }

    async fn interaction_callback(
        &self,
        inv: &CommandInvocation,
        data: serde_json::Value,
    ) -> Result<()> {
        let url = format!(
            "{API_BASE}/interactions/{}/{}/callback",
            inv.interaction_id, inv.interaction_token
        );
        // Type 4: channel message with source.
        let body = serde_json::json!({ "type": 4, "data": data });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WildywatchError::channel(format!("Interaction reply failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WildywatchError::channel(format!("Interaction {status}: {text}")));
        }
        Ok(())
    }

    /// Get Gateway WebSocket URL.
    async fn get_gateway_url(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{API_BASE}/gateway/bot"))
            .send()
            .await
            .map_err(|e| WildywatchError::channel(format!("Gateway request failed: {e}")))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WildywatchError::channel(format!("Invalid gateway response: {e}")))?;

        body["url"]
            .as_str()
            .map(|s| format!("{s}/?v=10&encoding=json"))
            .ok_or_else(|| WildywatchError::channel("No gateway URL"))
    }

    /// Start the Gateway connection — returns a stream of slash-command
    /// invocations. Flips `ready` true on the READY event so the scheduler
    /// can arm. Auto-reconnects on disconnect with exponential backoff.
    pub fn start_gateway(self: Arc<Self>, ready: watch::Sender<bool>) -> CommandStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let channel = self;

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 5;

            loop {
                tracing::info!("Discord Gateway connecting...");

                let gateway_url = match channel.get_gateway_url().await {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::error!("Failed to get gateway URL: {e}, retrying in {backoff_secs}s...");
                        tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let ws_result = tokio_tungstenite::connect_async(&gateway_url).await;
                let (mut ws, _) = match ws_result {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!("Gateway WebSocket failed: {e}, retrying in {backoff_secs}s...");
                        tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                backoff_secs = 5;
                tracing::info!("Discord Gateway connected");

                use futures::{SinkExt, StreamExt};
                use tokio_tungstenite::tungstenite::Message as WsMsg;

                let mut heartbeat_interval_ms: u64 = 41250;
                let mut seq: Option<u64> = None;
                let mut identified = false;

                loop {
                    tokio::select! {
                        msg = ws.next() => {
                            match msg {
                                Some(Ok(WsMsg::Text(text))) => {
                                    let payload: serde_json::Value = match serde_json::from_str(&text) {
                                        Ok(v) => v,
                                        Err(_) => continue,
                                    };

                                    let op = payload["op"].as_u64().unwrap_or(0);
                                    if let Some(s) = payload["s"].as_u64() {
                                        seq = Some(s);
                                    }

                                    match op {
                                        10 => {
                                            heartbeat_interval_ms = payload["d"]["heartbeat_interval"]
                                                .as_u64().unwrap_or(41250);
                                            tracing::debug!("Gateway Hello: heartbeat={}ms", heartbeat_interval_ms);

                                            if !identified {
                                                let identify = serde_json::json!({
                                                    "op": 2,
                                                    "d": {
                                                        "token": channel.config.bot_token,
                                                        "intents": channel.config.intents,
                                                        "properties": {
                                                            "os": std::env::consts::OS,
                                                            "browser": "wildywatch",
                                                            "device": "wildywatch"
                                                        }
                                                    }
                                                });
                                                let _ = ws.send(WsMsg::Text(identify.to_string())).await;
                                                identified = true;
                                            }
                                        }
                                        11 => { tracing::trace!("Heartbeat ACK"); }
                                        0 => {
                                            let event_name = payload["t"].as_str().unwrap_or("");
                                            match event_name {
                                                "READY" => {
                                                    let user = payload["d"]["user"]["username"]
                                                        .as_str().unwrap_or("unknown");
                                                    tracing::info!("Discord Gateway READY as {user}");
                                                    let _ = ready.send(true);
                                                }
                                                "INTERACTION_CREATE" => {
                                                    if let Some(inv) = parse_interaction(&payload["d"]) {
                                                        if tx.send(inv).is_err() {
                                                            tracing::info!("Command stream closed (receiver dropped)");
                                                            return;
                                                        }
                                                    }
                                                }
                                                _ => { tracing::trace!("Ignoring event: {event_name}"); }
                                            }
                                        }
                                        7 => {
                                            tracing::warn!("Gateway requesting reconnect");
                                            break;
                                        }
                                        9 => {
                                            tracing::warn!("Invalid session, re-identifying");
                                            identified = false;
                                        }
                                        _ => {}
                                    }
                                }
                                Some(Ok(WsMsg::Close(_))) => {
                                    tracing::warn!("Discord Gateway closed by server");
                                    break;
                                }
                                Some(Err(e)) => {
                                    tracing::error!("Gateway error: {e}");
                                    break;
                                }
                                None => break,
                                _ => {}
                            }
                        }
                        _ = tokio::time::sleep(tokio::time::Duration::from_millis(heartbeat_interval_ms)) => {
                            let heartbeat = serde_json::json!({
                                "op": 1,
                                "d": seq,
                            });
                            if ws.send(WsMsg::Text(heartbeat.to_string())).await.is_err() {
                                tracing::error!("Heartbeat send failed");
                                break;
                            }
                            tracing::trace!("Heartbeat sent (seq={:?})", seq);
                        }
                    }
                }

                tracing::info!("Discord Gateway disconnected, reconnecting in {backoff_secs}s...");
                tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            }
        });

        CommandStream { rx }
    }
}

#[async_trait]
impl NotifyTransport for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn resolve_channel(&self, channel_id: &str) -> Result<()> {
        let url = format!("{API_BASE}/channels/{channel_id}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WildywatchError::channel(format!("Channel lookup failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WildywatchError::channel(format!(
                "Channel {channel_id} not resolvable ({})",
                response.status()
            )));
        }
        Ok(())
    }

    async fn send_notification(&self, channel_id: &str, note: &Notification) -> Result<()> {
        let url = format!("{API_BASE}/channels/{channel_id}/messages");
        let body = serde_json::json!({ "embeds": [embed_json(note)] });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WildywatchError::channel(format!("Discord send failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WildywatchError::channel(format!("Discord {status}: {text}")));
        }
        Ok(())
    }
}

/// Wire shape of the notification embed.
fn embed_json(note: &Notification) -> serde_json::Value {
    serde_json::json!({
        "title": note.title,
        "color": EMBED_COLOR,
        "fields": [
            { "name": "Current", "value": note.current, "inline": false },
            { "name": "Next", "value": note.next, "inline": false },
        ],
        "footer": { "text": note.footer },
    })
}

/// Normalize an INTERACTION_CREATE payload into a command invocation.
/// Unknown commands and non-command interactions yield None.
fn parse_interaction(d: &serde_json::Value) -> Option<CommandInvocation> {
    // Type 2: APPLICATION_COMMAND.
    if d["type"].as_u64() != Some(2) {
        return None;
    }
    let command = CommandKind::from_wire_name(d["data"]["name"].as_str()?)?;

    Some(CommandInvocation {
        command,
        interaction_id: d["id"].as_str()?.to_string(),
        interaction_token: d["token"].as_str()?.to_string(),
        guild_id: d["guild_id"].as_str().map(String::from),
        channel_id: d["channel_id"].as_str()?.to_string(),
    })
}

/// Definitions for the bulk command-sync request.
fn command_definitions() -> serde_json::Value {
    serde_json::json!([
        {
            "name": CommandKind::Enable.wire_name(),
            "description": "Enable Wildy event notifications in this channel",
            "type": 1,
        },
        {
            "name": CommandKind::Stop.wire_name(),
            "description": "Stop Wildy event notifications for this server",
            "type": 1,
        },
        {
            "name": CommandKind::Notify.wire_name(),
            "description": "Send an immediate Wildy event update",
            "type": 1,
        },
    ])
}

/// Stream of incoming slash-command invocations from the Gateway.
pub struct CommandStream {
    rx: tokio::sync::mpsc::UnboundedReceiver<CommandInvocation>,
}

impl Stream for CommandStream {
    type Item = CommandInvocation;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Unpin for CommandStream {}

// --- Discord API Types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    pub discriminator: Option<String>,
    pub bot: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_shape() {
        let note = Notification {
            title: "🌋 Wilderness Flash Events".into(),
            current: "Infernal Star".into(),
            next: "Ramokee Incursion — 10:00 UTC".into(),
            footer: "Data: wilderness.spegal.dev | Auto update at :55 UTC".into(),
        };
        let embed = embed_json(&note);
        assert_eq!(embed["title"], "🌋 Wilderness Flash Events");
        assert_eq!(embed["color"], 0xFF6600);
        assert_eq!(embed["fields"][0]["name"], "Current");
        assert_eq!(embed["fields"][1]["value"], "Ramokee Incursion — 10:00 UTC");
        assert_eq!(embed["footer"]["text"], note.footer);
    }

    #[test]
    fn test_parse_interaction_command() {
        let d = serde_json::json!({
            "type": 2,
            "id": "123",
            "token": "tok",
            "guild_id": "g1",
            "channel_id": "c1",
            "data": { "name": "wildy_enable" },
        });
        let inv = parse_interaction(&d).unwrap();
        assert_eq!(inv.command, CommandKind::Enable);
        assert_eq!(inv.interaction_id, "123");
        assert_eq!(inv.guild_id.as_deref(), Some("g1"));
        assert_eq!(inv.channel_id, "c1");
    }

    #[test]
    fn test_parse_interaction_ignores_unknown_commands() {
        let d = serde_json::json!({
            "type": 2,
            "id": "123",
            "token": "tok",
            "channel_id": "c1",
            "data": { "name": "somebody_elses_command" },
        });
        assert!(parse_interaction(&d).is_none());
    }

    #[test]
    fn test_parse_interaction_ignores_non_command_types() {
        // Type 1 is a PING.
        let d = serde_json::json!({
            "type": 1,
            "id": "123",
            "token": "tok",
            "channel_id": "c1",
            "data": { "name": "wildy_enable" },
        });
        assert!(parse_interaction(&d).is_none());
    }

    #[test]
    fn test_command_definitions_cover_all_commands() {
        let defs = command_definitions();
        let names: Vec<&str> = defs
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["name"].as_str())
            .collect();
        assert_eq!(names, ["wildy_enable", "wildy_stop", "wildy_notify"]);
    }

    #[test]
    fn test_dm_invocation_has_no_guild() {
        let d = serde_json::json!({
            "type": 2,
            "id": "9",
            "token": "tok",
            "channel_id": "dm-chan",
            "data": { "name": "wildy_notify" },
        });
        let inv = parse_interaction(&d).unwrap();
        assert!(inv.guild_id.is_none());
    }
}

//! Slash-command handlers — thin entry points over the store and feed.
//!
//! Every path produces an explicit acknowledgment; a failure is a visible
//! notice to the invoker, never silence.

use std::sync::Arc;

use wildywatch_core::traits::EventFeed;
use wildywatch_core::types::{CommandInvocation, CommandKind, Notification};
use wildywatch_scheduler::format;
use wildywatch_store::SubscriptionStore;

/// Collaborators the handlers need.
pub struct CommandContext {
    pub store: Arc<SubscriptionStore>,
    pub feed: Arc<dyn EventFeed>,
}

/// What to send back to the invoking destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// Plain text, visible only to the invoker.
    Ephemeral(String),
    /// The rendered update, posted publicly to the invoking channel.
    Update(Notification),
}

pub async fn handle(inv: &CommandInvocation, ctx: &CommandContext) -> CommandReply {
    match inv.command {
        CommandKind::Enable => enable(inv, ctx).await,
        CommandKind::Stop => stop(inv, ctx).await,
        CommandKind::Notify => notify(ctx).await,
    }
}

async fn enable(inv: &CommandInvocation, ctx: &CommandContext) -> CommandReply {
    let Some(guild_id) = inv.guild_id.as_deref() else {
        return CommandReply::Ephemeral("⚠️ This command only works in a server.".into());
    };

    match ctx.store.set_enabled(guild_id, &inv.channel_id, true).await {
        Ok(()) => CommandReply::Ephemeral("✅ Notifications enabled in this channel.".into()),
        Err(e) => {
            tracing::error!("Failed to persist subscription for guild {guild_id}: {e}");
            CommandReply::Ephemeral("⚠️ Could not save the subscription, try again.".into())
        }
    }
}

async fn stop(inv: &CommandInvocation, ctx: &CommandContext) -> CommandReply {
    let Some(guild_id) = inv.guild_id.as_deref() else {
        return CommandReply::Ephemeral("⚠️ This command only works in a server.".into());
    };

    match ctx.store.disable(guild_id).await {
        // Acknowledged the same way whether or not a subscription existed.
        Ok(_) => CommandReply::Ephemeral("🛑 Notifications disabled.".into()),
        Err(e) => {
            tracing::error!("Failed to persist disable for guild {guild_id}: {e}");
            CommandReply::Ephemeral("⚠️ Could not save the change, try again.".into())
        }
    }
}

async fn notify(ctx: &CommandContext) -> CommandReply {
    match ctx.feed.fetch().await {
        Ok(snapshot) => CommandReply::Update(format::render(&snapshot)),
        Err(e) => {
            tracing::warn!("On-demand fetch failed: {e}");
            CommandReply::Ephemeral("⚠️ Could not fetch event data.".into())
        }
    }
}

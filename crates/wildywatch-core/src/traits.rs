//! Trait seams between the engine and its collaborators.
//!
//! The scheduler, dispatcher, and command handlers only see these traits, so
//! they can be exercised with stubs instead of a live Discord session or
//! feed endpoint.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EventSnapshot, Notification};

/// Source of the current/next flash-event state.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Fetch a fresh snapshot. Returns a feed error for non-success status,
    /// undecodable body, or transport failure — never a partial snapshot.
    async fn fetch(&self) -> Result<EventSnapshot>;
}

/// Delivery transport for rendered notifications.
#[async_trait]
pub trait NotifyTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Check that the destination still resolves to a sendable target.
    async fn resolve_channel(&self, channel_id: &str) -> Result<()>;

    /// Deliver a notification to a single destination channel.
    async fn send_notification(&self, channel_id: &str, note: &Notification) -> Result<()>;
}

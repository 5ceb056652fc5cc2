//! # Wildywatch Core
//! Shared types, traits, errors, and configuration for the Wildywatch
//! flash-event notifier.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::WildywatchConfig;
pub use error::{Result, WildywatchError};
pub use types::{
    BroadcastReport, CommandInvocation, CommandKind, EventSnapshot, Notification, Subscription,
};

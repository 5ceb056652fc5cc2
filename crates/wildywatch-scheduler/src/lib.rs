//! # Wildywatch Scheduler
//!
//! The hourly broadcast engine: a one-minute tick that fires the fan-out
//! exactly once per hour at the configured minute offset.
//!
//! ```text
//! SchedulerEngine (tokio interval, 60s)
//!   └── minute == :55 and not already fired this slot
//!         → EventFeed::fetch
//!         → format::render
//!         → broadcast::send_all over enabled subscriptions
//! ```
//!
//! Fetch and per-destination failures are logged and the cycle moves on; the
//! next slot retries naturally an hour later.

pub mod broadcast;
pub mod engine;
pub mod format;

pub use broadcast::send_all;
pub use engine::{ScheduleGate, SchedulerEngine};
pub use format::render;

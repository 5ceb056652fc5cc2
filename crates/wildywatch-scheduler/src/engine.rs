//! Minute-tick engine gating the hourly broadcast.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tokio::sync::watch;
use tokio::time::interval;

use wildywatch_core::traits::{EventFeed, NotifyTransport};
use wildywatch_store::SubscriptionStore;

use crate::{broadcast, format};

/// Decides whether a tick should fire. Ticks once a minute; fires only when
/// the UTC minute-of-hour matches the target, and at most once per
/// date+hour slot even if the tick lands in the same minute twice.
#[derive(Debug)]
pub struct ScheduleGate {
    target_minute: u32,
    last_fired: Option<(NaiveDate, u32)>,
}

impl ScheduleGate {
    pub fn new(target_minute: u32) -> Self {
        Self {
            target_minute,
            last_fired: None,
        }
    }

    pub fn due(&mut self, now: DateTime<Utc>) -> bool {
        if now.minute() != self.target_minute {
            return false;
        }
        let slot = (now.date_naive(), now.hour());
        if self.last_fired == Some(slot) {
            return false;
        }
        self.last_fired = Some(slot);
        true
    }
}

/// The scheduled broadcast pipeline: tick → gate → fetch → render → fan-out.
pub struct SchedulerEngine {
    feed: Arc<dyn EventFeed>,
    transport: Arc<dyn NotifyTransport>,
    store: Arc<SubscriptionStore>,
    gate: ScheduleGate,
}

impl SchedulerEngine {
    pub fn new(
        feed: Arc<dyn EventFeed>,
        transport: Arc<dyn NotifyTransport>,
        store: Arc<SubscriptionStore>,
        target_minute: u32,
    ) -> Self {
        Self {
            feed,
            transport,
            store,
            gate: ScheduleGate::new(target_minute),
        }
    }

    /// Run the tick loop on a background task. Ticking does not start until
    /// the readiness signal flips true (the gateway session is up), so the
    /// first broadcast never races the connection.
    pub fn spawn(mut self, ready: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ready = ready;
            while !*ready.borrow() {
                if ready.changed().await.is_err() {
                    tracing::info!("Readiness channel closed before startup; scheduler exiting");
                    return;
                }
            }
            tracing::info!("Scheduler armed — broadcasting at minute :{:02} UTC",
                self.gate.target_minute);

            let mut tick = interval(Duration::from_secs(60));
            loop {
                tick.tick().await;
                if self.gate.due(Utc::now()) {
                    self.broadcast_cycle().await;
                }
            }
        })
    }

    /// One broadcast attempt: any failure logs and skips the cycle; the
    /// next hour retries naturally.
    async fn broadcast_cycle(&self) {
        let snapshot = match self.feed.fetch().await {
            Ok(snap) => snap,
            Err(e) => {
                tracing::warn!("Skipping broadcast cycle, feed fetch failed: {e}");
                return;
            }
        };

        let note = format::render(&snapshot);
        let entries = self.store.enabled_entries().await;
        if entries.is_empty() {
            tracing::debug!("No enabled subscriptions, nothing to broadcast");
            return;
        }

        let report = broadcast::send_all(self.transport.as_ref(), &note, &entries).await;
        tracing::info!(
            "Broadcast cycle done: {} delivered, {} failed",
            report.delivered,
            report.failures.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_not_due_on_other_minutes() {
        let mut gate = ScheduleGate::new(55);
        for minute in 0..60 {
            if minute == 55 {
                continue;
            }
            assert!(!gate.due(at(12, minute)), "minute {minute} should not fire");
        }
    }

    #[test]
    fn test_fires_once_per_slot_even_when_reentered() {
        let mut gate = ScheduleGate::new(55);
        assert!(gate.due(at(12, 55)));
        // Re-entry within the same minute (tick jitter) is a no-op.
        assert!(!gate.due(at(12, 55)));
        assert!(!gate.due(at(12, 55)));
    }

    #[test]
    fn test_fires_again_next_hour() {
        let mut gate = ScheduleGate::new(55);
        assert!(gate.due(at(12, 55)));
        assert!(gate.due(at(13, 55)));
    }

    #[test]
    fn test_fires_at_same_hour_on_next_day() {
        let mut gate = ScheduleGate::new(55);
        assert!(gate.due(Utc.with_ymd_and_hms(2024, 1, 1, 12, 55, 0).unwrap()));
        assert!(gate.due(Utc.with_ymd_and_hms(2024, 1, 2, 12, 55, 0).unwrap()));
    }

    #[test]
    fn test_custom_target_minute() {
        let mut gate = ScheduleGate::new(0);
        assert!(!gate.due(at(9, 55)));
        assert!(gate.due(at(9, 0)));
    }
}

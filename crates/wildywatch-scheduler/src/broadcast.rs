//! Fan-out dispatcher — one notification to every enabled destination.

use wildywatch_core::traits::NotifyTransport;
use wildywatch_core::types::{BroadcastReport, Notification, Subscription};

/// Send `note` to every entry. Each destination is resolved and sent
/// independently; a failure is recorded against its guild id and the loop
/// continues, so one dead channel never blocks the rest. No retries here —
/// a failed destination is simply tried again next cycle.
pub async fn send_all(
    transport: &dyn NotifyTransport,
    note: &Notification,
    entries: &[(String, Subscription)],
) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for (guild_id, sub) in entries {
        if !sub.enabled {
            continue;
        }

        let outcome = match transport.resolve_channel(&sub.channel_id).await {
            Ok(()) => transport.send_notification(&sub.channel_id, note).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => report.record_delivery(),
            Err(e) => {
                tracing::warn!("Failed to send to guild {guild_id}: {e}");
                report.record_failure(guild_id, e.to_string());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wildywatch_core::error::{Result, WildywatchError};

    /// Transport stub that refuses configured channel ids and records the
    /// rest.
    struct StubTransport {
        dead_channels: Vec<String>,
        sent: Mutex<Vec<String>>,
    }

    impl StubTransport {
        fn new(dead_channels: &[&str]) -> Self {
            Self {
                dead_channels: dead_channels.iter().map(|s| s.to_string()).collect(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotifyTransport for StubTransport {
        fn name(&self) -> &str {
            "stub"
        }

        async fn resolve_channel(&self, channel_id: &str) -> Result<()> {
            if self.dead_channels.contains(&channel_id.to_string()) {
                return Err(WildywatchError::channel(format!("unknown channel {channel_id}")));
            }
            Ok(())
        }

        async fn send_notification(&self, channel_id: &str, _note: &Notification) -> Result<()> {
            self.sent.lock().unwrap().push(channel_id.to_string());
            Ok(())
        }
    }

    fn note() -> Notification {
        Notification {
            title: "t".into(),
            current: "c".into(),
            next: "n".into(),
            footer: "f".into(),
        }
    }

    fn entry(guild: &str, channel: &str, enabled: bool) -> (String, Subscription) {
        (
            guild.into(),
            Subscription {
                channel_id: channel.into(),
                enabled,
            },
        )
    }

    #[tokio::test]
    async fn test_one_failure_never_blocks_the_rest() {
        let transport = StubTransport::new(&["dead"]);
        let entries = vec![
            entry("g1", "c1", true),
            entry("g2", "dead", true),
            entry("g3", "c3", true),
        ];

        let report = send_all(&transport, &note(), &entries).await;

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "g2");
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), ["c1", "c3"]);
    }

    #[tokio::test]
    async fn test_disabled_entries_are_skipped() {
        let transport = StubTransport::new(&[]);
        let entries = vec![entry("g1", "c1", false), entry("g2", "c2", true)];

        let report = send_all(&transport, &note(), &entries).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.attempted(), 1);
        assert_eq!(transport.sent.lock().unwrap().as_slice(), ["c2"]);
    }

    #[tokio::test]
    async fn test_empty_fanout_reports_nothing() {
        let transport = StubTransport::new(&[]);
        let report = send_all(&transport, &note(), &[]).await;
        assert_eq!(report.attempted(), 0);
    }
}

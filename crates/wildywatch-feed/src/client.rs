//! Feed client — fetches and normalizes the current/next-event payload.

use async_trait::async_trait;

use wildywatch_core::config::{FeedConfig, FeedFields};
use wildywatch_core::error::{Result, WildywatchError};
use wildywatch_core::traits::EventFeed;
use wildywatch_core::types::{EventSnapshot, UNKNOWN};

/// Client for the remote event feed. Every fetch is fresh; nothing is
/// cached between calls.
pub struct FeedClient {
    url: String,
    fields: FeedFields,
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WildywatchError::FeedTransport(format!("client build: {e}")))?;

        Ok(Self {
            url: config.url.clone(),
            fields: config.fields.clone(),
            client,
        })
    }
}

#[async_trait]
impl EventFeed for FeedClient {
    async fn fetch(&self) -> Result<EventSnapshot> {
        // Timeouts surface through reqwest as transport errors.
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| WildywatchError::FeedTransport(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WildywatchError::FeedStatus(status.as_u16()));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WildywatchError::FeedDecode(e.to_string()))?;

        let snapshot = snapshot_from_value(&payload, &self.fields);
        tracing::debug!("Feed snapshot: current={}, next={}", snapshot.current, snapshot.next);
        Ok(snapshot)
    }
}

/// Normalize a feed payload into a snapshot. Missing or non-string labels
/// fall back to the Unknown sentinel; a missing timestamp stays None and is
/// rendered as Unknown downstream.
pub fn snapshot_from_value(payload: &serde_json::Value, fields: &FeedFields) -> EventSnapshot {
    let label = |key: &str| {
        payload[key]
            .as_str()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    EventSnapshot {
        current: label(&fields.current),
        next: label(&fields.next),
        next_time: payload[&fields.next_time]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_full_payload() {
        let payload = serde_json::json!({
            "current_event": "Infernal Star",
            "next_event": "Evil Bloodwood Tree",
            "next_event_time": "2024-01-01T10:00:00Z",
        });
        let snap = snapshot_from_value(&payload, &FeedFields::default());
        assert_eq!(snap.current, "Infernal Star");
        assert_eq!(snap.next, "Evil Bloodwood Tree");
        assert_eq!(snap.next_time.as_deref(), Some("2024-01-01T10:00:00Z"));
    }

    #[test]
    fn test_missing_labels_become_unknown() {
        let payload = serde_json::json!({ "next_event": "Ramokee Incursion" });
        let snap = snapshot_from_value(&payload, &FeedFields::default());
        assert_eq!(snap.current, "Unknown");
        assert_eq!(snap.next, "Ramokee Incursion");
        assert_eq!(snap.next_time, None);
    }

    #[test]
    fn test_empty_strings_become_unknown() {
        let payload = serde_json::json!({
            "current_event": "",
            "next_event_time": "",
        });
        let snap = snapshot_from_value(&payload, &FeedFields::default());
        assert_eq!(snap.current, "Unknown");
        assert_eq!(snap.next_time, None);
    }

    #[test]
    fn test_alternate_field_map() {
        // Some feed deployments use short key names.
        let fields = FeedFields {
            current: "current".into(),
            next: "next".into(),
            next_time: "next_time".into(),
        };
        let payload = serde_json::json!({
            "current": "King Black Dragon Rampage",
            "next": "Surprising Seedlings",
            "next_time": "2024-06-01T17:00:00Z",
        });
        let snap = snapshot_from_value(&payload, &fields);
        assert_eq!(snap.current, "King Black Dragon Rampage");
        assert_eq!(snap.next, "Surprising Seedlings");
        assert!(snap.next_time.is_some());
    }

    #[test]
    fn test_non_string_values_become_unknown() {
        let payload = serde_json::json!({
            "current_event": 7,
            "next_event": null,
            "next_event_time": {"nested": true},
        });
        let snap = snapshot_from_value(&payload, &FeedFields::default());
        assert_eq!(snap.current, "Unknown");
        assert_eq!(snap.next, "Unknown");
        assert_eq!(snap.next_time, None);
    }
}

//! Notification rendering — pure, no I/O.

use chrono::DateTime;

use wildywatch_core::types::{EventSnapshot, Notification, UNKNOWN};

const TITLE: &str = "🌋 Wilderness Flash Events";
const FOOTER: &str = "Data: wilderness.spegal.dev | Auto update at :55 UTC";

/// Build the notification for one snapshot.
pub fn render(snapshot: &EventSnapshot) -> Notification {
    let time = snapshot
        .next_time
        .as_deref()
        .and_then(format_event_time)
        .unwrap_or_else(|| UNKNOWN.to_string());

    Notification {
        title: TITLE.to_string(),
        current: snapshot.current.clone(),
        next: format!("{} — {}", snapshot.next, time),
        footer: FOOTER.to_string(),
    }
}

/// Parse an ISO-8601 instant and format it as `HH:MM UTC`. A trailing `Z`
/// is normalized to an explicit `+00:00` offset first. Any parse failure
/// yields None, rendered as Unknown by the caller.
fn format_event_time(raw: &str) -> Option<String> {
    let normalized = raw.replace('Z', "+00:00");
    let parsed = DateTime::parse_from_rfc3339(&normalized).ok()?;
    Some(parsed.format("%H:%M UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(current: &str, next: &str, next_time: Option<&str>) -> EventSnapshot {
        EventSnapshot {
            current: current.into(),
            next: next.into(),
            next_time: next_time.map(String::from),
        }
    }

    #[test]
    fn test_render_with_utc_timestamp() {
        let snap = snapshot("Infernal Star", "Ramokee Incursion", Some("2024-01-01T10:00:00Z"));
        let note = render(&snap);
        assert_eq!(note.current, "Infernal Star");
        assert_eq!(note.next, "Ramokee Incursion — 10:00 UTC");
        assert_eq!(note.title, "🌋 Wilderness Flash Events");
        assert!(note.footer.contains(":55 UTC"));
    }

    #[test]
    fn test_render_missing_timestamp() {
        let note = render(&snapshot("A", "B", None));
        assert_eq!(note.next, "B — Unknown");
    }

    #[test]
    fn test_render_malformed_timestamp() {
        let note = render(&snapshot("A", "B", Some("soon-ish")));
        assert_eq!(note.next, "B — Unknown");
    }

    #[test]
    fn test_render_missing_current_keeps_next_intact() {
        let snap = snapshot("Unknown", "Evil Bloodwood Tree", Some("2024-03-05T23:30:00Z"));
        let note = render(&snap);
        assert_eq!(note.current, "Unknown");
        assert_eq!(note.next, "Evil Bloodwood Tree — 23:30 UTC");
    }

    #[test]
    fn test_offset_timestamp_rendered_in_its_own_offset() {
        // The feed sends UTC instants; an explicit offset is kept as-is.
        let note = render(&snapshot("A", "B", Some("2024-01-01T10:00:00+00:00")));
        assert_eq!(note.next, "B — 10:00 UTC");
    }
}

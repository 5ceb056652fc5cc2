//! Unified error types for Wildywatch.

use thiserror::Error;

/// Result type alias using WildywatchError.
pub type Result<T> = std::result::Result<T, WildywatchError>;

#[derive(Error, Debug)]
pub enum WildywatchError {
    // Feed errors — one variant per failure class, one uniform Err to callers
    #[error("Feed returned status {0}")]
    FeedStatus(u16),

    #[error("Feed payload error: {0}")]
    FeedDecode(String),

    #[error("Feed transport error: {0}")]
    FeedTransport(String),

    // Channel errors
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Channel not connected: {0}")]
    ChannelNotConnected(String),

    // Store errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl WildywatchError {
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for any of the three feed failure classes.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            Self::FeedStatus(_) | Self::FeedDecode(_) | Self::FeedTransport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WildywatchError::FeedStatus(503);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = WildywatchError::channel("test");
        assert!(matches!(e1, WildywatchError::Channel(_)));

        let e2 = WildywatchError::persistence("test");
        assert!(matches!(e2, WildywatchError::Persistence(_)));

        let e3 = WildywatchError::config("test");
        assert!(matches!(e3, WildywatchError::Config(_)));
    }

    #[test]
    fn test_feed_failure_classes() {
        assert!(WildywatchError::FeedStatus(500).is_feed_failure());
        assert!(WildywatchError::FeedDecode("bad json".into()).is_feed_failure());
        assert!(WildywatchError::FeedTransport("timeout".into()).is_feed_failure());
        assert!(!WildywatchError::channel("send failed").is_feed_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WildywatchError = io_err.into();
        assert!(matches!(err, WildywatchError::Io(_)));
    }
}

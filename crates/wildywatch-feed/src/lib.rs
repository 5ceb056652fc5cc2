//! # Wildywatch Feed
//! HTTP client for the flash-event feed endpoint.

pub mod client;

pub use client::FeedClient;

//! Sync layer: HTTP client for the external keyword-detection and study services.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{DEFAULT_STUDY_LEVEL, KeywordClient, SyncError};

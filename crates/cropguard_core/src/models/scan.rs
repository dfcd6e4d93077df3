//! Scan tracking and scan history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::HealthReport;

/// Where the image for a scan comes from.
#[derive(Debug, Clone)]
pub enum ScanSource {
    /// Raw image bytes that still need to be uploaded.
    Image {
        /// Encoded image file contents
        data: Vec<u8>,
    },
    /// An image already hosted at this URL.
    Hosted {
        url: String,
    },
}

/// Handle for tracking and cancelling an in-flight scan.
///
/// Dropping the screen that started a scan should call [`ScanHandle::cancel`]
/// so a late persistence write does not create an orphaned record.
pub struct ScanHandle {
    /// Unique scan identifier, reused as the persisted scan id
    id: Uuid,
    /// User who started the scan
    user_id: String,
    /// Cancellation token for interrupting the scan
    cancel_token: CancellationToken,
    /// Set once the report has been written
    saved: AtomicBool,
    /// Scan start time
    started_at: DateTime<Utc>,
}

impl ScanHandle {
    /// Create a new scan handle.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            cancel_token: CancellationToken::new(),
            saved: AtomicBool::new(false),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    /// Request cancellation of the scan.
    pub fn cancel(&self) {
        tracing::debug!(scan_id = %self.id, "Scan cancellation requested");
        self.cancel_token.cancel();
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Wait for cancellation.
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await
    }

    /// Get a clone of the cancellation token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Mark the report as saved. Returns `true` only for the first caller.
    pub fn mark_saved(&self) -> bool {
        !self.saved.swap(true, Ordering::AcqRel)
    }

    pub fn is_saved(&self) -> bool {
        self.saved.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ScanHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanHandle")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("started_at", &self.started_at)
            .field("is_cancelled", &self.is_cancelled())
            .field("is_saved", &self.is_saved())
            .finish()
    }
}

/// A persisted scan in a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub scan_id: Uuid,
    /// Owning user
    pub user_id: String,
    pub report: HealthReport,
    /// Timestamp taken on the client when the scan finished
    pub client_created_at: DateTime<Utc>,
    /// Timestamp generated by the store on first write
    pub server_created_at: DateTime<Utc>,
    /// Timestamp of the latest write
    pub updated_at: DateTime<Utc>,
}

/// Result of a save call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new history record was created.
    Inserted,
    /// A record with the same scan id already existed and was overwritten.
    Replaced,
}

/// History filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanFilter {
    #[default]
    All,
    /// No disease and no pest
    Healthy,
    /// At least one disease
    Unhealthy,
    /// At least one pest
    Pest,
}

impl ScanFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "healthy" => Some(Self::Healthy),
            "unhealthy" => Some(Self::Unhealthy),
            "pest" | "pests" => Some(Self::Pest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_saved_only_once() {
        let handle = ScanHandle::new("user-1");
        assert!(!handle.is_saved());
        assert!(handle.mark_saved());
        assert!(!handle.mark_saved());
        assert!(handle.is_saved());
    }

    #[tokio::test]
    async fn test_cancel_resolves_waiters() {
        let handle = std::sync::Arc::new(ScanHandle::new("user-1"));
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        handle.cancel();
        task.await.unwrap();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(ScanFilter::parse("Healthy"), Some(ScanFilter::Healthy));
        assert_eq!(ScanFilter::parse("pests"), Some(ScanFilter::Pest));
        assert_eq!(ScanFilter::parse("wilted"), None);
    }
}

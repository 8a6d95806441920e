//! # Notification Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Enqueue (commit side)          Delivery (worker side)                  │
//! │  ─────────────────────          ──────────────────────                  │
//! │  QueueFull                      Delivery  (notifier refused/failed)     │
//! │  QueueClosed                    Io        (spool write failed)          │
//! │                                                                         │
//! │  Neither side ever fails a commit: enqueue errors are logged by the     │
//! │  checkout, delivery errors are retried then logged by the worker.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The bounded queue has no free slot.
    #[error("Notification queue is full, invoice for bill #{bill_number} not queued")]
    QueueFull { bill_number: i64 },

    /// The worker has stopped and no longer accepts jobs.
    #[error("Notification queue is closed")]
    QueueClosed,

    /// The notifier could not deliver the invoice.
    #[error("Invoice delivery failed: {0}")]
    Delivery(String),

    /// Spool file could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Checks if retrying the same delivery may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotifyError::Delivery(_) | NotifyError::Io(_))
    }
}

//! # till-notify: Invoice Notification for Till
//!
//! Renders invoices for committed bills and delivers them on a background
//! task, decoupled from the checkout by a bounded queue.
//!
//! ## Module Organization
//! - [`invoice`] - `ShopProfile` and invoice rendering
//! - [`notifier`] - `InvoiceNotifier` trait, log and spool notifiers
//! - [`queue`] - `NotificationQueue` and the retrying `NotificationWorker`
//! - [`error`] - Notification error types
//!
//! ## Guarantees
//! - `NotificationQueue::enqueue` never awaits
//! - A failed or dropped notification never touches the bill
//! - Each invoice is retried up to `RetryPolicy::max_attempts`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use till_notify::{LogNotifier, NotificationSettings, NotificationWorker, ShopProfile};
//!
//! # async fn run() {
//! let (queue, worker) = NotificationWorker::spawn(
//!     LogNotifier,
//!     ShopProfile::default(),
//!     NotificationSettings::default(),
//! );
//!
//! // hand `queue` to the checkout service ...
//! drop(queue);
//! worker.shutdown().await;
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod notifier;
pub mod queue;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{NotifyError, NotifyResult};
pub use invoice::{Invoice, ShopProfile};
pub use notifier::{InvoiceNotifier, LogNotifier, SpoolNotifier};
pub use queue::{
    NotificationQueue, NotificationSettings, NotificationWorker, NotificationWorkerHandle,
    RetryPolicy, WorkerStats,
};

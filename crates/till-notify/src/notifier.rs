//! # Invoice Notifiers
//!
//! The delivery seam of the notification path. A notifier gets one rendered
//! [`Invoice`] at a time; the worker owns retries.
//!
//! | Notifier        | Delivers by                                        |
//! |-----------------|----------------------------------------------------|
//! | `LogNotifier`   | one structured log line (development, tests)       |
//! | `SpoolNotifier` | `invoice_bill_<N>.txt` in a directory for a mailer |

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::NotifyResult;
use crate::invoice::Invoice;

// =============================================================================
// Notifier Trait
// =============================================================================

/// Delivers invoices to customers.
///
/// Implementations should be idempotent per bill: a retried delivery may
/// repeat one that partly succeeded.
pub trait InvoiceNotifier: Send + Sync + 'static {
    /// Delivers one invoice.
    fn deliver(&self, invoice: &Invoice) -> impl Future<Output = NotifyResult<()>> + Send;
}

// =============================================================================
// Log Notifier
// =============================================================================

/// Writes each invoice to the log instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl InvoiceNotifier for LogNotifier {
    async fn deliver(&self, invoice: &Invoice) -> NotifyResult<()> {
        info!(
            bill_id = %invoice.bill_id,
            bill_number = invoice.bill_number,
            recipient = %invoice.recipient,
            subject = %invoice.subject,
            "Invoice ready"
        );
        debug!(body = %invoice.body, "Invoice body");
        Ok(())
    }
}

// =============================================================================
// Spool Notifier
// =============================================================================

/// Writes each invoice as a file that an external mailer picks up.
///
/// The file is written under a temporary name and renamed into place, so a
/// mailer polling the directory never sees a partial invoice.
#[derive(Debug, Clone)]
pub struct SpoolNotifier {
    dir: PathBuf,
}

impl SpoolNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SpoolNotifier { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn render(invoice: &Invoice) -> String {
        format!(
            "To: {}\nSubject: {}\n\n{}\n\n{}",
            invoice.recipient, invoice.subject, invoice.body, invoice.document
        )
    }
}

impl InvoiceNotifier for SpoolNotifier {
    async fn deliver(&self, invoice: &Invoice) -> NotifyResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(invoice.file_name());
        let partial = self.dir.join(format!(".{}.partial", invoice.file_name()));

        tokio::fs::write(&partial, Self::render(invoice)).await?;
        tokio::fs::rename(&partial, &target).await?;

        info!(
            bill_number = invoice.bill_number,
            path = %target.display(),
            "Invoice spooled"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

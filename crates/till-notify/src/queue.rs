//! # Notification Queue & Worker
//!
//! Hands completed bills from the checkout to a background task that
//! renders and delivers invoices.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  commit() ──► NotificationQueue::enqueue(bill)                          │
//! │                 │ try_send (never awaits)                               │
//! │                 │   Full   → NotifyError::QueueFull   (caller logs)     │
//! │                 │   Closed → NotifyError::QueueClosed (caller logs)     │
//! │                 ▼                                                       │
//! │        ┌─────────────────┐                                              │
//! │        │ mpsc (bounded)  │                                              │
//! │        └────────┬────────┘                                              │
//! │                 ▼                                                       │
//! │        NotificationWorker (tokio task)                                  │
//! │          1. Invoice::from_bill                                          │
//! │          2. notifier.deliver()                                          │
//! │          3. on error: sleep(next_backoff), retry up to max_attempts     │
//! │          4. give up → error! log, move on to the next bill              │
//! │                                                                         │
//! │  SHUTDOWN: all queue handles dropped, or handle.shutdown().             │
//! │            Jobs already queued are drained before the task exits.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use till_core::types::CompletedBill;

use crate::error::{NotifyError, NotifyResult};
use crate::invoice::{Invoice, ShopProfile};
use crate::notifier::InvoiceNotifier;

// =============================================================================
// Settings
// =============================================================================

/// How often and how patiently a delivery is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total delivery attempts per invoice, first one included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_backoff,
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None, // bounded by max_attempts instead
            ..Default::default()
        }
    }
}

/// Queue and worker settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSettings {
    /// Jobs that can wait for the worker before enqueue reports `QueueFull`.
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            queue_capacity: 64,
            retry: RetryPolicy::default(),
        }
    }
}

// =============================================================================
// Queue Handle
// =============================================================================

/// Sending side of the notification path. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<CompletedBill>,
}

impl NotificationQueue {
    /// Queues a bill for invoicing without waiting.
    pub fn enqueue(&self, bill: CompletedBill) -> NotifyResult<()> {
        let bill_number = bill.bill.bill_number;

        self.tx.try_send(bill).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::QueueFull { bill_number },
            TrySendError::Closed(_) => NotifyError::QueueClosed,
        })?;

        debug!(bill_number, "Invoice queued");
        Ok(())
    }

    /// Checks if the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// =============================================================================
// Worker Stats
// =============================================================================

/// Counters updated by the worker.
#[derive(Debug, Default)]
pub struct WorkerStats {
    delivered: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
}

impl WorkerStats {
    /// Invoices delivered.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Invoices given up on after `max_attempts`.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Delivery attempts after the first one, across all invoices.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Background consumer of the notification queue.
pub struct NotificationWorker<N> {
    notifier: N,
    shop: ShopProfile,
    retry: RetryPolicy,
    rx: mpsc::Receiver<CompletedBill>,
    shutdown_rx: mpsc::Receiver<()>,
    stats: Arc<WorkerStats>,
}

/// Handle for controlling a spawned worker.
pub struct NotificationWorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
    stats: Arc<WorkerStats>,
}

impl NotificationWorkerHandle {
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Stops accepting jobs, drains the queue and waits for the task.
    pub async fn shutdown(self) {
        // Worker may already be gone; joining below still works
        let _ = self.shutdown_tx.send(()).await;
        self.wait().await;
    }

    /// Waits for the task to exit (after every queue handle is dropped).
    pub async fn wait(self) {
        if let Err(e) = self.join.await {
            error!(?e, "Notification worker task failed");
        }
    }
}

impl<N: InvoiceNotifier> NotificationWorker<N> {
    /// Creates a worker and its queue without starting it.
    pub fn new(
        notifier: N,
        shop: ShopProfile,
        settings: NotificationSettings,
    ) -> (Self, NotificationQueue, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = NotificationWorker {
            notifier,
            shop,
            retry: settings.retry,
            rx,
            shutdown_rx,
            stats: Arc::new(WorkerStats::default()),
        };

        (worker, NotificationQueue { tx }, shutdown_tx)
    }

    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(
        notifier: N,
        shop: ShopProfile,
        settings: NotificationSettings,
    ) -> (NotificationQueue, NotificationWorkerHandle) {
        let (worker, queue, shutdown_tx) = Self::new(notifier, shop, settings);
        let stats = Arc::clone(&worker.stats);
        let join = tokio::spawn(worker.run());

        (
            queue,
            NotificationWorkerHandle {
                shutdown_tx,
                join,
                stats,
            },
        )
    }

    /// Runs the worker loop until shutdown.
    pub async fn run(mut self) {
        info!(
            max_attempts = self.retry.max_attempts,
            "Notification worker starting"
        );

        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(bill) => self.process(bill).await,
                    None => {
                        debug!("All notification queue handles dropped");
                        break;
                    }
                },

                Some(()) = self.shutdown_rx.recv() => {
                    info!("Notification worker shutting down");
                    self.rx.close();
                    while let Some(bill) = self.rx.recv().await {
                        self.process(bill).await;
                    }
                    break;
                }
            }
        }

        info!(
            delivered = self.stats.delivered(),
            failed = self.stats.failed(),
            "Notification worker stopped"
        );
    }

    /// Delivers one bill's invoice with retries.
    async fn process(&self, bill: CompletedBill) {
        let invoice = Invoice::from_bill(&bill, &self.shop);
        let mut backoff = self.retry.backoff();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match self.notifier.deliver(&invoice).await {
                Ok(()) => {
                    self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                    info!(
                        bill_id = %invoice.bill_id,
                        bill_number = invoice.bill_number,
                        attempt,
                        "Invoice delivered"
                    );
                    return;
                }
                Err(e) => e,
            };

            let delay = if err.is_retryable() && attempt < max_attempts {
                backoff.next_backoff()
            } else {
                None
            };

            match delay {
                Some(delay) => {
                    self.stats.retries.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        bill_number = invoice.bill_number,
                        attempt,
                        ?delay,
                        error = %err,
                        "Invoice delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        bill_id = %invoice.bill_id,
                        bill_number = invoice.bill_number,
                        attempts = attempt,
                        error = %err,
                        "Giving up on invoice delivery"
                    );
                    return;
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::tests::sample_bill;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;

    /// Fails the first `fail_first` deliveries, then records the rest.
    #[derive(Clone, Default)]
    struct FlakyNotifier {
        fail_first: u32,
        calls: Arc<AtomicU32>,
        delivered: Arc<Mutex<Vec<i64>>>,
    }

    impl InvoiceNotifier for FlakyNotifier {
        async fn deliver(&self, invoice: &Invoice) -> NotifyResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(NotifyError::Delivery(format!("attempt {} refused", call + 1)));
            }
            self.delivered.lock().unwrap().push(invoice.bill_number);
            Ok(())
        }
    }

    fn fast_settings(max_attempts: u32) -> NotificationSettings {
        NotificationSettings {
            queue_capacity: 8,
            retry: RetryPolicy {
                max_attempts,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(5),
            },
        }
    }

    #[tokio::test]
    async fn test_worker_retries_then_succeeds() {
        let notifier = FlakyNotifier {
            fail_first: 2,
            ..Default::default()
        };
        let (queue, handle) =
            NotificationWorker::spawn(notifier.clone(), ShopProfile::default(), fast_settings(5));
        let stats = handle.stats();

        queue.enqueue(sample_bill(1)).unwrap();
        drop(queue);
        handle.wait().await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
        assert_eq!(*notifier.delivered.lock().unwrap(), vec![1]);
        assert_eq!(stats.delivered(), 1);
        assert_eq!(stats.retries(), 2);
        assert_eq!(stats.failed(), 0);
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_max_attempts_and_continues() {
        let notifier = FlakyNotifier {
            fail_first: 3,
            ..Default::default()
        };
        let (queue, handle) =
            NotificationWorker::spawn(notifier.clone(), ShopProfile::default(), fast_settings(3));
        let stats = handle.stats();

        queue.enqueue(sample_bill(1)).unwrap();
        queue.enqueue(sample_bill(2)).unwrap();
        drop(queue);
        handle.wait().await;

        // Bill 1 used all three attempts, bill 2 went through first time
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 4);
        assert_eq!(*notifier.delivered.lock().unwrap(), vec![2]);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.delivered(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_jobs() {
        let notifier = FlakyNotifier::default();
        let (worker, queue, shutdown_tx) =
            NotificationWorker::new(notifier.clone(), ShopProfile::default(), fast_settings(1));

        // Queue everything before the worker runs, then ask it to stop
        for n in 1..=3 {
            queue.enqueue(sample_bill(n)).unwrap();
        }
        shutdown_tx.send(()).await.unwrap();
        worker.run().await;

        assert_eq!(*notifier.delivered.lock().unwrap(), vec![1, 2, 3]);
        assert!(queue.is_closed());
        assert!(matches!(
            queue.enqueue(sample_bill(4)),
            Err(NotifyError::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn test_enqueue_reports_full_queue() {
        let (_worker, queue, _shutdown) = NotificationWorker::new(
            FlakyNotifier::default(),
            ShopProfile::default(),
            NotificationSettings {
                queue_capacity: 1,
                retry: RetryPolicy::default(),
            },
        );

        queue.enqueue(sample_bill(1)).unwrap();
        assert!(matches!(
            queue.enqueue(sample_bill(2)),
            Err(NotifyError::QueueFull { bill_number: 2 })
        ));
    }

    #[tokio::test]
    async fn test_handle_shutdown_stops_idle_worker() {
        let (queue, handle) = NotificationWorker::spawn(
            FlakyNotifier::default(),
            ShopProfile::default(),
            fast_settings(1),
        );

        handle.shutdown().await;
        assert!(queue.is_closed());
    }
}

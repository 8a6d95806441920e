//! # Checkout Commit
//!
//! Turns a cart and the cash tendered into a committed bill: prices the cart,
//! settles payment, makes change and records everything in one SQLite
//! transaction.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CheckoutService::commit                          │
//! │                                                                         │
//! │  validate request ──────────────────────────────► Rejected(InvalidReq)  │
//! │       │                                                                 │
//! │  till lock ──► BEGIN                                                    │
//! │       │                                                                 │
//! │  resolve products by code ──────────────────────► Rejected(NotFound)    │
//! │  till snapshot (submitted or persisted counts)                          │
//! │  plan_checkout: price, round, balance, change ──► Rejected(OutOfStock,  │
//! │       │                                            EmptyCart,           │
//! │       │                                            InsufficientPayment) │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────┐                          │
//! │  │ decrement stock (guarded)                 │                          │
//! │  │ write till counts after change            │  any failure ──► ROLLBACK│
//! │  │ insert bill, items, change                │          CommitFailed    │
//! │  └───────────────────────────────────────────┘                          │
//! │       │                                                                 │
//! │  COMMIT ──► release lock ──► enqueue invoice (never fails the bill)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The till lock is held from the first read to the commit, so the
//! snapshot that was validated is the one that gets written. Rejections
//! happen before any write and leave the database untouched.

use chrono::Utc;
use sqlx::SqliteConnection;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{bill, denomination, product};
use till_core::validation::{
    validate_cart, validate_customer_email, validate_denomination_count,
    validate_denomination_value, ValidationResult,
};
use till_core::{
    plan_checkout, Bill, BillItem, CartLine, ChangeDenomination, CheckoutPlan, CompletedBill,
    CoreError, Denomination, Money, Product, TillSnapshot, ValidationError,
};
use till_notify::NotificationQueue;

// =============================================================================
// Request
// =============================================================================

/// Everything needed to bill one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub customer_email: String,
    pub lines: Vec<CartLine>,
    pub cash_paid: Money,
    /// Counts the operator reports for this transaction. `None` uses the
    /// persisted running counts; registered values left out count as 0.
    pub till_counts: Option<Vec<Denomination>>,
}

impl CheckoutRequest {
    /// Request using the persisted till counts.
    pub fn new(customer_email: impl Into<String>, lines: Vec<CartLine>, cash_paid: Money) -> Self {
        CheckoutRequest {
            customer_email: customer_email.into(),
            lines,
            cash_paid,
            till_counts: None,
        }
    }

    /// Uses operator-submitted counts for this transaction.
    pub fn with_till_counts(mut self, counts: Vec<Denomination>) -> Self {
        self.till_counts = Some(counts);
        self
    }

    /// Shape checks that need no database access.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_customer_email(&self.customer_email)?;
        validate_cart(&self.lines)?;

        if self.cash_paid.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "cash paid".to_string(),
            });
        }

        if let Some(counts) = &self.till_counts {
            for d in counts {
                validate_denomination_value(d.value)?;
                validate_denomination_count(d.count_available)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a checkout produced no bill.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request was refused before anything was written.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Writing the bill failed and the transaction was rolled back.
    #[error("Checkout rolled back: {0}")]
    CommitFailed(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Rejected(CoreError::from(err))
    }
}

// =============================================================================
// Service
// =============================================================================

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultPoint {
    AfterStockDecrement,
}

/// Runs checkouts against one till.
///
/// ## Usage
/// ```rust,ignore
/// let service = CheckoutService::new(db.clone(), Some(queue));
///
/// let request = CheckoutRequest::new(
///     "asha@example.in",
///     vec![CartLine::new("RICE-5KG", 2)],
///     Money::from_rupees(1000),
/// );
/// let completed = service.commit(request).await?;
/// println!("Bill #{}", completed.bill.bill_number);
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    notifications: Option<NotificationQueue>,
    #[cfg(test)]
    fault: Option<FaultPoint>,
}

impl CheckoutService {
    /// Creates a service. With `notifications` set, every committed bill is
    /// queued for invoicing.
    pub fn new(db: Database, notifications: Option<NotificationQueue>) -> Self {
        CheckoutService {
            db,
            notifications,
            #[cfg(test)]
            fault: None,
        }
    }

    /// Bills a cart atomically.
    ///
    /// ## Returns
    /// * `Ok(CompletedBill)` - Committed. A till short of change is still a
    ///   success, see `bill.change_shortfall`
    /// * `Err(CheckoutError::Rejected)` - Nothing was written
    /// * `Err(CheckoutError::CommitFailed)` - Rolled back
    pub async fn commit(&self, request: CheckoutRequest) -> Result<CompletedBill, CheckoutError> {
        request.validate()?;

        let till_guard = self.db.lock_till().await;
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let products = resolve_products(&mut *tx, &request.lines).await?;
        let snapshot = load_snapshot(&mut *tx, request.till_counts.as_deref()).await?;

        let plan = plan_checkout(
            products
                .iter()
                .zip(&request.lines)
                .map(|(product, line)| (product, line.quantity)),
            request.cash_paid,
            &snapshot,
        )?;

        let completed = match self.persist(&mut *tx, &request, &plan).await {
            Ok(completed) => completed,
            Err(e) => {
                error!(
                    customer_email = %request.customer_email.trim(),
                    error = %e,
                    "Checkout failed, rolling back"
                );
                return Err(e.into());
            }
        };

        tx.commit().await.map_err(DbError::from)?;
        drop(till_guard);

        info!(
            bill_id = %completed.bill.id,
            bill_number = completed.bill.bill_number,
            items = completed.items.len(),
            net_price = %completed.bill.net_price(),
            balance = %completed.bill.balance_to_customer(),
            "Bill committed"
        );
        if completed.has_shortfall() {
            warn!(
                bill_id = %completed.bill.id,
                remaining_change = completed.bill.change_shortfall,
                "Bill committed without exact change"
            );
        }

        self.notify(&completed);
        Ok(completed)
    }

    /// Writes the plan. Everything runs on the commit's transaction.
    async fn persist(
        &self,
        conn: &mut SqliteConnection,
        request: &CheckoutRequest,
        plan: &CheckoutPlan,
    ) -> DbResult<CompletedBill> {
        for (product_id, quantity) in plan.cart.stock_decrements() {
            product::decrement_stock(&mut *conn, &product_id, quantity).await?;
        }

        #[cfg(test)]
        self.fail_at(FaultPoint::AfterStockDecrement)?;

        for d in plan.till_after.denominations() {
            denomination::write_count(&mut *conn, d.value, d.count_available).await?;
        }

        let bill_number = bill::next_bill_number(&mut *conn).await?;
        let totals = &plan.cart.totals;
        let row = Bill {
            id: Uuid::new_v4().to_string(),
            bill_number,
            customer_email: request.customer_email.trim().to_string(),
            created_at: Utc::now(),
            total_without_tax_paise: totals.total_without_tax.paise(),
            total_tax_paise: totals.total_tax.paise(),
            net_price_paise: totals.net_price.paise(),
            rounded_net_price_paise: totals.rounded_net_price.paise(),
            cash_paid_paise: plan.cash_paid.paise(),
            balance_to_customer_paise: plan.balance_to_customer.paise(),
            change_shortfall: plan.change_shortfall(),
        };
        bill::insert_bill(&mut *conn, &row).await?;

        for (line_no, quote) in plan.cart.lines.iter().enumerate() {
            let item = BillItem {
                id: Uuid::new_v4().to_string(),
                bill_id: row.id.clone(),
                product_id: quote.product_id.clone(),
                line_no: line_no as i64,
                product_code: quote.product_code.clone(),
                product_name: quote.product_name.clone(),
                unit_price_paise: quote.unit_price.paise(),
                tax_rate_bps: quote.tax_rate.bps(),
                quantity: quote.quantity,
                purchase_price_paise: quote.purchase_price.paise(),
                tax_for_item_paise: quote.tax_for_item.paise(),
                total_price_for_item_paise: quote.total_price_for_item.paise(),
            };
            bill::insert_item(&mut *conn, &item).await?;
        }

        for line in &plan.change.lines {
            bill::insert_change(&mut *conn, &row.id, &ChangeDenomination::from(*line)).await?;
        }

        bill::fetch_completed(&mut *conn, &row.id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("bill {} vanished before commit", row.id)))
    }

    fn notify(&self, completed: &CompletedBill) {
        let Some(queue) = &self.notifications else {
            return;
        };

        if let Err(e) = queue.enqueue(completed.clone()) {
            warn!(
                bill_id = %completed.bill.id,
                bill_number = completed.bill.bill_number,
                error = %e,
                "Invoice not queued"
            );
        }
    }

    #[cfg(test)]
    fn fail_at(&self, point: FaultPoint) -> DbResult<()> {
        if self.fault == Some(point) {
            return Err(DbError::Internal(format!("injected fault at {:?}", point)));
        }
        Ok(())
    }
}

/// Looks up every line's product, in cart order.
async fn resolve_products(
    conn: &mut SqliteConnection,
    lines: &[CartLine],
) -> Result<Vec<Product>, CheckoutError> {
    let mut products = Vec::with_capacity(lines.len());
    for line in lines {
        match product::fetch_by_code(&mut *conn, &line.product_code).await? {
            Some(p) => products.push(p),
            None => return Err(CoreError::ProductNotFound(line.product_code.clone()).into()),
        }
    }
    Ok(products)
}

async fn load_snapshot(
    conn: &mut SqliteConnection,
    submitted: Option<&[Denomination]>,
) -> Result<TillSnapshot, CheckoutError> {
    let snapshot = match submitted {
        Some(counts) => {
            let registered = denomination::fetch_values(&mut *conn).await?;
            TillSnapshot::from_submitted(&registered, counts)?
        }
        None => TillSnapshot::new(denomination::fetch_all(&mut *conn).await?)?,
    };
    Ok(snapshot)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::new_product;
    use crate::DbConfig;
    use std::time::Duration;
    use till_core::TaxRate;
    use till_notify::{LogNotifier, NotificationSettings, NotificationWorker, ShopProfile};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        stock(&db).await;
        db
    }

    async fn stock(db: &Database) {
        let products = db.products();
        products
            .insert(&new_product(
                "RICE-5KG",
                "Basmati Rice 5kg",
                Money::from_rupees(100),
                TaxRate::from_bps(1800),
                10,
            ))
            .await
            .unwrap();
        products
            .insert(&new_product(
                "TV-STAND",
                "Engineered Wood TV Stand",
                Money::from_rupees(2000),
                TaxRate::from_bps(1788),
                1,
            ))
            .await
            .unwrap();

        let till = db.denominations();
        till.register(&[500, 100, 50, 20, 10, 5, 2, 1]).await.unwrap();
        for (value, count) in [(500, 2), (100, 3), (50, 1), (20, 2), (2, 1), (1, 5)] {
            till.set_count(value, count).await.unwrap();
        }
    }

    async fn stock_of(db: &Database, code: &str) -> i64 {
        db.products()
            .get_by_code(code)
            .await
            .unwrap()
            .unwrap()
            .available_stock
    }

    fn request(lines: Vec<CartLine>, cash_rupees: i64) -> CheckoutRequest {
        CheckoutRequest::new("asha@example.in", lines, Money::from_rupees(cash_rupees))
    }

    #[tokio::test]
    async fn test_commit_records_bill_and_decrements() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        // 2 × 100.00 @ 18% = 236.00; cash 300 → 64
        // greedy: 50×1 (14 left), no 10s or 5s, 2×1, 1×5 → 7 short
        let completed = service
            .commit(request(vec![CartLine::new("RICE-5KG", 2)], 300))
            .await
            .unwrap();

        let bill = &completed.bill;
        assert_eq!(bill.bill_number, 1);
        assert_eq!(bill.total_without_tax(), Money::from_rupees(200));
        assert_eq!(bill.total_tax(), Money::from_rupees(36));
        assert_eq!(bill.net_price(), Money::from_rupees(236));
        assert_eq!(bill.balance_to_customer(), Money::from_rupees(64));
        assert_eq!(bill.change_shortfall, 7);
        assert_eq!(
            completed.change,
            vec![
                ChangeDenomination { value: 50, count: 1 },
                ChangeDenomination { value: 2, count: 1 },
                ChangeDenomination { value: 1, count: 5 },
            ]
        );
        assert_eq!(completed.change_returned() + bill.change_shortfall, 64);

        assert_eq!(stock_of(&db, "RICE-5KG").await, 8);
        let till = db.denominations();
        assert_eq!(till.get(50).await.unwrap().unwrap().count_available, 0);
        assert_eq!(till.get(2).await.unwrap().unwrap().count_available, 0);
        assert_eq!(till.get(1).await.unwrap().unwrap().count_available, 0);
        assert_eq!(till.get(500).await.unwrap().unwrap().count_available, 2);

        let stored = db.bills().get_completed(&bill.id).await.unwrap().unwrap();
        assert_eq!(stored, completed);
    }

    #[tokio::test]
    async fn test_rounded_total_and_balance() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        // 2000.00 + 17.88% = 2357.60 → 2357; cash 2400 → 43 = 20×2 + 2 + 1
        let completed = service
            .commit(request(vec![CartLine::new("TV-STAND", 1)], 2400))
            .await
            .unwrap();

        assert_eq!(completed.bill.net_price(), Money::from_paise(235_760));
        assert_eq!(completed.bill.rounded_net_price(), Money::from_rupees(2357));
        assert_eq!(completed.bill.balance_to_customer(), Money::from_rupees(43));
        assert_eq!(completed.bill.change_shortfall, 0);
        assert_eq!(
            completed.change,
            vec![
                ChangeDenomination { value: 20, count: 2 },
                ChangeDenomination { value: 2, count: 1 },
                ChangeDenomination { value: 1, count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_out_of_stock_writes_nothing() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);
        let till_before = db.denominations().list().await.unwrap();

        let err = service
            .commit(request(vec![CartLine::new("TV-STAND", 2)], 10_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::OutOfStock { available: 1, requested: 2, .. })
        ));
        assert_eq!(stock_of(&db, "TV-STAND").await, 1);
        assert_eq!(db.bills().count().await.unwrap(), 0);
        assert_eq!(db.denominations().list().await.unwrap(), till_before);
    }

    #[tokio::test]
    async fn test_repeated_lines_cannot_oversell() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        let err = service
            .commit(request(
                vec![CartLine::new("RICE-5KG", 6), CartLine::new("RICE-5KG", 5)],
                5_000,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::OutOfStock { requested: 11, .. })
        ));
        assert_eq!(stock_of(&db, "RICE-5KG").await, 10);
    }

    #[tokio::test]
    async fn test_overflowing_line_total_is_rejected() {
        let db = setup().await;
        db.products()
            .insert(&new_product(
                "GOLD-BAR",
                "Gold Bar 1kg",
                Money::from_paise(1_000_000_000_000),
                TaxRate::from_bps(300),
                10_000_000,
            ))
            .await
            .unwrap();
        let service = CheckoutService::new(db.clone(), None);
        let till_before = db.denominations().list().await.unwrap();

        let err = service
            .commit(request(vec![CartLine::new("GOLD-BAR", 10_000_000)], 1_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::AmountTooLarge { ref context })
                if context == "GOLD-BAR"
        ));
        assert_eq!(stock_of(&db, "GOLD-BAR").await, 10_000_000);
        assert_eq!(db.bills().count().await.unwrap(), 0);
        assert_eq!(db.denominations().list().await.unwrap(), till_before);
    }

    #[tokio::test]
    async fn test_fault_after_stock_decrement_rolls_back() {
        let db = setup().await;
        let mut service = CheckoutService::new(db.clone(), None);
        service.fault = Some(FaultPoint::AfterStockDecrement);
        let till_before = db.denominations().list().await.unwrap();

        let err = service
            .commit(request(vec![CartLine::new("RICE-5KG", 2)], 300))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::CommitFailed(DbError::Internal(_))));
        assert_eq!(stock_of(&db, "RICE-5KG").await, 10);
        assert_eq!(db.bills().count().await.unwrap(), 0);
        assert_eq!(db.denominations().list().await.unwrap(), till_before);
    }

    #[tokio::test]
    async fn test_rejections() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        let unknown = service
            .commit(request(vec![CartLine::new("GHEE-1L", 1)], 1_000))
            .await
            .unwrap_err();
        assert!(matches!(
            unknown,
            CheckoutError::Rejected(CoreError::ProductNotFound(ref code)) if code == "GHEE-1L"
        ));

        let short = service
            .commit(request(vec![CartLine::new("RICE-5KG", 1)], 100))
            .await
            .unwrap_err();
        assert!(matches!(
            short,
            CheckoutError::Rejected(CoreError::InsufficientPayment { .. })
        ));

        let empty = service.commit(request(vec![], 100)).await.unwrap_err();
        assert!(matches!(empty, CheckoutError::Rejected(CoreError::InvalidRequest(_))));

        let only_zero = service
            .commit(request(vec![CartLine::new("RICE-5KG", 0)], 100))
            .await
            .unwrap_err();
        assert!(matches!(only_zero, CheckoutError::Rejected(CoreError::EmptyCart)));

        let mut bad_email = request(vec![CartLine::new("RICE-5KG", 1)], 200);
        bad_email.customer_email = "not-an-email".to_string();
        let err = service.commit(bad_email).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Rejected(CoreError::InvalidRequest(_))));

        assert_eq!(db.bills().count().await.unwrap(), 0);
        assert_eq!(stock_of(&db, "RICE-5KG").await, 10);
    }

    #[tokio::test]
    async fn test_zero_quantity_lines_are_dropped() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        let completed = service
            .commit(request(
                vec![CartLine::new("TV-STAND", 0), CartLine::new("RICE-5KG", 1)],
                200,
            ))
            .await
            .unwrap();

        assert_eq!(completed.items.len(), 1);
        assert_eq!(completed.items[0].product_code, "RICE-5KG");
        assert_eq!(stock_of(&db, "TV-STAND").await, 1);
    }

    #[tokio::test]
    async fn test_submitted_counts_replace_persisted() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        // Operator reports only 10 × ₹10 in the drawer; balance 64 → 6 × 10, 4 short
        let req = request(vec![CartLine::new("RICE-5KG", 2)], 300)
            .with_till_counts(vec![Denomination::new(10, 10)]);
        let completed = service.commit(req).await.unwrap();

        assert_eq!(completed.change, vec![ChangeDenomination { value: 10, count: 6 }]);
        assert_eq!(completed.bill.change_shortfall, 4);

        let till = db.denominations();
        assert_eq!(till.get(10).await.unwrap().unwrap().count_available, 4);
        // Unmentioned registered values were counted as empty
        assert_eq!(till.get(500).await.unwrap().unwrap().count_available, 0);
        assert_eq!(till.get(50).await.unwrap().unwrap().count_available, 0);
    }

    #[tokio::test]
    async fn test_unregistered_denomination_rejected() {
        let db = setup().await;
        let service = CheckoutService::new(db.clone(), None);

        let req = request(vec![CartLine::new("RICE-5KG", 1)], 200)
            .with_till_counts(vec![Denomination::new(200, 3)]);
        let err = service.commit(req).await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InvalidRequest(ValidationError::NotAllowed { .. }))
        ));
        assert_eq!(db.bills().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_commits_for_last_unit() {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(tmp.path().join("till.db")).max_connections(4))
            .await
            .unwrap();
        stock(&db).await;

        let service = CheckoutService::new(db.clone(), None);
        let mut tasks = Vec::new();
        for _ in 0..4 {
            let service = service.clone();
            tasks.push(tokio::spawn(async move {
                service
                    .commit(request(vec![CartLine::new("TV-STAND", 1)], 2400))
                    .await
            }));
        }

        let mut committed = 0;
        let mut out_of_stock = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => committed += 1,
                Err(CheckoutError::Rejected(CoreError::OutOfStock { .. })) => out_of_stock += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(committed, 1);
        assert_eq!(out_of_stock, 3);
        assert_eq!(stock_of(&db, "TV-STAND").await, 0);
        assert_eq!(db.bills().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bill_survives_notification_failure() {
        let db = setup().await;

        // Capacity 1 and nobody draining: the second invoice cannot be queued
        let settings = NotificationSettings {
            queue_capacity: 1,
            ..NotificationSettings::default()
        };
        let (worker, queue, _shutdown) =
            NotificationWorker::new(LogNotifier, ShopProfile::default(), settings);
        let service = CheckoutService::new(db.clone(), Some(queue.clone()));

        service
            .commit(request(vec![CartLine::new("RICE-5KG", 1)], 200))
            .await
            .unwrap();
        let second = service
            .commit(request(vec![CartLine::new("RICE-5KG", 1)], 200))
            .await
            .unwrap();
        assert_eq!(second.bill.bill_number, 2);

        // Worker gone: queue closed
        drop(worker);
        assert!(queue.is_closed());
        let third = service
            .commit(request(vec![CartLine::new("RICE-5KG", 1)], 200))
            .await
            .unwrap();
        assert_eq!(third.bill.bill_number, 3);

        assert_eq!(db.bills().count().await.unwrap(), 3);
        assert_eq!(stock_of(&db, "RICE-5KG").await, 7);
    }

    #[tokio::test]
    async fn test_committed_bill_is_delivered() {
        let db = setup().await;
        let (queue, worker) = NotificationWorker::spawn(
            LogNotifier,
            ShopProfile::default(),
            NotificationSettings::default(),
        );
        let service = CheckoutService::new(db.clone(), Some(queue));

        service
            .commit(request(vec![CartLine::new("RICE-5KG", 1)], 200))
            .await
            .unwrap();

        let stats = worker.stats();
        tokio::time::timeout(Duration::from_secs(5), async {
            while stats.delivered() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        drop(service);
        worker.shutdown().await;
        assert_eq!(stats.delivered(), 1);
    }
}

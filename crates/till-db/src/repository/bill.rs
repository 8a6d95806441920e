//! # Bill Repository
//!
//! Read access to committed bills and the insert helpers used by the
//! checkout transaction.
//!
//! ## Bill Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bills (immutable once written)                                         │
//! │    │                                                                    │
//! │    ├──► bill_items               one per priced cart line, line_no order│
//! │    │        └──► products        RESTRICT: sold products can't vanish   │
//! │    │                                                                    │
//! │    └──► bill_change_denominations  one per denomination handed back     │
//! │                                                                         │
//! │  Deleting a bill cascades to both child tables.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bills are never updated; there is deliberately no update method here.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use till_core::{Bill, BillItem, ChangeDenomination, CompletedBill};

const BILL_COLUMNS: &str = r#"
    id,
    bill_number,
    customer_email,
    created_at,
    total_without_tax_paise,
    total_tax_paise,
    net_price_paise,
    rounded_net_price_paise,
    cash_paid_paise,
    balance_to_customer_paise,
    change_shortfall
"#;

const ITEM_COLUMNS: &str = r#"
    id,
    bill_id,
    product_id,
    line_no,
    product_code,
    product_name,
    unit_price_paise,
    tax_rate_bps,
    quantity,
    purchase_price_paise,
    tax_for_item_paise,
    total_price_for_item_paise
"#;

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill row by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {} FROM bills WHERE id = ?1", BILL_COLUMNS);

        let bill = sqlx::query_as::<_, Bill>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bill)
    }

    /// Gets a bill row by the number printed on the invoice.
    pub async fn get_by_number(&self, bill_number: i64) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {} FROM bills WHERE bill_number = ?1", BILL_COLUMNS);

        let bill = sqlx::query_as::<_, Bill>(&sql)
            .bind(bill_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bill)
    }

    /// Gets a bill with its items (cart order) and change (largest first).
    pub async fn get_completed(&self, id: &str) -> DbResult<Option<CompletedBill>> {
        debug!(bill_id = %id, "Loading completed bill");

        let mut conn = self.pool.acquire().await?;
        fetch_completed(&mut *conn, id).await
    }

    /// Bills for one customer, newest first.
    pub async fn list_for_customer(&self, email: &str, limit: u32) -> DbResult<Vec<Bill>> {
        let sql = format!(
            "SELECT {} FROM bills WHERE customer_email = ?1 ORDER BY bill_number DESC LIMIT ?2",
            BILL_COLUMNS
        );

        let bills = sqlx::query_as::<_, Bill>(&sql)
            .bind(email)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(customer_email = %email, count = bills.len(), "Listed bills for customer");
        Ok(bills)
    }

    /// Gets the items of a bill in cart order.
    pub async fn items_for(&self, bill_id: &str) -> DbResult<Vec<BillItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut *conn, bill_id).await
    }

    /// Gets the change handed back for a bill, largest denomination first.
    pub async fn change_for(&self, bill_id: &str) -> DbResult<Vec<ChangeDenomination>> {
        let mut conn = self.pool.acquire().await?;
        fetch_change(&mut *conn, bill_id).await
    }

    /// Counts bills.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with the checkout transaction)
// =============================================================================

pub(crate) async fn fetch_completed(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<CompletedBill>> {
    let sql = format!("SELECT {} FROM bills WHERE id = ?1", BILL_COLUMNS);

    let Some(bill) = sqlx::query_as::<_, Bill>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let items = fetch_items(&mut *conn, id).await?;
    let change = fetch_change(&mut *conn, id).await?;

    Ok(Some(CompletedBill { bill, items, change }))
}

async fn fetch_items(conn: &mut SqliteConnection, bill_id: &str) -> DbResult<Vec<BillItem>> {
    let sql = format!(
        "SELECT {} FROM bill_items WHERE bill_id = ?1 ORDER BY line_no",
        ITEM_COLUMNS
    );

    let items = sqlx::query_as::<_, BillItem>(&sql)
        .bind(bill_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(items)
}

async fn fetch_change(
    conn: &mut SqliteConnection,
    bill_id: &str,
) -> DbResult<Vec<ChangeDenomination>> {
    let change = sqlx::query_as::<_, ChangeDenomination>(
        r#"
        SELECT value, count
        FROM bill_change_denominations
        WHERE bill_id = ?1
        ORDER BY value DESC
        "#,
    )
    .bind(bill_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(change)
}

/// Next bill number. Only safe under the till lock.
pub(crate) async fn next_bill_number(conn: &mut SqliteConnection) -> DbResult<i64> {
    let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(bill_number), 0) + 1 FROM bills")
        .fetch_one(&mut *conn)
        .await?;
    Ok(next)
}

pub(crate) async fn insert_bill(conn: &mut SqliteConnection, bill: &Bill) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bills (
            id, bill_number, customer_email, created_at,
            total_without_tax_paise, total_tax_paise, net_price_paise,
            rounded_net_price_paise, cash_paid_paise, balance_to_customer_paise,
            change_shortfall
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&bill.id)
    .bind(bill.bill_number)
    .bind(&bill.customer_email)
    .bind(bill.created_at)
    .bind(bill.total_without_tax_paise)
    .bind(bill.total_tax_paise)
    .bind(bill.net_price_paise)
    .bind(bill.rounded_net_price_paise)
    .bind(bill.cash_paid_paise)
    .bind(bill.balance_to_customer_paise)
    .bind(bill.change_shortfall)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &BillItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bill_items (
            id, bill_id, product_id, line_no, product_code, product_name,
            unit_price_paise, tax_rate_bps, quantity,
            purchase_price_paise, tax_for_item_paise, total_price_for_item_paise
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&item.id)
    .bind(&item.bill_id)
    .bind(&item.product_id)
    .bind(item.line_no)
    .bind(&item.product_code)
    .bind(&item.product_name)
    .bind(item.unit_price_paise)
    .bind(item.tax_rate_bps)
    .bind(item.quantity)
    .bind(item.purchase_price_paise)
    .bind(item.tax_for_item_paise)
    .bind(item.total_price_for_item_paise)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_change(
    conn: &mut SqliteConnection,
    bill_id: &str,
    change: &ChangeDenomination,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO bill_change_denominations (bill_id, value, count) VALUES (?1, ?2, ?3)",
    )
    .bind(bill_id)
    .bind(change.value)
    .bind(change.count)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

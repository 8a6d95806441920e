//! # Register Commands
//!
//! One function per CLI subcommand. Each returns the text to print so the
//! binary stays a thin dispatcher.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use crate::config::RegisterConfig;
use crate::request::CheckoutFile;
use till_core::{Bill, CompletedBill, Denomination};
use till_db::{CheckoutError, CheckoutService, Database};
use till_notify::{
    Invoice, LogNotifier, NotificationQueue, NotificationWorker, NotificationWorkerHandle,
    ShopProfile, SpoolNotifier,
};

/// Output style for bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

// =============================================================================
// checkout
// =============================================================================

/// Bills the cart in `request_path` and drains the invoice queue.
pub async fn checkout(
    db: &Database,
    config: &RegisterConfig,
    request_path: &Path,
    output: Output,
) -> anyhow::Result<String> {
    let request = CheckoutFile::load(request_path)?.into_request()?;

    let notifications = start_notifications(config);
    let service = CheckoutService::new(
        db.clone(),
        notifications.as_ref().map(|(queue, _)| queue.clone()),
    );

    let result = service.commit(request).await;

    // The worker exits once every queued invoice has been handled
    drop(service);
    if let Some((queue, worker)) = notifications {
        drop(queue);
        worker.shutdown().await;
    }

    let completed = match result {
        Ok(completed) => completed,
        Err(CheckoutError::Rejected(e)) => bail!("checkout rejected: {}", e),
        Err(e @ CheckoutError::CommitFailed(_)) => return Err(e.into()),
    };

    render_bill(&completed, &config.shop, output)
}

fn start_notifications(
    config: &RegisterConfig,
) -> Option<(NotificationQueue, NotificationWorkerHandle)> {
    let notification = &config.notification;
    if !notification.enabled {
        info!("Invoice notifications disabled");
        return None;
    }

    let settings = notification.settings();
    let shop = config.shop.clone();

    Some(match &notification.spool_dir {
        Some(dir) => NotificationWorker::spawn(SpoolNotifier::new(dir), shop, settings),
        None => NotificationWorker::spawn(LogNotifier, shop, settings),
    })
}

// =============================================================================
// bill / history
// =============================================================================

/// How a bill is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillKey {
    Id(String),
    Number(i64),
}

pub async fn show_bill(
    db: &Database,
    shop: &ShopProfile,
    key: BillKey,
    output: Output,
) -> anyhow::Result<String> {
    let bills = db.bills();

    let id = match &key {
        BillKey::Id(id) => id.clone(),
        BillKey::Number(number) => match bills.get_by_number(*number).await? {
            Some(bill) => bill.id,
            None => bail!("no bill #{}", number),
        },
    };

    let completed = bills
        .get_completed(&id)
        .await?
        .with_context(|| format!("no bill {:?}", key))?;

    render_bill(&completed, shop, output)
}

pub async fn history(
    db: &Database,
    shop: &ShopProfile,
    email: &str,
    limit: u32,
    output: Output,
) -> anyhow::Result<String> {
    let bills = db.bills().list_for_customer(email.trim(), limit).await?;

    if output == Output::Json {
        return Ok(serde_json::to_string_pretty(&bills)?);
    }

    if bills.is_empty() {
        return Ok(format!("No bills for {}\n", email.trim()));
    }

    let mut out = String::new();
    writeln!(out, "Bills for {} (newest first)", email.trim())?;
    for bill in &bills {
        writeln!(out, "{}", history_line(bill, shop))?;
    }
    Ok(out)
}

fn history_line(bill: &Bill, shop: &ShopProfile) -> String {
    format!(
        "  #{:<6} {}  {:>12}  paid {:>12}",
        bill.bill_number,
        bill.created_at.format("%Y-%m-%d %H:%M"),
        shop.format_currency(bill.rounded_net_price()),
        shop.format_currency(bill.cash_paid()),
    )
}

// =============================================================================
// till
// =============================================================================

/// Applies `updates` (value, count) and returns the till listing.
pub async fn till(
    db: &Database,
    shop: &ShopProfile,
    updates: &[(i64, i64)],
    output: Output,
) -> anyhow::Result<String> {
    let repo = db.denominations();
    for (value, count) in updates {
        repo.set_count(*value, *count)
            .await
            .with_context(|| format!("cannot set {} × {}", count, value))?;
    }

    let counts = repo.list().await?;
    if output == Output::Json {
        return Ok(serde_json::to_string_pretty(&counts)?);
    }
    Ok(render_till(&counts, shop))
}

fn render_till(counts: &[Denomination], shop: &ShopProfile) -> String {
    if counts.is_empty() {
        return "Till has no registered denominations\n".to_string();
    }

    let mut out = String::from("Denomination      Count         Value\n");
    let mut total = 0;
    for d in counts {
        let value = d.value * d.count_available;
        total += value;
        out.push_str(&format!(
            "{:>12}  {:>9}  {:>12}\n",
            shop.format_rupees(d.value),
            d.count_available,
            shop.format_rupees(value)
        ));
    }
    out.push_str(&format!("{:>12}  {:>9}  {:>12}\n", "Total", "", shop.format_rupees(total)));
    out
}

/// Parses `VALUE=COUNT` as given to `till --set`.
pub fn parse_till_update(s: &str) -> Result<(i64, i64), String> {
    let (value, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected VALUE=COUNT, got {:?}", s))?;

    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("bad denomination value {:?}", value))?;
    let count = count
        .trim()
        .parse()
        .map_err(|_| format!("bad count {:?}", count))?;

    Ok((value, count))
}

// =============================================================================
// Rendering
// =============================================================================

fn render_bill(
    completed: &CompletedBill,
    shop: &ShopProfile,
    output: Output,
) -> anyhow::Result<String> {
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(completed)?),
        Output::Text => Ok(Invoice::from_bill(completed, shop).document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{Money, TaxRate};
    use till_db::{new_product, DbConfig, DbError};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&new_product(
                "RICE-5KG",
                "Basmati Rice 5kg",
                Money::from_rupees(100),
                TaxRate::from_bps(1800),
                10,
            ))
            .await
            .unwrap();
        db.denominations().register(&[100, 50, 10, 1]).await.unwrap();
        db
    }

    fn quiet_config() -> RegisterConfig {
        let mut config = RegisterConfig::default();
        config.notification.enabled = false;
        config
    }

    #[test]
    fn test_parse_till_update() {
        assert_eq!(parse_till_update("500=4"), Ok((500, 4)));
        assert_eq!(parse_till_update(" 10 = 0 "), Ok((10, 0)));
        assert!(parse_till_update("500").is_err());
        assert!(parse_till_update("five=4").is_err());
    }

    #[tokio::test]
    async fn test_checkout_then_lookup() {
        let db = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(
            &path,
            r#"{
                "customer_email": "asha@example.in",
                "cash_paid": "300",
                "lines": [{ "product_code": "RICE-5KG", "quantity": 2 }],
                "till": [{ "value": 50, "count": 1 }, { "value": 10, "count": 2 }]
            }"#,
        )
        .unwrap();

        let config = quiet_config();
        let text = checkout(&db, &config, &path, Output::Text).await.unwrap();
        assert!(text.contains("Bill #1"));

        let json = show_bill(&db, &config.shop, BillKey::Number(1), Output::Json)
            .await
            .unwrap();
        let completed: CompletedBill = serde_json::from_str(&json).unwrap();
        assert_eq!(completed.bill.balance_to_customer(), Money::from_rupees(64));
        // 64 = 50 + 10, then no 1s left in the reported till
        assert_eq!(completed.bill.change_shortfall, 4);

        let listing = history(&db, &config.shop, "asha@example.in", 10, Output::Text)
            .await
            .unwrap();
        assert!(listing.contains("#1"));

        assert!(show_bill(&db, &config.shop, BillKey::Number(9), Output::Text)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_checkout_spools_invoice() {
        let db = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(
            &path,
            r#"{
                "customer_email": "ravi@example.in",
                "cash_paid": "118",
                "lines": [{ "product_code": "RICE-5KG", "quantity": 1 }]
            }"#,
        )
        .unwrap();

        let mut config = RegisterConfig::default();
        config.notification.spool_dir = Some(dir.path().join("spool"));

        checkout(&db, &config, &path, Output::Text).await.unwrap();

        let spooled = std::fs::read_to_string(dir.path().join("spool").join("invoice_bill_1.txt"))
            .unwrap();
        assert!(spooled.contains("Bill #1"));
    }

    #[tokio::test]
    async fn test_rejected_checkout_reports_reason() {
        let db = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(
            &path,
            r#"{
                "customer_email": "asha@example.in",
                "cash_paid": "10",
                "lines": [{ "product_code": "RICE-5KG", "quantity": 1 }]
            }"#,
        )
        .unwrap();

        let err = checkout(&db, &quiet_config(), &path, Output::Text)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient payment"));
        assert_eq!(db.bills().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_till_updates_and_lists() {
        let db = setup().await;
        let shop = ShopProfile::default();

        let text = till(&db, &shop, &[(100, 3), (1, 7)], Output::Text)
            .await
            .unwrap();
        assert!(text.contains("307"));

        let err = till(&db, &shop, &[(100, -1)], Output::Text)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::Validation(_))
        ));
    }
}

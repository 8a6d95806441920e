//! # Invoice Rendering
//!
//! Builds the customer-facing invoice for a committed bill: a short
//! plain-text message plus a document listing items, totals and change.
//! The document is plain text; turning it into a PDF is the mailer's job.
//!
//! ## Invoice Layout
//! ```text
//! To:      asha@example.in
//! Subject: Invoice for Bill #42
//!
//! Dear Customer (asha@example.in),
//!
//! Total without tax: ₹1998.00
//! ...
//! ─────────────── document ───────────────
//! Kirana Stores
//! 12 MG Road
//! Bill #42                2026-10-14 10:31
//! RICE-5KG Basmati Rice   3 × ₹666.00 ...
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use till_core::money::Money;
use till_core::types::CompletedBill;

// =============================================================================
// Shop Profile
// =============================================================================

/// Shop details printed on every invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopProfile {
    /// Shop name (invoice header)
    pub name: String,

    /// Currency symbol for display
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Address lines
    #[serde(default)]
    pub address: Vec<String>,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for ShopProfile {
    fn default() -> Self {
        ShopProfile {
            name: "Till Store".to_string(),
            currency_symbol: default_currency_symbol(),
            address: Vec::new(),
        }
    }
}

impl ShopProfile {
    /// Formats an amount with the shop's currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_notify::ShopProfile;
    ///
    /// let shop = ShopProfile::default();
    /// assert_eq!(shop.format_currency(Money::from_paise(235_760)), "₹2357.60");
    /// assert_eq!(shop.format_currency(Money::from_paise(-150)), "-₹1.50");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{}{}.{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.rupees().abs(),
            amount.paise_part()
        )
    }

    /// Formats a whole-rupee count (denominations, shortfall).
    pub fn format_rupees(&self, rupees: i64) -> String {
        format!("{}{}", self.currency_symbol, rupees)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A rendered invoice, ready for a notifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub bill_id: String,
    pub bill_number: i64,
    /// Customer email the invoice goes to.
    pub recipient: String,
    pub subject: String,
    /// Short message body.
    pub body: String,
    /// Full invoice document (stands in for the PDF attachment).
    pub document: String,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Renders the invoice for `completed`.
    pub fn from_bill(completed: &CompletedBill, shop: &ShopProfile) -> Self {
        let bill = &completed.bill;

        Invoice {
            bill_id: bill.id.clone(),
            bill_number: bill.bill_number,
            recipient: bill.customer_email.clone(),
            subject: format!("Invoice for Bill #{}", bill.bill_number),
            body: render_body(completed, shop),
            document: render_document(completed, shop),
            created_at: bill.created_at,
        }
    }

    /// File name used when the invoice is spooled to disk.
    pub fn file_name(&self) -> String {
        format!("invoice_bill_{}.txt", self.bill_number)
    }
}

fn render_body(completed: &CompletedBill, shop: &ShopProfile) -> String {
    let bill = &completed.bill;
    let money = |m: Money| shop.format_currency(m);

    let mut lines = vec![
        format!("Dear Customer ({}),", bill.customer_email),
        String::new(),
        format!("Total without tax: {}", money(bill.total_without_tax())),
        format!("Total tax: {}", money(bill.total_tax())),
        format!("Rounded net price: {}", money(bill.rounded_net_price())),
        format!("Cash paid: {}", money(bill.cash_paid())),
        format!("Balance to you: {}", money(bill.balance_to_customer())),
    ];

    if completed.has_shortfall() {
        lines.push(format!(
            "Change not returned at the counter: {}",
            shop.format_rupees(bill.change_shortfall)
        ));
    }

    lines.extend([
        String::new(),
        "Please find your invoice below.".to_string(),
        String::new(),
        "Thank you for your purchase.".to_string(),
    ]);

    lines.join("\n")
}

// Writing into a String cannot fail, so `write!` results are discarded.
fn render_document(completed: &CompletedBill, shop: &ShopProfile) -> String {
    let bill = &completed.bill;
    let money = |m: Money| shop.format_currency(m);
    let mut doc = String::new();

    let _ = writeln!(doc, "{}", shop.name);
    for line in &shop.address {
        let _ = writeln!(doc, "{}", line);
    }
    let _ = writeln!(doc);
    let _ = writeln!(
        doc,
        "Bill #{}    {}",
        bill.bill_number,
        bill.created_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(doc, "Customer: {}", bill.customer_email);
    let _ = writeln!(doc);

    let _ = writeln!(
        doc,
        "{:<4}{:<14}{:<24}{:>5}{:>12}{:>8}{:>12}{:>12}{:>12}",
        "#", "Code", "Item", "Qty", "Unit", "Tax %", "Price", "Tax", "Total"
    );
    for item in &completed.items {
        let _ = writeln!(
            doc,
            "{:<4}{:<14}{:<24}{:>5}{:>12}{:>8}{:>12}{:>12}{:>12}",
            item.line_no + 1,
            item.product_code,
            item.product_name,
            item.quantity,
            money(item.unit_price()),
            item.tax_rate().to_string(),
            money(item.purchase_price()),
            money(item.tax_for_item()),
            money(item.total_price_for_item()),
        );
    }

    let _ = writeln!(doc);
    let _ = writeln!(doc, "Total without tax: {}", money(bill.total_without_tax()));
    let _ = writeln!(doc, "Total tax:         {}", money(bill.total_tax()));
    let _ = writeln!(doc, "Net price:         {}", money(bill.net_price()));
    let _ = writeln!(doc, "Rounded net price: {}", money(bill.rounded_net_price()));
    let _ = writeln!(doc, "Cash paid:         {}", money(bill.cash_paid()));
    let _ = writeln!(doc, "Balance:           {}", money(bill.balance_to_customer()));

    let _ = writeln!(doc);
    let _ = writeln!(doc, "Change");
    if completed.change.is_empty() {
        let _ = writeln!(doc, "  none");
    }
    for c in &completed.change {
        let _ = writeln!(doc, "  {} x {}", shop.format_rupees(c.value), c.count);
    }
    if completed.has_shortfall() {
        let _ = writeln!(
            doc,
            "  shortfall {}",
            shop.format_rupees(bill.change_shortfall)
        );
    }

    doc
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use till_core::types::{Bill, BillItem, ChangeDenomination};

    pub(crate) fn sample_bill(bill_number: i64) -> CompletedBill {
        let bill_id = format!("bill-{}", bill_number);
        CompletedBill {
            bill: Bill {
                id: bill_id.clone(),
                bill_number,
                customer_email: "asha@example.in".to_string(),
                created_at: Utc::now(),
                total_without_tax_paise: 20_000,
                total_tax_paise: 3_600,
                net_price_paise: 23_600,
                rounded_net_price_paise: 23_600,
                cash_paid_paise: 30_000,
                balance_to_customer_paise: 6_400,
                change_shortfall: 4,
            },
            items: vec![BillItem {
                id: "item-1".to_string(),
                bill_id,
                product_id: "p-1".to_string(),
                line_no: 0,
                product_code: "DAL-1KG".to_string(),
                product_name: "Toor Dal 1kg".to_string(),
                unit_price_paise: 10_000,
                tax_rate_bps: 1800,
                quantity: 2,
                purchase_price_paise: 20_000,
                tax_for_item_paise: 3_600,
                total_price_for_item_paise: 23_600,
            }],
            change: vec![
                ChangeDenomination { value: 50, count: 1 },
                ChangeDenomination { value: 10, count: 1 },
            ],
        }
    }

    #[test]
    fn test_subject_and_recipient() {
        let invoice = Invoice::from_bill(&sample_bill(42), &ShopProfile::default());
        assert_eq!(invoice.subject, "Invoice for Bill #42");
        assert_eq!(invoice.recipient, "asha@example.in");
        assert_eq!(invoice.file_name(), "invoice_bill_42.txt");
    }

    #[test]
    fn test_body_lists_totals() {
        let invoice = Invoice::from_bill(&sample_bill(1), &ShopProfile::default());
        let body = invoice.body;

        assert!(body.starts_with("Dear Customer (asha@example.in),"));
        assert!(body.contains("Total without tax: ₹200.00"));
        assert!(body.contains("Total tax: ₹36.00"));
        assert!(body.contains("Rounded net price: ₹236.00"));
        assert!(body.contains("Cash paid: ₹300.00"));
        assert!(body.contains("Balance to you: ₹64.00"));
        assert!(body.contains("Change not returned at the counter: ₹4"));
        assert!(body.ends_with("Thank you for your purchase."));
    }

    #[test]
    fn test_document_lists_items_and_change() {
        let shop = ShopProfile {
            name: "Kirana Stores".to_string(),
            currency_symbol: "Rs.".to_string(),
            address: vec!["12 MG Road".to_string()],
        };
        let doc = Invoice::from_bill(&sample_bill(3), &shop).document;

        assert!(doc.starts_with("Kirana Stores\n12 MG Road\n"));
        assert!(doc.contains("Bill #3"));
        assert!(doc.contains("DAL-1KG"));
        assert!(doc.contains("Toor Dal 1kg"));
        assert!(doc.contains("18.00%"));
        assert!(doc.contains("Rs.236.00"));
        assert!(doc.contains("  Rs.50 x 1\n"));
        assert!(doc.contains("  Rs.10 x 1\n"));
        assert!(doc.contains("  shortfall Rs.4\n"));
    }

    #[test]
    fn test_exact_change_has_no_shortfall_line() {
        let mut completed = sample_bill(5);
        completed.bill.change_shortfall = 0;
        let invoice = Invoice::from_bill(&completed, &ShopProfile::default());

        assert!(!invoice.body.contains("not returned"));
        assert!(!invoice.document.contains("shortfall"));
    }
}

//! # Line-Item Pricer
//!
//! Per-product tax and price computation, and aggregation of a whole cart
//! into bill totals.
//!
//! ## Line Formula
//! ```text
//! purchase_price       = unit_price × quantity
//! tax_for_item         = purchase_price × tax_rate   (half-up to the paisa)
//! total_price_for_item = purchase_price + tax_for_item
//!
//! ₹100.00 @ 18% × 2  →  200.00 / 36.00 / 236.00
//! ```
//!
//! ## Cart Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► qty ≤ 0? ──yes──► dropped (debug log)                        │
//! │              │ no                                                       │
//! │              ▼                                                          │
//! │     cumulative qty per product > stock? ──yes──► OutOfStock (abort)     │
//! │              │ no                                                       │
//! │              ▼                                                          │
//! │          LineQuote ──► Σ ──► BillTotals ──► round_down                  │
//! │                                                                         │
//! │  no line left ──► EmptyCart                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches storage: the whole cart is priced and checked
//! before the caller writes anything.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::{round_down, Money};
use crate::types::{Product, TaxRate};

// =============================================================================
// Line Quote
// =============================================================================

/// A priced cart line, with the product fields frozen for the bill item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineQuote {
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    pub quantity: i64,
    pub purchase_price: Money,
    pub tax_for_item: Money,
    pub total_price_for_item: Money,
}

fn quote(product: &Product, quantity: i64) -> CoreResult<LineQuote> {
    let too_large = || CoreError::AmountTooLarge {
        context: product.code.clone(),
    };

    let purchase_price = product
        .unit_price()
        .checked_multiply_quantity(quantity)
        .ok_or_else(too_large)?;
    let tax_for_item = purchase_price
        .checked_calculate_tax(product.tax_rate())
        .ok_or_else(too_large)?;
    let total_price_for_item = purchase_price
        .checked_add(tax_for_item)
        .ok_or_else(too_large)?;

    Ok(LineQuote {
        product_id: product.id.clone(),
        product_code: product.code.clone(),
        product_name: product.name.clone(),
        unit_price: product.unit_price(),
        tax_rate: product.tax_rate(),
        quantity,
        purchase_price,
        tax_for_item,
        total_price_for_item,
    })
}

/// Prices one product line.
///
/// ## Errors
/// - [`CoreError::InvalidQuantity`] when `quantity ≤ 0`
/// - [`CoreError::OutOfStock`] when `quantity > available_stock`
/// - [`CoreError::AmountTooLarge`] when the line total overflows
pub fn price_line(product: &Product, quantity: i64) -> CoreResult<LineQuote> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            code: product.code.clone(),
            quantity,
        });
    }

    if !product.can_sell(quantity) {
        return Err(CoreError::OutOfStock {
            code: product.code.clone(),
            available: product.available_stock,
            requested: quantity,
        });
    }

    quote(product, quantity)
}

// =============================================================================
// Bill Totals
// =============================================================================

/// Aggregated money fields of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillTotals {
    pub total_without_tax: Money,
    pub total_tax: Money,
    /// `total_without_tax + total_tax`, before rounding.
    pub net_price: Money,
    /// `net_price` truncated to whole rupees.
    pub rounded_net_price: Money,
}

impl BillTotals {
    /// Sums a set of priced lines.
    ///
    /// ## Errors
    /// [`CoreError::AmountTooLarge`] when a sum overflows.
    pub fn from_lines(lines: &[LineQuote]) -> CoreResult<Self> {
        let mut total_without_tax = Money::zero();
        let mut total_tax = Money::zero();
        let mut net_price = Money::zero();

        for line in lines {
            total_without_tax = total_without_tax
                .checked_add(line.purchase_price)
                .ok_or_else(bill_too_large)?;
            total_tax = total_tax
                .checked_add(line.tax_for_item)
                .ok_or_else(bill_too_large)?;
            net_price = net_price
                .checked_add(line.total_price_for_item)
                .ok_or_else(bill_too_large)?;
        }

        Ok(BillTotals {
            total_without_tax,
            total_tax,
            net_price,
            rounded_net_price: round_down(net_price),
        })
    }

    /// Balance owed to the customer for `cash_paid`.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::pricing::BillTotals;
    ///
    /// let totals = BillTotals {
    ///     total_without_tax: Money::from_paise(199_800),
    ///     total_tax: Money::from_paise(35_960),
    ///     net_price: Money::from_paise(235_760),
    ///     rounded_net_price: Money::from_rupees(2357),
    /// };
    /// let balance = totals.balance_for(Money::from_rupees(2400)).unwrap();
    /// assert_eq!(balance, Money::from_rupees(43));
    /// ```
    ///
    /// ## Errors
    /// [`CoreError::InsufficientPayment`] when cash is below the rounded total.
    pub fn balance_for(&self, cash_paid: Money) -> CoreResult<Money> {
        let balance = cash_paid - self.rounded_net_price;
        if balance.is_negative() {
            return Err(CoreError::InsufficientPayment {
                required: self.rounded_net_price,
                tendered: cash_paid,
            });
        }
        Ok(balance)
    }
}

fn bill_too_large() -> CoreError {
    CoreError::AmountTooLarge {
        context: "bill total".to_string(),
    }
}

// =============================================================================
// Cart Pricing
// =============================================================================

/// A fully priced cart: one quote per kept line, in cart order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedCart {
    pub lines: Vec<LineQuote>,
    pub totals: BillTotals,
}

impl PricedCart {
    /// Total quantity to take from each product, keyed by product id, in
    /// first-seen order.
    pub fn stock_decrements(&self) -> Vec<(String, i64)> {
        let mut out: Vec<(String, i64)> = Vec::new();
        for line in &self.lines {
            match out.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => out.push((line.product_id.clone(), line.quantity)),
            }
        }
        out
    }
}

/// Prices a whole cart of `(product, quantity)` lines.
///
/// ## Policy
/// - Lines with `quantity ≤ 0` are dropped and logged at debug. They are
///   never cart-fatal.
/// - Stock is checked against the cumulative quantity for a product across
///   all its lines; the first line that pushes past stock aborts the cart.
/// - A cart with no line left is [`CoreError::EmptyCart`].
/// - Totals that overflow are [`CoreError::AmountTooLarge`].
pub fn price_cart<'a, I>(lines: I) -> CoreResult<PricedCart>
where
    I: IntoIterator<Item = (&'a Product, i64)>,
{
    let mut requested: HashMap<&str, i64> = HashMap::new();
    let mut quotes = Vec::new();

    for (line_no, (product, quantity)) in lines.into_iter().enumerate() {
        if quantity <= 0 {
            debug!(
                line_no,
                product_code = %product.code,
                quantity,
                "Dropping cart line with non-positive quantity"
            );
            continue;
        }

        let cumulative = requested.entry(product.id.as_str()).or_insert(0);
        // Past i64 can never be in stock
        *cumulative = cumulative.saturating_add(quantity);

        if !product.can_sell(*cumulative) {
            return Err(CoreError::OutOfStock {
                code: product.code.clone(),
                available: product.available_stock,
                requested: *cumulative,
            });
        }

        quotes.push(quote(product, quantity)?);
    }

    if quotes.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let totals = BillTotals::from_lines(&quotes)?;
    Ok(PricedCart {
        lines: quotes,
        totals,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

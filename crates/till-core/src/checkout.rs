//! # Checkout Planning
//!
//! Everything a commit decides before it writes: priced lines, totals,
//! balance, change and the till counts to persist. The database layer turns
//! a [`CheckoutPlan`] into rows inside one transaction.
//!
//! ```text
//! (product, qty)* ──► price_cart ──► BillTotals ──► balance_for(cash)
//!                                                        │
//!                              TillSnapshot ──► compute_change(balance.rupees())
//!                                                        │
//!                                                        ▼
//!                                                  CheckoutPlan
//! ```

use serde::Serialize;
use tracing::warn;

use crate::change::{compute_change, ChangeBreakdown, TillSnapshot};
use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing::{price_cart, PricedCart};
use crate::types::Product;

/// The outcome of a successful checkout computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPlan {
    pub cart: PricedCart,
    pub cash_paid: Money,
    pub balance_to_customer: Money,
    pub change: ChangeBreakdown,
    /// Till counts once the change is handed out.
    pub till_after: TillSnapshot,
}

impl CheckoutPlan {
    /// Whole rupees the till could not return.
    #[inline]
    pub fn change_shortfall(&self) -> i64 {
        self.change.remainder
    }
}

/// Prices the cart, settles payment and computes change.
///
/// Change is made for the whole-rupee part of the balance; paise tendered
/// above a rupee are not returned.
///
/// ## Errors
/// `OutOfStock`, `EmptyCart`, `AmountTooLarge` and `InsufficientPayment`
/// from the pricer.
/// A till short of change is not an error: see
/// [`CheckoutPlan::change_shortfall`].
pub fn plan_checkout<'a, I>(
    lines: I,
    cash_paid: Money,
    till: &TillSnapshot,
) -> CoreResult<CheckoutPlan>
where
    I: IntoIterator<Item = (&'a Product, i64)>,
{
    let cart = price_cart(lines)?;
    let balance_to_customer = cart.totals.balance_for(cash_paid)?;

    let change = compute_change(balance_to_customer.rupees(), till);
    if !change.is_exact() {
        warn!(
            balance = %balance_to_customer,
            remaining_change = change.remainder,
            "Till cannot return exact change"
        );
    }

    let till_after = till.after(&change);

    Ok(CheckoutPlan {
        cart,
        cash_paid,
        balance_to_customer,
        change,
        till_after,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

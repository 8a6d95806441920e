//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │  Denomination   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  value (₹)      │       │
//! │  │  code (business)│   │  bill_number    │   │  count_available│       │
//! │  │  available_stock│   │  totals (paise) │   └─────────────────┘       │
//! │  │  unit_price     │   │  change_short.. │                              │
//! │  └─────────────────┘   └────────┬────────┘                              │
//! │                                 │ owns (cascade)                        │
//! │                     ┌───────────┴───────────┐                           │
//! │            ┌────────┴────────┐   ┌──────────┴──────────┐                │
//! │            │    BillItem     │   │ ChangeDenomination  │                │
//! │            │  snapshots of   │   │  (value, count)     │                │
//! │            │  code/name/price│   └─────────────────────┘                │
//! │            └─────────────────┘                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products and bills have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (`code`, `bill_number`) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18.00% (GST slab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Shows the rate as a two-decimal percentage (`18.00%`).
impl std::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code, unique across the catalogue (e.g. `RICE-5KG`).
    pub code: String,

    /// Display name shown on the invoice.
    pub name: String,

    /// Units on hand. Only a commit decrements it, never below zero.
    pub available_stock: i64,

    /// Price in paise.
    pub unit_price_paise: i64,

    /// Tax rate in basis points (1800 = 18%).
    pub tax_rate_bps: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.available_stock
    }
}

// =============================================================================
// Denomination
// =============================================================================

/// A note or coin held by the till.
///
/// `value` is in whole rupees. Lists of denominations are always handled in
/// descending value order (see [`crate::change::TillSnapshot`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Denomination {
    pub value: i64,
    pub count_available: i64,
}

impl Denomination {
    #[inline]
    pub const fn new(value: i64, count_available: i64) -> Self {
        Denomination {
            value,
            count_available,
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One requested line of a cart: a product code and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_code: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_code: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            product_code: product_code.into(),
            quantity,
        }
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A completed transaction. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: String,
    /// Monotonic number shown on the invoice as `Bill #N`.
    pub bill_number: i64,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
    pub total_without_tax_paise: i64,
    pub total_tax_paise: i64,
    /// Taxed total before rounding.
    pub net_price_paise: i64,
    /// Taxed total truncated to whole rupees.
    pub rounded_net_price_paise: i64,
    pub cash_paid_paise: i64,
    pub balance_to_customer_paise: i64,
    /// Whole rupees of the balance the till could not return (0 for exact change).
    pub change_shortfall: i64,
}

impl Bill {
    #[inline]
    pub fn total_without_tax(&self) -> Money {
        Money::from_paise(self.total_without_tax_paise)
    }

    #[inline]
    pub fn total_tax(&self) -> Money {
        Money::from_paise(self.total_tax_paise)
    }

    #[inline]
    pub fn net_price(&self) -> Money {
        Money::from_paise(self.net_price_paise)
    }

    #[inline]
    pub fn rounded_net_price(&self) -> Money {
        Money::from_paise(self.rounded_net_price_paise)
    }

    #[inline]
    pub fn cash_paid(&self) -> Money {
        Money::from_paise(self.cash_paid_paise)
    }

    #[inline]
    pub fn balance_to_customer(&self) -> Money {
        Money::from_paise(self.balance_to_customer_paise)
    }
}

// =============================================================================
// Bill Item
// =============================================================================

/// A line item on a bill.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillItem {
    pub id: String,
    pub bill_id: String,
    pub product_id: String,
    /// Position of the line in the cart (0-based).
    pub line_no: i64,
    /// Code at time of sale (frozen).
    pub product_code: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price in paise at time of sale (frozen).
    pub unit_price_paise: i64,
    /// Tax rate at time of sale (frozen).
    pub tax_rate_bps: u32,
    pub quantity: i64,
    /// unit_price × quantity
    pub purchase_price_paise: i64,
    pub tax_for_item_paise: i64,
    /// purchase_price + tax_for_item
    pub total_price_for_item_paise: i64,
}

impl BillItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_paise(self.purchase_price_paise)
    }

    #[inline]
    pub fn tax_for_item(&self) -> Money {
        Money::from_paise(self.tax_for_item_paise)
    }

    #[inline]
    pub fn total_price_for_item(&self) -> Money {
        Money::from_paise(self.total_price_for_item_paise)
    }
}

// =============================================================================
// Change Denomination
// =============================================================================

/// How many units of one denomination were returned for a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ChangeDenomination {
    pub value: i64,
    pub count: i64,
}

// =============================================================================
// Completed Bill
// =============================================================================

/// Read model of a committed bill: the bill row, its items in cart order
/// and its change in descending denomination order.
///
/// This is what the commit returns and what the notification path receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedBill {
    pub bill: Bill,
    pub items: Vec<BillItem>,
    pub change: Vec<ChangeDenomination>,
}

impl CompletedBill {
    /// Rupees actually handed back, in whole rupees.
    pub fn change_returned(&self) -> i64 {
        self.change.iter().map(|c| c.value * c.count).sum()
    }

    /// Checks if the till was short of exact change.
    #[inline]
    pub fn has_shortfall(&self) -> bool {
        self.bill.change_shortfall > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

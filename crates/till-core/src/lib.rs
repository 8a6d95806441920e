//! # till-core: Pure Business Logic for Till
//!
//! This crate is the **heart** of Till. It contains all billing logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/register (CLI)                          │   │
//! │  │       checkout ──► bill ──► history ──► till                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  pricing  │  │  change   │  │ checkout  │  │   │
//! │  │   │   Money   │  │ LineQuote │  │ greedy    │  │   plan    │  │   │
//! │  │   │round_down │  │BillTotals │  │ breakdown │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          till-db (SQLite, atomic commit) + till-notify          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer paise, rounding utility
//! - [`pricing`] - Line-item pricer and cart aggregation
//! - [`change`] - Greedy change breakdown over a till snapshot
//! - [`checkout`] - Pricing + payment + change as one plan
//! - [`types`] - Domain types (Product, Bill, Denomination, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::change::{compute_change, TillSnapshot};
//! use till_core::types::Denomination;
//!
//! let till = TillSnapshot::new(vec![
//!     Denomination::new(500, 2),
//!     Denomination::new(100, 3),
//!     Denomination::new(50, 1),
//! ])
//! .unwrap();
//!
//! let change = compute_change(650, &till);
//! assert_eq!(change.paid_out(), 650);
//! assert_eq!(change.remainder, 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod change;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use change::{compute_change, ChangeBreakdown, ChangeLine, TillSnapshot};
pub use checkout::{plan_checkout, CheckoutPlan};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{round_down, Money};
pub use pricing::{price_cart, price_line, BillTotals, LineQuote, PricedCart};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps the commit transaction short.
pub const MAX_CART_LINES: usize = 100;

/// Standard Indian notes and coins in rupees, descending.
///
/// Used to register the till's denominations on a fresh database.
pub const STANDARD_DENOMINATIONS: [i64; 10] = [2000, 500, 200, 100, 50, 20, 10, 5, 2, 1];

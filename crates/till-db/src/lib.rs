//! # till-db: Database Layer for Till
//!
//! SQLite persistence for the till and the atomic checkout commit.
//! It uses sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Till Data Flow                                │
//! │                                                                         │
//! │  register checkout --request cart.json                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐   │   │
//! │  │   │CheckoutService│  │  Repositories │  │    Migrations    │   │   │
//! │  │   │ (checkout.rs) │─►│ ProductRepo   │  │    (embedded)    │   │   │
//! │  │   │ till lock +   │  │ Denomination  │  │ 001_initial.sql  │   │   │
//! │  │   │ one tx        │  │ BillRepo      │  │                  │   │   │
//! │  │   └───────┬───────┘  └───────┬───────┘  └──────────────────┘   │   │
//! │  │           │   Database (pool.rs)                                │   │
//! │  └───────────┼─────────────────┼───────────────────────────────────┘   │
//! │              │                 ▼                                        │
//! │              │        SQLite (WAL, foreign keys on)                     │
//! │              ▼                                                          │
//! │     till-notify queue (after commit, fire-and-forget)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration and the till lock
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product, denomination and bill repositories
//! - [`checkout`] - The transaction commit orchestrator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{CheckoutRequest, CheckoutService, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/till.db")).await?;
//!
//! let service = CheckoutService::new(db.clone(), None);
//! let completed = service.commit(request).await?;
//!
//! let history = db.bills().list_for_customer("asha@example.in", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::denomination::DenominationRepository;
pub use repository::product::{new_product, ProductRepository};

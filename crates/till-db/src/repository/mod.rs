//! # Repository Module
//!
//! Database repository implementations for Till.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command / CheckoutService                                          │
//! │       │                                                                 │
//! │       │  db.bills().list_for_customer("a@b.in", 20)                     │
//! │       ▼                                                                 │
//! │  BillRepository                                                         │
//! │  ├── get_completed(&self, id)      ← pool-backed public API             │
//! │  ├── list_for_customer(&self, ..)                                       │
//! │  └── insert_bill(conn, ..)         ← pub(crate), takes the commit's     │
//! │       │                              transaction connection             │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write helpers take a `&mut SqliteConnection` so the checkout commit can
//! run them on its transaction; public methods acquire a pooled connection
//! and call the same helpers.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalogue and stock
//! - [`DenominationRepository`](denomination::DenominationRepository) - Till counts
//! - [`BillRepository`](bill::BillRepository) - Bills, items and change history

pub mod bill;
pub mod denomination;
pub mod product;

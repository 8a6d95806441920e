//! # Product Repository
//!
//! Database operations for the product catalogue.
//!
//! ## Key Operations
//! - Lookup by id or business code
//! - CRUD with validation of codes, prices and tax rates
//! - Stock updates (restocking) and the guarded decrement used by checkout
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Guarded Stock Update                                 │
//! │                                                                         │
//! │  UPDATE products                                                        │
//! │     SET available_stock = available_stock - ?qty                        │
//! │   WHERE id = ?id AND available_stock >= ?qty                            │
//! │                                                                         │
//! │  rows_affected == 1  → decremented                                      │
//! │  rows_affected == 0  → stock moved under us: fail the transaction       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::validation::{
    validate_price_paise, validate_product_code, validate_product_name, validate_stock,
    validate_tax_rate_bps,
};
use till_core::{Money, Product, TaxRate};

const PRODUCT_COLUMNS: &str = r#"
    id,
    code,
    name,
    available_stock,
    unit_price_paise,
    tax_rate_bps,
    created_at,
    updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let rice = new_product(
///     "RICE-5KG",
///     "Basmati Rice 5kg",
///     Money::from_rupees(450),
///     TaxRate::from_bps(500),
///     40,
/// );
/// repo.insert(&rice).await?;
///
/// let found = repo.get_by_code("RICE-5KG").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its business code (e.g. `"RICE-5KG"`).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut *conn, code).await
    }

    /// Lists products ordered by code.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY code LIMIT ?1",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Counts products in the catalogue.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    /// * `Err(DbError::Validation)` - A field failed validation
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(code = %product.code, "Inserting product");
        validate_fields(product)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, available_stock,
                unit_price_paise, tax_rate_bps, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.available_stock)
        .bind(product.unit_price_paise)
        .bind(product.tax_rate_bps)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&product.code))?;

        Ok(product.clone())
    }

    /// Updates code, name, price, tax rate and stock of an existing product.
    ///
    /// Bills already issued keep their snapshot of the old values.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");
        validate_fields(product)?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                available_stock = ?4,
                unit_price_paise = ?5,
                tax_rate_bps = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.available_stock)
        .bind(product.unit_price_paise)
        .bind(product.tax_rate_bps)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&product.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Changes the price and tax rate of a product.
    pub async fn update_price(&self, id: &str, price: Money, tax_rate: TaxRate) -> DbResult<()> {
        debug!(id = %id, price = %price, tax_rate = %tax_rate, "Updating price");
        validate_price_paise(price.paise())?;
        validate_tax_rate_bps(tax_rate.bps())?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET unit_price_paise = ?2, tax_rate_bps = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price.paise())
        .bind(tax_rate.bps())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adjusts stock by `delta` (positive for restocking).
    ///
    /// Fails with `QueryFailed` if the result would be negative.
    pub async fn update_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Updating stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET available_stock = available_stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// A product that appears on any bill cannot be deleted:
    /// `Err(DbError::ForeignKeyViolation)`.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Connection-level helpers (shared with the checkout transaction)
// =============================================================================

pub(crate) async fn fetch_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE code = ?1", PRODUCT_COLUMNS);

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

/// Takes `quantity` units from stock, refusing to go below zero.
pub(crate) async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET available_stock = available_stock - ?2, updated_at = ?3
        WHERE id = ?1 AND available_stock >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "stock for product {} changed during checkout",
            id
        )));
    }

    Ok(())
}

fn validate_fields(product: &Product) -> DbResult<()> {
    validate_product_code(&product.code)?;
    validate_product_name(&product.name)?;
    validate_price_paise(product.unit_price_paise)?;
    validate_tax_rate_bps(product.tax_rate_bps)?;
    validate_stock(product.available_stock)?;
    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Generates a new UUID v4 for a product.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Creates a new product with a fresh id and timestamps.
///
/// ## Example
/// ```rust,ignore
/// let product = new_product(
///     "MILK-1L",
///     "Toned Milk 1L",
///     Money::from_paise(6_800),
///     TaxRate::zero(),
///     24,
/// );
/// ```
pub fn new_product(
    code: &str,
    name: &str,
    unit_price: Money,
    tax_rate: TaxRate,
    available_stock: i64,
) -> Product {
    let now = Utc::now();
    Product {
        id: generate_product_id(),
        code: code.to_string(),
        name: name.to_string(),
        available_stock,
        unit_price_paise: unit_price.paise(),
        tax_rate_bps: tax_rate.bps(),
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

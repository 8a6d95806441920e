//! # Denomination Repository
//!
//! The till: which notes and coins are registered and how many of each are
//! on hand. Values are whole rupees; reads always come back descending.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use till_core::validation::{validate_denomination_count, validate_denomination_value};
use till_core::Denomination;

/// Repository for the till's denomination counts.
#[derive(Debug, Clone)]
pub struct DenominationRepository {
    pool: SqlitePool,
}

impl DenominationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DenominationRepository { pool }
    }

    /// All registered denominations, largest first.
    pub async fn list(&self) -> DbResult<Vec<Denomination>> {
        let mut conn = self.pool.acquire().await?;
        fetch_all(&mut *conn).await
    }

    /// Registered values, largest first.
    pub async fn values(&self) -> DbResult<Vec<i64>> {
        let mut conn = self.pool.acquire().await?;
        fetch_values(&mut *conn).await
    }

    pub async fn get(&self, value: i64) -> DbResult<Option<Denomination>> {
        let denomination = sqlx::query_as::<_, Denomination>(
            "SELECT value, count_available FROM denominations WHERE value = ?1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(denomination)
    }

    /// Sets the count on hand for `value`, registering it if new.
    ///
    /// Used by the operator when the till is counted or topped up.
    pub async fn set_count(&self, value: i64, count: i64) -> DbResult<()> {
        debug!(value, count, "Setting denomination count");
        validate_denomination_value(value)?;
        validate_denomination_count(count)?;

        let mut conn = self.pool.acquire().await?;
        write_count(&mut *conn, value, count).await
    }

    /// Registers `values` with a zero count. Already registered values keep
    /// their counts.
    pub async fn register(&self, values: &[i64]) -> DbResult<()> {
        for value in values {
            validate_denomination_value(*value)?;
        }

        let mut tx = self.pool.begin().await?;
        for value in values {
            sqlx::query(
                "INSERT OR IGNORE INTO denominations (value, count_available) VALUES (?1, 0)",
            )
            .bind(*value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(count = values.len(), "Registered denominations");
        Ok(())
    }
}

// =============================================================================
// Connection-level helpers (shared with the checkout transaction)
// =============================================================================

pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Denomination>> {
    let rows = sqlx::query_as::<_, Denomination>(
        "SELECT value, count_available FROM denominations ORDER BY value DESC",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

pub(crate) async fn fetch_values(conn: &mut SqliteConnection) -> DbResult<Vec<i64>> {
    let values: Vec<i64> = sqlx::query_scalar("SELECT value FROM denominations ORDER BY value DESC")
        .fetch_all(&mut *conn)
        .await?;

    Ok(values)
}

pub(crate) async fn write_count(
    conn: &mut SqliteConnection,
    value: i64,
    count: i64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO denominations (value, count_available) VALUES (?1, ?2)
        ON CONFLICT (value) DO UPDATE SET count_available = excluded.count_available
        "#,
    )
    .bind(value)
    .bind(count)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

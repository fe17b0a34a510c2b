//! Postgres-backed stock ledger.
//!
//! ## Error Mapping
//!
//! | SQLx error                        | Code    | `StoreError`              |
//! |-----------------------------------|---------|---------------------------|
//! | Database (unique violation)       | `23505` | `Uniqueness`              |
//! | Database (foreign key violation)  | `23503` | `ReferenceIntegrity`      |
//! | Database (check violation)        | `23514` | `Domain(Validation)`      |
//! | Database (other) / pool / network | any     | `Backend`                 |
//!
//! ## Concurrency
//!
//! A receipt is one transaction: the product row is bumped with
//! `current_quantity = current_quantity + $1`, which takes the row lock, then
//! the supply item is inserted. Concurrent receipts for one product queue on
//! that lock, so no increment is lost.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use twotails_core::{DomainError, Entity, ProductId};
use twotails_inventory::SupplyItem;

use crate::config::BackofficeConfig;
use crate::error::{StoreError, StoreResult};
use crate::ledger::{StockLedger, StockLevel};

const SCHEMA: &str = include_str!("../sql/schema.sql");

#[derive(Debug, Clone)]
pub struct PostgresStockLedger {
    pool: Arc<PgPool>,
}

impl PostgresStockLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool from `database_url` / `max_connections`.
    pub async fn connect(config: &BackofficeConfig) -> StoreResult<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::Backend("database_url is not configured".to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connection", "connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create any missing tables. Idempotent.
    pub async fn apply_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("schema", "apply_schema", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl StockLedger for PostgresStockLedger {
    #[instrument(
        skip(self, item),
        fields(
            supply_item_id = %item.id(),
            product_id = %item.product_id(),
            quantity = item.quantity(),
            %occurred_at
        ),
        err
    )]
    async fn record_supply_item(&self, item: &SupplyItem, occurred_at: DateTime<Utc>) -> StoreResult<StockLevel> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("supply item", "begin_transaction", e))?;

        let supply = sqlx::query("SELECT id FROM supplies WHERE id = $1 FOR SHARE")
            .bind(item.supply_id().as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("supply", "lock_supply", e))?;
        if supply.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("supply item", "rollback", e))?;
            return Err(StoreError::missing_reference("supply", item.supply_id()));
        }

        let row = sqlx::query(
            r#"
            UPDATE products
            SET current_quantity = current_quantity + $1,
                last_delivery_quantity = $1
            WHERE id = $2
            RETURNING id, current_quantity, last_delivery_quantity
            "#,
        )
        .bind(i64::from(item.quantity()))
        .bind(item.product_id().as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("product", "bump_stock", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("supply item", "rollback", e))?;
            return Err(StoreError::missing_reference("product", item.product_id()));
        };
        let level = stock_level_from_row(&row)?;

        sqlx::query("INSERT INTO supply_items (id, supply_id, product_id, quantity) VALUES ($1, $2, $3, $4)")
            .bind(item.id().as_uuid())
            .bind(item.supply_id().as_uuid())
            .bind(item.product_id().as_uuid())
            .bind(i64::from(item.quantity()))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("supply item", "insert_supply_item", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("supply item", "commit_transaction", e))?;

        info!(
            product_id = %level.product_id,
            current_quantity = level.current_quantity,
            "supply received"
        );
        Ok(level)
    }

    #[instrument(skip(self), err)]
    async fn stock_level(&self, product_id: ProductId) -> StoreResult<StockLevel> {
        let row = sqlx::query("SELECT id, current_quantity, last_delivery_quantity FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("product", "stock_level", e))?;

        match row {
            Some(row) => stock_level_from_row(&row),
            None => Err(StoreError::not_found("product", product_id)),
        }
    }
}

fn stock_level_from_row(row: &PgRow) -> StoreResult<StockLevel> {
    let read = |column: &str| -> StoreResult<u32> {
        let value: i64 = row
            .try_get(column)
            .map_err(|e| StoreError::Backend(format!("failed to read {column}: {e}")))?;
        u32::try_from(value).map_err(|_| StoreError::Backend(format!("{column} out of range: {value}")))
    };
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::Backend(format!("failed to read id: {e}")))?;

    Ok(StockLevel {
        product_id: ProductId::from_uuid(id),
        current_quantity: read("current_quantity")?,
        last_delivery_quantity: read("last_delivery_quantity")?,
    })
}

/// Map a SQLx error onto the store error model (see the table above).
fn map_sqlx_error(entity: &'static str, operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();

            match db_err.code().as_deref() {
                Some("23505") => StoreError::Uniqueness {
                    entity,
                    field: constraint,
                    value: db_err.message().to_string(),
                },
                Some("23503") => StoreError::ReferenceIntegrity { entity, id: constraint },
                Some("23514") => StoreError::Domain(DomainError::validation(msg)),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        sqlx::Error::RowNotFound => StoreError::Backend(format!("unexpected row not found in {operation}")),
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

//! Stock replenishment seam shared by the in-memory and Postgres backends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::ProductId;
use twotails_inventory::SupplyItem;

use crate::error::StoreResult;

/// Stock counters of one product after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub current_quantity: u32,
    pub last_delivery_quantity: u32,
}

/// Books supply line items against product stock.
///
/// Implementations must:
/// - insert the supply item and bump the product counters in one unit of work
/// - fail with `ReferenceIntegrity` before any write when the supply or the
///   product is missing
/// - never lose an increment under concurrent receipts for the same product
#[async_trait::async_trait]
pub trait StockLedger: Send + Sync {
    /// `last_delivery_quantity = q`, `current_quantity += q`, item inserted.
    async fn record_supply_item(&self, item: &SupplyItem, occurred_at: DateTime<Utc>) -> StoreResult<StockLevel>;

    async fn stock_level(&self, product_id: ProductId) -> StoreResult<StockLevel>;
}

#[async_trait::async_trait]
impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    async fn record_supply_item(&self, item: &SupplyItem, occurred_at: DateTime<Utc>) -> StoreResult<StockLevel> {
        (**self).record_supply_item(item, occurred_at).await
    }

    async fn stock_level(&self, product_id: ProductId) -> StoreResult<StockLevel> {
        (**self).stock_level(product_id).await
    }
}

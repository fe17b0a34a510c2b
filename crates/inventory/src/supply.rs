use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::{Entity, ProductId, SupplierId, SupplyId, SupplyItemId};
use twotails_products::ReceiveSupply;

/// Incoming stock batch from a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    id: SupplyId,
    supplier_id: SupplierId,
    date: NaiveDate,
}

impl Supply {
    /// The supply date is fixed to the day it was recorded.
    pub fn open(id: SupplyId, supplier_id: SupplierId, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id,
            supplier_id,
            date: occurred_at.date_naive(),
        }
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Entity for Supply {
    type Id = SupplyId;
    const NAME: &'static str = "supply";

    fn id(&self) -> &SupplyId {
        &self.id
    }
}

/// Line item of a supply: how many units of one product arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyItem {
    id: SupplyItemId,
    supply_id: SupplyId,
    product_id: ProductId,
    quantity: u32,
}

impl SupplyItem {
    pub fn new(id: SupplyItemId, supply_id: SupplyId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            id,
            supply_id,
            product_id,
            quantity,
        }
    }

    pub fn supply_id(&self) -> SupplyId {
        self.supply_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Command that books this line onto the product's stock counters.
    pub fn receipt(&self, occurred_at: DateTime<Utc>) -> ReceiveSupply {
        ReceiveSupply {
            product_id: self.product_id,
            quantity: self.quantity,
            occurred_at,
        }
    }
}

impl Entity for SupplyItem {
    type Id = SupplyItemId;
    const NAME: &'static str = "supply item";

    fn id(&self) -> &SupplyItemId {
        &self.id
    }
}

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::{DeliveryId, DeliveryItemId, DomainError, Entity, ProductId, SupplierId};

/// Delivery status. Any value may be set at any time; there is no
/// transition table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Assembling,
    InProgress,
    Received,
    Canceled,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 7] = [
        DeliveryStatus::Pending,
        DeliveryStatus::Confirmed,
        DeliveryStatus::Rejected,
        DeliveryStatus::Assembling,
        DeliveryStatus::InProgress,
        DeliveryStatus::Received,
        DeliveryStatus::Canceled,
    ];

    /// Stable storage code.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Confirmed => "confirmed",
            DeliveryStatus::Rejected => "rejected",
            DeliveryStatus::Assembling => "assembling",
            DeliveryStatus::InProgress => "in_progress",
            DeliveryStatus::Received => "received",
            DeliveryStatus::Canceled => "canceled",
        }
    }

    /// Label shown to back-office staff.
    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Ожидает подтверждения",
            DeliveryStatus::Confirmed => "Подтверждена",
            DeliveryStatus::Rejected => "Отклонена",
            DeliveryStatus::Assembling => "Сборка",
            DeliveryStatus::InProgress => "В пути",
            DeliveryStatus::Received => "Исполнена",
            DeliveryStatus::Canceled => "Отменена",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown delivery status: {s}")))
    }
}

impl core::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing stock batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    id: DeliveryId,
    supplier_id: Option<SupplierId>,
    status: DeliveryStatus,
    delivered_at: DateTime<Utc>,
}

impl Delivery {
    /// New deliveries start as `Pending`, stamped with the creation time.
    pub fn open(id: DeliveryId, supplier_id: Option<SupplierId>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id,
            supplier_id,
            status: DeliveryStatus::default(),
            delivered_at: occurred_at,
        }
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn delivered_at(&self) -> DateTime<Utc> {
        self.delivered_at
    }

    pub fn set_status(&mut self, status: DeliveryStatus) {
        self.status = status;
    }

    pub fn detach_supplier(&mut self) {
        self.supplier_id = None;
    }
}

impl Entity for Delivery {
    type Id = DeliveryId;
    const NAME: &'static str = "delivery";

    fn id(&self) -> &DeliveryId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryItem {
    id: DeliveryItemId,
    delivery_id: DeliveryId,
    product_id: Option<ProductId>,
    quantity: u32,
}

impl DeliveryItem {
    pub fn new(id: DeliveryItemId, delivery_id: DeliveryId, product_id: Option<ProductId>, quantity: u32) -> Self {
        Self {
            id,
            delivery_id,
            product_id,
            quantity,
        }
    }

    pub fn delivery_id(&self) -> DeliveryId {
        self.delivery_id
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub fn detach_product(&mut self) {
        self.product_id = None;
    }
}

impl Entity for DeliveryItem {
    type Id = DeliveryItemId;
    const NAME: &'static str = "delivery item";

    fn id(&self) -> &DeliveryItemId {
        &self.id
    }
}

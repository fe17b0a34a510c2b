use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::{CartId, CartItemId, DomainError, Entity, ProductId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    Active,
    Converted,
    Abandoned,
}

impl CartStatus {
    pub const ALL: [CartStatus; 3] = [CartStatus::Active, CartStatus::Converted, CartStatus::Abandoned];

    pub fn as_str(self) -> &'static str {
        match self {
            CartStatus::Active => "active",
            CartStatus::Converted => "converted",
            CartStatus::Abandoned => "abandoned",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CartStatus::Active => "Активная",
            CartStatus::Converted => "Конвертированная",
            CartStatus::Abandoned => "Брошенная",
        }
    }
}

impl FromStr for CartStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown cart status: {s}")))
    }
}

impl core::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's shopping cart. `updated_at` moves on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    status: CartStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn open(id: CartId, user_id: UserId, status: CartStatus, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            status,
            created_at: occurred_at,
            updated_at: occurred_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn status(&self) -> CartStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_status(&mut self, status: CartStatus, occurred_at: DateTime<Utc>) {
        self.status = status;
        self.touch(occurred_at);
    }

    pub fn touch(&mut self, occurred_at: DateTime<Utc>) {
        self.updated_at = occurred_at;
    }
}

impl Entity for Cart {
    type Id = CartId;
    const NAME: &'static str = "cart";

    fn id(&self) -> &CartId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    id: CartItemId,
    cart_id: CartId,
    product_id: ProductId,
    quantity: u32,
}

impl CartItem {
    pub fn new(id: CartItemId, cart_id: CartId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            id,
            cart_id,
            product_id,
            quantity,
        }
    }

    pub fn cart_id(&self) -> CartId {
        self.cart_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}

impl Entity for CartItem {
    type Id = CartItemId;
    const NAME: &'static str = "cart item";

    fn id(&self) -> &CartItemId {
        &self.id
    }
}

/// Sum of item quantities ("total items" in cart listings).
pub fn total_items<'a>(items: impl IntoIterator<Item = &'a CartItem>) -> u64 {
    items.into_iter().map(|item| u64::from(item.quantity)).sum()
}

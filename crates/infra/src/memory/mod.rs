//! In-memory back-office store.
//!
//! Every table lives behind a single `RwLock`, so each mutating call is one
//! critical section: reference checks, cascades and counter updates either
//! all happen or none do.
//!
//! Delete policies:
//!
//! | Deleted    | Cascades to                                  | Set to null / reassigned                  |
//! |------------|----------------------------------------------|-------------------------------------------|
//! | role       | -                                            | users move to the default role            |
//! | user       | addresses, carts (+ items)                   | orders                                    |
//! | supplier   | supplies (+ items)                           | deliveries, products                      |
//! | supply     | supply items                                 | -                                         |
//! | category   | -                                            | child categories, products                |
//! | product    | supply items, cart items, promotion links    | delivery items, order items               |
//! | promotion  | promotion links                              | -                                         |
//! | delivery   | delivery items                               | -                                         |
//! | cart       | cart items                                   | -                                         |
//! | order      | -                                            | order items                               |

mod accounts;
mod catalog;
mod inventory;
mod sales;

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::info;

use twotails_auth::{Role, RoleName, User};
use twotails_core::{
    AddressId, CartId, CartItemId, CategoryId, DeliveryId, DeliveryItemId, Entity, OrderId, OrderItemId, ProductId,
    ProductPromotionId, PromotionId, RoleId, SupplierId, SupplyId, SupplyItemId, UserId,
};
use twotails_inventory::{Delivery, DeliveryItem, Supply, SupplyItem};
use twotails_parties::{Address, Supplier};
use twotails_products::{Category, Product, ProductPromotion, Promotion};
use twotails_sales::{Cart, CartItem, Order, OrderItem};

use crate::config::BackofficeConfig;
use crate::error::{StoreError, StoreResult};
use crate::ledger::{StockLedger, StockLevel};

pub use catalog::ProductFilter;

#[derive(Debug, Default)]
struct Tables {
    roles: HashMap<RoleId, Role>,
    users: HashMap<UserId, User>,
    addresses: HashMap<AddressId, Address>,
    suppliers: HashMap<SupplierId, Supplier>,
    supplies: HashMap<SupplyId, Supply>,
    supply_items: HashMap<SupplyItemId, SupplyItem>,
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    promotions: HashMap<PromotionId, Promotion>,
    product_promotions: HashMap<ProductPromotionId, ProductPromotion>,
    deliveries: HashMap<DeliveryId, Delivery>,
    delivery_items: HashMap<DeliveryItemId, DeliveryItem>,
    carts: HashMap<CartId, Cart>,
    cart_items: HashMap<CartItemId, CartItem>,
    orders: HashMap<OrderId, Order>,
    order_items: HashMap<OrderItemId, OrderItem>,
}

/// Thread-safe in-memory implementation of the whole back office.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    default_role: RoleId,
    food_category: String,
}

impl InMemoryStore {
    /// Bootstrap an empty store. The configured default role is created
    /// here, so user registration can always fall back to it.
    pub fn new(config: &BackofficeConfig) -> StoreResult<Self> {
        let name = RoleName::new(config.default_role.clone())?;
        let default_role = RoleId::new();

        let mut tables = Tables::default();
        tables.roles.insert(default_role, Role::new(default_role, name));
        info!(role = %config.default_role, role_id = %default_role, "default role created");

        Ok(Self {
            tables: RwLock::new(tables),
            default_role,
            food_category: config.food_category.clone(),
        })
    }

    pub fn default_role_id(&self) -> RoleId {
        self.default_role
    }

    pub fn food_category(&self) -> &str {
        &self.food_category
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl StockLedger for InMemoryStore {
    async fn record_supply_item(&self, item: &SupplyItem, occurred_at: DateTime<Utc>) -> StoreResult<StockLevel> {
        self.add_supply_item(item.clone(), occurred_at)
    }

    async fn stock_level(&self, product_id: ProductId) -> StoreResult<StockLevel> {
        let tables = self.read()?;
        Ok(stock_level(found(&tables.products, &product_id)?))
    }
}

fn stock_level(product: &Product) -> StockLevel {
    StockLevel {
        product_id: product.id_typed(),
        current_quantity: product.current_quantity(),
        last_delivery_quantity: product.last_delivery_quantity(),
    }
}

// ────────────────────────────────────────────────────────────────
// Table helpers
// ────────────────────────────────────────────────────────────────

fn found<'a, E>(table: &'a HashMap<E::Id, E>, id: &E::Id) -> StoreResult<&'a E>
where
    E: Entity,
    E::Id: Display,
{
    table.get(id).ok_or_else(|| StoreError::not_found(E::NAME, id))
}

fn found_mut<'a, E>(table: &'a mut HashMap<E::Id, E>, id: &E::Id) -> StoreResult<&'a mut E>
where
    E: Entity,
    E::Id: Display,
{
    table.get_mut(id).ok_or_else(|| StoreError::not_found(E::NAME, id))
}

/// The record a write points at must exist.
fn referenced<E>(table: &HashMap<E::Id, E>, id: &E::Id) -> StoreResult<()>
where
    E: Entity,
    E::Id: Display,
{
    if table.contains_key(id) {
        Ok(())
    } else {
        tracing::warn!(entity = E::NAME, id = %id, "write references a missing record");
        Err(StoreError::missing_reference(E::NAME, id))
    }
}

fn vacant<E>(table: &HashMap<E::Id, E>, id: &E::Id) -> StoreResult<()>
where
    E: Entity,
    E::Id: Display,
{
    if table.contains_key(id) {
        Err(StoreError::duplicate(E::NAME, "id", id.to_string()))
    } else {
        Ok(())
    }
}

/// Insert a fresh record keyed by its own id.
fn insert_new<E>(table: &mut HashMap<E::Id, E>, record: E) -> StoreResult<E>
where
    E: Entity + Clone,
    E::Id: Display,
{
    let id = record.id().clone();
    vacant(table, &id)?;
    table.insert(id, record.clone());
    Ok(record)
}

fn removed<E>(table: &mut HashMap<E::Id, E>, id: &E::Id) -> StoreResult<E>
where
    E: Entity,
    E::Id: Display,
{
    table.remove(id).ok_or_else(|| StoreError::not_found(E::NAME, id))
}

fn case_insensitive_contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

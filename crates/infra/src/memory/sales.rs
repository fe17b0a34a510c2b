//! Carts and orders.

use chrono::{DateTime, Utc};
use tracing::instrument;

use twotails_core::{CartId, CartItemId, Money, OrderId, OrderItemId};
use twotails_sales::{Cart, CartItem, CartStatus, Order, OrderItem, OrderStatus, items_total, total_items};

use super::{InMemoryStore, Tables, found, found_mut, insert_new, referenced, removed};
use crate::error::StoreResult;

impl InMemoryStore {
    // ────────────────────────────────────────────────────────────────
    // Carts
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, cart), err)]
    pub fn create_cart(&self, cart: Cart) -> StoreResult<Cart> {
        let mut tables = self.write()?;
        referenced(&tables.users, &cart.user_id())?;
        insert_new(&mut tables.carts, cart)
    }

    #[instrument(skip(self), err)]
    pub fn set_cart_status(&self, cart_id: CartId, status: CartStatus, occurred_at: DateTime<Utc>) -> StoreResult<Cart> {
        let mut tables = self.write()?;
        let cart = found_mut(&mut tables.carts, &cart_id)?;
        cart.set_status(status, occurred_at);
        Ok(cart.clone())
    }

    pub fn cart(&self, cart_id: CartId) -> StoreResult<Cart> {
        Ok(found(&self.read()?.carts, &cart_id)?.clone())
    }

    /// Carts in `status`, most recently updated first.
    pub fn carts_by_status(&self, status: CartStatus) -> StoreResult<Vec<Cart>> {
        let tables = self.read()?;
        let mut carts: Vec<Cart> = tables.carts.values().filter(|c| c.status() == status).cloned().collect();
        carts.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Ok(carts)
    }

    #[instrument(skip(self), err)]
    pub fn delete_cart(&self, cart_id: CartId) -> StoreResult<()> {
        let mut tables = self.write()?;
        removed(&mut tables.carts, &cart_id)?;
        tables.cart_items.retain(|_, i| i.cart_id() != cart_id);
        Ok(())
    }

    /// Add a line to a cart. The cart's `updated_at` moves to `occurred_at`.
    #[instrument(skip(self, item), err)]
    pub fn add_cart_item(&self, item: CartItem, occurred_at: DateTime<Utc>) -> StoreResult<CartItem> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        referenced(&tables.carts, &item.cart_id())?;
        referenced(&tables.products, &item.product_id())?;
        let cart_id = item.cart_id();
        let item = insert_new(&mut tables.cart_items, item)?;
        touch_cart(tables, cart_id, occurred_at)?;
        Ok(item)
    }

    pub fn set_cart_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<CartItem> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        let item = found_mut(&mut tables.cart_items, &item_id)?;
        item.set_quantity(quantity);
        let item = item.clone();
        touch_cart(tables, item.cart_id(), occurred_at)?;
        Ok(item)
    }

    pub fn remove_cart_item(&self, item_id: CartItemId, occurred_at: DateTime<Utc>) -> StoreResult<()> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        let item = removed(&mut tables.cart_items, &item_id)?;
        touch_cart(tables, item.cart_id(), occurred_at)
    }

    pub fn cart_items(&self, cart_id: CartId) -> StoreResult<Vec<CartItem>> {
        let tables = self.read()?;
        found(&tables.carts, &cart_id)?;
        Ok(tables.cart_items.values().filter(|i| i.cart_id() == cart_id).cloned().collect())
    }

    /// Total number of units in a cart.
    pub fn cart_total_items(&self, cart_id: CartId) -> StoreResult<u64> {
        let tables = self.read()?;
        found(&tables.carts, &cart_id)?;
        Ok(total_items(tables.cart_items.values().filter(|i| i.cart_id() == cart_id)))
    }

    // ────────────────────────────────────────────────────────────────
    // Orders
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, order), err)]
    pub fn create_order(&self, order: Order) -> StoreResult<Order> {
        let mut tables = self.write()?;
        if let Some(user_id) = order.user_id() {
            referenced(&tables.users, &user_id)?;
        }
        insert_new(&mut tables.orders, order)
    }

    #[instrument(skip(self), err)]
    pub fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> StoreResult<Order> {
        let mut tables = self.write()?;
        let order = found_mut(&mut tables.orders, &order_id)?;
        order.set_status(status);
        Ok(order.clone())
    }

    /// Overwrite the stored total. Totals are never derived from the items.
    #[instrument(skip(self), err)]
    pub fn set_order_total(&self, order_id: OrderId, total_amount: Money) -> StoreResult<Order> {
        let mut tables = self.write()?;
        let order = found_mut(&mut tables.orders, &order_id)?;
        order.set_total_amount(total_amount)?;
        Ok(order.clone())
    }

    pub fn order(&self, order_id: OrderId) -> StoreResult<Order> {
        Ok(found(&self.read()?.orders, &order_id)?.clone())
    }

    /// Orders in `status`, newest first.
    pub fn orders_by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>> {
        let tables = self.read()?;
        let mut orders: Vec<Order> = tables.orders.values().filter(|o| o.status() == status).cloned().collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }

    /// Delete an order. Its items stay, detached.
    #[instrument(skip(self), err)]
    pub fn delete_order(&self, order_id: OrderId) -> StoreResult<()> {
        let mut tables = self.write()?;
        removed(&mut tables.orders, &order_id)?;
        for item in tables.order_items.values_mut().filter(|i| i.order_id() == Some(order_id)) {
            item.detach_order();
        }
        Ok(())
    }

    #[instrument(skip(self, item), err)]
    pub fn add_order_item(&self, item: OrderItem) -> StoreResult<OrderItem> {
        let mut tables = self.write()?;
        if let Some(order_id) = item.order_id() {
            referenced(&tables.orders, &order_id)?;
        }
        if let Some(product_id) = item.product_id() {
            referenced(&tables.products, &product_id)?;
        }
        insert_new(&mut tables.order_items, item)
    }

    pub fn order_item(&self, item_id: OrderItemId) -> StoreResult<OrderItem> {
        Ok(found(&self.read()?.order_items, &item_id)?.clone())
    }

    pub fn order_items(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
        let tables = self.read()?;
        found(&tables.orders, &order_id)?;
        Ok(order_lines(&tables, order_id).cloned().collect())
    }

    pub fn order_items_count(&self, order_id: OrderId) -> StoreResult<usize> {
        let tables = self.read()?;
        found(&tables.orders, &order_id)?;
        Ok(order_lines(&tables, order_id).count())
    }

    /// Σ quantity × price at purchase. Reporting only; the order's stored
    /// total is left alone.
    pub fn order_items_total(&self, order_id: OrderId) -> StoreResult<Money> {
        let tables = self.read()?;
        found(&tables.orders, &order_id)?;
        Ok(items_total(order_lines(&tables, order_id))?)
    }

    pub fn delete_order_item(&self, item_id: OrderItemId) -> StoreResult<()> {
        removed(&mut self.write()?.order_items, &item_id).map(|_| ())
    }
}

fn order_lines(tables: &Tables, order_id: OrderId) -> impl Iterator<Item = &OrderItem> {
    tables.order_items.values().filter(move |i| i.order_id() == Some(order_id))
}

fn touch_cart(tables: &mut Tables, cart_id: CartId, occurred_at: DateTime<Utc>) -> StoreResult<()> {
    found_mut(&mut tables.carts, &cart_id)?.touch(occurred_at);
    Ok(())
}

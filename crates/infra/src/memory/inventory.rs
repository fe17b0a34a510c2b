//! Supplies (incoming stock) and deliveries.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use twotails_core::{Aggregate, DeliveryId, DeliveryItemId, SupplierId, SupplyId};
use twotails_inventory::{Delivery, DeliveryItem, DeliveryStatus, Supply, SupplyItem};
use twotails_products::ProductCommand;

use super::{InMemoryStore, found, found_mut, insert_new, referenced, removed, stock_level, vacant};
use crate::error::StoreResult;
use crate::ledger::StockLevel;

impl InMemoryStore {
    #[instrument(skip(self, supply), err)]
    pub fn create_supply(&self, supply: Supply) -> StoreResult<Supply> {
        let mut tables = self.write()?;
        referenced(&tables.suppliers, &supply.supplier_id())?;
        insert_new(&mut tables.supplies, supply)
    }

    pub fn supply(&self, supply_id: SupplyId) -> StoreResult<Supply> {
        Ok(found(&self.read()?.supplies, &supply_id)?.clone())
    }

    /// Supplies of one supplier, newest first.
    pub fn supplies_by_supplier(&self, supplier_id: SupplierId) -> StoreResult<Vec<Supply>> {
        let tables = self.read()?;
        let mut supplies: Vec<Supply> = tables
            .supplies
            .values()
            .filter(|s| s.supplier_id() == supplier_id)
            .cloned()
            .collect();
        supplies.sort_by(|a, b| b.date().cmp(&a.date()));
        Ok(supplies)
    }

    /// Delete a supply and its line items. Stock already booked stays.
    #[instrument(skip(self), err)]
    pub fn delete_supply(&self, supply_id: SupplyId) -> StoreResult<()> {
        let mut tables = self.write()?;
        removed(&mut tables.supplies, &supply_id)?;
        tables.supply_items.retain(|_, i| i.supply_id() != supply_id);
        Ok(())
    }

    /// Insert a supply line item and book it onto the product's stock.
    ///
    /// Reference checks, the counter update and the insert happen under one
    /// write lock, so concurrent receipts for a product never lose an
    /// increment and a failed receipt leaves nothing behind.
    #[instrument(
        skip(self, item),
        fields(supply_id = %item.supply_id(), product_id = %item.product_id(), quantity = item.quantity()),
        err
    )]
    pub fn add_supply_item(&self, item: SupplyItem, occurred_at: DateTime<Utc>) -> StoreResult<StockLevel> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        referenced(&tables.supplies, &item.supply_id())?;
        referenced(&tables.products, &item.product_id())?;
        vacant(&tables.supply_items, twotails_core::Entity::id(&item))?;

        let product = found_mut(&mut tables.products, &item.product_id())?;
        product.execute(&ProductCommand::ReceiveSupply(item.receipt(occurred_at)))?;
        let level = stock_level(product);

        insert_new(&mut tables.supply_items, item)?;
        info!(
            product_id = %level.product_id,
            current_quantity = level.current_quantity,
            last_delivery_quantity = level.last_delivery_quantity,
            "supply received"
        );
        Ok(level)
    }

    pub fn supply_items(&self, supply_id: SupplyId) -> StoreResult<Vec<SupplyItem>> {
        let tables = self.read()?;
        found(&tables.supplies, &supply_id)?;
        Ok(tables
            .supply_items
            .values()
            .filter(|i| i.supply_id() == supply_id)
            .cloned()
            .collect())
    }

    // ────────────────────────────────────────────────────────────────
    // Deliveries
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, delivery), err)]
    pub fn create_delivery(&self, delivery: Delivery) -> StoreResult<Delivery> {
        let mut tables = self.write()?;
        if let Some(supplier_id) = delivery.supplier_id() {
            referenced(&tables.suppliers, &supplier_id)?;
        }
        insert_new(&mut tables.deliveries, delivery)
    }

    /// Any status may follow any other.
    #[instrument(skip(self), err)]
    pub fn set_delivery_status(&self, delivery_id: DeliveryId, status: DeliveryStatus) -> StoreResult<Delivery> {
        let mut tables = self.write()?;
        let delivery = found_mut(&mut tables.deliveries, &delivery_id)?;
        delivery.set_status(status);
        Ok(delivery.clone())
    }

    pub fn delivery(&self, delivery_id: DeliveryId) -> StoreResult<Delivery> {
        Ok(found(&self.read()?.deliveries, &delivery_id)?.clone())
    }

    /// Deliveries in `status`, newest first.
    pub fn deliveries_by_status(&self, status: DeliveryStatus) -> StoreResult<Vec<Delivery>> {
        let tables = self.read()?;
        let mut deliveries: Vec<Delivery> = tables
            .deliveries
            .values()
            .filter(|d| d.status() == status)
            .cloned()
            .collect();
        deliveries.sort_by(|a, b| b.delivered_at().cmp(&a.delivered_at()));
        Ok(deliveries)
    }

    #[instrument(skip(self), err)]
    pub fn delete_delivery(&self, delivery_id: DeliveryId) -> StoreResult<()> {
        let mut tables = self.write()?;
        removed(&mut tables.deliveries, &delivery_id)?;
        tables.delivery_items.retain(|_, i| i.delivery_id() != delivery_id);
        Ok(())
    }

    #[instrument(skip(self, item), err)]
    pub fn add_delivery_item(&self, item: DeliveryItem) -> StoreResult<DeliveryItem> {
        let mut tables = self.write()?;
        referenced(&tables.deliveries, &item.delivery_id())?;
        if let Some(product_id) = item.product_id() {
            referenced(&tables.products, &product_id)?;
        }
        insert_new(&mut tables.delivery_items, item)
    }

    pub fn set_delivery_item_quantity(&self, item_id: DeliveryItemId, quantity: u32) -> StoreResult<DeliveryItem> {
        let mut tables = self.write()?;
        let item = found_mut(&mut tables.delivery_items, &item_id)?;
        item.set_quantity(quantity);
        Ok(item.clone())
    }

    pub fn delivery_items(&self, delivery_id: DeliveryId) -> StoreResult<Vec<DeliveryItem>> {
        let tables = self.read()?;
        found(&tables.deliveries, &delivery_id)?;
        Ok(tables
            .delivery_items
            .values()
            .filter(|i| i.delivery_id() == delivery_id)
            .cloned()
            .collect())
    }

    pub fn delete_delivery_item(&self, item_id: DeliveryItemId) -> StoreResult<()> {
        removed(&mut self.write()?.delivery_items, &item_id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::super::tests::{product_cmd, store};
    use super::*;
    use proptest::prelude::*;
    use twotails_core::{DomainError, Entity, ProductId, SupplyItemId};
    use twotails_parties::CreateSupplier;

    use crate::error::StoreError;
    use crate::ledger::StockLedger;

    fn supply(store: &InMemoryStore) -> SupplyId {
        let supplier_id = SupplierId::new();
        store
            .create_supplier(CreateSupplier {
                supplier_id,
                name: "ООО Ферма".to_string(),
                email: format!("{supplier_id}@farm.ru"),
            })
            .unwrap();
        *store
            .create_supply(Supply::open(SupplyId::new(), supplier_id, Utc::now()))
            .unwrap()
            .id()
    }

    fn receipt(supply_id: SupplyId, product_id: ProductId, quantity: u32) -> SupplyItem {
        SupplyItem::new(SupplyItemId::new(), supply_id, product_id, quantity)
    }

    #[test]
    fn receipt_sets_last_and_adds_to_current() {
        let store = store();
        let supply_id = supply(&store);
        let product = store.create_product(product_cmd("Кефир", None)).unwrap();
        let product_id = product.id_typed();

        store.add_supply_item(receipt(supply_id, product_id, 7), Utc::now()).unwrap();
        let level = store.add_supply_item(receipt(supply_id, product_id, 3), Utc::now()).unwrap();

        assert_eq!(level.current_quantity, 10);
        assert_eq!(level.last_delivery_quantity, 3);
        assert_eq!(store.supply_items(supply_id).unwrap().len(), 2);
    }

    #[test]
    fn zero_quantity_receipt_is_recorded() {
        let store = store();
        let supply_id = supply(&store);
        let product_id = store.create_product(product_cmd("Кефир", None)).unwrap().id_typed();
        store.add_supply_item(receipt(supply_id, product_id, 4), Utc::now()).unwrap();

        let level = store.add_supply_item(receipt(supply_id, product_id, 0), Utc::now()).unwrap();
        assert_eq!(level.current_quantity, 4);
        assert_eq!(level.last_delivery_quantity, 0);
    }

    #[test]
    fn missing_product_or_supply_changes_nothing() {
        let store = store();
        let supply_id = supply(&store);
        let product_id = store.create_product(product_cmd("Кефир", None)).unwrap().id_typed();

        let missing_product = store.add_supply_item(receipt(supply_id, ProductId::new(), 5), Utc::now());
        assert!(matches!(missing_product, Err(StoreError::ReferenceIntegrity { entity: "product", .. })));

        let missing_supply = store.add_supply_item(receipt(SupplyId::new(), product_id, 5), Utc::now());
        assert!(matches!(missing_supply, Err(StoreError::ReferenceIntegrity { entity: "supply", .. })));

        assert_eq!(store.product(product_id).unwrap().current_quantity(), 0);
        assert!(store.supply_items(supply_id).unwrap().is_empty());
    }

    #[test]
    fn overflowing_receipt_is_rejected_without_insert() {
        let store = store();
        let supply_id = supply(&store);
        let product_id = store.create_product(product_cmd("Кефир", None)).unwrap().id_typed();
        store.add_supply_item(receipt(supply_id, product_id, u32::MAX), Utc::now()).unwrap();

        let result = store.add_supply_item(receipt(supply_id, product_id, 1), Utc::now());
        assert!(matches!(result, Err(StoreError::Domain(DomainError::Validation(_)))));
        assert_eq!(store.supply_items(supply_id).unwrap().len(), 1);
        assert_eq!(store.product(product_id).unwrap().last_delivery_quantity(), u32::MAX);
    }

    #[test]
    fn concurrent_receipts_lose_no_updates() {
        const THREADS: u32 = 8;
        const PER_THREAD: u32 = 250;

        let store = Arc::new(store());
        let supply_id = supply(&store);
        let product_id = store.create_product(product_cmd("Кефир", None)).unwrap().id_typed();

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        store.add_supply_item(receipt(supply_id, product_id, 1), Utc::now()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let product = store.product(product_id).unwrap();
        assert_eq!(product.current_quantity(), THREADS * PER_THREAD);
        assert_eq!(product.last_delivery_quantity(), 1);
        assert_eq!(store.supply_items(supply_id).unwrap().len() as u32, THREADS * PER_THREAD);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn ledger_trait_receipts_are_serialised() {
        let store = Arc::new(store());
        let supply_id = supply(&store);
        let product_id = store.create_product(product_cmd("Кефир", None)).unwrap().id_typed();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let ledger = Arc::clone(&store);
                tokio::spawn(async move { ledger.record_supply_item(&receipt(supply_id, product_id, 2), Utc::now()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let level = store.stock_level(product_id).await.unwrap();
        assert_eq!(level.current_quantity, 100);
    }

    #[test]
    fn deliveries_filter_by_status_and_accept_any_transition() {
        let store = store();
        let delivery = store
            .create_delivery(Delivery::open(DeliveryId::new(), None, Utc::now()))
            .unwrap();
        let delivery_id = *delivery.id();

        store.set_delivery_status(delivery_id, DeliveryStatus::Received).unwrap();
        store.set_delivery_status(delivery_id, DeliveryStatus::Assembling).unwrap();

        assert!(store.deliveries_by_status(DeliveryStatus::Pending).unwrap().is_empty());
        assert_eq!(store.deliveries_by_status(DeliveryStatus::Assembling).unwrap().len(), 1);

        let unknown_supplier = store.create_delivery(Delivery::open(DeliveryId::new(), Some(SupplierId::new()), Utc::now()));
        assert!(matches!(unknown_supplier, Err(StoreError::ReferenceIntegrity { entity: "supplier", .. })));
    }

    #[test]
    fn deleting_a_delivery_cascades_its_items() {
        let store = store();
        let delivery_id = *store
            .create_delivery(Delivery::open(DeliveryId::new(), None, Utc::now()))
            .unwrap()
            .id();
        store
            .add_delivery_item(DeliveryItem::new(DeliveryItemId::new(), delivery_id, None, 3))
            .unwrap();

        store.delete_delivery(delivery_id).unwrap();
        assert!(matches!(store.delivery_items(delivery_id), Err(StoreError::NotFound { .. })));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: after any sequence of receipts, current stock is their sum and
        /// the last-delivery counter is the final quantity.
        #[test]
        fn stock_is_the_sum_of_receipts(quantities in proptest::collection::vec(0u32..10_000, 1..20)) {
            let store = store();
            let supply_id = supply(&store);
            let product_id = store.create_product(product_cmd("Кефир", None)).unwrap().id_typed();

            for q in &quantities {
                store.add_supply_item(receipt(supply_id, product_id, *q), Utc::now()).unwrap();
            }

            let product = store.product(product_id).unwrap();
            prop_assert_eq!(product.current_quantity(), quantities.iter().sum::<u32>());
            prop_assert_eq!(product.last_delivery_quantity(), *quantities.last().unwrap());
        }
    }
}

//! Suppliers, the category tree, products and promotions.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use twotails_core::{
    Aggregate, AggregateRoot, CategoryId, Entity, ExpectedVersion, ProductId, ProductPromotionId, PromotionId, SupplierId,
};
use twotails_parties::{CreateSupplier, Supplier, UpdateSupplier};
use twotails_products::{
    Category, CreateProduct, CreatePromotion, Product, ProductCommand, ProductPatch, ProductPromotion, Promotion,
    RecalculateDiscount, UpdateDetails, UpdatePromotion, check_parent, is_discount_eligible, promotions_list,
    subcategories,
};

use super::{InMemoryStore, Tables, case_insensitive_contains, found, found_mut, insert_new, referenced, removed};
use crate::error::{StoreError, StoreResult};

/// Product list filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Substring of name, description or manufacturer (case-insensitive).
    pub text: Option<String>,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub promotion_id: Option<PromotionId>,
}

impl InMemoryStore {
    // ────────────────────────────────────────────────────────────────
    // Suppliers
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, cmd), fields(supplier_id = %cmd.supplier_id), err)]
    pub fn create_supplier(&self, cmd: CreateSupplier) -> StoreResult<Supplier> {
        let supplier = Supplier::create(&cmd)?;
        let mut tables = self.write()?;
        ensure_supplier_email_free(&tables, supplier.email(), None)?;
        insert_new(&mut tables.suppliers, supplier)
    }

    #[instrument(skip(self, patch), err)]
    pub fn update_supplier(&self, supplier_id: SupplierId, patch: UpdateSupplier) -> StoreResult<Supplier> {
        let mut tables = self.write()?;
        let mut updated = found(&tables.suppliers, &supplier_id)?.clone();
        updated.update(&patch)?;
        ensure_supplier_email_free(&tables, updated.email(), Some(supplier_id))?;
        tables.suppliers.insert(supplier_id, updated.clone());
        Ok(updated)
    }

    pub fn supplier(&self, supplier_id: SupplierId) -> StoreResult<Supplier> {
        Ok(found(&self.read()?.suppliers, &supplier_id)?.clone())
    }

    /// Suppliers whose name contains `needle`, by name.
    pub fn search_suppliers(&self, needle: &str) -> StoreResult<Vec<Supplier>> {
        let needle = needle.to_lowercase();
        let tables = self.read()?;
        let mut suppliers: Vec<Supplier> = tables
            .suppliers
            .values()
            .filter(|s| case_insensitive_contains(s.name(), &needle))
            .cloned()
            .collect();
        suppliers.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(suppliers)
    }

    /// Delete a supplier with its supplies. Deliveries and products keep
    /// existing without a supplier.
    #[instrument(skip(self), err)]
    pub fn delete_supplier(&self, supplier_id: SupplierId) -> StoreResult<()> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        removed(&mut tables.suppliers, &supplier_id)?;

        let supplies: Vec<_> = tables
            .supplies
            .values()
            .filter(|s| s.supplier_id() == supplier_id)
            .map(|s| *s.id())
            .collect();
        for supply_id in &supplies {
            tables.supplies.remove(supply_id);
        }
        tables.supply_items.retain(|_, i| !supplies.contains(&i.supply_id()));

        for delivery in tables.deliveries.values_mut().filter(|d| d.supplier_id() == Some(supplier_id)) {
            delivery.detach_supplier();
        }
        let patch = ProductPatch {
            supplier_id: Some(None),
            ..ProductPatch::default()
        };
        patch_products(tables, |p| p.supplier_id() == Some(supplier_id), &patch)?;
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────
    // Categories
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self), err)]
    pub fn create_category(
        &self,
        category_id: CategoryId,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> StoreResult<Category> {
        let category = Category::new(category_id, name, parent_id)?;
        let mut tables = self.write()?;
        if let Some(parent_id) = parent_id {
            referenced(&tables.categories, &parent_id)?;
        }
        check_parent(&tables.categories, category_id, parent_id)?;
        insert_new(&mut tables.categories, category)
    }

    /// Re-parent a category. Moving it under itself or one of its
    /// descendants is rejected.
    #[instrument(skip(self), err)]
    pub fn move_category(&self, category_id: CategoryId, parent_id: Option<CategoryId>) -> StoreResult<Category> {
        let mut tables = self.write()?;
        found(&tables.categories, &category_id)?;
        if let Some(parent_id) = parent_id {
            referenced(&tables.categories, &parent_id)?;
        }
        if let Err(err) = check_parent(&tables.categories, category_id, parent_id) {
            warn!(%category_id, ?parent_id, error = %err, "category move rejected");
            return Err(err.into());
        }
        let category = found_mut(&mut tables.categories, &category_id)?;
        category.set_parent(parent_id);
        Ok(category.clone())
    }

    pub fn rename_category(&self, category_id: CategoryId, name: &str) -> StoreResult<Category> {
        let mut tables = self.write()?;
        let category = found_mut(&mut tables.categories, &category_id)?;
        category.rename(name)?;
        Ok(category.clone())
    }

    pub fn category(&self, category_id: CategoryId) -> StoreResult<Category> {
        Ok(found(&self.read()?.categories, &category_id)?.clone())
    }

    /// Direct children of `parent_id`, by name.
    pub fn subcategories(&self, parent_id: CategoryId) -> StoreResult<Vec<Category>> {
        let tables = self.read()?;
        found(&tables.categories, &parent_id)?;
        let mut children: Vec<Category> = subcategories(tables.categories.values(), parent_id)
            .into_iter()
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(children)
    }

    /// Delete a category. Children become roots and products lose their
    /// category.
    #[instrument(skip(self), err)]
    pub fn delete_category(&self, category_id: CategoryId) -> StoreResult<()> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        removed(&mut tables.categories, &category_id)?;

        for child in tables.categories.values_mut().filter(|c| c.parent_id() == Some(category_id)) {
            child.set_parent(None);
        }
        let patch = ProductPatch {
            category_id: Some(None),
            ..ProductPatch::default()
        };
        patch_products(tables, |p| p.category_id() == Some(category_id), &patch)?;
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────
    // Products
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id, name = %cmd.name), err)]
    pub fn create_product(&self, cmd: CreateProduct) -> StoreResult<Product> {
        let mut tables = self.write()?;
        check_product_links(&tables, cmd.supplier_id, cmd.category_id)?;
        let product = Product::create(cmd)?;
        insert_new(&mut tables.products, product)
    }

    /// Apply a details patch, optionally guarded by the product version the
    /// caller last saw.
    #[instrument(skip(self, patch), err)]
    pub fn update_product(
        &self,
        product_id: ProductId,
        expected: ExpectedVersion,
        patch: ProductPatch,
    ) -> StoreResult<Product> {
        let mut tables = self.write()?;
        check_product_links(&tables, patch.supplier_id.flatten(), patch.category_id.flatten())?;
        let command = ProductCommand::UpdateDetails(UpdateDetails {
            product_id,
            patch,
            occurred_at: Utc::now(),
        });
        execute_product(&mut tables, product_id, expected, &command)
    }

    pub fn product(&self, product_id: ProductId) -> StoreResult<Product> {
        Ok(found(&self.read()?.products, &product_id)?.clone())
    }

    /// Products matching every set field of `filter`, by name.
    pub fn search_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let tables = self.read()?;
        let promoted: Option<Vec<ProductId>> = filter.promotion_id.map(|promotion_id| {
            tables
                .product_promotions
                .values()
                .filter(|link| link.promotion_id() == promotion_id)
                .map(|link| link.product_id())
                .collect()
        });

        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| filter.text.as_deref().is_none_or(|needle| p.matches(needle)))
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id() == Some(id)))
            .filter(|p| filter.supplier_id.is_none_or(|id| p.supplier_id() == Some(id)))
            .filter(|p| promoted.as_ref().is_none_or(|ids| ids.contains(&p.id_typed())))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id_typed().cmp(&b.id_typed())));
        Ok(products)
    }

    /// Delete a product. Supply items, cart items and promotion links go
    /// with it; delivery and order lines keep existing without a product.
    #[instrument(skip(self), err)]
    pub fn delete_product(&self, product_id: ProductId) -> StoreResult<()> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        removed(&mut tables.products, &product_id)?;

        tables.supply_items.retain(|_, i| i.product_id() != product_id);
        tables.cart_items.retain(|_, i| i.product_id() != product_id);
        tables.product_promotions.retain(|_, l| l.product_id() != product_id);
        for item in tables.delivery_items.values_mut().filter(|i| i.product_id() == Some(product_id)) {
            item.detach_product();
        }
        for item in tables.order_items.values_mut().filter(|i| i.product_id() == Some(product_id)) {
            item.detach_product();
        }
        Ok(())
    }

    /// Recompute the freshness discount of a food product as of `today`.
    ///
    /// Returns the new percentage, or `None` when the product's category
    /// lies outside the food subtree (the product is left untouched).
    /// Products without a resolvable category fail with `CategoryMissing`.
    #[instrument(skip(self), err)]
    pub fn apply_freshness_discount(&self, product_id: ProductId, today: NaiveDate) -> StoreResult<Option<u8>> {
        let mut tables = self.write()?;
        let product = found(&tables.products, &product_id)?;
        if !is_discount_eligible(&tables.categories, product.category_id(), &self.food_category)? {
            return Ok(None);
        }

        let command = ProductCommand::RecalculateDiscount(RecalculateDiscount {
            product_id,
            today,
            occurred_at: Utc::now(),
        });
        let product = execute_product(&mut tables, product_id, ExpectedVersion::Any, &command)?;
        info!(%product_id, discount_percent = product.discount_percent(), "freshness discount applied");
        Ok(Some(product.discount_percent()))
    }

    /// Names of the promotions linked to a product, joined by `", "`.
    pub fn product_promotions_list(&self, product_id: ProductId) -> StoreResult<String> {
        let tables = self.read()?;
        found(&tables.products, &product_id)?;
        let mut promotions: Vec<&Promotion> = tables
            .product_promotions
            .values()
            .filter(|link| link.product_id() == product_id)
            .filter_map(|link| tables.promotions.get(&link.promotion_id()))
            .collect();
        promotions.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(promotions_list(promotions))
    }

    // ────────────────────────────────────────────────────────────────
    // Promotions
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, cmd), fields(promotion_id = %cmd.promotion_id), err)]
    pub fn create_promotion(&self, cmd: CreatePromotion) -> StoreResult<Promotion> {
        let promotion = Promotion::create(&cmd)?;
        insert_new(&mut self.write()?.promotions, promotion)
    }

    #[instrument(skip(self, patch), err)]
    pub fn update_promotion(&self, promotion_id: PromotionId, patch: UpdatePromotion) -> StoreResult<Promotion> {
        let mut tables = self.write()?;
        let promotion = found_mut(&mut tables.promotions, &promotion_id)?;
        promotion.update(&patch)?;
        Ok(promotion.clone())
    }

    pub fn promotion(&self, promotion_id: PromotionId) -> StoreResult<Promotion> {
        Ok(found(&self.read()?.promotions, &promotion_id)?.clone())
    }

    /// Promotions whose name or description contains `needle`, by start date.
    pub fn search_promotions(&self, needle: &str) -> StoreResult<Vec<Promotion>> {
        let tables = self.read()?;
        let mut promotions: Vec<Promotion> = tables
            .promotions
            .values()
            .filter(|p| p.matches(needle))
            .cloned()
            .collect();
        promotions.sort_by(|a, b| a.start_date().cmp(&b.start_date()).then_with(|| a.name().cmp(b.name())));
        Ok(promotions)
    }

    #[instrument(skip(self), err)]
    pub fn delete_promotion(&self, promotion_id: PromotionId) -> StoreResult<()> {
        let mut tables = self.write()?;
        removed(&mut tables.promotions, &promotion_id)?;
        tables.product_promotions.retain(|_, l| l.promotion_id() != promotion_id);
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub fn link_promotion(
        &self,
        link_id: ProductPromotionId,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> StoreResult<ProductPromotion> {
        let mut tables = self.write()?;
        referenced(&tables.products, &product_id)?;
        referenced(&tables.promotions, &promotion_id)?;
        insert_new(
            &mut tables.product_promotions,
            ProductPromotion::new(link_id, product_id, promotion_id),
        )
    }

    pub fn unlink_promotion(&self, link_id: ProductPromotionId) -> StoreResult<()> {
        removed(&mut self.write()?.product_promotions, &link_id).map(|_| ())
    }
}

fn ensure_supplier_email_free(tables: &Tables, email: &str, except: Option<SupplierId>) -> StoreResult<()> {
    let taken = tables
        .suppliers
        .iter()
        .any(|(id, s)| Some(*id) != except && s.email() == email);
    if taken {
        return Err(StoreError::duplicate("supplier", "email", email));
    }
    Ok(())
}

fn check_product_links(
    tables: &Tables,
    supplier_id: Option<SupplierId>,
    category_id: Option<CategoryId>,
) -> StoreResult<()> {
    if let Some(supplier_id) = supplier_id {
        referenced(&tables.suppliers, &supplier_id)?;
    }
    if let Some(category_id) = category_id {
        referenced(&tables.categories, &category_id)?;
    }
    Ok(())
}

/// Run a command against a stored product, replacing it only on success.
fn execute_product(
    tables: &mut Tables,
    product_id: ProductId,
    expected: ExpectedVersion,
    command: &ProductCommand,
) -> StoreResult<Product> {
    let product = found_mut(&mut tables.products, &product_id)?;
    expected.check(product.version())?;

    let mut next = product.clone();
    next.execute(command)?;
    *product = next.clone();
    Ok(next)
}

/// Apply the same details patch to every product matching `select`.
fn patch_products(tables: &mut Tables, select: impl Fn(&Product) -> bool, patch: &ProductPatch) -> StoreResult<()> {
    let targets: Vec<ProductId> = tables
        .products
        .values()
        .filter(|p| select(p))
        .map(Product::id_typed)
        .collect();
    let occurred_at = Utc::now();
    for product_id in targets {
        let command = ProductCommand::UpdateDetails(UpdateDetails {
            product_id,
            patch: patch.clone(),
            occurred_at,
        });
        execute_product(tables, product_id, ExpectedVersion::Any, &command)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{product_cmd, store};
    use super::*;
    use twotails_core::{DeliveryId, DeliveryItemId, DomainError, Money, OrderItemId, SupplyId, SupplyItemId};
    use twotails_inventory::{Delivery, DeliveryItem, Supply, SupplyItem};
    use twotails_sales::OrderItem;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn supplier(store: &InMemoryStore, email: &str) -> Supplier {
        store
            .create_supplier(CreateSupplier {
                supplier_id: SupplierId::new(),
                name: "ООО Ферма".to_string(),
                email: email.to_string(),
            })
            .unwrap()
    }

    fn food_tree(store: &InMemoryStore) -> (CategoryId, CategoryId, CategoryId) {
        let food = CategoryId::new();
        let dairy = CategoryId::new();
        let toys = CategoryId::new();
        store.create_category(food, "Питание", None).unwrap();
        store.create_category(dairy, "Молочные", Some(food)).unwrap();
        store.create_category(toys, "Игрушки", None).unwrap();
        (food, dairy, toys)
    }

    #[test]
    fn supplier_emails_are_unique_after_normalisation() {
        let store = store();
        let first = supplier(&store, "sales@farm.ru");
        let dup = store.create_supplier(CreateSupplier {
            supplier_id: SupplierId::new(),
            name: "Другая ферма".to_string(),
            email: "  SALES@farm.ru ".to_string(),
        });
        assert!(matches!(dup, Err(StoreError::Uniqueness { entity: "supplier", .. })));

        let other = supplier(&store, "info@farm.ru");
        let clash = store.update_supplier(
            *Entity::id(&other),
            UpdateSupplier {
                email: Some("sales@farm.ru".to_string()),
                ..UpdateSupplier::default()
            },
        );
        assert!(clash.is_err());
        // Re-saving one's own address is fine.
        let same = store.update_supplier(
            *Entity::id(&first),
            UpdateSupplier {
                email: Some("sales@farm.ru".to_string()),
                ..UpdateSupplier::default()
            },
        );
        assert!(same.is_ok());
    }

    #[test]
    fn category_moves_cannot_create_cycles() {
        let store = store();
        let (food, dairy, _) = food_tree(&store);

        let err = store.move_category(food, Some(dairy)).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvariantViolation(_))));
        assert!(store.move_category(food, Some(food)).is_err());
        assert!(matches!(
            store.create_category(CategoryId::new(), "Сыры", Some(CategoryId::new())),
            Err(StoreError::ReferenceIntegrity { entity: "category", .. })
        ));
        assert_eq!(store.category(food).unwrap().parent_id(), None);
    }

    #[test]
    fn deleting_a_category_orphans_children_and_products() {
        let store = store();
        let (food, dairy, _) = food_tree(&store);
        let product = store.create_product(product_cmd("Кефир", Some(food))).unwrap();

        store.delete_category(food).unwrap();

        assert_eq!(store.category(dairy).unwrap().parent_id(), None);
        assert_eq!(store.product(product.id_typed()).unwrap().category_id(), None);
    }

    #[test]
    fn subcategories_are_direct_children_by_name() {
        let store = store();
        let (food, dairy, _) = food_tree(&store);
        let cereals = CategoryId::new();
        store.create_category(cereals, "Крупы", Some(food)).unwrap();
        store.create_category(CategoryId::new(), "Сыры", Some(dairy)).unwrap();

        let names: Vec<String> = store
            .subcategories(food)
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Крупы", "Молочные"]);
    }

    #[test]
    fn products_must_reference_existing_supplier_and_category() {
        let store = store();
        let mut cmd = product_cmd("Кефир", Some(CategoryId::new()));
        assert!(matches!(
            store.create_product(cmd.clone()),
            Err(StoreError::ReferenceIntegrity { entity: "category", .. })
        ));

        cmd.category_id = None;
        cmd.supplier_id = Some(SupplierId::new());
        assert!(matches!(
            store.create_product(cmd),
            Err(StoreError::ReferenceIntegrity { entity: "supplier", .. })
        ));
    }

    #[test]
    fn stale_version_update_is_a_conflict() {
        let store = store();
        let product = store.create_product(product_cmd("Кефир", None)).unwrap();
        let patch = ProductPatch {
            sale_price: Some(99),
            ..ProductPatch::default()
        };

        let updated = store
            .update_product(product.id_typed(), ExpectedVersion::Exact(1), patch.clone())
            .unwrap();
        assert_eq!(updated.sale_price(), 99);
        assert_eq!(updated.profit(), 49);

        let stale = store.update_product(product.id_typed(), ExpectedVersion::Exact(1), patch);
        assert!(matches!(stale, Err(StoreError::Domain(DomainError::Conflict(_)))));
    }

    #[test]
    fn freshness_discount_follows_the_food_subtree() {
        let store = store();
        let (_, dairy, toys) = food_tree(&store);
        let kefir = store.create_product(product_cmd("Кефир", Some(dairy))).unwrap();
        let ball = store.create_product(product_cmd("Мячик", Some(toys))).unwrap();
        let loose = store.create_product(product_cmd("Без категории", None)).unwrap();

        // Made 2026-01-01, 30 days shelf life: 20 days left on Jan 11.
        assert_eq!(store.apply_freshness_discount(kefir.id_typed(), day(2026, 1, 11)).unwrap(), Some(70));
        let kefir = store.product(kefir.id_typed()).unwrap();
        assert_eq!(kefir.discount_percent(), 70);
        assert!(!kefir.has_discount());

        assert_eq!(store.apply_freshness_discount(ball.id_typed(), day(2026, 1, 11)).unwrap(), None);
        assert_eq!(store.product(ball.id_typed()).unwrap().discount_percent(), 0);

        assert!(matches!(
            store.apply_freshness_discount(loose.id_typed(), day(2026, 1, 11)),
            Err(StoreError::Domain(DomainError::CategoryMissing(_)))
        ));
    }

    #[test]
    fn food_category_name_comes_from_configuration() {
        let config = crate::BackofficeConfig {
            food_category: "Корма".to_string(),
            ..crate::BackofficeConfig::default()
        };
        let store = InMemoryStore::new(&config).unwrap();
        let feed = CategoryId::new();
        store.create_category(feed, "Корма", None).unwrap();
        let product = store.create_product(product_cmd("Корм для кошек", Some(feed))).unwrap();

        assert_eq!(store.apply_freshness_discount(product.id_typed(), day(2025, 9, 1)).unwrap(), Some(5));
    }

    #[test]
    fn search_combines_text_category_supplier_and_promotion() {
        let store = store();
        let (_, dairy, toys) = food_tree(&store);
        let farm = supplier(&store, "sales@farm.ru");
        let farm_id = *Entity::id(&farm);

        let mut cmd = product_cmd("Кефир", Some(dairy));
        cmd.supplier_id = Some(farm_id);
        let kefir = store.create_product(cmd).unwrap();
        let mut cmd = product_cmd("Йогурт", Some(dairy));
        cmd.description = "питьевой, с кефирной закваской".to_string();
        let yogurt = store.create_product(cmd).unwrap();
        store.create_product(product_cmd("Мячик", Some(toys))).unwrap();

        let promotion_id = PromotionId::new();
        store
            .create_promotion(CreatePromotion {
                promotion_id,
                name: "Неделя молока".to_string(),
                description: String::new(),
                discount_percent: 10,
                start_date: day(2026, 1, 1),
                end_date: day(2026, 1, 7),
                is_active: true,
            })
            .unwrap();
        store
            .link_promotion(ProductPromotionId::new(), yogurt.id_typed(), promotion_id)
            .unwrap();

        let names = |filter: ProductFilter| -> Vec<String> {
            store
                .search_products(&filter)
                .unwrap()
                .iter()
                .map(|p| p.name().to_string())
                .collect()
        };

        assert_eq!(
            names(ProductFilter {
                text: Some("КЕФИР".to_string()),
                ..ProductFilter::default()
            }),
            vec!["Йогурт", "Кефир"]
        );
        assert_eq!(
            names(ProductFilter {
                category_id: Some(dairy),
                supplier_id: Some(farm_id),
                ..ProductFilter::default()
            }),
            vec!["Кефир"]
        );
        assert_eq!(
            names(ProductFilter {
                promotion_id: Some(promotion_id),
                ..ProductFilter::default()
            }),
            vec!["Йогурт"]
        );
        assert_eq!(names(ProductFilter::default()).len(), 3);
        assert_eq!(kefir.supplier_id(), Some(farm_id));
    }

    #[test]
    fn promotions_list_joins_linked_names() {
        let store = store();
        let product = store.create_product(product_cmd("Кефир", None)).unwrap();
        assert_eq!(store.product_promotions_list(product.id_typed()).unwrap(), "");

        for name in ["Чёрная пятница", "Неделя молока"] {
            let promotion_id = PromotionId::new();
            store
                .create_promotion(CreatePromotion {
                    promotion_id,
                    name: name.to_string(),
                    description: String::new(),
                    discount_percent: 15,
                    start_date: day(2026, 1, 1),
                    end_date: day(2026, 12, 31),
                    is_active: false,
                })
                .unwrap();
            store
                .link_promotion(ProductPromotionId::new(), product.id_typed(), promotion_id)
                .unwrap();
        }

        assert_eq!(
            store.product_promotions_list(product.id_typed()).unwrap(),
            "Неделя молока, Чёрная пятница"
        );
    }

    #[test]
    fn deleting_a_product_cascades_and_detaches() {
        let store = store();
        let farm = supplier(&store, "sales@farm.ru");
        let product = store.create_product(product_cmd("Кефир", None)).unwrap();
        let product_id = product.id_typed();

        let supply = store
            .create_supply(Supply::open(SupplyId::new(), *Entity::id(&farm), Utc::now()))
            .unwrap();
        let supply_id = *Entity::id(&supply);
        store
            .add_supply_item(SupplyItem::new(SupplyItemId::new(), supply_id, product_id, 5), Utc::now())
            .unwrap();
        let delivery = store
            .create_delivery(Delivery::open(DeliveryId::new(), None, Utc::now()))
            .unwrap();
        let delivery_id = *Entity::id(&delivery);
        store
            .add_delivery_item(DeliveryItem::new(DeliveryItemId::new(), delivery_id, Some(product_id), 2))
            .unwrap();
        let order_item_id = OrderItemId::new();
        store
            .add_order_item(OrderItem::new(order_item_id, None, Some(product_id), 1, Money::from_minor(8_000)).unwrap())
            .unwrap();

        store.delete_product(product_id).unwrap();

        assert!(store.supply_items(supply_id).unwrap().is_empty());
        assert_eq!(store.delivery_items(delivery_id).unwrap()[0].product_id(), None);
        assert_eq!(store.order_item(order_item_id).unwrap().product_id(), None);
    }

    #[test]
    fn deleting_a_supplier_cascades_supplies_and_detaches_the_rest() {
        let store = store();
        let farm = supplier(&store, "sales@farm.ru");
        let farm_id = *Entity::id(&farm);
        let mut cmd = product_cmd("Кефир", None);
        cmd.supplier_id = Some(farm_id);
        let product = store.create_product(cmd).unwrap();
        store.create_supply(Supply::open(SupplyId::new(), farm_id, Utc::now())).unwrap();
        let delivery = store
            .create_delivery(Delivery::open(DeliveryId::new(), Some(farm_id), Utc::now()))
            .unwrap();

        store.delete_supplier(farm_id).unwrap();

        assert!(store.supplies_by_supplier(farm_id).unwrap().is_empty());
        assert_eq!(store.delivery(*Entity::id(&delivery)).unwrap().supplier_id(), None);
        assert_eq!(store.product(product.id_typed()).unwrap().supplier_id(), None);
    }
}

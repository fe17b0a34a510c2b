use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::{
    Aggregate, AggregateRoot, CategoryId, DomainError, DomainEvent, DomainResult, Entity, ProductId,
    SupplierId, validate_text,
};

use crate::discount::discount_for_days_left;

const MAX_NAME_CHARS: usize = 120;
const MAX_MANUFACTURER_CHARS: usize = 100;

/// Shelf life used when a product is created without one.
pub const DEFAULT_EXPIRATION_DAYS: u32 = 30;

/// Aggregate root: Product.
///
/// Holds the catalog fields plus the stock counters fed by supply receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    manufactured_on: NaiveDate,
    expiration_days: u32,
    last_delivery_quantity: u32,
    current_quantity: u32,
    purchase_price: i32,
    sale_price: u32,
    manufacturer: String,
    supplier_id: Option<SupplierId>,
    category_id: Option<CategoryId>,
    has_discount: bool,
    discount_percent: u8,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            manufactured_on: NaiveDate::MIN,
            expiration_days: DEFAULT_EXPIRATION_DAYS,
            last_delivery_quantity: 0,
            current_quantity: 0,
            purchase_price: 0,
            sale_price: 0,
            manufacturer: String::new(),
            supplier_id: None,
            category_id: None,
            has_discount: false,
            discount_percent: 0,
            version: 0,
            created: false,
        }
    }

    /// Convenience: run `CreateProduct` against an empty aggregate.
    pub fn create(cmd: CreateProduct) -> DomainResult<Self> {
        let mut product = Self::empty(cmd.product_id);
        product.execute(&ProductCommand::CreateProduct(cmd))?;
        Ok(product)
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn manufactured_on(&self) -> NaiveDate {
        self.manufactured_on
    }

    pub fn expiration_days(&self) -> u32 {
        self.expiration_days
    }

    pub fn last_delivery_quantity(&self) -> u32 {
        self.last_delivery_quantity
    }

    pub fn current_quantity(&self) -> u32 {
        self.current_quantity
    }

    pub fn purchase_price(&self) -> i32 {
        self.purchase_price
    }

    pub fn sale_price(&self) -> u32 {
        self.sale_price
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn has_discount(&self) -> bool {
        self.has_discount
    }

    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Sale price minus purchase price; not stored.
    pub fn profit(&self) -> i64 {
        i64::from(self.sale_price) - i64::from(self.purchase_price)
    }

    /// Last day the product is usable.
    pub fn expires_on(&self) -> NaiveDate {
        self.manufactured_on
            .checked_add_days(Days::new(u64::from(self.expiration_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whole days from `today` until expiration (negative once expired).
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.expires_on() - today).num_days()
    }

    /// `manufactured_on + expiration_days >= today`, inclusive.
    pub fn is_usable(&self, today: NaiveDate) -> bool {
        self.expires_on() >= today
    }

    /// Case-insensitive match against name, description and manufacturer.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.name, &self.description, &self.manufacturer]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Entity for Product {
    type Id = ProductId;
    const NAME: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// Command: CreateProduct.
///
/// `expiration_days` arrives signed from callers; negative values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub manufactured_on: NaiveDate,
    pub expiration_days: Option<i64>,
    pub purchase_price: i32,
    pub sale_price: i64,
    pub manufacturer: String,
    pub supplier_id: Option<SupplierId>,
    pub category_id: Option<CategoryId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails. `None` leaves a field untouched; the nested
/// options on `supplier_id` / `category_id` allow clearing the link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manufactured_on: Option<NaiveDate>,
    pub expiration_days: Option<i64>,
    pub purchase_price: Option<i32>,
    pub sale_price: Option<i64>,
    pub manufacturer: Option<String>,
    pub supplier_id: Option<Option<SupplierId>>,
    pub category_id: Option<Option<CategoryId>>,
    pub has_discount: Option<bool>,
    pub discount_percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub product_id: ProductId,
    pub patch: ProductPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveSupply (a supply line item for this product was recorded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveSupply {
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecalculateDiscount (freshness tier as of `today`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculateDiscount {
    pub product_id: ProductId,
    pub today: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    UpdateDetails(UpdateDetails),
    ReceiveSupply(ReceiveSupply),
    RecalculateDiscount(RecalculateDiscount),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub manufactured_on: NaiveDate,
    pub expiration_days: u32,
    pub purchase_price: i32,
    pub sale_price: u32,
    pub manufacturer: String,
    pub supplier_id: Option<SupplierId>,
    pub category_id: Option<CategoryId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsUpdated (already-validated patch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsUpdated {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub manufactured_on: Option<NaiveDate>,
    pub expiration_days: Option<u32>,
    pub purchase_price: Option<i32>,
    pub sale_price: Option<u32>,
    pub manufacturer: Option<String>,
    pub supplier_id: Option<Option<SupplierId>>,
    pub category_id: Option<Option<CategoryId>>,
    pub has_discount: Option<bool>,
    pub discount_percent: Option<u8>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SupplyReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyReceived {
    pub product_id: ProductId,
    pub quantity: u32,
    pub current_quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DiscountRecalculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRecalculated {
    pub product_id: ProductId,
    pub days_left: i64,
    pub discount_percent: u8,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    DetailsUpdated(DetailsUpdated),
    SupplyReceived(SupplyReceived),
    DiscountRecalculated(DiscountRecalculated),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::DetailsUpdated(_) => "products.product.details_updated",
            ProductEvent::SupplyReceived(_) => "products.product.supply_received",
            ProductEvent::DiscountRecalculated(_) => "products.product.discount_recalculated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::DetailsUpdated(e) => e.occurred_at,
            ProductEvent::SupplyReceived(e) => e.occurred_at,
            ProductEvent::DiscountRecalculated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.manufactured_on = e.manufactured_on;
                self.expiration_days = e.expiration_days;
                self.purchase_price = e.purchase_price;
                self.sale_price = e.sale_price;
                self.manufacturer = e.manufacturer.clone();
                self.supplier_id = e.supplier_id;
                self.category_id = e.category_id;
                self.last_delivery_quantity = 0;
                self.current_quantity = 0;
                self.has_discount = false;
                self.discount_percent = 0;
                self.created = true;
            }
            ProductEvent::DetailsUpdated(e) => {
                if let Some(v) = &e.name {
                    self.name = v.clone();
                }
                if let Some(v) = &e.description {
                    self.description = v.clone();
                }
                if let Some(v) = e.manufactured_on {
                    self.manufactured_on = v;
                }
                if let Some(v) = e.expiration_days {
                    self.expiration_days = v;
                }
                if let Some(v) = e.purchase_price {
                    self.purchase_price = v;
                }
                if let Some(v) = e.sale_price {
                    self.sale_price = v;
                }
                if let Some(v) = &e.manufacturer {
                    self.manufacturer = v.clone();
                }
                if let Some(v) = e.supplier_id {
                    self.supplier_id = v;
                }
                if let Some(v) = e.category_id {
                    self.category_id = v;
                }
                if let Some(v) = e.has_discount {
                    self.has_discount = v;
                }
                if let Some(v) = e.discount_percent {
                    self.discount_percent = v;
                }
            }
            ProductEvent::SupplyReceived(e) => {
                self.last_delivery_quantity = e.quantity;
                self.current_quantity = e.current_quantity;
            }
            ProductEvent::DiscountRecalculated(e) => {
                // has_discount is an admin decision and is left alone.
                self.discount_percent = e.discount_percent;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::UpdateDetails(cmd) => self.handle_update(cmd),
            ProductCommand::ReceiveSupply(cmd) => self.handle_receive(cmd),
            ProductCommand::RecalculateDiscount(cmd) => self.handle_recalculate(cmd),
        }
    }
}

fn expiration_window(days: i64) -> DomainResult<u32> {
    u32::try_from(days).map_err(|_| {
        DomainError::validation(format!("expiration window must be 0..={} days, got {days}", u32::MAX))
    })
}

fn sale_price(price: i64) -> DomainResult<u32> {
    u32::try_from(price)
        .map_err(|_| DomainError::validation(format!("sale price must be non-negative, got {price}")))
}

fn discount_percent(percent: u8) -> DomainResult<u8> {
    if percent > 100 {
        return Err(DomainError::validation("discount percent cannot exceed 100"));
    }
    Ok(percent)
}

impl Product {
    fn ensure_created(&self, product_id: ProductId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        validate_text("product name", cmd.name.trim(), MAX_NAME_CHARS)?;
        validate_text("manufacturer", cmd.manufacturer.trim(), MAX_MANUFACTURER_CHARS)?;
        let expiration_days = match cmd.expiration_days {
            Some(days) => expiration_window(days)?,
            None => DEFAULT_EXPIRATION_DAYS,
        };

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            product_id: cmd.product_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.clone(),
            manufactured_on: cmd.manufactured_on,
            expiration_days,
            purchase_price: cmd.purchase_price,
            sale_price: sale_price(cmd.sale_price)?,
            manufacturer: cmd.manufacturer.trim().to_string(),
            supplier_id: cmd.supplier_id,
            category_id: cmd.category_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDetails) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_created(cmd.product_id)?;
        let patch = &cmd.patch;

        if let Some(name) = &patch.name {
            validate_text("product name", name.trim(), MAX_NAME_CHARS)?;
        }
        if let Some(manufacturer) = &patch.manufacturer {
            validate_text("manufacturer", manufacturer.trim(), MAX_MANUFACTURER_CHARS)?;
        }

        Ok(vec![ProductEvent::DetailsUpdated(DetailsUpdated {
            product_id: cmd.product_id,
            name: patch.name.as_ref().map(|v| v.trim().to_string()),
            description: patch.description.clone(),
            manufactured_on: patch.manufactured_on,
            expiration_days: patch.expiration_days.map(expiration_window).transpose()?,
            purchase_price: patch.purchase_price,
            sale_price: patch.sale_price.map(sale_price).transpose()?,
            manufacturer: patch.manufacturer.as_ref().map(|v| v.trim().to_string()),
            supplier_id: patch.supplier_id,
            category_id: patch.category_id,
            has_discount: patch.has_discount,
            discount_percent: patch.discount_percent.map(discount_percent).transpose()?,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receive(&self, cmd: &ReceiveSupply) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_created(cmd.product_id)?;
        let current_quantity = self
            .current_quantity
            .checked_add(cmd.quantity)
            .ok_or_else(|| DomainError::validation("stock quantity overflows"))?;

        Ok(vec![ProductEvent::SupplyReceived(SupplyReceived {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            current_quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_recalculate(&self, cmd: &RecalculateDiscount) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_created(cmd.product_id)?;
        let days_left = self.days_left(cmd.today);

        Ok(vec![ProductEvent::DiscountRecalculated(DiscountRecalculated {
            product_id: cmd.product_id,
            days_left,
            discount_percent: discount_for_days_left(days_left),
            occurred_at: cmd.occurred_at,
        })])
    }
}

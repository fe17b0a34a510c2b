//! Products domain module: catalog, category tree, promotions.
//!
//! Business rules for the catalog, implemented purely as deterministic
//! domain logic (no IO, no storage). `Product` is the one aggregate whose
//! state changes through commands: supply receipts and discount
//! recalculation both flow through `Aggregate::handle`.

pub mod category;
pub mod discount;
pub mod product;
pub mod promotion;

pub use category::{Category, CategoryTree, ancestry, check_parent, is_within, subcategories};
pub use discount::{DISCOUNT_TIERS, FOOD_CATEGORY, discount_for_days_left, is_discount_eligible};
pub use product::{
    CreateProduct, DEFAULT_EXPIRATION_DAYS, DetailsUpdated, DiscountRecalculated, Product,
    ProductCommand, ProductCreated, ProductEvent, ProductPatch, RecalculateDiscount, ReceiveSupply,
    SupplyReceived, UpdateDetails,
};
pub use promotion::{CreatePromotion, ProductPromotion, Promotion, UpdatePromotion, promotions_list};

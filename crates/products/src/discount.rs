//! Freshness-based discount tiers.

use twotails_core::{CategoryId, DomainError, DomainResult};

use crate::category::{CategoryTree, is_within};

/// Top-level grouping whose products are discounted as they near expiration.
pub const FOOD_CATEGORY: &str = "Питание";

/// Every percentage [`discount_for_days_left`] can return, steepest last.
pub const DISCOUNT_TIERS: [u8; 5] = [5, 10, 15, 30, 70];

/// Map days remaining before expiration to a discount percentage.
///
/// Thresholds are strict: 100 days left is already in the 10% tier.
pub fn discount_for_days_left(days_left: i64) -> u8 {
    match days_left {
        d if d > 100 => 5,
        d if d > 80 => 10,
        d if d > 60 => 15,
        d if d > 30 => 30,
        _ => 70,
    }
}

/// Whether freshness discounts apply to a product in `category`.
///
/// A product without a category cannot be scoped and fails with
/// `CategoryMissing`, as does a chain with a dangling parent link.
pub fn is_discount_eligible<T: CategoryTree + ?Sized>(
    tree: &T,
    category: Option<CategoryId>,
    food_category: &str,
) -> DomainResult<bool> {
    let category = category.ok_or_else(|| DomainError::category_missing("product has no category"))?;
    is_within(tree, category, food_category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use proptest::prelude::*;

    use crate::category::Category;

    #[test]
    fn tier_boundaries() {
        let cases = [
            (101, 5),
            (100, 10),
            (81, 10),
            (80, 15),
            (61, 15),
            (60, 30),
            (31, 30),
            (30, 70),
            (0, 70),
            (-5, 70),
        ];
        for (days_left, expected) in cases {
            assert_eq!(discount_for_days_left(days_left), expected, "days_left = {days_left}");
        }
    }

    #[test]
    fn products_outside_food_are_not_eligible() {
        let mut tree = HashMap::new();
        let food = CategoryId::new();
        let household = CategoryId::new();
        tree.insert(food, Category::new(food, FOOD_CATEGORY, None).unwrap());
        tree.insert(household, Category::new(household, "Хозтовары", None).unwrap());

        assert!(is_discount_eligible(&tree, Some(food), FOOD_CATEGORY).unwrap());
        assert!(!is_discount_eligible(&tree, Some(household), FOOD_CATEGORY).unwrap());
    }

    #[test]
    fn missing_category_is_an_explicit_error() {
        let tree: HashMap<CategoryId, Category> = HashMap::new();
        assert!(matches!(
            is_discount_eligible(&tree, None, FOOD_CATEGORY),
            Err(DomainError::CategoryMissing(_))
        ));
        assert!(matches!(
            is_discount_eligible(&tree, Some(CategoryId::new()), FOOD_CATEGORY),
            Err(DomainError::CategoryMissing(_))
        ));
    }

    proptest! {
        /// Property: the result is always one of the known tiers.
        #[test]
        fn tier_is_always_known(days_left in any::<i64>()) {
            prop_assert!(DISCOUNT_TIERS.contains(&discount_for_days_left(days_left)));
        }

        /// Property: fewer days left never yields a smaller discount.
        #[test]
        fn tier_is_monotonic(a in -1_000i64..1_000, b in -1_000i64..1_000) {
            let (fresher, staler) = if a >= b { (a, b) } else { (b, a) };
            prop_assert!(discount_for_days_left(staler) >= discount_for_days_left(fresher));
        }
    }
}

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::{DomainError, DomainResult, Entity, Money, OrderId, OrderItemId, ProductId, UserId};

/// Order status lifecycle. Transitions are not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Created => "Создан",
            OrderStatus::Paid => "Оплачен",
            OrderStatus::Shipped => "Отправлен",
            OrderStatus::Cancelled => "Отменён",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown order status: {s}")))
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer order.
///
/// `total_amount` is maintained by the caller; it is never recomputed from
/// the items. [`items_total`] exists for reconciliation reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: Option<UserId>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    total_amount: Money,
}

impl Order {
    pub fn place(
        id: OrderId,
        user_id: Option<UserId>,
        status: OrderStatus,
        total_amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_non_negative("total amount", total_amount)?;
        Ok(Self {
            id,
            user_id,
            status,
            created_at: occurred_at,
            total_amount,
        })
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn set_total_amount(&mut self, total_amount: Money) -> DomainResult<()> {
        ensure_non_negative("total amount", total_amount)?;
        self.total_amount = total_amount;
        Ok(())
    }

    pub fn detach_user(&mut self) {
        self.user_id = None;
    }
}

impl Entity for Order {
    type Id = OrderId;
    const NAME: &'static str = "order";

    fn id(&self) -> &OrderId {
        &self.id
    }
}

/// Order line with the unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    order_id: Option<OrderId>,
    product_id: Option<ProductId>,
    quantity: u32,
    price_at_purchase: Money,
}

impl OrderItem {
    pub fn new(
        id: OrderItemId,
        order_id: Option<OrderId>,
        product_id: Option<ProductId>,
        quantity: u32,
        price_at_purchase: Money,
    ) -> DomainResult<Self> {
        ensure_non_negative("price at purchase", price_at_purchase)?;
        Ok(Self {
            id,
            order_id,
            product_id,
            quantity,
            price_at_purchase,
        })
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price_at_purchase(&self) -> Money {
        self.price_at_purchase
    }

    pub fn line_total(&self) -> DomainResult<Money> {
        self.price_at_purchase.checked_mul(self.quantity)
    }

    pub fn detach_order(&mut self) {
        self.order_id = None;
    }

    pub fn detach_product(&mut self) {
        self.product_id = None;
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;
    const NAME: &'static str = "order item";

    fn id(&self) -> &OrderItemId {
        &self.id
    }
}

/// Σ quantity × price_at_purchase over `items`.
pub fn items_total<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> DomainResult<Money> {
    items
        .into_iter()
        .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}

fn ensure_non_negative(field: &str, amount: Money) -> DomainResult<()> {
    if amount.is_negative() {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(quantity: u32, minor: i64) -> OrderItem {
        OrderItem::new(OrderItemId::new(), None, Some(ProductId::new()), quantity, Money::from_minor(minor)).unwrap()
    }

    #[test]
    fn total_amount_is_not_derived_from_items() {
        let mut order = Order::place(
            OrderId::new(),
            Some(UserId::new()),
            OrderStatus::Created,
            Money::from_minor(1_000),
            Utc::now(),
        )
        .unwrap();
        let items = [item(2, 250), item(1, 100)];

        assert_eq!(items_total(&items).unwrap(), Money::from_minor(600));
        assert_eq!(order.total_amount(), Money::from_minor(1_000));

        order.set_total_amount(Money::from_minor(600)).unwrap();
        assert_eq!(order.total_amount(), Money::from_minor(600));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(Order::place(OrderId::new(), None, OrderStatus::Paid, Money::from_minor(-1), Utc::now()).is_err());
        assert!(OrderItem::new(OrderItemId::new(), None, None, 1, Money::from_minor(-1)).is_err());
    }

    #[test]
    fn status_codes_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{status}\""));
        }
        assert_eq!(OrderStatus::Cancelled.label(), "Отменён");
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn items_total_reports_overflow() {
        let items = [item(u32::MAX, i64::MAX / 2)];
        assert!(items_total(&items).is_err());
    }

    proptest! {
        /// Property: the total is the sum of line totals, in any order.
        #[test]
        fn items_total_is_order_independent(lines in proptest::collection::vec((0u32..100, 0i64..10_000), 0..20)) {
            let items: Vec<OrderItem> = lines.iter().map(|(q, p)| item(*q, *p)).collect();
            let expected: i64 = lines.iter().map(|(q, p)| i64::from(*q) * p).sum();

            let mut reversed = items.clone();
            reversed.reverse();

            prop_assert_eq!(items_total(&items).unwrap().minor_units(), expected);
            prop_assert_eq!(items_total(&reversed).unwrap(), items_total(&items).unwrap());
        }
    }
}

//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Monetary amount in minor currency units (kopecks, cents).
///
/// Order totals and purchase-time price snapshots use this type; catalog
/// prices stay whole units on the product itself.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole currency units (e.g. a catalog `sale_price`) to minor units.
    pub fn from_major(major: i64) -> DomainResult<Self> {
        major
            .checked_mul(100)
            .map(Self)
            .ok_or_else(|| DomainError::validation("amount overflows"))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::validation("amount overflows"))
    }

    pub fn checked_mul(self, quantity: u32) -> DomainResult<Money> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or_else(|| DomainError::validation("amount overflows"))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

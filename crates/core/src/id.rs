//! Strongly-typed identifiers used across the domain.
//!
//! Every table key is a UUID newtype so a `ProductId` can never be passed
//! where a `CategoryId` is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_ids {
    ($($(#[$meta:meta])* $t:ident => $name:literal;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $t(Uuid);

            impl $t {
                /// Create a new identifier.
                ///
                /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
                /// for determinism.
                pub fn new() -> Self {
                    Self(Uuid::now_v7())
                }

                pub fn from_uuid(uuid: Uuid) -> Self {
                    Self(uuid)
                }

                pub fn as_uuid(&self) -> &Uuid {
                    &self.0
                }
            }

            impl Default for $t {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl core::fmt::Display for $t {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    core::fmt::Display::fmt(&self.0, f)
                }
            }

            impl From<Uuid> for $t {
                fn from(value: Uuid) -> Self {
                    Self(value)
                }
            }

            impl From<$t> for Uuid {
                fn from(value: $t) -> Self {
                    value.0
                }
            }

            impl FromStr for $t {
                type Err = DomainError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let uuid = Uuid::from_str(s)
                        .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                    Ok(Self(uuid))
                }
            }
        )+
    };
}

uuid_ids! {
    /// Identifier of a role.
    RoleId => "RoleId";
    /// Identifier of a user account.
    UserId => "UserId";
    AddressId => "AddressId";
    SupplierId => "SupplierId";
    /// Identifier of an incoming stock batch.
    SupplyId => "SupplyId";
    SupplyItemId => "SupplyItemId";
    CategoryId => "CategoryId";
    ProductId => "ProductId";
    /// Identifier of an outgoing stock batch.
    DeliveryId => "DeliveryId";
    DeliveryItemId => "DeliveryItemId";
    CartId => "CartId";
    CartItemId => "CartItemId";
    OrderId => "OrderId";
    OrderItemId => "OrderItemId";
    PromotionId => "PromotionId";
    ProductPromotionId => "ProductPromotionId";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_error_names_the_id_type() {
        let err = "not-a-uuid".parse::<CategoryId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("CategoryId")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let uuid = Uuid::now_v7();
        let id = RoleId::from_uuid(uuid);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{uuid}\""));
    }
}

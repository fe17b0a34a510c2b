//! Typed ids and the error model shared by every bounded context.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::DomainEvent;
pub use id::{
    AddressId, CartId, CartItemId, CategoryId, DeliveryId, DeliveryItemId, OrderId, OrderItemId,
    ProductId, ProductPromotionId, PromotionId, RoleId, SupplierId, SupplyId, SupplyItemId, UserId,
};
pub use value_object::{Money, ValueObject};

/// Reject empty (after trimming) or overlong text fields.
///
/// Limits are counted in characters, not bytes, so Cyrillic names get the
/// same budget as ASCII ones.
pub fn validate_text(field: &str, value: &str, max_chars: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(DomainError::validation(format!(
            "{field} is too long ({len} > {max_chars} characters)"
        )));
    }
    Ok(())
}

/// Minimal e-mail shape check: `local@domain.tld`, no whitespace.
pub fn validate_email(value: &str) -> DomainResult<()> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation("invalid email format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_text_counts_characters() {
        assert!(validate_text("name", "Питание", 7).is_ok());
        assert!(validate_text("name", "Питание!", 7).is_err());
    }

    #[test]
    fn validate_email_accepts_plain_addresses() {
        assert!(validate_email("orders@supplier.ru").is_ok());
        assert!(validate_email("  a@b.co ").is_ok());
    }

    #[test]
    fn validate_email_rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn validate_text_rejects_blank() {
        let err = validate_text("city", "   ", 20).unwrap_err();
        assert_eq!(err, DomainError::Validation("city cannot be empty".to_string()));
    }
}

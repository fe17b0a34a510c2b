use serde::{Deserialize, Serialize};

use twotails_core::{DomainResult, Entity, SupplierId, validate_email, validate_text};

const MAX_NAME_CHARS: usize = 120;

/// Input: register a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSupplier {
    pub supplier_id: SupplierId,
    pub name: String,
    pub email: String,
}

/// Input: change supplier details. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSupplier {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A company that ships supplies in and owns catalog products.
///
/// The e-mail is unique across suppliers; the store enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    email: String,
}

impl Supplier {
    pub fn create(cmd: &CreateSupplier) -> DomainResult<Self> {
        let name = cmd.name.trim();
        validate_text("supplier name", name, MAX_NAME_CHARS)?;
        validate_email(&cmd.email)?;
        Ok(Self {
            id: cmd.supplier_id,
            name: name.to_string(),
            email: normalize_email(&cmd.email),
        })
    }

    /// Validate and apply a patch. On error the supplier is unchanged.
    pub fn update(&mut self, patch: &UpdateSupplier) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            validate_text("supplier name", name.trim(), MAX_NAME_CHARS)?;
        }
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = &patch.email {
            self.email = normalize_email(email);
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Entity for Supplier {
    type Id = SupplierId;
    const NAME: &'static str = "supplier";

    fn id(&self) -> &SupplierId {
        &self.id
    }
}

/// Canonical form used for the uniqueness check.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use twotails_core::DomainError;

    fn cmd(name: &str, email: &str) -> CreateSupplier {
        CreateSupplier {
            supplier_id: SupplierId::new(),
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn create_normalizes_email() {
        let supplier = Supplier::create(&cmd(" Молочный завод ", "Sales@Milk.RU")).unwrap();
        assert_eq!(supplier.name(), "Молочный завод");
        assert_eq!(supplier.email(), "sales@milk.ru");
    }

    #[test]
    fn create_rejects_invalid_email() {
        let err = Supplier::create(&cmd("Farm", "farm.example.com")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn failed_update_leaves_supplier_unchanged() {
        let mut supplier = Supplier::create(&cmd("Farm", "farm@example.com")).unwrap();
        let before = supplier.clone();
        let patch = UpdateSupplier {
            name: Some("New Farm".to_string()),
            email: Some("broken".to_string()),
        };
        assert!(supplier.update(&patch).is_err());
        assert_eq!(supplier, before);
    }
}

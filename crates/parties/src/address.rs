use serde::{Deserialize, Serialize};

use twotails_core::{AddressId, DomainResult, Entity, UserId, validate_text};

const MAX_LINE_CHARS: usize = 120;
const MAX_CITY_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAddress {
    pub address_id: AddressId,
    pub user_id: UserId,
    pub address_line: String,
    pub city: String,
    pub is_main: bool,
}

/// Postal address owned by a user (removed together with the user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    id: AddressId,
    user_id: UserId,
    address_line: String,
    city: String,
    is_main: bool,
}

impl Address {
    pub fn create(cmd: &CreateAddress) -> DomainResult<Self> {
        validate_text("address line", cmd.address_line.trim(), MAX_LINE_CHARS)?;
        validate_text("city", cmd.city.trim(), MAX_CITY_CHARS)?;
        Ok(Self {
            id: cmd.address_id,
            user_id: cmd.user_id,
            address_line: cmd.address_line.trim().to_string(),
            city: cmd.city.trim().to_string(),
            is_main: cmd.is_main,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn address_line(&self) -> &str {
        &self.address_line
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    pub fn set_main(&mut self, is_main: bool) {
        self.is_main = is_main;
    }
}

impl Entity for Address {
    type Id = AddressId;
    const NAME: &'static str = "address";

    fn id(&self) -> &AddressId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_is_limited_to_twenty_characters() {
        let mut cmd = CreateAddress {
            address_id: AddressId::new(),
            user_id: UserId::new(),
            address_line: "ул. Ленина, 1".to_string(),
            city: "Санкт-Петербург".to_string(),
            is_main: true,
        };
        assert!(Address::create(&cmd).is_ok());

        cmd.city = "Г".repeat(21);
        assert!(Address::create(&cmd).is_err());
    }
}

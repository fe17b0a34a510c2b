use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use twotails_core::{DomainResult, Entity, RoleId, validate_text};

/// Name of the role every new account falls back to.
pub const DEFAULT_ROLE_NAME: &str = "user";

const MAX_NAME_CHARS: usize = 20;

/// Validated role name (unique across the role table).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> DomainResult<Self> {
        let name = name.into();
        validate_text("role name", &name, MAX_NAME_CHARS)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named role referenced by user accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: RoleName,
}

impl Role {
    pub fn new(id: RoleId, name: RoleName) -> Self {
        Self { id, name }
    }

    pub fn name(&self) -> &RoleName {
        &self.name
    }

    pub fn rename(&mut self, name: RoleName) {
        self.name = name;
    }
}

impl Entity for Role {
    type Id = RoleId;
    const NAME: &'static str = "role";

    fn id(&self) -> &RoleId {
        &self.id
    }
}

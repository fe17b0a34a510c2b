//! Roles, users and their addresses.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use twotails_auth::{AccountAge, CreateUser, Role, RoleName, User};
use twotails_core::{AddressId, DomainError, RoleId, UserId};
use twotails_parties::{Address, CreateAddress};

use super::{InMemoryStore, Tables, found, found_mut, insert_new, referenced, removed, vacant};
use crate::error::{StoreError, StoreResult};

impl InMemoryStore {
    // ────────────────────────────────────────────────────────────────
    // Roles
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self), err)]
    pub fn create_role(&self, role_id: RoleId, name: &str) -> StoreResult<Role> {
        let name = RoleName::new(name.trim().to_string())?;
        let mut tables = self.write()?;
        vacant(&tables.roles, &role_id)?;
        ensure_role_name_free(&tables, &name, None)?;
        insert_new(&mut tables.roles, Role::new(role_id, name))
    }

    #[instrument(skip(self), err)]
    pub fn rename_role(&self, role_id: RoleId, name: &str) -> StoreResult<Role> {
        let name = RoleName::new(name.trim().to_string())?;
        let mut tables = self.write()?;
        ensure_role_name_free(&tables, &name, Some(role_id))?;
        let role = found_mut(&mut tables.roles, &role_id)?;
        role.rename(name);
        Ok(role.clone())
    }

    pub fn role(&self, role_id: RoleId) -> StoreResult<Role> {
        Ok(found(&self.read()?.roles, &role_id)?.clone())
    }

    /// All roles, by name.
    pub fn roles(&self) -> StoreResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.read()?.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(roles)
    }

    /// Delete a role and move its users to the default role.
    ///
    /// Returns how many users were reassigned. The default role itself
    /// cannot be deleted.
    #[instrument(skip(self), err)]
    pub fn delete_role(&self, role_id: RoleId) -> StoreResult<usize> {
        if role_id == self.default_role {
            warn!(%role_id, "refusing to delete the default role");
            return Err(DomainError::conflict("the default role cannot be deleted").into());
        }

        let mut tables = self.write()?;
        removed(&mut tables.roles, &role_id)?;

        let mut reassigned = 0;
        for user in tables.users.values_mut().filter(|u| u.role_id() == role_id) {
            user.assign_role(self.default_role);
            reassigned += 1;
        }
        if reassigned > 0 {
            info!(%role_id, reassigned, "users moved to the default role");
        }
        Ok(reassigned)
    }

    // ────────────────────────────────────────────────────────────────
    // Users
    // ────────────────────────────────────────────────────────────────

    /// Register a user. Without an explicit role the default role is used.
    #[instrument(skip(self, cmd), fields(user_id = %cmd.user_id, username = %cmd.username), err)]
    pub fn create_user(&self, cmd: CreateUser) -> StoreResult<User> {
        let role_id = cmd.role_id.unwrap_or(self.default_role);
        let user = User::register(&cmd, role_id)?;

        let mut tables = self.write()?;
        referenced(&tables.roles, &role_id)?;
        if tables.users.values().any(|u| u.username() == user.username()) {
            return Err(StoreError::duplicate("user", "username", user.username()));
        }
        insert_new(&mut tables.users, user)
    }

    pub fn user(&self, user_id: UserId) -> StoreResult<User> {
        Ok(found(&self.read()?.users, &user_id)?.clone())
    }

    /// Users whose username, e-mail or name contains `needle`, by username.
    pub fn search_users(&self, needle: &str) -> StoreResult<Vec<User>> {
        let tables = self.read()?;
        let mut users: Vec<User> = tables.users.values().filter(|u| u.matches(needle)).cloned().collect();
        users.sort_by(|a, b| a.username().cmp(b.username()));
        Ok(users)
    }

    #[instrument(skip(self), err)]
    pub fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<User> {
        let mut tables = self.write()?;
        referenced(&tables.roles, &role_id)?;
        let user = found_mut(&mut tables.users, &user_id)?;
        user.assign_role(role_id);
        Ok(user.clone())
    }

    #[instrument(skip(self), err)]
    pub fn set_user_active(&self, user_id: UserId, active: bool) -> StoreResult<User> {
        let mut tables = self.write()?;
        let user = found_mut(&mut tables.users, &user_id)?;
        user.set_active(active);
        Ok(user.clone())
    }

    /// How long the user has been registered as of `now`.
    pub fn account_age(&self, user_id: UserId, now: DateTime<Utc>) -> StoreResult<AccountAge> {
        Ok(found(&self.read()?.users, &user_id)?.account_age(now))
    }

    /// Delete a user together with their addresses and carts. Orders stay,
    /// detached from the user.
    #[instrument(skip(self), err)]
    pub fn delete_user(&self, user_id: UserId) -> StoreResult<()> {
        let mut tables = self.write()?;
        removed(&mut tables.users, &user_id)?;

        tables.addresses.retain(|_, a| a.user_id() != user_id);
        let carts: Vec<_> = tables
            .carts
            .iter()
            .filter(|(_, c)| c.user_id() == user_id)
            .map(|(id, _)| *id)
            .collect();
        for cart_id in &carts {
            tables.carts.remove(cart_id);
        }
        tables.cart_items.retain(|_, i| !carts.contains(&i.cart_id()));
        for order in tables.orders.values_mut().filter(|o| o.user_id() == Some(user_id)) {
            order.detach_user();
        }
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────
    // Addresses
    // ────────────────────────────────────────────────────────────────

    #[instrument(skip(self, cmd), fields(address_id = %cmd.address_id, user_id = %cmd.user_id), err)]
    pub fn create_address(&self, cmd: CreateAddress) -> StoreResult<Address> {
        let address = Address::create(&cmd)?;
        let mut tables = self.write()?;
        referenced(&tables.users, &cmd.user_id)?;
        insert_new(&mut tables.addresses, address)
    }

    pub fn addresses_of(&self, user_id: UserId) -> StoreResult<Vec<Address>> {
        let tables = self.read()?;
        let mut addresses: Vec<Address> = tables
            .addresses
            .values()
            .filter(|a| a.user_id() == user_id)
            .cloned()
            .collect();
        // Main address first.
        addresses.sort_by_key(|a| (!a.is_main(), a.city().to_string(), a.address_line().to_string()));
        Ok(addresses)
    }

    pub fn set_main_address(&self, address_id: AddressId, is_main: bool) -> StoreResult<Address> {
        let mut tables = self.write()?;
        let address = found_mut(&mut tables.addresses, &address_id)?;
        address.set_main(is_main);
        Ok(address.clone())
    }

    pub fn delete_address(&self, address_id: AddressId) -> StoreResult<()> {
        removed(&mut self.write()?.addresses, &address_id).map(|_| ())
    }
}

fn ensure_role_name_free(tables: &Tables, name: &RoleName, except: Option<RoleId>) -> StoreResult<()> {
    let taken = tables
        .roles
        .iter()
        .any(|(id, role)| Some(*id) != except && role.name() == name);
    if taken {
        return Err(StoreError::duplicate("role", "name", name.as_str()));
    }
    Ok(())
}

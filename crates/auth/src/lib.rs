//! Roles and user accounts.
//!
//! Authentication and permission checks live outside this crate; it only
//! models who a user is and which role they hold.

pub mod roles;
pub mod user;

pub use roles::{DEFAULT_ROLE_NAME, Role, RoleName};
pub use user::{AccountAge, CreateUser, User};

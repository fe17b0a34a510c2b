//! Parties domain module: suppliers and user postal addresses.

pub mod address;
pub mod supplier;

pub use address::{Address, CreateAddress};
pub use supplier::{CreateSupplier, Supplier, UpdateSupplier, normalize_email};

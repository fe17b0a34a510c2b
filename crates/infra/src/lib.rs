//! Infrastructure layer: configuration, storage backends and the stock ledger.

pub mod config;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod postgres;

pub use config::BackofficeConfig;
pub use error::{StoreError, StoreResult};
pub use ledger::{StockLedger, StockLevel};
pub use memory::{InMemoryStore, ProductFilter};
pub use postgres::PostgresStockLedger;

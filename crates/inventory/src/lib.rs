//! Inventory domain module: incoming supplies and outgoing deliveries.
//!
//! Stock counters live on `Product`; a recorded `SupplyItem` turns into a
//! `ReceiveSupply` command against it.

pub mod delivery;
pub mod supply;

pub use delivery::{Delivery, DeliveryItem, DeliveryStatus};
pub use supply::{Supply, SupplyItem};

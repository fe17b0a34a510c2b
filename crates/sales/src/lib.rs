//! Sales domain module: shopping carts and customer orders.

pub mod cart;
pub mod order;

pub use cart::{Cart, CartItem, CartStatus, total_items};
pub use order::{Order, OrderItem, OrderStatus, items_total};

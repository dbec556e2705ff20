//! Order management service models

pub mod item;
pub mod order;
pub mod store;
pub mod user;

// Re-export for convenience
pub use item::{Item, NewItem, UpdateItem};
pub use order::{NewOrder, Order, OrderDetail, OrderLine, OrderScope, OrderStatus};
pub use store::Store;
pub use user::{NewUser, Role, UpdateUser, User};

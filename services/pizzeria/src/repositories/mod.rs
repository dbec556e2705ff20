//! Repositories for database operations

pub mod item;
pub mod order;
pub mod store;
pub mod user;

pub use item::ItemRepository;
pub use order::OrderRepository;
pub use store::StoreRepository;
pub use user::UserRepository;

//! Order management core for a multi-store pizza chain
//!
//! Customers browse the catalog, place orders and track status; drivers
//! and managers update order and menu state. Every action is checked
//! against the role-based access gate before it reaches the store.

pub mod access;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod input;
pub mod models;
pub mod repositories;
pub mod session;
pub mod validation;

//! Common library for the pizzeria application
//!
//! This crate provides the shared infrastructure used by the order
//! management service: database connectivity and error handling.

pub mod database;
pub mod error;

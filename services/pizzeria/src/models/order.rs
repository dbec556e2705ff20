//! Order model and related functionality

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Incomplete,
    Complete,
}

impl OrderStatus {
    /// Database representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Incomplete => "incomplete",
            OrderStatus::Complete => "complete",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "incomplete" => Ok(OrderStatus::Incomplete),
            "complete" => Ok(OrderStatus::Complete),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity; a price snapshot taken at submission time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub login: String,
    pub store_id: String,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// One (item, quantity) pair belonging to an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_name: String,
    pub quantity: i32,
}

/// New order payload handed over by a submitted cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub login: String,
    pub store_id: String,
    pub total_price: Decimal,
    pub lines: Vec<OrderLine>,
}

/// Full order detail as returned to an authorized requester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Which slice of the order history a listing request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order in the system
    All,
    /// Most recent `n` orders in the system
    Recent(i64),
    /// Every order owned by the requester
    Own,
    /// Most recent `n` orders owned by the requester
    OwnRecent(i64),
}

//! Catalog item model and related functionality

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub ingredients: String,
    pub item_type: String,
    pub price: Decimal,
    pub description: String,
}

/// New item creation payload (manager only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub ingredients: String,
    pub item_type: String,
    pub price: Decimal,
    pub description: String,
}

/// Item update payload (manager only)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateItem {
    pub ingredients: Option<String>,
    pub item_type: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

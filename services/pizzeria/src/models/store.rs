//! Store model and related functionality

use serde::{Deserialize, Serialize};

/// Store entity; read-only in this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub store_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub is_open: bool,
}

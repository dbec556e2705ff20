//! User model and related functionality

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user acts under; decides what the access gate allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Driver,
    Manager,
}

impl Role {
    /// Database representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Driver => "driver",
            Role::Manager => "manager",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer" => Ok(Role::Customer),
            "driver" => Ok(Role::Driver),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub password_hash: String,
    pub role: Role,
    pub favorite_item: Option<String>,
    pub phone_number: String,
}

/// New user creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub phone_number: String,
}

/// User update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub password: Option<String>,
    pub role: Option<Role>,
    pub favorite_item: Option<Option<String>>,
    pub phone_number: Option<String>,
}

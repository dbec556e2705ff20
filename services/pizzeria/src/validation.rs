//! Input validation utilities

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// Validate a login for registration
pub fn validate_login(login: &str) -> Result<(), String> {
    if login.is_empty() {
        return Err("Login is required".to_string());
    }

    if login.len() > 50 {
        return Err("Login must be at most 50 characters long".to_string());
    }

    static LOGIN_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LOGIN_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile login regex"));

    if !regex.is_match(login) {
        return Err("Login can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a phone number
pub fn validate_phone_number(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number cannot be empty".to_string());
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9 \-()]{4,19}$").expect("Failed to compile phone regex")
    });

    if !regex.is_match(phone) {
        return Err("Invalid phone number format".to_string());
    }

    Ok(())
}

/// Parse a non-negative price entered at a prompt
pub fn parse_price(input: &str) -> Result<Decimal, String> {
    let price =
        Decimal::from_str(input.trim()).map_err(|_| "Please enter a valid price".to_string())?;

    if price.is_sign_negative() {
        return Err("Price cannot be negative".to_string());
    }

    Ok(price)
}

/// Parse a line-item quantity entered at a prompt
pub fn parse_quantity(input: &str) -> Result<i32, String> {
    input
        .trim()
        .parse::<i32>()
        .map_err(|_| "Please enter a valid quantity".to_string())
}

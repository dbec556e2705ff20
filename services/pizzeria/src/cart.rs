//! In-memory cart accumulator
//!
//! An order in progress exists only in session memory. Selecting the
//! same item twice merges into one line; the running total captures each
//! item's price at the moment it is added, matching the snapshot
//! semantics of a submitted order.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Item, NewOrder, OrderLine};

/// Errors raised while accumulating a cart
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CartError {
    /// Quantities below one, or additions that would overflow an
    /// existing line, are rejected without touching the cart
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),
}

/// An order not yet submitted
#[derive(Debug, Clone)]
pub struct Cart {
    store_id: String,
    lines: Vec<OrderLine>,
    total: Decimal,
}

impl Cart {
    /// Open a cart against a store already validated by the caller
    pub fn new(store_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            lines: Vec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Add `quantity` of `item`, merging with an existing line for the
    /// same item name. The total grows by `quantity × item.price`.
    pub fn add(&mut self, item: &Item, quantity: i32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        match self.lines.iter_mut().find(|l| l.item_name == item.name) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::InvalidQuantity(quantity))?;
            }
            None => self.lines.push(OrderLine {
                item_name: item.name.clone(),
                quantity,
            }),
        }

        self.total += item.price * Decimal::from(quantity);
        Ok(())
    }

    /// Store this cart was opened against
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    /// Lines accumulated so far, in selection order
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Running total
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Snapshot the cart into a submittable order payload. The cart
    /// itself stays intact so a failed submission can be retried.
    pub fn to_new_order(&self, login: &str) -> NewOrder {
        NewOrder {
            login: login.to_string(),
            store_id: self.store_id.clone(),
            total_price: self.total,
            lines: self.lines.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, cents: i64) -> Item {
        Item {
            name: name.to_string(),
            ingredients: String::new(),
            item_type: "entree".to_string(),
            price: Decimal::new(cents, 2),
            description: String::new(),
        }
    }

    #[test]
    fn test_repeated_item_merges_into_one_line() {
        let mut cart = Cart::new("S1");
        let pepperoni = item("Pepperoni", 999);

        cart.add(&pepperoni, 2).unwrap();
        cart.add(&pepperoni, 3).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total(), Decimal::new(4995, 2));
    }

    #[test]
    fn test_distinct_items_keep_separate_lines() {
        let mut cart = Cart::new("S1");
        cart.add(&item("Pepperoni", 999), 2).unwrap();
        cart.add(&item("Soda", 150), 1).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total(), Decimal::new(2148, 2));
    }

    #[test]
    fn test_invalid_quantity_leaves_cart_untouched() {
        let mut cart = Cart::new("S1");
        cart.add(&item("Soda", 150), 1).unwrap();

        for bad in [0, -1, -100] {
            assert_eq!(
                cart.add(&item("Soda", 150), bad),
                Err(CartError::InvalidQuantity(bad))
            );
        }

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.total(), Decimal::new(150, 2));
    }

    #[test]
    fn test_overflowing_merge_leaves_cart_untouched() {
        let mut cart = Cart::new("S1");
        cart.add(&item("Soda", 150), i32::MAX).unwrap();
        let total = cart.total();

        assert_eq!(
            cart.add(&item("Soda", 150), 1),
            Err(CartError::InvalidQuantity(1))
        );

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, i32::MAX);
        assert_eq!(cart.total(), total);
    }

    #[test]
    fn test_price_captured_per_addition() {
        let mut cart = Cart::new("S1");
        cart.add(&item("Pepperoni", 999), 1).unwrap();
        // price changed in the catalog; the earlier increment is kept
        cart.add(&item("Pepperoni", 1099), 1).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::new(2098, 2));
    }

    #[test]
    fn test_snapshot_keeps_cart_for_retry() {
        let mut cart = Cart::new("S1");
        cart.add(&item("Soda", 150), 2).unwrap();

        let order = cart.to_new_order("alice");
        assert_eq!(order.login, "alice");
        assert_eq!(order.store_id, "S1");
        assert_eq!(order.total_price, Decimal::new(300, 2));
        assert_eq!(order.lines.len(), 1);

        assert!(!cart.is_empty());
        assert_eq!(cart.total(), Decimal::new(300, 2));
    }
}

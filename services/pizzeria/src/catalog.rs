//! Catalog query builder
//!
//! Composes the menu's dynamic filters and sort into a parameterized
//! query. Filter values travel as bind parameters, never as text spliced
//! into the SQL.

use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

/// Price sort applied to the catalog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

/// Current filter state of the menu view.
///
/// Filters are independent and composable; `clear` resets all of them
/// without touching the catalog itself.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    /// Restrict to items priced strictly below this bound
    pub max_price: Option<Decimal>,
    /// Restrict to items whose type contains this text. Stored type
    /// values may carry a leading space, so this is a substring match
    /// rather than an equality test.
    pub item_type: Option<String>,
    pub sort: SortOrder,
}

impl MenuFilter {
    /// Reset every filter to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Build the parameterized catalog query for the current filters.
    ///
    /// Ties under a price sort break by catalog insertion order, so the
    /// listing is stable across identical prices.
    pub fn build_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(
            "SELECT name, ingredients, item_type, price, description FROM items WHERE 1 = 1",
        );

        if let Some(max_price) = self.max_price {
            builder.push(" AND price < ");
            builder.push_bind(max_price);
        }

        if let Some(item_type) = &self.item_type {
            builder.push(" AND item_type LIKE ");
            builder.push_bind(format!("%{}%", item_type.trim()));
        }

        match self.sort {
            SortOrder::None => builder.push(" ORDER BY position"),
            SortOrder::Ascending => builder.push(" ORDER BY price ASC, position"),
            SortOrder::Descending => builder.push(" ORDER BY price DESC, position"),
        };

        builder
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Product catalog records.

use serde::{Deserialize, Serialize};

/// A catalog entry: stock on hand and unit price.
///
/// `quantity` counts sellable units only; units reserved by a customer are
/// already subtracted.
///
/// # Examples
///
/// ```
/// use storepipe_rs::store::Product;
///
/// let product = Product::new("laptop", 50, 1000.0);
/// assert_eq!(product.quantity, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique catalog name.
    pub name: String,

    /// Units in stock.
    pub quantity: u32,

    /// Unit price.
    pub price: f64,
}

impl Product {
    /// Creates a product.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }
}

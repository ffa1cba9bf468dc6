/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Core Store implementation.
//!
//! `Store` is plain single-threaded state: a treasury balance, a product
//! catalog, and a list of customer accounts. It carries no locks and no
//! atomics. Thread safety comes from ownership: the store is moved into a
//! pipeline's execution thread and every mutation and read runs there, in
//! submission order. [`StoreApi`] is the concurrent facade.
//!
//! Domain failures are not `Err` values. A purchase that cannot go through
//! returns `0.0` (or `false` for reservations), appends a notice to the
//! customer's message log, and leaves every balance and stock count exactly
//! as it was.
//!
//! [`StoreApi`]: super::api::StoreApi

use super::customer::{Customer, Reservation};
use super::product::Product;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Notice appended when a purchase names an unknown product.
pub const NOTICE_NO_SUCH_PRODUCT: &str = "no such product in the store";

/// Notice appended when a purchase asks for more units than are in stock.
pub const NOTICE_INSUFFICIENT_STOCK: &str = "insufficient stock available";

/// Notice appended when a purchase would overdraw the customer's balance.
pub const NOTICE_INSUFFICIENT_FUNDS: &str = "insufficient funds on the account";

/// Notice appended when a reservation asks for more units than are in stock.
pub const NOTICE_INSUFFICIENT_STOCK_TO_RESERVE: &str = "insufficient stock to reserve";

/// Notice appended when buying out reservations would overdraw the balance.
pub const NOTICE_INSUFFICIENT_FUNDS_FOR_RESERVED: &str =
    "insufficient funds to purchase reserved items";

/// In-memory store: treasury balance, product catalog, customer accounts.
///
/// # Examples
///
/// ```
/// use storepipe_rs::store::{Customer, Store};
///
/// let mut store = Store::new(100_000.0);
/// store.add_customer(Customer::new("alice", 10_000.0));
/// store.add_product("laptop", 50, 1000.0);
///
/// let spent = store.purchase("alice", "laptop", 2);
/// assert_eq!(spent, 2000.0);
/// assert_eq!(store.available_quantity("laptop"), 48);
/// assert_eq!(store.balance(), 102_000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    balance: f64,
    products: HashMap<String, Product>,
    customers: Vec<Customer>,
}

impl Store {
    /// Creates a store with the given treasury balance.
    #[must_use]
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            products: HashMap::new(),
            customers: Vec::new(),
        }
    }

    /// Registers a customer account.
    ///
    /// Accounts are kept in registration order. Logins are not checked for
    /// uniqueness; lookups resolve to the earliest match.
    pub fn add_customer(&mut self, customer: Customer) {
        self.customers.push(customer);
    }

    /// Puts a product into the catalog, replacing any entry with the same
    /// name.
    pub fn add_product(&mut self, name: impl Into<String>, quantity: u32, price: f64) {
        let name = name.into();
        self.products
            .insert(name.clone(), Product::new(name, quantity, price));
    }

    /// Adds stock for `name`, registering the product at price `0.0` if the
    /// catalog does not know it yet.
    pub fn add_supply(&mut self, name: &str, quantity: u32) {
        self.products
            .entry(name.to_string())
            .and_modify(|product| product.quantity += quantity)
            .or_insert_with(|| Product::new(name, quantity, 0.0));
    }

    /// Buys `quantity` units of `product_name` for the customer `login`.
    ///
    /// Returns the amount spent, or `0.0` if the purchase did not go
    /// through. Failures append a notice to the customer's log: unknown
    /// product, insufficient stock, or insufficient funds, checked in that
    /// order. An unknown login is ignored and returns `0.0`.
    pub fn purchase(&mut self, login: &str, product_name: &str, quantity: u32) -> f64 {
        let Some(index) = self.customer_index(login) else {
            return 0.0;
        };
        let customer = &mut self.customers[index];

        let Some(product) = self.products.get_mut(product_name) else {
            customer.notify(NOTICE_NO_SUCH_PRODUCT);
            return 0.0;
        };
        if product.quantity < quantity {
            customer.notify(NOTICE_INSUFFICIENT_STOCK);
            return 0.0;
        }

        let cost = product.price * f64::from(quantity);
        if customer.balance < cost {
            customer.notify(NOTICE_INSUFFICIENT_FUNDS);
            return 0.0;
        }

        product.quantity -= quantity;
        customer.balance -= cost;
        customer.spent_amount += cost;
        self.balance += cost;
        cost
    }

    /// Sets aside `quantity` units of `product_name` for the customer.
    ///
    /// Reserved units leave the sellable stock immediately; payment happens
    /// later via [`Store::purchase_reserved`]. The reservation captures the
    /// catalog price current at this moment. Returns `false` (with a
    /// notice) if the product is unknown or the stock is short.
    pub fn reserve(&mut self, login: &str, product_name: &str, quantity: u32) -> bool {
        let Some(index) = self.customer_index(login) else {
            return false;
        };
        let customer = &mut self.customers[index];

        let Some(product) = self.products.get_mut(product_name) else {
            customer.notify(format!("product {product_name} is not available"));
            return false;
        };
        if product.quantity < quantity {
            customer.notify(NOTICE_INSUFFICIENT_STOCK_TO_RESERVE);
            return false;
        }

        product.quantity -= quantity;
        let reservation = customer
            .reserved
            .entry(product_name.to_string())
            .or_insert(Reservation {
                quantity: 0,
                unit_price: product.price,
            });
        reservation.quantity += quantity;
        reservation.unit_price = product.price;
        true
    }

    /// Buys out every reservation held by the customer, at the prices
    /// captured when the units were reserved.
    ///
    /// On insufficient funds the reservations are kept (the stock stays set
    /// aside), a notice is appended, and `false` is returned. A customer
    /// with no reservations trivially succeeds.
    pub fn purchase_reserved(&mut self, login: &str) -> bool {
        let Some(index) = self.customer_index(login) else {
            return false;
        };
        let customer = &mut self.customers[index];

        let total: f64 = customer
            .reserved
            .values()
            .map(|r| r.unit_price * f64::from(r.quantity))
            .sum();
        if customer.balance < total {
            customer.notify(NOTICE_INSUFFICIENT_FUNDS_FOR_RESERVED);
            return false;
        }

        customer.balance -= total;
        customer.spent_amount += total;
        self.balance += total;
        customer.reserved.clear();
        true
    }

    /// The treasury balance.
    #[must_use]
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Looks up a catalog entry.
    #[must_use]
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.get(name)
    }

    /// Sellable units of `name`; `0` for an unknown product.
    #[must_use]
    pub fn available_quantity(&self, name: &str) -> u32 {
        self.products.get(name).map_or(0, |p| p.quantity)
    }

    /// All customer accounts in registration order.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Looks up the account registered under `login`.
    #[must_use]
    pub fn customer(&self, login: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.login == login)
    }

    /// Serializes the whole store to JSON, for export or inspection.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restores a store from a [`Store::to_json`] snapshot.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserializer error.
    pub fn from_json(snapshot: &str) -> serde_json::Result<Self> {
        serde_json::from_str(snapshot)
    }

    fn customer_index(&self, login: &str) -> Option<usize> {
        self.customers.iter().position(|c| c.login == login)
    }
}

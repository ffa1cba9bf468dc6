/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Thread-safe store facade backed by the pipeline.
//!
//! [`StoreApi`] owns a [`Processor`] whose execution thread owns the
//! [`Store`]. Every operation, reads included, travels through the pipeline
//! as a closure: mutations are fire-and-forget or awaited, reads are awaited
//! closures returning clones. Routing reads through the execution thread
//! keeps the single-writer discipline airtight and gives every read a
//! point-in-time consistent view, ordered against all earlier submissions.
//!
//! Share the facade across producer threads behind an `Arc`.
//!
//! # Examples
//!
//! ```
//! use storepipe_rs::store::StoreApi;
//!
//! let api = StoreApi::new(100_000.0);
//! api.create_customer("alice", 10_000.0)?;
//! api.add_product("laptop", 50, 1000.0)?;
//!
//! let spent = api.purchase("alice", "laptop", 2)?;
//! assert_eq!(spent, 2000.0);
//! assert_eq!(api.available_quantity("laptop")?, 48);
//!
//! api.shutdown();
//! # Ok::<(), storepipe_rs::pipeline::PipelineError>(())
//! ```

use super::core::Store;
use super::customer::Customer;
use super::product::Product;
use crate::pipeline::{PipelineConfig, PipelineError, Processor};

/// Concurrent facade over a [`Store`] owned by a pipeline.
pub struct StoreApi {
    processor: Processor<Store>,
}

impl StoreApi {
    /// Starts a pipeline around a fresh store with the given treasury
    /// balance.
    #[must_use]
    pub fn new(initial_balance: f64) -> Self {
        Self::with_config(initial_balance, PipelineConfig::default())
    }

    /// Starts a pipeline with explicit queue capacity and wait strategies.
    #[must_use]
    pub fn with_config(initial_balance: f64, config: PipelineConfig) -> Self {
        Self {
            processor: Processor::with_config(Store::new(initial_balance), config),
        }
    }

    /// Registers a customer account. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Shutdown`] after [`StoreApi::shutdown`].
    pub fn create_customer(&self, login: &str, balance: f64) -> Result<(), PipelineError> {
        let login = login.to_string();
        self.processor
            .submit(move |store| store.add_customer(Customer::new(login, balance)))
    }

    /// Puts a product into the catalog, replacing any same-named entry.
    /// Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Shutdown`] after [`StoreApi::shutdown`].
    pub fn add_product(&self, name: &str, quantity: u32, price: f64) -> Result<(), PipelineError> {
        let name = name.to_string();
        self.processor
            .submit(move |store| store.add_product(name, quantity, price))
    }

    /// Adds stock for `name`. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Shutdown`] after [`StoreApi::shutdown`].
    pub fn add_supply(&self, name: &str, quantity: u32) -> Result<(), PipelineError> {
        let name = name.to_string();
        self.processor
            .submit(move |store| store.add_supply(&name, quantity))
    }

    /// Buys `quantity` units for `login`, blocking until the purchase has
    /// executed. Returns the amount spent, `0.0` if it did not go through.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures; domain refusals (stock, funds) are the
    /// `0.0` return plus a notice on the customer's log, not errors.
    pub fn purchase(&self, login: &str, product: &str, quantity: u32) -> Result<f64, PipelineError> {
        let login = login.to_string();
        let product = product.to_string();
        self.processor
            .submit_and_await(move |store| store.purchase(&login, &product, quantity))
    }

    /// Reserves `quantity` units for `login`, blocking until done.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn reserve(&self, login: &str, product: &str, quantity: u32) -> Result<bool, PipelineError> {
        let login = login.to_string();
        let product = product.to_string();
        self.processor
            .submit_and_await(move |store| store.reserve(&login, &product, quantity))
    }

    /// Buys out every reservation held by `login`, blocking until done.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn purchase_reserved(&self, login: &str) -> Result<bool, PipelineError> {
        let login = login.to_string();
        self.processor
            .submit_and_await(move |store| store.purchase_reserved(&login))
    }

    /// Snapshot of a catalog entry.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn product(&self, name: &str) -> Result<Option<Product>, PipelineError> {
        let name = name.to_string();
        self.processor
            .submit_and_await(move |store| store.product(&name).cloned())
    }

    /// Sellable units of `name`; `0` for an unknown product.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn available_quantity(&self, name: &str) -> Result<u32, PipelineError> {
        let name = name.to_string();
        self.processor
            .submit_and_await(move |store| store.available_quantity(&name))
    }

    /// The treasury balance.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn store_balance(&self) -> Result<f64, PipelineError> {
        self.processor.submit_and_await(|store| store.balance())
    }

    /// Snapshot of every customer account, in registration order.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn customers(&self) -> Result<Vec<Customer>, PipelineError> {
        self.processor
            .submit_and_await(|store| store.customers().to_vec())
    }

    /// Snapshot of the account registered under `login`.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn customer(&self, login: &str) -> Result<Option<Customer>, PipelineError> {
        let login = login.to_string();
        self.processor
            .submit_and_await(move |store| store.customer(&login).cloned())
    }

    /// Lifetime spend of `login`; `0.0` for an unknown login.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn spent_amount(&self, login: &str) -> Result<f64, PipelineError> {
        let login = login.to_string();
        self.processor.submit_and_await(move |store| {
            store.customer(&login).map_or(0.0, |c| c.spent_amount)
        })
    }

    /// Point-in-time clone of the whole store, ordered against all earlier
    /// submissions. Pair with [`Store::to_json`] for JSON export.
    ///
    /// # Errors
    ///
    /// Propagates pipeline failures.
    pub fn snapshot(&self) -> Result<Store, PipelineError> {
        self.processor.submit_and_await(|store| store.clone())
    }

    /// Blocks until every submission accepted so far has been processed.
    pub fn drain(&self) {
        self.processor.drain();
    }

    /// Shuts the pipeline down after executing all accepted submissions.
    pub fn shutdown(&self) {
        self.processor.shutdown();
    }

    /// Number of submissions accepted but not yet fully processed.
    #[must_use]
    pub fn pending_count(&self) -> u64 {
        self.processor.pending_count()
    }

    /// The underlying processor, for lifecycle introspection.
    #[must_use]
    pub fn processor(&self) -> &Processor<Store> {
        &self.processor
    }
}

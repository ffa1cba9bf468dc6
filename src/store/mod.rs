/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Store domain model and its pipeline-backed facade.
//!
//! The [`Store`] itself is deliberately plain: no locks, no atomics, just
//! balances, a catalog, and customer accounts mutated by whoever owns it.
//! Concurrency lives one level up in [`StoreApi`], which moves the store
//! into a pipeline's execution thread and turns every operation into a
//! submitted closure.
//!
//! # Examples
//!
//! ```
//! use storepipe_rs::store::StoreApi;
//!
//! let api = StoreApi::new(100_000.0);
//! api.create_customer("alice", 5_000.0)?;
//! api.add_product("keyboard", 10, 49.5)?;
//!
//! assert!(api.reserve("alice", "keyboard", 4)?);
//! assert!(api.purchase_reserved("alice")?);
//! assert_eq!(api.spent_amount("alice")?, 198.0);
//!
//! api.shutdown();
//! # Ok::<(), storepipe_rs::pipeline::PipelineError>(())
//! ```

pub mod api;
pub mod core;
pub mod customer;
pub mod product;

#[cfg(test)]
mod tests;

// Re-export main types
pub use api::StoreApi;
pub use core::{
    NOTICE_INSUFFICIENT_FUNDS, NOTICE_INSUFFICIENT_FUNDS_FOR_RESERVED,
    NOTICE_INSUFFICIENT_STOCK, NOTICE_INSUFFICIENT_STOCK_TO_RESERVE, NOTICE_NO_SUCH_PRODUCT,
    Store,
};
pub use customer::{Customer, Message, Reservation};
pub use product::Product;

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! storepipe-rs: a two-stage command pipeline over single-writer state.
//!
//! Concurrent producers submit closures; a bounded ingress queue hands them
//! to a forwarding thread, a bounded processing queue hands them to the
//! execution thread, and the execution thread owns the state outright. One
//! writer, total order, no locks on the hot path. The queues are sequenced
//! rings in the LMAX Disruptor mould, with pluggable wait strategies per
//! queue: parked producers on ingress, a spinning consumer on processing.
//!
//! The crate ships two layers:
//!
//! - [`pipeline`]: the generic machinery. [`Processor`] works for any
//!   `Send` state and any closure over it.
//! - [`store`]: an inventory and ledger domain riding the pipeline.
//!   [`StoreApi`] turns purchases, reservations, supplies, and reads into
//!   submitted commands.
//!
//! # Examples
//!
//! Five threads buying concurrently, every mutation serialized through the
//! execution thread:
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use storepipe_rs::StoreApi;
//!
//! let api = Arc::new(StoreApi::new(100_000.0));
//! api.add_product("laptop", 50, 1000.0)?;
//!
//! let mut handles = Vec::new();
//! for i in 0..5 {
//!     let api = Arc::clone(&api);
//!     handles.push(thread::spawn(move || {
//!         let login = format!("customer-{i}");
//!         api.create_customer(&login, 10_000.0).unwrap();
//!         api.purchase(&login, "laptop", 1).unwrap()
//!     }));
//! }
//! let spent: f64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
//! assert_eq!(spent, 5000.0);
//!
//! assert_eq!(api.available_quantity("laptop")?, 45);
//! api.shutdown();
//! # Ok::<(), storepipe_rs::PipelineError>(())
//! ```

pub mod pipeline;
pub mod store;

// Re-export main types
pub use pipeline::{
    BlockingWaitStrategy, BusySpinWaitStrategy, PipelineConfig, PipelineError, Processor,
    StageState, WaitStrategy,
};
pub use store::{Customer, Product, Store, StoreApi};

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/8/26
******************************************************************************/

//! Customer accounts: balance, reservations, and notices.
//!
//! Failed store operations never raise errors at the domain level; they
//! append a [`Message`] to the affected customer's log instead, matching
//! how a storefront would surface "insufficient funds" to the shopper
//! rather than to the caller of the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Units of one product set aside for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reserved units.
    pub quantity: u32,

    /// Unit price captured when the reservation was made. Re-reserving the
    /// same product accumulates the quantity and adopts the catalog price
    /// current at that moment.
    pub unit_price: f64,
}

/// A notice appended to a customer's message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Human-readable notice text.
    pub text: String,

    /// Nanosecond timestamp when the notice was recorded.
    pub at_ns: u64,
}

/// A store account.
///
/// # Examples
///
/// ```
/// use storepipe_rs::store::Customer;
///
/// let customer = Customer::new("alice", 10_000.0);
/// assert_eq!(customer.spent_amount, 0.0);
/// assert!(customer.last_message().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Login identifying the account.
    pub login: String,

    /// Spendable funds.
    pub balance: f64,

    /// Total spent over the account's lifetime.
    pub spent_amount: f64,

    /// Active reservations keyed by product name.
    pub reserved: HashMap<String, Reservation>,

    /// Notices recorded against the account, oldest first.
    pub messages: Vec<Message>,
}

impl Customer {
    /// Creates an account with the given starting balance.
    #[must_use]
    pub fn new(login: impl Into<String>, balance: f64) -> Self {
        Self {
            login: login.into(),
            balance,
            spent_amount: 0.0,
            reserved: HashMap::new(),
            messages: Vec::new(),
        }
    }

    /// Appends a notice stamped with the current time.
    pub(crate) fn notify(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            text: text.into(),
            at_ns: nanos_since_epoch(),
        });
    }

    /// The most recent notice, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Total units currently reserved across all products.
    #[must_use]
    pub fn reserved_units(&self) -> u32 {
        self.reserved.values().map(|r| r.quantity).sum()
    }
}

/// Returns the current time in nanoseconds since the Unix epoch.
#[inline]
fn nanos_since_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

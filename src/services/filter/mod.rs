//! Transaction filtering.
//!
//! Extracts the transactions touching one account from fetched blocks.

mod address;

pub use address::{filter_by_address, TransactionMatch};

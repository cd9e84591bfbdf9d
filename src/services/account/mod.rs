//! Node-managed accounts.

mod client;
mod error;

pub use client::{EthPersonalClient, ScanDefaults};
pub use error::AccountError;

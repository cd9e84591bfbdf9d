//! Transfers between node-managed accounts.
//!
//! - `coordinator`: validation, lock-serialized unlock and send
//! - `error`: transfer error types

mod coordinator;
mod error;

pub use coordinator::{TransferCoordinator, TransferSettings};
pub use error::TransferError;

//! Core services implementing the business logic.
//!
//! This module contains the main service implementations:
//! - `account`: Client facade for node-managed accounts
//! - `blockchain`: Node client interfaces, transports and the client registry
//! - `filter`: Extraction of one address's transactions from blocks
//! - `history`: Transfer history backends (raw chain scan, indexed explorer)
//! - `lock`: Distributed lock serializing transfers
//! - `transfer`: Validated, lock-serialized transfers

pub mod account;
pub mod blockchain;
pub mod filter;
pub mod history;
pub mod lock;
pub mod transfer;

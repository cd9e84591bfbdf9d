//! Client for EVM nodes that hold account keys themselves.
//!
//! This library provides account creation, balance queries, lock-serialized
//! transfers and transfer history lookups against an EVM node. It includes:
//!
//! - Configuration through JSON files or `SEED_*` environment variables
//! - A backward block scanner and an indexed explorer adapter for history
//! - A distributed lock so concurrent processes never interleave transfers
//! - A registry sharing one node client per endpoint
//!
//! # Module Structure
//!
//! - `bootstrap`: Builds the client facade from configuration
//! - `models`: Data structures for configuration and blockchain data
//! - `services`: Core business logic and node interaction
//! - `utils`: Common utilities and helper functions

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

//! Utility modules for common functionality.
//!
//! - address: Address validation and normalization
//! - client_storage: Shared storage for per-endpoint client instances
//! - http: HTTP client utilities (i.e. creation of retryable HTTP clients)
//! - logging: Logging setup and error context
//! - metrics: Prometheus counters
//! - parsing: Parsing utilities for CLI values
//! - tests: Test builders
//! - units: Wei/ether conversion

pub mod address;
pub mod client_storage;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;
pub mod units;

pub use address::{is_valid_address, normalize_address, parse_address};
pub use client_storage::ClientStorage;
pub use http::*;
pub use parsing::*;
pub use units::{ether_to_wei, parse_wei, wei_to_ether};

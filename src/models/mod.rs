//! Domain models and data structures.
//!
//! - `blockchain`: EVM blocks and transactions as returned by the node
//! - `config`: Client configuration loading and validation
//! - `core`: Networks, scan requests and transfer records
//! - `security`: Secret containers

mod blockchain;
mod config;
mod core;
mod security;

pub use blockchain::evm::{
	BlockTransactions, EVMBaseBlock, EVMBaseTransaction, EVMBlock, EVMTransaction,
};

pub use core::{
	Network, RpcUrl, ScanRequest, TransferRecord, TransferRequest, ValidatedTransfer,
	DEFAULT_BUFFER_SIZE, DEFAULT_SCAN_TIMEOUT,
};

pub use config::{ClientConfig, ConfigError, ConfigLoader, HistoryBackendKind, ENV_PREFIX};

pub use security::{get_env_secret, SecretString, SecretValue, SecurityError, SecurityResult};

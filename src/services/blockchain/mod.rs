//! Node clients.
//!
//! - Block reads for history scans (`BlockChainClient`)
//! - Node-managed account calls (`EvmClientTrait`)
//! - JSON-RPC transports with endpoint failover
//! - A registry caching one client per node URL

mod client;
mod clients;
mod error;
mod registry;
mod transports;

pub use client::BlockChainClient;
pub use clients::{EvmClient, EvmClientTrait, TransactionCall, TRANSFER_GAS_LIMIT};
pub use error::BlockChainError;
pub use registry::{ClientRegistry, ClientRegistryTrait};
pub use transports::{
	net_version_probe, BlockchainTransport, EVMTransportClient, EndpointManager,
	HttpTransportClient, RotatingTransport, TransientErrorRetryStrategy, TransportError,
	ROTATE_ON_ERROR_CODES,
};

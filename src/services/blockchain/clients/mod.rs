//! Node client implementations.

mod evm {
	pub mod client;
}

pub use evm::client::{EvmClient, EvmClientTrait, TransactionCall, TRANSFER_GAS_LIMIT};

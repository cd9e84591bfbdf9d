use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
	models::{EVMTransaction, SecretString},
	utils::{normalize_address, wei_to_ether},
};

/// A value transfer as reported to callers of the history operations.
///
/// Both the raw chain scan and the indexed explorer produce this shape, so
/// callers cannot tell which backend answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
	/// Transaction hash (0x-prefixed)
	pub hash: String,
	/// Sender address
	pub from: String,
	/// Recipient address; None for contract creation
	pub to: Option<String>,
	/// Transferred value as a decimal ether string
	pub amount: String,
	/// Timestamp of the containing block in unix seconds
	pub timestamp: u64,
}

impl TransferRecord {
	/// Projects a block transaction and its block timestamp.
	pub fn from_transaction(tx: &EVMTransaction, timestamp: u64) -> Self {
		Self {
			hash: format!("{:#x}", tx.hash()),
			from: tx
				.sender()
				.map(normalize_address)
				.unwrap_or_else(|| normalize_address(&Address::ZERO)),
			to: tx.to().map(normalize_address),
			amount: wei_to_ether(*tx.value()),
			timestamp,
		}
	}
}

/// A request to move value between two node-managed accounts
#[derive(Debug, Clone)]
pub struct TransferRequest {
	/// Sender address (must be unlockable on the node)
	pub from: String,
	/// Recipient address
	pub to: String,
	/// Amount as a decimal ether string
	pub amount: String,
	/// Passphrase unlocking the sender account
	pub passphrase: SecretString,
	/// Gas price in wei as a decimal string; the configured default when None
	pub gas_price: Option<String>,
}

impl TransferRequest {
	pub fn new(
		from: impl Into<String>,
		to: impl Into<String>,
		amount: impl Into<String>,
		passphrase: SecretString,
	) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			amount: amount.into(),
			passphrase,
			gas_price: None,
		}
	}

	pub fn with_gas_price(mut self, gas_price: impl Into<String>) -> Self {
		self.gas_price = Some(gas_price.into());
		self
	}
}

/// A transfer that passed validation, in node units
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTransfer {
	pub from: Address,
	pub to: Address,
	pub value: U256,
	pub gas_price: U256,
}

//! EVM transaction data structures.

use std::{collections::HashMap, ops::Deref};

use alloy::{
	primitives::{Address, Bytes, B256, U256, U64},
	rpc::types::Index,
};
use serde::{Deserialize, Serialize};

/// Transaction object as returned inside `eth_getBlockByNumber(n, true)`
///
/// Only the fields the client reads are typed; everything else the node sends
/// is kept in `extra`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct BaseTransaction {
	/// Hash
	pub hash: B256,
	/// Sender nonce
	pub nonce: U256,
	/// Block hash. None when pending.
	#[serde(rename = "blockHash", default)]
	pub block_hash: Option<B256>,
	/// Block number. None when pending.
	#[serde(rename = "blockNumber", default)]
	pub block_number: Option<U64>,
	/// Position in the block. None when pending.
	#[serde(rename = "transactionIndex", default)]
	pub transaction_index: Option<Index>,
	/// Sender
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<Address>,
	/// Recipient (None for contract creation)
	#[serde(default)]
	pub to: Option<Address>,
	/// Transferred value in wei
	pub value: U256,
	/// Gas price (None for some EIP-1559 nodes)
	#[serde(rename = "gasPrice", default)]
	pub gas_price: Option<U256>,
	/// Gas limit
	#[serde(default)]
	pub gas: U256,
	/// Input data
	#[serde(default)]
	pub input: Bytes,

	/// Catch-all for fields the client does not read
	#[serde(flatten)]
	pub extra: HashMap<String, serde_json::Value>,
}

/// Wrapper around [`BaseTransaction`] with accessors used by the history filter
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Transaction(pub BaseTransaction);

impl Transaction {
	/// Get the transaction value (amount of wei transferred)
	pub fn value(&self) -> &U256 {
		&self.0.value
	}

	/// Get the transaction sender address
	pub fn sender(&self) -> Option<&Address> {
		self.0.from.as_ref()
	}

	/// Get the transaction recipient address (None for contract creation)
	pub fn to(&self) -> Option<&Address> {
		self.0.to.as_ref()
	}

	/// Get the transaction nonce
	pub fn nonce(&self) -> &U256 {
		&self.0.nonce
	}

	/// Get the transaction hash
	pub fn hash(&self) -> &B256 {
		&self.0.hash
	}

	/// Whether `address` is the sender or the recipient
	pub fn involves(&self, address: &Address) -> bool {
		self.sender() == Some(address) || self.to() == Some(address)
	}
}

impl From<BaseTransaction> for Transaction {
	fn from(tx: BaseTransaction) -> Self {
		Self(tx)
	}
}

impl Deref for Transaction {
	type Target = BaseTransaction;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

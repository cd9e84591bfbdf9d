//! EVM block data structures.

use alloy::primitives::{Address, B256, U256, U64};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, ops::Deref};

use super::EVMTransaction;

/// Transactions of a block: full objects or hashes only, depending on how the
/// block was requested
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BlockTransactions {
	/// Full transaction objects (`eth_getBlockByNumber(n, true)`)
	Full(Vec<EVMTransaction>),
	/// Transaction hashes only (`eth_getBlockByNumber(n, false)`)
	Hashes(Vec<B256>),
}

impl Default for BlockTransactions {
	fn default() -> Self {
		Self::Hashes(Vec::new())
	}
}

/// Block header fields the client reads plus its transactions
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct BaseBlock {
	/// Hash of the block. None if pending.
	#[serde(default)]
	pub hash: Option<B256>,
	/// Hash of the parent
	#[serde(rename = "parentHash", default)]
	pub parent_hash: B256,
	/// Miner/author's address.
	#[serde(rename = "miner", default)]
	pub author: Address,
	/// Block number. None if pending.
	#[serde(default)]
	pub number: Option<U64>,
	/// Timestamp in unix seconds
	pub timestamp: U256,
	/// Gas Used
	#[serde(rename = "gasUsed", default)]
	pub gas_used: U256,
	/// Gas Limit
	#[serde(rename = "gasLimit", default)]
	pub gas_limit: U256,
	/// Transactions
	#[serde(default)]
	pub transactions: BlockTransactions,

	/// Catch-all for header fields the client does not read
	#[serde(flatten)]
	pub extra: HashMap<String, serde_json::Value>,
}

/// Wrapper around [`BaseBlock`] that implements additional functionality
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Block(pub BaseBlock);

impl Block {
	/// Get the block number
	pub fn number(&self) -> Option<u64> {
		self.0.number.map(|n| n.to())
	}

	/// Get the block timestamp in unix seconds
	pub fn timestamp(&self) -> u64 {
		self.0.timestamp.saturating_to()
	}

	/// Full transaction objects, or `None` when the block was fetched with hashes only
	pub fn full_transactions(&self) -> Option<&[EVMTransaction]> {
		match &self.0.transactions {
			BlockTransactions::Full(txs) => Some(txs),
			BlockTransactions::Hashes(hashes) if hashes.is_empty() => Some(&[]),
			BlockTransactions::Hashes(_) => None,
		}
	}
}

impl From<BaseBlock> for Block {
	fn from(block: BaseBlock) -> Self {
		Self(block)
	}
}

impl Deref for Block {
	type Target = BaseBlock;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

use crate::models::{BlockTransactions, EVMBaseBlock, EVMBlock, EVMTransaction};
use alloy::primitives::{B256, U256, U64};

/// A builder for creating test EVM blocks.
///
/// Blocks carry full transaction objects unless [`BlockBuilder::hashes_only`]
/// is called.
#[derive(Debug, Default)]
pub struct BlockBuilder {
	number: Option<u64>,
	timestamp: Option<u64>,
	hash: Option<B256>,
	transactions: Vec<EVMTransaction>,
	hashes_only: bool,
}

impl BlockBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn number(mut self, number: u64) -> Self {
		self.number = Some(number);
		self
	}

	/// Sets the timestamp in unix seconds.
	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = Some(timestamp);
		self
	}

	pub fn hash(mut self, hash: B256) -> Self {
		self.hash = Some(hash);
		self
	}

	pub fn transaction(mut self, transaction: EVMTransaction) -> Self {
		self.transactions.push(transaction);
		self
	}

	pub fn transactions(mut self, transactions: Vec<EVMTransaction>) -> Self {
		self.transactions = transactions;
		self
	}

	/// Keeps only the transaction hashes, as `eth_getBlockByNumber(n, false)` does.
	pub fn hashes_only(mut self) -> Self {
		self.hashes_only = true;
		self
	}

	pub fn build(self) -> EVMBlock {
		let transactions = if self.hashes_only {
			BlockTransactions::Hashes(self.transactions.iter().map(|tx| *tx.hash()).collect())
		} else {
			BlockTransactions::Full(self.transactions)
		};

		EVMBlock(EVMBaseBlock {
			hash: self
				.hash
				.or_else(|| self.number.map(|n| B256::left_padding_from(&n.to_be_bytes()))),
			number: self.number.map(U64::from),
			timestamp: U256::from(self.timestamp.unwrap_or_default()),
			transactions,
			..Default::default()
		})
	}
}

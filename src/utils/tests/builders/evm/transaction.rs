use crate::models::{EVMBaseTransaction, EVMTransaction};
use alloy::{
	primitives::{Address, Bytes, B256, U256, U64},
	rpc::types::Index,
};

/// A builder for creating test EVM transactions with default values.
///
/// `to` stays unset unless given, which models a contract creation.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
	hash: Option<B256>,
	from: Option<Address>,
	to: Option<Address>,
	value: Option<U256>,
	nonce: Option<U256>,
	block_number: Option<u64>,
	gas_price: Option<U256>,
	input: Option<Bytes>,
	transaction_index: Option<usize>,
}

impl TransactionBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn hash(mut self, hash: B256) -> Self {
		self.hash = Some(hash);
		self
	}

	pub fn from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}

	pub fn to(mut self, to: Address) -> Self {
		self.to = Some(to);
		self
	}

	/// Sets the value in wei.
	pub fn value(mut self, value: U256) -> Self {
		self.value = Some(value);
		self
	}

	pub fn nonce(mut self, nonce: U256) -> Self {
		self.nonce = Some(nonce);
		self
	}

	pub fn block_number(mut self, block_number: u64) -> Self {
		self.block_number = Some(block_number);
		self
	}

	pub fn gas_price(mut self, gas_price: U256) -> Self {
		self.gas_price = Some(gas_price);
		self
	}

	pub fn input(mut self, input: Bytes) -> Self {
		self.input = Some(input);
		self
	}

	pub fn transaction_index(mut self, index: usize) -> Self {
		self.transaction_index = Some(index);
		self
	}

	pub fn build(self) -> EVMTransaction {
		let base_tx = EVMBaseTransaction {
			hash: self.hash.unwrap_or_default(),
			nonce: self.nonce.unwrap_or_default(),
			block_hash: None,
			block_number: self.block_number.map(U64::from),
			transaction_index: self.transaction_index.map(Index::from),
			from: self.from,
			to: self.to,
			value: self.value.unwrap_or_default(),
			gas_price: self.gas_price,
			gas: U256::from(21_000),
			input: self.input.unwrap_or_default(),
			extra: Default::default(),
		};

		EVMTransaction(base_tx)
	}
}

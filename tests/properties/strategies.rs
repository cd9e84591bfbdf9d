use alloy::primitives::{Address, B256, U256};
use proptest::prelude::*;
use seed_token_client::{
	models::{EVMBlock, EVMTransaction},
	utils::tests::builders::evm::{block::BlockBuilder, transaction::TransactionBuilder},
};

const MAX_TRANSACTIONS_PER_BLOCK: usize = 6;

/// Small address space so generated transfers often touch the same accounts
pub fn address_strategy() -> impl Strategy<Value = Address> {
	(1u8..=6).prop_map(Address::with_last_byte)
}

pub fn transaction_strategy() -> impl Strategy<Value = EVMTransaction> {
	(
		any::<[u8; 32]>(),
		address_strategy(),
		prop::option::weighted(0.9, address_strategy()),
		0u64..10_000_000_000_000_000_000,
		0u64..20,
	)
		.prop_map(|(hash, from, to, value, nonce)| {
			let mut builder = TransactionBuilder::new()
				.hash(B256::from(hash))
				.from(from)
				.value(U256::from(value))
				.nonce(U256::from(nonce));
			if let Some(to) = to {
				builder = builder.to(to);
			}
			builder.build()
		})
}

/// Blocks `head..=1`, newest first, timestamps increasing with the number
pub fn chain_strategy(max_head: u64) -> impl Strategy<Value = Vec<EVMBlock>> {
	(1..=max_head).prop_flat_map(|head| {
		prop::collection::vec(
			prop::collection::vec(transaction_strategy(), 0..MAX_TRANSACTIONS_PER_BLOCK),
			head as usize,
		)
		.prop_map(move |per_block| {
			per_block
				.into_iter()
				.enumerate()
				.map(|(i, transactions)| {
					let number = head - i as u64;
					BlockBuilder::new()
						.number(number)
						.timestamp(1_000_000 + number * 12)
						.transactions(transactions)
						.build()
				})
				.collect()
		})
	})
}

//! Property-based tests for the address transaction filter.

use proptest::{prelude::*, test_runner::Config};
use seed_token_client::services::filter::filter_by_address;

use crate::properties::strategies::{address_strategy, chain_strategy};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn matches_always_involve_the_address(
		blocks in chain_strategy(12),
		address in address_strategy(),
		max in 0usize..10,
	) {
		let matches = filter_by_address(&blocks, &address, max);

		for m in &matches {
			prop_assert!(m.transaction.involves(&address));
		}
	}

	#[test]
	fn never_exceeds_the_limit(
		blocks in chain_strategy(12),
		address in address_strategy(),
		max in 1usize..10,
	) {
		let matches = filter_by_address(&blocks, &address, max);
		prop_assert!(matches.len() <= max);
	}

	#[test]
	fn unlimited_filter_finds_every_involving_transaction(
		blocks in chain_strategy(12),
		address in address_strategy(),
	) {
		let expected = blocks
			.iter()
			.flat_map(|b| b.full_transactions().unwrap_or_default())
			.filter(|tx| tx.involves(&address))
			.count();

		prop_assert_eq!(filter_by_address(&blocks, &address, 0).len(), expected);
	}

	#[test]
	fn limited_result_is_a_prefix_of_the_full_result(
		blocks in chain_strategy(12),
		address in address_strategy(),
		max in 1usize..10,
	) {
		let all = filter_by_address(&blocks, &address, 0);
		let limited = filter_by_address(&blocks, &address, max);

		prop_assert_eq!(&all[..limited.len()], &limited[..]);
		prop_assert_eq!(limited.len(), all.len().min(max));
	}

	#[test]
	fn results_are_newest_first_then_sender_and_nonce_descending(
		blocks in chain_strategy(12),
		address in address_strategy(),
	) {
		let matches = filter_by_address(&blocks, &address, 0);

		for pair in matches.windows(2) {
			let (a, b) = (&pair[0], &pair[1]);
			prop_assert!(a.block_number >= b.block_number);
			if a.block_number == b.block_number {
				let key_a = (a.transaction.sender(), a.transaction.nonce());
				let key_b = (b.transaction.sender(), b.transaction.nonce());
				prop_assert!(key_a >= key_b);
			}
		}
	}
}

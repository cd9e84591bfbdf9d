//! Address transaction filter.
//!
//! Blocks arrive newest first. Within a block the node's order is replaced by
//! a deterministic one: descending sender, then descending nonce. Collection
//! stops as soon as the requested number of matches is reached.

use alloy::primitives::Address;
use std::cmp::Ordering;

use crate::models::{EVMBlock, EVMTransaction, TransferRecord};

/// A transaction touching the filtered address, with its block's timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMatch {
	pub transaction: EVMTransaction,
	pub block_number: Option<u64>,
	/// Block timestamp in unix seconds
	pub timestamp: u64,
}

impl TransactionMatch {
	pub fn to_record(&self) -> TransferRecord {
		TransferRecord::from_transaction(&self.transaction, self.timestamp)
	}
}

fn within_block_order(a: &EVMTransaction, b: &EVMTransaction) -> Ordering {
	b.sender()
		.cmp(&a.sender())
		.then_with(|| b.nonce().cmp(a.nonce()))
}

/// Returns up to `max` transactions whose sender or recipient is `address`.
///
/// `max == 0` means no limit. Blocks fetched without full transactions are
/// skipped.
pub fn filter_by_address(
	blocks: &[EVMBlock],
	address: &Address,
	max: usize,
) -> Vec<TransactionMatch> {
	let limit = if max == 0 { usize::MAX } else { max };
	let mut matches = Vec::new();

	for block in blocks {
		if matches.len() >= limit {
			break;
		}

		let Some(transactions) = block.full_transactions() else {
			tracing::debug!(
				block_number = ?block.number(),
				"Skipping block without full transactions"
			);
			continue;
		};

		let mut block_matches: Vec<&EVMTransaction> = transactions
			.iter()
			.filter(|tx| tx.involves(address))
			.collect();
		block_matches.sort_by(|a, b| within_block_order(a, b));

		let remaining = limit - matches.len();
		matches.extend(
			block_matches
				.into_iter()
				.take(remaining)
				.map(|tx| TransactionMatch {
					transaction: tx.clone(),
					block_number: block.number(),
					timestamp: block.timestamp(),
				}),
		);
	}

	matches
}

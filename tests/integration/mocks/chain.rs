//! Scripted in-memory chain.
//!
//! Serves fixed blocks to the history scanner and records every window it
//! was asked for, so tests can check which ranges a scan touched.

use std::{
	collections::BTreeMap,
	sync::{Arc, Mutex},
	time::Duration,
};

use async_trait::async_trait;
use seed_token_client::{models::EVMBlock, services::blockchain::BlockChainClient};

#[derive(Clone, Default)]
pub struct ScriptedChain {
	head: u64,
	blocks: Arc<BTreeMap<u64, EVMBlock>>,
	fetched: Arc<Mutex<Vec<(u64, u64)>>>,
	fetch_delay: Option<Duration>,
	fail_below: Option<u64>,
}

impl ScriptedChain {
	/// A chain whose head is `head`; numbers without a scripted block are empty
	pub fn new(head: u64, blocks: Vec<EVMBlock>) -> Self {
		let blocks = blocks
			.into_iter()
			.filter_map(|block| block.number().map(|n| (n, block)))
			.collect();
		Self {
			head,
			blocks: Arc::new(blocks),
			..Default::default()
		}
	}

	/// Every window fetch sleeps for `delay`
	pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
		self.fetch_delay = Some(delay);
		self
	}

	/// Fetching a window that reaches below `block` fails
	pub fn failing_below(mut self, block: u64) -> Self {
		self.fail_below = Some(block);
		self
	}

	/// Windows requested so far, in request order
	pub fn fetched_windows(&self) -> Vec<(u64, u64)> {
		self.fetched.lock().unwrap().clone()
	}
}

#[async_trait]
impl BlockChainClient for ScriptedChain {
	async fn get_latest_block_number(&self) -> Result<u64, anyhow::Error> {
		Ok(self.head)
	}

	async fn get_blocks(
		&self,
		start_block: u64,
		end_block: u64,
		_include_transactions: bool,
	) -> Result<Vec<EVMBlock>, anyhow::Error> {
		self.fetched.lock().unwrap().push((start_block, end_block));

		if let Some(delay) = self.fetch_delay {
			tokio::time::sleep(delay).await;
		}
		if self.fail_below.is_some_and(|limit| start_block < limit) {
			return Err(anyhow::anyhow!("node unavailable"));
		}

		let empty = |n: u64| {
			seed_token_client::utils::tests::builders::evm::block::BlockBuilder::new()
				.number(n)
				.timestamp(n * 10)
				.build()
		};

		Ok((start_block..=end_block)
			.rev()
			.map(|n| self.blocks.get(&n).cloned().unwrap_or_else(|| empty(n)))
			.collect())
	}
}

//! Node client interface used by the history scanner.

use async_trait::async_trait;

use crate::models::EVMBlock;

/// Read access to a node's blocks
#[async_trait]
pub trait BlockChainClient: Send + Sync + Clone {
	/// Number of the newest block
	///
	/// # Returns
	/// * `Result<u64, anyhow::Error>` - Head block number or the transport error
	async fn get_latest_block_number(&self) -> Result<u64, anyhow::Error>;

	/// Fetches every block in `[start_block, end_block]` in one concurrent round
	/// trip, newest first.
	///
	/// Any failing request fails the whole range. Blocks the node does not have
	/// yet are left out of the result.
	///
	/// # Arguments
	/// * `start_block` - Lowest block number, inclusive
	/// * `end_block` - Highest block number, inclusive
	/// * `include_transactions` - Request full transaction objects instead of hashes
	///
	/// # Returns
	/// * `Result<Vec<EVMBlock>, anyhow::Error>` - Blocks ordered by descending number
	async fn get_blocks(
		&self,
		start_block: u64,
		end_block: u64,
		include_transactions: bool,
	) -> Result<Vec<EVMBlock>, anyhow::Error>;
}

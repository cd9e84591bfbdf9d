//! History backend selection.

use async_trait::async_trait;

use crate::{
	models::{ScanRequest, TransferRecord},
	services::{
		blockchain::BlockChainClient,
		history::{BackwardScanner, HistoryError, IndexedExplorerBackend},
	},
};

/// Anything that can answer "last N transfers of an address"
#[async_trait]
pub trait TransferHistorySource: Send + Sync {
	/// Transfers of `request.address`, newest first, at most `request.max_count`
	async fn scan(&self, request: &ScanRequest) -> Result<Vec<TransferRecord>, HistoryError>;
}

/// The configured history backend
pub enum ScanBackend<C: BlockChainClient> {
	/// Walk the node's blocks backwards
	RawChainScan(BackwardScanner<C>),
	/// Ask an indexing explorer
	IndexedExplorer(IndexedExplorerBackend),
}

#[async_trait]
impl<C: BlockChainClient + 'static> TransferHistorySource for BackwardScanner<C> {
	async fn scan(&self, request: &ScanRequest) -> Result<Vec<TransferRecord>, HistoryError> {
		BackwardScanner::scan(self, request)
			.await
			.map(|outcome| outcome.records)
	}
}

#[async_trait]
impl TransferHistorySource for IndexedExplorerBackend {
	async fn scan(&self, request: &ScanRequest) -> Result<Vec<TransferRecord>, HistoryError> {
		IndexedExplorerBackend::scan(self, request).await
	}
}

#[async_trait]
impl<C: BlockChainClient + 'static> TransferHistorySource for ScanBackend<C> {
	async fn scan(&self, request: &ScanRequest) -> Result<Vec<TransferRecord>, HistoryError> {
		match self {
			Self::RawChainScan(scanner) => TransferHistorySource::scan(scanner, request).await,
			Self::IndexedExplorer(explorer) => TransferHistorySource::scan(explorer, request).await,
		}
	}
}

//! Backward scanner.
//!
//! Walks the chain from head towards block 1 in disjoint windows of
//! `buffer_size + 1` blocks, collecting the transfers of one address until
//! enough are found, the time budget is spent, the `since` date is passed or
//! the chain is exhausted. Windows are fetched strictly one after another.

use alloy::primitives::Address;
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::time::Instant;
use tracing::instrument;

use crate::{
	models::{ScanRequest, TransferRecord},
	services::{
		blockchain::BlockChainClient,
		filter::{filter_by_address, TransactionMatch},
		history::{validate_scan_request, HistoryError},
	},
	utils::metrics::{SCANS_COMPLETED, SCAN_WINDOWS_FETCHED},
};

/// Why a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
	/// `max_count` transfers were found
	Success,
	/// The time budget ran out before the next window
	Timeout,
	/// The last window's newest block is older than `since_timestamp`
	Since,
	/// Block 1 was reached
	Exhausted,
}

impl StopReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::Timeout => "timeout",
			Self::Since => "since",
			Self::Exhausted => "exhausted",
		}
	}
}

impl fmt::Display for StopReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inclusive range of block numbers fetched together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
	pub start: u64,
	pub end: u64,
}

impl BlockWindow {
	/// Window ending at the chain head. None when the chain has no block
	/// besides genesis.
	pub fn first(head: u64, buffer_size: u64) -> Option<Self> {
		(head >= 1).then(|| Self {
			start: head.saturating_sub(buffer_size).max(1),
			end: head,
		})
	}

	/// Window directly below this one, clamped at block 1
	pub fn next(&self, buffer_size: u64) -> Option<Self> {
		(self.start > 1).then(|| {
			let end = self.start - 1;
			Self {
				start: end.saturating_sub(buffer_size).max(1),
				end,
			}
		})
	}
}

/// Result of one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
	/// Transfers, newest first, never more than `max_count`
	pub records: Vec<TransferRecord>,
	pub stop_reason: StopReason,
	pub windows_fetched: usize,
}

/// Per-scan state
struct ScanState {
	window: Option<BlockWindow>,
	matches: Vec<TransactionMatch>,
	started: Instant,
	windows_fetched: usize,
	since_passed: bool,
}

/// Scans a node backwards for the transfers of one address
pub struct BackwardScanner<C: BlockChainClient> {
	client: Arc<C>,
}

impl<C: BlockChainClient> Clone for BackwardScanner<C> {
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
		}
	}
}

impl<C: BlockChainClient> BackwardScanner<C> {
	pub fn new(client: Arc<C>) -> Self {
		Self { client }
	}

	/// Runs one scan.
	///
	/// The first window is always fetched; the timeout is checked before each
	/// later one. A window straddling `since_timestamp` contributes all of its
	/// matches, including ones older than `since_timestamp`.
	///
	/// # Arguments
	/// * `request` - Address, wanted count, window size, time budget and optional `since`
	///
	/// # Returns
	/// * `Result<ScanOutcome, HistoryError>` - Matches found with the reason the
	///   scan stopped, or the first validation or fetch error
	#[instrument(skip(self), fields(address = %request.address, max_count = request.max_count))]
	pub async fn scan(&self, request: &ScanRequest) -> Result<ScanOutcome, HistoryError> {
		let address = validate_scan_request(request)?;

		let head = self.client.get_latest_block_number().await.map_err(|e| {
			HistoryError::fetch_error(
				"Failed to get latest block number",
				Some(e.into()),
				None,
			)
		})?;

		let mut state = ScanState {
			window: BlockWindow::first(head, request.buffer_size),
			matches: Vec::new(),
			started: Instant::now(),
			windows_fetched: 0,
			since_passed: false,
		};

		let stop_reason = loop {
			if state.matches.len() >= request.max_count {
				break StopReason::Success;
			}
			if state.since_passed {
				break StopReason::Since;
			}
			let Some(window) = state.window else {
				break StopReason::Exhausted;
			};
			if state.windows_fetched > 0 && state.started.elapsed() >= request.timeout {
				break StopReason::Timeout;
			}

			self.scan_window(&mut state, window, &address, request).await?;
			state.window = window.next(request.buffer_size);
		};

		let mut matches = state.matches;
		matches.truncate(request.max_count);
		let records: Vec<TransferRecord> = matches.iter().map(TransactionMatch::to_record).collect();

		SCANS_COMPLETED
			.with_label_values(&[stop_reason.as_str()])
			.inc();
		tracing::info!(
			head,
			found = records.len(),
			windows = state.windows_fetched,
			stop_reason = %stop_reason,
			"Transfer history scan finished"
		);

		Ok(ScanOutcome {
			records,
			stop_reason,
			windows_fetched: state.windows_fetched,
		})
	}

	async fn scan_window(
		&self,
		state: &mut ScanState,
		window: BlockWindow,
		address: &Address,
		request: &ScanRequest,
	) -> Result<(), HistoryError> {
		let blocks = self
			.client
			.get_blocks(window.start, window.end, true)
			.await
			.map_err(|e| {
				HistoryError::fetch_error(
					"Failed to fetch block window",
					Some(e.into()),
					Some(HashMap::from([
						("start".to_string(), window.start.to_string()),
						("end".to_string(), window.end.to_string()),
					])),
				)
			})?;

		state.windows_fetched += 1;
		SCAN_WINDOWS_FETCHED.inc();

		let wanted = request.max_count - state.matches.len();
		let found = filter_by_address(&blocks, address, wanted);
		tracing::debug!(
			start = window.start,
			end = window.end,
			blocks = blocks.len(),
			found = found.len(),
			"Scanned block window"
		);
		state.matches.extend(found);

		if let (Some(since), Some(newest)) = (request.since_timestamp, blocks.first()) {
			state.since_passed = newest.timestamp() < since;
		}

		Ok(())
	}
}

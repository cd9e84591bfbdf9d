//! Transfer history.
//!
//! Two interchangeable backends answer the same question:
//! - `BackwardScanner`: scans the node's blocks from head backwards
//! - `IndexedExplorerBackend`: delegates to an Etherscan-compatible explorer

mod backend;
mod error;
mod indexed;
mod scanner;

pub use backend::{ScanBackend, TransferHistorySource};
pub use error::HistoryError;
pub use indexed::IndexedExplorerBackend;
pub use scanner::{BackwardScanner, BlockWindow, ScanOutcome, StopReason};

use alloy::primitives::Address;
use std::collections::HashMap;

use crate::{models::ScanRequest, utils::parse_address};

/// Checks a scan request and returns the parsed address.
pub fn validate_scan_request(request: &ScanRequest) -> Result<Address, HistoryError> {
	let address = parse_address(&request.address).map_err(|e| {
		HistoryError::validation_error(
			"Invalid address",
			Some(e.into()),
			Some(HashMap::from([(
				"address".to_string(),
				request.address.clone(),
			)])),
		)
	})?;

	if request.max_count == 0 {
		return Err(HistoryError::validation_error(
			"max_count must be greater than 0",
			None,
			None,
		));
	}
	if request.buffer_size == 0 {
		return Err(HistoryError::validation_error(
			"buffer_size must be greater than 0",
			None,
			None,
		));
	}

	Ok(address)
}

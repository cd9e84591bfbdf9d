//! Client facade for accounts whose keys are held by the node.
//!
//! Ties together the node client, the configured history backend and the
//! transfer coordinator behind the operations the CLI exposes.

use alloy::primitives::B256;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{
		ScanRequest, SecretString, TransferRecord, TransferRequest, DEFAULT_BUFFER_SIZE,
		DEFAULT_SCAN_TIMEOUT,
	},
	services::{
		account::AccountError,
		blockchain::EvmClientTrait,
		history::{HistoryError, TransferHistorySource},
		transfer::{TransferCoordinator, TransferError},
	},
	utils::{is_valid_address, normalize_address, parse_address, wei_to_ether},
};

/// Scan parameters used when a history call leaves them out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDefaults {
	pub buffer_size: u64,
	pub timeout: Duration,
}

impl Default for ScanDefaults {
	fn default() -> Self {
		Self {
			buffer_size: DEFAULT_BUFFER_SIZE,
			timeout: DEFAULT_SCAN_TIMEOUT,
		}
	}
}

/// Accounts, balances, transfers and history of one node
pub struct EthPersonalClient<C> {
	client: Arc<C>,
	history: Arc<dyn TransferHistorySource>,
	transfers: TransferCoordinator<C>,
	scan_defaults: ScanDefaults,
}

impl<C> EthPersonalClient<C> {
	/// Whether `address` is a well-formed account address
	pub fn check_address(address: &str) -> bool {
		is_valid_address(address)
	}
}

impl<C: EvmClientTrait + Send + Sync> EthPersonalClient<C> {
	pub fn new(
		client: Arc<C>,
		history: Arc<dyn TransferHistorySource>,
		transfers: TransferCoordinator<C>,
		scan_defaults: ScanDefaults,
	) -> Self {
		Self {
			client,
			history,
			transfers,
			scan_defaults,
		}
	}

	/// Creates a node-managed account and returns its address
	#[instrument(skip_all)]
	pub async fn create_account(&self, passphrase: &SecretString) -> Result<String, AccountError> {
		if passphrase.is_empty() {
			return Err(AccountError::validation_error(
				"Passphrase must not be empty",
				None,
				None,
			));
		}

		let address = self
			.client
			.new_account(passphrase)
			.await
			.map_err(|e| {
				AccountError::request_error("Failed to create account", Some(e.into()), None)
			})?;

		tracing::info!(address = %address, "Account created");
		Ok(normalize_address(&address))
	}

	/// Balance of `address` as an ether decimal string
	#[instrument(skip(self))]
	pub async fn get_balance(&self, address: &str) -> Result<String, AccountError> {
		let metadata = || Some(HashMap::from([("address".to_string(), address.to_string())]));

		let parsed = parse_address(address).map_err(|e| {
			AccountError::validation_error("Invalid address", Some(e.into()), metadata())
		})?;

		let balance = self
			.client
			.get_balance(&parsed)
			.await
			.map_err(|e| {
				AccountError::request_error("Failed to get balance", Some(e.into()), metadata())
			})?;

		Ok(wei_to_ether(balance))
	}

	/// Sends ether from a node-managed account; returns the transaction hash
	pub async fn transfer(&self, request: &TransferRequest) -> Result<B256, TransferError> {
		self.transfers.transfer(request).await
	}

	/// Up to `n` most recent transfers touching `address`, newest first.
	///
	/// `buffer_size` and `timeout` fall back to the client's defaults; `since`
	/// is a unix timestamp below which the scan does not descend.
	///
	/// # Arguments
	/// * `address` - Account whose transfers are wanted
	/// * `n` - Maximum number of records
	/// * `buffer_size` - Blocks per window for the raw scan
	/// * `timeout` - Time budget for the raw scan
	/// * `since` - Oldest block timestamp of interest, in unix seconds
	///
	/// # Returns
	/// * `Result<Vec<TransferRecord>, HistoryError>` - Records from whichever
	///   history backend is configured
	#[instrument(skip(self))]
	pub async fn get_last_n_transactions(
		&self,
		address: &str,
		n: usize,
		buffer_size: Option<u64>,
		timeout: Option<Duration>,
		since: Option<u64>,
	) -> Result<Vec<TransferRecord>, HistoryError> {
		let mut request = ScanRequest::new(address, n)
			.with_buffer_size(buffer_size.unwrap_or(self.scan_defaults.buffer_size))
			.with_timeout(timeout.unwrap_or(self.scan_defaults.timeout));
		if let Some(since) = since {
			request = request.with_since(since);
		}

		self.history.scan(&request).await
	}
}

//! Transfer coordinator.
//!
//! Validates a transfer, then unlocks the sender on the node and submits the
//! transaction. With a lock configured, the unlock and the send run while the
//! deployment-wide lease is held, so two transfers never interleave between
//! another's unlock and send. The lease is released whatever the outcome.

use alloy::primitives::{B256, U256};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{ClientConfig, ConfigError, SecretString, TransferRequest, ValidatedTransfer},
	services::{
		blockchain::{EvmClientTrait, TransactionCall},
		lock::{acquire_with_retry, DistributedLock, LockRetryPolicy},
		transfer::TransferError,
	},
	utils::{
		ether_to_wei,
		metrics::{LOCK_ACQUISITIONS, LOCK_TIMEOUTS, TRANSFERS},
		parse_address, parse_wei,
	},
};

/// Tunables of the transfer path
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSettings {
	pub lock_resource: String,
	pub lock_ttl: Duration,
	pub retry: LockRetryPolicy,
	/// Highest accepted gas price in wei
	pub gas_price_ceiling: U256,
	/// Gas price in wei used when the request has none
	pub default_gas_price: U256,
}

impl Default for TransferSettings {
	fn default() -> Self {
		Self {
			lock_resource: "seed-token-client:transfer".to_string(),
			lock_ttl: Duration::from_secs(30),
			retry: LockRetryPolicy::default(),
			gas_price_ceiling: U256::from(1_000_000_000_000u64),
			default_gas_price: U256::ZERO,
		}
	}
}

impl TransferSettings {
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			lock_resource: config.lock_resource.clone(),
			lock_ttl: config.lock_ttl(),
			retry: LockRetryPolicy {
				retry_count: config.lock_retry_count,
				retry_delay: Duration::from_millis(config.lock_retry_delay_ms),
				retry_jitter: Duration::from_millis(config.lock_retry_jitter_ms),
			},
			gas_price_ceiling: config.gas_price_ceiling_wei()?,
			default_gas_price: config.default_gas_price_wei()?,
		})
	}
}

/// Submits transfers signed by the node, optionally serialized by a lock
pub struct TransferCoordinator<C> {
	client: Arc<C>,
	lock: Option<Arc<dyn DistributedLock>>,
	settings: TransferSettings,
}

impl<C> Clone for TransferCoordinator<C> {
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			lock: self.lock.clone(),
			settings: self.settings.clone(),
		}
	}
}

fn field(key: &str, value: &str) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(key.to_string(), value.to_string())]))
}

impl<C: EvmClientTrait + Send + Sync> TransferCoordinator<C> {
	/// Creates a coordinator. Transfers are serialized only when `lock` is set.
	///
	/// # Arguments
	/// * `client` - Node client that unlocks accounts and sends transactions
	/// * `lock` - Lock shared by every process sending from the same node
	/// * `settings` - Lock resource, lease, retry schedule and gas limits
	pub fn new(
		client: Arc<C>,
		lock: Option<Arc<dyn DistributedLock>>,
		settings: TransferSettings,
	) -> Self {
		Self {
			client,
			lock,
			settings,
		}
	}

	pub fn is_serialized(&self) -> bool {
		self.lock.is_some()
	}

	pub fn settings(&self) -> &TransferSettings {
		&self.settings
	}

	/// Checks a request and converts it to node units
	pub fn validate(&self, request: &TransferRequest) -> Result<ValidatedTransfer, TransferError> {
		let from = parse_address(&request.from).map_err(|e| {
			TransferError::validation_error(
				"Invalid sender address",
				Some(e.into()),
				field("from", &request.from),
			)
		})?;
		let to = parse_address(&request.to).map_err(|e| {
			TransferError::validation_error(
				"Invalid recipient address",
				Some(e.into()),
				field("to", &request.to),
			)
		})?;
		let value = ether_to_wei(&request.amount).map_err(|e| {
			TransferError::validation_error(
				"Invalid amount",
				Some(e.into()),
				field("amount", &request.amount),
			)
		})?;

		let gas_price = match &request.gas_price {
			Some(raw) if raw.starts_with("0x") => {
				return Err(TransferError::validation_error(
					"Gas price must be a decimal wei value",
					None,
					field("gas_price", raw),
				));
			}
			Some(raw) => parse_wei(raw).map_err(|e| {
				TransferError::validation_error(
					"Invalid gas price",
					Some(e.into()),
					field("gas_price", raw),
				)
			})?,
			None => self.settings.default_gas_price,
		};
		if gas_price > self.settings.gas_price_ceiling {
			return Err(TransferError::validation_error(
				"Gas price exceeds the configured ceiling",
				None,
				Some(HashMap::from([
					("gas_price".to_string(), gas_price.to_string()),
					(
						"ceiling".to_string(),
						self.settings.gas_price_ceiling.to_string(),
					),
				])),
			));
		}

		Ok(ValidatedTransfer {
			from,
			to,
			value,
			gas_price,
		})
	}

	/// Sends `request.amount` ether from `request.from` to `request.to`.
	///
	/// Validation happens before the lock is taken. The lock, when held, is
	/// released whatever the unlock or send outcome.
	///
	/// # Arguments
	/// * `request` - Sender, recipient, ether amount, passphrase and optional gas price
	///
	/// # Returns
	/// * `Result<B256, TransferError>` - Transaction hash, or the step that failed
	#[instrument(skip(self, request), fields(from = %request.from, to = %request.to))]
	pub async fn transfer(&self, request: &TransferRequest) -> Result<B256, TransferError> {
		let result = self.run(request).await;
		let outcome = match &result {
			Ok(_) => "sent",
			Err(e) => e.outcome(),
		};
		TRANSFERS.with_label_values(&[outcome]).inc();
		result
	}

	async fn run(&self, request: &TransferRequest) -> Result<B256, TransferError> {
		let transfer = self.validate(request)?;

		let Some(lock) = &self.lock else {
			return self.unlock_and_send(&transfer, &request.passphrase).await;
		};

		let handle = acquire_with_retry(
			lock.as_ref(),
			&self.settings.lock_resource,
			self.settings.lock_ttl,
			&self.settings.retry,
		)
		.await
		.map_err(|e| {
			TransferError::lock_error(
				"Failed to acquire transfer lock",
				Some(Box::new(e)),
				field("resource", &self.settings.lock_resource),
			)
		})?;

		let Some(handle) = handle else {
			LOCK_TIMEOUTS.inc();
			return Err(TransferError::lock_timeout_error(
				"Transfer lock not acquired",
				None,
				Some(HashMap::from([
					(
						"resource".to_string(),
						self.settings.lock_resource.clone(),
					),
					(
						"attempts".to_string(),
						(self.settings.retry.retry_count as u64 + 1).to_string(),
					),
				])),
			));
		};
		LOCK_ACQUISITIONS.inc();

		let result = self.unlock_and_send(&transfer, &request.passphrase).await;

		// A lease that cannot be released expires after its TTL
		if let Err(e) = lock.release(handle).await {
			tracing::warn!(error = %e, "Failed to release transfer lock");
		}

		result
	}

	async fn unlock_and_send(
		&self,
		transfer: &ValidatedTransfer,
		passphrase: &SecretString,
	) -> Result<B256, TransferError> {
		let sender = format!("{:#x}", transfer.from);

		self.client
			.unlock_account(&transfer.from, passphrase)
			.await
			.map_err(|e| {
				TransferError::unlock_error(
					"Failed to unlock sender account",
					Some(e.into()),
					field("from", &sender),
				)
			})?;

		let call = TransactionCall::transfer(
			transfer.from,
			transfer.to,
			transfer.value,
			transfer.gas_price,
		);
		let hash = self.client.send_transaction(&call).await.map_err(|e| {
			TransferError::send_error(
				"Failed to send transaction",
				Some(e.into()),
				field("from", &sender),
			)
		})?;

		tracing::info!(hash = %hash, "Transfer submitted");
		Ok(hash)
	}
}

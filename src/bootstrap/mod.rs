//! Bootstrap module for initializing the client.
//!
//! Turns a [`ClientConfig`] into a ready [`EthPersonalClient`]:
//! - resolves the node client through the caller's registry
//! - picks the history backend (raw chain scan or indexed explorer)
//! - picks the transfer lock (Redis, in-process, or none)

use std::{error::Error, sync::Arc};

use crate::{
	models::{ClientConfig, HistoryBackendKind, Network},
	services::{
		account::{EthPersonalClient, ScanDefaults},
		blockchain::{BlockChainClient, ClientRegistryTrait, TransientErrorRetryStrategy},
		history::{BackwardScanner, IndexedExplorerBackend, ScanBackend},
		lock::{DistributedLock, InMemoryLock, LockError, RedisLock},
		transfer::{TransferCoordinator, TransferSettings},
	},
	utils::{create_retryable_http_client, RetryConfig},
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Creates the lock transfers contend for.
///
/// `None` when serialization is disabled. A Redis lock when `lock_url` is set,
/// otherwise a lock private to this process.
///
/// # Arguments
/// * `config` - Client configuration holding the lock settings
///
/// # Returns
/// * `Result<Option<Arc<dyn DistributedLock>>, LockError>` - The lock, or the
///   error from connecting to Redis
pub async fn create_transfer_lock(
	config: &ClientConfig,
) -> std::result::Result<Option<Arc<dyn DistributedLock>>, LockError> {
	if !config.serialize_transfers {
		tracing::info!("Transfer serialization disabled");
		return Ok(None);
	}

	match &config.lock_url {
		Some(url) => {
			let lock = RedisLock::connect(url).await?;
			tracing::info!(resource = %config.lock_resource, "Using Redis transfer lock");
			Ok(Some(Arc::new(lock)))
		}
		None => {
			tracing::info!(
				resource = %config.lock_resource,
				"Using in-process transfer lock"
			);
			Ok(Some(Arc::new(InMemoryLock::new())))
		}
	}
}

/// Creates the configured history backend on top of `client`
///
/// # Arguments
/// * `config` - Client configuration selecting the backend
/// * `client` - Node client used by the raw chain scan
///
/// # Returns
/// * `Result<ScanBackend<C>>` - The backend, or an error when the explorer URL
///   is missing or invalid or its API key cannot be resolved
pub async fn create_history_backend<C: BlockChainClient + 'static>(
	config: &ClientConfig,
	client: Arc<C>,
) -> Result<ScanBackend<C>> {
	match config.history_backend {
		HistoryBackendKind::Raw => Ok(ScanBackend::RawChainScan(BackwardScanner::new(client))),
		HistoryBackendKind::Indexed => {
			let url = config
				.explorer_url
				.as_deref()
				.ok_or("explorer_url is required for the indexed history backend")?;
			let api_key = match &config.explorer_api_key {
				Some(secret) => Some(secret.resolve().await?),
				None => None,
			};
			let http_client = create_retryable_http_client(
				&RetryConfig::default(),
				reqwest::Client::new(),
				Some(TransientErrorRetryStrategy),
			);
			let explorer = IndexedExplorerBackend::new(url, api_key, Arc::new(http_client))?;
			Ok(ScanBackend::IndexedExplorer(explorer))
		}
	}
}

/// Builds the client facade described by `config`.
///
/// The node client comes from `registry`, so facades built for the same node
/// share one connection.
///
/// # Arguments
/// * `config` - Validated client configuration
/// * `registry` - Registry handing out node clients by endpoint
///
/// # Returns
/// * `Result<EthPersonalClient<R::EvmClient>>` - The facade, or the first error
///   raised while connecting the node, the history backend or the lock
pub async fn initialize_client<R>(
	config: &ClientConfig,
	registry: &R,
) -> Result<EthPersonalClient<R::EvmClient>>
where
	R: ClientRegistryTrait,
	R::EvmClient: 'static,
{
	let network = Network::from_urls(&config.node_urls());
	let client = registry.get_evm_client(&network).await?;

	let history = create_history_backend(config, client.clone()).await?;
	let lock = create_transfer_lock(config).await?;
	let transfers = TransferCoordinator::new(
		client.clone(),
		lock,
		TransferSettings::from_config(config)?,
	);

	Ok(EthPersonalClient::new(
		client,
		Arc::new(history),
		transfers,
		ScanDefaults {
			buffer_size: config.buffer_size,
			timeout: config.scan_timeout(),
		},
	))
}

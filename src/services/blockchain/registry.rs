//! Registry of node clients keyed by endpoint.
//!
//! Callers asking for the same node share one client and therefore one HTTP
//! connection pool and one endpoint manager. The registry is an ordinary value
//! owned by the composing application; nothing is global.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::{collections::HashMap, sync::Arc};

use crate::{
	models::Network,
	services::blockchain::{
		BlockChainClient, BlockChainError, EVMTransportClient, EvmClient, EvmClientTrait,
	},
	utils::client_storage::ClientStorage,
};

/// Source of shared node clients
#[async_trait]
pub trait ClientRegistryTrait: Send + Sync {
	type EvmClient: EvmClientTrait + BlockChainClient;

	/// Returns the cached client for `network.slug`, connecting on first use
	async fn get_evm_client(
		&self,
		network: &Network,
	) -> Result<Arc<Self::EvmClient>, BlockChainError>;
}

/// Lazily populated cache of EVM clients
pub struct ClientRegistry {
	evm_clients: ClientStorage<EvmClient<EVMTransportClient>>,
}

impl ClientRegistry {
	pub fn new() -> Self {
		Self {
			evm_clients: ClientStorage::new(),
		}
	}

	/// Fast path under the read lock; creation under the write lock, checking
	/// again so concurrent first requests connect once.
	async fn get_or_create_client<T: Send + Sync>(
		storage: &ClientStorage<T>,
		network: &Network,
		create_fn: impl Fn(Network) -> BoxFuture<'static, Result<T, anyhow::Error>>,
	) -> Result<Arc<T>, BlockChainError> {
		if let Some(client) = storage.clients.read().await.get(&network.slug) {
			return Ok(client.clone());
		}

		let mut clients = storage.clients.write().await;
		if let Some(client) = clients.get(&network.slug) {
			return Ok(client.clone());
		}

		let client = create_fn(network.clone()).await.map_err(|e| {
			BlockChainError::client_registry_error(
				"Failed to connect to node",
				Some(e.into()),
				Some(HashMap::from([(
					"network".to_string(),
					network.slug.clone(),
				)])),
			)
		})?;

		tracing::debug!(network = %network.slug, "Registered node client");
		let client = Arc::new(client);
		clients.insert(network.slug.clone(), client.clone());
		Ok(client)
	}

	/// Number of cached EVM clients
	pub async fn client_count(&self) -> usize {
		self.evm_clients.len().await
	}

	/// Drops the cached client of `slug`; the next request reconnects
	pub async fn evict(&self, slug: &str) -> bool {
		self.evm_clients.clients.write().await.remove(slug).is_some()
	}
}

#[async_trait]
impl ClientRegistryTrait for ClientRegistry {
	type EvmClient = EvmClient<EVMTransportClient>;

	async fn get_evm_client(
		&self,
		network: &Network,
	) -> Result<Arc<Self::EvmClient>, BlockChainError> {
		Self::get_or_create_client(&self.evm_clients, network, |network| {
			Box::pin(async move { Self::EvmClient::new(&network).await })
		})
		.await
	}
}

impl Default for ClientRegistry {
	fn default() -> Self {
		Self::new()
	}
}

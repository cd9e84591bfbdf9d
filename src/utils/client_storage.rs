use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Generic storage for shared client instances.
///
/// Clients are kept behind an `RwLock` in a map keyed by endpoint URL, each
/// wrapped in an `Arc` so callers share one instance per endpoint.
#[derive(Default)]
pub struct ClientStorage<T> {
	pub clients: Arc<RwLock<HashMap<String, Arc<T>>>>,
}

impl<T> ClientStorage<T> {
	pub fn new() -> Self {
		Self {
			clients: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	/// Number of cached clients
	pub async fn len(&self) -> usize {
		self.clients.read().await.len()
	}

	/// Whether no client has been cached yet
	pub async fn is_empty(&self) -> bool {
		self.clients.read().await.is_empty()
	}
}

//! Process-local lock backend.

use async_trait::async_trait;
use std::{collections::HashMap, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use super::{DistributedLock, LockError, LockHandle};

struct Lease {
	token: String,
	expires_at: Instant,
}

/// Lock table kept in memory. Leases expire after their TTL like the Redis
/// backend's keys do.
#[derive(Default)]
pub struct InMemoryLock {
	leases: Mutex<HashMap<String, Lease>>,
}

impl InMemoryLock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether a live lease exists on `resource`
	pub async fn is_held(&self, resource: &str) -> bool {
		let leases = self.leases.lock().await;
		leases
			.get(resource)
			.is_some_and(|lease| lease.expires_at > Instant::now())
	}
}

#[async_trait]
impl DistributedLock for InMemoryLock {
	async fn try_acquire(
		&self,
		resource: &str,
		ttl: Duration,
	) -> Result<Option<LockHandle>, LockError> {
		let mut leases = self.leases.lock().await;
		let now = Instant::now();

		if leases
			.get(resource)
			.is_some_and(|lease| lease.expires_at > now)
		{
			return Ok(None);
		}

		let handle = LockHandle::new(resource, ttl);
		leases.insert(
			resource.to_string(),
			Lease {
				token: handle.token().to_string(),
				expires_at: now + ttl,
			},
		);
		Ok(Some(handle))
	}

	async fn release(&self, handle: LockHandle) -> Result<(), LockError> {
		let mut leases = self.leases.lock().await;

		let owned = leases
			.get(handle.resource())
			.is_some_and(|lease| lease.token == handle.token());
		if !owned {
			return Err(LockError::operation_error(
				"Lock is not held by this handle",
				None,
				Some(HashMap::from([(
					"resource".to_string(),
					handle.resource().to_string(),
				)])),
			));
		}

		let lease = leases.remove(handle.resource());
		if lease.is_some_and(|lease| lease.expires_at <= Instant::now()) {
			return Err(LockError::operation_error(
				"Lock lease expired before release",
				None,
				Some(HashMap::from([(
					"resource".to_string(),
					handle.resource().to_string(),
				)])),
			));
		}
		Ok(())
	}
}

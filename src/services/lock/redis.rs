//! Redis lock backend.
//!
//! Acquire is `SET resource token NX PX ttl`. Release deletes the key only if it
//! still holds the caller's token, so an expired lease never frees the next
//! owner's.

use async_trait::async_trait;
use lazy_static::lazy_static;
use redis::{aio::ConnectionManager, Client, Script};
use std::{collections::HashMap, time::Duration};
use tracing::instrument;

use super::{DistributedLock, LockError, LockHandle};

lazy_static! {
	static ref RELEASE_SCRIPT: Script = Script::new(
		r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
	return redis.call("DEL", KEYS[1])
else
	return 0
end
"#
	);
}

/// Lock backed by a Redis server shared by every client process
#[derive(Clone)]
pub struct RedisLock {
	connection: ConnectionManager,
}

impl std::fmt::Debug for RedisLock {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedisLock").finish_non_exhaustive()
	}
}

impl RedisLock {
	/// Connects to the Redis server at `url` (`redis://host:port/db`)
	pub async fn connect(url: &str) -> Result<Self, LockError> {
		let client = Client::open(url).map_err(|e| {
			LockError::connection_error(
				"Invalid Redis URL",
				Some(Box::new(e)),
				Some(HashMap::from([("url".to_string(), url.to_string())])),
			)
		})?;

		let connection = ConnectionManager::new(client).await.map_err(|e| {
			LockError::connection_error(
				"Failed to connect to Redis",
				Some(Box::new(e)),
				Some(HashMap::from([("url".to_string(), url.to_string())])),
			)
		})?;

		Ok(Self { connection })
	}

	pub fn with_connection(connection: ConnectionManager) -> Self {
		Self { connection }
	}
}

#[async_trait]
impl DistributedLock for RedisLock {
	#[instrument(skip(self))]
	async fn try_acquire(
		&self,
		resource: &str,
		ttl: Duration,
	) -> Result<Option<LockHandle>, LockError> {
		let handle = LockHandle::new(resource, ttl);
		let mut connection = self.connection.clone();

		let reply: Option<String> = redis::cmd("SET")
			.arg(resource)
			.arg(handle.token())
			.arg("NX")
			.arg("PX")
			.arg(ttl.as_millis() as u64)
			.query_async(&mut connection)
			.await
			.map_err(|e| {
				LockError::operation_error(
					"Failed to acquire lock",
					Some(Box::new(e)),
					Some(HashMap::from([(
						"resource".to_string(),
						resource.to_string(),
					)])),
				)
			})?;

		Ok(reply.map(|_| handle))
	}

	#[instrument(skip(self, handle), fields(resource = handle.resource()))]
	async fn release(&self, handle: LockHandle) -> Result<(), LockError> {
		let mut connection = self.connection.clone();

		let deleted: i64 = RELEASE_SCRIPT
			.key(handle.resource())
			.arg(handle.token())
			.invoke_async(&mut connection)
			.await
			.map_err(|e| {
				LockError::operation_error(
					"Failed to release lock",
					Some(Box::new(e)),
					Some(HashMap::from([(
						"resource".to_string(),
						handle.resource().to_string(),
					)])),
				)
			})?;

		if deleted == 0 {
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

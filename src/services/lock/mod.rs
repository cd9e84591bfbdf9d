//! Distributed lock used to serialize transfers.
//!
//! All transfers of a deployment contend for one named resource. A lease is
//! held for at most its TTL, after which the store forgets it. Backends:
//!
//! - [`RedisLock`]: `SET NX PX` with a compare-and-delete release script
//! - [`InMemoryLock`]: process-local map, for single-process deployments

mod error;
mod memory;
mod redis;

pub use error::LockError;
pub use memory::InMemoryLock;
pub use self::redis::RedisLock;

use async_trait::async_trait;
use backon::{Backoff, BackoffBuilder, ConstantBuilder, Retryable};
use rand::Rng;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

/// Proof of a held lease. Consumed by [`DistributedLock::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct LockHandle {
	resource: String,
	token: String,
	ttl: Duration,
}

impl LockHandle {
	/// Creates a handle with a fresh random token
	pub fn new(resource: impl Into<String>, ttl: Duration) -> Self {
		Self {
			resource: resource.into(),
			token: Uuid::new_v4().to_string(),
			ttl,
		}
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}

	/// Value stored under the resource; only its owner may delete it
	pub fn token(&self) -> &str {
		&self.token
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}
}

/// A named mutual-exclusion lease shared between processes
#[async_trait]
pub trait DistributedLock: Send + Sync {
	/// Takes the lease if nobody holds it. Returns `None` when it is taken.
	async fn try_acquire(
		&self,
		resource: &str,
		ttl: Duration,
	) -> Result<Option<LockHandle>, LockError>;

	/// Gives the lease back. Fails when it expired or changed owner meanwhile.
	async fn release(&self, handle: LockHandle) -> Result<(), LockError>;
}

/// Bounded retry schedule for lock acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRetryPolicy {
	/// Retries after the first attempt
	pub retry_count: u32,
	pub retry_delay: Duration,
	/// Upper bound of the random delay added to each retry
	pub retry_jitter: Duration,
}

impl Default for LockRetryPolicy {
	fn default() -> Self {
		Self {
			retry_count: 100,
			retry_delay: Duration::from_millis(200),
			retry_jitter: Duration::from_millis(200),
		}
	}
}

impl LockRetryPolicy {
	/// Builds the delays slept between attempts.
	///
	/// Yields `retry_count` delays, each `retry_delay` plus a uniform random
	/// share of `retry_jitter`.
	///
	/// # Returns
	/// * `impl Backoff` - Finite schedule usable with [`backon::Retryable`]
	pub fn backoff(&self) -> impl Backoff {
		let jitter_ms = self.retry_jitter.as_millis() as u64;
		ConstantBuilder::default()
			.with_delay(self.retry_delay)
			.with_max_times(self.retry_count as usize)
			.build()
			.map(move |delay| {
				if jitter_ms == 0 {
					delay
				} else {
					delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
				}
			})
	}
}

/// Tries to take `resource` until it succeeds or the policy's retries run out.
///
/// Makes at most `retry_count + 1` attempts. Only a taken lease is retried.
///
/// # Arguments
/// * `lock` - Lock store to contend on
/// * `resource` - Name of the lease
/// * `ttl` - Lease duration once acquired
/// * `policy` - Retry schedule
///
/// # Returns
/// * `Ok(Some(handle))` - The lease was acquired
/// * `Ok(None)` - Every attempt found the lease taken
/// * `Err(LockError)` - The store failed; returned without further attempts
#[instrument(skip(lock, policy))]
pub async fn acquire_with_retry(
	lock: &dyn DistributedLock,
	resource: &str,
	ttl: Duration,
	policy: &LockRetryPolicy,
) -> Result<Option<LockHandle>, LockError> {
	let operation = || async {
		lock.try_acquire(resource, ttl)
			.await?
			.ok_or_else(|| LockError::busy(resource))
	};

	let result = operation
		.retry(policy.backoff())
		.sleep(tokio::time::sleep)
		.when(LockError::is_busy)
		.notify(|_, delay| tracing::debug!(?delay, "Lock held, retrying"))
		.await;

	match result {
		Ok(handle) => {
			tracing::debug!("Lock acquired");
			Ok(Some(handle))
		}
		Err(e) if e.is_busy() => {
			tracing::warn!(
				attempts = policy.retry_count as u64 + 1,
				"Lock still held after all retries"
			);
			Ok(None)
		}
		Err(e) => Err(e),
	}
}

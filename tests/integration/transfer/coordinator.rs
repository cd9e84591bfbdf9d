use std::{
	sync::{
		atomic::{AtomicBool, AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use seed_token_client::{
	models::{SecretString, TransferRequest},
	services::{
		blockchain::{EvmClientTrait, TransactionCall},
		lock::{DistributedLock, InMemoryLock, LockError, LockHandle, LockRetryPolicy},
		transfer::{TransferCoordinator, TransferError, TransferSettings},
	},
	utils::metrics::LOCK_TIMEOUTS,
};

use crate::integration::mocks::{MockDistributedLock, MockEvmClientTrait};

const SENDER: &str = "0x00000000000000000000000000000000000000aa";
const RECIPIENT: &str = "0x00000000000000000000000000000000000000bb";

fn settings(retry_count: u32) -> TransferSettings {
	TransferSettings {
		retry: LockRetryPolicy {
			retry_count,
			retry_delay: Duration::from_millis(5),
			retry_jitter: Duration::from_millis(5),
		},
		..TransferSettings::default()
	}
}

fn request(amount: &str) -> TransferRequest {
	TransferRequest::new(SENDER, RECIPIENT, amount, SecretString::from("passphrase"))
}

/// Node that notices when a second unlock arrives before the previous
/// transfer's send finished
#[derive(Default)]
struct OverlapNode {
	in_flight: AtomicBool,
	overlaps: AtomicUsize,
	sent: AtomicUsize,
}

#[async_trait]
impl EvmClientTrait for OverlapNode {
	async fn get_balance(&self, _address: &Address) -> Result<U256, anyhow::Error> {
		Ok(U256::ZERO)
	}

	async fn new_account(&self, _passphrase: &SecretString) -> Result<Address, anyhow::Error> {
		Ok(Address::ZERO)
	}

	async fn unlock_account(
		&self,
		_address: &Address,
		_passphrase: &SecretString,
	) -> Result<(), anyhow::Error> {
		if self.in_flight.swap(true, Ordering::SeqCst) {
			self.overlaps.fetch_add(1, Ordering::SeqCst);
		}
		tokio::time::sleep(Duration::from_millis(30)).await;
		Ok(())
	}

	async fn send_transaction(&self, _call: &TransactionCall) -> Result<B256, anyhow::Error> {
		tokio::time::sleep(Duration::from_millis(10)).await;
		let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
		self.in_flight.store(false, Ordering::SeqCst);
		Ok(B256::with_last_byte(n as u8))
	}
}

#[tokio::test]
async fn test_concurrent_transfers_are_serialized() {
	let node = Arc::new(OverlapNode::default());
	let lock: Arc<dyn DistributedLock> = Arc::new(InMemoryLock::new());

	// Two coordinators, as two processes sharing one lock store would have
	let first = TransferCoordinator::new(node.clone(), Some(lock.clone()), settings(100));
	let second = TransferCoordinator::new(node.clone(), Some(lock), settings(100));

	let req = request("1");
	let (a, b) = tokio::join!(first.transfer(&req), second.transfer(&req));

	assert!(a.is_ok());
	assert!(b.is_ok());
	assert_ne!(a.unwrap(), b.unwrap());
	assert_eq!(node.overlaps.load(Ordering::SeqCst), 0);
	assert_eq!(node.sent.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unserialized_transfers_may_interleave() {
	let node = Arc::new(OverlapNode::default());
	let coordinator = TransferCoordinator::new(node.clone(), None, settings(0));
	assert!(!coordinator.is_serialized());

	let req = request("1");
	let (a, b) = tokio::join!(coordinator.transfer(&req), coordinator.transfer(&req));

	assert!(a.is_ok());
	assert!(b.is_ok());
	assert_eq!(node.overlaps.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sends_validated_call() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account()
		.withf(|address, passphrase| {
			*address == SENDER.parse::<Address>().unwrap() && passphrase.as_str() == "passphrase"
		})
		.times(1)
		.returning(|_, _| Ok(()));
	node.expect_send_transaction()
		.withf(|call: &TransactionCall| {
			call.from == SENDER.parse::<Address>().unwrap()
				&& call.to == RECIPIENT.parse::<Address>().unwrap()
				&& call.value == U256::from(1_500_000_000_000_000_000u64)
				&& call.gas_price == U256::from(20_000_000_000u64)
		})
		.times(1)
		.returning(|_| Ok(B256::with_last_byte(9)));

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire()
		.times(1)
		.returning(|resource, ttl| Ok(Some(LockHandle::new(resource, ttl))));
	lock.expect_release().times(1).returning(|_| Ok(()));

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(0));

	let hash = coordinator
		.transfer(&request("1.5").with_gas_price("20000000000"))
		.await
		.unwrap();
	assert_eq!(hash, B256::with_last_byte(9));
}

#[tokio::test]
async fn test_lock_released_when_send_fails() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account()
		.times(1)
		.returning(|_, _| Ok(()));
	node.expect_send_transaction()
		.times(1)
		.returning(|_| Err(anyhow::anyhow!("insufficient funds")));

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire()
		.times(1)
		.returning(|resource, ttl| Ok(Some(LockHandle::new(resource, ttl))));
	lock.expect_release().times(1).returning(|_| Ok(()));

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(0));

	let result = coordinator.transfer(&request("1")).await;
	assert!(matches!(result, Err(TransferError::SendError(_))));
}

#[tokio::test]
async fn test_lock_released_when_unlock_fails() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account()
		.times(1)
		.returning(|_, _| Err(anyhow::anyhow!("could not decrypt key with given password")));
	node.expect_send_transaction().times(0);

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire()
		.times(1)
		.returning(|resource, ttl| Ok(Some(LockHandle::new(resource, ttl))));
	lock.expect_release().times(1).returning(|_| Ok(()));

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(0));

	let result = coordinator.transfer(&request("1")).await;
	assert!(matches!(result, Err(TransferError::UnlockError(_))));
}

#[tokio::test]
async fn test_validation_happens_before_locking() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account().times(0);
	node.expect_send_transaction().times(0);

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire().times(0);
	lock.expect_release().times(0);

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(0));

	let bad_requests = vec![
		TransferRequest::new("0x123", RECIPIENT, "1", SecretString::from("pw")),
		TransferRequest::new(SENDER, "not-an-address", "1", SecretString::from("pw")),
		TransferRequest::new(SENDER, RECIPIENT, "-1", SecretString::from("pw")),
		TransferRequest::new(SENDER, RECIPIENT, "abc", SecretString::from("pw")),
		request("1").with_gas_price("0x4a817c800"),
		request("1").with_gas_price("1000000000001"),
	];

	for bad in bad_requests {
		assert!(
			matches!(
				coordinator.transfer(&bad).await,
				Err(TransferError::ValidationError(_))
			),
			"request should be rejected: {:?}",
			bad
		);
	}
}

#[tokio::test]
async fn test_lock_timeout() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account().times(0);
	node.expect_send_transaction().times(0);

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire().times(3).returning(|_, _| Ok(None));
	lock.expect_release().times(0);

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(2));

	let timeouts_before = LOCK_TIMEOUTS.get();
	match coordinator.transfer(&request("1")).await {
		Err(TransferError::LockTimeoutError(ctx)) => {
			assert!(ctx.to_string().contains("Transfer lock not acquired"));
		}
		other => panic!("Expected LockTimeoutError, got {:?}", other),
	}
	assert!(LOCK_TIMEOUTS.get() > timeouts_before);
}

#[tokio::test]
async fn test_lock_store_failure() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account().times(0);
	node.expect_send_transaction().times(0);

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire()
		.times(1)
		.returning(|_, _| Err(LockError::connection_error("connection refused", None, None)));
	lock.expect_release().times(0);

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(5));

	let result = coordinator.transfer(&request("1")).await;
	assert!(matches!(result, Err(TransferError::LockError(_))));
}

#[tokio::test]
async fn test_release_failure_keeps_send_result() {
	let mut node = MockEvmClientTrait::new();
	node.expect_unlock_account()
		.times(1)
		.returning(|_, _| Ok(()));
	node.expect_send_transaction()
		.times(1)
		.returning(|_| Ok(B256::with_last_byte(3)));

	let mut lock = MockDistributedLock::new();
	lock.expect_try_acquire()
		.times(1)
		.returning(|resource, ttl| Ok(Some(LockHandle::new(resource, ttl))));
	lock.expect_release()
		.times(1)
		.returning(|_| Err(LockError::operation_error("Lock lease expired before release", None, None)));

	let coordinator =
		TransferCoordinator::new(Arc::new(node), Some(Arc::new(lock)), settings(0));

	assert_eq!(
		coordinator.transfer(&request("1")).await.unwrap(),
		B256::with_last_byte(3)
	);
}

#[tokio::test]
async fn test_lock_taken_after_retries() {
	let node = Arc::new(OverlapNode::default());
	let lock = Arc::new(InMemoryLock::new());

	let settings = settings(50);
	let held = lock
		.try_acquire(&settings.lock_resource, Duration::from_secs(5))
		.await
		.unwrap()
		.unwrap();

	let coordinator = TransferCoordinator::new(node.clone(), Some(lock.clone()), settings);
	let transfer = tokio::spawn(async move { coordinator.transfer(&request("1")).await });

	tokio::time::sleep(Duration::from_millis(30)).await;
	assert_eq!(node.sent.load(Ordering::SeqCst), 0);
	lock.release(held).await.unwrap();

	assert!(transfer.await.unwrap().is_ok());
	assert_eq!(node.sent.load(Ordering::SeqCst), 1);
}

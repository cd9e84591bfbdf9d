use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Blocks per window when the caller does not choose
pub const DEFAULT_BUFFER_SIZE: u64 = 50;

/// Wall-clock budget for a scan when the caller does not choose
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters of one "last N transfers for an address" query.
///
/// The raw scan reads `buffer_size`, `timeout` and `since_timestamp`; the
/// indexed backend only needs `address` and `max_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
	/// Account whose transfers are wanted
	pub address: String,
	/// Maximum number of transfers returned
	pub max_count: usize,
	/// Blocks fetched per window
	#[serde(default = "default_buffer_size")]
	pub buffer_size: u64,
	/// Scan stops before fetching a new window once this has elapsed
	#[serde(default = "default_timeout", with = "duration_millis")]
	pub timeout: Duration,
	/// Scan stops once a window's newest block is older than this (unix seconds)
	#[serde(default)]
	pub since_timestamp: Option<u64>,
}

fn default_buffer_size() -> u64 {
	DEFAULT_BUFFER_SIZE
}

fn default_timeout() -> Duration {
	DEFAULT_SCAN_TIMEOUT
}

mod duration_millis {
	use serde::{Deserialize, Deserializer, Serializer};
	use std::time::Duration;

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(value.as_millis() as u64)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}

impl ScanRequest {
	pub fn new(address: impl Into<String>, max_count: usize) -> Self {
		Self {
			address: address.into(),
			max_count,
			buffer_size: DEFAULT_BUFFER_SIZE,
			timeout: DEFAULT_SCAN_TIMEOUT,
			since_timestamp: None,
		}
	}

	pub fn with_buffer_size(mut self, buffer_size: u64) -> Self {
		self.buffer_size = buffer_size;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_since(mut self, since_timestamp: u64) -> Self {
		self.since_timestamp = Some(since_timestamp);
		self
	}
}

//! Metrics module for the client.
//!
//! - Holds the Prometheus registry for the process.
//! - Defines counters for history scans, serialized transfers and lock usage.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, IntCounter, Opts, Registry, TextEncoder};

lazy_static! {
	/// Registry holding every metric defined in this module.
	pub static ref REGISTRY: Registry = Registry::new();

	/// Block windows fetched by the backward scanner.
	pub static ref SCAN_WINDOWS_FETCHED: IntCounter = {
		let counter = IntCounter::new(
			"scan_windows_fetched_total",
			"Block windows fetched by history scans",
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Completed history scans, labelled by the reason they stopped.
	pub static ref SCANS_COMPLETED: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("scans_completed_total", "History scans by stop reason"),
			&["reason"],
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Transfers submitted, labelled by outcome.
	pub static ref TRANSFERS: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("transfers_total", "Transfers by outcome"),
			&["outcome"],
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Distributed lock leases obtained for transfers.
	pub static ref LOCK_ACQUISITIONS: IntCounter = {
		let counter = IntCounter::new(
			"transfer_lock_acquisitions_total",
			"Distributed lock leases obtained for transfers",
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Transfers that gave up waiting for the distributed lock.
	pub static ref LOCK_TIMEOUTS: IntCounter = {
		let counter = IntCounter::new(
			"transfer_lock_timeouts_total",
			"Transfers that exhausted the lock retry budget",
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};
}

/// Encodes every registered metric in the Prometheus text format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

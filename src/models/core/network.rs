use serde::{Deserialize, Serialize};

use crate::models::SecretValue;

/// Weight given to a single endpoint built from a bare URL
const DEFAULT_RPC_WEIGHT: u32 = 100;

/// Connection details for one node deployment.
///
/// A deployment may expose several RPC endpoints. The highest weighted one that
/// answers the connectivity probe becomes active and the rest are fallbacks.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Network {
	/// Unique identifier, also the key clients are cached under
	pub slug: String,

	/// Human-readable name of the network
	pub name: String,

	/// RPC endpoints with their weights
	pub rpc_urls: Vec<RpcUrl>,

	/// Chain ID, when known
	#[serde(default)]
	pub chain_id: Option<u64>,
}

/// RPC endpoint with a load balancing weight
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RpcUrl {
	/// Type of endpoint; only "rpc" entries are used
	pub type_: String,

	/// URL of the endpoint (can be a secret value)
	pub url: SecretValue,

	/// Weight for ordering (0 disables the endpoint)
	pub weight: u32,
}

impl Network {
	/// Builds a single-endpoint network from a node URL.
	///
	/// The URL doubles as the slug so two callers asking for the same node share
	/// one cached client.
	pub fn from_url(url: &str) -> Self {
		Self::from_urls(&[url.to_string()])
	}

	/// Builds a network from a primary URL followed by fallbacks, weighted in
	/// the order given.
	pub fn from_urls(urls: &[String]) -> Self {
		let slug = urls.first().cloned().unwrap_or_default();
		let rpc_urls = urls
			.iter()
			.enumerate()
			.map(|(i, url)| RpcUrl {
				type_: "rpc".to_string(),
				url: SecretValue::from(url.as_str()),
				weight: DEFAULT_RPC_WEIGHT.saturating_sub(i as u32).max(1),
			})
			.collect();

		Self {
			name: slug.clone(),
			slug,
			rpc_urls,
			chain_id: None,
		}
	}

	/// Endpoints eligible for connection, highest weight first
	pub fn active_rpc_urls(&self) -> Vec<&RpcUrl> {
		let mut urls: Vec<_> = self
			.rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.type_ == "rpc" && rpc_url.weight > 0)
			.collect();
		urls.sort_by(|a, b| b.weight.cmp(&a.weight));
		urls
	}
}

//! Test helper utilities for Network configuration
//!
//! - `NetworkBuilder`: Builder for creating test Network instances

use crate::models::{Network, RpcUrl, SecretString, SecretValue};

/// Builder for creating test Network instances
pub struct NetworkBuilder {
	name: String,
	slug: String,
	chain_id: Option<u64>,
	rpc_urls: Vec<RpcUrl>,
}

impl Default for NetworkBuilder {
	fn default() -> Self {
		Self {
			name: "Test Network".to_string(),
			slug: "test_network".to_string(),
			chain_id: Some(1),
			rpc_urls: vec![RpcUrl {
				type_: "rpc".to_string(),
				url: SecretValue::Plain(SecretString::new("https://test.network".to_string())),
				weight: 100,
			}],
		}
	}
}

impl NetworkBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: &str) -> Self {
		self.name = name.to_string();
		self
	}

	pub fn slug(mut self, slug: &str) -> Self {
		self.slug = slug.to_string();
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = Some(chain_id);
		self
	}

	/// Replaces every endpoint with a single weighted "rpc" URL.
	pub fn rpc_url(mut self, url: &str) -> Self {
		self.rpc_urls = vec![RpcUrl {
			type_: "rpc".to_string(),
			url: SecretValue::Plain(SecretString::new(url.to_string())),
			weight: 100,
		}];
		self
	}

	/// Replaces every endpoint with the given URLs, weighted in order.
	pub fn rpc_urls(mut self, urls: Vec<&str>) -> Self {
		self.rpc_urls = urls
			.into_iter()
			.enumerate()
			.map(|(i, url)| RpcUrl {
				type_: "rpc".to_string(),
				url: SecretValue::Plain(SecretString::new(url.to_string())),
				weight: 100u32.saturating_sub(i as u32),
			})
			.collect();
		self
	}

	/// Appends an endpoint. The first call drops the default endpoint.
	pub fn add_rpc_url(mut self, url: &str, type_: &str, weight: u32) -> Self {
		if self.rpc_urls.len() == 1 && self.rpc_urls[0].url.as_str() == "https://test.network" {
			self.rpc_urls.clear();
		}
		self.rpc_urls.push(RpcUrl {
			type_: type_.to_string(),
			url: SecretValue::Plain(SecretString::new(url.to_string())),
			weight,
		});
		self
	}

	pub fn clear_rpc_urls(mut self) -> Self {
		self.rpc_urls.clear();
		self
	}

	pub fn build(self) -> Network {
		Network {
			name: self.name,
			slug: self.slug,
			chain_id: self.chain_id,
			rpc_urls: self.rpc_urls,
		}
	}
}

//! Client configuration loading and validation.
//!
//! Configuration comes from a JSON file or from `SEED_`-prefixed environment
//! variables (a `.env` file is honoured). Every field has a default so an
//! empty file or environment yields a working local setup.

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fmt, path::Path, str::FromStr, time::Duration};
use url::Url;

use crate::{
	models::{config::error::ConfigError, ConfigLoader, SecretValue},
	utils::parse_wei,
};

/// Prefix of every environment variable read by [`ClientConfig::from_env`]
pub const ENV_PREFIX: &str = "SEED_";

/// Where transfer history is read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackendKind {
	/// Walk blocks backwards on the node
	#[default]
	Raw,
	/// Ask an Etherscan-compatible explorer
	Indexed,
}

impl FromStr for HistoryBackendKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"raw" => Ok(Self::Raw),
			"indexed" => Ok(Self::Indexed),
			other => Err(format!("unknown history backend '{}'", other)),
		}
	}
}

impl fmt::Display for HistoryBackendKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Raw => write!(f, "raw"),
			Self::Indexed => write!(f, "indexed"),
		}
	}
}

/// Settings for one client deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
	/// Raise the log level to debug
	pub debug: bool,
	/// Primary node endpoint
	pub node_url: String,
	/// Endpoints tried when the primary is rate limited or unreachable
	pub fallback_node_urls: Vec<String>,
	/// Serialize unlock+send across every process sharing `lock_resource`
	pub serialize_transfers: bool,
	/// Name of the distributed lock all transfers contend for
	pub lock_resource: String,
	/// Redis URL of the lock service; an in-process lock is used when unset
	pub lock_url: Option<String>,
	/// Lease after which a held lock expires on its own
	pub lock_ttl_ms: u64,
	/// Retries after the first acquisition attempt; 0 tries once
	pub lock_retry_count: u32,
	/// Fixed delay between acquisition attempts
	pub lock_retry_delay_ms: u64,
	/// Upper bound of the random delay added to each retry
	pub lock_retry_jitter_ms: u64,
	/// Blocks per scan window
	pub buffer_size: u64,
	/// Default wall-clock budget of a scan
	pub scan_timeout_ms: u64,
	/// Highest accepted gas price, in wei
	pub gas_price_ceiling: String,
	/// Gas price used when the caller gives none, in wei
	pub default_gas_price: String,
	/// History backend
	pub history_backend: HistoryBackendKind,
	/// Base URL of the explorer API (required for the indexed backend)
	pub explorer_url: Option<String>,
	/// Explorer API key
	pub explorer_api_key: Option<SecretValue>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			debug: false,
			node_url: "http://localhost:8545".to_string(),
			fallback_node_urls: Vec::new(),
			serialize_transfers: true,
			lock_resource: "seed-token-client:transfer".to_string(),
			lock_url: None,
			lock_ttl_ms: 30_000,
			lock_retry_count: 100,
			lock_retry_delay_ms: 200,
			lock_retry_jitter_ms: 200,
			buffer_size: 50,
			scan_timeout_ms: 5_000,
			// 1000 gwei
			gas_price_ceiling: "1000000000000".to_string(),
			default_gas_price: "0".to_string(),
			history_backend: HistoryBackendKind::Raw,
			explorer_url: None,
			explorer_api_key: None,
		}
	}
}

fn override_from_env<T>(key: &str, target: &mut T) -> Result<(), ConfigError>
where
	T: FromStr,
	T::Err: fmt::Display,
{
	let name = format!("{}{}", ENV_PREFIX, key);
	if let Ok(raw) = env::var(&name) {
		*target = raw.trim().parse::<T>().map_err(|e| {
			ConfigError::parse_error(
				format!("invalid value for {}: {}", name, e),
				None,
				Some(HashMap::from([("variable".to_string(), name.clone())])),
			)
		})?;
	}
	Ok(())
}

fn optional_from_env(key: &str) -> Option<String> {
	env::var(format!("{}{}", ENV_PREFIX, key))
		.ok()
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

impl ClientConfig {
	/// Builds a configuration from defaults overridden by `SEED_*` variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();
		let mut config = Self::default();

		override_from_env("DEBUG", &mut config.debug)?;
		override_from_env("NODE_URL", &mut config.node_url)?;
		if let Some(urls) = optional_from_env("FALLBACK_NODE_URLS") {
			config.fallback_node_urls = urls
				.split(',')
				.map(|u| u.trim().to_string())
				.filter(|u| !u.is_empty())
				.collect();
		}
		override_from_env("SERIALIZE_TRANSFERS", &mut config.serialize_transfers)?;
		override_from_env("LOCK_RESOURCE", &mut config.lock_resource)?;
		config.lock_url = optional_from_env("LOCK_URL").or(config.lock_url);
		override_from_env("LOCK_TTL_MS", &mut config.lock_ttl_ms)?;
		override_from_env("LOCK_RETRY_COUNT", &mut config.lock_retry_count)?;
		override_from_env("LOCK_RETRY_DELAY_MS", &mut config.lock_retry_delay_ms)?;
		override_from_env("LOCK_RETRY_JITTER_MS", &mut config.lock_retry_jitter_ms)?;
		override_from_env("BUFFER_SIZE", &mut config.buffer_size)?;
		override_from_env("SCAN_TIMEOUT_MS", &mut config.scan_timeout_ms)?;
		override_from_env("GAS_PRICE_CEILING", &mut config.gas_price_ceiling)?;
		override_from_env("DEFAULT_GAS_PRICE", &mut config.default_gas_price)?;
		override_from_env("HISTORY_BACKEND", &mut config.history_backend)?;
		config.explorer_url = optional_from_env("EXPLORER_URL").or(config.explorer_url);
		if env::var(format!("{}EXPLORER_API_KEY", ENV_PREFIX)).is_ok() {
			config.explorer_api_key = Some(SecretValue::Environment(format!(
				"{}EXPLORER_API_KEY",
				ENV_PREFIX
			)));
		}

		config.validate()?;
		Ok(config)
	}

	/// Primary URL followed by fallbacks
	pub fn node_urls(&self) -> Vec<String> {
		std::iter::once(self.node_url.clone())
			.chain(self.fallback_node_urls.iter().cloned())
			.collect()
	}

	pub fn scan_timeout(&self) -> Duration {
		Duration::from_millis(self.scan_timeout_ms)
	}

	pub fn lock_ttl(&self) -> Duration {
		Duration::from_millis(self.lock_ttl_ms)
	}

	/// Gas price ceiling in wei
	pub fn gas_price_ceiling_wei(&self) -> Result<U256, ConfigError> {
		parse_wei_field("gas_price_ceiling", &self.gas_price_ceiling)
	}

	/// Default gas price in wei
	pub fn default_gas_price_wei(&self) -> Result<U256, ConfigError> {
		parse_wei_field("default_gas_price", &self.default_gas_price)
	}

	fn validate_url(field: &str, value: &str, schemes: &[&str]) -> Result<(), ConfigError> {
		let metadata = Some(HashMap::from([
			("field".to_string(), field.to_string()),
			("value".to_string(), value.to_string()),
		]));
		let url = Url::parse(value).map_err(|e| {
			ConfigError::validation_error(
				format!("{} is not a valid URL", field),
				Some(Box::new(e)),
				metadata.clone(),
			)
		})?;
		if !schemes.contains(&url.scheme()) {
			return Err(ConfigError::validation_error(
				format!("{} must use one of the schemes {:?}", field, schemes),
				None,
				metadata,
			));
		}
		Ok(())
	}
}

fn parse_wei_field(field: &str, value: &str) -> Result<U256, ConfigError> {
	parse_wei(value).map_err(|e| {
		ConfigError::validation_error(
			format!("{} must be an amount in wei: {}", field, e),
			None,
			Some(HashMap::from([("field".to_string(), field.to_string())])),
		)
	})
}

fn positive(field: &str, value: u64) -> Result<(), ConfigError> {
	if value == 0 {
		return Err(ConfigError::validation_error(
			format!("{} must be greater than 0", field),
			None,
			Some(HashMap::from([("field".to_string(), field.to_string())])),
		));
	}
	Ok(())
}

#[async_trait]
impl ConfigLoader for ClientConfig {
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let metadata = Some(HashMap::from([(
			"path".to_string(),
			path.display().to_string(),
		)]));
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read config file: {}", e),
				Some(Box::new(e)),
				metadata.clone(),
			)
		})?;
		let config: ClientConfig = serde_json::from_str(&content).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse config file: {}", e),
				Some(Box::new(e)),
				metadata,
			)
		})?;

		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		Self::validate_url("node_url", &self.node_url, &["http", "https"])?;
		for url in &self.fallback_node_urls {
			Self::validate_url("fallback_node_urls", url, &["http", "https"])?;
		}

		positive("buffer_size", self.buffer_size)?;

		if self.serialize_transfers {
			if self.lock_resource.trim().is_empty() {
				return Err(ConfigError::validation_error(
					"lock_resource must not be empty",
					None,
					None,
				));
			}
			positive("lock_ttl_ms", self.lock_ttl_ms)?;
			if let Some(lock_url) = &self.lock_url {
				Self::validate_url("lock_url", lock_url, &["redis", "rediss"])?;
			}
		}

		let ceiling = self.gas_price_ceiling_wei()?;
		let default_price = self.default_gas_price_wei()?;
		if default_price > ceiling {
			return Err(ConfigError::validation_error(
				"default_gas_price exceeds gas_price_ceiling",
				None,
				Some(HashMap::from([
					("default_gas_price".to_string(), self.default_gas_price.clone()),
					("gas_price_ceiling".to_string(), self.gas_price_ceiling.clone()),
				])),
			));
		}

		match (&self.history_backend, &self.explorer_url) {
			(HistoryBackendKind::Indexed, None) => {
				return Err(ConfigError::validation_error(
					"explorer_url is required for the indexed history backend",
					None,
					None,
				));
			}
			(_, Some(explorer_url)) => {
				Self::validate_url("explorer_url", explorer_url, &["http", "https"])?;
			}
			_ => {}
		}

		Ok(())
	}
}

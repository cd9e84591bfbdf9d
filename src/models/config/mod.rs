//! Configuration loading and validation.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use std::path::Path;

mod client_config;
mod error;

pub use client_config::{ClientConfig, HistoryBackendKind, ENV_PREFIX};
pub use error::ConfigError;

/// Common interface for file-backed configuration
#[async_trait]
pub trait ConfigLoader: Sized {
	/// Load and validate configuration from a JSON file
	async fn load_from_path(path: &Path) -> Result<Self, error::ConfigError>;

	/// Validate the configuration
	fn validate(&self) -> Result<(), error::ConfigError>;
}

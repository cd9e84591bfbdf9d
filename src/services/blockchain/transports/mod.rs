//! Node transports.
//!
//! - `HttpTransportClient`: JSON-RPC over HTTP with endpoint rotation
//! - `EVMTransportClient`: the transport used by the EVM client

mod evm {
	pub mod http;
}

mod endpoint_manager;
mod error;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use evm::http::EVMTransportClient;
pub use http::HttpTransportClient;

use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};

/// HTTP status codes that make the endpoint manager switch to a fallback
/// - 429: Too Many Requests
pub const ROTATE_ON_ERROR_CODES: [u16; 1] = [429];

/// JSON-RPC request used to probe an endpoint before using it
pub fn net_version_probe() -> Value {
	json!({
		"jsonrpc": "2.0",
		"id": 1,
		"method": "net_version",
		"params": []
	})
}

/// Base trait for node transports
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// URL requests currently go to
	async fn get_current_url(&self) -> String;

	/// Sends a JSON-RPC request and returns the whole response envelope
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Builds the JSON-RPC 2.0 envelope for a call
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(|p| p.into())
		})
	}

	/// Replaces the HTTP client, e.g. to change the retry policy
	fn update_endpoint_manager_client(
		&mut self,
		client: ClientWithMiddleware,
	) -> Result<(), anyhow::Error>;
}

/// Transports that can move to another endpoint
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Probes `url`
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error>;

	/// Points subsequent requests at `url`
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error>;
}

/// Retries what reqwest-retry considers transient
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}

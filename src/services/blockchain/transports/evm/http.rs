//! Transport used by the EVM client.
//!
//! Wraps [`HttpTransportClient`] with the `net_version` probe so that mocks can
//! stand in for a single concrete type in tests.

use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;

use crate::{
	models::Network,
	services::blockchain::transports::{
		BlockchainTransport, HttpTransportClient, RotatingTransport, TransportError,
	},
};

/// JSON-RPC transport to an EVM node
///
/// Every call is forwarded to the wrapped [`HttpTransportClient`], which owns
/// retries and endpoint rotation.
#[derive(Clone, Debug)]
pub struct EVMTransportClient {
	/// HTTP transport doing the actual JSON-RPC round trips
	pub http_client: HttpTransportClient,
}

impl EVMTransportClient {
	/// Connects to the first reachable RPC URL of `network`
	///
	/// Each candidate URL is probed with `net_version` before it is used.
	///
	/// # Arguments
	/// * `network` - Network whose weighted RPC URLs are tried
	///
	/// # Returns
	/// * `Result<Self, anyhow::Error>` - The transport, or an error when no URL answered
	pub async fn new(network: &Network) -> Result<Self, anyhow::Error> {
		let test_connection_payload =
			Some(r#"{"id":1,"jsonrpc":"2.0","method":"net_version","params":[]}"#.to_string());
		let http_client = HttpTransportClient::new(network, test_connection_payload).await?;
		Ok(Self { http_client })
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for EVMTransportClient {
	/// URL requests are currently sent to
	async fn get_current_url(&self) -> String {
		self.http_client.get_current_url().await
	}

	/// Sends one JSON-RPC call to the node
	///
	/// # Arguments
	/// * `method` - RPC method name, e.g. `eth_getBlockByNumber`
	/// * `params` - Positional parameters, if any
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - The full JSON-RPC response body
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.http_client.send_raw_request(method, params).await
	}

	/// Swaps the HTTP client used by the endpoint manager
	///
	/// # Arguments
	/// * `client` - Client carrying the retry middleware
	fn update_endpoint_manager_client(
		&mut self,
		client: ClientWithMiddleware,
	) -> Result<(), anyhow::Error> {
		self.http_client.update_endpoint_manager_client(client)
	}
}

#[async_trait::async_trait]
impl RotatingTransport for EVMTransportClient {
	/// Probes `url` without switching to it
	///
	/// # Arguments
	/// * `url` - Candidate RPC endpoint
	///
	/// # Returns
	/// * `Result<(), anyhow::Error>` - Ok when the endpoint answered the probe
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		self.http_client.try_connect(url).await
	}

	/// Makes `url` the active endpoint
	///
	/// # Arguments
	/// * `url` - RPC endpoint to switch to
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		self.http_client.update_client(url).await
	}
}

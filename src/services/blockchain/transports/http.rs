//! JSON-RPC over HTTP.
//!
//! The client probes the configured endpoints in weight order and keeps the
//! first that answers as active; the rest become fallbacks for the
//! [`EndpointManager`].

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::{
	models::Network,
	services::blockchain::transports::{
		net_version_probe, BlockchainTransport, EndpointManager, RotatingTransport,
		TransientErrorRetryStrategy, TransportError,
	},
	utils::http::{create_retryable_http_client, RetryConfig},
};

/// HTTP transport with retries and endpoint failover
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Retryable HTTP client shared with the endpoint manager
	pub client: ClientWithMiddleware,
	endpoint_manager: EndpointManager,
	/// Probe request sent before an endpoint is used
	test_connection_payload: Value,
}

impl HttpTransportClient {
	/// Connects to the highest weighted endpoint that answers the probe.
	///
	/// `test_connection_payload` replaces the default `net_version` probe.
	/// The remaining URLs become fallbacks in weight order.
	///
	/// # Arguments
	/// * `network` - Network whose active RPC URLs are tried
	/// * `test_connection_payload` - Optional JSON-RPC request used as the probe
	///
	/// # Returns
	/// * `Result<Self, anyhow::Error>` - The transport, or an error when the
	///   payload is not JSON or no URL answered
	pub async fn new(
		network: &Network,
		test_connection_payload: Option<String>,
	) -> Result<Self, anyhow::Error> {
		let rpc_urls = network.active_rpc_urls();

		let test_connection_payload = match test_connection_payload {
			Some(payload) => {
				serde_json::from_str(&payload).context("Failed to parse test payload as JSON")?
			}
			None => net_version_probe(),
		};

		let base_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(20))
			.build()
			.context("Failed to create base HTTP client")?;

		let client = create_retryable_http_client(
			&RetryConfig::default(),
			base_client,
			Some(TransientErrorRetryStrategy),
		);

		for rpc_url in rpc_urls.iter() {
			let Ok(url) = Url::parse(rpc_url.url.as_ref()) else {
				tracing::warn!(url = rpc_url.url.as_str(), "Skipping invalid RPC URL");
				continue;
			};

			let reachable = match client
				.post(url.clone())
				.json(&test_connection_payload)
				.send()
				.await
			{
				Ok(response) => response.status().is_success(),
				Err(_) => false,
			};

			if !reachable {
				tracing::debug!(%url, "RPC endpoint failed the connection probe");
				continue;
			}

			let fallback_urls: Vec<String> = rpc_urls
				.iter()
				.filter(|other| other.url != rpc_url.url)
				.map(|other| other.url.as_ref().to_string())
				.collect();

			return Ok(Self {
				client: client.clone(),
				endpoint_manager: EndpointManager::new(
					client,
					rpc_url.url.as_ref(),
					fallback_urls,
				),
				test_connection_payload,
			});
		}

		Err(anyhow::anyhow!(
			"All RPC URLs failed to connect for network '{}'",
			network.slug
		))
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	/// Endpoint currently selected by the endpoint manager
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	/// Sends a JSON-RPC call, rotating endpoints on rate limits and network errors
	///
	/// # Arguments
	/// * `method` - RPC method name
	/// * `params` - Positional parameters, if any
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - Response body or the last transport error
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}

	/// Replaces the HTTP client the endpoint manager sends with
	///
	/// # Arguments
	/// * `client` - New client, usually built by `create_retryable_http_client`
	fn update_endpoint_manager_client(
		&mut self,
		client: ClientWithMiddleware,
	) -> Result<(), anyhow::Error> {
		self.endpoint_manager.update_client(client);
		Ok(())
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	/// Sends the probe to `url` and requires a 2xx answer
	///
	/// # Arguments
	/// * `url` - Candidate endpoint
	///
	/// # Returns
	/// * `Result<(), anyhow::Error>` - Error on an invalid URL, a network failure
	///   or a non-success status
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		let url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;

		let response = self
			.client
			.post(url.clone())
			.json(&self.test_connection_payload)
			.send()
			.await
			.map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", url, e))?;

		if !response.status().is_success() {
			return Err(anyhow::anyhow!(
				"Failed to connect to {}: {}",
				url,
				response.status().as_u16()
			));
		}
		Ok(())
	}

	/// Points the endpoint manager at `url`, without a trailing slash
	///
	/// # Arguments
	/// * `url` - New active endpoint
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		let parsed_url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;
		let mut active_url = self.endpoint_manager.active_url.write().await;
		*active_url = parsed_url.as_str().trim_end_matches('/').to_string();
		Ok(())
	}
}

//! Active endpoint tracking and failover.
//!
//! Requests go to the active URL. A rate limited answer or a network failure
//! moves the active URL to the first fallback that passes the probe, and the
//! previously active URL joins the back of the fallback list.

use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

use crate::services::blockchain::transports::{
	RotatingTransport, TransportError, ROTATE_ON_ERROR_CODES,
};

/// Tracks the active RPC URL and its fallbacks
#[derive(Clone, Debug)]
pub struct EndpointManager {
	/// URL every request goes to first
	pub active_url: Arc<RwLock<String>>,
	/// Candidates for rotation, tried front to back
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	// Held for the whole rotation so concurrent failures rotate once
	rotation_lock: Arc<Mutex<()>>,
}

/// What happened to a single request on a single URL
#[derive(Debug)]
enum AttemptOutcome {
	/// A response arrived (its status may still be an error)
	Response(reqwest::Response),
	/// The request could not be sent or timed out
	NetworkError(reqwest_middleware::Error),
	/// The request body could not be built
	SerializationError(TransportError),
}

impl EndpointManager {
	/// Creates a manager starting on `active_url`
	///
	/// # Arguments
	/// * `client` - HTTP client used for every request
	/// * `active_url` - Endpoint used until a rotation happens
	/// * `fallback_urls` - Endpoints to rotate to, in preference order
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			client,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	/// Replaces the HTTP client
	pub fn update_client(&mut self, client: ClientWithMiddleware) {
		self.client = client;
	}

	/// Switches the active URL to the first fallback that accepts a connection.
	///
	/// The previous active URL moves to the back of the fallback list. Only one
	/// rotation runs at a time.
	///
	/// # Arguments
	/// * `transport` - Transport used to probe and adopt the candidate
	///
	/// # Returns
	/// * `Result<String, TransportError>` - The new active URL, or a rotation
	///   error when no usable fallback exists
	pub async fn try_rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<String, TransportError> {
		let _guard = self.rotation_lock.lock().await;
		let current = self.active_url.read().await.clone();
		let fallbacks = self.fallback_urls.read().await.clone();

		let candidate = fallbacks
			.iter()
			.find(|url| **url != current)
			.cloned()
			.ok_or_else(|| {
				TransportError::url_rotation(
					"No fallback URLs available",
					None,
					Some(HashMap::from([
						("active_url".to_string(), current.clone()),
						("fallback_urls".to_string(), fallbacks.join(",")),
					])),
				)
			})?;

		tracing::debug!(from = %current, to = %candidate, "Rotating RPC endpoint");

		transport.try_connect(&candidate).await.map_err(|e| {
			TransportError::url_rotation(
				format!("Failed to connect to new URL '{}'", candidate),
				Some(e.into()),
				None,
			)
		})?;

		transport.update_client(&candidate).await.map_err(|e| {
			TransportError::url_rotation(
				format!("Failed to update transport client with new URL '{}'", candidate),
				Some(e.into()),
				None,
			)
		})?;

		let mut active_guard = self.active_url.write().await;
		let mut fallback_guard = self.fallback_urls.write().await;

		let mut next_fallbacks: Vec<String> = fallback_guard
			.iter()
			.filter(|url| **url != candidate)
			.cloned()
			.collect();
		next_fallbacks.push(current);

		*fallback_guard = next_fallbacks;
		*active_guard = candidate.clone();

		Ok(candidate)
	}

	async fn try_request_on_url<P>(
		&self,
		url: &str,
		transport: &impl RotatingTransport,
		method: &str,
		params: Option<P>,
	) -> AttemptOutcome
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let request_body = transport.customize_request(method, params).await;

		let body = match serde_json::to_string(&request_body) {
			Ok(body) => body,
			Err(e) => {
				return AttemptOutcome::SerializationError(TransportError::request_serialization(
					"Failed to serialize request JSON",
					Some(Box::new(e)),
					None,
				));
			}
		};

		match self
			.client
			.post(url)
			.header("Content-Type", "application/json")
			.body(body)
			.send()
			.await
		{
			Ok(response) => AttemptOutcome::Response(response),
			Err(e) => AttemptOutcome::NetworkError(e),
		}
	}

	/// Sends a JSON-RPC request, rotating endpoints on rate limiting and
	/// network failures until one answers or no fallback is left.
	///
	/// Other HTTP errors are returned without rotating.
	///
	/// # Arguments
	/// * `transport` - Transport that builds the request body and handles rotation
	/// * `method` - RPC method name
	/// * `params` - Positional parameters, if any
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - Parsed JSON response or the error that
	///   ended the attempts
	pub async fn send_raw_request<T, P>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		T: RotatingTransport,
		P: Into<Value> + Send + Clone + Serialize,
	{
		loop {
			let url = self.active_url.read().await.clone();

			match self
				.try_request_on_url(&url, transport, method, params.clone())
				.await
			{
				AttemptOutcome::Response(response) => {
					let status = response.status();
					if status.is_success() {
						return response.json().await.map_err(|e| {
							TransportError::response_parse(
								"Failed to parse JSON response",
								Some(Box::new(e)),
								Some(HashMap::from([("method".to_string(), method.to_string())])),
							)
						});
					}

					let body = response.text().await.unwrap_or_default();
					tracing::warn!(%url, %status, method, "RPC request failed");

					if !ROTATE_ON_ERROR_CODES.contains(&status.as_u16()) {
						return Err(TransportError::http(status, url, body, None, None));
					}

					if let Err(rotation_error) = self.try_rotate_url(transport).await {
						return Err(TransportError::http(
							status,
							url,
							body,
							Some(Box::new(rotation_error)),
							None,
						));
					}
				}
				AttemptOutcome::NetworkError(network_error) => {
					tracing::warn!(%url, method, error = %network_error, "RPC endpoint unreachable");

					if let Err(rotation_error) = self.try_rotate_url(transport).await {
						return Err(TransportError::network(
							network_error.to_string(),
							Some(Box::new(rotation_error)),
							None,
						));
					}
				}
				AttemptOutcome::SerializationError(e) => return Err(e),
			}
		}
	}
}

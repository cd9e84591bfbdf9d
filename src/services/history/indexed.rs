//! Indexed explorer backend.
//!
//! Delegates history lookups to an Etherscan-compatible `txlist` endpoint. The
//! explorer already filters, orders and pages, so records are only projected.

use alloy::primitives::{Address, U256};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use url::Url;

use crate::{
	models::{ScanRequest, SecretString, TransferRecord},
	services::history::{validate_scan_request, HistoryError},
	utils::{normalize_address, wei_to_ether},
};

/// Message the explorer sends with `status: "0"` when the account has no history
const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
	status: String,
	message: String,
	#[serde(default)]
	result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ExplorerTransaction {
	hash: String,
	from: String,
	#[serde(default)]
	to: String,
	value: String,
	#[serde(rename = "timeStamp")]
	timestamp: String,
}

impl ExplorerTransaction {
	fn into_record(self) -> Result<TransferRecord, HistoryError> {
		let invalid = |field: &str, value: &str| {
			HistoryError::fetch_error(
				format!("Explorer returned an invalid {}", field),
				None,
				Some(HashMap::from([
					("hash".to_string(), self.hash.clone()),
					(field.to_string(), value.to_string()),
				])),
			)
		};

		let value = U256::from_str_radix(self.value.trim(), 10)
			.map_err(|_| invalid("value", &self.value))?;
		let timestamp = self
			.timestamp
			.trim()
			.parse::<u64>()
			.map_err(|_| invalid("timeStamp", &self.timestamp))?;
		let from = self
			.from
			.parse::<Address>()
			.map(|a| normalize_address(&a))
			.map_err(|_| invalid("from", &self.from))?;
		let to = match self.to.trim() {
			"" => None,
			to => Some(
				to.parse::<Address>()
					.map(|a| normalize_address(&a))
					.map_err(|_| invalid("to", to))?,
			),
		};

		Ok(TransferRecord {
			hash: self.hash.to_lowercase(),
			from,
			to,
			amount: wei_to_ether(value),
			timestamp,
		})
	}
}

/// History backend backed by an explorer API
#[derive(Clone)]
pub struct IndexedExplorerBackend {
	client: Arc<ClientWithMiddleware>,
	base_url: Url,
	api_key: Option<SecretString>,
}

impl IndexedExplorerBackend {
	/// Creates an adapter for the explorer API at `base_url`
	///
	/// # Arguments
	/// * `base_url` - Explorer API endpoint, e.g. `https://api.etherscan.io/api`
	/// * `api_key` - Key sent as `apikey`, if the explorer needs one
	/// * `client` - Retryable HTTP client
	///
	/// # Returns
	/// * `Result<Self, HistoryError>` - Validation error when `base_url` is not a URL
	pub fn new(
		base_url: &str,
		api_key: Option<SecretString>,
		client: Arc<ClientWithMiddleware>,
	) -> Result<Self, HistoryError> {
		let base_url = Url::parse(base_url).map_err(|e| {
			HistoryError::validation_error(
				"Invalid explorer URL",
				Some(Box::new(e)),
				Some(HashMap::from([("url".to_string(), base_url.to_string())])),
			)
		})?;

		Ok(Self {
			client,
			base_url,
			api_key,
		})
	}

	/// Newest `max_count` transfers of `address`, as reported by the explorer
	///
	/// # Arguments
	/// * `address` - Lowercase 0x-prefixed address
	/// * `max_count` - Page size requested from the explorer
	///
	/// # Returns
	/// * `Result<Vec<TransferRecord>, HistoryError>` - The explorer's page in its
	///   own order, or a fetch error
	#[instrument(skip(self))]
	pub async fn list_by_address(
		&self,
		address: &str,
		max_count: usize,
	) -> Result<Vec<TransferRecord>, HistoryError> {
		let offset = max_count.to_string();
		let mut query: Vec<(&str, &str)> = vec![
			("module", "account"),
			("action", "txlist"),
			("address", address),
			("sort", "desc"),
			("page", "1"),
			("offset", offset.as_str()),
		];
		if let Some(api_key) = &self.api_key {
			query.push(("apikey", api_key.as_str()));
		}

		let metadata = HashMap::from([("address".to_string(), address.to_string())]);

		let response = self
			.client
			.get(self.base_url.clone())
			.query(&query)
			.send()
			.await
			.map_err(|e| {
				HistoryError::fetch_error(
					"Explorer request failed",
					Some(Box::new(e)),
					Some(metadata.clone()),
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			return Err(HistoryError::fetch_error(
				format!("Explorer answered with status {}", status),
				None,
				Some(metadata),
			));
		}

		let body: ExplorerResponse = response.json().await.map_err(|e| {
			HistoryError::fetch_error(
				"Failed to parse explorer response",
				Some(Box::new(e)),
				Some(metadata.clone()),
			)
		})?;

		if body.status == "0" {
			if body.message == NO_TRANSACTIONS_MESSAGE {
				return Ok(Vec::new());
			}
			let detail = body.result.as_str().unwrap_or_default().to_string();
			return Err(HistoryError::fetch_error(
				format!("Explorer error: {}", body.message),
				None,
				Some(HashMap::from([
					("address".to_string(), address.to_string()),
					("result".to_string(), detail),
				])),
			));
		}

		let transactions: Vec<ExplorerTransaction> = serde_json::from_value(body.result)
			.map_err(|e| {
				HistoryError::fetch_error(
					"Unexpected explorer result",
					Some(Box::new(e)),
					Some(metadata),
				)
			})?;

		let records = transactions
			.into_iter()
			.map(ExplorerTransaction::into_record)
			.collect::<Result<Vec<_>, _>>()?;

		tracing::debug!(found = records.len(), "Explorer lookup finished");
		Ok(records)
	}

	/// Validates `request` and runs [`Self::list_by_address`]
	pub async fn scan(&self, request: &ScanRequest) -> Result<Vec<TransferRecord>, HistoryError> {
		let address = validate_scan_request(request)?;
		self.list_by_address(&normalize_address(&address), request.max_count)
			.await
	}
}

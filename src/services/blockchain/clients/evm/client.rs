//! EVM node client.
//!
//! Block reads for the history scanner plus the node-managed account calls
//! (`personal_*`, `eth_sendTransaction`) used by transfers.

use std::collections::HashMap;

use alloy::primitives::{Address, B256, U256};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
	models::{EVMBlock, Network, SecretString},
	services::blockchain::{
		client::BlockChainClient,
		transports::{BlockchainTransport, EVMTransportClient},
		BlockChainError,
	},
};

/// Gas limit of a plain value transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Parameters of an `eth_sendTransaction` call signed by the node
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCall {
	pub from: Address,
	pub to: Address,
	/// Value in wei
	pub value: U256,
	pub gas: u64,
	/// Gas price in wei
	pub gas_price: U256,
}

impl TransactionCall {
	/// A value transfer with the standard gas limit
	///
	/// # Arguments
	/// * `from` - Node-managed sender account
	/// * `to` - Recipient
	/// * `value` - Amount in wei
	/// * `gas_price` - Gas price in wei
	pub fn transfer(from: Address, to: Address, value: U256, gas_price: U256) -> Self {
		Self {
			from,
			to,
			value,
			gas: TRANSFER_GAS_LIMIT,
			gas_price,
		}
	}

	fn to_rpc_object(&self) -> Value {
		json!({
			"from": format!("{:#x}", self.from),
			"to": format!("{:#x}", self.to),
			"value": format!("{:#x}", self.value),
			"gas": format!("0x{:x}", self.gas),
			"gasPrice": format!("{:#x}", self.gas_price),
		})
	}
}

/// Client for EVM-compatible nodes
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync + Clone> {
	http_client: T,
}

impl<T: Send + Sync + Clone> EvmClient<T> {
	/// Wraps an already connected transport
	///
	/// # Arguments
	/// * `http_client` - Transport that sends the JSON-RPC calls
	pub fn new_with_transport(http_client: T) -> Self {
		Self { http_client }
	}
}

impl EvmClient<EVMTransportClient> {
	/// Connects to the first reachable endpoint of `network`
	///
	/// # Arguments
	/// * `network` - Network configuration holding the RPC URLs
	///
	/// # Returns
	/// * `Result<Self, anyhow::Error>` - Connected client or the connection error
	pub async fn new(network: &Network) -> Result<Self, anyhow::Error> {
		let client = EVMTransportClient::new(network).await?;
		Ok(Self::new_with_transport(client))
	}
}

/// Pulls `result` out of a JSON-RPC response, surfacing node-side errors.
fn rpc_result<'a>(response: &'a Value, method: &str) -> Result<&'a Value, anyhow::Error> {
	if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
		let message = error
			.get("message")
			.and_then(|m| m.as_str())
			.unwrap_or("unknown error");
		let code = error
			.get("code")
			.map(|c| c.to_string())
			.unwrap_or_default();
		return Err(BlockChainError::request_error(
			format!("{} failed: {}", method, message),
			None,
			Some(HashMap::from([
				("method".to_string(), method.to_string()),
				("code".to_string(), code),
			])),
		)
		.into());
	}

	response
		.get("result")
		.with_context(|| format!("Missing 'result' field in {} response", method))
}

/// Account and transaction calls of nodes that manage keys themselves
#[async_trait]
pub trait EvmClientTrait {
	/// Balance of `address` in wei at the latest block
	async fn get_balance(&self, address: &Address) -> Result<U256, anyhow::Error>;

	/// Creates a node-managed account protected by `passphrase`
	async fn new_account(&self, passphrase: &SecretString) -> Result<Address, anyhow::Error>;

	/// Unlocks a node-managed account so the node can sign for it
	///
	/// # Arguments
	/// * `address` - Account to unlock
	/// * `passphrase` - Passphrase the account was created with
	async fn unlock_account(
		&self,
		address: &Address,
		passphrase: &SecretString,
	) -> Result<(), anyhow::Error>;

	/// Submits a transaction signed by the node
	///
	/// The sender must have been unlocked first.
	///
	/// # Arguments
	/// * `call` - Sender, recipient, value and gas settings
	///
	/// # Returns
	/// * `Result<B256, anyhow::Error>` - Transaction hash, or the node's rejection
	async fn send_transaction(&self, call: &TransactionCall) -> Result<B256, anyhow::Error>;
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> EvmClientTrait for EvmClient<T> {
	#[instrument(skip(self))]
	async fn get_balance(&self, address: &Address) -> Result<U256, anyhow::Error> {
		let params = json!([format!("{:#x}", address), "latest"]);
		let response = self
			.http_client
			.send_raw_request("eth_getBalance", Some(params))
			.await
			.with_context(|| format!("Failed to get balance of {:#x}", address))?;

		let balance = rpc_result(&response, "eth_getBalance")?;
		serde_json::from_value(balance.clone()).with_context(|| "Failed to parse balance")
	}

	#[instrument(skip_all)]
	async fn new_account(&self, passphrase: &SecretString) -> Result<Address, anyhow::Error> {
		let params = json!([passphrase.as_str()]);
		let response = self
			.http_client
			.send_raw_request("personal_newAccount", Some(params))
			.await
			.with_context(|| "Failed to create account")?;

		let address = rpc_result(&response, "personal_newAccount")?;
		serde_json::from_value(address.clone())
			.with_context(|| "Failed to parse new account address")
	}

	#[instrument(skip(self, passphrase))]
	async fn unlock_account(
		&self,
		address: &Address,
		passphrase: &SecretString,
	) -> Result<(), anyhow::Error> {
		let params = json!([format!("{:#x}", address), passphrase.as_str(), Value::Null]);
		let response = self
			.http_client
			.send_raw_request("personal_unlockAccount", Some(params))
			.await
			.with_context(|| format!("Failed to unlock account {:#x}", address))?;

		match rpc_result(&response, "personal_unlockAccount")?.as_bool() {
			Some(true) => Ok(()),
			_ => Err(BlockChainError::transaction_error(
				"Node refused to unlock account",
				None,
				Some(HashMap::from([(
					"address".to_string(),
					format!("{:#x}", address),
				)])),
			)
			.into()),
		}
	}

	#[instrument(skip(self), fields(from = %call.from, to = %call.to))]
	async fn send_transaction(&self, call: &TransactionCall) -> Result<B256, anyhow::Error> {
		let params = json!([call.to_rpc_object()]);
		let response = self
			.http_client
			.send_raw_request("eth_sendTransaction", Some(params))
			.await
			.with_context(|| "Failed to send transaction")?;

		let hash = rpc_result(&response, "eth_sendTransaction")?;
		serde_json::from_value(hash.clone()).with_context(|| "Failed to parse transaction hash")
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> BlockChainClient for EvmClient<T> {
	#[instrument(skip(self))]
	async fn get_latest_block_number(&self) -> Result<u64, anyhow::Error> {
		let response = self
			.http_client
			.send_raw_request::<Value>("eth_blockNumber", None)
			.await
			.with_context(|| "Failed to get latest block number")?;

		let hex_str = rpc_result(&response, "eth_blockNumber")?
			.as_str()
			.ok_or_else(|| anyhow::anyhow!("Block number is not a string"))?;

		u64::from_str_radix(hex_str.trim_start_matches("0x"), 16)
			.map_err(|e| anyhow::anyhow!("Failed to parse block number: {}", e))
	}

	#[instrument(skip(self))]
	async fn get_blocks(
		&self,
		start_block: u64,
		end_block: u64,
		include_transactions: bool,
	) -> Result<Vec<EVMBlock>, anyhow::Error> {
		let block_futures: Vec<_> = (start_block..=end_block)
			.map(|block_number| {
				let params = json!([format!("0x{:x}", block_number), include_transactions]);
				let client = self.http_client.clone();

				async move {
					let response = client
						.send_raw_request("eth_getBlockByNumber", Some(params))
						.await
						.with_context(|| format!("Failed to get block: {}", block_number))?;

					let block_data = rpc_result(&response, "eth_getBlockByNumber")?;
					if block_data.is_null() {
						return Ok(None);
					}

					let block: EVMBlock =
						serde_json::from_value(block_data.clone()).map_err(|e| {
							anyhow::anyhow!("Failed to parse block {}: {}", block_number, e)
						})?;
					Ok::<_, anyhow::Error>(Some(block))
				}
			})
			.collect();

		let mut blocks: Vec<EVMBlock> = futures::future::join_all(block_futures)
			.await
			.into_iter()
			.collect::<Result<Vec<_>, _>>()?
			.into_iter()
			.flatten()
			.collect();

		blocks.sort_by(|a, b| b.number().cmp(&a.number()));
		Ok(blocks)
	}
}

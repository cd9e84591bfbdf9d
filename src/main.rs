//! Command-line entry point of the seed token client.
//!
//! Each subcommand builds the client facade from configuration, runs one
//! operation against the node and prints its result.
//!
//! # Flow
//! 1. Loads configuration from `--config` or from `SEED_*` variables
//! 2. Applies command-line overrides and sets up logging
//! 3. Builds the client through a node client registry
//! 4. Runs the subcommand

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{initialize_client, Result},
	models::{ClientConfig, ConfigLoader, SecretString, TransferRequest},
	services::{account::EthPersonalClient, blockchain::ClientRegistry},
	utils::{
		logging::setup_logging, metrics::gather_metrics, parse_string_to_bytes_size,
		parse_unix_seconds,
	},
};

use clap::{Parser, Subcommand};
use dotenvy::dotenv_override;
use std::{
	env::{set_var, var},
	io::{self, BufRead, Write},
	path::PathBuf,
	time::Duration,
};
use tracing::{error, info};

/// Variable holding the account passphrase for non-interactive use
const PASSPHRASE_ENV: &str = "SEED_PASSPHRASE";

#[derive(Parser)]
#[command(
	name = "seed-token-client",
	about = "Manage node-held accounts, send ether and list recent transfers of an EVM node.",
	version
)]
struct Cli {
	/// Node RPC endpoint (overrides the configured node_url)
	#[arg(long, global = true, value_name = "URL")]
	url: Option<String>,

	/// JSON configuration file (default: SEED_* environment variables)
	#[arg(long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Write logs to file instead of stdout
	#[arg(long, global = true)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, global = true, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Maximum log file size before rolling (e.g. "1GB", "500MB")
	#[arg(long, global = true, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_file_size: Option<u64>,

	/// Print Prometheus metrics to stderr when the command finishes
	#[arg(long, global = true)]
	metrics: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Create a node-managed account
	CreateAccount,

	/// Print the balance of an account in ether
	GetBalance {
		address: String,
	},

	/// Send ether between node-managed accounts
	Transfer {
		#[arg(long)]
		from: String,
		#[arg(long)]
		to: String,
		/// Amount in ether
		#[arg(long)]
		amount: String,
		/// Gas price in wei
		#[arg(long)]
		gas_price: Option<String>,
	},

	/// List the most recent transfers of an account
	GetLastTransfers {
		address: String,
		/// Number of transfers
		#[arg(long, default_value_t = 5)]
		n: usize,
		/// Blocks fetched per window
		#[arg(long, default_value_t = 10)]
		buffer: u64,
		/// Time budget in seconds
		#[arg(long, default_value_t = 5)]
		timeout: u64,
		/// Do not descend below this unix timestamp (seconds)
		#[arg(long, value_parser = parse_unix_seconds)]
		since: Option<u64>,
	},

	/// Check whether an address is well formed
	CheckAddress {
		address: String,
	},

	/// Validate the configuration and exit
	Check,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(max_size) = self.log_max_file_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}
	}

	async fn load_config(&self) -> Result<ClientConfig> {
		let mut config = match &self.config {
			Some(path) => ClientConfig::load_from_path(path).await?,
			None => ClientConfig::from_env()?,
		};

		if let Some(url) = &self.url {
			config.node_url = url.clone();
			config.validate()?;
		}
		Ok(config)
	}
}

/// Reads the passphrase from `SEED_PASSPHRASE`, prompting on stdin otherwise
fn read_passphrase() -> Result<SecretString> {
	if let Ok(passphrase) = var(PASSPHRASE_ENV) {
		return Ok(SecretString::new(passphrase));
	}

	eprint!("Passphrase: ");
	io::stderr().flush()?;
	let mut line = String::new();
	io::stdin().lock().read_line(&mut line)?;
	Ok(SecretString::new(
		line.trim_end_matches(['\r', '\n']).to_string(),
	))
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.apply_to_env();

	if let Command::CheckAddress { address } = &cli.command {
		let valid = EthPersonalClient::<()>::check_address(address);
		println!("{}", valid);
		return Ok(());
	}

	let config = cli.load_config().await?;

	setup_logging(config.debug).unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	if let Command::Check = cli.command {
		info!("Configuration is valid");
		println!("Configuration is valid");
		return Ok(());
	}

	let registry = ClientRegistry::new();
	let client = initialize_client(&config, &registry).await.map_err(|e| {
		error!("Failed to initialize client: {}", e);
		e
	})?;

	match &cli.command {
		Command::CreateAccount => {
			let passphrase = read_passphrase()?;
			let address = client.create_account(&passphrase).await?;
			println!("{}", address);
		}
		Command::GetBalance { address } => {
			let balance = client.get_balance(address).await?;
			println!("{}", balance);
		}
		Command::Transfer {
			from,
			to,
			amount,
			gas_price,
		} => {
			let passphrase = read_passphrase()?;
			let mut request = TransferRequest::new(from, to, amount, passphrase);
			if let Some(gas_price) = gas_price {
				request = request.with_gas_price(gas_price);
			}
			let hash = client.transfer(&request).await?;
			println!("{:#x}", hash);
		}
		Command::GetLastTransfers {
			address,
			n,
			buffer,
			timeout,
			since,
		} => {
			let records = client
				.get_last_n_transactions(
					address,
					*n,
					Some(*buffer),
					Some(Duration::from_secs(*timeout)),
					*since,
				)
				.await?;
			println!("{}", serde_json::to_string_pretty(&records)?);
		}
		Command::CheckAddress { .. } | Command::Check => {}
	}

	if cli.metrics {
		let metrics = gather_metrics()?;
		eprintln!("{}", String::from_utf8_lossy(&metrics));
	}

	Ok(())
}

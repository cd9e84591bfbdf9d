//! Conversion between wei and ether decimal strings.

use alloy::primitives::{
	utils::{format_ether, parse_ether},
	U256,
};

/// Formats a wei amount as an ether decimal string without trailing zeros
///
/// `2 * 10^18` becomes `"2"` and `2 * 10^9` becomes `"0.000000002"`.
pub fn wei_to_ether(wei: U256) -> String {
	let formatted = format_ether(wei);
	if !formatted.contains('.') {
		return formatted;
	}
	formatted
		.trim_end_matches('0')
		.trim_end_matches('.')
		.to_string()
}

/// Parses an ether decimal string into wei
///
/// Negative amounts and malformed numbers are rejected.
pub fn ether_to_wei(ether: &str) -> Result<U256, anyhow::Error> {
	let ether = ether.trim();
	if ether.is_empty() {
		return Err(anyhow::anyhow!("Amount is empty"));
	}
	if ether.starts_with('-') {
		return Err(anyhow::anyhow!("Amount must not be negative: {}", ether));
	}
	parse_ether(ether).map_err(|e| anyhow::anyhow!("Invalid ether amount '{}': {}", ether, e))
}

/// Parses a decimal (or `0x` hex) wei quantity
pub fn parse_wei(value: &str) -> Result<U256, anyhow::Error> {
	let value = value.trim();
	let parsed = match value.strip_prefix("0x") {
		Some(hex) => U256::from_str_radix(hex, 16),
		None => U256::from_str_radix(value, 10),
	};
	parsed.map_err(|e| anyhow::anyhow!("Invalid wei quantity '{}': {}", value, e))
}

//! Account address validation and normalization.

use alloy::primitives::Address;
use std::str::FromStr;

/// Checks whether `address` is a well-formed account address
///
/// Accepts 40 hex characters with an optional `0x` prefix. All-lowercase and
/// all-uppercase forms are accepted as-is; mixed case must carry a valid EIP-55
/// checksum.
pub fn is_valid_address(address: &str) -> bool {
	let hex = address.strip_prefix("0x").unwrap_or(address);
	if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		return false;
	}

	let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
	let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
	if !(has_lower && has_upper) {
		return true;
	}

	Address::parse_checksummed(format!("0x{}", hex), None).is_ok()
}

/// Parses a valid address into its canonical 20-byte form
pub fn parse_address(address: &str) -> Result<Address, anyhow::Error> {
	if !is_valid_address(address) {
		return Err(anyhow::anyhow!("Invalid address: {}", address));
	}
	Address::from_str(address).map_err(|e| anyhow::anyhow!("Invalid address {}: {}", address, e))
}

/// Lowercase `0x`-prefixed hex form of an address
pub fn normalize_address(address: &Address) -> String {
	format!("{:#x}", address)
}

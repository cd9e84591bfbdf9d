//! Parsing helpers for command-line values.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human-readable size ("1GB", "500MB", "1024KiB") into bytes.
///
/// # Arguments
/// * `s` - Size with an optional unit suffix
///
/// # Returns
/// * `Result<u64, String>` - Number of bytes, or a message clap can display
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}

/// Parses a unix timestamp in seconds, rejecting millisecond-looking values.
///
/// Values above `10^11` are almost certainly milliseconds, which would push a
/// `since` filter thousands of years into the future and end every scan after
/// the first window.
///
/// # Arguments
/// * `s` - Decimal seconds since the unix epoch
///
/// # Returns
/// * `Result<u64, String>` - The timestamp, or a message clap can display
pub fn parse_unix_seconds(s: &str) -> Result<u64, String> {
	let value = s
		.trim()
		.parse::<u64>()
		.map_err(|e| format!("Invalid unix timestamp '{}': {}", s, e))?;
	if value > 100_000_000_000 {
		return Err(format!(
			"Timestamp '{}' looks like milliseconds; expected seconds",
			s
		));
	}
	Ok(value)
}

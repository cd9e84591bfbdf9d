//! Security models
//!
//! - `error`: Error types for secret handling
//! - `secret`: Zeroizing secret containers

mod error;
mod secret;

use std::env;

pub use error::{SecurityError, SecurityResult};
pub use secret::{SecretString, SecretValue};

/// Reads a required environment variable as a secret.
pub fn get_env_secret(key: &str) -> SecurityResult<SecretString> {
	env::var(key).map(SecretString::new).map_err(|e| {
		Box::new(SecurityError::parse_error(
			format!("Missing {} environment variable", key),
			Some(e.into()),
			None,
		))
	})
}

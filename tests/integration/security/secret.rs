use lazy_static::lazy_static;
use std::{env, fs, sync::Mutex};
use tempfile::TempDir;
use zeroize::Zeroize;

use seed_token_client::models::{ClientConfig, ConfigLoader, SecretString, SecretValue};

lazy_static! {
	// Tests below touch process-wide environment variables
	static ref TEST_LOCK: Mutex<()> = Mutex::new(());
}

#[tokio::test]
#[allow(clippy::await_holding_lock)]
async fn test_secret_resolution_from_client_config() {
	let _lock = TEST_LOCK.lock().unwrap();

	let temp_dir = TempDir::new().unwrap();
	let config_path = temp_dir.path().join("client.json");

	const API_KEY_ENV: &str = "TEST_EXPLORER_API_KEY";
	const API_KEY_VALUE: &str = "explorer-secret";
	env::set_var(API_KEY_ENV, API_KEY_VALUE);

	let config = ClientConfig {
		explorer_url: Some("https://explorer.example/api".to_string()),
		explorer_api_key: Some(SecretValue::Environment(API_KEY_ENV.to_string())),
		..ClientConfig::default()
	};
	fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

	let loaded = ClientConfig::load_from_path(&config_path).await.unwrap();
	assert_eq!(loaded, config);

	let api_key = loaded.explorer_api_key.unwrap().resolve().await.unwrap();
	assert_eq!(api_key.as_str(), API_KEY_VALUE);

	env::remove_var(API_KEY_ENV);
}

#[tokio::test]
#[allow(clippy::await_holding_lock)]
async fn test_missing_environment_secret() {
	let _lock = TEST_LOCK.lock().unwrap();

	env::remove_var("TEST_MISSING_SECRET");
	let secret = SecretValue::Environment("TEST_MISSING_SECRET".to_string());

	let err = secret.resolve().await.unwrap_err();
	assert!(err
		.to_string()
		.contains("Failed to get environment variable TEST_MISSING_SECRET"));
}

#[tokio::test]
async fn test_secret_zeroization() {
	let mut secret = SecretValue::Plain(SecretString::new("sensitive_data".to_string()));

	let resolved = secret.resolve().await.unwrap();
	assert_eq!(resolved.as_str(), "sensitive_data");

	secret.zeroize();

	if let SecretValue::Plain(ref secret_string) = secret {
		assert_eq!(secret_string.as_str(), "");
	}
	// The resolved copy is independent of the zeroized original
	assert_eq!(resolved.as_str(), "sensitive_data");
}

#[test]
fn test_secret_serialization_deserialization() {
	let plain_secret = SecretValue::Plain(SecretString::new("test_plain".to_string()));
	let env_secret = SecretValue::Environment("TEST_ENV_VAR".to_string());

	let plain_json = serde_json::to_string(&plain_secret).unwrap();
	let env_json = serde_json::to_string(&env_secret).unwrap();

	let deserialized_plain: SecretValue = serde_json::from_str(&plain_json).unwrap();
	let deserialized_env: SecretValue = serde_json::from_str(&env_json).unwrap();

	assert_eq!(deserialized_plain, plain_secret);
	assert_eq!(deserialized_env, env_secret);
}

#[test]
fn test_passphrase_is_not_printed() {
	let passphrase = SecretString::new("hunter2".to_string());
	assert!(!format!("{:?}", passphrase).contains("hunter2"));
}

use mockito::Server;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use seed_token_client::services::blockchain::{
	BlockchainTransport, EndpointManager, TransportError,
};

use crate::integration::mocks::{AlwaysFailsToUpdateClientTransport, MockTransport};

fn get_mock_client_builder() -> ClientWithMiddleware {
	ClientBuilder::new(reqwest::Client::new()).build()
}

#[tokio::test]
async fn test_endpoint_rotation() {
	let server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;
	let server3 = Server::new_async().await;

	let mock2 = server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url(), server3.url()],
	);
	let transport = MockTransport::new();

	assert_eq!(&*manager.active_url.read().await, &server1.url());
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![server2.url(), server3.url()]
	);

	let new_url = manager.try_rotate_url(&transport).await.unwrap();
	assert_eq!(new_url, server2.url());
	assert_eq!(&*manager.active_url.read().await, &server2.url());
	assert_eq!(*transport.current_url.read().await, server2.url());

	// The previous active URL goes to the back of the fallback list
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![server3.url(), server1.url()]
	);

	mock2.assert();
}

#[tokio::test]
async fn test_send_raw_request() {
	let mut server = Server::new_async().await;

	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"jsonrpc": "2.0",
			"method": "eth_blockNumber"
		})))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "0x64", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await
		.unwrap();

	assert_eq!(result["result"], "0x64");
	mock.assert();
}

#[tokio::test]
async fn test_rotation_on_rate_limit() {
	let mut primary_server = Server::new_async().await;
	let mut fallback_server = Server::new_async().await;

	let primary_mock = primary_server
		.mock("POST", "/")
		.with_status(429)
		.with_body("Rate limited")
		.expect(1)
		.create_async()
		.await;

	let fallback_probe = fallback_server
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let fallback_mock = fallback_server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "success", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		primary_server.url().as_ref(),
		vec![fallback_server.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_getBalance", Some(json!(["0xaa", "latest"])))
		.await
		.unwrap();

	assert_eq!(result["result"], "success");
	primary_mock.assert();
	fallback_probe.assert();
	fallback_mock.assert();

	assert_eq!(&*manager.active_url.read().await, &fallback_server.url());
}

#[tokio::test]
async fn test_client_error_does_not_rotate() {
	let mut primary_server = Server::new_async().await;
	let fallback_server = Server::new_async().await;

	let primary_mock = primary_server
		.mock("POST", "/")
		.with_status(400)
		.with_body("Bad request")
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		primary_server.url().as_ref(),
		vec![fallback_server.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await;

	match result.unwrap_err() {
		TransportError::Http {
			status_code, body, ..
		} => {
			assert_eq!(status_code, 400);
			assert_eq!(body, "Bad request");
		}
		other => panic!("Expected Http error, got {:?}", other),
	}
	primary_mock.assert();
	assert_eq!(&*manager.active_url.read().await, &primary_server.url());
}

#[tokio::test]
async fn test_no_fallback_urls_available() {
	let mut server = Server::new_async().await;

	let mock = server
		.mock("POST", "/")
		.with_status(429)
		.with_body("Rate limited")
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await;

	match result.unwrap_err() {
		TransportError::Http {
			status_code,
			url,
			body,
			..
		} => {
			assert_eq!(status_code, 429);
			assert_eq!(url, server.url());
			assert_eq!(body, "Rate limited");
		}
		_ => panic!("Expected Http error with status code 429"),
	}
	mock.assert();
}

#[tokio::test]
async fn test_customize_request() {
	let transport = MockTransport::new();

	let result = transport
		.customize_request("eth_getBalance", Some(json!(["0xaa", "latest"])))
		.await;

	assert_eq!(
		result,
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_getBalance",
			"params": ["0xaa", "latest"]
		})
	);

	let result = transport
		.customize_request::<Value>("eth_blockNumber", None)
		.await;

	assert_eq!(
		result,
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_blockNumber",
			"params": null
		})
	);
}

#[tokio::test]
async fn test_rotate_url_no_fallbacks() {
	let server = Server::new_async().await;

	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);
	let transport = MockTransport::new();

	match manager.try_rotate_url(&transport).await.unwrap_err() {
		TransportError::UrlRotation(ctx) => {
			assert!(ctx.to_string().contains("No fallback URLs available"));
		}
		_ => panic!("Expected UrlRotation error"),
	}

	assert_eq!(&*manager.active_url.read().await, &server.url());
}

#[tokio::test]
async fn test_rotate_url_all_urls_match_active() {
	let server = Server::new_async().await;

	let active_url = server.url();
	let manager = EndpointManager::new(
		get_mock_client_builder(),
		active_url.as_ref(),
		vec![active_url.clone(), active_url.clone()],
	);
	let transport = MockTransport::new();

	match manager.try_rotate_url(&transport).await.unwrap_err() {
		TransportError::UrlRotation(ctx) => {
			assert!(ctx.to_string().contains("No fallback URLs available"));
			assert!(ctx.to_string().contains(&active_url));
		}
		_ => panic!("Expected UrlRotation error"),
	}

	assert_eq!(&*manager.active_url.read().await, &active_url);
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![active_url.clone(), active_url.clone()]
	);
}

#[tokio::test]
async fn test_rotate_url_connection_failure() {
	let server = Server::new_async().await;

	let invalid_url = "http://invalid-domain-that-does-not-exist:12345";
	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server.url().as_ref(),
		vec![invalid_url.to_string()],
	);
	let transport = MockTransport::new();

	match manager.try_rotate_url(&transport).await.unwrap_err() {
		TransportError::UrlRotation(ctx) => {
			assert!(ctx.to_string().contains("Failed to connect to new URL"));
			assert!(ctx.to_string().contains(invalid_url));
		}
		_ => panic!("Expected UrlRotation error"),
	}

	assert_eq!(&*manager.active_url.read().await, &server.url());
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![invalid_url.to_string()]
	);
}

#[tokio::test]
async fn test_rotate_url_update_client_failure() {
	let server1 = Server::new_async().await;
	let server2 = Server::new_async().await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url()],
	);
	let transport = AlwaysFailsToUpdateClientTransport {
		current_url: Arc::new(RwLock::new(server1.url())),
	};

	match manager.try_rotate_url(&transport).await.unwrap_err() {
		TransportError::UrlRotation(ctx) => {
			assert!(ctx
				.to_string()
				.contains("Failed to update transport client with new URL"));
		}
		_ => panic!("Expected UrlRotation error"),
	}
	assert_eq!(&*manager.active_url.read().await, &server1.url());
}

#[tokio::test]
async fn test_update_client() {
	let mut server = Server::new_async().await;

	let initial_mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "initial_client", "id": 1}"#)
		.expect(1)
		.create_async()
		.await;

	let mut manager =
		EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);

	let transport = MockTransport::new();
	let initial_result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await
		.unwrap();
	assert_eq!(initial_result["result"], "initial_client");
	initial_mock.assert();

	let updated_mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "updated_client", "id": 1}"#)
		.expect(1)
		.create_async()
		.await;

	let new_client = ClientBuilder::new(reqwest::Client::new())
		.with(RetryTransientMiddleware::new_with_policy(
			ExponentialBackoff::builder().build_with_max_retries(3),
		))
		.build();
	manager.update_client(new_client);

	let updated_result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await
		.unwrap();
	assert_eq!(updated_result["result"], "updated_client");
	updated_mock.assert();
}

#[tokio::test]
async fn test_send_raw_request_network_error_rotates() {
	let invalid_url = "http://invalid-domain-that-will-fail:12345";
	let mut valid_server = Server::new_async().await;

	let probe = valid_server
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let valid_mock = valid_server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "success", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		invalid_url,
		vec![valid_server.url()],
	);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await
		.unwrap();

	assert_eq!(result["result"], "success");
	probe.assert();
	valid_mock.assert();
	assert_eq!(&*manager.active_url.read().await, &valid_server.url());
}

#[tokio::test]
async fn test_send_raw_request_network_error_without_fallback() {
	let invalid_url = "http://invalid-domain-that-will-fail:12345";
	let manager = EndpointManager::new(get_mock_client_builder(), invalid_url, vec![]);
	let transport = MockTransport::new();

	let result = manager
		.send_raw_request(&transport, "eth_blockNumber", Some(json!([])))
		.await;

	assert!(matches!(result.unwrap_err(), TransportError::Network(_)));
}

//! Transfer service error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Errors raised while submitting a transfer
#[derive(ThisError, Debug)]
pub enum TransferError {
	/// Malformed address, amount or gas price. Raised before any lock is taken.
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// The lock stayed taken for every retry
	#[error("Lock timeout: {0}")]
	LockTimeoutError(ErrorContext),

	/// The lock store failed while acquiring
	#[error("Lock error: {0}")]
	LockError(ErrorContext),

	/// The node refused to unlock the sender account
	#[error("Unlock error: {0}")]
	UnlockError(ErrorContext),

	/// The node rejected the transaction after a successful unlock
	#[error("Send error: {0}")]
	SendError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl TransferError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn lock_timeout_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::LockTimeoutError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn lock_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::LockError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn unlock_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnlockError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn send_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SendError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// Label used for the `transfers_total` outcome metric
	pub fn outcome(&self) -> &'static str {
		match self {
			Self::ValidationError(_) => "rejected",
			Self::LockTimeoutError(_) => "lock_timeout",
			Self::LockError(_) => "lock_error",
			Self::UnlockError(_) => "unlock_failed",
			Self::SendError(_) => "send_failed",
			Self::Other(_) => "error",
		}
	}
}

impl TraceableError for TransferError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) => ctx.trace_id.clone(),
			Self::LockTimeoutError(ctx) => ctx.trace_id.clone(),
			Self::LockError(ctx) => ctx.trace_id.clone(),
			Self::UnlockError(ctx) => ctx.trace_id.clone(),
			Self::SendError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

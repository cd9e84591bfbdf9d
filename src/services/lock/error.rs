//! Lock service error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Errors raised by distributed lock backends
#[derive(ThisError, Debug)]
pub enum LockError {
	/// The lock store could not be reached
	#[error("Connection error: {0}")]
	ConnectionError(ErrorContext),

	/// A lock command failed or the lease was no longer held on release
	#[error("Operation error: {0}")]
	OperationError(ErrorContext),

	/// Another owner holds the lease
	#[error("Lock busy: {0}")]
	Busy(ErrorContext),
}

impl LockError {
	pub fn connection_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConnectionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn operation_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::OperationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// Contention is expected while retrying, so this one is not logged.
	pub fn busy(resource: &str) -> Self {
		Self::Busy(ErrorContext::new(
			"Lease held by another owner",
			None,
			Some(HashMap::from([(
				"resource".to_string(),
				resource.to_string(),
			)])),
		))
	}

	pub fn is_busy(&self) -> bool {
		matches!(self, Self::Busy(_))
	}
}

impl TraceableError for LockError {
	fn trace_id(&self) -> String {
		match self {
			Self::ConnectionError(ctx) => ctx.trace_id.clone(),
			Self::OperationError(ctx) => ctx.trace_id.clone(),
			Self::Busy(ctx) => ctx.trace_id.clone(),
		}
	}
}

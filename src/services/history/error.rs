//! History service error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Errors raised while retrieving transfer history
#[derive(ThisError, Debug)]
pub enum HistoryError {
	/// The request itself is unusable (bad address, zero count or window)
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// The node or the explorer failed; no partial result is returned
	#[error("Fetch error: {0}")]
	FetchError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl HistoryError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn fetch_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::FetchError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for HistoryError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) => ctx.trace_id.clone(),
			Self::FetchError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

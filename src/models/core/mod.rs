//! Core domain models.
//!
//! - Networks: node deployments and their RPC endpoints
//! - Scans: parameters of a transfer history query
//! - Transfers: history records and outgoing transfer requests

mod network;
mod scan;
mod transfer;

pub use network::{Network, RpcUrl};
pub use scan::{ScanRequest, DEFAULT_BUFFER_SIZE, DEFAULT_SCAN_TIMEOUT};
pub use transfer::{TransferRecord, TransferRequest, ValidatedTransfer};

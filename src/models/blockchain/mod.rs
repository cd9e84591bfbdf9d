//! Blockchain data models.
//!
//! Only account-based EVM chains are supported. The node is reached over
//! JSON-RPC and blocks are decoded into the types in [`evm`].

pub mod evm;

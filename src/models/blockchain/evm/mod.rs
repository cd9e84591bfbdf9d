//! Ethereum Virtual Machine (EVM) data structures.
//!
//! Blocks and transactions as returned by `eth_getBlockByNumber`.

mod block;
mod transaction;

pub use block::{BaseBlock as EVMBaseBlock, Block as EVMBlock, BlockTransactions};
pub use transaction::{BaseTransaction as EVMBaseTransaction, Transaction as EVMTransaction};

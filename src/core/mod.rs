//! Core ledger functionality
//!
//! This module contains the fundamental ledger components: accounts,
//! transactions, blocks with their Merkle roots, and the ledger that ties
//! them into a hash chain.

pub mod account;
pub mod block;
pub mod ledger;
pub mod merkle;
pub mod monetary;
pub mod transaction;

pub use account::Account;
pub use block::Block;
pub use ledger::Ledger;
pub use merkle::MerkleTree;
pub use monetary::{
    DEFAULT_BATCH_SIZE, MASTER_ACCOUNT, MAX_NOTE_LENGTH, MAX_SUPPLY, MIN_TRANSACTION_FEE,
};
pub use transaction::Transaction;

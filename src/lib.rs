//! # Store Ledger - Hash-Chained Settlement Ledger
//!
//! An append-only, single-process ledger that tracks account balances through
//! a chain of hash-linked blocks, each sealing a fixed-size batch of transfers.
//!
//! ## What It Does
//! - **Accounts**: balance cells keyed by address; `master` holds the whole supply at genesis
//! - **Transactions**: transfers with a fee paid to `master`, applied all-or-nothing
//! - **Blocks**: exactly `batch_size` transactions, a balance snapshot, a Merkle root and a hash
//!   linked to the previous block
//! - **Validation**: a full-chain audit of links, block sizes, supply conservation and hashes
//! - **Scripts**: a text command processor and CLI that drive a ledger line by line
//!
//! ## How The Code Is Organized
//! - `core/`: accounts, transactions, Merkle roots, blocks and the ledger itself
//! - `config/`: construction-time ledger parameters
//! - `utils/`: the hashing service
//! - `cli/`: argument parsing and the script command processor
//! - `error/`: the error type every operation returns
//!
//! ## Where To Start
//! 1. `core/ledger.rs` for how a transfer is validated, applied and sealed
//! 2. `core/block.rs` for the sealing and hashing rules
//! 3. `cli/script.rs` for the script syntax

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

#[cfg(test)]
pub mod fixtures;

// Re-export commonly used types for convenience
pub use cli::{tokenize, Command, CommandProcessor, Opt};
pub use config::LedgerConfig;
pub use core::{
    Account, Block, Ledger, MerkleTree, Transaction, DEFAULT_BATCH_SIZE, MASTER_ACCOUNT,
    MAX_NOTE_LENGTH, MAX_SUPPLY, MIN_TRANSACTION_FEE,
};
pub use error::{LedgerError, Result};
pub use utils::{sha256_digest, sha256_hex, HashingService, Sha256Hasher};

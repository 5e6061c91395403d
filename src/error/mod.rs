//! Error handling for the ledger
//!
//! Every ledger operation returns a typed error naming the invariant it would
//! have broken. None of these are retried; the operation that raised one had
//! no effect on ledger state.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every way a ledger operation can fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An account with this address already exists
    DuplicateAddress(String),
    /// No account is registered under this address
    UnknownAccount(String),
    /// Fee below the ledger's minimum
    FeeTooLow { fee: u64, minimum: u64 },
    /// Amount larger than the total supply can ever represent
    AmountOverflow { amount: u64, maximum: u64 },
    /// Note longer than the ledger accepts
    NoteTooLong { length: usize, maximum: usize },
    /// Payer cannot cover amount + fee
    InsufficientFunds { required: u64, available: u64 },
    /// Transaction id already used somewhere in the chain
    DuplicateTransactionId(String),
    /// Balance queries need at least one sealed block
    NoSealedBlocks,
    /// Block number is not a sealed block
    BlockNotFound(u64),
    /// No sealed block holds this transaction id
    TransactionNotFound(String),
    /// Block's previous hash or own hash does not check out
    HashMismatch { block_number: u64 },
    /// Block holds more transactions than the batch size
    OversizedBlock {
        block_number: u64,
        transactions: usize,
    },
    /// Block's balance snapshot does not add up to the total supply
    SupplyMismatch { block_number: u64, total: u128 },
    /// Attempt to modify a block after it was sealed
    BlockSealed(u64),
    /// Configuration errors
    Config(String),
    /// Serialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// A thread panicked while holding the ledger lock
    LockPoisoned,
    /// Script line that could not be parsed
    InvalidCommand(String),
    /// Script command issued before `create-ledger`
    NoLedger,
}

impl LedgerError {
    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::DuplicateAddress(_) => "duplicate-address",
            LedgerError::UnknownAccount(_) => "unknown-account",
            LedgerError::FeeTooLow { .. } => "fee-too-low",
            LedgerError::AmountOverflow { .. } => "amount-overflow",
            LedgerError::NoteTooLong { .. } => "note-too-long",
            LedgerError::InsufficientFunds { .. } => "insufficient-funds",
            LedgerError::DuplicateTransactionId(_) => "duplicate-transaction-id",
            LedgerError::NoSealedBlocks => "no-sealed-blocks",
            LedgerError::BlockNotFound(_) => "block-not-found",
            LedgerError::TransactionNotFound(_) => "transaction-not-found",
            LedgerError::HashMismatch { .. } => "hash-mismatch",
            LedgerError::OversizedBlock { .. } => "oversized-block",
            LedgerError::SupplyMismatch { .. } => "supply-mismatch",
            LedgerError::BlockSealed(_) => "block-sealed",
            LedgerError::Config(_) => "config",
            LedgerError::Serialization(_) => "serialization",
            LedgerError::Io(_) => "io",
            LedgerError::LockPoisoned => "lock-poisoned",
            LedgerError::InvalidCommand(_) => "invalid-command",
            LedgerError::NoLedger => "no-ledger",
        }
    }

    /// Block named by a chain-integrity failure
    pub fn block_number(&self) -> Option<u64> {
        match self {
            LedgerError::HashMismatch { block_number }
            | LedgerError::OversizedBlock { block_number, .. }
            | LedgerError::SupplyMismatch { block_number, .. } => Some(*block_number),
            _ => None,
        }
    }

    /// True for the failures `Ledger::validate` reports
    pub fn is_integrity_failure(&self) -> bool {
        self.block_number().is_some()
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::DuplicateAddress(addr) => write!(f, "Account already exists: {addr}"),
            LedgerError::UnknownAccount(addr) => write!(f, "Account not found: {addr}"),
            LedgerError::FeeTooLow { fee, minimum } => {
                write!(f, "Transaction fee {fee} is below the minimum of {minimum}")
            }
            LedgerError::AmountOverflow { amount, maximum } => {
                write!(f, "Transaction amount {amount} exceeds the currency maximum {maximum}")
            }
            LedgerError::NoteTooLong { length, maximum } => {
                write!(f, "Transaction note is {length} characters, limit is {maximum}")
            }
            LedgerError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            LedgerError::DuplicateTransactionId(id) => {
                write!(f, "Transaction id already exists: {id}")
            }
            LedgerError::NoSealedBlocks => write!(f, "No block has been sealed yet"),
            LedgerError::BlockNotFound(number) => write!(f, "Block not found: {number}"),
            LedgerError::TransactionNotFound(id) => write!(f, "Transaction not found: {id}"),
            LedgerError::HashMismatch { block_number } => {
                write!(f, "Hash mismatch at block {block_number}")
            }
            LedgerError::OversizedBlock {
                block_number,
                transactions,
            } => write!(
                f,
                "Block {block_number} contains too many transactions ({transactions})"
            ),
            LedgerError::SupplyMismatch {
                block_number,
                total,
            } => write!(
                f,
                "Balances in block {block_number} total {total}, not the currency supply"
            ),
            LedgerError::BlockSealed(number) => write!(f, "Block {number} is already sealed"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::LockPoisoned => write!(f, "Ledger lock poisoned"),
            LedgerError::InvalidCommand(msg) => write!(f, "Invalid command: {msg}"),
            LedgerError::NoLedger => write!(f, "No ledger has been created"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LedgerError {
    fn from(err: toml::ser::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

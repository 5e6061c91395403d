//! Configuration management
//!
//! This module holds the construction-time parameters of a ledger: its identity
//! (name, description, seed) and the fixed economics (batch size, minimum fee,
//! total supply, note limit). A ledger copies these once and never changes them.

pub mod settings;

pub use settings::LedgerConfig;

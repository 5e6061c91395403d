//! Command-line interface
//!
//! This module contains the CLI argument parsing and the script command
//! processor that drives a ledger one text command at a time.

pub mod commands;
pub mod script;

pub use commands::{Command, Opt};
pub use script::{tokenize, CommandProcessor};

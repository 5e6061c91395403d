//! Utility functions and helpers
//!
//! This module contains the hashing service the ledger digests transactions
//! and blocks with.

pub mod crypto;

pub use crypto::{sha256_digest, sha256_hex, HashingService, Sha256Hasher};

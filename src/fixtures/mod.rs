//! Test utilities for ledger testing

use crate::config::LedgerConfig;
use crate::core::monetary::{MASTER_ACCOUNT, MIN_TRANSACTION_FEE};
use crate::core::Ledger;
use crate::utils::Sha256Hasher;
use std::sync::Arc;

pub const TEST_SEED: &str = "test-seed";

/// Ledger with a small batch size so tests can seal blocks quickly
pub fn small_ledger(batch_size: usize) -> Ledger {
    let config =
        LedgerConfig::new("test", "ledger under test", TEST_SEED).with_batch_size(batch_size);
    Ledger::with_config(config, Arc::new(Sha256Hasher)).unwrap()
}

/// Create `address` and pay it `amount` from master, as transaction `fund-<address>`
pub fn fund(ledger: &Ledger, address: &str, amount: u64) {
    ledger.create_account(address).unwrap();
    ledger
        .create_transaction(
            &format!("fund-{address}"),
            amount,
            MIN_TRANSACTION_FEE,
            "initial funding",
            MASTER_ACCOUNT,
            address,
        )
        .unwrap();
}

/// Submit `count` transfers with ids `<prefix>-0`, `<prefix>-1`, ...
pub fn transfer_many(
    ledger: &Ledger,
    prefix: &str,
    count: usize,
    payer: &str,
    receiver: &str,
    amount: u64,
) {
    for i in 0..count {
        ledger
            .create_transaction(
                &format!("{prefix}-{i}"),
                amount,
                MIN_TRANSACTION_FEE,
                "",
                payer,
                receiver,
            )
            .unwrap();
    }
}

/// Ledger monetary system
///
/// This module defines the currency constants a ledger is built with when no
/// configuration overrides them.
///
/// ## Monetary Units
/// - **Unit**: the only denomination; balances, amounts and fees are whole units
/// - **Supply**: fixed at genesis and held by the master account, never minted afterwards
/// - **Minimum Fee**: 10 units, paid by the payer into the master account
///
/// Total currency supply (the largest signed 32-bit integer)
pub const MAX_SUPPLY: u64 = i32::MAX as u64;

/// Minimum fee accepted on a transaction
pub const MIN_TRANSACTION_FEE: u64 = 10;

/// Transactions per block
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Longest note a transaction may carry, in characters
pub const MAX_NOTE_LENGTH: usize = 1024;

/// Address of the account holding the supply and collecting fees
pub const MASTER_ACCOUNT: &str = "master";

/// Utility functions for monetary arithmetic
pub mod conversions {
    /// Amount plus fee, `None` if it cannot be represented
    pub fn total_debit(amount: u64, fee: u64) -> Option<u64> {
        amount.checked_add(fee)
    }

    /// Sum of a set of balances, wide enough that it never overflows
    pub fn total_supply<'a, I>(balances: I) -> u128
    where
        I: IntoIterator<Item = &'a u64>,
    {
        balances.into_iter().map(|b| *b as u128).sum()
    }
}

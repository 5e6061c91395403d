use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// A balance cell identified by its address.
///
/// Only the ledger mutates balances, and only while applying a validated
/// transaction; `credit` and `debit` are crate-private for that reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: String,
    balance: u64,
}

impl Account {
    pub fn new(address: &str) -> Account {
        Account {
            address: address.to_string(),
            balance: 0,
        }
    }

    pub(crate) fn with_balance(address: &str, balance: u64) -> Account {
        Account {
            address: address.to_string(),
            balance,
        }
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_balance(&self) -> u64 {
        self.balance
    }

    pub(crate) fn credit(&mut self, amount: u64) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow {
                amount,
                maximum: u64::MAX - self.balance,
            })?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, amount: u64) -> Result<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                required: amount,
                available: self.balance,
            })?;
        Ok(())
    }
}

// This file implements the transaction record - a single transfer between two accounts
// A transaction only names its accounts by address, it never holds the accounts themselves,
// so hashing a transaction later gives the same answer no matter how balances have moved

use crate::utils::HashingService;
use serde::{Deserialize, Serialize};
use std::fmt;

// This is the transfer itself: amount goes payer -> receiver, fee goes payer -> master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,       // Caller-chosen id, unique across the whole chain
    amount: u64,      // Moved from payer to receiver
    fee: u64,         // Moved from payer to the master account
    note: String,     // Free text, length-limited by the ledger
    payer: String,    // Address of the account paying amount + fee
    receiver: String, // Address of the account receiving amount
}

impl Transaction {
    // Pure construction - checking the transfer against balances is the ledger's job
    pub fn new(
        id: &str,
        amount: u64,
        fee: u64,
        note: &str,
        payer: &str,
        receiver: &str,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount,
            fee,
            note: note.to_string(),
            payer: payer.to_string(),
            receiver: receiver.to_string(),
        }
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_fee(&self) -> u64 {
        self.fee
    }

    pub fn get_note(&self) -> &str {
        self.note.as_str()
    }

    pub fn get_payer(&self) -> &str {
        self.payer.as_str()
    }

    pub fn get_receiver(&self) -> &str {
        self.receiver.as_str()
    }

    /// What the payer's balance goes down by, `None` on overflow
    pub fn total_debit(&self) -> Option<u64> {
        crate::core::monetary::conversions::total_debit(self.amount, self.fee)
    }

    // I use the display text as the fingerprint: it covers every field and nothing else
    pub fn fingerprint(&self) -> String {
        self.to_string()
    }

    pub fn fingerprint_hash(&self, hasher: &dyn HashingService) -> String {
        hasher.digest_str(&self.fingerprint())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} {} from {} to {}, Fee: {}, Note: {}",
            self.id, self.amount, self.payer, self.receiver, self.fee, self.note
        )
    }
}

use crate::core::{Account, MerkleTree, Transaction};
use crate::error::{LedgerError, Result};
use crate::utils::HashingService;
use serde::Serialize;
use std::collections::BTreeMap;

/// A batch of transactions plus the account balances after applying them.
///
/// A block starts open, collects transactions one at a time, then is sealed
/// exactly once: the balance snapshot is taken, the hash computed, and from
/// then on nothing about it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    block_number: u64,
    previous_hash: String, // Empty for genesis
    hash: String,          // Empty until sealed
    merkle_root: String,
    transactions: Vec<Transaction>,
    account_balances: BTreeMap<String, u64>,
    #[serde(skip)]
    sealed: bool,
}

impl Block {
    /// Block number 1, no predecessor
    pub fn genesis() -> Block {
        Block {
            block_number: 1,
            previous_hash: String::new(),
            hash: String::new(),
            merkle_root: String::new(),
            transactions: Vec::new(),
            account_balances: BTreeMap::new(),
            sealed: false,
        }
    }

    /// Next block in the chain, linked to `previous` by hash only
    pub fn successor(previous: &Block) -> Block {
        Block {
            block_number: previous.block_number + 1,
            previous_hash: previous.hash.clone(),
            ..Block::genesis()
        }
    }

    pub fn append(&mut self, transaction: Transaction) -> Result<()> {
        if self.sealed {
            return Err(LedgerError::BlockSealed(self.block_number));
        }
        if self.contains_transaction(transaction.get_id()) {
            return Err(LedgerError::DuplicateTransactionId(
                transaction.get_id().to_string(),
            ));
        }
        self.transactions.push(transaction);
        Ok(())
    }

    /// Copy every account's current balance into this block
    pub fn snapshot_balances<'a, I>(&mut self, accounts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Account>,
    {
        if self.sealed {
            return Err(LedgerError::BlockSealed(self.block_number));
        }
        self.account_balances = accounts
            .into_iter()
            .map(|account| (account.get_address().to_string(), account.get_balance()))
            .collect();
        Ok(())
    }

    /// Compute the Merkle root and block hash and freeze the block
    pub fn seal(&mut self, hasher: &dyn HashingService, seed: &str) -> Result<&str> {
        if self.sealed {
            return Err(LedgerError::BlockSealed(self.block_number));
        }
        self.merkle_root = MerkleTree::calculate_root(hasher, &self.transactions);
        self.hash = self.compute_hash(hasher, seed)?;
        self.sealed = true;
        Ok(self.hash.as_str())
    }

    /// Hash of this block's content as it stands now
    pub fn compute_hash(&self, hasher: &dyn HashingService, seed: &str) -> Result<String> {
        let merkle_root = MerkleTree::calculate_root(hasher, &self.transactions);
        let balances = serde_json::to_string(&self.account_balances)?;
        let fingerprints: Vec<String> =
            self.transactions.iter().map(|tx| tx.fingerprint()).collect();
        let transactions = serde_json::to_string(&fingerprints)?;

        let canonical = format!(
            "{}-{}-{}-{}-{}-{}",
            self.block_number, merkle_root, balances, transactions, self.previous_hash, seed
        );
        Ok(hasher.digest_str(&canonical))
    }

    /// Verify that the block's Merkle root matches its transactions
    pub fn verify_merkle_root(&self, hasher: &dyn HashingService) -> bool {
        MerkleTree::verify_transactions(hasher, &self.transactions, &self.merkle_root)
    }

    /// Verify that the stored hash still matches the block's content
    pub fn verify_hash(&self, hasher: &dyn HashingService, seed: &str) -> Result<bool> {
        Ok(self.sealed && self.compute_hash(hasher, seed)? == self.hash)
    }

    pub fn contains_transaction(&self, id: &str) -> bool {
        self.transactions.iter().any(|tx| tx.get_id() == id)
    }

    pub fn find_transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.get_id() == id)
    }

    pub fn total_balance(&self) -> u128 {
        crate::core::monetary::conversions::total_supply(self.account_balances.values())
    }

    pub fn get_block_number(&self) -> u64 {
        self.block_number
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_merkle_root(&self) -> &str {
        self.merkle_root.as_str()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_account_balances(&self) -> &BTreeMap<String, u64> {
        &self.account_balances
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

/// Direct edits that bypass sealing, for exercising chain validation
#[cfg(test)]
impl Block {
    pub(crate) fn tamper_previous_hash(&mut self, previous_hash: &str) {
        self.previous_hash = previous_hash.to_string();
    }

    pub(crate) fn tamper_balance(&mut self, address: &str, balance: u64) {
        self.account_balances.insert(address.to_string(), balance);
    }

    pub(crate) fn tamper_push_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Sha256Hasher;

    fn sealed_block(seed: &str) -> Block {
        let mut block = Block::genesis();
        block
            .append(Transaction::new("1", 5, 10, "", "master", "a"))
            .unwrap();
        block
            .snapshot_balances(&[
                Account::with_balance("a", 5),
                Account::with_balance("master", 95),
            ])
            .unwrap();
        block.seal(&Sha256Hasher, seed).unwrap();
        block
    }

    #[test]
    fn test_genesis_block() {
        let block = Block::genesis();
        assert_eq!(block.get_block_number(), 1);
        assert_eq!(block.get_previous_hash(), "");
        assert_eq!(block.get_hash(), "");
        assert!(block.is_empty());
        assert!(!block.is_sealed());
    }

    #[test]
    fn test_successor_links_to_previous_hash() {
        let genesis = sealed_block("seed");
        let next = Block::successor(&genesis);
        assert_eq!(next.get_block_number(), 2);
        assert_eq!(next.get_previous_hash(), genesis.get_hash());
        assert!(next.get_account_balances().is_empty());
    }

    #[test]
    fn test_duplicate_id_within_block_rejected() {
        let mut block = Block::genesis();
        block
            .append(Transaction::new("1", 1, 10, "", "a", "b"))
            .unwrap();
        let err = block
            .append(Transaction::new("1", 2, 10, "", "a", "b"))
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateTransactionId("1".to_string()));
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn test_sealed_block_is_frozen() {
        let mut block = sealed_block("seed");
        let hash = block.get_hash().to_string();

        assert_eq!(
            block.append(Transaction::new("2", 1, 10, "", "a", "b")),
            Err(LedgerError::BlockSealed(1))
        );
        assert_eq!(
            block.snapshot_balances(&[Account::new("x")]),
            Err(LedgerError::BlockSealed(1))
        );
        assert!(block.seal(&Sha256Hasher, "seed").is_err());
        assert_eq!(block.get_hash(), hash);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut accounts = vec![Account::with_balance("a", 10)];
        let mut block = Block::genesis();
        block.snapshot_balances(&accounts).unwrap();

        accounts[0].credit(5).unwrap();
        assert_eq!(block.get_account_balances()["a"], 10);
    }

    #[test]
    fn test_hash_is_reproducible_and_seeded() {
        let a = sealed_block("seed");
        let b = sealed_block("seed");
        let c = sealed_block("other");

        assert_eq!(a.get_hash(), b.get_hash());
        assert_ne!(a.get_hash(), c.get_hash());
        assert_eq!(a.get_hash().len(), 64);
        assert!(a.verify_hash(&Sha256Hasher, "seed").unwrap());
        assert!(!a.verify_hash(&Sha256Hasher, "other").unwrap());
        assert!(a.verify_merkle_root(&Sha256Hasher));
        assert_eq!(
            a.get_merkle_root(),
            MerkleTree::calculate_root(&Sha256Hasher, a.get_transactions())
        );
    }

    #[test]
    fn test_tampered_snapshot_fails_hash_check() {
        let mut block = sealed_block("seed");
        block.tamper_balance("a", 6);
        assert!(!block.verify_hash(&Sha256Hasher, "seed").unwrap());
        assert_eq!(block.total_balance(), 101);
    }

    #[test]
    fn test_find_transaction() {
        let block = sealed_block("seed");
        assert_eq!(block.find_transaction("1").unwrap().get_amount(), 5);
        assert!(block.find_transaction("2").is_none());
    }
}

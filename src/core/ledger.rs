// This is the ledger - the one place that owns accounts and blocks
// Every transfer is validated, staged, appended to the open block and committed under one
// write lock, and when the open block fills up it is snapshotted, sealed and swapped into the
// chain in the same step

use crate::config::LedgerConfig;
use crate::core::monetary::{conversions, MASTER_ACCOUNT};
use crate::core::{Account, Block, Transaction};
use crate::error::{LedgerError, Result};
use crate::utils::{HashingService, Sha256Hasher};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Everything that changes lives in here, behind the ledger's lock
struct LedgerState {
    accounts: BTreeMap<String, Account>,      // Live balances, keyed by address
    sealed_blocks: BTreeMap<u64, Arc<Block>>, // Immutable once inserted
    open_block: Block,                        // Always numbered sealed_blocks.len() + 1
    transaction_index: HashMap<String, u64>,  // Transaction id -> block number, open block included
}

/// Hash-chained, batch-sealed balance ledger.
///
/// Mutations (`create_account`, `create_transaction`) are serialized by a
/// write lock covering validate, apply and seal. Queries take the read lock
/// and only ever see sealed blocks.
pub struct Ledger {
    name: String,
    description: String,
    seed: String,
    batch_size: usize,
    min_fee: u64,
    max_supply: u64,
    max_note_length: usize,
    hasher: Arc<dyn HashingService>,
    state: RwLock<LedgerState>,
}

impl Ledger {
    // When I just want a ledger with the standard economics and SHA-256
    pub fn new(name: &str, description: &str, seed: &str) -> Ledger {
        let config = LedgerConfig::new(name, description, seed);
        Self::build(config, Arc::new(Sha256Hasher))
    }

    // When the caller supplies the parameters and the hashing service
    pub fn with_config(config: LedgerConfig, hasher: Arc<dyn HashingService>) -> Result<Ledger> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: LedgerConfig, hasher: Arc<dyn HashingService>) -> Ledger {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            MASTER_ACCOUNT.to_string(),
            Account::with_balance(MASTER_ACCOUNT, config.max_supply),
        );

        info!(
            "Created ledger '{}' (batch size {}, supply {})",
            config.name, config.batch_size, config.max_supply
        );

        Ledger {
            name: config.name,
            description: config.description,
            seed: config.seed,
            batch_size: config.batch_size,
            min_fee: config.min_fee,
            max_supply: config.max_supply,
            max_note_length: config.max_note_length,
            hasher,
            state: RwLock::new(LedgerState {
                accounts,
                sealed_blocks: BTreeMap::new(),
                open_block: Block::genesis(),
                transaction_index: HashMap::new(),
            }),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>> {
        self.state.write().map_err(|_| LedgerError::LockPoisoned)
    }

    pub fn get_name(&self) -> &str {
        self.name.as_str()
    }

    pub fn get_description(&self) -> &str {
        self.description.as_str()
    }

    pub fn get_seed(&self) -> &str {
        self.seed.as_str()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn min_fee(&self) -> u64 {
        self.min_fee
    }

    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    pub fn create_account(&self, address: &str) -> Result<String> {
        let mut state = self.write_state()?;

        if state.accounts.contains_key(address) {
            warn!("Rejected account creation: {address} already exists");
            return Err(LedgerError::DuplicateAddress(address.to_string()));
        }

        state
            .accounts
            .insert(address.to_string(), Account::new(address));
        debug!("Created account {address}");
        Ok(address.to_string())
    }

    /// Validate and apply one transfer, sealing the open block if it fills up.
    ///
    /// Checks run in this order and stop at the first failure: unknown payer or
    /// receiver, fee below minimum, amount above supply, note too long,
    /// insufficient funds, duplicate id anywhere in the chain. A rejected
    /// transaction changes nothing.
    pub fn create_transaction(
        &self,
        id: &str,
        amount: u64,
        fee: u64,
        note: &str,
        payer: &str,
        receiver: &str,
    ) -> Result<String> {
        let transaction = Transaction::new(id, amount, fee, note, payer, receiver);
        self.process_transaction(transaction).map_err(|e| {
            warn!("Rejected transaction {id}: {e}");
            e
        })
    }

    fn process_transaction(&self, transaction: Transaction) -> Result<String> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;

        self.validate_transaction(state, &transaction)?;

        // I stage everything on copies first, so any failure below leaves the ledger untouched
        let staged = Self::stage_balances(&state.accounts, &transaction)?;
        let mut block = state.open_block.clone();
        block.append(transaction.clone())?;

        let sealing = block.len() >= self.batch_size;
        if sealing {
            let snapshot = state
                .accounts
                .iter()
                .map(|(address, account)| staged.get(address).unwrap_or(account));
            block.snapshot_balances(snapshot)?;
            block.seal(self.hasher.as_ref(), &self.seed)?;
        }

        // Commit: nothing past this point can fail
        let id = transaction.get_id().to_string();
        let block_number = block.get_block_number();
        state.accounts.extend(staged);
        state.transaction_index.insert(id.clone(), block_number);
        debug!("Accepted transaction {id} into block {block_number}");

        if sealing {
            let next = Block::successor(&block);
            info!(
                "Sealed block {} with {} transactions: {}",
                block_number,
                block.len(),
                block.get_hash()
            );
            state.sealed_blocks.insert(block_number, Arc::new(block));
            state.open_block = next;
        } else {
            state.open_block = block;
        }

        Ok(id)
    }

    fn validate_transaction(&self, state: &LedgerState, transaction: &Transaction) -> Result<()> {
        let payer = state
            .accounts
            .get(transaction.get_payer())
            .ok_or_else(|| LedgerError::UnknownAccount(transaction.get_payer().to_string()))?;
        if !state.accounts.contains_key(transaction.get_receiver()) {
            return Err(LedgerError::UnknownAccount(
                transaction.get_receiver().to_string(),
            ));
        }

        if transaction.get_fee() < self.min_fee {
            return Err(LedgerError::FeeTooLow {
                fee: transaction.get_fee(),
                minimum: self.min_fee,
            });
        }

        if transaction.get_amount() > self.max_supply {
            return Err(LedgerError::AmountOverflow {
                amount: transaction.get_amount(),
                maximum: self.max_supply,
            });
        }

        let note_length = transaction.get_note().chars().count();
        if note_length > self.max_note_length {
            return Err(LedgerError::NoteTooLong {
                length: note_length,
                maximum: self.max_note_length,
            });
        }

        // A debit too large for u64 is still just more than the payer holds
        let available = payer.get_balance();
        match transaction.total_debit() {
            Some(required) if required <= available => {}
            required => {
                return Err(LedgerError::InsufficientFunds {
                    required: required.unwrap_or(u64::MAX),
                    available,
                });
            }
        }

        if state.transaction_index.contains_key(transaction.get_id()) {
            return Err(LedgerError::DuplicateTransactionId(
                transaction.get_id().to_string(),
            ));
        }

        Ok(())
    }

    // Payer, receiver and master may overlap, so I apply the three moves to one scratch copy
    // per address
    fn stage_balances(
        accounts: &BTreeMap<String, Account>,
        transaction: &Transaction,
    ) -> Result<BTreeMap<String, Account>> {
        let mut staged: BTreeMap<String, Account> = BTreeMap::new();
        for address in [
            transaction.get_payer(),
            transaction.get_receiver(),
            MASTER_ACCOUNT,
        ] {
            if !staged.contains_key(address) {
                let account = accounts
                    .get(address)
                    .ok_or_else(|| LedgerError::UnknownAccount(address.to_string()))?;
                staged.insert(address.to_string(), account.clone());
            }
        }

        let available = Self::staged_account(&mut staged, transaction.get_payer())?.get_balance();
        let required = transaction
            .total_debit()
            .ok_or(LedgerError::InsufficientFunds {
                required: u64::MAX,
                available,
            })?;
        Self::staged_account(&mut staged, transaction.get_payer())?.debit(required)?;
        Self::staged_account(&mut staged, transaction.get_receiver())?
            .credit(transaction.get_amount())?;
        Self::staged_account(&mut staged, MASTER_ACCOUNT)?.credit(transaction.get_fee())?;

        Ok(staged)
    }

    fn staged_account<'a>(
        staged: &'a mut BTreeMap<String, Account>,
        address: &str,
    ) -> Result<&'a mut Account> {
        staged
            .get_mut(address)
            .ok_or_else(|| LedgerError::UnknownAccount(address.to_string()))
    }

    fn latest_sealed(state: &LedgerState) -> Result<&Arc<Block>> {
        state
            .sealed_blocks
            .values()
            .next_back()
            .ok_or(LedgerError::NoSealedBlocks)
    }

    /// Balance as of the most recently sealed block
    pub fn get_account_balance(&self, address: &str) -> Result<u64> {
        let state = self.read_state()?;
        let block = Self::latest_sealed(&state)?;
        block
            .get_account_balances()
            .get(address)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAccount(address.to_string()))
    }

    /// Every balance as of the most recently sealed block
    pub fn get_account_balances(&self) -> Result<BTreeMap<String, u64>> {
        let state = self.read_state()?;
        let block = Self::latest_sealed(&state)?;
        Ok(block.get_account_balances().clone())
    }

    pub fn get_block(&self, block_number: u64) -> Result<Arc<Block>> {
        let state = self.read_state()?;
        if block_number < 1 || block_number >= state.open_block.get_block_number() {
            return Err(LedgerError::BlockNotFound(block_number));
        }
        state
            .sealed_blocks
            .get(&block_number)
            .cloned()
            .ok_or(LedgerError::BlockNotFound(block_number))
    }

    /// Look a transaction up in the sealed blocks; the open block is not searched
    pub fn get_transaction(&self, id: &str) -> Result<Transaction> {
        let state = self.read_state()?;
        state
            .transaction_index
            .get(id)
            .and_then(|number| state.sealed_blocks.get(number))
            .and_then(|block| block.find_transaction(id))
            .cloned()
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))
    }

    /// Walk the sealed chain newest to oldest and report the first broken invariant.
    ///
    /// Per block: previous hash matches predecessor, no more than `batch_size`
    /// transactions, snapshot sums to the supply, stored hash matches content.
    pub fn validate(&self) -> Result<()> {
        let state = self.read_state()?;

        for block in state.sealed_blocks.values().rev() {
            if let Err(e) = self.validate_block(&state, block) {
                warn!("Chain validation failed: {e}");
                return Err(e);
            }
        }

        debug!("Validated {} sealed blocks", state.sealed_blocks.len());
        Ok(())
    }

    fn validate_block(&self, state: &LedgerState, block: &Block) -> Result<()> {
        let block_number = block.get_block_number();

        if block_number > 1 {
            let linked = state
                .sealed_blocks
                .get(&(block_number - 1))
                .is_some_and(|previous| previous.get_hash() == block.get_previous_hash());
            if !linked {
                return Err(LedgerError::HashMismatch { block_number });
            }
        }

        if block.len() > self.batch_size {
            return Err(LedgerError::OversizedBlock {
                block_number,
                transactions: block.len(),
            });
        }

        let total = conversions::total_supply(block.get_account_balances().values());
        if total != self.max_supply as u128 {
            return Err(LedgerError::SupplyMismatch {
                block_number,
                total,
            });
        }

        if !block.verify_hash(self.hasher.as_ref(), &self.seed)? {
            return Err(LedgerError::HashMismatch { block_number });
        }

        Ok(())
    }

    pub fn open_block_number(&self) -> Result<u64> {
        Ok(self.read_state()?.open_block.get_block_number())
    }

    /// Transactions waiting in the open block
    pub fn pending_transaction_count(&self) -> Result<usize> {
        Ok(self.read_state()?.open_block.len())
    }

    pub fn sealed_block_count(&self) -> Result<usize> {
        Ok(self.read_state()?.sealed_blocks.len())
    }

    pub fn account_exists(&self, address: &str) -> Result<bool> {
        Ok(self.read_state()?.accounts.contains_key(address))
    }
}

#[cfg(test)]
impl Ledger {
    /// Live balance, ahead of the last seal
    pub(crate) fn live_balance(&self, address: &str) -> Option<u64> {
        self.read_state()
            .ok()?
            .accounts
            .get(address)
            .map(Account::get_balance)
    }

    pub(crate) fn tamper_sealed_block<F: FnOnce(&mut Block)>(&self, block_number: u64, edit: F) {
        let mut state = self.write_state().unwrap();
        let block = state.sealed_blocks.get_mut(&block_number).unwrap();
        edit(Arc::make_mut(block));
    }
}

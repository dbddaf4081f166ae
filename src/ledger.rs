//! The indexer ledger: quorum-gated, SPV-proven, exactly-once balance updates
//!
//! IndexOne(p) = Commit(p) iff ¬Indexed(key(p)) ∧ Quorate(HashTransfer(p.transfer))
//!                              ∧ WasMined(p.raw_tx, p.block, p.proof) ∧ Balance(from) ≥ amt
//!
//! Every check runs before the first write, so a rejected pack leaves no trace.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;
use secp256k1::PublicKey;
use tracing::{info, warn};

use crate::block::BlockHeaderStore;
use crate::config::{BatchMode, IndexerConfig};
use crate::crypto::{reverse_hash, sha256d};
use crate::error::{IndexerError, Result};
use crate::principal::Principal;
use crate::signature::ValidatorRegistry;
use crate::spv::{SpvOutcome, SpvVerifier};
use crate::transaction::ParseLimits;
use crate::transfer::{self, IndexKey, IndexedRecord, SignaturePack, Transfer, TransferPack};
use crate::types::*;

/// Per-pack results of an [`IndexerLedger::index_many`] call, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<std::result::Result<IndexKey, IndexerError>>,
}

impl BatchReport {
    pub fn committed(&self) -> impl Iterator<Item = &IndexKey> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &IndexerError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    }

    pub fn committed_count(&self) -> usize {
        self.committed().count()
    }

    pub fn all_committed(&self) -> bool {
        self.results.iter().all(|r| r.is_ok())
    }
}

#[derive(Debug, Clone)]
pub struct IndexerLedger {
    owner: Principal,
    paused: bool,
    relayers: BTreeSet<Principal>,
    headers: BlockHeaderStore,
    registry: ValidatorRegistry,
    indexed: BTreeMap<IndexKey, IndexedRecord>,
    balances: BTreeMap<BalanceKey, u128>,
    batch_mode: BatchMode,
    max_batch_size: usize,
    max_signatures_per_pack: usize,
    limits: ParseLimits,
}

impl IndexerLedger {
    pub fn new(config: &IndexerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            owner: config.owner,
            paused: false,
            relayers: BTreeSet::new(),
            headers: BlockHeaderStore::new(),
            registry: ValidatorRegistry::new(&config.domain, config.required_validators)?,
            indexed: BTreeMap::new(),
            balances: BTreeMap::new(),
            batch_mode: config.batch_mode,
            max_batch_size: config.max_batch_size,
            max_signatures_per_pack: config.max_signatures_per_pack,
            limits: config.limits.clone(),
        })
    }

    fn ensure_owner(&self, caller: &Principal, operation: &str) -> Result<()> {
        if *caller != self.owner {
            warn!(%caller, operation, "refused admin call");
            return Err(IndexerError::AdminOnly(operation.to_string()));
        }
        Ok(())
    }

    // Admin surface

    pub fn set_contract_owner(&mut self, caller: &Principal, owner: Principal) -> Result<()> {
        self.ensure_owner(caller, "set-contract-owner")?;
        info!(previous = %self.owner, owner = %owner, "contract owner changed");
        self.owner = owner;
        Ok(())
    }

    pub fn set_paused(&mut self, caller: &Principal, paused: bool) -> Result<()> {
        self.ensure_owner(caller, "set-paused")?;
        self.paused = paused;
        info!(paused, "pause state changed");
        Ok(())
    }

    pub fn set_required_validators(&mut self, caller: &Principal, required: u32) -> Result<()> {
        self.ensure_owner(caller, "set-required-validators")?;
        if required as usize > self.max_signatures_per_pack {
            return Err(IndexerError::InvalidThreshold(required));
        }
        self.registry.set_required_validators(required)
    }

    pub fn add_validator(
        &mut self,
        caller: &Principal,
        public_key: PublicKey,
        identity: Principal,
    ) -> Result<()> {
        self.ensure_owner(caller, "add-validator")?;
        self.registry.add_validator(public_key, identity)
    }

    pub fn remove_validator(&mut self, caller: &Principal, identity: &Principal) -> Result<()> {
        self.ensure_owner(caller, "remove-validator")?;
        self.registry.remove_validator(identity)
    }

    pub fn approve_relayer(
        &mut self,
        caller: &Principal,
        relayer: Principal,
        approved: bool,
    ) -> Result<()> {
        self.ensure_owner(caller, "approve-relayer")?;
        if approved {
            self.relayers.insert(relayer);
        } else {
            self.relayers.remove(&relayer);
        }
        info!(%relayer, approved, "relayer approval changed");
        Ok(())
    }

    /// Seed a balance directly, e.g. for state carried over from before the bridge.
    pub fn set_user_balance(
        &mut self,
        caller: &Principal,
        user: ByteString,
        tick: String,
        amt: u128,
    ) -> Result<()> {
        self.ensure_owner(caller, "set-user-balance")?;
        info!(user = %hex::encode(&user), %tick, amt, "balance set");
        self.balances.insert((user, tick), amt);
        Ok(())
    }

    // Oracle surface

    /// `hash` is SHA256d of the 80-byte header, internal byte order.
    pub fn record_burnchain_header(
        &mut self,
        caller: &Principal,
        height: Natural,
        hash: Hash,
    ) -> Result<()> {
        self.ensure_owner(caller, "record-burnchain-header")?;
        self.headers.record(height, hash)
    }

    // Read-only surface

    pub fn get_contract_owner(&self) -> &Principal {
        &self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_approved_relayer(&self, relayer: &Principal) -> bool {
        self.relayers.contains(relayer)
    }

    pub fn required_validators(&self) -> u32 {
        self.registry.required_validators()
    }

    pub fn validator_count(&self) -> usize {
        self.registry.validator_count()
    }

    pub fn get_validator_or_fail(&self, identity: &Principal) -> Result<&PublicKey> {
        self.registry.get_validator_or_fail(identity)
    }

    pub fn count_attestations(&self, tx_hash: &Hash) -> usize {
        self.registry.count_attestations(tx_hash)
    }

    pub fn headers(&self) -> &BlockHeaderStore {
        &self.headers
    }

    pub fn get_balance(&self, user: &[u8], tick: &str) -> u128 {
        self.balances
            .get(&(user.to_vec(), tick.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn get_indexed_or_fail(
        &self,
        bitcoin_tx: &Hash,
        output: u64,
        offset: u64,
    ) -> Result<&IndexedRecord> {
        let key = IndexKey {
            bitcoin_tx: *bitcoin_tx,
            output,
            offset,
        };
        self.indexed
            .get(&key)
            .ok_or_else(|| IndexerError::NotIndexed(key.to_string()))
    }

    pub fn hash_transfer(&self, transfer: &Transfer) -> Hash {
        transfer::hash_transfer(transfer)
    }

    pub fn validate_signature(&self, tx_hash: &Hash, pack: &SignaturePack) -> Result<bool> {
        self.registry.validate(tx_hash, pack)
    }

    pub fn verify_mined(&self, raw_tx: &[u8], block: &BlockRef, proof: &MerkleProof) -> Result<bool> {
        SpvVerifier::new(&self.headers, &self.limits).verify_mined(raw_tx, block, proof)
    }

    // Relayer surface

    /// Index a batch of packs on behalf of `caller`.
    ///
    /// Caller and pause checks apply to the whole batch. After that, in
    /// [`BatchMode::Isolated`] every pack commits or fails on its own and the
    /// report carries each outcome; in [`BatchMode::Atomic`] the first failure
    /// is returned as [`IndexerError::BatchRejected`] and nothing is committed.
    pub fn index_many(&mut self, caller: &Principal, packs: &[TransferPack]) -> Result<BatchReport> {
        if self.paused {
            warn!(%caller, "index-many while paused");
            return Err(IndexerError::Paused);
        }
        if !self.relayers.contains(caller) {
            warn!(%caller, "index-many from unapproved relayer");
            return Err(IndexerError::NotApprovedRelayer(caller.to_string()));
        }
        if packs.len() > self.max_batch_size {
            return Err(IndexerError::BatchTooLarge {
                size: packs.len(),
                limit: self.max_batch_size,
            });
        }

        match self.batch_mode {
            BatchMode::Isolated => {
                let results = packs
                    .iter()
                    .enumerate()
                    .map(|(index, pack)| {
                        self.stage(pack, &BatchOverlay::default())
                            .map(|writes| self.apply(writes))
                            .map_err(|error| {
                                warn!(index, key = %pack.transfer.key(), %error, "pack rejected");
                                error
                            })
                    })
                    .collect();
                Ok(BatchReport { results })
            }
            BatchMode::Atomic => {
                let mut overlay = BatchOverlay::default();
                for (index, pack) in packs.iter().enumerate() {
                    let writes = self.stage(pack, &overlay).map_err(|error| {
                        warn!(index, key = %pack.transfer.key(), %error, "batch rolled back");
                        IndexerError::BatchRejected {
                            index,
                            source: Box::new(error),
                        }
                    })?;
                    overlay.push(writes);
                }
                let results = overlay
                    .writes
                    .into_iter()
                    .map(|writes| Ok(self.apply(writes)))
                    .collect();
                Ok(BatchReport { results })
            }
        }
    }

    fn balance_through(&self, overlay: &BatchOverlay, key: &BalanceKey) -> u128 {
        overlay
            .balances
            .get(key)
            .or_else(|| self.balances.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Run every check for `pack` against committed state plus `overlay`, without writing.
    fn stage(&self, pack: &TransferPack, overlay: &BatchOverlay) -> Result<PackWrites> {
        let transfer = &pack.transfer;
        transfer.check()?;

        let key = transfer.key();
        if self.indexed.contains_key(&key) || overlay.indexed.contains(&key) {
            return Err(IndexerError::AlreadyIndexed(key.to_string()));
        }

        if pack.signatures.len() > self.max_signatures_per_pack {
            return Err(IndexerError::InvalidTransfer(format!(
                "{} signature packs exceed limit {}",
                pack.signatures.len(),
                self.max_signatures_per_pack
            )));
        }
        let tx_hash = transfer::hash_transfer(transfer);
        let signers = self.registry.collect_attestations(&tx_hash, &pack.signatures)?;
        self.registry.check_quorum(&tx_hash, &signers)?;

        let tx = match SpvVerifier::new(&self.headers, &self.limits).prove(
            &pack.raw_tx,
            &pack.block,
            &pack.proof,
        )? {
            SpvOutcome::Mined(tx) => tx,
            SpvOutcome::HeaderMismatch => {
                return Err(IndexerError::ProofMismatch(format!(
                    "no matching header recorded at height {}",
                    pack.block.height
                )))
            }
            SpvOutcome::RootMismatch => {
                return Err(IndexerError::ProofMismatch(
                    "merkle path does not reach the header's root".into(),
                ))
            }
        };

        let txid = reverse_hash(&sha256d(&tx.serialize_without_witness()));
        if txid != transfer.bitcoin_tx {
            return Err(IndexerError::ProofMismatch(format!(
                "proved transaction {} is not the claimed {}",
                hex::encode(txid),
                hex::encode(transfer.bitcoin_tx)
            )));
        }
        if transfer.output >= tx.outputs().len() as u64 {
            return Err(IndexerError::ProofMismatch(format!(
                "output {} not present, transaction has {}",
                transfer.output,
                tx.outputs().len()
            )));
        }

        let from_key = (transfer.from.clone(), transfer.tick.clone());
        let to_key = (transfer.to.clone(), transfer.tick.clone());
        let from_current = self.balance_through(overlay, &from_key);
        let from_balance = from_current.checked_sub(transfer.amt).ok_or_else(|| {
            IndexerError::InsufficientBalance(format!(
                "{} holds {} {}, needs {}",
                hex::encode(&transfer.from),
                from_current,
                transfer.tick,
                transfer.amt
            ))
        })?;
        let to_current = if transfer.from == transfer.to {
            from_balance
        } else {
            self.balance_through(overlay, &to_key)
        };
        let to_balance = to_current
            .checked_add(transfer.amt)
            .ok_or_else(|| IndexerError::BalanceOverflow(hex::encode(&transfer.to)))?;

        Ok(PackWrites {
            key,
            record: IndexedRecord::from(transfer),
            tx_hash,
            signers,
            from: (from_key, from_balance),
            to: (to_key, to_balance),
            height: pack.block.height,
        })
    }

    fn apply(&mut self, writes: PackWrites) -> IndexKey {
        let PackWrites { key, record, tx_hash, signers, from, to, height } = writes;
        info!(%key, tick = %record.tick, amt = record.amt, height, "transfer indexed");

        self.balances.insert(from.0, from.1);
        self.balances.insert(to.0, to.1);
        self.indexed.insert(key, record);
        self.registry.record_attestations(tx_hash, signers);
        key
    }
}

type BalanceKey = (ByteString, String);

/// Writes of one verified pack, not yet applied.
#[derive(Debug)]
struct PackWrites {
    key: IndexKey,
    record: IndexedRecord,
    tx_hash: Hash,
    signers: BTreeSet<Principal>,
    from: (BalanceKey, u128),
    to: (BalanceKey, u128),
    height: Natural,
}

/// Pending writes of an atomic batch. Sized by the batch, not by the ledger.
#[derive(Debug, Default)]
struct BatchOverlay {
    balances: BTreeMap<BalanceKey, u128>,
    indexed: BTreeSet<IndexKey>,
    writes: Vec<PackWrites>,
}

impl BatchOverlay {
    fn push(&mut self, writes: PackWrites) {
        // to is written second so a self-transfer keeps the credited value
        self.balances.insert(writes.from.0.clone(), writes.from.1);
        self.balances.insert(writes.to.0.clone(), writes.to.1);
        self.indexed.insert(writes.key);
        self.writes.push(writes);
    }
}

/// Single-writer handle: every operation runs under one lock, one batch at a time.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<IndexerLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: IndexerLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut IndexerLedger) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn index_many(&self, caller: &Principal, packs: &[TransferPack]) -> Result<BatchReport> {
        self.inner.lock().index_many(caller, packs)
    }

    pub fn get_balance(&self, user: &[u8], tick: &str) -> u128 {
        self.inner.lock().get_balance(user, tick)
    }

    pub fn snapshot(&self) -> IndexerLedger {
        self.inner.lock().clone()
    }
}

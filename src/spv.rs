//! Simplified Payment Verification: was this exact transaction mined at this height?
//!
//! WasMined(tx, b, π) ⟺ SHA256d(b.header) = Store(b.height)
//!                     ∧ MerkleRoot(TxHash(tx), π) = b.header.merkle_root
//!
//! Segwit transactions are proved with their non-witness hash (the txid), never the wtxid.

use tracing::debug;

use crate::block::{header_hash, parse_block_header, BlockHeaderStore};
use crate::crypto::{reverse_hash, sha256d};
use crate::error::Result;
use crate::merkle::verify_merkle_proof;
use crate::segwit::parse_segwit_tx_with_limits;
use crate::transaction::{
    is_segwit_encoding, parse_tx_with_limits, DecodedTransaction, ParseLimits,
};
use crate::types::*;

/// Result of an inclusion check that got past input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpvOutcome {
    /// Proven; carries the decoded transaction.
    Mined(DecodedTransaction),
    /// No header recorded at the claimed height, or a different one.
    HeaderMismatch,
    /// The Merkle path does not lead to the header's root.
    RootMismatch,
}

impl SpvOutcome {
    pub fn is_mined(&self) -> bool {
        matches!(self, Self::Mined(_))
    }
}

/// SPV checks against a header store, with explicit decoding bounds.
#[derive(Debug, Clone, Copy)]
pub struct SpvVerifier<'a> {
    headers: &'a BlockHeaderStore,
    limits: &'a ParseLimits,
}

impl<'a> SpvVerifier<'a> {
    pub fn new(headers: &'a BlockHeaderStore, limits: &'a ParseLimits) -> Self {
        Self { headers, limits }
    }

    /// Legacy serialization only.
    pub fn was_tx_mined(&self, raw_tx: &[u8], block: &BlockRef, proof: &MerkleProof) -> Result<bool> {
        let tx = parse_tx_with_limits(raw_tx, self.limits)?;
        let leaf = sha256d(raw_tx);
        self.check(DecodedTransaction::Legacy(tx), leaf, block, proof)
            .map(|outcome| outcome.is_mined())
    }

    /// BIP144 serialization only.
    pub fn was_segwit_tx_mined(
        &self,
        raw_tx: &[u8],
        block: &BlockRef,
        proof: &MerkleProof,
    ) -> Result<bool> {
        let tx = parse_segwit_tx_with_limits(raw_tx, self.limits)?;
        let leaf = sha256d(&tx.serialize_without_witness());
        self.check(DecodedTransaction::Segwit(tx), leaf, block, proof)
            .map(|outcome| outcome.is_mined())
    }

    /// Either serialization, selected from the marker/flag bytes.
    pub fn verify_mined(&self, raw_tx: &[u8], block: &BlockRef, proof: &MerkleProof) -> Result<bool> {
        self.prove(raw_tx, block, proof).map(|outcome| outcome.is_mined())
    }

    /// Like [`Self::verify_mined`], keeping the decoded transaction and the failure reason.
    pub fn prove(&self, raw_tx: &[u8], block: &BlockRef, proof: &MerkleProof) -> Result<SpvOutcome> {
        if is_segwit_encoding(raw_tx) {
            let tx = parse_segwit_tx_with_limits(raw_tx, self.limits)?;
            let leaf = sha256d(&tx.serialize_without_witness());
            self.check(DecodedTransaction::Segwit(tx), leaf, block, proof)
        } else {
            let tx = parse_tx_with_limits(raw_tx, self.limits)?;
            let leaf = sha256d(raw_tx);
            self.check(DecodedTransaction::Legacy(tx), leaf, block, proof)
        }
    }

    fn check(
        &self,
        tx: DecodedTransaction,
        leaf: Hash,
        block: &BlockRef,
        proof: &MerkleProof,
    ) -> Result<SpvOutcome> {
        let hash = header_hash(&block.header)?;
        let header = parse_block_header(&block.header)?;
        let txid = hex::encode(reverse_hash(&leaf));

        if self.headers.get(block.height) != Some(&hash) {
            debug!(%txid, height = block.height, "header not recorded at claimed height");
            return Ok(SpvOutcome::HeaderMismatch);
        }

        if !verify_merkle_proof(&leaf, proof, &header.merkle_root, self.limits.max_merkle_depth)? {
            debug!(%txid, height = block.height, "merkle root mismatch");
            return Ok(SpvOutcome::RootMismatch);
        }

        debug!(%txid, height = block.height, "transaction inclusion proven");
        Ok(SpvOutcome::Mined(tx))
    }
}

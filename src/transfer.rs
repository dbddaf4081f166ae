//! Claimed BRC20 transfers, the packs that carry them, and their signed hash

use serde::{Deserialize, Serialize};

use crate::clarity::ClarityValue;
use crate::constants::MAX_TICK_LEN;
use crate::crypto::sha256;
use crate::error::{IndexerError, Result};
use crate::principal::Principal;
use crate::types::*;

/// The payload validators sign and the unit the ledger commits.
///
/// `from`/`to` are the scriptPubKeys of the sending and receiving Bitcoin outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Bitcoin txid, display byte order
    pub bitcoin_tx: Hash,
    pub output: u64,
    pub offset: u64,
    pub tick: String,
    pub from: ByteString,
    pub to: ByteString,
    pub amt: u128,
    pub from_bal: u128,
    pub to_bal: u128,
}

impl Transfer {
    pub fn key(&self) -> IndexKey {
        IndexKey {
            bitcoin_tx: self.bitcoin_tx,
            output: self.output,
            offset: self.offset,
        }
    }

    /// Stateless well-formedness checks.
    pub fn check(&self) -> Result<()> {
        if self.tick.is_empty() || self.tick.len() > MAX_TICK_LEN {
            return Err(IndexerError::InvalidTransfer(format!(
                "tick must be 1..={} bytes, got {}",
                MAX_TICK_LEN,
                self.tick.len()
            )));
        }
        Ok(())
    }

    pub fn to_clarity_value(&self) -> ClarityValue {
        ClarityValue::tuple([
            ("amt", ClarityValue::UInt(self.amt)),
            ("bitcoin-tx", ClarityValue::Buffer(self.bitcoin_tx.to_vec())),
            ("from", ClarityValue::Buffer(self.from.clone())),
            ("from-bal", ClarityValue::UInt(self.from_bal)),
            ("offset", ClarityValue::UInt(self.offset as u128)),
            ("output", ClarityValue::UInt(self.output as u128)),
            ("tick", ClarityValue::StringUtf8(self.tick.clone())),
            ("to", ClarityValue::Buffer(self.to.clone())),
            ("to-bal", ClarityValue::UInt(self.to_bal)),
        ])
    }
}

/// HashTransfer: 𝒯 → ℍ, SHA256 of the Clarity serialization.
///
/// This is the `tx_hash` signature packs refer to; the digest actually signed
/// adds domain separation, see [`crate::signature::signing_message`].
pub fn hash_transfer(transfer: &Transfer) -> Hash {
    sha256(&transfer.to_clarity_value().serialize())
}

/// One validator's attestation to a transfer hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePack {
    pub tx_hash: Hash,
    /// `r ‖ s ‖ recovery_id`
    pub signature: ByteString,
    pub signer: Principal,
}

/// Everything a relayer submits for one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPack {
    pub transfer: Transfer,
    pub raw_tx: ByteString,
    pub block: BlockRef,
    pub proof: MerkleProof,
    pub signatures: Vec<SignaturePack>,
}

/// Replay guard: one commit per Bitcoin-side event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexKey {
    pub bitcoin_tx: Hash,
    pub output: u64,
    pub offset: u64,
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", hex::encode(self.bitcoin_tx), self.output, self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub amt: u128,
    pub from: ByteString,
    pub to: ByteString,
    pub tick: String,
}

impl From<&Transfer> for IndexedRecord {
    fn from(t: &Transfer) -> Self {
        Self {
            amt: t.amt,
            from: t.from.clone(),
            to: t.to.clone(),
            tick: t.tick.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_transfer() -> Transfer {
        let mut bitcoin_tx = [0u8; 32];
        bitcoin_tx.copy_from_slice(
            &hex::decode("0724f2a8b3c7baf69ed90e0c23c909c350cad04c139c1fde56181f72cc35091c").unwrap(),
        );
        Transfer {
            bitcoin_tx,
            output: 0,
            offset: 0,
            tick: "yari".into(),
            from: hex::decode("5120279652ef2b9cca3cad2f1aee8ccf3bfd65f072ade8af837d6c1bdcc4ff197636").unwrap(),
            to: hex::decode("5120da2cee6145154c03c7507e4bbe574ffbea1b7efd154941c47a0f1cb406cd2409").unwrap(),
            amt: 5_000_000_000_000_000_000,
            from_bal: 15_000_000_000_000_000_000,
            to_bal: 24_000_000_000_000_000_000,
        }
    }

    #[test]
    fn test_hash_transfer_known_value() {
        assert_eq!(
            hex::encode(hash_transfer(&create_test_transfer())),
            "361780849133cdc391e344e43abd694b002aa15860bd1ed814225c74d9bf600b"
        );
    }

    #[test]
    fn test_every_field_is_bound() {
        let base = hash_transfer(&create_test_transfer());
        let mutations: [fn(&mut Transfer); 9] = [
            |t| t.amt += 1,
            |t| t.bitcoin_tx[31] ^= 1,
            |t| t.from.push(0),
            |t| t.from_bal += 1,
            |t| t.offset += 1,
            |t| t.output += 1,
            |t| t.tick = "yarI".into(),
            |t| t.to[2] ^= 1,
            |t| t.to_bal -= 1,
        ];
        for mutate in mutations {
            let mut t = create_test_transfer();
            mutate(&mut t);
            assert_ne!(hash_transfer(&t), base);
        }
    }

    #[test]
    fn test_tick_bounds() {
        let mut t = create_test_transfer();
        assert!(t.check().is_ok());
        t.tick = String::new();
        assert!(matches!(t.check(), Err(IndexerError::InvalidTransfer(_))));
        t.tick = "x".repeat(MAX_TICK_LEN + 1);
        assert!(t.check().is_err());
    }

    #[test]
    fn test_index_key() {
        let t = create_test_transfer();
        let key = t.key();
        assert_eq!(key.output, 0);
        assert!(key.to_string().starts_with("0724f2a8"));
        assert!(key.to_string().ends_with(":0:0"));
        assert_eq!(IndexedRecord::from(&t).amt, t.amt);
    }
}

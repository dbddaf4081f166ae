//! JSON wire format for relayer submissions
//!
//! Keys are kebab-case, byte strings are hex with an optional `0x` prefix,
//! and integers may be JSON numbers or decimal strings.

use serde::Deserialize;

use crate::error::{IndexerError, Result};
use crate::principal::Principal;
use crate::transfer::{SignaturePack, Transfer, TransferPack};
use crate::types::*;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireUint {
    Number(u64),
    Text(String),
}

impl WireUint {
    fn to_u128(&self, field: &str) -> Result<u128> {
        match self {
            Self::Number(n) => Ok(*n as u128),
            Self::Text(s) => s
                .parse()
                .map_err(|e| IndexerError::Serialization(format!("{}: {}", field, e))),
        }
    }

    fn to_u64(&self, field: &str) -> Result<u64> {
        u64::try_from(self.to_u128(field)?)
            .map_err(|_| IndexerError::Serialization(format!("{}: out of range", field)))
    }
}

impl Default for WireUint {
    fn default() -> Self {
        Self::Number(0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireTransfer {
    bitcoin_tx: String,
    output: WireUint,
    #[serde(default)]
    offset: WireUint,
    tick: String,
    from: String,
    to: String,
    amt: WireUint,
    from_bal: WireUint,
    to_bal: WireUint,
}

#[derive(Debug, Deserialize)]
struct WireBlock {
    header: String,
    height: WireUint,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireProof {
    hashes: Vec<String>,
    tree_depth: WireUint,
    tx_index: WireUint,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireSignature {
    tx_hash: String,
    signature: String,
    signer: Principal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WirePack {
    tx: WireTransfer,
    raw_tx: String,
    block: WireBlock,
    proof: WireProof,
    #[serde(default)]
    signature_packs: Vec<WireSignature>,
}

fn decode_hex(field: &str, s: &str) -> Result<ByteString> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(digits).map_err(|e| IndexerError::Serialization(format!("{}: {}", field, e)))
}

fn decode_hash(field: &str, s: &str) -> Result<Hash> {
    let bytes = decode_hex(field, s)?;
    bytes.as_slice().try_into().map_err(|_| {
        IndexerError::Serialization(format!("{}: expected 32 bytes, got {}", field, bytes.len()))
    })
}

impl WirePack {
    fn into_pack(self) -> Result<TransferPack> {
        let tx = self.tx;
        let transfer = Transfer {
            bitcoin_tx: decode_hash("bitcoin-tx", &tx.bitcoin_tx)?,
            output: tx.output.to_u64("output")?,
            offset: tx.offset.to_u64("offset")?,
            tick: tx.tick,
            from: decode_hex("from", &tx.from)?,
            to: decode_hex("to", &tx.to)?,
            amt: tx.amt.to_u128("amt")?,
            from_bal: tx.from_bal.to_u128("from-bal")?,
            to_bal: tx.to_bal.to_u128("to-bal")?,
        };

        let proof = MerkleProof {
            hashes: self
                .proof
                .hashes
                .iter()
                .map(|h| decode_hash("proof.hashes", h))
                .collect::<Result<_>>()?,
            tree_depth: u32::try_from(self.proof.tree_depth.to_u64("tree-depth")?)
                .map_err(|_| IndexerError::Serialization("tree-depth: out of range".into()))?,
            tx_index: self.proof.tx_index.to_u64("tx-index")?,
        };

        let signatures = self
            .signature_packs
            .into_iter()
            .map(|s| {
                Ok(SignaturePack {
                    tx_hash: decode_hash("tx-hash", &s.tx_hash)?,
                    signature: decode_hex("signature", &s.signature)?,
                    signer: s.signer,
                })
            })
            .collect::<Result<_>>()?;

        Ok(TransferPack {
            transfer,
            raw_tx: decode_hex("raw-tx", &self.raw_tx)?,
            block: BlockRef {
                header: decode_hex("block.header", &self.block.header)?,
                height: self.block.height.to_u64("height")?,
            },
            proof,
            signatures,
        })
    }
}

/// Decode a JSON array of transfer packs.
pub fn parse_packs(json: &str) -> Result<Vec<TransferPack>> {
    let wire: Vec<WirePack> =
        serde_json::from_str(json).map_err(|e| IndexerError::Serialization(e.to_string()))?;
    wire.into_iter().map(WirePack::into_pack).collect()
}

/// Decode a single JSON transfer pack.
pub fn parse_pack(json: &str) -> Result<TransferPack> {
    let wire: WirePack =
        serde_json::from_str(json).map_err(|e| IndexerError::Serialization(e.to_string()))?;
    wire.into_pack()
}

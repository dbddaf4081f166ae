//! Bitcoin transaction decoding, serialization and txid computation
//!
//! Wire layout (legacy):
//! `version:u32 | n_in:varint | (outpoint:36 | script_sig:varslice | sequence:u32)* |
//!  n_out:varint | (value:u64 | script_pubkey:varslice)* | lock_time:u32`
//!
//! The BIP144 layout lives in [`crate::segwit`].

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::crypto::{reverse_hash, sha256d};
use crate::cursor::{write_varint, write_varslice, Cursor};
use crate::error::ParseError;
use crate::segwit::{self, parse_segwit_tx_with_limits};
use crate::types::*;

/// Upper bounds applied while decoding untrusted transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseLimits {
    pub max_tx_size: usize,
    pub max_inputs: usize,
    pub max_outputs: usize,
    pub max_script_size: usize,
    pub max_witness_items: usize,
    pub max_witness_item_size: usize,
    pub max_merkle_depth: u32,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_tx_size: MAX_TX_SIZE,
            max_inputs: MAX_INPUTS,
            max_outputs: MAX_OUTPUTS,
            max_script_size: MAX_SCRIPT_SIZE,
            max_witness_items: MAX_WITNESS_ITEMS,
            max_witness_item_size: MAX_WITNESS_ITEM_SIZE,
            max_merkle_depth: MAX_MERKLE_DEPTH,
        }
    }
}

impl ParseLimits {
    pub(crate) fn check_size(&self, raw: &[u8]) -> Result<(), ParseError> {
        check_limit("transaction bytes", raw.len() as u64, self.max_tx_size)
    }
}

pub(crate) fn check_limit(what: &'static str, count: u64, limit: usize) -> Result<(), ParseError> {
    if count > limit as u64 {
        return Err(ParseError::LimitExceeded {
            what,
            count,
            limit: limit as u64,
        });
    }
    Ok(())
}

/// Either serialization, as detected from the marker/flag bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedTransaction {
    Legacy(Transaction),
    Segwit(SegwitTransaction),
}

impl DecodedTransaction {
    pub fn inputs(&self) -> &[TransactionInput] {
        match self {
            Self::Legacy(tx) => &tx.inputs,
            Self::Segwit(tx) => &tx.inputs,
        }
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        match self {
            Self::Legacy(tx) => &tx.outputs,
            Self::Segwit(tx) => &tx.outputs,
        }
    }

    /// Serialization without witness data (what the txid commits to).
    pub fn serialize_without_witness(&self) -> ByteString {
        match self {
            Self::Legacy(tx) => tx.serialize(),
            Self::Segwit(tx) => tx.serialize_without_witness(),
        }
    }

    pub fn is_segwit(&self) -> bool {
        matches!(self, Self::Segwit(_))
    }
}

impl Transaction {
    /// Serialize(tx) in legacy format.
    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::with_capacity(self.serialized_size_hint());
        out.extend_from_slice(&self.version.to_le_bytes());
        write_inputs(&mut out, &self.inputs);
        write_outputs(&mut out, &self.outputs);
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    fn serialized_size_hint(&self) -> usize {
        let ins: usize = self.inputs.iter().map(|i| 41 + i.script_sig.len()).sum();
        let outs: usize = self.outputs.iter().map(|o| 9 + o.script_pubkey.len()).sum();
        8 + 2 + ins + outs
    }
}

/// True when the bytes use the BIP144 layout: byte 4 is the `0x00` marker and
/// byte 5 a nonzero flag.
pub fn is_segwit_encoding(raw: &[u8]) -> bool {
    raw.len() > 5 && raw[4] == SEGWIT_MARKER && raw[5] != 0
}

/// ParseTx: 𝕊 → 𝒯𝒳 ∪ {⊥}, legacy serialization only, default limits.
pub fn parse_tx(raw: &[u8]) -> Result<Transaction, ParseError> {
    parse_tx_with_limits(raw, &ParseLimits::default())
}

pub fn parse_tx_with_limits(raw: &[u8], limits: &ParseLimits) -> Result<Transaction, ParseError> {
    limits.check_size(raw)?;
    let cursor = Cursor::new(raw);
    let (version, cursor) = cursor.read_u32()?;
    let (inputs, cursor) = read_inputs(cursor, limits)?;
    let (outputs, cursor) = read_outputs(cursor, limits)?;
    let (lock_time, cursor) = cursor.read_u32()?;
    ensure_consumed(cursor)?;

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

/// Decode either serialization, default limits.
pub fn decode_tx(raw: &[u8]) -> Result<DecodedTransaction, ParseError> {
    decode_tx_with_limits(raw, &ParseLimits::default())
}

pub fn decode_tx_with_limits(
    raw: &[u8],
    limits: &ParseLimits,
) -> Result<DecodedTransaction, ParseError> {
    if is_segwit_encoding(raw) {
        parse_segwit_tx_with_limits(raw, limits).map(DecodedTransaction::Segwit)
    } else {
        parse_tx_with_limits(raw, limits).map(DecodedTransaction::Legacy)
    }
}

/// SHA256d of the non-witness serialization, internal byte order (the Merkle leaf).
///
/// Witness bytes are stripped first, so segwit transactions hash to their
/// classic txid, never their wtxid.
pub fn tx_hash(raw: &[u8]) -> Result<Hash, ParseError> {
    tx_hash_with_limits(raw, &ParseLimits::default())
}

pub fn tx_hash_with_limits(raw: &[u8], limits: &ParseLimits) -> Result<Hash, ParseError> {
    if is_segwit_encoding(raw) {
        let tx = parse_segwit_tx_with_limits(raw, limits)?;
        Ok(sha256d(&tx.serialize_without_witness()))
    } else {
        parse_tx_with_limits(raw, limits)?;
        Ok(sha256d(raw))
    }
}

/// TxId(tx) = reverse(SHA256d(Serialize(tx ∖ witness))), display byte order.
pub fn txid(raw: &[u8]) -> Result<Hash, ParseError> {
    tx_hash(raw).map(|hash| reverse_hash(&hash))
}

/// WTxId(tx) = reverse(SHA256d(Serialize(tx))), display byte order.
///
/// Equal to [`txid`] for legacy transactions.
pub fn witness_txid(raw: &[u8]) -> Result<Hash, ParseError> {
    witness_txid_with_limits(raw, &ParseLimits::default())
}

pub fn witness_txid_with_limits(raw: &[u8], limits: &ParseLimits) -> Result<Hash, ParseError> {
    segwit::wtx_hash_with_limits(raw, limits).map(|hash| reverse_hash(&hash))
}

pub(crate) fn read_inputs<'a>(
    cursor: Cursor<'a>,
    limits: &ParseLimits,
) -> Result<(Vec<TransactionInput>, Cursor<'a>), ParseError> {
    let (count, mut cursor) = cursor.read_varint()?;
    if count == 0 {
        return Err(ParseError::NoInputs);
    }
    check_limit("input", count, limits.max_inputs)?;

    let mut inputs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (input, next) = read_input(cursor, limits)?;
        inputs.push(input);
        cursor = next;
    }
    Ok((inputs, cursor))
}

fn read_input<'a>(
    cursor: Cursor<'a>,
    limits: &ParseLimits,
) -> Result<(TransactionInput, Cursor<'a>), ParseError> {
    let (hash, cursor) = cursor.read_hash()?;
    let (index, cursor) = cursor.read_u32()?;
    let (script_sig, cursor) = cursor.read_varslice("scriptSig byte", limits.max_script_size)?;
    let (sequence, cursor) = cursor.read_u32()?;
    Ok((
        TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig: script_sig.to_vec(),
            sequence,
        },
        cursor,
    ))
}

pub(crate) fn read_outputs<'a>(
    cursor: Cursor<'a>,
    limits: &ParseLimits,
) -> Result<(Vec<TransactionOutput>, Cursor<'a>), ParseError> {
    let (count, mut cursor) = cursor.read_varint()?;
    check_limit("output", count, limits.max_outputs)?;

    let mut outputs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (value, next) = cursor.read_u64()?;
        let (script_pubkey, next) =
            next.read_varslice("scriptPubKey byte", limits.max_script_size)?;
        outputs.push(TransactionOutput {
            value,
            script_pubkey: script_pubkey.to_vec(),
        });
        cursor = next;
    }
    Ok((outputs, cursor))
}

pub(crate) fn ensure_consumed(cursor: Cursor<'_>) -> Result<(), ParseError> {
    if !cursor.is_at_end() {
        return Err(ParseError::TrailingBytes(cursor.remaining()));
    }
    Ok(())
}

pub(crate) fn write_inputs(out: &mut Vec<u8>, inputs: &[TransactionInput]) {
    write_varint(out, inputs.len() as u64);
    for input in inputs {
        out.extend_from_slice(&input.prevout.hash);
        out.extend_from_slice(&input.prevout.index.to_le_bytes());
        write_varslice(out, &input.script_sig);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }
}

pub(crate) fn write_outputs(out: &mut Vec<u8>, outputs: &[TransactionOutput]) {
    write_varint(out, outputs.len() as u64);
    for output in outputs {
        out.extend_from_slice(&output.value.to_le_bytes());
        write_varslice(out, &output.script_pubkey);
    }
}

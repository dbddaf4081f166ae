//! Segregated Witness (BIP144) transaction serialization
//!
//! `version | marker=0x00 | flag!=0 | inputs | outputs | witness stack per input | lock_time`

use crate::constants::SEGWIT_MARKER;
use crate::crypto::sha256d;
use crate::cursor::{write_varint, write_varslice, Cursor};
use crate::error::ParseError;
use crate::transaction::{
    check_limit, ensure_consumed, is_segwit_encoding, parse_tx_with_limits, read_inputs,
    read_outputs, write_inputs, write_outputs, ParseLimits,
};
use crate::types::*;

impl SegwitTransaction {
    /// Serialize(tx) including marker, flag and witnesses.
    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.push(self.marker);
        out.push(self.flag);
        write_inputs(&mut out, &self.inputs);
        write_outputs(&mut out, &self.outputs);
        for witness in &self.witnesses {
            write_varint(&mut out, witness.len() as u64);
            for item in witness {
                write_varslice(&mut out, item);
            }
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    /// Serialize(tx ∖ witness): the legacy layout the txid commits to.
    pub fn serialize_without_witness(&self) -> ByteString {
        self.base().serialize()
    }

    /// Total witness bytes, excluding stack-item length prefixes.
    pub fn witness_size(&self) -> usize {
        self.witnesses.iter().flatten().map(|item| item.len()).sum()
    }
}

/// ParseSegwitTx: 𝕊 → 𝒯𝒳_w ∪ {⊥}, default limits.
pub fn parse_segwit_tx(raw: &[u8]) -> Result<SegwitTransaction, ParseError> {
    parse_segwit_tx_with_limits(raw, &ParseLimits::default())
}

pub fn parse_segwit_tx_with_limits(
    raw: &[u8],
    limits: &ParseLimits,
) -> Result<SegwitTransaction, ParseError> {
    limits.check_size(raw)?;
    let cursor = Cursor::new(raw);
    let (version, cursor) = cursor.read_u32()?;

    let (marker, cursor) = cursor.read_u8()?;
    if marker != SEGWIT_MARKER {
        return Err(ParseError::MissingSegwitMarker);
    }
    let (flag, cursor) = cursor.read_u8()?;
    if flag == 0 {
        return Err(ParseError::InvalidSegwitFlag(flag));
    }

    let (inputs, cursor) = read_inputs(cursor, limits)?;
    let (outputs, cursor) = read_outputs(cursor, limits)?;
    let (witnesses, cursor) = read_witnesses(cursor, inputs.len(), limits)?;
    let (lock_time, cursor) = cursor.read_u32()?;
    ensure_consumed(cursor)?;

    // A segwit serialization with nothing in any stack is indistinguishable in
    // meaning from legacy and must not be used.
    if witnesses.iter().all(|w| w.is_empty()) {
        return Err(ParseError::EmptyWitnesses);
    }

    Ok(SegwitTransaction {
        version,
        marker,
        flag,
        inputs,
        outputs,
        witnesses,
        lock_time,
    })
}

fn read_witnesses<'a>(
    mut cursor: Cursor<'a>,
    input_count: usize,
    limits: &ParseLimits,
) -> Result<(Vec<Witness>, Cursor<'a>), ParseError> {
    let mut witnesses = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        let (items, next) = cursor.read_varint()?;
        check_limit("witness item", items, limits.max_witness_items)?;
        cursor = next;

        let mut stack = Vec::with_capacity(items as usize);
        for _ in 0..items {
            let (item, next) = cursor.read_varslice("witness byte", limits.max_witness_item_size)?;
            stack.push(item.to_vec());
            cursor = next;
        }
        witnesses.push(stack);
    }
    Ok((witnesses, cursor))
}

/// SHA256d of the full serialization, internal byte order.
pub fn wtx_hash(raw: &[u8]) -> Result<Hash, ParseError> {
    wtx_hash_with_limits(raw, &ParseLimits::default())
}

pub fn wtx_hash_with_limits(raw: &[u8], limits: &ParseLimits) -> Result<Hash, ParseError> {
    if is_segwit_encoding(raw) {
        parse_segwit_tx_with_limits(raw, limits)?;
    } else {
        parse_tx_with_limits(raw, limits)?;
    }
    Ok(sha256d(raw))
}

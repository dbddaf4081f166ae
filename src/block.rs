//! Block header decoding and the append-only header-hash store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::BLOCK_HEADER_SIZE;
use crate::crypto::{reverse_hash, sha256d};
use crate::cursor::Cursor;
use crate::error::{IndexerError, ParseError, Result};
use crate::types::*;

/// ParseHeader: 𝕊₈₀ → ℋ ∪ {⊥}
///
/// `version:u32 | parent:32 | merkle_root:32 | timestamp:u32 | bits:u32 | nonce:u32`
pub fn parse_block_header(raw: &[u8]) -> std::result::Result<BlockHeader, ParseError> {
    if raw.len() != BLOCK_HEADER_SIZE {
        return Err(ParseError::InvalidHeaderLength(raw.len()));
    }
    let cursor = Cursor::new(raw);
    let (version, cursor) = cursor.read_u32()?;
    let (parent, cursor) = cursor.read_hash()?;
    let (merkle_root, cursor) = cursor.read_hash()?;
    let (timestamp, cursor) = cursor.read_u32()?;
    let (bits, cursor) = cursor.read_u32()?;
    let (nonce, _) = cursor.read_u32()?;

    Ok(BlockHeader {
        version,
        parent,
        merkle_root,
        timestamp,
        bits,
        nonce,
    })
}

impl BlockHeader {
    pub fn serialize(&self) -> ByteString {
        let mut data = Vec::with_capacity(BLOCK_HEADER_SIZE);
        data.extend_from_slice(&self.version.to_le_bytes());
        data.extend_from_slice(&self.parent);
        data.extend_from_slice(&self.merkle_root);
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        data.extend_from_slice(&self.bits.to_le_bytes());
        data.extend_from_slice(&self.nonce.to_le_bytes());
        data
    }
}

/// SHA256d(header), internal byte order. This is the value the store records.
pub fn header_hash(raw: &[u8]) -> std::result::Result<Hash, ParseError> {
    if raw.len() != BLOCK_HEADER_SIZE {
        return Err(ParseError::InvalidHeaderLength(raw.len()));
    }
    Ok(sha256d(raw))
}

/// Block hash in display byte order, as shown by block explorers.
pub fn block_hash(raw: &[u8]) -> std::result::Result<Hash, ParseError> {
    header_hash(raw).map(|hash| reverse_hash(&hash))
}

/// Height → header hash, written once per height by the oracle and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderStore {
    hashes: BTreeMap<Natural, Hash>,
}

impl BlockHeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the attested header hash (internal byte order) for `height`.
    pub fn record(&mut self, height: Natural, hash: Hash) -> Result<()> {
        if self.hashes.contains_key(&height) {
            return Err(IndexerError::HeaderAlreadyRecorded(height));
        }
        self.hashes.insert(height, hash);
        debug!(height, hash = %hex::encode(reverse_hash(&hash)), "recorded burnchain header");
        Ok(())
    }

    pub fn get(&self, height: Natural) -> Option<&Hash> {
        self.hashes.get(&height)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Highest recorded height.
    pub fn tip(&self) -> Option<Natural> {
        self.hashes.keys().next_back().copied()
    }
}

/// VerifyHeader: true iff SHA256d(raw) is the hash recorded at `height`.
///
/// An unknown height is `Ok(false)`; only a malformed header is an error.
pub fn verify_block_header(
    store: &BlockHeaderStore,
    raw: &[u8],
    height: Natural,
) -> std::result::Result<bool, ParseError> {
    let hash = header_hash(raw)?;
    Ok(store.get(height) == Some(&hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mainnet block 789219
    const HEADER: &str = "000099247386511af242d00e8ee3773996d90c293e0b8e3974ba0500000000000000000050ae942b1b7052581eff46d43d26d4133cc3ce9a7be1cbb81318c27b54cf27099d9f5c6401dd051722911240";

    #[test]
    fn test_parse_block_header() {
        let raw = hex::decode(HEADER).unwrap();
        let header = parse_block_header(&raw).unwrap();

        assert_eq!(header.version, 614006784);
        assert_eq!(
            hex::encode(header.parent),
            "7386511af242d00e8ee3773996d90c293e0b8e3974ba05000000000000000000"
        );
        assert_eq!(
            hex::encode(header.merkle_root),
            "50ae942b1b7052581eff46d43d26d4133cc3ce9a7be1cbb81318c27b54cf2709"
        );
        assert_eq!(header.timestamp, 1683791773);
        assert_eq!(header.bits, 0x1705dd01);
        assert_eq!(header.nonce, 1074958626);
        assert_eq!(header.serialize(), raw);
    }

    #[test]
    fn test_block_hash_display_order() {
        let raw = hex::decode(HEADER).unwrap();
        assert_eq!(
            hex::encode(block_hash(&raw).unwrap()),
            "00000000000000000000347b820d9462514312e8a11bf09b3cd4bfc794b44ffb"
        );
        assert_eq!(header_hash(&raw).unwrap(), reverse_hash(&block_hash(&raw).unwrap()));
    }

    #[test]
    fn test_header_wrong_length() {
        assert_eq!(
            parse_block_header(&[0u8; 79]).unwrap_err(),
            ParseError::InvalidHeaderLength(79)
        );
        assert!(header_hash(&[0u8; 81]).is_err());
    }

    #[test]
    fn test_store_append_only() {
        let mut store = BlockHeaderStore::new();
        assert!(store.is_empty());
        store.record(100, [1; 32]).unwrap();
        assert_eq!(
            store.record(100, [2; 32]).unwrap_err(),
            IndexerError::HeaderAlreadyRecorded(100)
        );
        assert_eq!(store.get(100), Some(&[1; 32]));
        store.record(90, [3; 32]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.tip(), Some(100));
    }

    #[test]
    fn test_verify_block_header() {
        let raw = hex::decode(HEADER).unwrap();
        let mut store = BlockHeaderStore::new();
        assert!(!verify_block_header(&store, &raw, 789219).unwrap());

        store.record(789219, header_hash(&raw).unwrap()).unwrap();
        assert!(verify_block_header(&store, &raw, 789219).unwrap());
        assert!(!verify_block_header(&store, &raw, 789220).unwrap());

        let mut tampered = raw.clone();
        tampered[79] ^= 0x01;
        assert!(!verify_block_header(&store, &tampered, 789219).unwrap());
    }
}

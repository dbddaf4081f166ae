//! Hash primitives shared by the codec, SPV and signing layers

use bitcoin_hashes::{sha256d as bitcoin_sha256d, Hash as BitcoinHash};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::types::Hash;

/// SHA256(x)
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// SHA256(SHA256(x)), in natural (internal) byte order
pub fn sha256d(data: &[u8]) -> Hash {
    bitcoin_sha256d::Hash::hash(data).into_inner()
}

/// RIPEMD160(SHA256(x))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha256_hash = Sha256::digest(data);
    let ripemd160_hash = Ripemd160::digest(&sha256_hash);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd160_hash);
    out
}

/// Convert between internal and display byte order.
pub fn reverse_hash(hash: &Hash) -> Hash {
    let mut out = *hash;
    out.reverse();
    out
}

//! Merkle inclusion proofs over Bitcoin's transaction tree

use tracing::debug;

use crate::crypto::sha256d;
use crate::error::{IndexerError, Result};
use crate::types::*;

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left);
    combined[32..].copy_from_slice(right);
    sha256d(&combined)
}

/// Check the shape invariants of a proof against a depth limit.
pub fn check_proof_shape(proof: &MerkleProof, max_depth: u32) -> Result<()> {
    if proof.tree_depth > max_depth {
        return Err(IndexerError::MalformedProof(format!(
            "tree depth {} exceeds limit {}",
            proof.tree_depth, max_depth
        )));
    }
    if proof.hashes.len() != proof.tree_depth as usize {
        return Err(IndexerError::MalformedProof(format!(
            "{} hashes for tree depth {}",
            proof.hashes.len(),
            proof.tree_depth
        )));
    }
    if proof.tree_depth < 64 && proof.tx_index >> proof.tree_depth != 0 {
        return Err(IndexerError::MalformedProof(format!(
            "tx index {} does not fit tree depth {}",
            proof.tx_index, proof.tree_depth
        )));
    }
    Ok(())
}

/// Fold the sibling path from `leaf` up to a root.
///
/// At each level an even index means the running hash is the left child,
/// an odd index means it is the right child. Hashes are internal byte order.
pub fn compute_merkle_root(leaf: &Hash, proof: &MerkleProof) -> Hash {
    let mut current = *leaf;
    let mut index = proof.tx_index;
    for sibling in &proof.hashes {
        current = if index & 1 == 0 {
            hash_pair(&current, sibling)
        } else {
            hash_pair(sibling, &current)
        };
        index >>= 1;
    }
    current
}

/// VerifyMerkleProof: ℍ × 𝒫 × ℍ → {true, false}
pub fn verify_merkle_proof(
    leaf: &Hash,
    proof: &MerkleProof,
    expected_root: &Hash,
    max_depth: u32,
) -> Result<bool> {
    check_proof_shape(proof, max_depth)?;
    let root = compute_merkle_root(leaf, proof);
    let verified = root == *expected_root;
    debug!(
        tx_index = proof.tx_index,
        depth = proof.tree_depth,
        verified,
        "merkle proof checked"
    );
    Ok(verified)
}

/// Build every level of the tree, leaves first. An odd node is paired with itself.
fn merkle_levels(leaves: &[Hash]) -> Vec<Vec<Hash>> {
    let mut levels = vec![leaves.to_vec()];
    while levels.last().map_or(false, |level| level.len() > 1) {
        let level = &levels[levels.len() - 1];
        let next: Vec<Hash> = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect();
        levels.push(next);
    }
    levels
}

/// Merkle root of a block's txids (internal byte order). `None` for an empty block.
pub fn merkle_root(leaves: &[Hash]) -> Option<Hash> {
    if leaves.is_empty() {
        return None;
    }
    merkle_levels(leaves).last().and_then(|level| level.first().copied())
}

/// Sibling path for `leaves[index]`, in the shape [`verify_merkle_proof`] consumes.
pub fn merkle_path(leaves: &[Hash], index: usize) -> Option<MerkleProof> {
    if index >= leaves.len() {
        return None;
    }
    let levels = merkle_levels(leaves);
    let mut hashes = Vec::with_capacity(levels.len() - 1);
    let mut position = index;
    for level in &levels[..levels.len() - 1] {
        let sibling = position ^ 1;
        hashes.push(*level.get(sibling).unwrap_or(&level[position]));
        position >>= 1;
    }
    Some(MerkleProof {
        tree_depth: hashes.len() as u32,
        hashes,
        tx_index: index as u64,
    })
}

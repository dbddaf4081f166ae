//! Structured-data signatures and the validator quorum
//!
//! Digest(t) = SHA256("SIP018" ‖ DomainHash ‖ HashTransfer(t))
//! Quorate(h) ⟺ |{v ∈ Validators : v attested h}| ≥ required

use std::collections::{BTreeMap, BTreeSet, HashMap};

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clarity::ClarityValue;
use crate::constants::*;
use crate::crypto::sha256;
use crate::error::{IndexerError, Result};
use crate::principal::Principal;
use crate::transfer::SignaturePack;
use crate::types::Hash;

/// Binds signatures to one deployment on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u32,
}

impl Default for StructuredDomain {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOMAIN_NAME.to_string(),
            version: DEFAULT_DOMAIN_VERSION.to_string(),
            chain_id: CHAIN_ID_MAINNET,
        }
    }
}

impl StructuredDomain {
    pub fn domain_hash(&self) -> Hash {
        let tuple = ClarityValue::tuple([
            ("name", ClarityValue::StringAscii(self.name.clone())),
            ("version", ClarityValue::StringAscii(self.version.clone())),
            ("chain-id", ClarityValue::UInt(self.chain_id as u128)),
        ]);
        sha256(&tuple.serialize())
    }
}

/// The 32-byte digest validators sign for `tx_hash`.
pub fn signing_message(domain_hash: &Hash, tx_hash: &Hash) -> Hash {
    let mut data = Vec::with_capacity(STRUCTURED_DATA_PREFIX.len() + 64);
    data.extend_from_slice(&STRUCTURED_DATA_PREFIX);
    data.extend_from_slice(domain_hash);
    data.extend_from_slice(tx_hash);
    sha256(&data)
}

/// Recover the public key behind a 65-byte `r ‖ s ‖ recovery_id` signature.
pub fn recover_signer(message: &Hash, signature: &[u8]) -> Result<PublicKey> {
    if signature.len() != SIGNATURE_SIZE {
        return Err(IndexerError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_SIZE,
            signature.len()
        )));
    }
    let recovery_id = RecoveryId::from_i32(signature[64] as i32)
        .map_err(|e| IndexerError::InvalidSignature(format!("recovery id: {}", e)))?;
    let sig = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|e| IndexerError::InvalidSignature(e.to_string()))?;

    let secp = Secp256k1::verification_only();
    let msg = Message::from_digest(*message);
    secp.recover_ecdsa(&msg, &sig)
        .map_err(|e| IndexerError::InvalidSignature(e.to_string()))
}

/// Registered validators, the quorum threshold, and who has attested to what.
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    validators: BTreeMap<Principal, PublicKey>,
    required: u32,
    attestations: HashMap<Hash, BTreeSet<Principal>>,
    domain_hash: Hash,
}

impl ValidatorRegistry {
    pub fn new(domain: &StructuredDomain, required: u32) -> Result<Self> {
        if required == 0 {
            return Err(IndexerError::InvalidThreshold(required));
        }
        Ok(Self {
            validators: BTreeMap::new(),
            required,
            attestations: HashMap::new(),
            domain_hash: domain.domain_hash(),
        })
    }

    pub fn domain_hash(&self) -> &Hash {
        &self.domain_hash
    }

    pub fn required_validators(&self) -> u32 {
        self.required
    }

    pub fn set_required_validators(&mut self, required: u32) -> Result<()> {
        if required == 0 {
            return Err(IndexerError::InvalidThreshold(required));
        }
        self.required = required;
        info!(required, "validator threshold updated");
        Ok(())
    }

    pub fn add_validator(&mut self, public_key: PublicKey, identity: Principal) -> Result<()> {
        if self.validators.contains_key(&identity) {
            return Err(IndexerError::ValidatorExists(identity.to_string()));
        }
        self.validators.insert(identity, public_key);
        info!(validator = %identity, count = self.validators.len(), "validator added");
        Ok(())
    }

    /// Past attestations by the removed validator stay counted.
    pub fn remove_validator(&mut self, identity: &Principal) -> Result<()> {
        if self.validators.remove(identity).is_none() {
            return Err(IndexerError::UnknownValidator(identity.to_string()));
        }
        info!(validator = %identity, count = self.validators.len(), "validator removed");
        Ok(())
    }

    pub fn get_validator(&self, identity: &Principal) -> Option<&PublicKey> {
        self.validators.get(identity)
    }

    pub fn get_validator_or_fail(&self, identity: &Principal) -> Result<&PublicKey> {
        self.get_validator(identity)
            .ok_or_else(|| IndexerError::UnknownValidator(identity.to_string()))
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Validate: ℍ × 𝒮 → {true} ∪ Error
    ///
    /// Checks `pack` attests `tx_hash`, comes from the registered key of
    /// `pack.signer`, and that signer has not attested `tx_hash` before.
    /// Read-only; see [`Self::record_attestations`].
    pub fn validate(&self, tx_hash: &Hash, pack: &SignaturePack) -> Result<bool> {
        if pack.tx_hash != *tx_hash {
            return Err(IndexerError::SignedHashMismatch {
                signed: hex::encode(pack.tx_hash),
                expected: hex::encode(tx_hash),
            });
        }
        let registered = self
            .validators
            .get(&pack.signer)
            .ok_or_else(|| IndexerError::UnauthorizedSigner(pack.signer.to_string()))?;

        let message = signing_message(&self.domain_hash, tx_hash);
        let recovered = recover_signer(&message, &pack.signature)?;
        if recovered != *registered {
            return Err(IndexerError::UnauthorizedSigner(format!(
                "{} signed by {}",
                pack.signer, recovered
            )));
        }

        if self.has_attested(tx_hash, &pack.signer) {
            return Err(IndexerError::DuplicateAttestation(pack.signer.to_string()));
        }
        Ok(true)
    }

    /// Validate every pack and return the distinct new signers. Nothing is recorded.
    ///
    /// A validator appearing twice in `packs` is a [`IndexerError::DuplicateAttestation`].
    pub fn collect_attestations(
        &self,
        tx_hash: &Hash,
        packs: &[SignaturePack],
    ) -> Result<BTreeSet<Principal>> {
        let mut signers = BTreeSet::new();
        for pack in packs {
            self.validate(tx_hash, pack)?;
            if !signers.insert(pack.signer) {
                return Err(IndexerError::DuplicateAttestation(pack.signer.to_string()));
            }
        }
        Ok(signers)
    }

    /// Fail with [`IndexerError::QuorumNotReached`] unless `new_signers` plus
    /// prior attestations meet the threshold.
    pub fn check_quorum(&self, tx_hash: &Hash, new_signers: &BTreeSet<Principal>) -> Result<()> {
        let have = self.count_attestations(tx_hash) + new_signers.len();
        if have < self.required as usize {
            return Err(IndexerError::QuorumNotReached {
                have,
                required: self.required,
            });
        }
        Ok(())
    }

    pub fn count_attestations(&self, tx_hash: &Hash) -> usize {
        self.attestations.get(tx_hash).map_or(0, BTreeSet::len)
    }

    pub fn has_attested(&self, tx_hash: &Hash, identity: &Principal) -> bool {
        self.attestations
            .get(tx_hash)
            .map_or(false, |signers| signers.contains(identity))
    }

    pub(crate) fn record_attestations(&mut self, tx_hash: Hash, signers: BTreeSet<Principal>) {
        self.attestations.entry(tx_hash).or_default().extend(signers);
    }
}

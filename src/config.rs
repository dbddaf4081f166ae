//! Indexer configuration, loaded from TOML

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_BATCH_SIZE, MAX_SIGNATURES_PER_PACK};
use crate::error::{IndexerError, Result};
use crate::principal::Principal;
use crate::signature::StructuredDomain;
use crate::transaction::ParseLimits;

/// What a failing pack does to the rest of its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Each pack commits or fails on its own; failures are reported per pack.
    #[default]
    Isolated,
    /// The first failing pack rolls back the whole batch.
    Atomic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Initial contract owner.
    pub owner: Principal,

    #[serde(default = "default_values::required_validators")]
    pub required_validators: u32,

    #[serde(default)]
    pub batch_mode: BatchMode,

    #[serde(default = "default_values::max_batch_size")]
    pub max_batch_size: usize,

    #[serde(default = "default_values::max_signatures_per_pack")]
    pub max_signatures_per_pack: usize,

    /// Structured-data domain signatures are bound to.
    #[serde(default)]
    pub domain: StructuredDomain,

    #[serde(default)]
    pub limits: ParseLimits,
}

mod default_values {
    use super::*;

    pub(super) fn required_validators() -> u32 {
        1
    }

    pub(super) fn max_batch_size() -> usize {
        MAX_BATCH_SIZE
    }

    pub(super) fn max_signatures_per_pack() -> usize {
        MAX_SIGNATURES_PER_PACK
    }
}

impl IndexerConfig {
    /// Defaults for everything but the owner.
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            required_validators: default_values::required_validators(),
            batch_mode: BatchMode::default(),
            max_batch_size: default_values::max_batch_size(),
            max_signatures_per_pack: default_values::max_signatures_per_pack(),
            domain: StructuredDomain::default(),
            limits: ParseLimits::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| IndexerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| IndexerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.required_validators == 0 {
            return Err(IndexerError::InvalidThreshold(0));
        }
        let sizes = [
            ("max_batch_size", self.max_batch_size),
            ("max_signatures_per_pack", self.max_signatures_per_pack),
            ("limits.max_tx_size", self.limits.max_tx_size),
            ("limits.max_inputs", self.limits.max_inputs),
            ("limits.max_outputs", self.limits.max_outputs),
            ("limits.max_script_size", self.limits.max_script_size),
            ("limits.max_witness_items", self.limits.max_witness_items),
            ("limits.max_witness_item_size", self.limits.max_witness_item_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, value)| *value == 0) {
            return Err(IndexerError::Config(format!("{} must be nonzero", name)));
        }
        if self.limits.max_merkle_depth == 0 {
            return Err(IndexerError::Config("limits.max_merkle_depth must be nonzero".into()));
        }
        if (self.required_validators as usize) > self.max_signatures_per_pack {
            return Err(IndexerError::Config(format!(
                "required_validators {} can never be met with max_signatures_per_pack {}",
                self.required_validators, self.max_signatures_per_pack
            )));
        }
        Ok(())
    }
}

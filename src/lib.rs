//! # BRC20 Bridge Indexer
//!
//! Verification engine for a Bitcoin to Stacks BRC20 bridge: a token ledger that is
//! updated only after a transfer is proven mined on Bitcoin and attested by a quorum
//! of registered validators.
//!
//! ## Architecture
//!
//! Leaves first:
//! - [`cursor`]: position-tracking reader over untrusted bytes
//! - [`transaction`], [`segwit`]: legacy and BIP144 transaction codec, txid / wtxid
//! - [`block`]: header decoding and the append-only header-hash store
//! - [`merkle`], [`spv`]: inclusion proofs against recorded headers
//! - [`clarity`], [`principal`], [`signature`]: signed payloads, identities and the validator quorum
//! - [`ledger`]: the exactly-once state machine combining all of the above
//!
//! ## Design Principles
//!
//! 1. **Check, then commit**: a rejected pack never mutates state
//! 2. **Bounded work**: every count read from the wire is limited before allocation
//! 3. **Exact version pinning**: cryptographic dependencies are pinned to exact versions
//! 4. **Single writer**: one ledger, mutated by one batch at a time
//!
//! ## Usage
//!
//! ```rust
//! use brc20_bridge_indexer::{IndexerConfig, IndexerLedger};
//!
//! let config = IndexerConfig::from_toml_str(
//!     r#"
//!     owner = "SP1B0DHZV858RCBC8WG1YN5W9R491MJK88QPPC217"
//!     required_validators = 2
//!     "#,
//! )
//! .unwrap();
//! let ledger = IndexerLedger::new(&config).unwrap();
//!
//! assert_eq!(ledger.required_validators(), 2);
//! assert_eq!(ledger.validator_count(), 0);
//! assert!(!ledger.is_paused());
//! ```

pub mod types;
pub mod constants;
pub mod cursor;
pub mod crypto;
pub mod transaction;
pub mod segwit;
pub mod block;
pub mod merkle;
pub mod spv;
pub mod clarity;
pub mod principal;
pub mod signature;
pub mod transfer;
pub mod ledger;
pub mod relay;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{IndexerError, ParseError, Result};
pub use config::{BatchMode, IndexerConfig};
pub use ledger::{BatchReport, IndexerLedger, SharedLedger};
pub use principal::Principal;
pub use signature::{StructuredDomain, ValidatorRegistry};
pub use spv::SpvVerifier;
pub use transaction::{
    decode_tx, parse_tx, txid, witness_txid, witness_txid_with_limits, DecodedTransaction,
    ParseLimits,
};
pub use segwit::parse_segwit_tx;
pub use transfer::{hash_transfer, IndexKey, IndexedRecord, SignaturePack, Transfer, TransferPack};

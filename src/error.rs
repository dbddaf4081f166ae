//! Error types for transaction decoding, proof verification and indexing

use thiserror::Error;

/// Malformed Bitcoin wire data. Always fatal to the pack that carried it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input at offset {offset}: {needed} more bytes needed")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("non-canonical compact size at offset {offset}")]
    NonCanonicalVarint { offset: usize },

    #[error("transaction has no inputs")]
    NoInputs,

    #[error("missing segwit marker")]
    MissingSegwitMarker,

    #[error("invalid segwit flag {0:#04x}")]
    InvalidSegwitFlag(u8),

    #[error("segwit serialization carries no witness data")]
    EmptyWitnesses,

    #[error("{what} count {count} exceeds limit {limit}")]
    LimitExceeded {
        what: &'static str,
        count: u64,
        limit: u64,
    },

    #[error("{0} trailing bytes after lock time")]
    TrailingBytes(usize),

    #[error("block header must be 80 bytes, got {0}")]
    InvalidHeaderLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexerError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Proof mismatch: {0}")]
    ProofMismatch(String),

    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Unauthorized signer: {0}")]
    UnauthorizedSigner(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signature pack covers {signed} but transfer hashes to {expected}")]
    SignedHashMismatch { signed: String, expected: String },

    #[error("Duplicate attestation by {0}")]
    DuplicateAttestation(String),

    #[error("Quorum not reached: {have} of {required} attestations")]
    QuorumNotReached { have: usize, required: u32 },

    #[error("Already indexed: {0}")]
    AlreadyIndexed(String),

    #[error("Not indexed: {0}")]
    NotIndexed(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Balance overflow: {0}")]
    BalanceOverflow(String),

    #[error("Not an approved relayer: {0}")]
    NotApprovedRelayer(String),

    #[error("Indexer is paused")]
    Paused,

    #[error("Admin only: {0}")]
    AdminOnly(String),

    #[error("Validator already registered: {0}")]
    ValidatorExists(String),

    #[error("Unknown validator: {0}")]
    UnknownValidator(String),

    #[error("Invalid validator threshold: {0}")]
    InvalidThreshold(u32),

    #[error("Header already recorded at height {0}")]
    HeaderAlreadyRecorded(u64),

    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("Batch of {size} packs exceeds limit {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Batch rejected at pack {index}: {source}")]
    BatchRejected {
        index: usize,
        source: Box<IndexerError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, IndexerError>;

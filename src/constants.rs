//! Wire-format and protocol constants

/// Maximum raw transaction size accepted by the decoder: 1MB
pub const MAX_TX_SIZE: usize = 1_000_000;

/// Maximum number of inputs per transaction
pub const MAX_INPUTS: usize = 1000;

/// Maximum number of outputs per transaction
pub const MAX_OUTPUTS: usize = 1000;

/// Maximum scriptSig / scriptPubKey length
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum witness stack items for a single input
pub const MAX_WITNESS_ITEMS: usize = 500;

/// Maximum size of one witness stack item (inscription envelopes are large)
pub const MAX_WITNESS_ITEM_SIZE: usize = 400_000;

/// Maximum Merkle proof depth
pub const MAX_MERKLE_DEPTH: u32 = 24;

/// Serialized block header size
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Compact ECDSA signature plus recovery id
pub const SIGNATURE_SIZE: usize = 65;

/// Compressed secp256k1 public key size
pub const PUBKEY_SIZE: usize = 33;

/// Maximum packs in one `index_many` submission
pub const MAX_BATCH_SIZE: usize = 200;

/// Maximum signature packs attached to one transfer
pub const MAX_SIGNATURES_PER_PACK: usize = 32;

/// Maximum tick length in bytes
pub const MAX_TICK_LEN: usize = 32;

/// Segwit marker byte (BIP144)
pub const SEGWIT_MARKER: u8 = 0x00;

/// SIP-018 structured data prefix: "SIP018"
pub const STRUCTURED_DATA_PREFIX: [u8; 6] = [0x53, 0x49, 0x50, 0x30, 0x31, 0x38];

/// Default signing domain name
pub const DEFAULT_DOMAIN_NAME: &str = "ALEX BRC20 Indexer";

/// Default signing domain version
pub const DEFAULT_DOMAIN_VERSION: &str = "0.0.1";

/// Stacks mainnet chain id
pub const CHAIN_ID_MAINNET: u32 = 0x0000_0001;

/// Stacks testnet / mocknet chain id
pub const CHAIN_ID_TESTNET: u32 = 0x8000_0000;

/// Single-sig principal version byte on mainnet ('P')
pub const ADDRESS_VERSION_MAINNET_SINGLESIG: u8 = 22;

/// Single-sig principal version byte on testnet ('T')
pub const ADDRESS_VERSION_TESTNET_SINGLESIG: u8 = 26;

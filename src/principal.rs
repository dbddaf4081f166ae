//! Stacks standard principals and their c32check address form
//!
//! Address(v, h) = "S" ‖ C32[v] ‖ c32(h ‖ SHA256d(v ‖ h)[0..4])

use std::fmt;
use std::str::FromStr;

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::crypto::{hash160, sha256d};
use crate::error::IndexerError;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const CHECKSUM_LEN: usize = 4;

/// A single-signature identity: address version plus HASH160 of the public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal {
    version: u8,
    hash160: [u8; 20],
}

impl Principal {
    pub fn new(version: u8, hash160: [u8; 20]) -> Result<Self, IndexerError> {
        if version >= 32 {
            return Err(IndexerError::InvalidPrincipal(format!(
                "address version {} out of range",
                version
            )));
        }
        Ok(Self { version, hash160 })
    }

    /// Identity of the holder of `public_key` under address `version`.
    pub fn from_public_key(version: u8, public_key: &PublicKey) -> Result<Self, IndexerError> {
        Self::new(version, hash160(&public_key.serialize()))
    }

    /// Same as [`Self::from_public_key`] for a 33-byte compressed encoding.
    pub fn from_public_key_bytes(version: u8, public_key: &[u8]) -> Result<Self, IndexerError> {
        let key = PublicKey::from_slice(public_key)
            .map_err(|e| IndexerError::InvalidPrincipal(format!("bad public key: {}", e)))?;
        Self::from_public_key(version, &key)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash160(&self) -> &[u8; 20] {
        &self.hash160
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let mut data = Vec::with_capacity(21);
        data.push(self.version);
        data.extend_from_slice(&self.hash160);
        let digest = sha256d(&data);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[..CHECKSUM_LEN]);
        checksum
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = self.hash160.to_vec();
        payload.extend_from_slice(&self.checksum());
        write!(
            f,
            "S{}{}",
            C32_ALPHABET[self.version as usize] as char,
            c32_encode(&payload)
        )
    }
}

impl FromStr for Principal {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| IndexerError::InvalidPrincipal(format!("{}: {}", s, reason));

        // c32 aliases: O reads as 0, I and L read as 1
        let normalized: Vec<u8> = s
            .bytes()
            .map(|b| match b.to_ascii_uppercase() {
                b'O' => b'0',
                b'I' | b'L' => b'1',
                other => other,
            })
            .collect();
        let bytes = normalized.as_slice();
        if bytes.len() < 3 || bytes[0] != b'S' {
            return Err(invalid("expected S-prefixed address"));
        }
        let version = c32_digit(bytes[1]).ok_or_else(|| invalid("bad version character"))?;
        let payload = c32_decode(&bytes[2..]).ok_or_else(|| invalid("bad c32 character"))?;
        if payload.len() != 20 + CHECKSUM_LEN {
            return Err(invalid("wrong payload length"));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[..20]);
        let principal = Self::new(version, hash)?;
        if payload[20..] != principal.checksum() {
            return Err(invalid("checksum mismatch"));
        }
        Ok(principal)
    }
}

impl TryFrom<String> for Principal {
    type Error = IndexerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.to_string()
    }
}

fn c32_digit(ch: u8) -> Option<u8> {
    C32_ALPHABET.iter().position(|&c| c == ch).map(|i| i as u8)
}

/// Base-32 over the whole input as one big-endian integer, one leading '0' per leading zero byte.
fn c32_encode(input: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for &byte in input.iter().rev() {
        carry |= (byte as u16) << carry_bits;
        carry_bits += 8;
        while carry_bits >= 5 {
            out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
            carry >>= 5;
            carry_bits -= 5;
        }
    }
    if carry_bits > 0 {
        out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
    }

    while out.last() == Some(&b'0') {
        out.pop();
    }
    for _ in input.iter().take_while(|&&b| b == 0) {
        out.push(b'0');
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Inverse of [`c32_encode`]. `None` on a character outside the alphabet.
fn c32_decode(input: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for &ch in input.iter().rev() {
        carry |= (c32_digit(ch)? as u16) << carry_bits;
        carry_bits += 5;
        if carry_bits >= 8 {
            out.push((carry & 0xff) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 {
        out.push(carry as u8);
    }

    while out.last() == Some(&0) {
        out.pop();
    }
    for _ in input.iter().take_while(|&&c| c == b'0') {
        out.push(0);
    }
    out.reverse();
    Some(out)
}

//! Clarity consensus serialization for the value subset carried by signed payloads
//!
//! Serialize: 𝒱 → 𝕊, type-prefixed and big-endian, tuple keys in lexicographic order.

use std::collections::BTreeMap;

use crate::types::ByteString;

const TYPE_UINT: u8 = 0x01;
const TYPE_BUFFER: u8 = 0x02;
const TYPE_BOOL_TRUE: u8 = 0x03;
const TYPE_BOOL_FALSE: u8 = 0x04;
const TYPE_TUPLE: u8 = 0x0c;
const TYPE_STRING_ASCII: u8 = 0x0d;
const TYPE_STRING_UTF8: u8 = 0x0e;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    UInt(u128),
    Buffer(ByteString),
    Bool(bool),
    StringAscii(String),
    StringUtf8(String),
    Tuple(BTreeMap<String, ClarityValue>),
}

impl ClarityValue {
    /// Build a tuple from `(name, value)` pairs. Later duplicates replace earlier ones.
    pub fn tuple<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ClarityValue)>,
        K: Into<String>,
    {
        Self::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            Self::UInt(value) => {
                out.push(TYPE_UINT);
                out.extend_from_slice(&value.to_be_bytes());
            }
            Self::Buffer(bytes) => {
                out.push(TYPE_BUFFER);
                write_length_prefixed(out, bytes);
            }
            Self::Bool(true) => out.push(TYPE_BOOL_TRUE),
            Self::Bool(false) => out.push(TYPE_BOOL_FALSE),
            Self::StringAscii(s) => {
                out.push(TYPE_STRING_ASCII);
                write_length_prefixed(out, s.as_bytes());
            }
            Self::StringUtf8(s) => {
                out.push(TYPE_STRING_UTF8);
                write_length_prefixed(out, s.as_bytes());
            }
            Self::Tuple(fields) => {
                out.push(TYPE_TUPLE);
                out.extend_from_slice(&(fields.len() as u32).to_be_bytes());
                // BTreeMap iteration is the lexicographic key order
                for (name, value) in fields {
                    out.push(name.len() as u8);
                    out.extend_from_slice(name.as_bytes());
                    value.write(out);
                }
            }
        }
    }
}

fn write_length_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

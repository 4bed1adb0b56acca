use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Digits used by [`ShortCodeBase62`], in ascending value order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// A short code encoded as a base62 string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ShortCodeBase62(String);

impl ShortCodeBase62 {
    /// Encodes `value` in base62, most significant digit first.
    ///
    /// Zero encodes as `"0"`.
    pub fn encode(value: u64) -> Self {
        Self(::base62::encode(value))
    }

    /// Encodes `value` and fits the result to exactly `length` characters.
    ///
    /// Shorter encodings are left-padded with `'0'`, longer ones keep their
    /// leading `length` characters.
    pub fn encode_fixed(value: u64, length: usize) -> Self {
        let encoded = Self::encode(value).0;
        let fitted = if encoded.len() < length {
            format!("{encoded:0>length$}")
        } else {
            encoded[..length].to_owned()
        };
        Self(fitted)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ShortCodeBase62 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortCodeBase62").field(&self.0).finish()
    }
}

impl Display for ShortCodeBase62 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShortCodeBase62 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShortCodeBase62 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if !s.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(serde::de::Error::custom(format!(
                "not a base62 string: '{s}'"
            )));
        }
        Ok(Self(s))
    }
}

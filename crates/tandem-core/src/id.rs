//! Connection and session identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SignalError;

/// Opaque identity of one live transport channel.
///
/// Allocated monotonically by the connection registry and never reused within
/// a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnId(u64);

impl ConnId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Session identity. Hex-encoded on the wire (32 lowercase hex chars).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId([u8; 16]);

impl SessionId {
    pub const LEN: usize = 16;

    /// Derive the id for a pairing of `initiator` and `joiner`.
    ///
    /// `seq` is the process-wide pairing sequence number, so two separate
    /// pairings of the same connections never share an id.
    pub fn derive(initiator: ConnId, joiner: ConnId, seq: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tandem.session");
        hasher.update(&initiator.get().to_le_bytes());
        hasher.update(&joiner.get().to_le_bytes());
        hasher.update(&seq.to_le_bytes());

        let hash = hasher.finalize();
        let mut id = [0u8; Self::LEN];
        id.copy_from_slice(&hash.as_bytes()[..Self::LEN]);
        Self(id)
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", hex::encode(self.0))
    }
}

impl FromStr for SessionId {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower_hex = s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if s.len() != Self::LEN * 2 || !lower_hex {
            return Err(SignalError::InvalidSessionId(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| SignalError::InvalidSessionId(s.to_string()))?;
        let mut id = [0u8; Self::LEN];
        id.copy_from_slice(&bytes);
        Ok(Self::from_bytes(id))
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

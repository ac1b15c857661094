//! Identifier types.
//!
//! Cut identifiers are assigned by the store's auto-increment sequence and are
//! always strictly positive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a cut record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CutId(u64);

impl CutId {
    /// Create an identifier, rejecting zero.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Return the raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Big-endian key bytes, so that byte order matches id order.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode an identifier from big-endian key bytes.
    #[must_use]
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = bytes.try_into().ok()?;
        Self::new(u64::from_be_bytes(bytes))
    }
}

impl TryFrom<u64> for CutId {
    type Error = InvalidCutId;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidCutId)
    }
}

impl From<CutId> for u64 {
    fn from(id: CutId) -> Self {
        id.0
    }
}

impl FromStr for CutId {
    type Err = InvalidCutId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s.trim().parse().map_err(|_| InvalidCutId)?;
        Self::new(value).ok_or(InvalidCutId)
    }
}

impl fmt::Debug for CutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CutId({})", self.0)
    }
}

impl fmt::Display for CutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The value is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cut id must be a positive integer")]
pub struct InvalidCutId;

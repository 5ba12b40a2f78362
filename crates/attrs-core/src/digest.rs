//! # Content Digest — Fingerprints of Flattened State
//!
//! `ContentDigest` identifies the current state of an instance by hashing
//! the canonical bytes of its flattened mapping with SHA-256. Equal flattened
//! mappings always produce equal digests, so a digest taken before and after
//! a sequence of mutations tells whether anything observable changed.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// SHA-256 over the canonical bytes of a flattened mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Canonicalize `state` and hash it.
    pub fn of(state: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let canonical = CanonicalBytes::new(state)?;
        Ok(Self::from_canonical(&canonical))
    }

    /// Hash bytes that are already canonical.
    pub fn from_canonical(data: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(data.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, without the algorithm prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

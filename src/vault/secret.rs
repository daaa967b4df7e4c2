//! Encrypted secret records and their listing metadata.
//!
//! The `ciphertext` field uses the base64 serde helpers from `format` so it
//! serializes as a string in JSON rather than a raw byte array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_encode};

/// A single encrypted secret stored in the vault.
///
/// The record's name is its key in the vault's `secrets` map; the same name
/// is bound into the ciphertext as associated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    /// nonce || ciphertext || tag, base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// When this secret was first created.
    pub created_at: DateTime<Utc>,

    /// When this secret was last updated.
    pub updated_at: DateTime<Utc>,

    /// Unknown per-record fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SecretRecord {
    pub fn new(ciphertext: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            ciphertext,
            created_at: now,
            updated_at: now,
            extra: serde_json::Map::new(),
        }
    }

    /// Replace the ciphertext, keeping `created_at` and any extra fields.
    pub fn replace(&mut self, ciphertext: Vec<u8>) {
        self.ciphertext = ciphertext;
        self.updated_at = Utc::now();
    }
}

/// Lightweight metadata about a secret (no ciphertext).
///
/// Returned by `VaultSession::list_secrets` so callers can display secret
/// names and timestamps without touching any ciphertext.
#[derive(Debug, Clone)]
pub struct SecretMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

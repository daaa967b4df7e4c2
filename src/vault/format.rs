//! On-disk vault file format.
//!
//! A vault is a single JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "salt": "<base64>",
//!   "kdf": { "memory_kib": 65536, "iterations": 3, "parallelism": 4 },
//!   "created_at": "<RFC 3339>",
//!   "secrets": { "<name>": { "ciphertext": "<base64>", ... }, ... }
//! }
//! ```
//!
//! Fields this version does not know about are kept in `extra` and written
//! back unchanged, so a newer writer's additions survive an older reader's
//! read-modify-write.  Integrity comes from the per-record GCM tags; there is
//! no file-level MAC.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::secret::SecretRecord;
use crate::crypto::Argon2Params;
use crate::errors::{CredVaultError, Result};

/// Current file format version.
pub const CURRENT_VERSION: u32 = 1;

/// Everything persisted for one vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    /// Format version.
    pub version: u32,

    /// The Argon2id salt (base64 in JSON).  Empty only for a stub file
    /// that was never bootstrapped.
    #[serde(
        default,
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub salt: Vec<u8>,

    /// KDF work factor used at bootstrap; reused on every unlock.
    #[serde(default)]
    pub kdf: Argon2Params,

    /// When this vault was first bootstrapped.
    pub created_at: DateTime<Utc>,

    /// Secret name -> encrypted record.  Includes the canary.
    #[serde(default)]
    pub secrets: BTreeMap<String, SecretRecord>,

    /// Unknown top-level fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VaultFile {
    /// A fresh, empty vault document for the given salt and params.
    pub fn new(salt: Vec<u8>, kdf: Argon2Params) -> Self {
        Self {
            version: CURRENT_VERSION,
            salt,
            kdf,
            created_at: Utc::now(),
            secrets: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Write a vault file to disk **atomically**.
///
/// 1. Serialize to pretty JSON.
/// 2. Create a temp file in the same directory, owner-only from the start
///    on Unix, and flush it to disk.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.
pub fn write_vault(path: &Path, vault: &VaultFile) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(vault)
        .map_err(|e| CredVaultError::SerializationError(format!("vault: {e}")))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    // A leftover from a crashed writer would keep whatever mode it had.
    match fs::remove_file(&tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)?
    };

    #[cfg(not(unix))]
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)?;

    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    // Persist the rename itself; losing the file means losing the salt.
    #[cfg(unix)]
    fs::File::open(parent)?.sync_all()?;

    Ok(())
}

/// Read and parse a vault file.
///
/// A missing file is reported as `NotInitialized`.  KDF parameters outside
/// the accepted range are `InvalidVaultFormat`, so a tampered work factor
/// fails here instead of inside Argon2.
pub fn read_vault(path: &Path) -> Result<VaultFile> {
    if !path.exists() {
        return Err(CredVaultError::NotInitialized(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let vault: VaultFile = serde_json::from_slice(&data)
        .map_err(|e| CredVaultError::InvalidVaultFormat(format!("vault JSON: {e}")))?;

    if vault.version != CURRENT_VERSION {
        return Err(CredVaultError::InvalidVaultFormat(format!(
            "unsupported version {}, expected {CURRENT_VERSION}",
            vault.version
        )));
    }

    vault
        .kdf
        .check()
        .map_err(|e| CredVaultError::InvalidVaultFormat(format!("kdf: {e}")))?;

    Ok(vault)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> VaultFile {
        let mut vault = VaultFile::new(vec![9u8; 32], Argon2Params::MINIMUM);
        vault.secrets.insert(
            "binance_api_key".to_string(),
            SecretRecord::new(vec![1, 2, 3, 4]),
        );
        vault
    }

    #[test]
    fn write_then_read_preserves_everything() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.vault.json");

        let original = sample();
        write_vault(&path, &original).unwrap();
        let loaded = read_vault(&path).unwrap();

        assert_eq!(loaded.salt, original.salt);
        assert_eq!(loaded.kdf, original.kdf);
        assert_eq!(loaded.created_at, original.created_at);
        assert_eq!(
            loaded.secrets["binance_api_key"].ciphertext,
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn salt_is_stored_as_base64() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v.json");
        write_vault(&path, &sample()).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["salt"], BASE64.encode([9u8; 32]));
    }

    #[test]
    fn unknown_fields_survive_a_rewrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v.json");
        write_vault(&path, &sample()).unwrap();

        // Simulate a newer writer adding fields at both levels.
        let mut json: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        json["connector_profile"] = serde_json::json!({ "exchange": "extended" });
        json["secrets"]["binance_api_key"]["label"] = serde_json::json!("spot");
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let vault = read_vault(&path).unwrap();
        write_vault(&path, &vault).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["connector_profile"]["exchange"], "extended");
        assert_eq!(json["secrets"]["binance_api_key"]["label"], "spot");
    }

    #[test]
    fn missing_kdf_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v.json");
        let json = serde_json::json!({
            "version": 1,
            "salt": BASE64.encode([1u8; 32]),
            "created_at": "2024-05-01T00:00:00Z",
            "secrets": {}
        });
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let vault = read_vault(&path).unwrap();
        assert_eq!(vault.kdf, Argon2Params::default());
    }

    #[test]
    fn out_of_range_kdf_is_invalid_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v.json");
        write_vault(&path, &sample()).unwrap();

        for (field, value) in [
            ("memory_kib", serde_json::json!(u32::MAX)),
            ("memory_kib", serde_json::json!(16)),
            ("iterations", serde_json::json!(1_000_000)),
            ("parallelism", serde_json::json!(0)),
        ] {
            let mut json: serde_json::Value =
                serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
            json["kdf"][field] = value;
            let tampered = tmp.path().join("tampered.json");
            fs::write(&tampered, serde_json::to_vec(&json).unwrap()).unwrap();

            assert!(
                matches!(read_vault(&tampered), Err(CredVaultError::InvalidVaultFormat(_))),
                "{field} was accepted"
            );
        }
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.vault.json");
        write_vault(&path, &sample()).unwrap();
        write_vault(&path, &sample()).unwrap();

        assert!(!tmp.path().join(".main.vault.json.tmp").exists());
        assert!(read_vault(&path).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn vault_file_is_owner_only_even_over_stale_temp() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.vault.json");

        // World-readable leftover from an interrupted write.
        let stale = tmp.path().join(".main.vault.json.tmp");
        fs::write(&stale, b"partial").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        write_vault(&path, &sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn missing_file_is_not_initialized() {
        let tmp = TempDir::new().unwrap();
        let result = read_vault(&tmp.path().join("nope.json"));
        assert!(matches!(result, Err(CredVaultError::NotInitialized(_))));
    }

    #[test]
    fn garbage_is_invalid_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v.json");
        fs::write(&path, b"not json at all").unwrap();
        assert!(matches!(
            read_vault(&path),
            Err(CredVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v.json");
        let mut vault = sample();
        vault.version = 99;
        write_vault(&path, &vault).unwrap();
        assert!(matches!(
            read_vault(&path),
            Err(CredVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn write_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dir").join("v.json");
        write_vault(&path, &sample()).unwrap();
        assert!(path.exists());
    }
}

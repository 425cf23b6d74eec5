//! Encrypted on-disk credential storage.
//!
//! The record is serialised to JSON and sealed with AES-256-GCM. The
//! credential file holds `base64(nonce || ciphertext)`; the key file holds
//! the base64 of the 32-byte key. Both are created with mode 0600 on Unix.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::Rng;

use crate::error::{CredentialError, CredentialResult};
use crate::record::{wipe, Credentials};

pub const KEY_FILE_NAME: &str = ".chatgpt_key";
pub const CREDENTIALS_FILE_NAME: &str = ".chatgpt_credentials";

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Handle on the key and credential files in one directory.
///
/// Opening the store loads the key, generating it on first use.
#[derive(Clone)]
pub struct CredentialStore {
    key_path: PathBuf,
    credentials_path: PathBuf,
    cipher: Aes256Gcm,
}

impl CredentialStore {
    pub fn open(dir: impl AsRef<Path>) -> CredentialResult<Self> {
        let dir = dir.as_ref();
        let key_path = dir.join(KEY_FILE_NAME);
        let credentials_path = dir.join(CREDENTIALS_FILE_NAME);

        let mut key = load_or_generate_key(&key_path)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CredentialError::Crypto(e.to_string()));
        wipe(&mut key);

        Ok(Self {
            key_path,
            credentials_path,
            cipher: cipher?,
        })
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Encrypt and persist `credentials`, replacing any earlier record.
    pub fn save(&self, credentials: &Credentials) -> CredentialResult<()> {
        let mut plaintext = serde_json::to_vec(credentials)
            .map_err(|e| CredentialError::Format(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce);
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|e| CredentialError::Crypto(e.to_string()));
        wipe(&mut plaintext);

        let mut blob = nonce.to_vec();
        blob.extend_from_slice(&sealed?);
        write_private(&self.credentials_path, STANDARD.encode(blob).as_bytes())?;

        tracing::info!(path = %self.credentials_path.display(), "Credentials saved");
        Ok(())
    }

    /// Decrypt the stored record. `Ok(None)` when no record exists.
    pub fn try_load(&self) -> CredentialResult<Option<Credentials>> {
        let encoded = match fs::read_to_string(&self.credentials_path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialError::io(&self.credentials_path, e)),
        };

        let blob = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CredentialError::Format(e.to_string()))?;
        if blob.len() <= NONCE_LEN {
            return Err(CredentialError::Format("credential file is truncated".into()));
        }
        let (nonce, sealed) = blob.split_at(NONCE_LEN);

        let mut plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CredentialError::Crypto("decryption failed (wrong key?)".into()))?;
        let parsed = serde_json::from_slice::<Credentials>(&plaintext)
            .map_err(|e| CredentialError::Format(e.to_string()));
        wipe(&mut plaintext);

        Ok(Some(parsed?))
    }

    /// Like [`CredentialStore::try_load`], but any failure is logged and
    /// reported as "no credentials".
    pub fn load(&self) -> Option<Credentials> {
        match self.try_load() {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored credentials");
                None
            }
        }
    }

    /// Remove the credential file, and the key file when `with_key` is set.
    /// Missing files are not an error.
    pub fn clear(&self, with_key: bool) -> CredentialResult<()> {
        remove_if_present(&self.credentials_path)?;
        if with_key {
            remove_if_present(&self.key_path)?;
        }
        tracing::info!(with_key, "Credentials cleared");
        Ok(())
    }
}

fn load_or_generate_key(path: &Path) -> CredentialResult<Vec<u8>> {
    match fs::read_to_string(path) {
        Ok(encoded) => match STANDARD.decode(encoded.trim()) {
            Ok(key) if key.len() == KEY_LEN => return Ok(key),
            Ok(key) => {
                tracing::warn!(path = %path.display(), len = key.len(), "Key file has wrong length, generating a new key");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Key file is not valid base64, generating a new key");
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read key file, generating a new key");
        }
    }

    let mut key = vec![0u8; KEY_LEN];
    rand::rng().fill(key.as_mut_slice());
    write_private(path, STANDARD.encode(&key).as_bytes())?;
    tracing::info!(path = %path.display(), "Generated new encryption key");
    Ok(key)
}

fn write_private(path: &Path, contents: &[u8]) -> CredentialResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| CredentialError::io(path, e))?;
    file.write_all(contents)
        .map_err(|e| CredentialError::io(path, e))
}

fn remove_if_present(path: &Path) -> CredentialResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CredentialError::io(path, e)),
    }
}

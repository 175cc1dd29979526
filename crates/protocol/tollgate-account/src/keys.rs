//! Signing key custody.
//!
//! The seed lives only inside [`SigningMaterial`], which is private to this
//! crate. Callers get signatures and the public key, never the seed.

use std::path::Path;

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::CredentialSource;
use crate::error::{AccountError, AccountResult};

/// An Ed25519 seed (32 bytes), wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SigningMaterial([u8; 32]);

impl SigningMaterial {
    pub(crate) fn from_seed(seed: [u8; 32]) -> Self {
        Self(seed)
    }

    pub(crate) fn generate() -> Self {
        let key = SigningKey::generate(&mut OsRng);
        Self(key.to_bytes())
    }

    /// Load the seed from a configured credential source.
    pub(crate) fn load(source: &CredentialSource) -> AccountResult<Self> {
        match source {
            CredentialSource::Env { var } => {
                let value = std::env::var(var)
                    .map_err(|_| AccountError::credential(format!("{} is not set", var)))?;
                Self::from_hex(&value)
            }
            CredentialSource::File { path } => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AccountError::credential(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_hex(&contents)
            }
            CredentialSource::Generate => Ok(Self::generate()),
        }
    }

    fn from_hex(value: &str) -> AccountResult<Self> {
        let trimmed = value.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(trimmed)
            .map_err(|e| AccountError::InvalidKey(format!("not hex: {}", e)))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(AccountError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                len
            )));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(seed))
    }

    pub(crate) fn public_key(&self) -> [u8; 32] {
        SigningKey::from_bytes(&self.0).verifying_key().to_bytes()
    }

    /// `Ed25519_Sign(seed, H(message))`
    pub(crate) fn sign(&self, message: &[u8]) -> [u8; 64] {
        let digest: [u8; 32] = Sha256::digest(message).into();
        SigningKey::from_bytes(&self.0).sign(&digest).to_bytes()
    }
}

impl std::fmt::Debug for SigningMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningMaterial([REDACTED])")
    }
}

/// Generate a new seed and write it hex-encoded to `path`.
///
/// Returns the public key of the new account. Refuses to overwrite an
/// existing file.
pub fn generate_key_file(path: &Path) -> AccountResult<[u8; 32]> {
    if path.exists() {
        return Err(AccountError::credential(format!(
            "key file already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let material = SigningMaterial::generate();
    let mut encoded = hex::encode(material.0);
    std::fs::write(path, &encoded)?;
    encoded.zeroize();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(material.public_key())
}

/// Verify a signature produced by [`SigningMaterial::sign`].
pub fn verify_signature(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> bool {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let digest: [u8; 32] = Sha256::digest(message).into();
    key.verify(&digest, &Signature::from_bytes(signature)).is_ok()
}

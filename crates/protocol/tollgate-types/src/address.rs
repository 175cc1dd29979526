//! Account addresses.
//!
//! An address is derived from an Ed25519 public key:
//! ```text
//! Address = H(0x00 || public_key)[0:20]
//! ```
//!
//! Human-readable format: `tg1` + base58(Address)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{TypesError, TypesResult};

/// Domain separator for key hashing (Ed25519 key type)
const DOMAIN_KEY: u8 = 0x00;

/// Human-readable address prefix
pub const ADDRESS_PREFIX: &str = "tg1";

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Derive the address owned by an Ed25519 public key.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([DOMAIN_KEY]);
        hasher.update(public_key);
        let hash: [u8; 32] = hasher.finalize().into();

        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[..20]);
        Self(address)
    }

    /// Parse the human-readable `tg1...` form.
    pub fn parse(s: &str) -> TypesResult<Self> {
        let encoded = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or_else(|| TypesError::InvalidAddress(format!("missing '{}' prefix: {}", ADDRESS_PREFIX, s)))?;

        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| TypesError::InvalidAddress(format!("{}: {}", s, e)))?;

        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| TypesError::InvalidAddress(format!("{}: expected 20 bytes, got {}", s, v.len())))?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", ADDRESS_PREFIX, bs58::encode(&self.0).into_string())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl std::str::FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let a = Address::from_public_key(&[7u8; 32]);
        let b = Address::from_public_key(&[7u8; 32]);
        let c = Address::from_public_key(&[8u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_string_roundtrip() {
        let address = Address::from_public_key(&[1u8; 32]);
        let s = address.to_string();
        assert!(s.starts_with("tg1"));
        assert_eq!(Address::parse(&s).unwrap(), address);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Address::parse("xx1abc").is_err());
        assert!(Address::parse("tg10OIl").is_err());
        let short = format!("tg1{}", bs58::encode([1u8; 4]).into_string());
        assert!(Address::parse(&short).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let address = Address([3u8; 20]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", address));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}

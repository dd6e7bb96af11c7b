//! Account identities (32-byte addresses, base58 text form).
//!
//! Identities name the oracle program that owns a feed, the aggregator
//! account itself, the mint authority, the treasury and the rewarded miner.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Empty input
    #[error("empty identity")]
    Empty,
    /// Not valid base58
    #[error("invalid base58 encoding: {0}")]
    InvalidBase58(String),
    /// Decoded to the wrong number of bytes
    #[error("identity must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte account identity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; 32]);

impl Identity {
    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Identity(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a base58 identity.
    pub fn from_base58(text: &str) -> Result<Self, IdentityError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }

        let decoded = bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| IdentityError::InvalidBase58(e.to_string()))?;

        let bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(decoded.len()))?;

        Ok(Identity(bytes))
    }

    /// Base58 text form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::from_base58(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::from_base58(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_base58()
    }
}

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Identity(bytes)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_base58())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oracle_program_id() {
        let id = Identity::from_base58("SW1TCH7qEPTdLsDHRgPuMQjbQxKdH2aBStViMFnt64f").unwrap();
        assert_eq!(
            hex::encode(id.as_bytes()),
            "068851c68c6832f02fa581b1bf491b77ca41776ba2b988b5a6faba8ee3a2ec90"
        );
        assert_eq!(id.to_base58(), "SW1TCH7qEPTdLsDHRgPuMQjbQxKdH2aBStViMFnt64f");
    }

    #[test]
    fn test_system_program_is_all_zero() {
        let id: Identity = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(id, Identity::default());
    }

    #[test]
    fn test_invalid_identities() {
        assert_eq!(Identity::from_base58("  "), Err(IdentityError::Empty));
        // '0' is not in the base58 alphabet
        assert!(matches!(
            Identity::from_base58("0OIl"),
            Err(IdentityError::InvalidBase58(_))
        ));
        assert_eq!(Identity::from_base58("2g"), Err(IdentityError::InvalidLength(1)));
    }

    #[test]
    fn test_serde_as_string() {
        let id = Identity::new([7u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_base58()));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

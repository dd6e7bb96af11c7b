//! Error types for near-miss verification and settlement.

use thiserror::Error;

/// Errors returned by feed reading, verification, initialization and settlement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NearMissError {
    /// The digest does not carry exactly the required number of trailing zero bytes.
    #[error("submission did not meet near-miss criteria: {zeros} trailing zero bytes, expected exactly {target}")]
    InvalidNearMiss { zeros: u8, target: u8 },

    /// A submitted header field differs from the oracle-reported tip.
    #[error("submitted {field} does not match the oracle tip")]
    OracleMismatch { field: &'static str },

    /// The feed account is not a genuine oracle-published result.
    #[error("untrusted oracle feed: {0}")]
    UntrustedFeed(&'static str),

    /// The latest oracle round has no successful response.
    #[error("oracle feed has no successful round")]
    StaleFeed,

    /// `initialize` was called on already-initialized program state.
    #[error("program state is already initialized")]
    AlreadyInitialized,

    /// An operation needed program state that was never initialized.
    #[error("program state is not initialized")]
    Uninitialized,

    /// A difficulty target outside `0..=32` can never be met by a 32-byte digest.
    #[error("difficulty target {0} exceeds digest length")]
    InvalidDifficultyTarget(u8),

    /// A fixed-layout buffer had the wrong length.
    #[error("invalid layout: expected {expected} bytes, got {actual}")]
    InvalidLayout { expected: usize, actual: usize },

    /// The same winning header was already rewarded.
    #[error("duplicate near-miss submission")]
    DuplicateSubmission,

    /// The feed round is older than one already used for a reward.
    #[error("feed height {height} is behind the latest rewarded height {latest}")]
    StaleSubmission { height: u64, latest: u64 },

    /// Checked accounting arithmetic overflowed.
    #[error("arithmetic overflow occurred")]
    Overflow,

    /// The external ledger refused the mint.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl NearMissError {
    /// Stable identifier surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            NearMissError::InvalidNearMiss { .. } => "InvalidNearMiss",
            NearMissError::OracleMismatch { .. } => "OracleMismatch",
            NearMissError::UntrustedFeed(_) => "UntrustedFeed",
            NearMissError::StaleFeed => "StaleFeed",
            NearMissError::AlreadyInitialized => "AlreadyInitialized",
            NearMissError::Uninitialized => "Uninitialized",
            NearMissError::InvalidDifficultyTarget(_) => "InvalidDifficultyTarget",
            NearMissError::InvalidLayout { .. } => "InvalidLayout",
            NearMissError::DuplicateSubmission => "DuplicateSubmission",
            NearMissError::StaleSubmission { .. } => "StaleSubmission",
            NearMissError::Overflow => "Overflow",
            NearMissError::Ledger(_) => "Ledger",
            NearMissError::Config(_) => "Config",
        }
    }

    /// Whether the caller can succeed by resubmitting (new nonce or fresh tip).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NearMissError::InvalidNearMiss { .. }
                | NearMissError::OracleMismatch { .. }
                | NearMissError::StaleFeed
                | NearMissError::StaleSubmission { .. }
        )
    }

    /// Whether the failure lies with the oracle rather than the miner.
    pub fn is_feed_fault(&self) -> bool {
        matches!(self, NearMissError::UntrustedFeed(_) | NearMissError::StaleFeed)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, NearMissError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(NearMissError::InvalidNearMiss { zeros: 1, target: 2 }.code(), "InvalidNearMiss");
        assert_eq!(NearMissError::OracleMismatch { field: "prev_hash" }.code(), "OracleMismatch");
        assert_eq!(NearMissError::UntrustedFeed("owner").code(), "UntrustedFeed");
        assert_eq!(NearMissError::StaleFeed.code(), "StaleFeed");
        assert_eq!(NearMissError::AlreadyInitialized.code(), "AlreadyInitialized");
        assert_eq!(NearMissError::StaleSubmission { height: 1, latest: 2 }.code(), "StaleSubmission");
    }

    #[test]
    fn test_recoverability() {
        assert!(NearMissError::InvalidNearMiss { zeros: 0, target: 2 }.is_recoverable());
        assert!(NearMissError::OracleMismatch { field: "bits" }.is_recoverable());
        assert!(!NearMissError::AlreadyInitialized.is_recoverable());
        assert!(!NearMissError::UntrustedFeed("discriminator").is_recoverable());
        assert!(NearMissError::StaleSubmission { height: 9, latest: 10 }.is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = NearMissError::InvalidLayout { expected: 88, actual: 87 };
        assert_eq!(err.to_string(), "invalid layout: expected 88 bytes, got 87");
    }
}

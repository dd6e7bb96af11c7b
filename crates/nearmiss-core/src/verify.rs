//! Near-miss verification.
//!
//! `verify` binds a submission to the oracle tip it was mined against, then
//! applies the exact trailing-zero-byte rule to its double SHA256 digest.
//! It holds no state, so any number of callers may run it concurrently.

use tracing::debug;

use crate::difficulty::trailing_zero_bytes;
use crate::error::{NearMissError, Result};
use crate::hash::digest_hex;
use crate::header::{BlockHeader, BlockTip};
use crate::state::ProgramState;

/// Result of hashing and grading one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearMissOutcome {
    /// Whether the candidate is a near miss for the target it was graded against.
    pub accepted: bool,
    /// Trailing zero bytes of the digest.
    pub trailing_zero_count: u8,
    /// Double SHA256 of the 88-byte candidate.
    pub digest: [u8; 32],
}

/// Hash and grade a candidate without checking it against any tip.
pub fn evaluate(header: &BlockHeader, target: u8) -> NearMissOutcome {
    let digest = header.hash();
    let trailing_zero_count = trailing_zero_bytes(&digest);
    NearMissOutcome {
        accepted: trailing_zero_count == target,
        trailing_zero_count,
        digest,
    }
}

/// Check the oracle-sourced fields of a submission against the tip.
pub fn check_tip(tip: &BlockTip, submission: &BlockHeader) -> Result<()> {
    let mismatch = if submission.prev_hash != tip.prev_hash {
        Some("prev_hash")
    } else if submission.merkle_root != tip.merkle_root {
        Some("merkle_root")
    } else if submission.version != tip.version {
        Some("version")
    } else if submission.timestamp != tip.timestamp {
        Some("timestamp")
    } else if submission.bits != tip.bits {
        Some("bits")
    } else {
        None
    };

    match mismatch {
        Some(field) => {
            debug!(field, "submission diverges from oracle tip");
            Err(NearMissError::OracleMismatch { field })
        }
        None => Ok(()),
    }
}

/// Verify a submission against the live tip and the program's target.
///
/// Returns the accepted outcome, `OracleMismatch` if any tip field differs,
/// or `InvalidNearMiss` if the digest does not have exactly
/// `state.difficulty_target` trailing zero bytes.
pub fn verify(tip: &BlockTip, submission: &BlockHeader, state: &ProgramState) -> Result<NearMissOutcome> {
    check_tip(tip, submission)?;

    let outcome = evaluate(submission, state.difficulty_target);
    debug!(
        nonce = submission.nonce,
        extra_nonce = submission.extra_nonce,
        digest = %digest_hex(&outcome.digest),
        zeros = outcome.trailing_zero_count,
        target = state.difficulty_target,
        "near-miss candidate graded"
    );

    if !outcome.accepted {
        return Err(NearMissError::InvalidNearMiss {
            zeros: outcome.trailing_zero_count,
            target: state.difficulty_target,
        });
    }

    Ok(outcome)
}

//! Bounded nonce search for near misses.
//!
//! The search walks `nonce` upward from a cursor and rolls into
//! `extra_nonce + 1` when `nonce` wraps. It never mutates shared state, so
//! cancelling it at any point is safe; the returned cursor says where to
//! resume.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::difficulty::trailing_zero_bytes;
use crate::hash::double_sha256;
use crate::header::{BlockHeader, BlockTip, HEADER_SIZE, TIP_PAYLOAD_SIZE};
use crate::verify::NearMissOutcome;

/// How often (in attempts) the cancel flag and deadline are polled.
const CHECK_INTERVAL: u64 = 4096;

/// Position in the `(nonce, extra_nonce)` space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCursor {
    pub nonce: u32,
    pub extra_nonce: u64,
}

impl SearchCursor {
    pub fn new(nonce: u32, extra_nonce: u64) -> Self {
        SearchCursor { nonce, extra_nonce }
    }

    /// The next position; `extra_nonce` advances when `nonce` wraps.
    pub fn next(self) -> Self {
        match self.nonce.checked_add(1) {
            Some(nonce) => SearchCursor { nonce, extra_nonce: self.extra_nonce },
            None => SearchCursor {
                nonce: 0,
                extra_nonce: self.extra_nonce.wrapping_add(1),
            },
        }
    }
}

/// Limits on a single search call. At least one must be finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    /// Maximum number of hashes to compute.
    pub max_attempts: u64,
    /// Wall-clock limit, measured from the start of the call.
    pub deadline: Option<Duration>,
}

impl SearchBudget {
    pub fn attempts(max_attempts: u64) -> Self {
        SearchBudget { max_attempts, deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// A candidate with exactly the target trailing zero bytes.
    Found {
        header: BlockHeader,
        outcome: NearMissOutcome,
    },
    /// `max_attempts` hashes computed without a match.
    Exhausted,
    /// The deadline passed.
    TimedOut,
    /// The cancel flag was raised.
    Cancelled,
}

/// Result of a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub status: SearchStatus,
    /// Hashes computed in this call.
    pub attempts: u64,
    /// First position not yet tried.
    pub resume: SearchCursor,
}

impl SearchReport {
    /// The winning candidate, if one was found.
    pub fn found(&self) -> Option<(BlockHeader, NearMissOutcome)> {
        match self.status {
            SearchStatus::Found { header, outcome } => Some((header, outcome)),
            _ => None,
        }
    }
}

/// Search for a candidate on `tip` with exactly `target` trailing zero bytes.
///
/// # Arguments
/// * `tip` - Oracle tip supplying the first five header fields
/// * `target` - Required trailing zero bytes
/// * `start` - First position to try
/// * `budget` - Attempt and wall-clock limits
/// * `cancel` - Checked every few thousand attempts; raising it stops the search
pub fn search(
    tip: &BlockTip,
    target: u8,
    start: SearchCursor,
    budget: &SearchBudget,
    cancel: &AtomicBool,
) -> SearchReport {
    let mut header = [0u8; HEADER_SIZE];
    header[..TIP_PAYLOAD_SIZE].copy_from_slice(&tip.encode());
    header[80..88].copy_from_slice(&start.extra_nonce.to_le_bytes());

    let started = budget.deadline.map(|limit| (Instant::now(), limit));
    let mut cursor = start;
    let mut attempts = 0u64;

    loop {
        if attempts % CHECK_INTERVAL == 0 {
            if cancel.load(Ordering::Relaxed) {
                return SearchReport { status: SearchStatus::Cancelled, attempts, resume: cursor };
            }
            if let Some((at, limit)) = started {
                if at.elapsed() >= limit {
                    return SearchReport { status: SearchStatus::TimedOut, attempts, resume: cursor };
                }
            }
        }

        if attempts >= budget.max_attempts {
            return SearchReport { status: SearchStatus::Exhausted, attempts, resume: cursor };
        }

        header[76..80].copy_from_slice(&cursor.nonce.to_le_bytes());
        let digest = double_sha256(&header);
        attempts += 1;

        let zeros = trailing_zero_bytes(&digest);
        let tried = cursor;
        cursor = cursor.next();
        if cursor.extra_nonce != tried.extra_nonce {
            header[80..88].copy_from_slice(&cursor.extra_nonce.to_le_bytes());
        }

        if zeros == target {
            let outcome = NearMissOutcome {
                accepted: true,
                trailing_zero_count: zeros,
                digest,
            };
            return SearchReport {
                status: SearchStatus::Found {
                    header: tip.candidate(tried.nonce, tried.extra_nonce),
                    outcome,
                },
                attempts,
                resume: cursor,
            };
        }
    }
}

//! Near-miss proof-of-wasted-work verification.
//!
//! A miner takes the Bitcoin tip published by an oracle aggregator, picks a
//! `nonce` and `extra_nonce`, and submits the resulting 88-byte header. The
//! submission earns a fixed token reward when its double SHA256 digest ends
//! in exactly the configured number of zero bytes.
//!
//! This crate provides:
//! - Header candidate and oracle tip encoding
//! - SHA256 double-hashing
//! - The exact trailing-zero-byte near-miss rule
//! - Authenticated reads of aggregator accounts
//! - Verification, one-time program initialization and reward settlement
//! - Bounded nonce search and periodic tip monitoring

pub mod config;
pub mod difficulty;
pub mod error;
pub mod feed;
pub mod hash;
pub mod header;
pub mod identity;
pub mod monitor;
pub mod network;
pub mod program;
pub mod reward;
pub mod search;
pub mod state;
pub mod verify;

pub use config::NearMissConfig;
pub use difficulty::{is_near_miss, trailing_zero_bytes};
pub use error::{NearMissError, Result};
pub use feed::{AggregatorAccount, FeedReader, FeedRound};
pub use hash::double_sha256;
pub use header::{BlockHeader, BlockTip, HEADER_SIZE, TIP_PAYLOAD_SIZE};
pub use identity::{Identity, IdentityError};
pub use monitor::{FeedSource, MonitorSummary, TipMonitor};
pub use network::{Cluster, TOKEN_PER_NEAR_MISS};
pub use program::{NearMissProgram, Receipt};
pub use reward::{Ledger, MemoryLedger, RewardIssuer, Settlement};
pub use search::{search, SearchBudget, SearchCursor, SearchReport, SearchStatus};
pub use state::{ProgramSlot, ProgramState};
pub use verify::{verify, NearMissOutcome};

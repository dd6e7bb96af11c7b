//! Oracle feed reading.
//!
//! An aggregator account publishes the latest confirmed round of the BTC tip
//! job. Before any field of it is trusted the reader checks the account
//! discriminator, the owning program, and that the round has at least one
//! successful oracle response.
//!
//! Account layout (little-endian):
//!
//! | offset | field                | size          |
//! |--------|----------------------|---------------|
//! | 0      | discriminator        | 8             |
//! | 8      | layout version       | 4             |
//! | 12     | reserved             | 4             |
//! | 16     | round open timestamp | 8 (i64)       |
//! | 24     | height               | 8             |
//! | 32     | num success          | 4             |
//! | 36     | num error            | 4             |
//! | 40     | result length        | 4             |
//! | 44     | result payload       | result length |

use tracing::{debug, warn};

use crate::error::{NearMissError, Result};
use crate::header::{BlockTip, TIP_PAYLOAD_SIZE};
use crate::identity::Identity;

/// First 8 bytes of `sha256("account:AggregatorAccountData")`.
pub const AGGREGATOR_DISCRIMINATOR: [u8; 8] = [0xd9, 0xe6, 0x41, 0x65, 0xc9, 0xa2, 0x1b, 0x7d];

/// Layout version written by [`AggregatorAccount::publish`] and the only one
/// [`FeedReader`] decodes.
pub const LAYOUT_VERSION: u32 = 1;

const ROUND_HEADER_SIZE: usize = 44;
const RESULT_OFFSET: usize = ROUND_HEADER_SIZE;

/// Raw aggregator account as fetched from the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorAccount {
    /// Address of the aggregator.
    pub key: Identity,
    /// Program owning the account.
    pub owner: Identity,
    /// Account data.
    pub data: Vec<u8>,
}

/// Latest confirmed round of an aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRound {
    /// Decoded tip payload.
    pub tip: BlockTip,
    /// Bitcoin block height the round reports.
    pub height: u64,
    /// When the round was opened (Unix time).
    pub round_open_timestamp: i64,
    /// Oracles that answered successfully.
    pub num_success: u32,
    /// Oracles that failed.
    pub num_error: u32,
}

impl AggregatorAccount {
    /// Serialize a round into account data owned by `owner`.
    ///
    /// This is what a genuine oracle publishes; tooling and tests use it to
    /// stand up mock feeds.
    pub fn publish(key: Identity, owner: Identity, round: &FeedRound) -> Self {
        let mut data = Vec::with_capacity(ROUND_HEADER_SIZE + TIP_PAYLOAD_SIZE);
        data.extend_from_slice(&AGGREGATOR_DISCRIMINATOR);
        data.extend_from_slice(&LAYOUT_VERSION.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&round.round_open_timestamp.to_le_bytes());
        data.extend_from_slice(&round.height.to_le_bytes());
        data.extend_from_slice(&round.num_success.to_le_bytes());
        data.extend_from_slice(&round.num_error.to_le_bytes());
        data.extend_from_slice(&(TIP_PAYLOAD_SIZE as u32).to_le_bytes());
        data.extend_from_slice(&round.tip.encode());

        AggregatorAccount { key, owner, data }
    }
}

/// Point reader for aggregator accounts owned by one oracle program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReader {
    oracle_program: Identity,
}

impl FeedReader {
    /// Create a reader trusting accounts owned by `oracle_program`.
    pub fn new(oracle_program: Identity) -> Self {
        FeedReader { oracle_program }
    }

    /// The trusted oracle program.
    pub fn oracle_program(&self) -> Identity {
        self.oracle_program
    }

    /// Read the tip of the latest round.
    pub fn read_tip(&self, account: &AggregatorAccount) -> Result<BlockTip> {
        self.read_round(account).map(|round| round.tip)
    }

    /// Authenticate the account and decode its latest round.
    pub fn read_round(&self, account: &AggregatorAccount) -> Result<FeedRound> {
        let data = account.data.as_slice();

        if data.len() < AGGREGATOR_DISCRIMINATOR.len() || data[..8] != AGGREGATOR_DISCRIMINATOR {
            warn!(feed = %account.key, "feed account discriminator mismatch");
            return Err(NearMissError::UntrustedFeed("account is not an aggregator result"));
        }

        if account.owner != self.oracle_program {
            warn!(
                feed = %account.key,
                owner = %account.owner,
                expected = %self.oracle_program,
                "feed account owned by unexpected program"
            );
            return Err(NearMissError::UntrustedFeed("account not owned by the oracle program"));
        }

        if data.len() < ROUND_HEADER_SIZE {
            warn!(feed = %account.key, len = data.len(), "feed account truncated");
            return Err(NearMissError::UntrustedFeed("aggregator round truncated"));
        }

        let layout_version = read_u32(data, 8);
        if layout_version != LAYOUT_VERSION {
            warn!(feed = %account.key, layout_version, "unsupported aggregator layout version");
            return Err(NearMissError::UntrustedFeed("unsupported aggregator layout version"));
        }

        let round_open_timestamp = read_i64(data, 16);
        let height = read_u64(data, 24);
        let num_success = read_u32(data, 32);
        let num_error = read_u32(data, 36);

        debug!(
            feed = %account.key,
            height,
            round_open_timestamp,
            num_success,
            num_error,
            "feed round loaded"
        );

        if num_success == 0 {
            warn!(feed = %account.key, num_error, "feed has no successful updates");
            return Err(NearMissError::StaleFeed);
        }

        let result_len = read_u32(data, 40) as usize;
        if result_len != TIP_PAYLOAD_SIZE {
            warn!(feed = %account.key, result_len, "unexpected tip payload length");
            return Err(NearMissError::UntrustedFeed("tip payload has unexpected length"));
        }

        let payload = data
            .get(RESULT_OFFSET..RESULT_OFFSET + result_len)
            .ok_or(NearMissError::UntrustedFeed("tip payload truncated"))?;

        let tip = BlockTip::decode(payload)
            .map_err(|_| NearMissError::UntrustedFeed("tip payload has unexpected length"))?;

        Ok(FeedRound {
            tip,
            height,
            round_open_timestamp,
            num_success,
            num_error,
        })
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn read_i64(bytes: &[u8], offset: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    i64::from_le_bytes(buf)
}

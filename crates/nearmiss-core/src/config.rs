//! Verifier and miner configuration.
//!
//! Loaded from JSON; every field has a default so an empty object is a
//! valid devnet configuration.
//!
//! ```json
//! {
//!   "cluster": "devnet",
//!   "difficulty_target": 2,
//!   "poll_interval_secs": 10
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::difficulty::target_is_valid;
use crate::error::{NearMissError, Result};
use crate::identity::Identity;
use crate::network::{Cluster, DEFAULT_DIFFICULTY_TARGET};
use crate::search::SearchBudget;

/// Default tip poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default nonce search bound.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearMissConfig {
    /// Cluster hosting the feed.
    pub cluster: Cluster,
    /// Required trailing zero bytes.
    pub difficulty_target: u8,
    /// Aggregator address; defaults to the cluster's published BTC tip feed.
    pub feed: Option<Identity>,
    /// Trusted oracle program; defaults to the cluster's oracle program.
    pub oracle_program: Option<Identity>,
    /// Seconds between tip polls.
    pub poll_interval_secs: u64,
    /// Upper bound on hashes per search.
    pub max_attempts: u64,
}

impl Default for NearMissConfig {
    fn default() -> Self {
        NearMissConfig {
            cluster: Cluster::default(),
            difficulty_target: DEFAULT_DIFFICULTY_TARGET,
            feed: None,
            oracle_program: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl NearMissConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: NearMissConfig =
            serde_json::from_str(text).map_err(|e| NearMissError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !target_is_valid(self.difficulty_target) {
            return Err(NearMissError::InvalidDifficultyTarget(self.difficulty_target));
        }
        if self.poll_interval_secs == 0 {
            return Err(NearMissError::Config("poll_interval_secs must be positive".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(NearMissError::Config("max_attempts must be positive".to_string()));
        }
        Ok(())
    }

    /// Oracle program whose accounts are trusted.
    pub fn trusted_oracle(&self) -> Identity {
        self.oracle_program.unwrap_or_else(|| self.cluster.oracle_program_id())
    }

    /// Aggregator to read the tip from.
    pub fn feed_address(&self) -> Result<Identity> {
        self.feed
            .or_else(|| self.cluster.btc_tip_feed())
            .ok_or_else(|| NearMissError::Config(format!("no BTC tip feed known for {}", self.cluster)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn search_budget(&self) -> SearchBudget {
        SearchBudget::attempts(self.max_attempts)
    }
}

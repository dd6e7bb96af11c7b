//! Cluster definitions and protocol constants.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Cluster hosting the oracle feed and the reward mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    /// Production cluster
    Mainnet,
    /// Public development cluster; hosts the BTC tip feed
    #[default]
    Devnet,
    /// Local validator with mocked feeds
    Localnet,
}

/// Oracle program (Switchboard v2) on mainnet and localnet:
/// `SW1TCH7qEPTdLsDHRgPuMQjbQxKdH2aBStViMFnt64f`.
const ORACLE_PROGRAM_MAINNET: Identity = Identity::new([
    0x06, 0x88, 0x51, 0xc6, 0x8c, 0x68, 0x32, 0xf0, 0x2f, 0xa5, 0x81, 0xb1, 0xbf, 0x49, 0x1b, 0x77,
    0xca, 0x41, 0x77, 0x6b, 0xa2, 0xb9, 0x88, 0xb5, 0xa6, 0xfa, 0xba, 0x8e, 0xe3, 0xa2, 0xec, 0x90,
]);

/// Oracle program on devnet: `2TfB33aLaneQb5TNVwyDz3jSZXS6jdW2ARw1Dgf84XCG`.
const ORACLE_PROGRAM_DEVNET: Identity = Identity::new([
    0x15, 0xaf, 0xf3, 0x49, 0x2d, 0x44, 0xf5, 0x0c, 0x2a, 0xd5, 0x9c, 0x8d, 0x81, 0xc2, 0x41, 0xb5,
    0x73, 0xca, 0x0b, 0xe1, 0x77, 0x3e, 0xf7, 0x2a, 0x49, 0xce, 0xaf, 0x51, 0xd4, 0xfd, 0xb2, 0x2d,
]);

/// Devnet aggregator publishing the Bitcoin tip:
/// `32acusHT67wNeJMC9SzD5J6uV9QdN38YSXiGWE9yUvYc`.
const BTC_TIP_FEED_DEVNET: Identity = Identity::new([
    0x1e, 0x1e, 0xf7, 0xcc, 0xfa, 0x2f, 0xce, 0x8c, 0xf7, 0x52, 0x8c, 0x68, 0xf8, 0xb2, 0xba, 0x3c,
    0x86, 0x49, 0xc3, 0xfe, 0xe2, 0xee, 0x97, 0xdb, 0xf0, 0xb1, 0xe1, 0x9b, 0x38, 0x1a, 0x55, 0x15,
]);

impl Cluster {
    /// Program expected to own genuine aggregator accounts.
    pub fn oracle_program_id(&self) -> Identity {
        match self {
            Cluster::Mainnet | Cluster::Localnet => ORACLE_PROGRAM_MAINNET,
            Cluster::Devnet => ORACLE_PROGRAM_DEVNET,
        }
    }

    /// Published BTC tip aggregator, if one exists on this cluster.
    pub fn btc_tip_feed(&self) -> Option<Identity> {
        match self {
            Cluster::Devnet => Some(BTC_TIP_FEED_DEVNET),
            Cluster::Mainnet | Cluster::Localnet => None,
        }
    }

    /// JSON-RPC endpoint.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }

    /// Parse cluster from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" | "mainnet-beta" | "main" => Some(Cluster::Mainnet),
            "devnet" | "dev" => Some(Cluster::Devnet),
            "localnet" | "localhost" | "local" => Some(Cluster::Localnet),
            _ => None,
        }
    }

    /// Cluster name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "mainnet",
            Cluster::Devnet => "devnet",
            Cluster::Localnet => "localnet",
        }
    }
}

impl core::fmt::Display for Cluster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Reward tokens minted for each accepted near miss.
pub const TOKEN_PER_NEAR_MISS: u64 = 100;

/// Deposit posted with every submission (0.001 SOL).
pub const SUBMISSION_DEPOSIT: u64 = LAMPORTS_PER_SOL / 1000;

/// Share of a forfeited deposit paid to oracle maintenance.
pub const ORACLE_MAINTENANCE_PERCENTAGE: u8 = 20;

/// Share of a forfeited deposit burned.
pub const BURN_PERCENTAGE: u8 = 30;

/// Share of a forfeited deposit paid to the treasury.
pub const TREASURY_PERCENTAGE: u8 = 50;

/// Default difficulty target, in trailing zero bytes.
pub const DEFAULT_DIFFICULTY_TARGET: u8 = 2;

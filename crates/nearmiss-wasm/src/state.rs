//! Miner state exposed to JavaScript.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Mining statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiningStats {
    /// Total hashes computed.
    pub total_hashes: u64,
    /// Current hash rate (hashes per second).
    pub hash_rate: f64,
    /// Number of near misses found.
    pub near_misses_found: u32,
    /// Next nonce to try.
    pub current_nonce: u32,
    /// Current extra nonce, decimal. JS numbers cannot hold every u64.
    pub extra_nonce: String,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: f64,
    /// Most trailing zero bytes seen in a digest so far.
    pub best_trailing_zeros: u8,
    /// Digest with the most trailing zero bytes (internal byte order).
    pub best_digest: Option<String>,
}

impl MiningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update hash rate based on elapsed time.
    pub fn update_hash_rate(&mut self) {
        if self.elapsed_ms > 0.0 {
            self.hash_rate = (self.total_hashes as f64) / (self.elapsed_ms / 1000.0);
        }
    }

    /// Format hash rate for display.
    pub fn format_hash_rate(&self) -> String {
        if self.hash_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.hash_rate / 1_000_000_000.0)
        } else if self.hash_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.hash_rate / 1_000_000.0)
        } else if self.hash_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.hash_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.hash_rate)
        }
    }

    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        to_js(self)
    }
}

/// Loaded tip, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipInfo {
    /// Oracle round height, when the tip came from a feed account.
    pub height: Option<u64>,
    /// Previous block hash (display order).
    pub prev_hash: String,
    /// Merkle root (display order).
    pub merkle_root: String,
    pub version: u32,
    pub timestamp: u32,
    pub bits: u32,
    /// Required trailing zero bytes.
    pub target: u8,
    /// Mean hashes per near miss at this target.
    pub expected_attempts: f64,
}

impl TipInfo {
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        to_js(self)
    }
}

/// Result of one mining batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiningResultInfo {
    /// Whether a near miss was found.
    pub found: bool,
    /// The winning nonce (if found).
    pub nonce: Option<u32>,
    /// The winning extra nonce, decimal (if found).
    pub extra_nonce: Option<String>,
    /// The winning digest, internal byte order (if found).
    pub digest: Option<String>,
    /// Trailing zero bytes of the winning digest.
    pub trailing_zeros: u8,
    /// Hashes computed in this batch.
    pub hashes_computed: u64,
}

impl MiningResultInfo {
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        to_js(self)
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
}

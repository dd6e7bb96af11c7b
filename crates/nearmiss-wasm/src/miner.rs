//! Mining controller for the WASM miner.

use std::sync::atomic::{AtomicBool, Ordering};

use nearmiss_core::{
    difficulty::{expected_attempts, target_is_valid},
    hash::{digest_hex, hash_to_display_hex, reverse_bytes},
    search, AggregatorAccount, BlockHeader, BlockTip, Cluster, FeedReader, Identity,
    NearMissOutcome, SearchBudget, SearchCursor,
};
use wasm_bindgen::prelude::*;

use crate::state::{MiningResultInfo, MiningStats, TipInfo};

/// The main mining controller.
#[wasm_bindgen]
pub struct NearMissMiner {
    /// Required trailing zero bytes.
    target: u8,
    /// Cluster whose oracle program owns trusted feeds.
    cluster: Cluster,
    /// The tip being mined.
    tip: Option<BlockTip>,
    /// Oracle round height of the tip, if it came from a feed.
    height: Option<u64>,
    /// Next position to try.
    cursor: SearchCursor,
    /// Mining statistics.
    stats: MiningStats,
    /// Start time of mining.
    start_time: f64,
    /// Raised by `stop_mining`, checked when a batch starts.
    stop: AtomicBool,
    /// Most recent near miss.
    winner: Option<(BlockHeader, NearMissOutcome)>,
}

#[wasm_bindgen]
impl NearMissMiner {
    /// Create a new miner instance.
    ///
    /// # Arguments
    /// * `target` - Required trailing zero bytes (1..=32 in practice)
    /// * `cluster` - "mainnet", "devnet" or "localnet"
    #[wasm_bindgen(constructor)]
    pub fn new(target: u8, cluster: &str) -> Result<NearMissMiner, JsValue> {
        if !target_is_valid(target) {
            return Err(JsValue::from_str("Target must be at most 32 bytes"));
        }
        let cluster = Cluster::from_str(cluster).ok_or_else(|| JsValue::from_str("Invalid cluster"))?;

        Ok(NearMissMiner {
            target,
            cluster,
            tip: None,
            height: None,
            cursor: SearchCursor::default(),
            stats: MiningStats::new(),
            start_time: 0.0,
            stop: AtomicBool::new(true),
            winner: None,
        })
    }

    /// Load the tip from raw aggregator account bytes.
    ///
    /// # Arguments
    /// * `account_bytes` - Account data as returned by the RPC node
    /// * `owner` - Base58 program id owning the account
    #[wasm_bindgen]
    pub fn load_feed(&mut self, account_bytes: &[u8], owner: &str) -> Result<JsValue, JsValue> {
        let owner = Identity::from_base58(owner)
            .map_err(|e| JsValue::from_str(&format!("Invalid owner: {}", e)))?;
        let account = AggregatorAccount {
            key: self.cluster.btc_tip_feed().unwrap_or_default(),
            owner,
            data: account_bytes.to_vec(),
        };

        let round = FeedReader::new(self.cluster.oracle_program_id())
            .read_round(&account)
            .map_err(|e| JsValue::from_str(&format!("{}: {}", e.code(), e)))?;

        self.install(round.tip, Some(round.height)).to_js()
    }

    /// Load the tip from explorer-style fields.
    ///
    /// # Arguments
    /// * `prev_hash` - Previous block hash, display order hex
    /// * `merkle_root` - Merkle root, display order hex
    /// * `version` - Block version
    /// * `timestamp` - Block timestamp
    /// * `bits` - Difficulty bits
    #[wasm_bindgen]
    pub fn load_tip(
        &mut self,
        prev_hash: &str,
        merkle_root: &str,
        version: u32,
        timestamp: u32,
        bits: u32,
    ) -> Result<JsValue, JsValue> {
        let tip = BlockTip {
            version,
            prev_hash: parse_display_hash(prev_hash).map_err(|e| JsValue::from_str(&e))?,
            merkle_root: parse_display_hash(merkle_root).map_err(|e| JsValue::from_str(&e))?,
            timestamp,
            bits,
        };
        self.install(tip, None).to_js()
    }

    /// Mine a batch of candidates.
    ///
    /// # Arguments
    /// * `batch_size` - Number of candidates to try in this batch
    ///
    /// # Returns
    /// Whether a near miss was found, with the winning position and digest.
    #[wasm_bindgen]
    pub fn mine_batch(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let tip = self.tip.ok_or_else(|| JsValue::from_str("No tip loaded"))?;

        let report = search(
            &tip,
            self.target,
            self.cursor,
            &SearchBudget::attempts(u64::from(batch_size)),
            &self.stop,
        );

        self.cursor = report.resume;
        self.stats.total_hashes += report.attempts;
        self.stats.current_nonce = self.cursor.nonce;
        self.stats.extra_nonce = self.cursor.extra_nonce.to_string();

        if self.start_time > 0.0 {
            self.stats.elapsed_ms = js_sys::Date::now() - self.start_time;
            self.stats.update_hash_rate();
        }

        let mut info = MiningResultInfo {
            hashes_computed: report.attempts,
            ..MiningResultInfo::default()
        };

        if let Some((header, outcome)) = report.found() {
            info.found = true;
            info.nonce = Some(header.nonce);
            info.extra_nonce = Some(header.extra_nonce.to_string());
            info.digest = Some(digest_hex(&outcome.digest));
            info.trailing_zeros = outcome.trailing_zero_count;

            self.stats.near_misses_found += 1;
            if self.stats.best_digest.is_none() || outcome.trailing_zero_count > self.stats.best_trailing_zeros {
                self.stats.best_trailing_zeros = outcome.trailing_zero_count;
                self.stats.best_digest = Some(digest_hex(&outcome.digest));
            }
            self.winner = Some((header, outcome));
        }

        info.to_js()
    }

    /// Start mining.
    #[wasm_bindgen]
    pub fn start_mining(&mut self) {
        self.stop.store(false, Ordering::Relaxed);
        self.start_time = js_sys::Date::now();
    }

    /// Stop mining. The next batch returns without hashing.
    #[wasm_bindgen]
    pub fn stop_mining(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Check if mining is active.
    #[wasm_bindgen(getter)]
    pub fn is_mining(&self) -> bool {
        !self.stop.load(Ordering::Relaxed)
    }

    /// Get current mining statistics.
    #[wasm_bindgen]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        self.stats.to_js()
    }

    /// Get the formatted hash rate.
    #[wasm_bindgen]
    pub fn get_hash_rate_display(&self) -> String {
        self.stats.format_hash_rate()
    }

    /// Get the 88-byte winning header for submission (if a near miss was found).
    #[wasm_bindgen]
    pub fn get_header_hex(&self) -> Option<String> {
        self.winner.as_ref().map(|(header, _)| hex::encode(header.encode()))
    }

    /// Reset the miner for a new tip.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.tip = None;
        self.height = None;
        self.cursor = SearchCursor::default();
        self.stats = MiningStats::new();
        self.start_time = 0.0;
        self.stop.store(true, Ordering::Relaxed);
        self.winner = None;
    }

    /// Get the difficulty target.
    #[wasm_bindgen(getter)]
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Oracle round height of the loaded tip, if it came from a feed.
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<u64> {
        self.height
    }

    /// Get the cluster name.
    #[wasm_bindgen(getter)]
    pub fn cluster(&self) -> String {
        self.cluster.name().to_string()
    }
}

impl NearMissMiner {
    fn install(&mut self, tip: BlockTip, height: Option<u64>) -> TipInfo {
        self.tip = Some(tip);
        self.height = height;
        self.cursor = SearchCursor::new(0, random_extra_nonce());
        self.stats = MiningStats::new();
        self.stats.extra_nonce = self.cursor.extra_nonce.to_string();
        self.winner = None;

        console_log(&format!(
            "Loaded tip {} (target {} bytes)",
            hash_to_display_hex(&tip.prev_hash),
            self.target
        ));

        TipInfo {
            height,
            prev_hash: hash_to_display_hex(&tip.prev_hash),
            merkle_root: hash_to_display_hex(&tip.merkle_root),
            version: tip.version,
            timestamp: tip.timestamp,
            bits: tip.bits,
            target: self.target,
            expected_attempts: expected_attempts(self.target),
        }
    }
}

/// Parse a display-order hash into internal byte order.
pub(crate) fn parse_display_hash(hex_str: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(hex_str).map_err(|_| "Invalid hash hex".to_string())?;
    let display: [u8; 32] = bytes
        .try_into()
        .map_err(|_| "Hash must be 32 bytes".to_string())?;
    Ok(reverse_bytes(&display))
}

/// Random starting extra nonce so separate tabs search disjoint ranges.
fn random_extra_nonce() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(_) => 0,
    }
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

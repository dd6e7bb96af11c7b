//! Block explorer integration for previewing the live tip.

use nearmiss_core::BlockTip;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::miner::parse_display_hash;

/// Endpoint the oracle job reads the tip from.
const DEFAULT_BASE_URL: &str = "https://blockstream.info/api";

/// Explorer client for fetching the current tip.
#[wasm_bindgen]
pub struct TipApi {
    /// Base URL for the API
    base_url: String,
}

#[wasm_bindgen]
impl TipApi {
    /// Create a client, optionally against a different Esplora instance.
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: Option<String>) -> Self {
        TipApi {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Get the most recent blocks, newest first.
    pub async fn get_tip_blocks(&self) -> Result<JsValue, JsValue> {
        let url = format!("{}/blocks/tip", self.base_url);
        self.fetch_json(&url).await
    }

    /// Get the tip the oracle would publish, in the shape `NearMissMiner::load_tip` takes.
    pub async fn get_tip_preview(&self) -> Result<JsValue, JsValue> {
        let blocks = self.get_tip_blocks().await?;
        let blocks = parse_blocks(&blocks).map_err(|e| JsValue::from_str(&e))?;
        let tip = blocks
            .first()
            .ok_or_else(|| JsValue::from_str("Empty block list"))?;

        // Validate both hashes before handing the strings back.
        tip.to_block_tip().map_err(|e| JsValue::from_str(&e))?;

        let preview = TipPreview {
            height: tip.height,
            prev_hash: tip.previousblockhash.clone(),
            merkle_root: tip.merkle_root.clone(),
            version: tip.version,
            timestamp: tip.timestamp,
            bits: tip.bits,
        };
        serde_wasm_bindgen::to_value(&preview)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }

    /// Get the base URL.
    #[wasm_bindgen(getter)]
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Fetch JSON from a URL.
    async fn fetch_json(&self, url: &str) -> Result<JsValue, JsValue> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(url, &opts)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        if !resp.ok() {
            return Err(JsValue::from_str(&format!(
                "HTTP error: {}",
                resp.status()
            )));
        }

        JsFuture::from(resp.json()?).await
    }
}

/// One entry of the `/blocks/tip` response.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct BlockData {
    pub id: String,
    pub height: u64,
    pub version: u32,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub merkle_root: String,
    pub previousblockhash: String,
}

impl BlockData {
    /// The five header fields the oracle job extracts from this block.
    pub fn to_block_tip(&self) -> Result<BlockTip, String> {
        Ok(BlockTip {
            version: self.version,
            prev_hash: parse_display_hash(&self.previousblockhash)?,
            merkle_root: parse_display_hash(&self.merkle_root)?,
            timestamp: self.timestamp,
            bits: self.bits,
        })
    }
}

#[derive(serde::Serialize, Debug)]
struct TipPreview {
    height: u64,
    prev_hash: String,
    merkle_root: String,
    version: u32,
    timestamp: u32,
    bits: u32,
}

/// Parse the block list from a JS value.
pub fn parse_blocks(js_value: &JsValue) -> Result<Vec<BlockData>, String> {
    serde_wasm_bindgen::from_value(js_value.clone())
        .map_err(|e| format!("Failed to parse block data: {:?}", e))
}

/// Parse the block list from raw response text.
pub fn parse_blocks_json(text: &str) -> Result<Vec<BlockData>, String> {
    serde_json::from_str(text).map_err(|e| format!("Failed to parse block data: {}", e))
}

//! WebAssembly bindings for the near-miss browser miner.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Loading the oracle tip from an aggregator account or explorer fields
//! - Searching nonces in bounded batches
//! - Tracking mining statistics
//! - Previewing the live tip from a public block explorer

use wasm_bindgen::prelude::*;

pub mod api;
pub mod miner;
pub mod state;

// Re-export main types for JS access
pub use api::TipApi;
pub use miner::NearMissMiner;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

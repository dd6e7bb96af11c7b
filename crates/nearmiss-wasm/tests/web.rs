//! Browser tests for the mining controller.

#![cfg(target_arch = "wasm32")]

use nearmiss_core::feed::FeedRound;
use nearmiss_core::{AggregatorAccount, BlockTip, Cluster, Identity};
use nearmiss_wasm::state::MiningResultInfo;
use nearmiss_wasm::NearMissMiner;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const PREV_HASH: &str = "0101010101010101010101010101010101010101010101010101010101010101";
const MERKLE_ROOT: &str = "0202020202020202020202020202020202020202020202020202020202020202";

fn mine(miner: &mut NearMissMiner, batch: u32) -> MiningResultInfo {
    serde_wasm_bindgen::from_value(miner.mine_batch(batch).unwrap()).unwrap()
}

#[wasm_bindgen_test]
fn test_mines_one_byte_near_miss() {
    let mut miner = NearMissMiner::new(1, "localnet").unwrap();
    miner.load_tip(PREV_HASH, MERKLE_ROOT, 0x20000000, 1_700_000_000, 0x1d00ffff).unwrap();
    assert_eq!(miner.height(), None);

    miner.start_mining();
    let result = mine(&mut miner, 100_000);
    assert!(result.found);
    assert_eq!(result.trailing_zeros, 1);
    assert!(result.digest.unwrap().ends_with("00"));
    assert_eq!(miner.get_header_hex().map(|h| h.len()), Some(176));
}

#[wasm_bindgen_test]
fn test_stopped_miner_does_not_hash() {
    let mut miner = NearMissMiner::new(2, "localnet").unwrap();
    miner.load_tip(PREV_HASH, MERKLE_ROOT, 0x20000000, 1_700_000_000, 0x1d00ffff).unwrap();

    miner.start_mining();
    miner.stop_mining();
    let result = mine(&mut miner, 1000);
    assert!(!result.found);
    assert_eq!(result.hashes_computed, 0);
    assert!(!miner.is_mining());
}

#[wasm_bindgen_test]
fn test_load_feed_reports_height() {
    let oracle = Cluster::Localnet.oracle_program_id();
    let round = FeedRound {
        tip: BlockTip {
            version: 0x20000000,
            prev_hash: [0x01u8; 32],
            merkle_root: [0x02u8; 32],
            timestamp: 1_700_000_000,
            bits: 0x1d00ffff,
        },
        height: 870_001,
        round_open_timestamp: 1_700_000_030,
        num_success: 1,
        num_error: 0,
    };
    let account = AggregatorAccount::publish(Identity::new([0x77u8; 32]), oracle, &round);

    let mut miner = NearMissMiner::new(2, "localnet").unwrap();
    assert!(miner.load_feed(&account.data, &Identity::new([0x05u8; 32]).to_base58()).is_err());
    miner.load_feed(&account.data, &oracle.to_base58()).unwrap();
    assert_eq!(miner.height(), Some(870_001));

    miner.reset();
    assert_eq!(miner.height(), None);
}

use nearmiss_core::{trailing_zero_bytes, BlockHeader};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct HeaderFields {
    version: u32,
    prev_hash: String,
    merkle_root: String,
    timestamp: u32,
    bits: u32,
    nonce: u32,
    extra_nonce: u64,
}

#[derive(Debug, Deserialize)]
struct NearMissVector {
    name: String,
    header: HeaderFields,
    serialized_hex: String,
    digest_hex: String,
    trailing_zero_bytes: u8,
}

fn vectors_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("vectors")
        .join("near_miss.json")
}

fn parse_hex32(s: &str) -> [u8; 32] {
    let bytes = hex::decode(s).expect("hex");
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    arr
}

fn load_vectors() -> Vec<NearMissVector> {
    let data = fs::read_to_string(vectors_path()).expect("vector file");
    serde_json::from_str(&data).expect("parse json")
}

#[test]
fn near_miss_header_vectors() {
    let vectors = load_vectors();
    assert!(!vectors.is_empty());

    for v in vectors {
        let header = BlockHeader {
            version: v.header.version,
            prev_hash: parse_hex32(&v.header.prev_hash),
            merkle_root: parse_hex32(&v.header.merkle_root),
            timestamp: v.header.timestamp,
            bits: v.header.bits,
            nonce: v.header.nonce,
            extra_nonce: v.header.extra_nonce,
        };

        let encoded = header.encode();
        assert_eq!(hex::encode(encoded), v.serialized_hex, "serialization mismatch for {}", v.name);

        let decoded = BlockHeader::decode(&encoded).expect("decode");
        assert_eq!(decoded, header, "roundtrip mismatch for {}", v.name);

        let digest = header.hash();
        assert_eq!(hex::encode(digest), v.digest_hex, "digest mismatch for {}", v.name);
        assert_eq!(
            trailing_zero_bytes(&digest),
            v.trailing_zero_bytes,
            "trailing zero mismatch for {}",
            v.name
        );
    }
}

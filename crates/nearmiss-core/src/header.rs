//! Near-miss header candidate and oracle tip encoding.
//!
//! Wire layout (little-endian, 88 bytes):
//!
//! | offset | field        | size |
//! |--------|--------------|------|
//! | 0      | version      | 4    |
//! | 4      | prev_hash    | 32   |
//! | 36     | merkle_root  | 32   |
//! | 68     | timestamp    | 4    |
//! | 72     | bits         | 4    |
//! | 76     | nonce        | 4    |
//! | 80     | extra_nonce  | 8    |
//!
//! The oracle tip payload is the first 76 bytes of the same layout.

use crate::error::{NearMissError, Result};
use crate::hash::double_sha256;

/// Size of an encoded header candidate.
pub const HEADER_SIZE: usize = 88;

/// Size of an encoded oracle tip payload (header without nonce and extra nonce).
pub const TIP_PAYLOAD_SIZE: usize = 76;

/// Block tip fields published by the oracle.
///
/// These are the authoritative values for the first five header fields of
/// every submission made against this tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockTip {
    /// Block version.
    pub version: u32,
    /// Previous block hash (byte order as published by the oracle).
    pub prev_hash: [u8; 32],
    /// Merkle root.
    pub merkle_root: [u8; 32],
    /// Block timestamp (Unix time).
    pub timestamp: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
}

impl BlockTip {
    /// Serialize the tip to its 76-byte payload.
    pub fn encode(&self) -> [u8; TIP_PAYLOAD_SIZE] {
        let mut payload = [0u8; TIP_PAYLOAD_SIZE];
        payload[0..4].copy_from_slice(&self.version.to_le_bytes());
        payload[4..36].copy_from_slice(&self.prev_hash);
        payload[36..68].copy_from_slice(&self.merkle_root);
        payload[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        payload[72..76].copy_from_slice(&self.bits.to_le_bytes());
        payload
    }

    /// Parse a 76-byte tip payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != TIP_PAYLOAD_SIZE {
            return Err(NearMissError::InvalidLayout {
                expected: TIP_PAYLOAD_SIZE,
                actual: payload.len(),
            });
        }

        Ok(BlockTip {
            version: read_u32(payload, 0),
            prev_hash: read_32(payload, 4),
            merkle_root: read_32(payload, 36),
            timestamp: read_u32(payload, 68),
            bits: read_u32(payload, 72),
        })
    }

    /// Build a candidate on top of this tip with miner-chosen nonces.
    pub fn candidate(&self, nonce: u32, extra_nonce: u64) -> BlockHeader {
        BlockHeader {
            version: self.version,
            prev_hash: self.prev_hash,
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            bits: self.bits,
            nonce,
            extra_nonce,
        }
    }
}

/// A near-miss header candidate (88 bytes when encoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: u32,
    /// Miner-chosen nonce.
    pub nonce: u32,
    /// Miner-chosen extra nonce widening the search space.
    pub extra_nonce: u64,
}

impl BlockHeader {
    /// Serialize the header to 88 bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[..TIP_PAYLOAD_SIZE].copy_from_slice(&self.tip().encode());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header[80..88].copy_from_slice(&self.extra_nonce.to_le_bytes());
        header
    }

    /// Parse an 88-byte header. Inverse of [`BlockHeader::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HEADER_SIZE {
            return Err(NearMissError::InvalidLayout {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let tip = BlockTip::decode(&bytes[..TIP_PAYLOAD_SIZE])?;
        Ok(tip.candidate(read_u32(bytes, 76), read_u64(bytes, 80)))
    }

    /// The five oracle-sourced fields of this header.
    pub fn tip(&self) -> BlockTip {
        BlockTip {
            version: self.version,
            prev_hash: self.prev_hash,
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            bits: self.bits,
        }
    }

    /// Compute the header digest (double SHA256 of the 88-byte encoding).
    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.encode())
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

fn read_32(bytes: &[u8], offset: usize) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&bytes[offset..offset + 32]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 0x20000000,
            prev_hash: [0x12u8; 32],
            merkle_root: [0x34u8; 32],
            timestamp: 1700000000,
            bits: 0x17034219,
            nonce: 0xDEADBEEF,
            extra_nonce: 0x0102030405060708,
        }
    }

    #[test]
    fn test_header_serialization() {
        let header = sample_header();
        let serialized = header.encode();

        assert_eq!(serialized.len(), 88);

        // Version (0x20000000 in little-endian)
        assert_eq!(&serialized[0..4], &[0x00, 0x00, 0x00, 0x20]);
        assert_eq!(&serialized[4..36], &[0x12u8; 32][..]);
        assert_eq!(&serialized[36..68], &[0x34u8; 32][..]);
        assert_eq!(&serialized[68..72], &1700000000u32.to_le_bytes());
        assert_eq!(&serialized[72..76], &[0x19, 0x42, 0x03, 0x17]);

        // Nonce (0xDEADBEEF in little-endian)
        assert_eq!(&serialized[76..80], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(&serialized[80..88], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_header_roundtrip() {
        let headers = [
            sample_header(),
            BlockHeader {
                version: 0,
                prev_hash: [0u8; 32],
                merkle_root: [0u8; 32],
                timestamp: 0,
                bits: 0,
                nonce: 0,
                extra_nonce: 0,
            },
            BlockHeader {
                version: u32::MAX,
                prev_hash: [0xFFu8; 32],
                merkle_root: [0xEEu8; 32],
                timestamp: u32::MAX,
                bits: u32::MAX,
                nonce: u32::MAX,
                extra_nonce: u64::MAX,
            },
        ];

        for header in &headers {
            let decoded = BlockHeader::decode(&header.encode()).unwrap();
            assert_eq!(&decoded, header);
        }
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let encoded = sample_header().encode();
        assert_eq!(
            BlockHeader::decode(&encoded[..87]),
            Err(NearMissError::InvalidLayout { expected: 88, actual: 87 })
        );
        assert_eq!(
            BlockTip::decode(&encoded[..]),
            Err(NearMissError::InvalidLayout { expected: 76, actual: 88 })
        );
    }

    #[test]
    fn test_tip_payload_is_header_prefix() {
        let header = sample_header();
        let encoded = header.encode();
        assert_eq!(&header.tip().encode()[..], &encoded[..TIP_PAYLOAD_SIZE]);
        assert_eq!(BlockTip::decode(&encoded[..TIP_PAYLOAD_SIZE]).unwrap(), header.tip());
    }

    #[test]
    fn test_candidate_from_tip() {
        let tip = sample_header().tip();
        let candidate = tip.candidate(7, 9);
        assert_eq!(candidate.tip(), tip);
        assert_eq!(candidate.nonce, 7);
        assert_eq!(candidate.extra_nonce, 9);
    }

    #[test]
    fn test_header_hash_vector() {
        let header = BlockHeader {
            version: 0x20000000,
            prev_hash: [0x01u8; 32],
            merkle_root: [0x02u8; 32],
            timestamp: 1_700_000_000,
            bits: 0x1d00ffff,
            nonce: 0,
            extra_nonce: 0,
        };
        assert_eq!(
            hex::encode(header.hash()),
            "b00856ef46bf77e362c35b525f6b39f2910ed18ca950637f69cf965f495d2107"
        );
    }
}

//! SHA256 double-hashing for header digests.

use sha2::{Digest, Sha256};

/// Double SHA256: SHA256(SHA256(data)).
///
/// Every near-miss digest is produced by this function over the 88-byte
/// candidate encoding.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Reverse the byte order of a 32-byte array.
#[inline]
pub fn reverse_bytes(bytes: &[u8; 32]) -> [u8; 32] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Hex of a digest in internal byte order, so trailing zero bytes show as a `00..` suffix.
pub fn digest_hex(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

/// Hex of a digest in display (reversed) order, the way block explorers print hashes.
pub fn hash_to_display_hex(hash: &[u8; 32]) -> String {
    hex::encode(reverse_bytes(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256() {
        let hash = double_sha256(b"hello");

        let expected = hex::decode(
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        ).unwrap();

        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_double_sha256_is_sha256_twice() {
        let data = [0xABu8; 88];
        assert_eq!(double_sha256(&data), sha256(&sha256(&data)));
    }

    #[test]
    fn test_double_sha256_deterministic() {
        let data = [0x5Au8; 88];
        let first = double_sha256(&data);
        for _ in 0..8 {
            assert_eq!(double_sha256(&data), first);
        }
    }

    #[test]
    fn test_display_hex_reverses() {
        let mut digest = [0u8; 32];
        digest[0] = 0xAA;
        digest[31] = 0x00;
        assert!(digest_hex(&digest).starts_with("aa"));
        assert!(hash_to_display_hex(&digest).ends_with("aa"));
        assert!(hash_to_display_hex(&digest).starts_with("00"));
    }
}

//! Trailing-zero-byte difficulty and the exact-match near-miss rule.
//!
//! Difficulty is measured in whole bytes counted from the END of the digest
//! (internal byte order). That is the displayed hash's leading zeros, but
//! byte-granular rather than bit-granular.
//!
//! A digest is a near miss only when its count EQUALS the target. Digests
//! that overshoot the target are rejected like digests that fall short.

use core::cmp::Ordering;

/// Largest meaningful target: every byte of a 32-byte digest is zero.
pub const MAX_DIFFICULTY_TARGET: u8 = 32;

/// Count consecutive zero bytes from the last byte of the digest backward.
pub fn trailing_zero_bytes(digest: &[u8; 32]) -> u8 {
    digest.iter().rev().take_while(|&&byte| byte == 0).count() as u8
}

/// Exact-match near-miss rule: `trailing_zero_bytes(digest) == target`.
#[inline]
pub fn is_near_miss(digest: &[u8; 32], target: u8) -> bool {
    trailing_zero_bytes(digest) == target
}

/// How a digest relates to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    /// Fewer zero bytes than required.
    Short(u8),
    /// Exactly the required count.
    Exact,
    /// More zero bytes than required; still not a near miss.
    Overshoot(u8),
}

/// Classify a digest against the target.
pub fn grade(digest: &[u8; 32], target: u8) -> Grade {
    let zeros = trailing_zero_bytes(digest);
    match zeros.cmp(&target) {
        Ordering::Less => Grade::Short(zeros),
        Ordering::Equal => Grade::Exact,
        Ordering::Greater => Grade::Overshoot(zeros),
    }
}

/// Check that a target can be met at all.
pub fn target_is_valid(target: u8) -> bool {
    target <= MAX_DIFFICULTY_TARGET
}

/// Probability that a uniformly random digest has exactly `target` trailing zero bytes.
///
/// `(1/256)^target * (255/256)`, except at 32 where no nonzero byte has to follow.
pub fn near_miss_probability(target: u8) -> f64 {
    if !target_is_valid(target) {
        return 0.0;
    }
    let all_zero = pow256_inv(target);
    if target == MAX_DIFFICULTY_TARGET {
        all_zero
    } else {
        all_zero * (255.0 / 256.0)
    }
}

/// Average number of hashes needed to find one near miss.
pub fn expected_attempts(target: u8) -> f64 {
    let p = near_miss_probability(target);
    if p == 0.0 {
        return f64::INFINITY;
    }
    1.0 / p
}

fn pow256_inv(exp: u8) -> f64 {
    let mut value = 1.0f64;
    for _ in 0..exp {
        value /= 256.0;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_with_trailing_zeros(zeros: usize) -> [u8; 32] {
        let mut digest = [0xFFu8; 32];
        for byte in digest.iter_mut().rev().take(zeros) {
            *byte = 0x00;
        }
        digest
    }

    #[test]
    fn test_trailing_zero_bytes() {
        assert_eq!(trailing_zero_bytes(&[0xFF; 32]), 0);
        assert_eq!(trailing_zero_bytes(&[0x00; 32]), 32);

        let mut digest = [0xFF; 32];
        digest[31] = 0x00;
        digest[30] = 0x00;
        digest[29] = 0x01;
        assert_eq!(trailing_zero_bytes(&digest), 2);
    }

    #[test]
    fn test_leading_zeros_are_ignored() {
        let mut digest = [0x00; 32];
        digest[31] = 0x10;
        assert_eq!(trailing_zero_bytes(&digest), 0);
    }

    #[test]
    fn test_byte_granularity() {
        // 0x80 has seven trailing zero bits but is a nonzero byte.
        let mut digest = [0xFF; 32];
        digest[31] = 0x00;
        digest[30] = 0x80;
        assert_eq!(trailing_zero_bytes(&digest), 1);
    }

    #[test]
    fn test_exact_match_asymmetry() {
        let target = 2u8;
        let short = digest_with_trailing_zeros(1);
        let exact = digest_with_trailing_zeros(2);
        let over = digest_with_trailing_zeros(3);

        assert!(!is_near_miss(&short, target));
        assert!(is_near_miss(&exact, target));
        // More zeros than the target is NOT a near miss.
        assert!(!is_near_miss(&over, target));

        assert_eq!(grade(&short, target), Grade::Short(1));
        assert_eq!(grade(&exact, target), Grade::Exact);
        assert_eq!(grade(&over, target), Grade::Overshoot(3));
    }

    #[test]
    fn test_target_zero() {
        assert!(is_near_miss(&digest_with_trailing_zeros(0), 0));
        assert!(!is_near_miss(&digest_with_trailing_zeros(1), 0));
    }

    #[test]
    fn test_target_bounds() {
        assert!(target_is_valid(0));
        assert!(target_is_valid(32));
        assert!(!target_is_valid(33));
        assert!(is_near_miss(&[0u8; 32], 32));
    }

    #[test]
    fn test_expected_attempts() {
        let attempts = expected_attempts(2);
        assert!((attempts - 65536.0 * 256.0 / 255.0).abs() < 1e-6);
        assert_eq!(expected_attempts(33), f64::INFINITY);
        assert!((near_miss_probability(0) - 255.0 / 256.0).abs() < 1e-12);
    }
}

//! PoW validation.

use lattice_crypto::blake2b_64_multi;
use lattice_types::Root;

/// The difficulty a work nonce achieves for `root`.
pub fn work_value(root: &Root, work: u64) -> u64 {
    blake2b_64_multi(&[&work.to_le_bytes(), root.as_bytes()])
}

/// Whether `work` meets `threshold` for `root`.
pub fn validate_work(root: &Root, work: u64, threshold: u64) -> bool {
    work_value(root, work) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_deterministic() {
        let root = Root::new([0xAA; 32]);
        assert_eq!(work_value(&root, 12345), work_value(&root, 12345));
        assert_ne!(work_value(&root, 12345), work_value(&root, 12346));
    }

    #[test]
    fn threshold_boundary() {
        let root = Root::new([0x11; 32]);
        let value = work_value(&root, 42);
        assert!(validate_work(&root, 42, value));
        if value < u64::MAX {
            assert!(!validate_work(&root, 42, value + 1));
        }
    }

    #[test]
    fn zero_threshold_accepts_anything() {
        assert!(validate_work(&Root::ZERO, 0, 0));
    }
}

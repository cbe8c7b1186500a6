use std::hash::{BuildHasher, Hasher};

use ahash::RandomState;

/// Seeded hash family for fingerprints and per-row bucket columns
pub(crate) struct ItemHasher {
    state: RandomState,
}

impl ItemHasher {
    pub fn new(seed: u64) -> Self {
        let state = RandomState::with_seeds(
            seed,
            seed.rotate_left(16) ^ 0x51_7c_c1_b7_27_22_0a_95,
            seed.rotate_left(32) ^ 0x9e_37_79_b9_7f_4a_7c_15,
            seed.rotate_left(48) ^ 0xc2_b2_ae_3d_27_d4_eb_4f,
        );
        Self { state }
    }

    /// Row-independent identity of an item inside a bucket
    #[inline]
    pub fn fingerprint(&self, item: &[u8]) -> u64 {
        let mut hasher = self.state.build_hasher();
        hasher.write(item);
        hasher.finish()
    }

    /// Column of `item` in `row`: hash of the item bytes followed by the
    /// row number as 4 little-endian bytes, reduced modulo `width`.
    #[inline]
    pub fn column(&self, item: &[u8], row: usize, width: usize) -> usize {
        let mut hasher = self.state.build_hasher();
        hasher.write(item);
        hasher.write(&(row as u32).to_le_bytes());
        (hasher.finish() % width as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = ItemHasher::new(123456890);
        let b = ItemHasher::new(123456890);
        assert_eq!(a.fingerprint(b"hello"), b.fingerprint(b"hello"));
        for row in 0..8 {
            assert_eq!(a.column(b"hello", row, 1024), b.column(b"hello", row, 1024));
        }
    }

    #[test]
    fn test_seed_selects_hash_family() {
        let a = ItemHasher::new(1);
        let b = ItemHasher::new(2);
        assert_ne!(a.fingerprint(b"hello"), b.fingerprint(b"hello"));
    }

    #[test]
    fn test_column_within_width() {
        let hasher = ItemHasher::new(7);
        for i in 0..1000u32 {
            let item = i.to_le_bytes();
            for row in 0..6 {
                assert!(hasher.column(&item, row, 13) < 13);
            }
        }
    }

    #[test]
    fn test_rows_spread_columns() {
        // one item should not land on the same column in every row
        let hasher = ItemHasher::new(99);
        let columns: Vec<_> = (0..8).map(|row| hasher.column(b"spread", row, 1 << 20)).collect();
        assert!(columns.windows(2).any(|w| w[0] != w[1]));
    }
}

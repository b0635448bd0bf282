use serde::{Deserialize, Serialize};

use crate::constants::CULLING_LEVELS;

/// How many low-order bits a scalar axis sheds when written.
///
/// Level `L` keeps `bits - floor(bits * L / 4)` bits. A 10-bit axis keeps
/// 10, 8, 5 and 3 bits at levels 0 through 3. Readers must use the same level
/// as the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BitCullingLevel {
    #[default]
    NoCulling = 0,
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
}

/// Every level, in increasing order of culling.
pub const ALL_CULLING_LEVELS: [BitCullingLevel; CULLING_LEVELS] = [
    BitCullingLevel::NoCulling,
    BitCullingLevel::Level1,
    BitCullingLevel::Level2,
    BitCullingLevel::Level3,
];

impl BitCullingLevel {
    /// Slot of this level in per-level tally arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bits kept out of a `bits`-wide field.
    #[inline]
    pub fn kept_bits(self, bits: u32) -> u32 {
        bits - self.dropped_bits(bits)
    }

    /// Low-order bits dropped from a `bits`-wide field.
    #[inline]
    pub fn dropped_bits(self, bits: u32) -> u32 {
        bits * self as u32 / CULLING_LEVELS as u32
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_CULLING_LEVELS.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kept_bits_ten_bit_axis() {
        let kept: Vec<u32> = ALL_CULLING_LEVELS.iter().map(|l| l.kept_bits(10)).collect();
        assert_eq!(kept, vec![10, 8, 5, 3]);
    }

    #[test]
    fn test_kept_bits_never_zero_for_nonzero_width() {
        for bits in 1..=32 {
            for level in ALL_CULLING_LEVELS {
                let kept = level.kept_bits(bits);
                assert!(kept >= 1, "{level:?} culled {bits}-bit axis to nothing");
                assert!(kept <= bits);
            }
        }
    }

    #[test]
    fn test_zero_width_stays_zero() {
        for level in ALL_CULLING_LEVELS {
            assert_eq!(level.kept_bits(0), 0);
        }
    }

    #[test]
    fn test_index_roundtrip() {
        for level in ALL_CULLING_LEVELS {
            assert_eq!(BitCullingLevel::from_index(level.index()), Some(level));
        }
        assert_eq!(BitCullingLevel::from_index(4), None);
    }
}

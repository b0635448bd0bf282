//! Deterministic sample generation for sweep tests.

/// Integer hash (lowbias32) used in place of a random generator.
pub fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Sample `i` mapped to `[0, 1)`.
pub fn unit(i: u32) -> f32 {
    (hash_u32(i) >> 8) as f32 / (1u32 << 24) as f32
}

/// Sample `i` mapped to `[min, max)`.
pub fn in_range(i: u32, min: f32, max: f32) -> f32 {
    min + (max - min) * unit(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_stays_in_range() {
        for i in 0..10_000 {
            let u = unit(i);
            assert!((0.0..1.0).contains(&u), "sample {i} = {u}");
        }
    }

    #[test]
    fn test_hash_spreads_neighbours() {
        assert_ne!(hash_u32(1), hash_u32(2));
        assert_eq!(hash_u32(7), hash_u32(7));
    }
}

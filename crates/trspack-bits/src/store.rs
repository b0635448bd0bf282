//! Bit-addressed access to caller-owned storage.
//!
//! Every store is LSB-first: stream bit `n` lives at bit `n % W` of word
//! `n / W`, where `W` is the word width. A field written at position `p` with
//! width `w` occupies stream bits `p..p + w`, low bit first, and may straddle
//! any number of word boundaries.
//!
//! Buffers are sized by the caller from a prior bit tally, so running past the
//! end is a programming error and panics.

/// Widest field a single read or write may carry.
pub const MAX_FIELD_BITS: u32 = 64;

/// Mask with the low `bits` bits set. `bits` may be 0..=64.
#[inline]
pub const fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Number of bytes needed to hold `bits` bits.
#[inline]
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Number of `word_bits`-wide words needed to hold `bits` bits.
#[inline]
pub const fn words_for_bits(bits: usize, word_bits: usize) -> usize {
    bits.div_ceil(word_bits)
}

/// Storage that can be read and written at arbitrary bit offsets.
pub trait BitStore {
    /// Total number of addressable bits.
    fn bit_capacity(&self) -> usize;

    /// Write the low `bits` bits of `value` starting at `*pos`, then advance
    /// `*pos` by `bits`. Bits above `bits` in `value` are ignored, and the
    /// destination bits are overwritten rather than OR-ed.
    ///
    /// # Panics
    ///
    /// Panics if `bits > 64` or if the field would run past `bit_capacity()`.
    fn write_bits(&mut self, value: u64, bits: u32, pos: &mut usize);

    /// Read `bits` bits starting at `*pos`, then advance `*pos` by `bits`.
    /// A zero-width read returns 0 and leaves `*pos` unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `bits > 64` or if the field would run past `bit_capacity()`.
    fn read_bits(&self, bits: u32, pos: &mut usize) -> u64;
}

#[track_caller]
fn check_span(bits: u32, pos: usize, capacity: usize) {
    assert!(
        bits <= MAX_FIELD_BITS,
        "field width {bits} exceeds {MAX_FIELD_BITS} bits"
    );
    assert!(
        pos + bits as usize <= capacity,
        "{bits}-bit field at bit {pos} overruns {capacity}-bit buffer"
    );
}

macro_rules! impl_word_slice {
    ($($word:ty),*) => {$(
        impl BitStore for [$word] {
            fn bit_capacity(&self) -> usize {
                self.len() * <$word>::BITS as usize
            }

            fn write_bits(&mut self, value: u64, bits: u32, pos: &mut usize) {
                check_span(bits, *pos, self.bit_capacity());
                const W: usize = <$word>::BITS as usize;

                let mut value = value & mask(bits);
                let mut remaining = bits as usize;
                let mut at = *pos;
                while remaining > 0 {
                    let index = at / W;
                    let offset = at % W;
                    let take = remaining.min(W - offset);
                    let field = mask(take as u32) << offset;
                    let word = self[index] as u64;
                    self[index] = ((word & !field) | ((value << offset) & field)) as $word;
                    value = if take >= 64 { 0 } else { value >> take };
                    remaining -= take;
                    at += take;
                }
                *pos = at;
            }

            fn read_bits(&self, bits: u32, pos: &mut usize) -> u64 {
                check_span(bits, *pos, self.bit_capacity());
                const W: usize = <$word>::BITS as usize;

                let mut out = 0u64;
                let mut filled = 0usize;
                let mut at = *pos;
                while filled < bits as usize {
                    let index = at / W;
                    let offset = at % W;
                    let take = (bits as usize - filled).min(W - offset);
                    let chunk = (self[index] as u64 >> offset) & mask(take as u32);
                    out |= chunk << filled;
                    filled += take;
                    at += take;
                }
                *pos = at;
                out
            }
        }
    )*};
}

impl_word_slice!(u8, u16, u32, u64);

/// A single 64-bit register treated as a 64-bit stream.
impl BitStore for u64 {
    fn bit_capacity(&self) -> usize {
        64
    }

    fn write_bits(&mut self, value: u64, bits: u32, pos: &mut usize) {
        check_span(bits, *pos, 64);
        if bits == 0 {
            return;
        }
        let field = mask(bits) << *pos;
        *self = (*self & !field) | ((value << *pos) & field);
        *pos += bits as usize;
    }

    fn read_bits(&self, bits: u32, pos: &mut usize) -> u64 {
        check_span(bits, *pos, 64);
        if bits == 0 {
            return 0;
        }
        let value = (*self >> *pos) & mask(bits);
        *pos += bits as usize;
        value
    }
}

/// A single 128-bit register treated as a 128-bit stream.
impl BitStore for u128 {
    fn bit_capacity(&self) -> usize {
        128
    }

    fn write_bits(&mut self, value: u64, bits: u32, pos: &mut usize) {
        check_span(bits, *pos, 128);
        if bits == 0 {
            return;
        }
        let field = (mask(bits) as u128) << *pos;
        *self = (*self & !field) | (((value as u128) << *pos) & field);
        *pos += bits as usize;
    }

    fn read_bits(&self, bits: u32, pos: &mut usize) -> u64 {
        check_span(bits, *pos, 128);
        if bits == 0 {
            return 0;
        }
        let value = ((*self >> *pos) as u64) & mask(bits);
        *pos += bits as usize;
        value
    }
}

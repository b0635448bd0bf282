use crate::store::{bytes_for_bits, mask, words_for_bits, BitStore};

/// Width of one bitstream fragment.
pub const FRAGMENT_BITS: usize = 64;

/// Number of fragments a bitstream holds.
pub const MAX_FRAGMENTS: usize = 5;

/// Total capacity of a bitstream in bits.
pub const BITSTREAM_CAPACITY: usize = FRAGMENT_BITS * MAX_FRAGMENTS;

/// Fixed-capacity wide register made of 64-bit fragments, with its own write
/// and read cursors.
///
/// Stream bit `n` lives in fragment `n / 64` at bit `n % 64`, so a 130-bit
/// record occupies fragment 0 (bits 0–63), fragment 1 (64–127) and the low two
/// bits of fragment 2. Fields may straddle fragment boundaries.
///
/// 48 bytes, repr(C) so it can be embedded in byte-level packet structs.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Bitstream {
    fragments: [u64; MAX_FRAGMENTS],
    write_pos: u32,
    read_pos: u32,
}

impl Bitstream {
    /// An empty bitstream with both cursors at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a bitstream from received fragments. The write cursor is placed
    /// after the last supplied fragment.
    ///
    /// # Panics
    ///
    /// Panics if more than `MAX_FRAGMENTS` fragments are supplied.
    pub fn from_fragments(fragments: &[u64]) -> Self {
        assert!(
            fragments.len() <= MAX_FRAGMENTS,
            "bitstream holds at most {MAX_FRAGMENTS} fragments, got {}",
            fragments.len()
        );
        let mut stream = Self::new();
        stream.fragments[..fragments.len()].copy_from_slice(fragments);
        stream.write_pos = (fragments.len() * FRAGMENT_BITS) as u32;
        stream
    }

    /// Rebuild a bitstream from bytes produced by [`Bitstream::to_bytes`].
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than the bitstream capacity.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut stream = Self::new();
        for &byte in bytes {
            stream.write(byte as u64, 8);
        }
        stream
    }

    /// Append the low `bits` bits of `value` at the write cursor.
    ///
    /// # Panics
    ///
    /// Panics if `bits > 64` or the bitstream is full.
    pub fn write(&mut self, value: u64, bits: u32) {
        let mut pos = self.write_pos as usize;
        self.fragments[..].write_bits(value, bits, &mut pos);
        self.write_pos = pos as u32;
    }

    /// Read `bits` bits at the read cursor.
    ///
    /// # Panics
    ///
    /// Panics if `bits > 64` or the read would run past the bitstream capacity.
    pub fn read(&mut self, bits: u32) -> u64 {
        let mut pos = self.read_pos as usize;
        let value = self.fragments[..].read_bits(bits, &mut pos);
        self.read_pos = pos as u32;
        value
    }

    /// Append every written bit of `other` at the write cursor.
    pub fn append(&mut self, other: &Bitstream) {
        let mut pos = 0usize;
        let mut remaining = other.bits_written();
        while remaining > 0 {
            let take = remaining.min(FRAGMENT_BITS);
            let chunk = other.fragments[..].read_bits(take as u32, &mut pos);
            self.write(chunk, take as u32);
            remaining -= take;
        }
    }

    /// Fragment `index`, or 0 past the end.
    pub fn fragment(&self, index: usize) -> u64 {
        self.fragments.get(index).copied().unwrap_or(0)
    }

    /// All fragments, including unused trailing ones.
    pub fn fragments(&self) -> &[u64; MAX_FRAGMENTS] {
        &self.fragments
    }

    /// Number of fragments touched by the written bits.
    pub fn fragments_used(&self) -> usize {
        words_for_bits(self.bits_written(), FRAGMENT_BITS)
    }

    /// Bits written so far (the write cursor).
    pub fn bits_written(&self) -> usize {
        self.write_pos as usize
    }

    /// Bits consumed by reads so far (the read cursor).
    pub fn bits_read(&self) -> usize {
        self.read_pos as usize
    }

    /// Bits written but not yet read.
    pub fn bits_remaining(&self) -> usize {
        self.bits_written().saturating_sub(self.bits_read())
    }

    /// Bytes needed to carry the written bits.
    pub fn bytes_used(&self) -> usize {
        bytes_for_bits(self.bits_written())
    }

    /// Rewind the read cursor to the start of the stream.
    pub fn reset_read(&mut self) {
        self.read_pos = 0;
    }

    /// Clear all bits and both cursors.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Copy the used bytes, low byte of fragment 0 first, into `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let used = self.bytes_used();
        out.reserve(used);
        for i in 0..used {
            let fragment = self.fragments[i / 8];
            out.push((fragment >> ((i % 8) * 8)) as u8);
        }
    }

    /// The used bytes as a new vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes_used());
        self.write_to(&mut out);
        out
    }
}

/// Positional access ignores the cursors for reads. Writes extend the write
/// cursor when they land past it.
impl BitStore for Bitstream {
    fn bit_capacity(&self) -> usize {
        BITSTREAM_CAPACITY
    }

    fn write_bits(&mut self, value: u64, bits: u32, pos: &mut usize) {
        self.fragments[..].write_bits(value & mask(bits), bits, pos);
        self.write_pos = self.write_pos.max(*pos as u32);
    }

    fn read_bits(&self, bits: u32, pos: &mut usize) -> u64 {
        self.fragments[..].read_bits(bits, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitstream_size() {
        assert_eq!(std::mem::size_of::<Bitstream>(), 48);
    }

    #[test]
    fn test_write_read_cursor() {
        let mut bs = Bitstream::new();
        bs.write(0x5, 3);
        bs.write(0xABCD, 16);
        bs.write(1, 1);
        assert_eq!(bs.bits_written(), 20);
        assert_eq!(bs.bytes_used(), 3);

        assert_eq!(bs.read(3), 0x5);
        assert_eq!(bs.read(16), 0xABCD);
        assert_eq!(bs.bits_remaining(), 1);
        assert_eq!(bs.read(1), 1);
        assert_eq!(bs.bits_remaining(), 0);
    }

    #[test]
    fn test_130_bits_split_into_three_fragments() {
        let mut bs = Bitstream::new();
        // 13 fields of 10 bits = 130 bits, each field a distinct pattern.
        for i in 0..13u64 {
            bs.write(0x200 | i, 10);
        }
        assert_eq!(bs.bits_written(), 130);
        assert_eq!(bs.fragments_used(), 3);
        // Bits 128..130 are the top two bits of the last field (0x20C).
        assert_eq!(bs.fragment(2), 0x20C >> 8);
        assert_eq!(bs.fragment(3), 0);

        // Rebuilding from the three fragments loses nothing.
        let mut rebuilt = Bitstream::from_fragments(&[bs.fragment(0), bs.fragment(1), bs.fragment(2)]);
        for i in 0..13u64 {
            assert_eq!(rebuilt.read(10), 0x200 | i, "field {i} corrupted");
        }
    }

    #[test]
    fn test_field_straddles_fragment_boundary() {
        let mut bs = Bitstream::new();
        bs.write(0, 60);
        bs.write(0xFF, 8);
        assert_eq!(bs.fragment(0) >> 60, 0xF);
        assert_eq!(bs.fragment(1), 0xF);
        bs.reset_read();
        bs.read(60);
        assert_eq!(bs.read(8), 0xFF);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut bs = Bitstream::new();
        bs.write(0x1_2345_6789, 37);
        bs.write(0x3, 2);
        let bytes = bs.to_bytes();
        assert_eq!(bytes.len(), 5);

        let mut back = Bitstream::from_bytes(&bytes);
        assert_eq!(back.read(37), 0x1_2345_6789);
        assert_eq!(back.read(2), 0x3);
    }

    #[test]
    fn test_write_to_appends() {
        let mut bs = Bitstream::new();
        bs.write(0xBEEF, 16);
        let mut out = vec![0x01];
        bs.write_to(&mut out);
        assert_eq!(out, vec![0x01, 0xEF, 0xBE]);
    }

    #[test]
    fn test_append_concatenates_without_padding() {
        let mut a = Bitstream::new();
        a.write(0x7, 3);
        let mut b = Bitstream::new();
        b.write(0, 64);
        b.write(0x15, 5);

        a.append(&b);
        assert_eq!(a.bits_written(), 72);
        assert_eq!(a.read(3), 0x7);
        assert_eq!(a.read(64), 0);
        assert_eq!(a.read(5), 0x15);
    }

    #[test]
    fn test_positional_write_extends_cursor() {
        let mut bs = Bitstream::new();
        let mut pos = 100;
        bs.write_bits(0x3FF, 10, &mut pos);
        assert_eq!(bs.bits_written(), 110);

        let mut pos = 100;
        assert_eq!(bs.read_bits(10, &mut pos), 0x3FF);
    }

    #[test]
    fn test_pod_bytes_view() {
        let mut bs = Bitstream::new();
        bs.write(0xAA, 8);
        let raw: &[u8] = bytemuck::bytes_of(&bs);
        assert_eq!(raw.len(), 48);
        let back: Bitstream = *bytemuck::from_bytes(raw);
        assert_eq!(back, bs);
    }

    #[test]
    #[should_panic(expected = "overruns")]
    fn test_full_bitstream_panics() {
        let mut bs = Bitstream::new();
        for _ in 0..MAX_FRAGMENTS {
            bs.write(u64::MAX, 64);
        }
        bs.write(1, 1);
    }

    #[test]
    fn test_clear_resets() {
        let mut bs = Bitstream::from_fragments(&[1, 2]);
        assert_eq!(bs.bits_written(), 128);
        bs.clear();
        assert_eq!(bs, Bitstream::new());
    }
}

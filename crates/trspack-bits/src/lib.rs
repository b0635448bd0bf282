//! Bit-level packing primitives shared by every trspack codec layer.
//!
//! Fields of 0–64 bits are placed at arbitrary bit offsets into byte slices,
//! fixed-width word slices, single `u64`/`u128` registers, or a
//! multi-fragment [`Bitstream`]. Layout is LSB-first throughout.

pub mod bitstream;
pub mod store;

pub use bitstream::{Bitstream, BITSTREAM_CAPACITY, FRAGMENT_BITS, MAX_FRAGMENTS};
pub use store::{bytes_for_bits, mask, words_for_bits, BitStore, MAX_FIELD_BITS};

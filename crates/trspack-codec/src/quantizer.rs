//! Scalar quantizer: maps a float in a configured range onto a fixed-width
//! unsigned code and back.
//!
//! Three grids are used depending on configuration:
//!
//! - linear: codes `0..=2^b - 1` span `[min, max]` inclusive.
//! - linear, accurate center: codes `0..=2^b - 2`. The odd code count puts a
//!   code exactly on the midpoint of the range.
//! - cyclic (accurate center on a wrapping range): `2^b` codes span
//!   `[min, max)`. The midpoint is exact and `max` folds onto `min`, which is
//!   what a full-turn angle wants.
//!
//! Half-float axes bypass the grid and store IEEE-754 binary16 bits.

use half::f16;
use serde::{Deserialize, Serialize};
use trspack_bits::BitStore;

use crate::constants::{CULLING_LEVELS, HALF_FLOAT_BITS, MAX_SCALAR_BITS};
use crate::culling::{BitCullingLevel, ALL_CULLING_LEVELS};
use crate::error::CodecError;

/// How the bit width of an axis is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BitSource {
    /// Explicit width, clamped to `0..=32`.
    Bits(u32),
    /// Number of distinct steps across the range. Width is `ceil(log2(steps))`.
    Resolution(u32),
    /// Largest acceptable step size in input units.
    Precision(f32),
    /// IEEE-754 binary16, 16 bits. The range is ignored.
    HalfFloat,
}

fn default_enabled() -> bool {
    true
}

/// Unresolved description of one scalar axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizerConfig {
    pub min: f32,
    pub max: f32,
    pub source: BitSource,
    #[serde(default)]
    pub accurate_center: bool,
    /// The range is a full turn: values past either end wrap around.
    #[serde(default)]
    pub wraps: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl QuantizerConfig {
    pub fn bits(bits: u32, min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            source: BitSource::Bits(bits),
            accurate_center: false,
            wraps: false,
            enabled: true,
        }
    }

    pub fn resolution(steps: u32, min: f32, max: f32) -> Self {
        Self {
            source: BitSource::Resolution(steps),
            ..Self::bits(0, min, max)
        }
    }

    pub fn precision(step: f32, min: f32, max: f32) -> Self {
        Self {
            source: BitSource::Precision(step),
            ..Self::bits(0, min, max)
        }
    }

    pub fn half_float() -> Self {
        Self {
            source: BitSource::HalfFloat,
            ..Self::bits(0, 0.0, 0.0)
        }
    }

    /// An axis that is never sent.
    pub fn disabled() -> Self {
        Self::bits(0, 0.0, 0.0).with_enabled(false)
    }

    pub fn with_accurate_center(mut self, accurate_center: bool) -> Self {
        self.accurate_center = accurate_center;
        self
    }

    pub fn with_wrapping(mut self, wraps: bool) -> Self {
        self.wraps = wraps;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }

    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Resolve the bit source to a width. Disabled axes resolve to 0.
    pub fn resolve_bits(&self) -> Result<u32, CodecError> {
        if !self.enabled {
            return Ok(0);
        }
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(CodecError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        let bits = match self.source {
            BitSource::Bits(bits) => bits.min(MAX_SCALAR_BITS),
            BitSource::Resolution(0) => return Err(CodecError::InvalidResolution),
            BitSource::Resolution(steps) => bits_for_steps(steps as f64),
            BitSource::Precision(step) => {
                if !(step.is_finite() && step > 0.0) {
                    return Err(CodecError::InvalidPrecision(step));
                }
                let range = self.max as f64 - self.min as f64;
                let intervals = (range / step as f64).ceil();
                bits_for_steps(intervals + self.codes_beyond_intervals())
            }
            BitSource::HalfFloat => HALF_FLOAT_BITS,
        };
        Ok(bits)
    }
}

impl QuantizerConfig {
    /// Codes the grid spends beyond its interval count: one for a linear grid,
    /// two with an accurate center, none for a cyclic grid.
    fn codes_beyond_intervals(&self) -> f64 {
        match (self.accurate_center, self.wraps) {
            (true, true) => 0.0,
            (true, false) => 2.0,
            (false, _) => 1.0,
        }
    }
}

/// Smallest width that distinguishes `steps` values.
fn bits_for_steps(steps: f64) -> u32 {
    if steps <= 1.0 {
        0
    } else {
        (steps.log2().ceil() as u32).min(MAX_SCALAR_BITS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grid {
    Constant,
    Linear,
    Cyclic,
    HalfFloat,
}

/// A resolved scalar axis. Immutable; build a new one to change settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    config: QuantizerConfig,
    bits: u32,
    grid: Grid,
    max_code: u32,
    intervals: u64,
    min: f64,
    max: f64,
    range: f64,
    tally: [u32; CULLING_LEVELS],
}

impl Quantizer {
    pub fn new(config: QuantizerConfig) -> Result<Self, CodecError> {
        let bits = config.resolve_bits()?;
        let grid = if bits == 0 {
            Grid::Constant
        } else if config.source == BitSource::HalfFloat {
            Grid::HalfFloat
        } else if config.accurate_center && config.wraps {
            Grid::Cyclic
        } else {
            Grid::Linear
        };

        let codes = 1u64 << bits;
        let (max_code, intervals) = match grid {
            Grid::Constant | Grid::HalfFloat => (codes - 1, 0),
            Grid::Linear if config.accurate_center => (codes - 2, codes - 2),
            Grid::Linear => (codes - 1, codes - 1),
            Grid::Cyclic => (codes - 1, codes),
        };

        let tally = match grid {
            Grid::HalfFloat => [HALF_FLOAT_BITS; CULLING_LEVELS],
            _ => ALL_CULLING_LEVELS.map(|level| level.kept_bits(bits)),
        };

        let (min, max) = (config.min as f64, config.max as f64);
        Ok(Self {
            config,
            bits,
            grid,
            max_code: max_code as u32,
            intervals,
            min,
            max,
            range: max - min,
            tally,
        })
    }

    pub fn config(&self) -> &QuantizerConfig {
        &self.config
    }

    /// Full-resolution width.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Width written at `level`.
    #[inline]
    pub fn bits_at(&self, level: BitCullingLevel) -> u32 {
        self.tally[level.index()]
    }

    pub fn tally(&self) -> [u32; CULLING_LEVELS] {
        self.tally
    }

    /// An axis with zero bits is not sent.
    pub fn is_enabled(&self) -> bool {
        self.bits > 0
    }

    pub fn max_code(&self) -> u32 {
        self.max_code
    }

    pub fn is_half_float(&self) -> bool {
        self.grid == Grid::HalfFloat
    }

    /// Distance between adjacent codes in input units. 0 when the axis has no
    /// grid (constant or half-float).
    pub fn step_size(&self) -> f32 {
        match self.grid {
            Grid::Linear | Grid::Cyclic if self.intervals > 0 => {
                (self.range / self.intervals as f64) as f32
            }
            _ => 0.0,
        }
    }

    /// Codes per input unit.
    pub fn steps_per_unit(&self) -> f32 {
        match self.grid {
            Grid::Linear | Grid::Cyclic if self.range > 0.0 => {
                (self.intervals as f64 / self.range) as f32
            }
            _ => 0.0,
        }
    }

    /// Worst-case round-trip error for in-range input at full resolution.
    pub fn max_error(&self) -> f32 {
        self.step_size() * 0.5
    }

    /// Wrap a value outside `[min, max]` back into the range, treating the
    /// range as periodic. In-range values pass through unchanged.
    pub fn out_of_bounds_correct(&self, value: f32) -> f32 {
        let (min, max) = (self.config.min, self.config.max);
        let range = max - min;
        if range <= 0.0 || (min..=max).contains(&value) {
            return value;
        }
        min + (value - min).rem_euclid(range)
    }

    /// Quantize `value` to a code. Linear axes clamp, cyclic axes wrap.
    pub fn compress(&self, value: f32) -> u32 {
        match self.grid {
            Grid::Constant => 0,
            Grid::HalfFloat => f16::from_f32(value).to_bits() as u32,
            Grid::Linear => {
                if self.intervals == 0 || self.range <= 0.0 {
                    return 0;
                }
                let v = (value as f64).clamp(self.min, self.max);
                let code = ((v - self.min) / self.range * self.intervals as f64).round();
                (code as u64).min(self.max_code as u64) as u32
            }
            Grid::Cyclic => {
                if self.range <= 0.0 {
                    return 0;
                }
                let v = self.out_of_bounds_correct(value) as f64;
                let code = ((v - self.min) / self.range * self.intervals as f64).round();
                ((code as u64) % self.intervals) as u32
            }
        }
    }

    /// Map a code back to a value. Codes past the grid are clamped (linear) or
    /// masked (cyclic).
    pub fn decompress(&self, code: u32) -> f32 {
        match self.grid {
            Grid::Constant => {
                if self.config.enabled {
                    self.config.min
                } else {
                    0.0
                }
            }
            Grid::HalfFloat => f16::from_bits(code as u16).to_f32(),
            Grid::Linear if self.intervals == 0 => ((self.min + self.max) * 0.5) as f32,
            Grid::Linear => self.value_at(code.min(self.max_code)),
            Grid::Cyclic => self.value_at(code & self.max_code),
        }
    }

    fn value_at(&self, code: u32) -> f32 {
        (self.min + self.range * (code as f64 / self.intervals as f64)) as f32
    }

    /// Drop the low-order bits `level` sheds.
    #[inline]
    pub fn cull(&self, code: u32, level: BitCullingLevel) -> u32 {
        code >> (self.bits - self.bits_at(level))
    }

    /// Re-expand a culled code, filling the dropped bits with the midpoint of
    /// the interval they covered.
    pub fn restore(&self, partial: u32, level: BitCullingLevel) -> u32 {
        let dropped = self.bits - self.bits_at(level);
        if dropped == 0 {
            return partial;
        }
        let code = ((partial as u64) << dropped) | (1u64 << (dropped - 1));
        code.min(self.max_code as u64) as u32
    }

    pub fn write_code<B: BitStore + ?Sized>(
        &self,
        code: u32,
        buf: &mut B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) {
        buf.write_bits(self.cull(code, level) as u64, self.bits_at(level), pos);
    }

    /// Compress and write `value`, returning the full-resolution code.
    pub fn write<B: BitStore + ?Sized>(
        &self,
        value: f32,
        buf: &mut B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> u32 {
        let code = self.compress(value);
        self.write_code(code, buf, pos, level);
        code
    }

    pub fn read_code<B: BitStore + ?Sized>(
        &self,
        buf: &B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> u32 {
        let partial = buf.read_bits(self.bits_at(level), pos) as u32;
        self.restore(partial, level)
    }

    pub fn read<B: BitStore + ?Sized>(
        &self,
        buf: &B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> f32 {
        self.decompress(self.read_code(buf, pos, level))
    }
}

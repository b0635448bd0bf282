//! Smallest-three quaternion quantizer.
//!
//! Layout, LSB first: 2-bit index of the dropped (largest) component, then the
//! three remaining components in x, y, z, w order. Each component gets
//! `(w - 2) / 3` bits and the remainder goes to the first ones. The dropped
//! component is always made positive by negating the whole quaternion, so no
//! sign bit is sent.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::Quat;
use serde::{Deserialize, Serialize};
use trspack_bits::BitStore;

use crate::constants::{MAX_ROTATION_BITS, MIN_ROTATION_BITS, ROTATION_INDEX_BITS};
use crate::error::CodecError;
use crate::quantizer::{Quantizer, QuantizerConfig};

/// Total width of a compressed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RotationBudget {
    Disabled,
    Low,
    #[default]
    Medium,
    High,
    Custom(u32),
}

impl RotationBudget {
    pub fn bits(self) -> u32 {
        match self {
            RotationBudget::Disabled => 0,
            RotationBudget::Low => 16,
            RotationBudget::Medium => 32,
            RotationBudget::High => 64,
            RotationBudget::Custom(bits) => bits,
        }
    }

    /// Snap an arbitrary width to the closest preset at or above it.
    pub fn nearest_preset(bits: u32) -> Self {
        if bits > 32 {
            RotationBudget::High
        } else if bits > 16 {
            RotationBudget::Medium
        } else if bits > 8 {
            RotationBudget::Low
        } else {
            RotationBudget::Disabled
        }
    }

    fn validate(self) -> Result<u32, CodecError> {
        let bits = self.bits();
        match self {
            RotationBudget::Custom(_)
                if !(MIN_ROTATION_BITS..=MAX_ROTATION_BITS).contains(&bits) =>
            {
                Err(CodecError::RotationBitsOutOfRange(bits))
            }
            _ => Ok(bits),
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationConfig {
    pub budget: RotationBudget,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            budget: RotationBudget::Medium,
            enabled: true,
        }
    }
}

impl RotationConfig {
    pub fn new(budget: RotationBudget) -> Self {
        Self {
            budget,
            enabled: true,
        }
    }
}

/// With the largest component dropped, the rest of a unit quaternion are
/// bounded by `1/sqrt(2)` in magnitude.
const COMPONENT_LIMIT: f32 = FRAC_1_SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationQuantizer {
    config: RotationConfig,
    bits: u32,
    components: [Quantizer; 3],
}

impl RotationQuantizer {
    pub fn new(config: RotationConfig) -> Result<Self, CodecError> {
        let bits = if config.enabled {
            config.budget.validate()?
        } else {
            0
        };

        let component_bits = component_bits(bits);
        let component = |bits: u32| {
            Quantizer::new(
                QuantizerConfig::bits(bits, -COMPONENT_LIMIT, COMPONENT_LIMIT)
                    .with_accurate_center(true),
            )
        };
        let components = [
            component(component_bits[0])?,
            component(component_bits[1])?,
            component(component_bits[2])?,
        ];

        Ok(Self {
            config,
            bits,
            components,
        })
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn is_enabled(&self) -> bool {
        self.bits > 0
    }

    /// Widths of the three transmitted components.
    pub fn component_bits(&self) -> [u32; 3] {
        self.components.map(|c| c.bits())
    }

    /// Pack `rotation` into the low `bits()` bits of the result. Non-finite or
    /// zero-length input is treated as identity.
    pub fn compress(&self, rotation: Quat) -> u64 {
        if self.bits == 0 {
            return 0;
        }

        let rotation = if rotation.is_finite() && rotation.length_squared() > f32::EPSILON {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        };

        let mut c = rotation.to_array();
        let largest = index_of_largest(&c);
        if c[largest] < 0.0 {
            for v in &mut c {
                *v = -*v;
            }
        }

        let mut packed = 0u64;
        let mut pos = 0;
        packed.write_bits(largest as u64, ROTATION_INDEX_BITS, &mut pos);
        for (quantizer, index) in self.components.iter().zip(kept_indices(largest)) {
            packed.write_bits(quantizer.compress(c[index]) as u64, quantizer.bits(), &mut pos);
        }
        packed
    }

    pub fn decompress(&self, packed: u64) -> Quat {
        if self.bits == 0 {
            return Quat::IDENTITY;
        }

        let mut pos = 0;
        let largest = packed.read_bits(ROTATION_INDEX_BITS, &mut pos) as usize;
        let mut c = [0.0f32; 4];
        let mut sum = 0.0;
        for (quantizer, index) in self.components.iter().zip(kept_indices(largest)) {
            let code = packed.read_bits(quantizer.bits(), &mut pos) as u32;
            let v = quantizer.decompress(code);
            c[index] = v;
            sum += v * v;
        }
        c[largest] = (1.0 - sum).max(0.0).sqrt();
        Quat::from_array(c).normalize()
    }

    pub fn write_packed<B: BitStore + ?Sized>(&self, packed: u64, buf: &mut B, pos: &mut usize) {
        buf.write_bits(packed, self.bits, pos);
    }

    /// Compress and write `rotation`, returning the packed value.
    pub fn write<B: BitStore + ?Sized>(&self, rotation: Quat, buf: &mut B, pos: &mut usize) -> u64 {
        let packed = self.compress(rotation);
        self.write_packed(packed, buf, pos);
        packed
    }

    pub fn read_packed<B: BitStore + ?Sized>(&self, buf: &B, pos: &mut usize) -> u64 {
        buf.read_bits(self.bits, pos)
    }

    pub fn read<B: BitStore + ?Sized>(&self, buf: &B, pos: &mut usize) -> Quat {
        self.decompress(self.read_packed(buf, pos))
    }
}

fn component_bits(total: u32) -> [u32; 3] {
    if total <= ROTATION_INDEX_BITS {
        return [0; 3];
    }
    let payload = total - ROTATION_INDEX_BITS;
    let base = payload / 3;
    let extra = payload % 3;
    [0, 1, 2].map(|i| base + u32::from(i < extra))
}

/// First index of the largest-magnitude component.
fn index_of_largest(c: &[f32; 4]) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if c[i].abs() > c[best].abs() {
            best = i;
        }
    }
    best
}

fn kept_indices(largest: usize) -> [usize; 3] {
    match largest {
        0 => [1, 2, 3],
        1 => [0, 2, 3],
        2 => [0, 1, 3],
        _ => [0, 1, 2],
    }
}

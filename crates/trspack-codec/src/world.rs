//! Position codec sized from an axis-aligned world bounds box.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::DEGENERATE_BOUNDS_SIZE;
use crate::element::{ElementCodec, ElementConfig};
use crate::error::CodecError;
use crate::quantizer::QuantizerConfig;
use crate::target::Space;

/// Axis-aligned box positions are expected to stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when any axis spans one unit or less.
    pub fn is_degenerate(&self) -> bool {
        self.size().min_element() <= DEGENERATE_BOUNDS_SIZE
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Axis config giving at least `resolution` steps per unit on `axis`.
    /// A zero-size axis gets a single code.
    pub fn axis_config(&self, axis: usize, resolution: u32) -> QuantizerConfig {
        let size = self.size()[axis].max(0.0);
        let intervals = (size as f64 * resolution as f64).ceil();
        // n intervals need n + 1 codes.
        let codes = if intervals < 1.0 { 1 } else { intervals as u32 + 1 };
        QuantizerConfig::resolution(codes, self.min[axis], self.max[axis])
    }

    /// World-space position config for these bounds.
    pub fn position_config(&self, resolution: u32) -> ElementConfig {
        ElementConfig {
            x: self.axis_config(0, resolution),
            y: self.axis_config(1, resolution),
            z: self.axis_config(2, resolution),
            ..ElementConfig::position().with_space(Space::World)
        }
    }

    /// Build a world-space position codec with at least `resolution` steps
    /// per unit on every axis.
    pub fn position_codec(&self, resolution: u32) -> Result<ElementCodec, CodecError> {
        if self.is_degenerate() {
            log::warn!(
                "World bounds {} .. {} span one unit or less on some axis",
                self.min,
                self.max
            );
        }
        let codec = ElementCodec::new(self.position_config(resolution))?;
        log::debug!(
            "World position codec at {resolution} steps/unit: {} bits",
            codec.tally()[0]
        );
        Ok(codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culling::BitCullingLevel;
    use crate::element::Element;
    use crate::target::{SimpleTransform, TransformTarget};

    #[test]
    fn test_axis_bits_from_resolution() {
        let bounds = WorldBounds::new(Vec3::new(-512.0, 0.0, -50.0), Vec3::new(512.0, 64.0, 50.0));
        let codec = bounds.position_codec(100).unwrap();
        // 102400 steps -> 17 bits, 6400 -> 13 bits, 10000 -> 14 bits.
        let bits: Vec<u32> = (0..3).map(|a| codec.axis_quantizer(a).unwrap().bits()).collect();
        assert_eq!(bits, vec![17, 13, 14]);
        assert_eq!(codec.tally_bits(BitCullingLevel::NoCulling), 44);
        assert_eq!(codec.space(), Space::World);

        for axis in 0..3 {
            let q = codec.axis_quantizer(axis).unwrap();
            assert!(q.steps_per_unit() >= 100.0, "axis {axis}: {}", q.steps_per_unit());
        }
    }

    #[test]
    fn test_power_of_two_span_meets_resolution() {
        let bounds = WorldBounds::new(Vec3::ZERO, Vec3::splat(16.0));
        let codec = bounds.position_codec(64).unwrap();
        for axis in 0..3 {
            let q = codec.axis_quantizer(axis).unwrap();
            // 1024 intervals do not fit 10 bits.
            assert_eq!(q.bits(), 11);
            assert!(q.steps_per_unit() >= 64.0, "axis {axis}: {}", q.steps_per_unit());
        }

        for (size, resolution) in [(1.5f32, 2u32), (4.0, 64), (64.0, 16), (2.0, 1)] {
            let bounds = WorldBounds::new(Vec3::ZERO, Vec3::splat(size));
            let q = *bounds.position_codec(resolution).unwrap().axis_quantizer(0).unwrap();
            assert!(
                q.steps_per_unit() >= resolution as f32,
                "size {size} at {resolution}/unit: {} bits, {} steps/unit",
                q.bits(),
                q.steps_per_unit()
            );
        }
    }

    #[test]
    fn test_roundtrip_inside_bounds() {
        let bounds = WorldBounds::from_center_size(Vec3::new(100.0, 10.0, -30.0), Vec3::splat(200.0));
        let codec = bounds.position_codec(50).unwrap();
        let point = Vec3::new(150.25, -40.5, 12.75);
        assert!(bounds.contains(point));

        let source = SimpleTransform::new(point, glam::Quat::IDENTITY, Vec3::ONE);
        let compressed = codec.compress_target(&source).unwrap();
        let mut mirror = SimpleTransform::default();
        codec.apply_compressed(&mut mirror, &compressed).unwrap();
        let error = (mirror.position(Space::World) - point).abs().max_element();
        assert!(error <= 0.5 / 50.0 + 1e-4, "off by {error}");
    }

    #[test]
    fn test_degenerate_bounds_still_build() {
        let flat = WorldBounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0));
        assert!(flat.is_degenerate());
        let codec = flat.position_codec(10).unwrap();
        // A zero-height axis needs no bits.
        assert_eq!(codec.axis_quantizer(1).unwrap().bits(), 0);
        let compressed = codec.compress(&Element::Vector(Vec3::new(5.0, 3.0, 5.0))).unwrap();
        assert_eq!(compressed.bits(), 14);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let inverted = WorldBounds::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-10.0, 5.0, 5.0));
        assert!(matches!(
            inverted.position_codec(10),
            Err(CodecError::InvalidRange { .. })
        ));
    }
}

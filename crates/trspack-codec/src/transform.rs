//! Transform codec: position, rotation and scale element codecs packed into one
//! record, in that order.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use trspack_bits::{BitStore, Bitstream, BITSTREAM_CAPACITY, MAX_FRAGMENTS};

use crate::constants::{CULLING_LEVELS, REGISTER_BITS};
use crate::culling::{BitCullingLevel, ALL_CULLING_LEVELS};
use crate::element::{CompressedElement, Element, ElementCodec, ElementConfig, UniformAxes};
use crate::error::CodecError;
use crate::quantizer::QuantizerConfig;
use crate::target::TransformTarget;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    pub position: ElementConfig,
    pub rotation: ElementConfig,
    pub scale: ElementConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::compact()
    }
}

impl TransformConfig {
    /// 64 bits: 32-bit position, pitch and yaw at 12 bits each, and an 8-bit
    /// uniform scale.
    pub fn compact() -> Self {
        let mut rotation = ElementConfig::euler_rotation();
        rotation.x = QuantizerConfig::bits(12, -90.0, 90.0).with_accurate_center(true);
        rotation.z.enabled = false;

        let mut scale = ElementConfig::scale(UniformAxes::XYZ);
        scale.uniform = QuantizerConfig::bits(8, 0.0, 2.0);

        Self {
            position: ElementConfig::position(),
            rotation,
            scale,
        }
    }

    /// Smallest-three rotation instead of Euler angles.
    pub fn precise() -> Self {
        Self {
            position: ElementConfig::position(),
            rotation: ElementConfig::quaternion_rotation(),
            scale: ElementConfig::scale(UniformAxes::XYZ),
        }
    }

    pub fn elements(&self) -> [&ElementConfig; 3] {
        [&self.position, &self.rotation, &self.scale]
    }
}

/// Decompressed transform. `rotation` is Euler degrees or a quaternion,
/// matching the rotation codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub position: Vec3,
    pub rotation: Element,
    pub scale: Vec3,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Element::Quaternion(Quat::IDENTITY),
            scale: Vec3::ONE,
        }
    }
}

impl Matrix {
    pub fn new(position: Vec3, rotation: impl Into<Element>, scale: Vec3) -> Self {
        Self {
            position,
            rotation: rotation.into(),
            scale,
        }
    }
}

/// Compressed elements of one transform plus their packed bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformRecord {
    pub position: CompressedElement,
    pub rotation: CompressedElement,
    pub scale: CompressedElement,
    /// Full-resolution packing of the three elements.
    pub bitstream: Bitstream,
}

impl TransformRecord {
    pub fn bits(&self) -> usize {
        self.bitstream.bits_written()
    }

    /// 64-bit fragment `index` of the packed record, 0 past the end.
    pub fn fragment(&self, index: usize) -> u64 {
        self.bitstream.fragment(index)
    }

    pub fn fragments_used(&self) -> usize {
        self.bitstream.fragments_used()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bitstream.to_bytes()
    }

    /// True when any element differs from `other`.
    pub fn changed_since(&self, other: &TransformRecord) -> bool {
        self.position != other.position
            || self.rotation != other.rotation
            || self.scale != other.scale
    }
}

/// A resolved transform codec. Immutable; use [`TransformCodec::rebuild`] to
/// change configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformCodec {
    config: TransformConfig,
    position: ElementCodec,
    rotation: ElementCodec,
    scale: ElementCodec,
    tally: [u32; CULLING_LEVELS],
}

impl TransformCodec {
    pub fn new(config: TransformConfig) -> Result<Self, CodecError> {
        let position = ElementCodec::new(config.position)?;
        let rotation = ElementCodec::new(config.rotation)?;
        let scale = ElementCodec::new(config.scale)?;

        let tally = ALL_CULLING_LEVELS.map(|level| {
            position.tally_bits(level) + rotation.tally_bits(level) + scale.tally_bits(level)
        });
        if tally[0] as usize > BITSTREAM_CAPACITY {
            return Err(CodecError::BitBudgetExceeded {
                requested: tally[0],
                limit: BITSTREAM_CAPACITY as u32,
            });
        }

        log::debug!("Built transform codec: {} bits, culled {:?}", tally[0], &tally[1..]);

        Ok(Self {
            config,
            position,
            rotation,
            scale,
            tally,
        })
    }

    /// Replace the configuration. On error the codec is left unchanged.
    pub fn rebuild(&mut self, config: TransformConfig) -> Result<(), CodecError> {
        *self = Self::new(config)?;
        Ok(())
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn position(&self) -> &ElementCodec {
        &self.position
    }

    pub fn rotation(&self) -> &ElementCodec {
        &self.rotation
    }

    pub fn scale(&self) -> &ElementCodec {
        &self.scale
    }

    fn elements(&self) -> [&ElementCodec; 3] {
        [&self.position, &self.rotation, &self.scale]
    }

    /// Bits in a record written at `level`.
    #[inline]
    pub fn tally_bits(&self, level: BitCullingLevel) -> u32 {
        self.tally[level.index()]
    }

    pub fn tally(&self) -> [u32; CULLING_LEVELS] {
        self.tally
    }

    /// Sample `target` in each element's configured space.
    pub fn capture<T: TransformTarget + ?Sized>(&self, target: &T) -> Matrix {
        Matrix {
            position: target.position(self.position.space()),
            rotation: self.rotation.sample(target),
            scale: target.scale(self.scale.space()),
        }
    }

    pub fn compress(&self, matrix: &Matrix) -> Result<TransformRecord, CodecError> {
        let position = self.position.compress(&Element::Vector(matrix.position))?;
        let rotation = self.rotation.compress(&matrix.rotation)?;
        let scale = self.scale.compress(&Element::Vector(matrix.scale))?;
        self.pack(position, rotation, scale)
    }

    pub fn compress_target<T: TransformTarget + ?Sized>(
        &self,
        target: &T,
    ) -> Result<TransformRecord, CodecError> {
        self.compress(&self.capture(target))
    }

    fn pack(
        &self,
        position: CompressedElement,
        rotation: CompressedElement,
        scale: CompressedElement,
    ) -> Result<TransformRecord, CodecError> {
        let mut record = TransformRecord {
            position,
            rotation,
            scale,
            bitstream: Bitstream::new(),
        };
        let mut bitstream = Bitstream::new();
        let mut pos = 0;
        self.write(&record, &mut bitstream, &mut pos, BitCullingLevel::NoCulling)?;
        record.bitstream = bitstream;
        Ok(record)
    }

    /// Decompress a record. Disabled elements come back neutral: zero
    /// position, identity rotation, zero scale.
    pub fn decompress(&self, record: &TransformRecord) -> Result<Matrix, CodecError> {
        let position = self.position.decompress(&record.position)?;
        let rotation = self.rotation.decompress(&record.rotation)?;
        let scale = self.scale.decompress(&record.scale)?;
        Ok(Matrix {
            position: position.as_vector().unwrap_or(Vec3::ZERO),
            rotation,
            scale: scale.as_vector().unwrap_or(Vec3::ZERO),
        })
    }

    /// Write the record's elements at `level`, advancing `*pos` by
    /// `tally_bits(level)`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is too small. Size it from [`TransformCodec::tally_bits`].
    pub fn write<B: BitStore + ?Sized>(
        &self,
        record: &TransformRecord,
        buf: &mut B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Result<(), CodecError> {
        self.position.write(&record.position, buf, pos, level)?;
        self.rotation.write(&record.rotation, buf, pos, level)?;
        self.scale.write(&record.scale, buf, pos, level)
    }

    /// Compress `target` and write it at `level`.
    pub fn encode<T: TransformTarget + ?Sized, B: BitStore + ?Sized>(
        &self,
        target: &T,
        buf: &mut B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Result<TransformRecord, CodecError> {
        let record = self.compress_target(target)?;
        self.write(&record, buf, pos, level)?;
        Ok(record)
    }

    /// Read a record written at `level`. The returned bitstream holds the
    /// re-expanded full-resolution packing.
    pub fn read<B: BitStore + ?Sized>(
        &self,
        buf: &B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Result<TransformRecord, CodecError> {
        let position = self.position.read(buf, pos, level);
        let rotation = self.rotation.read(buf, pos, level);
        let scale = self.scale.read(buf, pos, level);
        self.pack(position, rotation, scale)
    }

    pub fn read_and_decompress<B: BitStore + ?Sized>(
        &self,
        buf: &B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Result<Matrix, CodecError> {
        let record = self.read(buf, pos, level)?;
        self.decompress(&record)
    }

    /// Read a record from received 64-bit fragments, fragment 0 first.
    pub fn read_fragments(
        &self,
        fragments: &[u64],
        level: BitCullingLevel,
    ) -> Result<TransformRecord, CodecError> {
        if fragments.len() > MAX_FRAGMENTS {
            return Err(CodecError::BitBudgetExceeded {
                requested: (fragments.len() * 64) as u32,
                limit: BITSTREAM_CAPACITY as u32,
            });
        }
        let stream = Bitstream::from_fragments(fragments);
        let mut pos = 0;
        self.read(&stream, &mut pos, level)
    }

    /// Decompress `record` and apply it to `target`.
    pub fn apply<T: TransformTarget + ?Sized>(
        &self,
        target: &mut T,
        record: &TransformRecord,
    ) -> Result<(), CodecError> {
        let matrix = self.decompress(record)?;
        self.apply_matrix(target, &matrix)
    }

    /// Apply each enabled element of `matrix`. Disabled elements and axes keep
    /// the target's current values.
    pub fn apply_matrix<T: TransformTarget + ?Sized>(
        &self,
        target: &mut T,
        matrix: &Matrix,
    ) -> Result<(), CodecError> {
        let elements = [
            Element::Vector(matrix.position),
            matrix.rotation,
            Element::Vector(matrix.scale),
        ];
        for (codec, element) in self.elements().into_iter().zip(elements) {
            if codec.enabled() {
                codec.apply(target, &element)?;
            }
        }
        Ok(())
    }

    fn check_register(&self, level: BitCullingLevel) -> Result<(), CodecError> {
        let requested = self.tally_bits(level);
        if requested > REGISTER_BITS {
            return Err(CodecError::BitBudgetExceeded {
                requested,
                limit: REGISTER_BITS,
            });
        }
        Ok(())
    }

    /// Pack a record into a single `u64`. Fails above 64 bits.
    pub fn write_register(
        &self,
        record: &TransformRecord,
        level: BitCullingLevel,
    ) -> Result<u64, CodecError> {
        self.check_register(level)?;
        let mut register = 0u64;
        let mut pos = 0;
        self.write(record, &mut register, &mut pos, level)?;
        Ok(register)
    }

    pub fn read_register(
        &self,
        register: u64,
        level: BitCullingLevel,
    ) -> Result<TransformRecord, CodecError> {
        self.check_register(level)?;
        let mut pos = 0;
        self.read(&register, &mut pos, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::euler_to_quat;
    use crate::rotation::RotationBudget;
    use crate::sampling::in_range;
    use crate::target::SimpleTransform;
    use trspack_bits::bytes_for_bits;

    fn codec(config: TransformConfig) -> TransformCodec {
        TransformCodec::new(config).unwrap()
    }

    fn angle_between(a: Quat, b: Quat) -> f32 {
        (2.0 * a.dot(b).abs().min(1.0).acos()).to_degrees()
    }

    /// 32-bit axes on position, 32-bit quaternion, 2-bit uniform scale.
    fn wide_config() -> TransformConfig {
        let mut position = ElementConfig::position();
        for axis in 0..3 {
            *position.axis_mut(axis) = QuantizerConfig::bits(32, -100.0, 100.0);
        }
        let mut scale = ElementConfig::scale(UniformAxes::XYZ);
        scale.uniform = QuantizerConfig::bits(2, 0.0, 3.0);
        TransformConfig {
            position,
            rotation: ElementConfig::quaternion_rotation(),
            scale,
        }
    }

    fn sample_transform(i: u32) -> SimpleTransform {
        SimpleTransform::new(
            Vec3::new(
                in_range(i * 7, -20.0, 20.0),
                in_range(i * 7 + 1, -5.0, 5.0),
                in_range(i * 7 + 2, -5.0, 5.0),
            ),
            euler_to_quat(Vec3::new(
                in_range(i * 7 + 3, -89.0, 89.0),
                in_range(i * 7 + 4, -180.0, 180.0),
                0.0,
            )),
            Vec3::splat(in_range(i * 7 + 5, 0.0, 2.0)),
        )
    }

    #[test]
    fn test_default_is_64_bits() {
        let c = codec(TransformConfig::default());
        assert_eq!(c.tally_bits(BitCullingLevel::NoCulling), 64);
        assert_eq!(c.position().tally_bits(BitCullingLevel::NoCulling), 32);
        assert_eq!(c.rotation().tally_bits(BitCullingLevel::NoCulling), 24);
        assert_eq!(c.scale().tally_bits(BitCullingLevel::NoCulling), 8);

        let record = c.compress_target(&SimpleTransform::default()).unwrap();
        assert_eq!(record.bits(), 64);
        assert_eq!(record.fragments_used(), 1);
    }

    #[test]
    fn test_tally_matches_bits_written_every_level() {
        for config in [TransformConfig::compact(), TransformConfig::precise(), wide_config()] {
            let c = codec(config);
            let t = sample_transform(3);
            for level in ALL_CULLING_LEVELS {
                let mut buf = vec![0u8; bytes_for_bits(c.tally_bits(level) as usize + 5)];
                let mut pos = 5;
                c.encode(&t, &mut buf[..], &mut pos, level).unwrap();
                assert_eq!(pos - 5, c.tally_bits(level) as usize, "{level:?}");

                let mut rpos = 5;
                c.read(&buf[..], &mut rpos, level).unwrap();
                assert_eq!(rpos, pos, "{level:?} read consumed a different width");
            }
        }
    }

    #[test]
    fn test_130_bit_record_spans_three_fragments() {
        let c = codec(wide_config());
        assert_eq!(c.tally_bits(BitCullingLevel::NoCulling), 130);

        let source = SimpleTransform::new(
            Vec3::new(12.5, -40.0, 99.0),
            euler_to_quat(Vec3::new(10.0, 20.0, 30.0)),
            Vec3::splat(2.0),
        );
        let record = c.compress_target(&source).unwrap();
        assert_eq!(record.bits(), 130);
        assert_eq!(record.fragments_used(), 3);
        assert!(record.fragment(2) < 4, "only two bits belong in fragment 2");
        assert_eq!(record.fragment(3), 0);

        let fragments = [record.fragment(0), record.fragment(1), record.fragment(2)];
        let received = c.read_fragments(&fragments, BitCullingLevel::NoCulling).unwrap();
        assert_eq!(received, record);

        let mut mirror = SimpleTransform::default();
        c.apply(&mut mirror, &received).unwrap();
        assert!((mirror.position - source.position).abs().max_element() < 1e-4);
        assert!(angle_between(mirror.rotation, source.rotation) < 1.0);
        assert_eq!(mirror.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_too_many_fragments() {
        let c = codec(TransformConfig::default());
        let result = c.read_fragments(&[0; MAX_FRAGMENTS + 1], BitCullingLevel::NoCulling);
        assert!(matches!(result, Err(CodecError::BitBudgetExceeded { .. })));
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let c = codec(TransformConfig::precise());
        for i in 0..100 {
            let source = sample_transform(i);
            let mut buf = vec![0u8; bytes_for_bits(c.tally_bits(BitCullingLevel::NoCulling) as usize)];
            let mut pos = 0;
            c.encode(&source, &mut buf[..], &mut pos, BitCullingLevel::NoCulling).unwrap();

            let mut rpos = 0;
            let matrix = c.read_and_decompress(&buf[..], &mut rpos, BitCullingLevel::NoCulling).unwrap();
            let mut mirror = SimpleTransform::default();
            c.apply_matrix(&mut mirror, &matrix).unwrap();

            let position_error = (mirror.position - source.position).abs().max_element();
            assert!(position_error < 0.01, "sample {i}: position off by {position_error}");
            let rotation_error = angle_between(mirror.rotation, source.rotation);
            assert!(rotation_error < 1.0, "sample {i}: rotation off by {rotation_error}");
            let scale_error = (mirror.scale - source.scale).abs().max_element();
            assert!(scale_error < 0.002, "sample {i}: scale off by {scale_error}");
        }
    }

    #[test]
    fn test_compact_euler_roundtrip() {
        let c = codec(TransformConfig::compact());
        let source = SimpleTransform::new(
            Vec3::new(1.0, 2.0, 3.0),
            euler_to_quat(Vec3::new(30.0, -120.0, 0.0)),
            Vec3::splat(1.5),
        );
        let record = c.compress_target(&source).unwrap();
        let mut mirror = SimpleTransform::default();
        c.apply(&mut mirror, &record).unwrap();
        let error = angle_between(mirror.rotation, source.rotation);
        assert!(error < 0.5, "rotation off by {error}");
        assert!((mirror.scale - source.scale).abs().max_element() < 0.01);
    }

    #[test]
    fn test_disabled_rotation_leaves_target_alone() {
        let mut config = TransformConfig::default();
        config.rotation = config.rotation.disabled();
        let c = codec(config);
        assert_eq!(c.tally_bits(BitCullingLevel::NoCulling), 40);

        let source = SimpleTransform::new(Vec3::ONE, Quat::from_rotation_x(1.0), Vec3::ONE);
        let record = c.compress_target(&source).unwrap();
        assert_eq!(record.rotation, CompressedElement::Empty);

        let original = Quat::from_rotation_y(0.25);
        let mut mirror = SimpleTransform::new(Vec3::ZERO, original, Vec3::ONE);
        c.apply(&mut mirror, &record).unwrap();
        assert_eq!(mirror.rotation, original);
    }

    #[test]
    fn test_rotation_kind_mismatch() {
        let c = codec(TransformConfig::compact());
        let matrix = Matrix::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
        assert!(matches!(
            c.compress(&matrix),
            Err(CodecError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_register_paths() {
        let c = codec(TransformConfig::default());
        let record = c.compress_target(&sample_transform(9)).unwrap();
        let register = c.write_register(&record, BitCullingLevel::NoCulling).unwrap();
        assert_eq!(register, record.fragment(0));
        assert_eq!(c.read_register(register, BitCullingLevel::NoCulling).unwrap(), record);

        let wide = codec(wide_config());
        let record = wide.compress_target(&sample_transform(9)).unwrap();
        assert_eq!(
            wide.write_register(&record, BitCullingLevel::NoCulling),
            Err(CodecError::BitBudgetExceeded {
                requested: 130,
                limit: 64
            })
        );
    }

    #[test]
    fn test_culled_record_reads_back_close() {
        let c = codec(TransformConfig::precise());
        let source = sample_transform(21);
        let level = BitCullingLevel::Level1;
        let mut buf = [0u64; 2];
        let mut pos = 0;
        c.encode(&source, &mut buf[..], &mut pos, level).unwrap();

        let mut rpos = 0;
        let matrix = c.read_and_decompress(&buf[..], &mut rpos, level).unwrap();
        let position_error = (matrix.position - source.position).abs().max_element();
        assert!(position_error < 0.1, "position off by {position_error}");
        // Rotation is never culled.
        let rotation = matrix.rotation.as_quat().unwrap();
        assert!(angle_between(rotation, source.rotation) < 1.0);
    }

    #[test]
    fn test_change_detection() {
        let c = codec(TransformConfig::default());
        let mut t = SimpleTransform::default();
        let first = c.compress_target(&t).unwrap();
        t.position.x += 0.001;
        let second = c.compress_target(&t).unwrap();
        assert!(!second.changed_since(&first));
        t.position.x += 1.0;
        let third = c.compress_target(&t).unwrap();
        assert!(third.changed_since(&first));
        assert_eq!(third.rotation, first.rotation);
    }

    #[test]
    fn test_rebuild_switches_rotation_kind() {
        let mut c = codec(TransformConfig::compact());
        c.rebuild(TransformConfig::precise()).unwrap();
        assert!(c.rotation().rotation_quantizer().is_some());

        let mut bad = TransformConfig::precise();
        bad.rotation.rotation.budget = RotationBudget::Custom(70);
        assert_eq!(c.rebuild(bad), Err(CodecError::RotationBitsOutOfRange(70)));
        assert_eq!(c.config(), &TransformConfig::precise());
    }
}

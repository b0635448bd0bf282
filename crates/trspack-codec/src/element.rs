//! Element codec: one vector-valued component of a transform (position, Euler
//! rotation, quaternion rotation, scale, or a generic vector) under one
//! configuration.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use trspack_bits::BitStore;

use crate::angles::fold_pitch;
use crate::constants::{CULLING_LEVELS, REGISTER_BITS};
use crate::culling::{BitCullingLevel, ALL_CULLING_LEVELS};
use crate::error::CodecError;
use crate::quantizer::{Quantizer, QuantizerConfig};
use crate::rotation::{RotationConfig, RotationQuantizer};
use crate::target::{Space, TransformTarget};

/// Which scale axes share a single transmitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UniformAxes {
    #[default]
    NonUniform,
    XY,
    XZ,
    YZ,
    XYZ,
}

impl UniformAxes {
    pub fn mask(self) -> AxisMask {
        match self {
            UniformAxes::NonUniform => AxisMask::NONE,
            UniformAxes::XY => AxisMask(0b011),
            UniformAxes::XZ => AxisMask(0b101),
            UniformAxes::YZ => AxisMask(0b110),
            UniformAxes::XYZ => AxisMask::ALL,
        }
    }

    pub fn is_uniform(self) -> bool {
        self != UniformAxes::NonUniform
    }

    /// Axis whose value is sampled for the shared value.
    pub fn source_axis(self) -> usize {
        match self {
            UniformAxes::YZ => 1,
            _ => 0,
        }
    }
}

/// Bit set of axes, X = 1, Y = 2, Z = 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisMask(pub u8);

impl AxisMask {
    pub const NONE: AxisMask = AxisMask(0);
    pub const X: AxisMask = AxisMask(0b001);
    pub const Y: AxisMask = AxisMask(0b010);
    pub const Z: AxisMask = AxisMask(0b100);
    pub const ALL: AxisMask = AxisMask(0b111);

    pub fn from_flags(flags: [bool; 3]) -> Self {
        AxisMask(flags.iter().enumerate().fold(0, |acc, (i, &on)| acc | (u8::from(on) << i)))
    }

    pub fn contains(self, axis: usize) -> bool {
        axis < 3 && self.0 & (1 << axis) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 & 0b111 == 0
    }

    pub fn count(self) -> u32 {
        (self.0 & 0b111).count_ones()
    }

    /// `current` with the axes in this mask replaced from `incoming`.
    pub fn merge(self, current: Vec3, incoming: Vec3) -> Vec3 {
        let mut out = current;
        for axis in 0..3 {
            if self.contains(axis) {
                out[axis] = incoming[axis];
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Position,
    EulerRotation,
    QuaternionRotation,
    Scale(UniformAxes),
    Generic,
}

impl ElementKind {
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Position => "position",
            ElementKind::EulerRotation => "euler rotation",
            ElementKind::QuaternionRotation => "quaternion rotation",
            ElementKind::Scale(_) => "scale",
            ElementKind::Generic => "generic vector",
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, ElementKind::EulerRotation | ElementKind::QuaternionRotation)
    }
}

/// Input to, and output of, an element codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element {
    Vector(Vec3),
    Quaternion(Quat),
}

impl Element {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Element::Vector(_) => "vector",
            Element::Quaternion(_) => "quaternion",
        }
    }

    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            Element::Vector(v) => Some(*v),
            Element::Quaternion(_) => None,
        }
    }

    pub fn as_quat(&self) -> Option<Quat> {
        match self {
            Element::Quaternion(q) => Some(*q),
            Element::Vector(_) => None,
        }
    }
}

impl From<Vec3> for Element {
    fn from(v: Vec3) -> Self {
        Element::Vector(v)
    }
}

impl From<Quat> for Element {
    fn from(q: Quat) -> Self {
        Element::Quaternion(q)
    }
}

/// A quantized value with its full-resolution width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompressedValue {
    pub raw: u64,
    pub bits: u32,
}

impl CompressedValue {
    pub fn new(raw: u64, bits: u32) -> Self {
        Self { raw, bits }
    }
}

/// A compressed element. Compares by value, so a replication layer can skip
/// elements that did not change since the last send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressedElement {
    /// Nothing was sent.
    #[default]
    Empty,
    Axes([CompressedValue; 3]),
    Uniform(CompressedValue),
    Quaternion(CompressedValue),
}

impl CompressedElement {
    /// Full-resolution width of the carried values.
    pub fn bits(&self) -> u32 {
        match self {
            CompressedElement::Empty => 0,
            CompressedElement::Axes(values) => values.iter().map(|v| v.bits).sum(),
            CompressedElement::Uniform(v) | CompressedElement::Quaternion(v) => v.bits,
        }
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            CompressedElement::Empty => "empty",
            CompressedElement::Axes(_) => "per-axis",
            CompressedElement::Uniform(_) => "uniform",
            CompressedElement::Quaternion(_) => "quaternion",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CompressedElement::Empty)
    }
}

/// Unresolved element configuration. Missing fields in a serialized config
/// fall back to the defaults for its `kind` (see [`ElementConfig::for_kind`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialElementConfig")]
pub struct ElementConfig {
    pub kind: ElementKind,
    pub space: Space,
    pub x: QuantizerConfig,
    pub y: QuantizerConfig,
    pub z: QuantizerConfig,
    /// Shared axis for uniform scale.
    pub uniform: QuantizerConfig,
    /// Used by `QuaternionRotation` only.
    pub rotation: RotationConfig,
    /// Euler pitch is limited to `[-90, 90]`; angles past it are folded,
    /// which turns yaw and roll by half a revolution. Folding needs every
    /// Euler axis sent: with roll disabled, a folded record applied to a
    /// target keeps the target's unturned roll. Angles sampled from a
    /// transform never need folding.
    pub half_range_pitch: bool,
}

fn some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn default_kind() -> ElementKind {
    ElementKind::Generic
}

/// Serialized form of [`ElementConfig`] with every field but `kind` optional.
#[derive(Deserialize)]
struct PartialElementConfig {
    #[serde(default = "default_kind")]
    kind: ElementKind,
    #[serde(default, deserialize_with = "some")]
    space: Option<Space>,
    #[serde(default, deserialize_with = "some")]
    x: Option<QuantizerConfig>,
    #[serde(default, deserialize_with = "some")]
    y: Option<QuantizerConfig>,
    #[serde(default, deserialize_with = "some")]
    z: Option<QuantizerConfig>,
    #[serde(default, deserialize_with = "some")]
    uniform: Option<QuantizerConfig>,
    #[serde(default, deserialize_with = "some")]
    rotation: Option<RotationConfig>,
    #[serde(default, deserialize_with = "some")]
    half_range_pitch: Option<bool>,
}

impl From<PartialElementConfig> for ElementConfig {
    fn from(partial: PartialElementConfig) -> Self {
        let base = ElementConfig::for_kind(partial.kind);
        Self {
            kind: partial.kind,
            space: partial.space.unwrap_or(base.space),
            x: partial.x.unwrap_or(base.x),
            y: partial.y.unwrap_or(base.y),
            z: partial.z.unwrap_or(base.z),
            uniform: partial.uniform.unwrap_or(base.uniform),
            rotation: partial.rotation.unwrap_or(base.rotation),
            half_range_pitch: partial.half_range_pitch.unwrap_or(base.half_range_pitch),
        }
    }
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self::generic()
    }
}

impl ElementConfig {
    pub fn position() -> Self {
        Self {
            kind: ElementKind::Position,
            space: Space::Local,
            x: QuantizerConfig::bits(12, -20.0, 20.0),
            y: QuantizerConfig::bits(10, -5.0, 5.0),
            z: QuantizerConfig::bits(10, -5.0, 5.0),
            uniform: QuantizerConfig::disabled(),
            rotation: RotationConfig::default(),
            half_range_pitch: false,
        }
    }

    pub fn generic() -> Self {
        Self {
            kind: ElementKind::Generic,
            ..Self::position()
        }
    }

    pub fn euler_rotation() -> Self {
        let full_turn = |bits| {
            QuantizerConfig::bits(bits, -180.0, 180.0)
                .with_accurate_center(true)
                .with_wrapping(true)
        };
        Self {
            kind: ElementKind::EulerRotation,
            x: QuantizerConfig::bits(10, -90.0, 90.0).with_accurate_center(true),
            y: full_turn(12),
            z: full_turn(10),
            half_range_pitch: true,
            ..Self::position()
        }
    }

    pub fn quaternion_rotation() -> Self {
        Self {
            kind: ElementKind::QuaternionRotation,
            ..Self::euler_rotation()
        }
    }

    pub fn scale(uniform: UniformAxes) -> Self {
        Self {
            kind: ElementKind::Scale(uniform),
            x: QuantizerConfig::bits(12, 0.0, 2.0),
            y: QuantizerConfig::bits(10, 0.0, 2.0),
            z: QuantizerConfig::bits(10, 0.0, 2.0),
            uniform: QuantizerConfig::bits(10, 0.0, 2.0),
            ..Self::position()
        }
    }

    /// Defaults for `kind`.
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Position => Self::position(),
            ElementKind::EulerRotation => Self::euler_rotation(),
            ElementKind::QuaternionRotation => Self::quaternion_rotation(),
            ElementKind::Scale(uniform) => Self::scale(uniform),
            ElementKind::Generic => Self::generic(),
        }
    }

    /// The same element with nothing sent.
    pub fn disabled(mut self) -> Self {
        self.x.enabled = false;
        self.y.enabled = false;
        self.z.enabled = false;
        self.uniform.enabled = false;
        self.rotation.enabled = false;
        self
    }

    pub fn with_space(mut self, space: Space) -> Self {
        self.space = space;
        self
    }

    pub fn axis(&self, axis: usize) -> &QuantizerConfig {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    pub fn axis_mut(&mut self, axis: usize) -> &mut QuantizerConfig {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Layout {
    Axes {
        axes: [Quantizer; 3],
        euler: bool,
        fold_pitch: bool,
    },
    Uniform {
        quantizer: Quantizer,
        axes: UniformAxes,
    },
    Rotation(RotationQuantizer),
}

impl Layout {
    fn bits_at(&self, level: BitCullingLevel) -> u32 {
        match self {
            Layout::Axes { axes, .. } => axes.iter().map(|q| q.bits_at(level)).sum(),
            Layout::Uniform { quantizer, .. } => quantizer.bits_at(level),
            Layout::Rotation(rotation) => rotation.bits(),
        }
    }
}

/// A resolved element codec. Bit widths and per-level tallies are fixed at
/// construction; use [`ElementCodec::rebuild`] to change configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementCodec {
    config: ElementConfig,
    layout: Layout,
    tally: [u32; CULLING_LEVELS],
}

impl ElementCodec {
    pub fn new(config: ElementConfig) -> Result<Self, CodecError> {
        let layout = match config.kind {
            ElementKind::QuaternionRotation => {
                Layout::Rotation(RotationQuantizer::new(config.rotation)?)
            }
            ElementKind::Scale(axes) if axes.is_uniform() => Layout::Uniform {
                quantizer: Quantizer::new(config.uniform)?,
                axes,
            },
            kind => {
                let euler = kind == ElementKind::EulerRotation;
                Layout::Axes {
                    axes: [
                        Quantizer::new(config.x)?,
                        Quantizer::new(config.y)?,
                        Quantizer::new(config.z)?,
                    ],
                    euler,
                    fold_pitch: euler && config.half_range_pitch,
                }
            }
        };
        let tally = ALL_CULLING_LEVELS.map(|level| layout.bits_at(level));

        log::debug!(
            "Built {} codec ({:?} space): {} bits, culled {:?}",
            config.kind.name(),
            config.space,
            tally[0],
            &tally[1..]
        );

        Ok(Self {
            config,
            layout,
            tally,
        })
    }

    /// Replace the configuration. On error the codec is left unchanged.
    pub fn rebuild(&mut self, config: ElementConfig) -> Result<(), CodecError> {
        *self = Self::new(config)?;
        Ok(())
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    pub fn kind(&self) -> ElementKind {
        self.config.kind
    }

    pub fn space(&self) -> Space {
        self.config.space
    }

    /// Bits written at `level`.
    #[inline]
    pub fn tally_bits(&self, level: BitCullingLevel) -> u32 {
        self.tally[level.index()]
    }

    pub fn tally(&self) -> [u32; CULLING_LEVELS] {
        self.tally
    }

    /// True when anything is sent.
    pub fn enabled(&self) -> bool {
        self.tally[0] > 0
    }

    /// Axes that carry data and are written back by [`ElementCodec::apply`].
    pub fn axis_mask(&self) -> AxisMask {
        match &self.layout {
            Layout::Axes { axes, .. } => AxisMask::from_flags(axes.map(|q| q.is_enabled())),
            Layout::Uniform { quantizer, axes } if quantizer.is_enabled() => axes.mask(),
            Layout::Rotation(rotation) if rotation.is_enabled() => AxisMask::ALL,
            _ => AxisMask::NONE,
        }
    }

    /// Resolved quantizer for `axis` of a per-axis layout.
    pub fn axis_quantizer(&self, axis: usize) -> Option<&Quantizer> {
        match &self.layout {
            Layout::Axes { axes, .. } => axes.get(axis),
            _ => None,
        }
    }

    pub fn uniform_quantizer(&self) -> Option<&Quantizer> {
        match &self.layout {
            Layout::Uniform { quantizer, .. } => Some(quantizer),
            _ => None,
        }
    }

    pub fn rotation_quantizer(&self) -> Option<&RotationQuantizer> {
        match &self.layout {
            Layout::Rotation(rotation) => Some(rotation),
            _ => None,
        }
    }

    /// Value the codec decodes when nothing was sent.
    pub fn neutral(&self) -> Element {
        match &self.layout {
            Layout::Rotation(_) => Element::Quaternion(Quat::IDENTITY),
            _ => Element::Vector(Vec3::ZERO),
        }
    }

    fn input_mismatch(&self, element: &Element) -> CodecError {
        CodecError::KindMismatch {
            expected: self.config.kind.name(),
            actual: element.shape_name(),
        }
    }

    fn shape_mismatch(&self, compressed: &CompressedElement) -> CodecError {
        let expected = match &self.layout {
            Layout::Axes { .. } => "per-axis",
            Layout::Uniform { .. } => "uniform",
            Layout::Rotation(_) => "quaternion",
        };
        CodecError::KindMismatch {
            expected,
            actual: compressed.shape_name(),
        }
    }

    /// True when `element` has the shape this codec takes.
    pub fn accepts(&self, element: &Element) -> bool {
        matches!(
            (&self.layout, element),
            (Layout::Rotation(_), Element::Quaternion(_))
                | (Layout::Axes { .. } | Layout::Uniform { .. }, Element::Vector(_))
        )
    }

    /// Quantize `element`. A codec with nothing enabled returns
    /// [`CompressedElement::Empty`].
    pub fn compress(&self, element: &Element) -> Result<CompressedElement, CodecError> {
        if !self.accepts(element) {
            return Err(self.input_mismatch(element));
        }
        if !self.enabled() {
            return Ok(CompressedElement::Empty);
        }
        match (&self.layout, element) {
            (Layout::Rotation(rotation), Element::Quaternion(q)) => {
                Ok(CompressedElement::Quaternion(CompressedValue::new(
                    rotation.compress(*q),
                    rotation.bits(),
                )))
            }
            (Layout::Uniform { quantizer, axes }, Element::Vector(v)) => {
                let code = quantizer.compress(v[axes.source_axis()]);
                Ok(CompressedElement::Uniform(CompressedValue::new(
                    code as u64,
                    quantizer.bits(),
                )))
            }
            (Layout::Axes { axes, euler, fold_pitch: fold }, Element::Vector(v)) => {
                let mut v = *v;
                if *fold {
                    v = fold_pitch(v);
                }
                if *euler {
                    for axis in 0..3 {
                        v[axis] = axes[axis].out_of_bounds_correct(v[axis]);
                    }
                }
                let mut values = [CompressedValue::default(); 3];
                for axis in 0..3 {
                    let q = &axes[axis];
                    values[axis] = CompressedValue::new(q.compress(v[axis]) as u64, q.bits());
                }
                Ok(CompressedElement::Axes(values))
            }
            _ => Err(self.input_mismatch(element)),
        }
    }

    /// Sample the configured component of `target` in the configured space
    /// and compress it.
    pub fn compress_target<T: TransformTarget + ?Sized>(
        &self,
        target: &T,
    ) -> Result<CompressedElement, CodecError> {
        self.compress(&self.sample(target))
    }

    /// The value this codec would compress from `target`.
    pub fn sample<T: TransformTarget + ?Sized>(&self, target: &T) -> Element {
        let space = self.config.space;
        match self.config.kind {
            ElementKind::Position => Element::Vector(target.position(space)),
            ElementKind::EulerRotation => Element::Vector(target.euler_angles(space)),
            ElementKind::QuaternionRotation => Element::Quaternion(target.rotation(space)),
            ElementKind::Scale(_) => Element::Vector(target.scale(space)),
            ElementKind::Generic => {
                log::warn!("Generic element codec sampled a transform; reading position");
                Element::Vector(target.position(space))
            }
        }
    }

    pub fn decompress(&self, compressed: &CompressedElement) -> Result<Element, CodecError> {
        self.expand(compressed)
            .ok_or_else(|| self.shape_mismatch(compressed))
    }

    fn expand(&self, compressed: &CompressedElement) -> Option<Element> {
        match (&self.layout, compressed) {
            (_, CompressedElement::Empty) => Some(self.neutral()),
            (Layout::Rotation(rotation), CompressedElement::Quaternion(value)) => {
                Some(Element::Quaternion(rotation.decompress(value.raw)))
            }
            (Layout::Uniform { quantizer, .. }, CompressedElement::Uniform(value)) => {
                Some(Element::Vector(Vec3::splat(quantizer.decompress(value.raw as u32))))
            }
            (Layout::Axes { axes, .. }, CompressedElement::Axes(values)) => {
                let mut v = Vec3::ZERO;
                for axis in 0..3 {
                    v[axis] = axes[axis].decompress(values[axis].raw as u32);
                }
                Some(Element::Vector(v))
            }
            _ => None,
        }
    }

    /// Write `compressed` at `*pos`, advancing it by `tally_bits(level)`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is too small. Size it from [`ElementCodec::tally_bits`].
    pub fn write<B: BitStore + ?Sized>(
        &self,
        compressed: &CompressedElement,
        buf: &mut B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Result<(), CodecError> {
        match (&self.layout, compressed) {
            (_, CompressedElement::Empty) if !self.enabled() => Ok(()),
            (Layout::Rotation(rotation), CompressedElement::Quaternion(value)) => {
                rotation.write_packed(value.raw, buf, pos);
                Ok(())
            }
            (Layout::Uniform { quantizer, .. }, CompressedElement::Uniform(value)) => {
                quantizer.write_code(value.raw as u32, buf, pos, level);
                Ok(())
            }
            (Layout::Axes { axes, .. }, CompressedElement::Axes(values)) => {
                for (quantizer, value) in axes.iter().zip(values) {
                    quantizer.write_code(value.raw as u32, buf, pos, level);
                }
                Ok(())
            }
            _ => Err(self.shape_mismatch(compressed)),
        }
    }

    /// Compress `element` and write it. Returns the full-resolution record.
    pub fn encode<B: BitStore + ?Sized>(
        &self,
        element: &Element,
        buf: &mut B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Result<CompressedElement, CodecError> {
        let compressed = self.compress(element)?;
        self.write(&compressed, buf, pos, level)?;
        Ok(compressed)
    }

    /// Read a record written at `level`. Culled axes come back re-expanded to
    /// full width.
    pub fn read<B: BitStore + ?Sized>(
        &self,
        buf: &B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> CompressedElement {
        if !self.enabled() {
            return CompressedElement::Empty;
        }
        match &self.layout {
            Layout::Rotation(rotation) => CompressedElement::Quaternion(CompressedValue::new(
                rotation.read_packed(buf, pos),
                rotation.bits(),
            )),
            Layout::Uniform { quantizer, .. } => CompressedElement::Uniform(CompressedValue::new(
                quantizer.read_code(buf, pos, level) as u64,
                quantizer.bits(),
            )),
            Layout::Axes { axes, .. } => {
                let mut values = [CompressedValue::default(); 3];
                for (value, quantizer) in values.iter_mut().zip(axes) {
                    let code = quantizer.read_code(buf, pos, level);
                    *value = CompressedValue::new(code as u64, quantizer.bits());
                }
                CompressedElement::Axes(values)
            }
        }
    }

    pub fn read_and_decompress<B: BitStore + ?Sized>(
        &self,
        buf: &B,
        pos: &mut usize,
        level: BitCullingLevel,
    ) -> Element {
        let compressed = self.read(buf, pos, level);
        self.expand(&compressed).unwrap_or_else(|| self.neutral())
    }

    /// Write the enabled axes of `element` into `target` in the configured
    /// space. Disabled axes keep the target's current value. Scale is always
    /// written as local scale.
    pub fn apply<T: TransformTarget + ?Sized>(
        &self,
        target: &mut T,
        element: &Element,
    ) -> Result<(), CodecError> {
        let space = self.config.space;
        match (&self.layout, element) {
            (Layout::Rotation(rotation), Element::Quaternion(q)) => {
                if rotation.is_enabled() {
                    target.set_rotation(space, *q);
                }
                Ok(())
            }
            (Layout::Rotation(_), Element::Vector(_)) => Err(self.input_mismatch(element)),
            (_, Element::Vector(v)) => {
                let mask = self.axis_mask();
                if mask.is_empty() {
                    return Ok(());
                }
                match self.config.kind {
                    ElementKind::EulerRotation => {
                        let current = target.euler_angles(space);
                        target.set_euler_angles(space, mask.merge(current, *v));
                    }
                    ElementKind::Scale(_) => {
                        let current = target.scale(Space::Local);
                        target.set_local_scale(mask.merge(current, *v));
                    }
                    _ => {
                        let current = target.position(space);
                        target.set_position(space, mask.merge(current, *v));
                    }
                }
                Ok(())
            }
            _ => Err(self.input_mismatch(element)),
        }
    }

    /// Decompress `compressed` and apply it to `target`.
    pub fn apply_compressed<T: TransformTarget + ?Sized>(
        &self,
        target: &mut T,
        compressed: &CompressedElement,
    ) -> Result<(), CodecError> {
        let element = self.decompress(compressed)?;
        self.apply(target, &element)
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

    /// Pack `compressed` into a single `u64`, starting at bit 0.
    pub fn write_register(
        &self,
        compressed: &CompressedElement,
        level: BitCullingLevel,
    ) -> Result<u64, CodecError> {
        self.check_register(level)?;
        let mut register = 0u64;
        let mut pos = 0;
        self.write(compressed, &mut register, &mut pos, level)?;
        Ok(register)
    }

    pub fn read_register(
        &self,
        register: u64,
        level: BitCullingLevel,
    ) -> Result<CompressedElement, CodecError> {
        self.check_register(level)?;
        let mut pos = 0;
        Ok(self.read(&register, &mut pos, level))
    }
}

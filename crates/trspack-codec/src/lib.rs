//! Bit-exact quantization of transforms for network replication.
//!
//! A [`TransformCodec`] packs position, rotation and scale into a fixed-width
//! record whose size is known up front from the configuration. Each element is
//! handled by an [`ElementCodec`], which in turn uses a scalar [`Quantizer`]
//! per axis or a smallest-three [`RotationQuantizer`]. Records can be written
//! into any [`trspack_bits::BitStore`] at an arbitrary bit offset, optionally
//! with low-order bits culled for distant observers.

pub mod angles;
pub mod constants;
pub mod culling;
pub mod element;
pub mod error;
pub mod quantizer;
pub mod rotation;
pub mod target;
pub mod transform;
pub mod world;

#[cfg(test)]
mod sampling;

pub use culling::{BitCullingLevel, ALL_CULLING_LEVELS};
pub use element::{
    AxisMask, CompressedElement, CompressedValue, Element, ElementCodec, ElementConfig,
    ElementKind, UniformAxes,
};
pub use error::CodecError;
pub use quantizer::{BitSource, Quantizer, QuantizerConfig};
pub use rotation::{RotationBudget, RotationConfig, RotationQuantizer};
pub use target::{ParentedTransform, SimpleTransform, Space, TransformTarget};
pub use transform::{Matrix, TransformCodec, TransformConfig, TransformRecord};
pub use world::WorldBounds;

pub use trspack_bits::{BitStore, Bitstream};

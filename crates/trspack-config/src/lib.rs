//! Named transform codec presets loaded from RON or JSON.

pub mod defaults;
pub mod loader;
pub mod preset;
pub mod validator;

use thiserror::Error;
use trspack_codec::{CodecError, TransformCodec};

pub use loader::LoadError;
pub use preset::{Preset, PresetTable, WorldPreset};
pub use validator::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{} preset validation errors", .0.len())]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Build the codec for preset `name` in `table`.
pub fn build_codec(table: &PresetTable, name: &str) -> Result<TransformCodec, ConfigError> {
    let preset = table
        .get(name)
        .ok_or_else(|| LoadError::UnknownPreset(name.to_string()))?;
    let codec = TransformCodec::new(preset.resolved())?;
    log::info!("Preset '{name}': {} bits per record", codec.tally()[0]);
    Ok(codec)
}

/// Parse, validate and build preset `name` from a RON preset list.
pub fn build_codec_from_str(ron_str: &str, name: &str) -> Result<TransformCodec, ConfigError> {
    let table = loader::load_presets_from_str(ron_str)?;
    validator::validate_presets(&table).map_err(ConfigError::Validation)?;
    build_codec(&table, name)
}

use thiserror::Error;
use trspack_codec::TransformConfig;

use crate::preset::{Preset, PresetTable};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse presets RON: {0}")]
    PresetParseError(String),
    #[error("Failed to parse transform config RON: {0}")]
    TransformParseError(String),
    #[error("Failed to parse presets JSON: {0}")]
    JsonParseError(String),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Parse a presets RON string (a list of presets) into a PresetTable.
pub fn load_presets_from_str(ron_str: &str) -> Result<PresetTable, LoadError> {
    let options = ron::Options::default();
    let presets: Vec<Preset> = options
        .from_str(ron_str)
        .map_err(|e| LoadError::PresetParseError(e.to_string()))?;
    Ok(PresetTable { presets })
}

/// Parse a presets JSON string into a PresetTable.
pub fn load_presets_from_json(json_str: &str) -> Result<PresetTable, LoadError> {
    let presets: Vec<Preset> =
        serde_json::from_str(json_str).map_err(|e| LoadError::JsonParseError(e.to_string()))?;
    Ok(PresetTable { presets })
}

/// Parse a single transform config from RON.
pub fn load_transform_config(ron_str: &str) -> Result<TransformConfig, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::TransformParseError(e.to_string()))
}

/// Load and merge multiple preset sources. Later sources come after earlier
/// ones; duplicate names are left for the validator to report.
pub fn load_all_presets(sources: &[&str]) -> Result<PresetTable, LoadError> {
    let mut all_presets = Vec::new();
    for source in sources {
        let table = load_presets_from_str(source)?;
        all_presets.extend(table.presets);
    }
    let names: Vec<&str> = all_presets.iter().map(|p| p.name.as_str()).collect();
    log::info!("Loaded {} presets from {} sources: {:?}", names.len(), sources.len(), names);
    Ok(PresetTable {
        presets: all_presets,
    })
}

/// Serialize a preset table to pretty RON.
pub fn presets_to_ron(table: &PresetTable) -> Result<String, ron::Error> {
    ron::ser::to_string_pretty(&table.presets, ron::ser::PrettyConfig::default())
}

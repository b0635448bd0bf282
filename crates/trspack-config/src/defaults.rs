//! Presets shipped with the crate.

use crate::loader::{load_presets_from_str, LoadError};
use crate::preset::PresetTable;

pub const DEFAULT_PRESETS_RON: &str = include_str!("../../../data/presets/default.ron");

/// Name of the preset used when none is requested.
pub const DEFAULT_PRESET: &str = "compact";

pub fn default_presets() -> Result<PresetTable, LoadError> {
    load_presets_from_str(DEFAULT_PRESETS_RON)
}

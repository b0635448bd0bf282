use serde::{Deserialize, Serialize};
use trspack_codec::{TransformConfig, WorldBounds};

/// Position range derived from world bounds instead of explicit axis configs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPreset {
    pub bounds: WorldBounds,
    /// Minimum steps per unit on every axis.
    pub resolution: u32,
}

/// A named transform codec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub transform: TransformConfig,
    #[serde(default)]
    pub world: Option<WorldPreset>,
}

impl Preset {
    pub fn new(name: impl Into<String>, transform: TransformConfig) -> Self {
        Self {
            name: name.into(),
            transform,
            world: None,
        }
    }

    /// The transform config with world bounds, if any, folded into the
    /// position element.
    pub fn resolved(&self) -> TransformConfig {
        let mut config = self.transform;
        if let Some(world) = &self.world {
            config.position = world.bounds.position_config(world.resolution);
        }
        config
    }
}

/// An ordered collection of presets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetTable {
    pub presets: Vec<Preset>,
}

impl PresetTable {
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

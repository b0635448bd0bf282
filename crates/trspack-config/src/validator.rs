use std::collections::HashSet;

use thiserror::Error;
use trspack_codec::{CodecError, ElementCodec, ElementConfig, ElementKind, TransformCodec};

use crate::preset::{Preset, PresetTable};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Preset with empty name")]
    EmptyName,
    #[error("Duplicate preset '{0}'")]
    DuplicateName(String),
    #[error("Preset '{name}' puts a {kind} element in the {slot} slot")]
    WrongKind {
        name: String,
        slot: &'static str,
        kind: &'static str,
    },
    #[error("Preset '{name}' {slot} element is invalid: {error}")]
    InvalidElement {
        name: String,
        slot: &'static str,
        error: CodecError,
    },
    #[error("Preset '{name}' cannot be built: {error}")]
    InvalidTransform { name: String, error: CodecError },
    #[error("Preset '{name}' has a world resolution of 0")]
    ZeroWorldResolution { name: String },
    #[error("Preset '{name}' world bounds are inverted on axis {axis}")]
    InvertedWorldBounds { name: String, axis: usize },
}

fn slot_accepts(slot: &str, kind: ElementKind) -> bool {
    match slot {
        "position" => matches!(kind, ElementKind::Position | ElementKind::Generic),
        "rotation" => kind.is_rotation(),
        _ => matches!(kind, ElementKind::Scale(_) | ElementKind::Generic),
    }
}

fn validate_element(
    name: &str,
    slot: &'static str,
    config: &ElementConfig,
    errors: &mut Vec<ValidationError>,
) -> bool {
    let mut ok = true;
    if !slot_accepts(slot, config.kind) {
        errors.push(ValidationError::WrongKind {
            name: name.to_string(),
            slot,
            kind: config.kind.name(),
        });
        ok = false;
    }
    if let Err(error) = ElementCodec::new(*config) {
        errors.push(ValidationError::InvalidElement {
            name: name.to_string(),
            slot,
            error,
        });
        ok = false;
    }
    ok
}

fn validate_preset(preset: &Preset, errors: &mut Vec<ValidationError>) {
    let name = preset.name.as_str();

    if let Some(world) = &preset.world {
        if world.resolution == 0 {
            errors.push(ValidationError::ZeroWorldResolution {
                name: name.to_string(),
            });
            return;
        }
        for axis in 0..3 {
            if world.bounds.min[axis] > world.bounds.max[axis] {
                errors.push(ValidationError::InvertedWorldBounds {
                    name: name.to_string(),
                    axis,
                });
                return;
            }
        }
        if world.bounds.is_degenerate() {
            log::warn!("Preset '{name}' has degenerate world bounds");
        }
    }

    let config = preset.resolved();
    let slots = ["position", "rotation", "scale"];
    let mut elements_ok = true;
    for (slot, element) in slots.into_iter().zip(config.elements()) {
        elements_ok &= validate_element(name, slot, element, errors);
    }

    // Only the combined width is left to check once each element resolves.
    if elements_ok {
        if let Err(error) = TransformCodec::new(config) {
            errors.push(ValidationError::InvalidTransform {
                name: name.to_string(),
                error,
            });
        }
    }
}

/// Validate every preset in a table.
pub fn validate_presets(table: &PresetTable) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for preset in &table.presets {
        if preset.name.is_empty() {
            errors.push(ValidationError::EmptyName);
        } else if !seen.insert(preset.name.as_str()) {
            errors.push(ValidationError::DuplicateName(preset.name.clone()));
        }
    }

    for preset in &table.presets {
        validate_preset(preset, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::WorldPreset;
    use glam::Vec3;
    use trspack_codec::{BitSource, RotationBudget, TransformConfig, UniformAxes, WorldBounds};

    fn table(presets: Vec<Preset>) -> PresetTable {
        PresetTable { presets }
    }

    #[test]
    fn test_builtin_shapes_valid() {
        let t = table(vec![
            Preset::new("compact", TransformConfig::compact()),
            Preset::new("precise", TransformConfig::precise()),
        ]);
        assert!(validate_presets(&t).is_ok());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let t = table(vec![
            Preset::new("a", TransformConfig::compact()),
            Preset::new("a", TransformConfig::precise()),
        ]);
        let errors = validate_presets(&t).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateName(n) if n == "a")));
    }

    #[test]
    fn test_empty_name_rejected() {
        let t = table(vec![Preset::new("", TransformConfig::compact())]);
        let errors = validate_presets(&t).unwrap_err();
        assert!(matches!(errors[0], ValidationError::EmptyName));
    }

    #[test]
    fn test_wrong_slot_kind_rejected() {
        let mut config = TransformConfig::compact();
        config.rotation = ElementConfig::position();
        let errors = validate_presets(&table(vec![Preset::new("swapped", config)])).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::WrongKind { slot: "rotation", kind: "position", .. }
        )));
    }

    #[test]
    fn test_invalid_axis_reported_with_slot() {
        let mut config = TransformConfig::compact();
        config.position.y.source = BitSource::Precision(0.0);
        let errors = validate_presets(&table(vec![Preset::new("bad", config)])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidElement {
                slot: "position",
                error: CodecError::InvalidPrecision(_),
                ..
            }
        ));
    }

    #[test]
    fn test_rotation_budget_out_of_range() {
        let mut config = TransformConfig::precise();
        config.rotation.rotation.budget = RotationBudget::Custom(70);
        let errors = validate_presets(&table(vec![Preset::new("wide", config)])).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidElement {
                error: CodecError::RotationBitsOutOfRange(70),
                ..
            }
        )));
    }

    #[test]
    fn test_widest_transform_fits() {
        let mut config = TransformConfig::compact();
        config.rotation = ElementConfig::euler_rotation();
        config.scale = ElementConfig::scale(UniformAxes::NonUniform);
        for element in [&mut config.position, &mut config.rotation, &mut config.scale] {
            for axis in 0..3 {
                let q = element.axis_mut(axis);
                q.source = BitSource::Bits(32);
                q.enabled = true;
            }
        }
        let t = table(vec![Preset::new("widest", config)]);
        assert!(validate_presets(&t).is_ok());
        assert_eq!(TransformCodec::new(config).unwrap().tally()[0], 288);
    }

    #[test]
    fn test_world_preset_checks() {
        let bounds = WorldBounds::new(Vec3::new(-10.0, -10.0, -10.0), Vec3::splat(10.0));
        let mut preset = Preset::new("w", TransformConfig::precise());
        preset.world = Some(WorldPreset {
            bounds,
            resolution: 0,
        });
        let errors = validate_presets(&table(vec![preset.clone()])).unwrap_err();
        assert!(matches!(errors[0], ValidationError::ZeroWorldResolution { .. }));

        preset.world = Some(WorldPreset {
            bounds: WorldBounds::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 1.0)),
            resolution: 10,
        });
        let errors = validate_presets(&table(vec![preset.clone()])).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvertedWorldBounds { axis: 1, .. }
        ));

        preset.world = Some(WorldPreset {
            bounds,
            resolution: 100,
        });
        assert!(validate_presets(&table(vec![preset])).is_ok());
    }
}

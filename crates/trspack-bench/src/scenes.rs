use glam::{Quat, Vec3};
use trspack_codec::angles::euler_to_quat;
use trspack_codec::SimpleTransform;

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    /// Preset name in the built-in preset table.
    pub preset: &'static str,
    pub transform_count: u32,
    pub position_min: [f32; 3],
    pub position_max: [f32; 3],
    pub scale_min: f32,
    pub scale_max: f32,
    /// Generate roll as well as pitch and yaw.
    pub roll: bool,
}

/// Return the standard suite of benchmark scenes.
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: "compact-1K",
            preset: "compact",
            transform_count: 1_000,
            position_min: [-20.0, -5.0, -5.0],
            position_max: [20.0, 5.0, 5.0],
            scale_min: 0.5,
            scale_max: 1.5,
            roll: false,
        },
        SceneConfig {
            name: "compact-10K",
            preset: "compact",
            transform_count: 10_000,
            position_min: [-20.0, -5.0, -5.0],
            position_max: [20.0, 5.0, 5.0],
            scale_min: 0.5,
            scale_max: 1.5,
            roll: false,
        },
        SceneConfig {
            name: "precise-10K",
            preset: "precise",
            transform_count: 10_000,
            position_min: [-20.0, -5.0, -5.0],
            position_max: [20.0, 5.0, 5.0],
            scale_min: 0.5,
            scale_max: 1.5,
            roll: true,
        },
        SceneConfig {
            name: "world-10K",
            preset: "world",
            transform_count: 10_000,
            position_min: [-512.0, -16.0, -512.0],
            position_max: [512.0, 112.0, 512.0],
            scale_min: 0.1,
            scale_max: 4.0,
            roll: true,
        },
    ]
}

fn hash(seed: u32) -> u32 {
    let mut x = seed.wrapping_mul(0x9E37_79B9) ^ 0x5BD1_E995;
    x ^= x >> 16;
    x = x.wrapping_mul(0x7FEB_352D);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846C_A68B);
    x ^= x >> 16;
    x
}

/// Deterministic value in `[min, max)` for draw `index` of transform `i`.
fn draw(i: u32, index: u32, min: f32, max: f32) -> f32 {
    let unit = (hash(i.wrapping_mul(8).wrapping_add(index)) >> 8) as f32 / (1u32 << 24) as f32;
    min + (max - min) * unit
}

/// Generate the scene's transforms. Identical for every run.
pub fn generate_transforms(config: &SceneConfig) -> Vec<SimpleTransform> {
    (0..config.transform_count)
        .map(|i| {
            let position = Vec3::from_array(std::array::from_fn(|axis| {
                draw(i, axis as u32, config.position_min[axis], config.position_max[axis])
            }));
            let pitch = draw(i, 3, -85.0, 85.0);
            let yaw = draw(i, 4, -180.0, 180.0);
            let roll = if config.roll {
                draw(i, 5, -180.0, 180.0)
            } else {
                0.0
            };
            let rotation: Quat = euler_to_quat(Vec3::new(pitch, yaw, roll));
            let scale = Vec3::splat(draw(i, 6, config.scale_min, config.scale_max));
            SimpleTransform::new(position, rotation, scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let scenes = standard_scenes();
        let a = generate_transforms(&scenes[0]);
        let b = generate_transforms(&scenes[0]);
        assert_eq!(a.len(), 1_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_transforms_stay_in_range() {
        for scene in standard_scenes() {
            for t in generate_transforms(&scene).iter().take(500) {
                for axis in 0..3 {
                    assert!(t.position[axis] >= scene.position_min[axis]);
                    assert!(t.position[axis] <= scene.position_max[axis]);
                }
                assert!(t.scale.x >= scene.scale_min && t.scale.x <= scene.scale_max);
                assert!(t.rotation.is_normalized());
            }
        }
    }
}

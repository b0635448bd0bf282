//! Euler-angle conventions shared by the element codec and transform targets.
//!
//! Angles are in degrees, stored as `Vec3(pitch, yaw, roll)` and applied in
//! yaw (Y), pitch (X), roll (Z) order.

use glam::{EulerRot, Quat, Vec3};

/// Rotation from `(pitch, yaw, roll)` degrees.
pub fn euler_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// `(pitch, yaw, roll)` degrees of a rotation. Pitch lands in `[-90, 90]`.
pub fn quat_to_euler(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Wrap an angle into `[-180, 180)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Rewrite `(pitch, yaw, roll)` so pitch lies in `[-90, 90]`, preserving the
/// rotation. Pitch past vertical is reflected and yaw and roll are turned by
/// half a revolution.
pub fn fold_pitch(degrees: Vec3) -> Vec3 {
    let mut pitch = wrap_degrees(degrees.x);
    let mut yaw = degrees.y;
    let mut roll = degrees.z;
    if pitch > 90.0 {
        pitch = 180.0 - pitch;
        yaw += 180.0;
        roll += 180.0;
    } else if pitch < -90.0 {
        pitch = -180.0 - pitch;
        yaw += 180.0;
        roll += 180.0;
    }
    Vec3::new(pitch, wrap_degrees(yaw), wrap_degrees(roll))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.dot(b).abs() > 1.0 - 1e-5
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), -180.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
    }

    #[test]
    fn test_euler_roundtrip() {
        let angles = Vec3::new(30.0, -45.0, 60.0);
        let back = quat_to_euler(euler_to_quat(angles));
        assert!((back - angles).abs().max_element() < 1e-2, "{angles} -> {back}");
    }

    #[test]
    fn test_yaw_only_is_rotation_about_y() {
        let q = euler_to_quat(Vec3::new(0.0, 90.0, 0.0));
        let forward = q * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5, "got {forward}");
    }

    #[test]
    fn test_fold_pitch_preserves_rotation() {
        let cases = [
            Vec3::new(120.0, 30.0, 10.0),
            Vec3::new(-135.0, -170.0, 45.0),
            Vec3::new(179.0, 0.0, 0.0),
            Vec3::new(200.0, 90.0, -90.0),
        ];
        for angles in cases {
            let folded = fold_pitch(angles);
            assert!(
                (-90.0..=90.0).contains(&folded.x),
                "{angles} folded to {folded}"
            );
            assert!(
                same_rotation(euler_to_quat(angles), euler_to_quat(folded)),
                "{angles} folded to a different rotation {folded}"
            );
        }
    }

    #[test]
    fn test_fold_pitch_leaves_half_range_alone() {
        let angles = Vec3::new(45.0, 100.0, -20.0);
        assert_eq!(fold_pitch(angles), angles);
    }
}

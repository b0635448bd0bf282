//! The transform a codec reads from and writes into.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::angles::{euler_to_quat, quat_to_euler};

/// Coordinate space an element is sampled and applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Space {
    #[default]
    Local,
    World,
}

/// Read/write access to an object's position, rotation and scale.
///
/// Scale is only ever written as local scale. Reading it in world space yields
/// the lossy product of the parent chain.
pub trait TransformTarget {
    fn position(&self, space: Space) -> Vec3;
    fn set_position(&mut self, space: Space, position: Vec3);

    fn rotation(&self, space: Space) -> Quat;
    fn set_rotation(&mut self, space: Space, rotation: Quat);

    /// `(pitch, yaw, roll)` in degrees.
    fn euler_angles(&self, space: Space) -> Vec3 {
        quat_to_euler(self.rotation(space))
    }

    fn set_euler_angles(&mut self, space: Space, degrees: Vec3) {
        self.set_rotation(space, euler_to_quat(degrees));
    }

    fn scale(&self, space: Space) -> Vec3;
    fn set_local_scale(&mut self, scale: Vec3);
}

/// A transform with no parent, so local and world space coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for SimpleTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl SimpleTransform {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl TransformTarget for SimpleTransform {
    fn position(&self, _space: Space) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, _space: Space, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self, _space: Space) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, _space: Space, rotation: Quat) {
        self.rotation = rotation;
    }

    fn scale(&self, _space: Space) -> Vec3 {
        self.scale
    }

    fn set_local_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }
}

/// A transform attached to a fixed parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParentedTransform {
    pub parent: SimpleTransform,
    pub local: SimpleTransform,
}

impl ParentedTransform {
    pub fn new(parent: SimpleTransform, local: SimpleTransform) -> Self {
        Self { parent, local }
    }
}

impl TransformTarget for ParentedTransform {
    fn position(&self, space: Space) -> Vec3 {
        match space {
            Space::Local => self.local.position,
            Space::World => self.parent.to_affine().transform_point3(self.local.position),
        }
    }

    fn set_position(&mut self, space: Space, position: Vec3) {
        self.local.position = match space {
            Space::Local => position,
            Space::World => self.parent.to_affine().inverse().transform_point3(position),
        };
    }

    fn rotation(&self, space: Space) -> Quat {
        match space {
            Space::Local => self.local.rotation,
            Space::World => self.parent.rotation * self.local.rotation,
        }
    }

    fn set_rotation(&mut self, space: Space, rotation: Quat) {
        self.local.rotation = match space {
            Space::Local => rotation,
            Space::World => self.parent.rotation.inverse() * rotation,
        };
    }

    fn scale(&self, space: Space) -> Vec3 {
        match space {
            Space::Local => self.local.scale,
            Space::World => self.parent.scale * self.local.scale,
        }
    }

    fn set_local_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
    }
}

use glam::{Mat4, Quat, Vec3};

/// Local or world placement of a node: translation, rotation and per-axis scale.
///
/// The rotation is kept normalized and the scale components non-negative; every
/// constructor and setter enforces that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: normalize_rotation(rotation),
            scale: clamp_scale(scale),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self::new(translation, rotation, Vec3::ONE)
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = normalize_rotation(rotation);
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = clamp_scale(scale);
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vec3::splat(scale));
    }

    /// Places `local` inside this transform's frame.
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * (self.scale * local.translation),
            rotation: normalize_rotation(self.rotation * local.rotation),
            scale: self.scale * local.scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Free-function form of [`Transform::compose`].
pub fn compose(parent: &Transform, local: &Transform) -> Transform {
    parent.compose(local)
}

fn normalize_rotation(rotation: Quat) -> Quat {
    // A zero or non-finite quaternion has no meaningful direction
    if !rotation.is_finite() || rotation.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }

    if rotation.is_normalized() {
        rotation
    } else {
        rotation.normalize()
    }
}

fn clamp_scale(scale: Vec3) -> Vec3 {
    scale.max(Vec3::ZERO)
}

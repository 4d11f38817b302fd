//=========================================================================
// Rig Transform
//=========================================================================
//
// Composed transform of the camera rig and the easing curves used to
// animate between two of them.
//
// Hierarchy:
//   handle ─► orientation ─► eye
//
// The handle carries position and the user tilt, the orientation node
// is reserved for scripted turns, the eye sits at the end of the boom.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{EulerRot, Mat4, Quat, Vec3};

//=== Easing ==============================================================

/// Timing curve for an animated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Maps linear progress `t` in [0, 1] onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

//=== RigTransform ========================================================

/// Snapshot of every node transform in the camera rig.
///
/// Equality is exact: a restored snapshot compares equal to the one that
/// was captured, which is what backward navigation relies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigTransform {
    pub handle: Mat4,
    pub orientation: Mat4,
    pub eye: Mat4,
}

impl RigTransform {
    /// Rig pose at application start: handle raised 60 units, eye 120
    /// units back along +Z.
    pub fn initial() -> Self {
        Self {
            handle: Mat4::from_translation(Vec3::new(0.0, 60.0, 0.0)),
            orientation: Mat4::IDENTITY,
            eye: Mat4::from_translation(Vec3::new(0.0, 0.0, 120.0)),
        }
    }

    //--- Handle -----------------------------------------------------------

    pub fn handle_position(&self) -> Vec3 {
        self.handle.w_axis.truncate()
    }

    pub fn with_handle_position(mut self, position: Vec3) -> Self {
        let (scale, rotation, _) = self.handle.to_scale_rotation_translation();
        self.handle = Mat4::from_scale_rotation_translation(scale, rotation, position);
        self
    }

    /// Moves the handle by `offset`, keeping its rotation.
    pub fn translated(self, offset: Vec3) -> Self {
        let position = self.handle_position() + offset;
        self.with_handle_position(position)
    }

    pub fn handle_euler(&self) -> Vec3 {
        let (_, rotation, _) = self.handle.to_scale_rotation_translation();
        let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
        Vec3::new(x, y, z)
    }

    /// Replaces the handle rotation with pitch/yaw/roll `euler` (radians).
    pub fn with_handle_euler(mut self, euler: Vec3) -> Self {
        let (scale, _, translation) = self.handle.to_scale_rotation_translation();
        let rotation = Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z);
        self.handle = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        self
    }

    //--- Eye --------------------------------------------------------------

    pub fn eye_position(&self) -> Vec3 {
        self.eye.w_axis.truncate()
    }

    pub fn with_eye_position(mut self, position: Vec3) -> Self {
        let (scale, rotation, _) = self.eye.to_scale_rotation_translation();
        self.eye = Mat4::from_scale_rotation_translation(scale, rotation, position);
        self
    }

    pub fn with_eye_euler(mut self, euler: Vec3) -> Self {
        let (scale, _, translation) = self.eye.to_scale_rotation_translation();
        let rotation = Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z);
        self.eye = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        self
    }

    /// World transform of the eye (rendered point of view).
    pub fn eye_world(&self) -> Mat4 {
        self.handle * self.orientation * self.eye
    }

    //--- Interpolation ----------------------------------------------------

    /// Interpolates every rig node: translations and scales linearly,
    /// rotations spherically. `t` is already eased.
    pub fn lerp(&self, target: &Self, t: f32) -> Self {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *target;
        }
        Self {
            handle: lerp_matrix(&self.handle, &target.handle, t),
            orientation: lerp_matrix(&self.orientation, &target.orientation, t),
            eye: lerp_matrix(&self.eye, &target.eye, t),
        }
    }
}

impl Default for RigTransform {
    fn default() -> Self {
        Self::initial()
    }
}

fn lerp_matrix(from: &Mat4, to: &Mat4, t: f32) -> Mat4 {
    let (s0, r0, t0) = from.to_scale_rotation_translation();
    let (s1, r1, t1) = to.to_scale_rotation_translation();
    Mat4::from_scale_rotation_translation(s0.lerp(s1, t), r0.slerp(r1, t), t0.lerp(t1, t))
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Camera Tilt
//=========================================================================
//
// Incremental tilt bookkeeping for Alt-drag. Offsets accumulate across
// gestures; clamping pushes the overshoot back into the bookkeeping so a
// reversed drag responds at once instead of unwinding dead travel.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

//=== Constants ===========================================================

const SCALE: f32 = 0.1 * 0.05;
const MAX_PITCH: f32 = 0.5;
const MIN_PITCH: f32 = -FRAC_PI_2;
const MAX_YAW: f32 = FRAC_PI_4 * 1.5;

//=== CameraTilt ==========================================================

#[derive(Debug, Default)]
pub struct CameraTilt {
    initial: Vec2,
    last: Vec2,
    invert_x: bool,
}

impl CameraTilt {
    pub fn new(invert_x: bool) -> Self {
        Self {
            invert_x,
            ..Self::default()
        }
    }

    /// Starts a new drag from wherever the previous one left off.
    pub fn begin(&mut self) {
        self.initial = self.last;
    }

    pub fn reset(&mut self) {
        self.initial = Vec2::ZERO;
        self.last = Vec2::ZERO;
    }

    /// Returns the handle euler angles (pitch, yaw, roll) for a drag
    /// `offset` from the press location.
    pub fn apply(&mut self, offset: Vec2) -> Vec3 {
        let offset = offset + self.initial;
        let travel = offset - self.last;
        self.last = offset;

        let mut pitch = offset.y * SCALE;
        let mut yaw = offset.x * SCALE;
        if self.invert_x {
            pitch = -pitch;
        }

        if pitch > MAX_PITCH || pitch < MIN_PITCH {
            pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
            self.initial.y -= travel.y;
            self.last.y -= travel.y;
        }
        if yaw.abs() > MAX_YAW {
            yaw = yaw.clamp(-MAX_YAW, MAX_YAW);
            self.initial.x -= travel.x;
            self.last.x -= travel.x;
        }

        Vec3::new(pitch, -yaw, 0.0)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

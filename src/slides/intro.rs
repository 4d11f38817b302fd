//=========================================================================
// Introduction
//=========================================================================
//
// Two beats before the first slide: the logo in the dark with a ship
// flying past under a spot light, then a pull back of the camera. The
// last tap restores the lighting and the default framing.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use super::environment::{AMBIENT_LEVEL, SPOT_ANGLE};
use crate::core::Introduction;
use crate::stage::{
    gray, CameraRig, Easing, Geometry, Light, Node, NodeAction, NodeId, SceneHandle, BLACK,
};

//=== Constants ===========================================================

/// Distance the camera pulls back between beats.
pub const TEXT_Z_SPACING: f32 = 200.0;

const LOGO_SIZE: f32 = 70.0;
const INTRO_SPOT_ANGLE: f32 = 120.0;
const BEAT: Duration = Duration::from_secs(1);
const FLY_BY: Duration = Duration::from_millis(2500);

//=== ReelIntro ===========================================================

#[derive(Debug, Default)]
pub struct ReelIntro {
    group: Option<NodeId>,
}

impl ReelIntro {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_ship(&self, scene: &mut dyn SceneHandle, group: NodeId) {
        let handle = scene.attach_child(
            group,
            Node::new("ship-handle").at(Vec3::new(200.0 - 500.0, 0.0, 200.0 + 30.0 - 50.0)),
        );
        let pivot = scene.attach_child(
            handle,
            Node::new("ship-pivot").with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        );
        let ship = scene.attach_child(
            pivot,
            Node::new("ship")
                .with_geometry(Geometry::Model("ship.dae"))
                .at(Vec3::new(50.0, 30.0, 0.0))
                .with_rotation(Quat::from_rotation_z(FRAC_PI_4 * 0.5)),
        );
        scene.attach_child(ship, Node::new("reactor").with_particles("reactor", 100.0));

        scene.run(
            pivot,
            NodeAction::SpinForever {
                axis: Vec3::Y,
                period: Duration::from_secs(4),
            },
        );
        scene.run(
            handle,
            NodeAction::MoveBy {
                delay: BEAT,
                offset: Vec3::new(500.0, 0.0, 0.0),
                duration: FLY_BY,
                easing: Easing::EaseInOut,
            },
        );
    }
}

impl Introduction for ReelIntro {
    fn setup(&mut self, scene: &mut dyn SceneHandle, camera: &mut dyn CameraRig) {
        scene.set_light(Light::Ambient, BLACK, Duration::ZERO);
        scene.set_light(Light::Spot, BLACK, Duration::ZERO);
        scene.set_light(Light::Spot, gray(1.0), BEAT + FLY_BY);
        scene.set_spot_angle(INTRO_SPOT_ANGLE, Duration::ZERO);

        let group = scene.attach(Node::new("intro"));
        scene.attach_child(
            group,
            Node::new("logo")
                .with_geometry(Geometry::Plane {
                    width: LOGO_SIZE,
                    height: LOGO_SIZE,
                })
                .with_texture("SceneKit.png")
                .at(Vec3::new(200.0, LOGO_SIZE / 2.0, 200.0)),
        );
        self.build_ship(scene, group);
        self.group = Some(group);

        let framing = camera
            .transform()
            .with_eye_position(Vec3::new(200.0, -20.0, 350.0))
            .with_eye_euler(Vec3::new(-FRAC_PI_2 * 0.06, 0.0, 0.0));
        camera.set_transform(framing);
        debug!("Introduction set up");
    }

    fn play_beat(&mut self, beat: u8, _scene: &mut dyn SceneHandle, camera: &mut dyn CameraRig) {
        let current = camera.transform();
        let eye = current.eye_position() - Vec3::new(0.0, 0.0, TEXT_Z_SPACING);
        camera.animate_to(current.with_eye_position(eye), BEAT, Easing::EaseInOut);
        debug!("Introduction beat {} framed", beat);
    }

    fn conclude(&mut self, scene: &mut dyn SceneHandle, camera: &mut dyn CameraRig) {
        scene.set_spot_angle(SPOT_ANGLE, BEAT);
        scene.set_light(Light::Ambient, gray(AMBIENT_LEVEL), BEAT);
        scene.set_light(Light::Spot, gray(1.0), BEAT);

        let framing = camera
            .transform()
            .with_eye_position(Vec3::new(0.0, 0.0, 120.0))
            .with_eye_euler(Vec3::ZERO);
        camera.animate_to(framing, BEAT, Easing::EaseInOut);
    }

    fn teardown(&mut self, scene: &mut dyn SceneHandle) {
        if let Some(group) = self.group.take() {
            scene.detach(group);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::stage::{RigTransform, Stage};

    #[test]
    fn setup_darkens_and_frames_the_logo() {
        let mut stage = Stage::headless(&ViewportConfig::default());
        let mut intro = ReelIntro::new();
        intro.setup(stage.scene.as_mut(), stage.camera.as_mut());

        assert_eq!(stage.scene.light(Light::Ambient), BLACK);
        assert_eq!(stage.scene.spot_angle(), INTRO_SPOT_ANGLE);
        assert!(stage.scene.find("logo").is_some());
        assert!(stage.scene.find("reactor").is_some());
        assert_eq!(
            stage.camera.transform().eye_position(),
            Vec3::new(200.0, -20.0, 350.0)
        );
    }

    #[test]
    fn second_beat_pulls_the_camera_back() {
        let mut stage = Stage::headless(&ViewportConfig::default());
        let mut intro = ReelIntro::new();
        intro.setup(stage.scene.as_mut(), stage.camera.as_mut());
        let before = stage.camera.transform().eye_position();

        intro.play_beat(2, stage.scene.as_mut(), stage.camera.as_mut());
        let after = stage.camera.transform().eye_position();
        assert!((before.z - after.z - TEXT_Z_SPACING).abs() < 1e-3);
        assert!(stage.camera.is_animating());
    }

    #[test]
    fn conclude_restores_lights_and_default_eye_then_teardown_clears() {
        let mut stage = Stage::headless(&ViewportConfig::default());
        let baseline = stage.scene.node_count();
        let mut intro = ReelIntro::new();
        intro.setup(stage.scene.as_mut(), stage.camera.as_mut());
        intro.play_beat(2, stage.scene.as_mut(), stage.camera.as_mut());

        intro.conclude(stage.scene.as_mut(), stage.camera.as_mut());
        assert_eq!(stage.scene.light(Light::Ambient), gray(AMBIENT_LEVEL));
        assert_eq!(stage.scene.spot_angle(), SPOT_ANGLE);
        let eye = stage.camera.transform().eye_position();
        assert!((eye - RigTransform::initial().eye_position()).length() < 1e-3);

        intro.teardown(stage.scene.as_mut());
        assert_eq!(stage.scene.node_count(), baseline);
    }
}

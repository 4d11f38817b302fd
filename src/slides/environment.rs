//=========================================================================
// Environment
//=========================================================================
//
// Permanent set shared by every slide: lights, floor and the walls the
// physics and paint slides bounce off. Built once, before the reel
// starts, and never torn down.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::stage::{gray, Geometry, Light, Node, NodeId, PhysicsBody, SceneHandle};

//=== Constants ===========================================================

pub const AMBIENT_LEVEL: f32 = 0.3;
pub const SPOT_ANGLE: f32 = 70.0;
pub const MAIN_WALL_Z: f32 = -20.0;

//=== Environment =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub floor: NodeId,
    pub main_wall: NodeId,
}

impl Environment {
    pub fn build(scene: &mut dyn SceneHandle) -> Self {
        scene.set_light(Light::Ambient, gray(AMBIENT_LEVEL), Duration::ZERO);
        scene.set_light(Light::Spot, gray(1.0), Duration::ZERO);
        scene.set_spot_angle(SPOT_ANGLE, Duration::ZERO);

        let bouncy = || PhysicsBody::fixed().with_restitution(1.0);

        let floor = scene.attach(
            Node::new("floor")
                .with_geometry(Geometry::Floor)
                .with_texture("wood.png")
                .with_body(bouncy()),
        );

        let main_wall = scene.attach(
            Node::new("main-wall")
                .with_geometry(Geometry::Plane {
                    width: 800.0,
                    height: 200.0,
                })
                .with_texture("wall.jpg")
                .at(Vec3::new(200.0, 100.0, MAIN_WALL_Z))
                .with_body(bouncy()),
        );

        let hidden = |name: &str, position: Vec3, yaw: f32| {
            Node::new(name)
                .with_geometry(Geometry::Plane {
                    width: 400.0,
                    height: 200.0,
                })
                .at(position)
                .with_rotation(Quat::from_rotation_y(yaw))
                .with_opacity(0.0)
                .with_body(bouncy())
        };
        scene.attach(hidden("back-wall", Vec3::new(0.0, 100.0, 40.0), PI));
        scene.attach(hidden("left-wall", Vec3::new(-120.0, 100.0, 40.0), FRAC_PI_2));
        scene.attach(
            Node::new("ceiling")
                .with_geometry(Geometry::Plane {
                    width: 800.0,
                    height: 200.0,
                })
                .at(Vec3::new(200.0, 200.0, 0.0))
                .with_rotation(Quat::from_rotation_x(FRAC_PI_2))
                .with_opacity(0.0)
                .with_body(bouncy()),
        );

        debug!("Environment built");
        Self { floor, main_wall }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

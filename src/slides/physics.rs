//=========================================================================
// Physics Slide
//=========================================================================
//
// Crates and balls rain down from both sides; a tap blows them away from
// the tapped point. On exit the pile is blasted off screen and fades.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec2, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::{Slide, SlideContext, TimerHandle};
use crate::stage::{Geometry, Node, NodeAction, NodeId, PhysicsBody};

//=== Constants ===========================================================

const GRAVITY: Vec3 = Vec3::new(0.0, -70.0, 0.0);
const FACTOR: f32 = 2.2;
const BOX_WIDTH: f32 = 8.0;
const SPREAD: f32 = 6.0;
const DROP_COUNT: u32 = 80;
const DROP_DELAY: Duration = Duration::from_secs(1);
const DROP_SPAN: Duration = Duration::from_secs(10);
const FADE_DELAY: Duration = Duration::from_secs(1);
const FADE_TIME: Duration = Duration::from_millis(125);
const CRATE_TEXTURES: [&str; 3] = ["WoodCubeA.jpg", "WoodCubeB.jpg", "WoodCubeC.jpg"];

const TAG_DROP: u32 = 1;

//=== BodyPicker ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    Crate(usize),
    Ball,
}

/// Chooses what the next dropped body looks like.
#[derive(Debug, Default)]
pub struct BodyPicker {
    count: u32,
}

impl BodyPicker {
    pub fn next_style(&mut self) -> BodyStyle {
        self.count += 1;
        if self.count == 1 || self.count & 7 == 7 {
            BodyStyle::Ball
        } else {
            BodyStyle::Crate(self.count as usize % CRATE_TEXTURES.len())
        }
    }
}

//=== Explosion ===========================================================

/// Impulse pushing a body at `body` away from the blast at `center`.
///
/// A removal blast sits higher and further back, is twice as strong, and
/// adds a sideways kick so the pile clears the frame.
pub fn explosion_impulse(center: Vec3, body: Vec3, removal: bool) -> Vec3 {
    let mut origin = center;
    origin.y = if removal { -20.0 } else { -90.0 };
    origin.z = if removal { 0.0 } else { 50.0 };
    let mut direction = body - origin;

    let flat = Vec3::new(origin.x, 0.0, 0.0);
    let distance = (body - flat).length();

    let force = if removal {
        2000.0
    } else {
        1000.0 * (1.0 + center.x.abs() / 100.0)
    };

    if removal {
        if direction.x > 0.0 && direction.x < 500.0 {
            direction.x += 500.0;
        } else if direction.x < 0.0 && direction.x > -500.0 {
            direction.x -= 500.0;
        }
    }

    direction.normalize_or_zero() * FACTOR * force / distance.max(20.0)
}

//=== PhysicsSlide ========================================================

pub struct PhysicsSlide {
    picker: BodyPicker,
    bodies: Vec<NodeId>,
    wall: Option<NodeId>,
    dropper: Option<TimerHandle>,
    from_right: bool,
}

impl PhysicsSlide {
    pub fn new() -> Self {
        Self {
            picker: BodyPicker::default(),
            bodies: Vec::new(),
            wall: None,
            dropper: None,
            from_right: false,
        }
    }

    fn drop_body(&mut self, ctx: &mut SlideContext) {
        let side = if self.from_right { 1.0 } else { -1.0 };
        self.from_right = !self.from_right;

        let velocity = Vec3::new(
            FACTOR * -side * 50.0,
            FACTOR * (30.0 + ctx.random(-SPREAD, SPREAD)),
            FACTOR * ctx.random(-SPREAD, SPREAD),
        );
        let spin = Vec4::new(
            ctx.random(-1.0, 1.0),
            ctx.random(-1.0, 1.0),
            ctx.random(-1.0, 1.0),
            ctx.random(-3.0, 3.0),
        );

        let node = match self.picker.next_style() {
            BodyStyle::Ball => Node::new("ball")
                .with_geometry(Geometry::Sphere {
                    radius: BOX_WIDTH * 0.75,
                })
                .with_texture("ball.jpg")
                .with_body(PhysicsBody::dynamic().with_restitution(0.9)),
            BodyStyle::Crate(index) => Node::new("crate")
                .with_geometry(Geometry::Cuboid {
                    width: BOX_WIDTH,
                    height: BOX_WIDTH,
                    length: BOX_WIDTH,
                })
                .with_texture(CRATE_TEXTURES[index])
                .with_body(PhysicsBody::dynamic()),
        };
        let node = node.at(Vec3::new(side * 100.0, 50.0, 0.0));
        let node = Node {
            body: node.body.map(|body| body.with_velocity(velocity, spin)),
            ..node
        };

        self.bodies.push(ctx.scene.attach(node));
    }

    fn explode(&mut self, center: Vec3, removal: bool, ctx: &mut SlideContext) {
        for &id in &self.bodies {
            let Some(position) = ctx.scene.world_position(id) else {
                continue;
            };
            let impulse = explosion_impulse(center, position, removal);
            let at = if removal {
                Vec3::ZERO
            } else {
                Vec3::new(
                    ctx.random(-0.2, 0.2),
                    ctx.random(-0.2, 0.2),
                    ctx.random(-0.2, 0.2),
                )
            };
            ctx.scene.apply_impulse(id, impulse, at);

            if removal {
                if let Some(body) = ctx.scene.node_mut(id).and_then(|n| n.body.as_mut()) {
                    body.collision_mask = 0;
                }
                ctx.scene.run(
                    id,
                    NodeAction::Fade {
                        delay: FADE_DELAY,
                        to: 0.0,
                        duration: FADE_TIME,
                        remove: true,
                    },
                );
            }
        }
    }
}

impl Default for PhysicsSlide {
    fn default() -> Self {
        Self::new()
    }
}

impl Slide for PhysicsSlide {
    fn label(&self) -> &'static str {
        "Physics"
    }

    fn on_enter(&mut self, ctx: &mut SlideContext) {
        ctx.scene.set_gravity(GRAVITY);

        self.wall = Some(
            ctx.scene.attach(
                Node::new("invisible-wall")
                    .with_geometry(Geometry::Plane {
                        width: 400.0,
                        height: 200.0,
                    })
                    .at(Vec3::new(120.0, 100.0, 40.0))
                    .with_rotation(Quat::from_rotation_y(-FRAC_PI_2))
                    .with_opacity(0.0)
                    .with_body(PhysicsBody::fixed().with_restitution(1.0)),
            ),
        );

        let interval = DROP_SPAN / DROP_COUNT;
        self.dropper =
            Some(ctx.schedule_repeating(DROP_DELAY, interval, Some(DROP_COUNT), TAG_DROP));
    }

    fn on_exit(&mut self, ctx: &mut SlideContext) {
        if let Some(dropper) = self.dropper.take() {
            ctx.cancel(dropper);
        }

        self.explode(Vec3::ZERO, true, ctx);
        debug!("Blasting {} bodies off screen", self.bodies.len());
        self.bodies.clear();

        if let Some(wall) = self.wall.take() {
            ctx.scene.detach(wall);
        }
    }

    fn on_tap(&mut self, point: Vec2, ctx: &mut SlideContext) {
        let mut center = ctx.camera.unproject(point, Vec3::new(0.0, 0.0, -60.0));
        center.y = 0.0;
        center.z = 0.0;
        self.explode(center, false, ctx);
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SlideContext) {
        if tag == TAG_DROP {
            self.drop_body(ctx);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Particles Slide
//=========================================================================
//
// A fire truck hoses down a burning container. Panning aims the hose;
// holding it on target for a while puts the fire out and lets the smoke
// take over, then thin away.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};
use std::ops::RangeInclusive;
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::{Hooks, Slide, SlideContext, TimerHandle};
use crate::stage::{Easing, Geometry, Node, NodeAction, NodeId, PhysicsBody, SceneHandle};

//=== Constants ===========================================================

pub const MAX_FIRE: f32 = 25.0;
pub const MAX_SMOKE: f32 = 20.0;
const FIRE_DECAY: f32 = 0.1;
const SMOKE_DECAY: f32 = 0.03;
const SPRAY_RATE: f32 = 300.0;

const HOSE_REST: f32 = 35.0 * PI / 180.0;
const HOSE_MIN: f32 = -FRAC_PI_2 * 0.1;
const HOSE_MAX: f32 = PI * 0.8;
const ON_TARGET: RangeInclusive<f32> = 0.48..=0.66;

const CAMERA_PAN: Vec3 = Vec3::new(60.0, 0.0, 0.0);
const PAN_DELAY: Duration = Duration::from_secs(2);
const AIM_HOLD: Duration = Duration::from_secs(3);

const TAG_CAMERA_PAN: u32 = 1;
const TAG_SPRAY: u32 = 2;
const TAG_HIT: u32 = 3;
const TAG_MISS: u32 = 4;

//=== Formulas ============================================================

/// One frame of emission decay. The fire burns down first, pushing smoke
/// up as it goes; once it is out the smoke thins on its own.
///
/// Smoke follows the fire before it is clamped at zero, so the last
/// burning frame can push smoke slightly past `MAX_SMOKE`.
pub fn decay_emission(fire: f32, smoke: f32) -> (f32, f32) {
    if fire > 0.0 {
        let fire = fire - FIRE_DECAY;
        (fire.max(0.0), (1.0 - fire / MAX_FIRE) * MAX_SMOKE)
    } else if smoke > 0.0 {
        (fire, (smoke - SMOKE_DECAY).max(0.0))
    } else {
        (fire, smoke)
    }
}

/// Hose elevation that points the nozzle at `target`, relative to its
/// resting angle.
pub fn hose_angle(target: Vec3, handle: Vec3) -> f32 {
    let rise = (target.y - handle.y).max(0.0);
    let run = handle.x - target.x;
    (rise.atan2(run) - HOSE_REST).clamp(HOSE_MIN, HOSE_MAX)
}

pub fn is_on_target(angle: f32) -> bool {
    ON_TARGET.contains(&angle)
}

fn birth_rate(scene: &dyn SceneHandle, id: Option<NodeId>) -> f32 {
    id.and_then(|id| scene.node(id))
        .and_then(|node| node.particles.as_ref())
        .map_or(0.0, |system| system.birth_rate)
}

//=== ParticlesSlide ======================================================

#[derive(Default)]
pub struct ParticlesSlide {
    truck: Option<NodeId>,
    handle: Option<NodeId>,
    spray: Option<NodeId>,
    container: Option<NodeId>,
    collider: Option<NodeId>,
    fire: Option<NodeId>,
    smoke: Option<NodeId>,
    pending: Vec<TimerHandle>,
    hit_fire: bool,
}

impl ParticlesSlide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fire_hit(&self) -> bool {
        self.hit_fire
    }

    fn schedule(&mut self, delay: Duration, tag: u32, ctx: &mut SlideContext) {
        self.pending.retain(|handle| ctx.is_pending(*handle));
        self.pending.push(ctx.schedule(delay, tag));
    }

    fn set_birth_rate(id: Option<NodeId>, rate: f32, ctx: &mut SlideContext) {
        if let Some(system) = id
            .and_then(|id| ctx.scene.node_mut(id))
            .and_then(|node| node.particles.as_mut())
        {
            system.birth_rate = rate;
        }
    }
}

impl Slide for ParticlesSlide {
    fn label(&self) -> &'static str {
        "Particles"
    }

    fn label_hold(&self) -> Option<Duration> {
        Some(Duration::from_secs(4))
    }

    fn hooks(&self) -> Hooks {
        Hooks::FRAME
    }

    fn on_enter(&mut self, ctx: &mut SlideContext) {
        ctx.scene.set_gravity(Vec3::new(0.0, -9.8, 0.0));
        self.hit_fire = false;

        let truck = ctx.scene.attach(
            Node::new("fire-truck")
                .with_geometry(Geometry::Model("firetruck.dae"))
                .at(Vec3::new(120.0, 10.0, 0.0))
                .with_scale(Vec3::splat(0.2))
                .with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        );
        let handle = ctx.scene.attach_child(
            truck,
            Node::new("hose-handle").at(Vec3::new(0.0, 150.0, -40.0)),
        );
        let spray = ctx.scene.attach_child(
            handle,
            Node::new("spray").with_particles("spray", 0.0),
        );

        let container = ctx.scene.attach(
            Node::new("fire-container")
                .with_geometry(Geometry::Model("bac.dae"))
                .at(Vec3::new(-10.0, 0.0, 0.0))
                .with_scale(Vec3::new(0.5, 0.25, 0.25)),
        );

        let collider = ctx.scene.attach(
            Node::new("collider")
                .with_geometry(Geometry::Cuboid {
                    width: 50.0,
                    height: 2.0,
                    length: 25.0,
                })
                .at(Vec3::new(60.0, 260.0, 5.0))
                .with_body(PhysicsBody::fixed()),
        );
        ctx.scene.run(
            collider,
            NodeAction::MoveBy {
                delay: Duration::from_secs(2),
                offset: Vec3::new(0.0, -215.0, 0.0),
                duration: Duration::from_secs(1),
                easing: Easing::EaseOut,
            },
        );
        ctx.scene.run(
            collider,
            NodeAction::SpinForever {
                axis: Vec3::Z,
                period: Duration::from_secs(2),
            },
        );

        let fire = ctx.scene.attach(
            Node::new("fire")
                .at(Vec3::new(-10.0, 0.0, 0.0))
                .with_particles("fire", MAX_FIRE),
        );
        let smoke = ctx.scene.attach_child(
            fire,
            Node::new("smoke")
                .at(Vec3::new(0.0, 0.0, 0.5))
                .with_particles("smoke", 0.0),
        );

        self.truck = Some(truck);
        self.handle = Some(handle);
        self.spray = Some(spray);
        self.container = Some(container);
        self.collider = Some(collider);
        self.fire = Some(fire);
        self.smoke = Some(smoke);

        self.schedule(PAN_DELAY, TAG_CAMERA_PAN, ctx);
    }

    fn on_exit(&mut self, ctx: &mut SlideContext) {
        for handle in self.pending.drain(..) {
            ctx.cancel(handle);
        }
        for id in [self.truck, self.container, self.collider, self.fire]
            .into_iter()
            .flatten()
        {
            ctx.scene.detach(id);
        }
        *self = Self::default();
    }

    fn on_pan(&mut self, point: Vec2, ctx: &mut SlideContext) {
        let Some(handle) = self.handle else {
            return;
        };
        let Some(handle_position) = ctx.scene.world_position(handle) else {
            return;
        };

        let target = ctx.camera.unproject(point, Vec3::ZERO);
        let angle = hose_angle(target, handle_position);
        let tag = if is_on_target(angle) { TAG_HIT } else { TAG_MISS };
        self.schedule(AIM_HOLD, tag, ctx);

        if let Some(node) = ctx.scene.node_mut(handle) {
            node.rotation = Quat::from_rotation_x(angle);
        }
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SlideContext) {
        match tag {
            TAG_CAMERA_PAN => {
                let moved = ctx.camera.transform().translated(CAMERA_PAN);
                ctx.camera
                    .animate_to(moved, Duration::from_secs(1), Easing::EaseInOut);
                self.schedule(Duration::from_secs(1), TAG_SPRAY, ctx);
            }
            TAG_SPRAY => Self::set_birth_rate(self.spray, SPRAY_RATE, ctx),
            TAG_HIT => {
                if !self.hit_fire {
                    debug!("Hose on target, fire going out");
                }
                self.hit_fire = true;
            }
            TAG_MISS => self.hit_fire = false,
            _ => {}
        }
    }

    fn on_frame(&mut self, ctx: &mut SlideContext) {
        if !self.hit_fire {
            return;
        }
        let fire = birth_rate(&*ctx.scene, self.fire);
        let smoke = birth_rate(&*ctx.scene, self.smoke);
        let (fire, smoke) = decay_emission(fire, smoke);
        Self::set_birth_rate(self.fire, fire, ctx);
        Self::set_birth_rate(self.smoke, smoke, ctx);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

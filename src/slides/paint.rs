//=========================================================================
// Paint Slide
//=========================================================================
//
// Colored balls are thrown at a spinning torus. Every ball that lands
// on the torus paints its texture; the rest leave a splash on the wall
// that fades out.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Vec2, Vec3, Vec4};
use std::time::Duration;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::environment::{Environment, MAIN_WALL_Z};
use crate::core::{Hooks, Slide, SlideContext, TimerHandle};
use crate::stage::{
    hue, Color, Contact, Easing, Geometry, Node, NodeAction, NodeId, PhysicsBody,
};

//=== Constants ===========================================================

/// Side of the square paint canvas mapped onto the torus, in texels.
pub const CANVAS_SIZE: f32 = 256.0;
/// Splashes this close to the texture seam are mirrored across it.
const SEAM: f32 = 16.0;

const TORUS_WIDTH: f32 = 50.0;
const CAMERA_SHIFT: f32 = 200.0;
const CAMERA_HEIGHT: f32 = 60.0;
const GRAVITY: Vec3 = Vec3::new(0.0, -70.0, 0.0);
const PAINT_FACTOR: f32 = 2.0;
const BALL_RADIUS: f32 = 2.0;
const BALL_CATEGORY: u32 = 0x4;
const SPLASH_SIZE: f32 = 10.0;
const SPLASH_STEP: f32 = 0.0002;

const FADE_IN: Duration = Duration::from_secs(1);
const LAUNCH_DELAY: Duration = Duration::from_secs(1);
const LAUNCH_INTERVAL: Duration = Duration::from_millis(100);

const TAG_START: u32 = 1;
const TAG_LAUNCH: u32 = 2;

//=== Canvas ==============================================================

/// Texel positions to paint for a hit at texture coordinate `uv`.
///
/// The canvas wraps around the torus, so a splash near the left or right
/// edge is drawn a second time on the other side of the seam.
pub fn paint_positions(uv: Vec2) -> Vec<Vec2> {
    let p = uv * CANVAS_SIZE;
    let mut out = vec![p];
    if p.x < SEAM {
        out.push(Vec2::new(CANVAS_SIZE + p.x, p.y));
    } else if p.x > CANVAS_SIZE - SEAM {
        out.push(Vec2::new(p.x - CANVAS_SIZE, p.y));
    }
    out
}

//=== PaintSlide ==========================================================

pub struct PaintSlide {
    env: Environment,
    torus: Option<NodeId>,
    balls: Vec<NodeId>,
    start: Option<TimerHandle>,
    launcher: Option<TimerHandle>,
    /// Depth offset of the next wall splash; kept across visits.
    splash_offset: f32,
}

impl PaintSlide {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            torus: None,
            balls: Vec::new(),
            start: None,
            launcher: None,
            splash_offset: 1.0,
        }
    }

    fn launch_ball(&mut self, ctx: &mut SlideContext) {
        self.balls.retain(|id| ctx.scene.contains(*id));

        let x = ctx.camera.transform().handle_position().x;
        let velocity = Vec3::new(
            PAINT_FACTOR * ctx.random(-10.0, 10.0),
            75.0 + ctx.random(0.0, 35.0),
            PAINT_FACTOR * -30.0,
        );
        let color = hue(ctx.random(0.0, 1.0));

        let ball = Node::new("paint-ball")
            .with_geometry(Geometry::Sphere {
                radius: BALL_RADIUS,
            })
            .with_color(color)
            .at(Vec3::new(x, 20.0, 100.0))
            .with_body(
                PhysicsBody::dynamic()
                    .with_restitution(0.9)
                    .with_masks(BALL_CATEGORY, !BALL_CATEGORY)
                    .with_velocity(velocity, Vec4::ZERO),
            );
        self.balls.push(ctx.scene.attach(ball));
    }

    fn splash_on_wall(&mut self, point: Vec3, color: Color, ctx: &mut SlideContext) {
        self.splash_offset += SPLASH_STEP;
        let wall_z = ctx
            .scene
            .world_position(self.env.main_wall)
            .map_or(MAIN_WALL_Z, |wall| wall.z);

        let splash = ctx.scene.attach(
            Node::new("splash")
                .with_geometry(Geometry::Plane {
                    width: SPLASH_SIZE,
                    height: SPLASH_SIZE,
                })
                .with_texture("splash.png")
                .with_color(color)
                .at(Vec3::new(point.x, point.y, wall_z + self.splash_offset)),
        );
        ctx.scene.run(
            splash,
            NodeAction::Fade {
                delay: Duration::ZERO,
                to: 0.0,
                duration: Duration::from_millis(1500),
                remove: true,
            },
        );
    }

    fn paint_torus(&self, torus: NodeId, point: Vec3, color: Color, ctx: &mut SlideContext) {
        let Some(uv) = ctx.scene.texture_coordinates(torus, point) else {
            return;
        };
        for texel in paint_positions(uv) {
            trace!("Painting torus at {:?}", texel);
            ctx.scene.paint(torus, texel, color);
        }
    }
}

impl Slide for PaintSlide {
    fn label(&self) -> &'static str {
        "SceneKit + SpriteKit"
    }

    fn label_hold(&self) -> Option<Duration> {
        Some(Duration::from_secs(4))
    }

    fn hooks(&self) -> Hooks {
        Hooks::CONTACT
    }

    fn on_enter(&mut self, ctx: &mut SlideContext) {
        let camera = ctx.camera.transform();
        let x = camera.handle_position().x + CAMERA_SHIFT;
        ctx.camera.animate_to(
            camera.with_handle_position(Vec3::new(x, CAMERA_HEIGHT, 0.0)),
            Duration::from_secs(2),
            Easing::EaseInOut,
        );

        let torus = ctx.scene.attach(
            Node::new("torus")
                .with_geometry(Geometry::Torus {
                    ring_radius: TORUS_WIDTH / 2.0,
                    pipe_radius: TORUS_WIDTH / 6.0,
                })
                .with_texture("wood-normal.png")
                .at(Vec3::new(x, 60.0, 10.0))
                .with_opacity(0.0)
                .with_body(PhysicsBody::fixed()),
        );
        ctx.scene.run(
            torus,
            NodeAction::Fade {
                delay: Duration::ZERO,
                to: 1.0,
                duration: FADE_IN,
                remove: false,
            },
        );
        ctx.scene.run(
            torus,
            NodeAction::SpinForever {
                axis: Vec3::new(0.4, 1.0, 0.0),
                period: Duration::from_secs(8),
            },
        );

        self.torus = Some(torus);
        self.start = Some(ctx.schedule(FADE_IN, TAG_START));
    }

    fn on_exit(&mut self, ctx: &mut SlideContext) {
        for handle in [self.start.take(), self.launcher.take()].into_iter().flatten() {
            ctx.cancel(handle);
        }
        if let Some(torus) = self.torus.take() {
            ctx.scene.detach(torus);
        }
        let in_flight = self.balls.len();
        for ball in self.balls.drain(..) {
            ctx.scene.detach(ball);
        }
        debug!("Paint slide cleared, {} balls dropped", in_flight);
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SlideContext) {
        match tag {
            TAG_START => {
                self.start = None;
                ctx.scene.set_gravity(GRAVITY);
                self.launcher =
                    Some(ctx.schedule_repeating(LAUNCH_DELAY, LAUNCH_INTERVAL, None, TAG_LAUNCH));
            }
            TAG_LAUNCH => self.launch_ball(ctx),
            _ => {}
        }
    }

    fn on_contact(&mut self, contact: &Contact, ctx: &mut SlideContext) {
        let (ball, other) = if self.balls.contains(&contact.node_a) {
            (contact.node_a, contact.node_b)
        } else if self.balls.contains(&contact.node_b) {
            (contact.node_b, contact.node_a)
        } else {
            return;
        };

        let color = ctx
            .scene
            .node(ball)
            .and_then(|node| node.color)
            .unwrap_or(Color::ONE);
        self.balls.retain(|id| *id != ball);
        ctx.scene.detach(ball);
        ctx.scene.burst("plok", contact.point, color);

        match self.torus {
            Some(torus) if torus == other => self.paint_torus(torus, contact.point, color, ctx),
            _ => self.splash_on_wall(contact.point, color, ctx),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

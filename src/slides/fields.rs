//=========================================================================
// Physics Fields Slide
//=========================================================================
//
// Bubbles rise through a dark room; touching the screen drops a radial
// gravity field under the finger that pulls them in. Lifting the finger
// switches the field off.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Vec2, Vec3};
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use super::environment::AMBIENT_LEVEL;
use crate::core::{Slide, SlideContext};
use crate::stage::{gray, Easing, FieldKind, Light, Node, NodeId, PhysicsField, BLACK};

//=== Constants ===========================================================

const DEPTH: f32 = 50.0;
const FLOOR_CLEARANCE: f32 = 5.0;
const FIELD_STRENGTH: f32 = 200_000.0;
const BUBBLE_RATE: f32 = 60.0;
const DIM_SPOT: f32 = 0.5;
const LIGHT_FADE: Duration = Duration::from_millis(750);

//=== FieldsSlide =========================================================

#[derive(Debug, Default)]
pub struct FieldsSlide {
    emitter: Option<NodeId>,
    field: Option<NodeId>,
}

impl FieldsSlide {
    pub fn new() -> Self {
        Self::default()
    }

    fn field_mut<'a>(&self, ctx: &'a mut SlideContext) -> Option<&'a mut PhysicsField> {
        self.field
            .and_then(|id| ctx.scene.node_mut(id))
            .and_then(|node| node.field.as_mut())
    }

    /// Moves the field under `point`, kept in the bubble plane and above
    /// the floor, and switches it on.
    fn move_field(&mut self, point: Vec2, ctx: &mut SlideContext) {
        let mut target = ctx.camera.unproject(point, Vec3::new(0.0, 0.0, DEPTH));
        target.z = DEPTH;
        target.y = target.y.max(FLOOR_CLEARANCE);

        if let Some(node) = self.field.and_then(|id| ctx.scene.node_mut(id)) {
            node.position = target;
        }
        if let Some(field) = self.field_mut(ctx) {
            field.strength = FIELD_STRENGTH;
        }
    }
}

impl Slide for FieldsSlide {
    fn label(&self) -> &'static str {
        "Physics Fields"
    }

    fn on_enter(&mut self, ctx: &mut SlideContext) {
        ctx.scene.set_light(Light::Spot, gray(DIM_SPOT), LIGHT_FADE);
        ctx.scene.set_light(Light::Ambient, BLACK, LIGHT_FADE);
        ctx.scene.set_gravity(Vec3::ZERO);

        let camera = ctx.camera.transform();
        let x = camera.handle_position().x;
        ctx.camera.animate_to(
            camera.translated(Vec3::new(0.0, 0.0, DEPTH)),
            Duration::from_secs(1),
            Easing::EaseInOut,
        );

        self.emitter = Some(
            ctx.scene.attach(
                Node::new("bubbles")
                    .at(Vec3::new(x, FLOOR_CLEARANCE, DEPTH))
                    .with_particles("bubbles", BUBBLE_RATE),
            ),
        );
        self.field = Some(
            ctx.scene.attach(
                Node::new("field-owner")
                    .at(Vec3::new(x, 50.0, DEPTH + 5.0))
                    .with_field(PhysicsField {
                        kind: FieldKind::RadialGravity,
                        strength: 0.0,
                        half_extent: Vec3::splat(100.0),
                        minimum_distance: 20.0,
                    }),
            ),
        );
    }

    fn on_exit(&mut self, ctx: &mut SlideContext) {
        ctx.scene.set_light(Light::Spot, gray(1.0), LIGHT_FADE);
        ctx.scene
            .set_light(Light::Ambient, gray(AMBIENT_LEVEL), LIGHT_FADE);

        let camera = ctx.camera.transform();
        ctx.camera.animate_to(
            camera.translated(Vec3::new(0.0, 0.0, -DEPTH)),
            LIGHT_FADE,
            Easing::EaseInOut,
        );

        for id in [self.emitter.take(), self.field.take()].into_iter().flatten() {
            ctx.scene.detach(id);
        }
    }

    fn on_tap(&mut self, point: Vec2, ctx: &mut SlideContext) {
        self.move_field(point, ctx);
    }

    fn on_pan(&mut self, point: Vec2, ctx: &mut SlideContext) {
        self.move_field(point, ctx);
    }

    fn on_gesture_end(&mut self, ctx: &mut SlideContext) {
        if let Some(field) = self.field_mut(ctx) {
            field.strength = 0.0;
            debug!("Field released");
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

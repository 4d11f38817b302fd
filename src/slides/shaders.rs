//=========================================================================
// Shaders Slide
//=========================================================================
//
// A spinning globe whose shading is rewritten on every tap: a geometry
// modifier makes it ripple, a surface modifier and a fragment modifier
// recolor it, and a last tap returns to plain shading.
//
// Each step fades the outgoing effect out before the next modifier is
// swapped in.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use super::environment::SPOT_ANGLE;
use crate::core::{Slide, SlideContext, TimerHandle};
use crate::stage::{Easing, Geometry, Node, NodeAction, NodeId, ShaderEntryPoint};

//=== Constants ===========================================================

const CAMERA_SHIFT: f32 = 180.0;
const CAMERA_PITCH: f32 = -FRAC_PI_4 * 0.3;
const SHADER_SPOT_ANGLE: f32 = 55.0;

const AMPLITUDE: &str = "Amplitude";
const FREQUENCY: &str = "Frequency";
const SURFACE_INTENSITY: &str = "surfIntensity";
const FRAGMENT_INTENSITY: &str = "fragIntensity";
const LIGHT_INTENSITY: &str = "lightIntensity";

const FADE_OUT: Duration = Duration::from_millis(500);
const FADE_IN: Duration = Duration::from_millis(1500);

const TAG_SWAP_SURFACE: u32 = 1;
const TAG_SWAP_FRAGMENT: u32 = 2;
const TAG_CLEAR: u32 = 3;

//=== ShaderStage =========================================================

/// Shader modifier currently shown on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaderStage {
    #[default]
    Plain,
    Geometry,
    Surface,
    Fragment,
}

impl ShaderStage {
    pub fn next(self) -> Self {
        match self {
            Self::Plain => Self::Geometry,
            Self::Geometry => Self::Surface,
            Self::Surface => Self::Fragment,
            Self::Fragment => Self::Plain,
        }
    }
}

//=== ShadersSlide ========================================================

#[derive(Debug, Default)]
pub struct ShadersSlide {
    stage: ShaderStage,
    group: Option<NodeId>,
    globe: Option<NodeId>,
    pending: Vec<TimerHandle>,
}

impl ShadersSlide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shader_stage(&self) -> ShaderStage {
        self.stage
    }

    fn schedule(&mut self, tag: u32, ctx: &mut SlideContext) {
        self.pending.retain(|handle| ctx.is_pending(*handle));
        self.pending.push(ctx.schedule(FADE_OUT, tag));
    }

    fn show_next_stage(&mut self, globe: NodeId, ctx: &mut SlideContext) {
        self.stage = self.stage.next();
        debug!("Shader stage {:?}", self.stage);

        let scene = &mut *ctx.scene;
        match self.stage {
            ShaderStage::Geometry => {
                let ripple = Duration::from_secs(1);
                scene.set_shader_modifier(globe, Some(ShaderEntryPoint::Geometry));
                scene.set_uniform(globe, AMPLITUDE, 3.0, ripple);
                scene.set_uniform(globe, FREQUENCY, 0.25, ripple);
                scene.set_uniform(globe, LIGHT_INTENSITY, 0.0, ripple);
            }
            ShaderStage::Surface => {
                scene.set_uniform(globe, AMPLITUDE, 0.0, FADE_OUT);
                self.schedule(TAG_SWAP_SURFACE, ctx);
            }
            ShaderStage::Fragment => {
                scene.set_uniform(globe, SURFACE_INTENSITY, 0.0, FADE_OUT);
                self.schedule(TAG_SWAP_FRAGMENT, ctx);
            }
            ShaderStage::Plain => {
                scene.set_uniform(globe, FRAGMENT_INTENSITY, 0.0, FADE_OUT);
                scene.set_uniform(globe, LIGHT_INTENSITY, 0.0, FADE_OUT);
                self.schedule(TAG_CLEAR, ctx);
            }
        }
    }
}

impl Slide for ShadersSlide {
    fn label(&self) -> &'static str {
        "SceneKit + Shaders"
    }

    fn label_hold(&self) -> Option<Duration> {
        None
    }

    fn on_enter(&mut self, ctx: &mut SlideContext) {
        self.stage = ShaderStage::Plain;

        let camera = ctx.camera.transform();
        let x = camera.handle_position().x + CAMERA_SHIFT;
        let framed = camera
            .with_handle_position(Vec3::new(x, 60.0, 0.0))
            .with_handle_euler(Vec3::new(CAMERA_PITCH, 0.0, 0.0));
        ctx.camera
            .animate_to(framed, Duration::from_secs(1), Easing::EaseInOut);
        ctx.scene
            .set_spot_angle(SHADER_SPOT_ANGLE, Duration::from_secs(1));

        let group = ctx
            .scene
            .attach(Node::new("shader-group").at(Vec3::new(x, -5.0, 20.0)));
        let stand = ctx.scene.attach_child(
            group,
            Node::new("globe-stand").with_geometry(Geometry::Model("globe.dae")),
        );
        let globe = ctx.scene.attach_child(
            stand,
            Node::new("globe")
                .with_geometry(Geometry::Sphere { radius: 28.0 })
                .with_texture("earth-diffuse.jpg")
                .with_scale(Vec3::splat(3.0)),
        );
        ctx.scene.run(
            globe,
            NodeAction::SpinForever {
                axis: Vec3::Y,
                period: Duration::from_secs(12),
            },
        );
        for name in [AMPLITUDE, LIGHT_INTENSITY, SURFACE_INTENSITY, FRAGMENT_INTENSITY] {
            ctx.scene.set_uniform(globe, name, 0.0, Duration::ZERO);
        }

        self.group = Some(group);
        self.globe = Some(globe);
    }

    fn on_exit(&mut self, ctx: &mut SlideContext) {
        for handle in self.pending.drain(..) {
            ctx.cancel(handle);
        }
        if let Some(group) = self.group.take() {
            ctx.scene.run(
                group,
                NodeAction::ScaleTo {
                    scale: 0.01,
                    duration: Duration::from_secs(1),
                    remove: true,
                },
            );
        }
        ctx.scene.set_spot_angle(SPOT_ANGLE, Duration::from_secs(1));
        self.globe = None;
        self.stage = ShaderStage::Plain;
    }

    fn on_tap(&mut self, _point: Vec2, ctx: &mut SlideContext) {
        if let Some(globe) = self.globe {
            self.show_next_stage(globe, ctx);
        }
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SlideContext) {
        let Some(globe) = self.globe else {
            return;
        };
        match tag {
            TAG_SWAP_SURFACE => {
                ctx.scene
                    .set_shader_modifier(globe, Some(ShaderEntryPoint::Surface));
                ctx.scene.set_uniform(globe, SURFACE_INTENSITY, 1.0, FADE_IN);
            }
            TAG_SWAP_FRAGMENT => {
                ctx.scene
                    .set_shader_modifier(globe, Some(ShaderEntryPoint::Fragment));
                ctx.scene.set_uniform(globe, FRAGMENT_INTENSITY, 1.0, FADE_IN);
                ctx.scene.set_uniform(globe, LIGHT_INTENSITY, 1.0, FADE_IN);
            }
            TAG_CLEAR => ctx.scene.set_shader_modifier(globe, None),
            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::testing::SlideHarness;

    const TAP: Vec2 = Vec2::new(640.0, 360.0);

    fn globe(h: &SlideHarness, slide: &ShadersSlide) -> Node {
        h.stage.scene.node(slide.globe.unwrap()).unwrap().clone()
    }

    #[test]
    fn stages_cycle_back_to_plain() {
        let mut stage = ShaderStage::Plain;
        for expected in [
            ShaderStage::Geometry,
            ShaderStage::Surface,
            ShaderStage::Fragment,
            ShaderStage::Plain,
        ] {
            stage = stage.next();
            assert_eq!(stage, expected);
        }
    }

    #[test]
    fn enter_frames_globe_with_neutral_uniforms() {
        let mut h = SlideHarness::new();
        let start = h.stage.camera.transform().handle_position();
        let mut slide = ShadersSlide::new();
        h.enter(&mut slide, 5);

        let camera = h.stage.camera.transform();
        assert_eq!(camera.handle_position().x, start.x + CAMERA_SHIFT);
        assert!((camera.handle_euler().x - CAMERA_PITCH).abs() < 1e-5);
        assert_eq!(h.stage.scene.spot_angle(), SHADER_SPOT_ANGLE);

        let globe = globe(&h, &slide);
        assert_eq!(globe.shader_modifier, None);
        assert_eq!(globe.uniform(AMPLITUDE), Some(0.0));
        assert_eq!(globe.uniform(FRAGMENT_INTENSITY), Some(0.0));
    }

    #[test]
    fn taps_walk_through_the_modifiers() {
        let mut h = SlideHarness::new();
        let mut slide = ShadersSlide::new();
        h.enter(&mut slide, 5);

        h.tap(&mut slide, 5, TAP);
        let g = globe(&h, &slide);
        assert_eq!(g.shader_modifier, Some(ShaderEntryPoint::Geometry));
        assert_eq!(g.uniform(AMPLITUDE), Some(3.0));
        assert_eq!(g.uniform(FREQUENCY), Some(0.25));

        h.tap(&mut slide, 5, TAP);
        let g = globe(&h, &slide);
        assert_eq!(g.uniform(AMPLITUDE), Some(0.0));
        assert_eq!(g.shader_modifier, Some(ShaderEntryPoint::Geometry));
        h.run(&mut slide, 0.5);
        let g = globe(&h, &slide);
        assert_eq!(g.shader_modifier, Some(ShaderEntryPoint::Surface));
        assert_eq!(g.uniform(SURFACE_INTENSITY), Some(1.0));

        h.tap(&mut slide, 5, TAP);
        h.run(&mut slide, 0.5);
        let g = globe(&h, &slide);
        assert_eq!(g.shader_modifier, Some(ShaderEntryPoint::Fragment));
        assert_eq!(g.uniform(SURFACE_INTENSITY), Some(0.0));
        assert_eq!(g.uniform(LIGHT_INTENSITY), Some(1.0));

        h.tap(&mut slide, 5, TAP);
        assert_eq!(slide.shader_stage(), ShaderStage::Plain);
        h.run(&mut slide, 0.5);
        let g = globe(&h, &slide);
        assert_eq!(g.shader_modifier, None);
        assert_eq!(g.uniform(FRAGMENT_INTENSITY), Some(0.0));
    }

    #[test]
    fn exit_shrinks_group_away_and_restores_spot() {
        let mut h = SlideHarness::new();
        let baseline = h.stage.scene.node_count();
        let mut slide = ShadersSlide::new();
        h.enter(&mut slide, 5);
        h.tap(&mut slide, 5, TAP);
        h.tap(&mut slide, 5, TAP);

        h.exit(&mut slide, 5);
        assert!(h.timers.is_empty());
        assert_eq!(h.stage.scene.spot_angle(), SPOT_ANGLE);
        assert_eq!(slide.shader_stage(), ShaderStage::Plain);

        h.settle(1.05);
        assert_eq!(h.stage.scene.node_count(), baseline);
    }
}

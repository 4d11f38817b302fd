//=========================================================================
// Showcase Slides
//=========================================================================
//
// The five slides of the reel, in order, plus the introduction and the
// permanent environment they share.
//
//   1  Physics               bodies rain down, taps blow them apart
//   2  Particles             hose down a burning container
//   3  Physics Fields        steer a radial field through bubbles
//   4  SceneKit + SpriteKit  paint a spinning torus with balls
//   5  SceneKit + Shaders    cycle shader modifiers on a globe
//
//=========================================================================

//=== Module Declarations =================================================

mod environment;
mod fields;
mod intro;
mod paint;
mod particles;
mod physics;
mod shaders;

//=== Public Exports ======================================================

pub use environment::{Environment, AMBIENT_LEVEL, MAIN_WALL_Z, SPOT_ANGLE};
pub use fields::FieldsSlide;
pub use intro::ReelIntro;
pub use paint::{paint_positions, PaintSlide};
pub use particles::{decay_emission, hose_angle, is_on_target, ParticlesSlide};
pub use physics::{explosion_impulse, BodyPicker, BodyStyle, PhysicsSlide};
pub use shaders::{ShaderStage, ShadersSlide};

//=== Internal Dependencies ===============================================

use log::info;

use crate::config::ReelConfig;
use crate::core::{SequencerSettings, Slide, SlideSequencer};
use crate::stage::Stage;

//=== Assembly ============================================================

/// The showcase slides in presentation order.
pub fn showcase(env: &Environment) -> Vec<Box<dyn Slide>> {
    vec![
        Box::new(PhysicsSlide::new()),
        Box::new(ParticlesSlide::new()),
        Box::new(FieldsSlide::new()),
        Box::new(PaintSlide::new(*env)),
        Box::new(ShadersSlide::new()),
    ]
}

/// Builds the environment on `stage` and a sequencer over the showcase.
/// The sequencer still has to be started.
pub fn build_reel(stage: &mut Stage, config: &ReelConfig) -> SlideSequencer {
    let env = Environment::build(stage.scene.as_mut());
    let slides = showcase(&env);
    info!("Reel assembled with {} slides", slides.len());
    SlideSequencer::new(
        slides,
        Some(Box::new(ReelIntro::new())),
        SequencerSettings::from_config(config),
    )
}

//=========================================================================
// Test Harness
//=========================================================================


//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Slide Sequencer
//=========================================================================
//
// Ordered showcase slides with a scripted introduction in front.
//
// Architecture:
//   SlideSequencer
//     ├─ slides: Vec<Box<dyn Slide>>        (step n ↔ slides[n - 1])
//     ├─ intro: Option<Box<dyn Introduction>>
//     ├─ state: SequencerState
//     ├─ timers: TimerQueue<ReelTimer>
//     └─ hooks: HookRegistry
//
// Flow:
//   Intro(1) ─tap─► Intro(2) ─tap─► Idle(0) ─auto─► Slide(1) ⇄ … ⇄ Slide(N)
//
//=========================================================================

//=== Internal Dependencies ===============================================

use std::time::Duration;

use glam::Vec2;

use crate::core::context::SlideContext;
use crate::core::hooks::Hooks;
use crate::stage::{CameraRig, Contact, SceneHandle};

//=== Module Declarations =================================================

mod slide_sequencer;
mod state;

//=== Public API ==========================================================

pub use slide_sequencer::{Direction, SequencerSettings, SlideSequencer, TapRoute};
pub use state::{Phase, SequencerState};

/// Number of introduction beats before the first slide.
pub const INTRO_BEATS: u8 = 2;

//=== Slide Trait =========================================================

/// One showcase segment.
///
/// `on_enter` builds the slide's transient content and `on_exit` must
/// undo all of it: nodes detached, repeating timers cancelled, scene
/// settings restored. Gesture callbacks only reach the current slide.
///
/// # Minimal Implementation
///
/// ```rust
/// # use scene_reel::prelude::*;
/// struct Blank;
///
/// impl Slide for Blank {
///     fn label(&self) -> &'static str { "Blank" }
///     fn on_enter(&mut self, _ctx: &mut SlideContext) {}
///     fn on_exit(&mut self, _ctx: &mut SlideContext) {}
/// }
/// ```
pub trait Slide: Send {
    /// Caption shown on entry.
    fn label(&self) -> &'static str;

    /// How long the caption stays up. `None` keeps it until the next one.
    fn label_hold(&self) -> Option<Duration> {
        Some(Duration::from_secs(2))
    }

    /// Engine callbacks to register while this slide is current.
    fn hooks(&self) -> Hooks {
        Hooks::NONE
    }

    fn on_enter(&mut self, ctx: &mut SlideContext);
    fn on_exit(&mut self, ctx: &mut SlideContext);

    fn on_tap(&mut self, _point: Vec2, _ctx: &mut SlideContext) {}
    fn on_pan(&mut self, _point: Vec2, _ctx: &mut SlideContext) {}
    fn on_gesture_end(&mut self, _ctx: &mut SlideContext) {}
    fn on_timer(&mut self, _tag: u32, _ctx: &mut SlideContext) {}
    fn on_frame(&mut self, _ctx: &mut SlideContext) {}
    fn on_contact(&mut self, _contact: &Contact, _ctx: &mut SlideContext) {}
}

//=== Introduction Trait ==================================================

/// Scripted sequence played before the first slide.
pub trait Introduction: Send {
    /// Builds beat 1.
    fn setup(&mut self, scene: &mut dyn SceneHandle, camera: &mut dyn CameraRig);

    /// Transition into `beat` (2..=INTRO_BEATS).
    fn play_beat(&mut self, beat: u8, scene: &mut dyn SceneHandle, camera: &mut dyn CameraRig);

    /// Last beat dismissed: restore lighting and framing for the slides.
    fn conclude(&mut self, scene: &mut dyn SceneHandle, camera: &mut dyn CameraRig);

    /// Detaches whatever `setup` attached.
    fn teardown(&mut self, scene: &mut dyn SceneHandle);
}

//=========================================================================
// Scene Reel — Library Root
//
// A slide-sequenced 3D showcase: a scripted introduction followed by
// five interactive slides, driven by taps, pans and physics contacts.
//
// Responsibilities:
// - Expose the slide sequencer and the `Slide` seam (`core`)
// - Define the collaborator traits the reel drives (`stage`)
// - Ship the showcase slides and a runtime that ticks them (`slides`,
//   `runtime`)
//
// Typical usage:
// ```no_run
// use scene_reel::prelude::*;
//
// let config = ReelConfig::default();
// let stage = Stage::headless(&config.viewport);
// let handle = RuntimeBuilder::new(config).build(stage).spawn().unwrap();
// handle.shutdown().unwrap();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the sequencer, timers, hooks and the gesture layer.
// `stage` is the rendering-side contract plus its headless stand-in.
//
pub mod config;
pub mod core;
pub mod runtime;
pub mod slides;
pub mod stage;

pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use runtime::{Runtime, RuntimeBuilder, RuntimeError, RuntimeHandle};

//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use scene_reel::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Configuration and runtime
pub use crate::config::{ConfigError, ReelConfig};
pub use crate::runtime::{Runtime, RuntimeBuilder, RuntimeError, RuntimeHandle};

// Sequencer and the slide seam
pub use crate::core::{
    CoreLoop, HostEvent, Hooks, Introduction, Phase, SequencerSettings, Slide, SlideContext,
    SlideSequencer, TapRoute,
};

// Input
pub use crate::core::input::{Gesture, Modifiers, PointerEvent};

// Stage collaborators
pub use crate::stage::{
    CameraRig, Contact, Control, Easing, Node, NodeId, Overlay, RigTransform, SceneHandle, Stage,
};

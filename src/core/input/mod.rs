//=========================================================================
// Input
//
// Pointer events from the host, the gestures derived from them, and the
// camera tilt bookkeeping driven by Alt-drag.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;
mod gesture;
mod tilt;

//=== Public Exports ======================================================

pub use event::{Modifiers, PointerEvent};
pub use gesture::{Gesture, GestureTracker};
pub use tilt::CameraTilt;

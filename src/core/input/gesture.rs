//=========================================================================
// Gesture Tracker
//=========================================================================
//
// Turns raw pointer events into the gestures the sequencer routes.
//
//   Down     → Begin, then DoubleTap | Tap (no tap while Alt is held)
//   Dragged  → Tilt(offset from press) with Alt, Pan(position) otherwise
//   Up       → End
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::event::PointerEvent;

//=== Gesture =============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Begin,
    End,
    Tap(Vec2),
    DoubleTap(Vec2),
    Pan(Vec2),
    /// Offset from the press location.
    Tilt(Vec2),
}

//=== GestureTracker ======================================================

#[derive(Debug, Default)]
pub struct GestureTracker {
    press_location: Vec2,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the gestures produced by `event` to `out`.
    pub fn translate(&mut self, event: &PointerEvent, out: &mut Vec<Gesture>) {
        match *event {
            PointerEvent::Down {
                position,
                click_count,
                modifiers,
            } => {
                self.press_location = position;
                out.push(Gesture::Begin);
                if click_count == 2 {
                    out.push(Gesture::DoubleTap(position));
                } else if !modifiers.alt {
                    out.push(Gesture::Tap(position));
                }
            }
            PointerEvent::Dragged {
                position,
                modifiers,
            } => {
                if modifiers.alt {
                    out.push(Gesture::Tilt(position - self.press_location));
                } else {
                    out.push(Gesture::Pan(position));
                }
            }
            PointerEvent::Up { .. } => out.push(Gesture::End),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

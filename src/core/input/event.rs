//=========================================================================
// Pointer Event Types
//
// Portable representation of the pointer input a host view reports.
//
// Responsibilities:
// - Represent press/drag/release in a host-independent way
// - Carry the modifier state the gesture layer keys off (Alt = tilt)
// - Stay Copy-cheap so batches move across the host channel freely
//
// Event Flow:
// ```text
// Host view (mouse or touch)
//         ↓
//    PointerEvent (this module)
//         ↓
//    GestureTracker
//         ↓
//    Gesture → SlideSequencer
// ```
//
// Coordinates are overlay space: pixels, origin bottom-left, y up.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== PointerEvent ========================================================

/// Low-level pointer event from the host layer.
///
/// # Event Types
///
/// - **Down**: press, with the host's click count (2 = double click)
/// - **Dragged**: movement while pressed
/// - **Up**: release
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed.
    Down {
        position: Vec2,
        click_count: u32,
        modifiers: Modifiers,
    },

    /// Pointer moved while pressed.
    Dragged { position: Vec2, modifiers: Modifiers },

    /// Pointer released.
    Up { position: Vec2 },
}

impl PointerEvent {
    /// Single press without modifiers.
    pub fn press(position: Vec2) -> Self {
        Self::Down {
            position,
            click_count: 1,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Self::Down { position, .. } | Self::Dragged { position, .. } | Self::Up { position } => {
                *position
            }
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// # Platform Mapping
///
/// - **Shift**: Left Shift OR Right Shift
/// - **Ctrl**: Left Ctrl OR Right Ctrl (Command on macOS)
/// - **Alt**: Left Alt OR Right Alt (Option on macOS)
///
/// Only Alt changes gesture meaning: Alt-drag tilts the camera and an
/// Alt-click is not a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

//--- Modifier Constants --------------------------------------------------

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

//=========================================================================
// Unit Tests
//=========================================================================

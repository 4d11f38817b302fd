//=========================================================================
// Hook Registry
//=========================================================================
//
// Per-frame and physics-contact observers, keyed by slide step. A slide
// is only registered while it is the active slide, so engine callbacks
// never reach a slide that has been exited.
//
//=========================================================================

//=== Hooks ===============================================================

/// Engine callbacks a slide wants while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hooks {
    pub frame: bool,
    pub contact: bool,
}

impl Hooks {
    pub const NONE: Self = Self {
        frame: false,
        contact: false,
    };
    pub const FRAME: Self = Self {
        frame: true,
        contact: false,
    };
    pub const CONTACT: Self = Self {
        frame: false,
        contact: true,
    };
}

//=== HookRegistry ========================================================

#[derive(Debug, Default)]
pub struct HookRegistry {
    frame: Vec<usize>,
    contact: Vec<usize>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, step: usize, hooks: Hooks) {
        if hooks.frame && !self.frame.contains(&step) {
            self.frame.push(step);
        }
        if hooks.contact && !self.contact.contains(&step) {
            self.contact.push(step);
        }
    }

    pub fn deregister(&mut self, step: usize) {
        self.frame.retain(|s| *s != step);
        self.contact.retain(|s| *s != step);
    }

    pub fn frame_observers(&self) -> &[usize] {
        &self.frame
    }

    pub fn contact_observers(&self) -> &[usize] {
        &self.contact
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty() && self.contact.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

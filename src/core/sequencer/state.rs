//=========================================================================
// Sequencer State
//=========================================================================

//=== Phase ===============================================================

/// Where the reel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Introduction beat `k`, counted from 1.
    Intro(u8),
    /// No slide yet: introduction finished or skipped.
    Idle,
    /// Showcase slide `n`, counted from 1.
    Slide(usize),
}

//=== SequencerState ======================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencerState {
    pub(crate) current_step: usize,
    pub(crate) intro_step: u8,
    pub(crate) navigation_locked: bool,
    /// Bumped on every lock so a stale unlock can be told apart.
    pub(crate) lock_generation: u64,
    /// Bumped on every slide entry so timers armed on an earlier visit
    /// can be told apart.
    pub(crate) visit: u64,
}

impl SequencerState {
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn intro_step(&self) -> u8 {
        self.intro_step
    }

    pub fn is_navigation_locked(&self) -> bool {
        self.navigation_locked
    }

    /// Number of slide entries so far.
    pub fn visit(&self) -> u64 {
        self.visit
    }

    pub fn phase(&self) -> Phase {
        match (self.intro_step, self.current_step) {
            (0, 0) => Phase::Idle,
            (0, step) => Phase::Slide(step),
            (beat, _) => Phase::Intro(beat),
        }
    }

    pub(crate) fn check(&self) {
        debug_assert!(
            self.intro_step == 0 || self.current_step == 0,
            "Introduction beat {} active while slide {} is current",
            self.intro_step,
            self.current_step
        );
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Slide Context
//=========================================================================
//
// What a slide can touch while one of its callbacks runs: the scene, the
// camera rig, its own timers, and the reel's seeded RNG.
//
// Slide timers are tagged with the owning step and visit. The sequencer
// drops any that fire after that visit has ended.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::timer::{TimerHandle, TimerQueue};
use crate::stage::{CameraRig, SceneHandle};

//=== ReelTimer ===========================================================

/// Every delayed event the reel schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelTimer {
    /// Ends the navigation cooldown started with `generation`.
    UnlockNavigation { generation: u64 },
    /// Hides the caption shown on entering `step` for `visit`.
    FadeLabel { step: usize, visit: u64 },
    /// Detaches the introduction and enters the first slide.
    FinishIntroduction,
    /// Slide-local timer.
    Slide { step: usize, visit: u64, tag: u32 },
}

//=== SlideContext ========================================================

pub struct SlideContext<'a> {
    pub scene: &'a mut dyn SceneHandle,
    pub camera: &'a mut dyn CameraRig,
    timers: &'a mut TimerQueue<ReelTimer>,
    rng: &'a mut StdRng,
    step: usize,
    visit: u64,
}

impl<'a> SlideContext<'a> {
    pub fn new(
        scene: &'a mut dyn SceneHandle,
        camera: &'a mut dyn CameraRig,
        timers: &'a mut TimerQueue<ReelTimer>,
        rng: &'a mut StdRng,
        step: usize,
        visit: u64,
    ) -> Self {
        Self {
            scene,
            camera,
            timers,
            rng,
            step,
            visit,
        }
    }

    /// Step of the slide this context was built for.
    pub fn step(&self) -> usize {
        self.step
    }

    //--- Timers -----------------------------------------------------------

    pub fn schedule(&mut self, delay: Duration, tag: u32) -> TimerHandle {
        let (step, visit) = (self.step, self.visit);
        self.timers
            .schedule(delay, ReelTimer::Slide { step, visit, tag })
    }

    pub fn schedule_repeating(
        &mut self,
        delay: Duration,
        interval: Duration,
        count: Option<u32>,
        tag: u32,
    ) -> TimerHandle {
        let (step, visit) = (self.step, self.visit);
        self.timers.schedule_repeating(
            delay,
            interval,
            count,
            ReelTimer::Slide { step, visit, tag },
        )
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.cancel(handle)
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.is_pending(handle)
    }

    //--- Randomness -------------------------------------------------------

    /// Uniform sample in `[low, high)`.
    pub fn random(&mut self, low: f32, high: f32) -> f32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

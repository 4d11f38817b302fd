//=========================================================================
// Core Loop
//
// Logic-thread side of the reel: owns the sequencer and the stage,
// drains host events, turns pointer input into gestures and advances
// the virtual clock once per tick.
//
// Responsibilities:
// - Receive host events via a bounded channel
// - Route gestures and contacts to the sequencer
// - Maintain deterministic pacing using a fixed tick rate (TPS)
//
// Notes:
// Nothing outside this loop mutates reel state. The host talks to it
// only through `HostEvent`s, which keeps every slide callback on one
// thread.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod context;
pub mod hooks;
pub mod host_bridge;
pub mod input;
pub mod sequencer;
pub mod timer;

//=== Public Exports ======================================================

pub use context::{ReelTimer, SlideContext};
pub use hooks::{HookRegistry, Hooks};
pub use host_bridge::{HostEvent, TickControl};
pub use sequencer::{
    Direction, Introduction, Phase, SequencerSettings, SequencerState, Slide, SlideSequencer,
    TapRoute, INTRO_BEATS,
};
pub use timer::{Fired, TimerHandle, TimerQueue};

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{info, trace};

//=== Internal Dependencies ===============================================

use host_bridge::EventCollector;
use input::{Gesture, GestureTracker};

use crate::stage::Stage;

//=== CoreLoop ============================================================

/// Fixed-rate driver for one reel.
pub struct CoreLoop {
    sequencer: SlideSequencer,
    stage: Stage,
    collector: EventCollector,
    gestures: GestureTracker,
    pending: Vec<Gesture>,
    frame: Duration,
}

impl CoreLoop {
    //--- Construction -----------------------------------------------------

    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn new(
        sequencer: SlideSequencer,
        stage: Stage,
        receiver: Receiver<HostEvent>,
        tps: f64,
    ) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        Self {
            sequencer,
            stage,
            collector: EventCollector::new(receiver),
            gestures: GestureTracker::new(),
            pending: Vec::with_capacity(4),
            frame: Duration::from_secs_f64(1.0 / tps),
        }
    }

    pub fn sequencer(&self) -> &SlideSequencer {
        &self.sequencer
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Fixed frame duration the virtual clock advances by per tick.
    pub fn frame(&self) -> Duration {
        self.frame
    }

    pub fn start(&mut self) {
        self.sequencer.start(&mut self.stage);
    }

    //--- tick() -----------------------------------------------------------
    //
    // 1. Collect host events (bounded)
    // 2. Route gestures and contacts
    // 3. Advance timers, frame hooks and stage animation by one frame
    //
    pub fn tick(&mut self) -> TickControl {
        let control = self.collector.collect_frame();

        for event in self.collector.take_events() {
            self.route(event);
        }

        if control == TickControl::Exit {
            return TickControl::Exit;
        }

        self.sequencer.update(self.frame, &mut self.stage);
        TickControl::Continue
    }

    fn route(&mut self, event: HostEvent) {
        match event {
            HostEvent::Pointer(pointer) => {
                self.gestures.translate(&pointer, &mut self.pending);
                for gesture in self.pending.drain(..) {
                    trace!("Gesture {:?}", gesture);
                    self.sequencer.handle_gesture(gesture, &mut self.stage);
                }
            }
            HostEvent::Contact(contact) => {
                self.sequencer.handle_contact(&contact, &mut self.stage);
            }
            HostEvent::Shutdown => {}
        }
    }

    //--- run() ------------------------------------------------------------
    //
    // Blocking loop for the logic thread. Starts the reel, ticks until the
    // host shuts down, then tears the current slide down and hands the
    // stage back.
    //
    pub fn run(mut self) -> Stage {
        info!("Core loop running at {:.1} TPS", 1.0 / self.frame.as_secs_f64());
        self.start();

        loop {
            let frame_start = Instant::now();

            if self.tick() == TickControl::Exit {
                info!("Core loop exiting");
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame {
                thread::sleep(self.frame - elapsed);
            }
        }

        self.sequencer.teardown(&mut self.stage);
        self.stage
    }
}

impl std::fmt::Debug for CoreLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreLoop")
            .field("sequencer", &self.sequencer)
            .field("stage", &self.stage)
            .field("frame", &self.frame)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReelConfig;
    use crate::core::input::{Modifiers, PointerEvent};
    use crate::slides::build_reel;
    use crate::stage::{control_anchor, Control};
    use crossbeam_channel::{unbounded, Sender};
    use glam::{Vec2, Vec3};

    const CENTER: Vec2 = Vec2::new(640.0, 360.0);

    fn unstarted(skip_intro: bool) -> (CoreLoop, Sender<HostEvent>, ReelConfig) {
        let mut config = ReelConfig::default();
        config.reel.skip_intro = skip_intro;
        let mut stage = Stage::headless(&config.viewport);
        let reel = build_reel(&mut stage, &config);
        let (tx, rx) = unbounded();
        let driver = CoreLoop::new(reel, stage, rx, config.runtime.tps);
        (driver, tx, config)
    }

    fn started(skip_intro: bool) -> (CoreLoop, Sender<HostEvent>, ReelConfig) {
        let (mut driver, tx, config) = unstarted(skip_intro);
        driver.start();
        (driver, tx, config)
    }

    fn click(tx: &Sender<HostEvent>, at: Vec2) {
        tx.send(PointerEvent::press(at).into()).unwrap();
        tx.send(PointerEvent::Up { position: at }.into()).unwrap();
    }

    fn ticks(driver: &mut CoreLoop, count: usize) {
        for _ in 0..count {
            assert_eq!(driver.tick(), TickControl::Continue);
        }
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn zero_tps_is_rejected() {
        let config = ReelConfig::default();
        let mut stage = Stage::headless(&config.viewport);
        let reel = build_reel(&mut stage, &config);
        let (_tx, rx) = unbounded();
        CoreLoop::new(reel, stage, rx, 0.0);
    }

    #[test]
    fn clicks_play_the_introduction_then_enter_slide_one() {
        let (mut driver, tx, _) = started(false);
        assert_eq!(driver.sequencer().phase(), Phase::Intro(1));

        click(&tx, CENTER);
        ticks(&mut driver, 1);
        assert_eq!(driver.sequencer().phase(), Phase::Intro(2));

        // Still inside the one second lock.
        click(&tx, CENTER);
        ticks(&mut driver, 1);
        assert_eq!(driver.sequencer().phase(), Phase::Intro(2));

        ticks(&mut driver, 60);
        click(&tx, CENTER);
        ticks(&mut driver, 1);
        assert_eq!(driver.sequencer().phase(), Phase::Idle);

        ticks(&mut driver, 61);
        assert_eq!(driver.sequencer().phase(), Phase::Slide(1));
        assert_eq!(driver.stage().overlay.label(), Some("Physics"));
    }

    #[test]
    fn next_control_walks_forward_after_cooldown() {
        let (mut driver, tx, config) = started(true);
        click(&tx, CENTER);
        ticks(&mut driver, 1);
        assert_eq!(driver.sequencer().phase(), Phase::Slide(1));

        let next = control_anchor(&config.viewport, Control::Next);
        ticks(&mut driver, 181);
        click(&tx, next);
        ticks(&mut driver, 1);
        assert_eq!(driver.sequencer().phase(), Phase::Slide(2));
    }

    #[test]
    fn alt_drag_tilts_the_camera() {
        let (mut driver, tx, _) = started(true);
        tx.send(
            PointerEvent::Down {
                position: CENTER,
                click_count: 1,
                modifiers: Modifiers::ALT,
            }
            .into(),
        )
        .unwrap();
        tx.send(
            PointerEvent::Dragged {
                position: CENTER + Vec2::new(0.0, -100.0),
                modifiers: Modifiers::ALT,
            }
            .into(),
        )
        .unwrap();
        ticks(&mut driver, 1);

        assert_eq!(driver.sequencer().phase(), Phase::Idle);
        let euler = driver.stage().camera.transform().handle_euler();
        assert!(euler.distance(Vec3::ZERO) > 1e-3);
    }

    #[test]
    fn shutdown_and_disconnect_exit() {
        let (mut driver, tx, _) = started(true);
        tx.send(HostEvent::Shutdown).unwrap();
        assert_eq!(driver.tick(), TickControl::Exit);

        let (mut driver, tx, _) = started(true);
        drop(tx);
        assert_eq!(driver.tick(), TickControl::Exit);
    }

    #[test]
    fn run_enters_slide_then_tears_it_down() {
        let (driver, tx, _) = unstarted(true);
        let baseline = driver.stage().scene.node_count();
        click(&tx, CENTER);
        tx.send(HostEvent::Shutdown).unwrap();

        let stage = driver.run();
        assert_eq!(stage.overlay.label(), Some("Physics"));
        assert_eq!(stage.scene.node_count(), baseline);
    }
}

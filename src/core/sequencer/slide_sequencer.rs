//=========================================================================
// Slide Sequencer
//=========================================================================
//
// Serializes navigation through the slides and routes gestures, engine
// callbacks and timers to whichever slide is current.
//
// Transition order (advance and retreat alike):
//   exit(current) → current_step = target → [restore camera] → enter(target)
//   → show caption → schedule caption fade (guarded by step and visit)
//
// Navigation taps take a cooldown lock; taps during the lock are dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use glam::{Vec2, Vec3};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use super::{Introduction, Phase, SequencerState, Slide, INTRO_BEATS};
use crate::config::ReelConfig;
use crate::core::context::{ReelTimer, SlideContext};
use crate::core::hooks::HookRegistry;
use crate::core::input::{CameraTilt, Gesture};
use crate::core::timer::TimerQueue;
use crate::stage::{Contact, Control, Easing, Fade, RigTransform, Stage};

//=== Constants ===========================================================

const LOCK_FADE: Duration = Duration::from_millis(500);
const UNLOCK_FADE: Duration = Duration::from_millis(750);
const SKIPPED_INTRO_LABEL: &str = "Go!";

//=== SequencerSettings ===================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SequencerSettings {
    pub cooldown: Duration,
    /// Cooldown when leaving slide 1, long enough to read it.
    pub first_slide_cooldown: Duration,
    pub camera_restore: Duration,
    pub camera_reset: Duration,
    pub intro_transition: Duration,
    pub skip_intro: bool,
    pub invert_tilt_x: bool,
    pub seed: u64,
}

impl SequencerSettings {
    pub fn from_config(config: &ReelConfig) -> Self {
        let nav = &config.navigation;
        Self {
            cooldown: nav.cooldown(),
            first_slide_cooldown: nav.first_slide_cooldown(),
            camera_restore: nav.camera_restore(),
            camera_reset: nav.camera_reset(),
            intro_transition: nav.intro_transition(),
            skip_intro: config.reel.skip_intro,
            invert_tilt_x: config.reel.invert_tilt_x,
            seed: config.reel.seed,
        }
    }
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self::from_config(&ReelConfig::default())
    }
}

//=== Routing Results =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Which branch handled a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapRoute {
    Introduction,
    Navigation(Direction),
    Slide(usize),
    /// Navigation tap while locked.
    Dropped,
    /// Navigation tap with nowhere to go.
    Ignored,
}

//=== SlideSequencer ======================================================

pub struct SlideSequencer {
    slides: Vec<Box<dyn Slide>>,
    intro: Option<Box<dyn Introduction>>,
    /// Introduction content is on stage until its teardown runs.
    intro_attached: bool,
    state: SequencerState,
    /// Indexed by step; slot 0 unused.
    saved_camera: Vec<Option<RigTransform>>,
    timers: TimerQueue<ReelTimer>,
    hooks: HookRegistry,
    tilt: CameraTilt,
    rng: StdRng,
    settings: SequencerSettings,
    started: bool,
}

impl SlideSequencer {
    //--- Construction -----------------------------------------------------

    /// # Panics
    ///
    /// Panics if `slides` is empty.
    pub fn new(
        slides: Vec<Box<dyn Slide>>,
        intro: Option<Box<dyn Introduction>>,
        settings: SequencerSettings,
    ) -> Self {
        assert!(!slides.is_empty(), "A reel needs at least one slide");
        Self {
            saved_camera: vec![None; slides.len() + 1],
            slides,
            intro,
            intro_attached: false,
            state: SequencerState::default(),
            timers: TimerQueue::new(),
            hooks: HookRegistry::new(),
            tilt: CameraTilt::new(settings.invert_tilt_x),
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
            started: false,
        }
    }

    /// Plays introduction beat 1, or shows "Go!" when the introduction is
    /// skipped or absent.
    pub fn start(&mut self, stage: &mut Stage) {
        assert!(!self.started, "Sequencer already started");
        self.started = true;

        match self.intro.as_mut() {
            Some(intro) if !self.settings.skip_intro => {
                intro.setup(stage.scene.as_mut(), stage.camera.as_mut());
                self.intro_attached = true;
                self.state.intro_step = 1;
                info!("Introduction beat 1");
            }
            _ => {
                stage.overlay.show_label(Some(SKIPPED_INTRO_LABEL));
                info!("Introduction skipped, waiting at idle");
            }
        }
        self.refresh_controls(stage);
    }

    /// Exits the current slide (or drops the introduction) and clears
    /// every pending timer.
    pub fn teardown(&mut self, stage: &mut Stage) {
        if let Phase::Slide(step) = self.state.phase() {
            self.exit_slide(step, stage);
        }
        self.detach_introduction(stage);
        self.state.current_step = 0;
        self.state.intro_step = 0;
        self.timers.clear();
        info!("Sequencer torn down");
    }

    //--- Queries ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn is_navigation_locked(&self) -> bool {
        self.state.navigation_locked
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Camera transform captured on the first entry into `step`.
    pub fn saved_camera_transform(&self, step: usize) -> Option<RigTransform> {
        self.saved_camera.get(step).copied().flatten()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Virtual time since start.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    //--- Navigation -------------------------------------------------------

    /// Moves to the next slide. Returns false at the last slide.
    ///
    /// # Panics
    ///
    /// Panics if called before `start` or while the introduction plays.
    pub fn advance(&mut self, stage: &mut Stage) -> bool {
        self.assert_navigable();
        let current = self.state.current_step;
        if current >= self.slides.len() {
            debug!("Advance ignored: already at last slide {}", current);
            return false;
        }
        self.transition(current + 1, Direction::Forward, stage);
        true
    }

    /// Moves to the previous slide. Returns false at slide 1 (or idle).
    ///
    /// # Panics
    ///
    /// Panics if called before `start` or while the introduction plays.
    pub fn retreat(&mut self, stage: &mut Stage) -> bool {
        self.assert_navigable();
        let current = self.state.current_step;
        if current <= 1 {
            debug!("Retreat ignored at step {}", current);
            return false;
        }
        self.transition(current - 1, Direction::Backward, stage);
        true
    }

    fn assert_navigable(&self) {
        assert!(self.started, "Sequencer used before start()");
        assert!(
            self.state.intro_step == 0,
            "Cannot navigate during introduction beat {}",
            self.state.intro_step
        );
    }

    fn transition(&mut self, target: usize, direction: Direction, stage: &mut Stage) {
        let from = self.state.current_step;
        if from > 0 {
            self.exit_slide(from, stage);
        }

        self.state.current_step = target;

        if direction == Direction::Backward {
            let Some(saved) = self.saved_camera_transform(target) else {
                panic!("Slide {} was never entered, no camera to restore", target);
            };
            stage
                .camera
                .animate_to(saved, self.settings.camera_restore, Easing::EaseInOut);
        }

        self.enter_slide(target, stage);
        self.state.check();

        if !self.state.navigation_locked {
            self.refresh_controls(stage);
        }
        info!("Slide {} → {} ({:?})", from, target, direction);
    }

    fn enter_slide(&mut self, step: usize, stage: &mut Stage) {
        if self.saved_camera[step].is_none() {
            self.saved_camera[step] = Some(stage.camera.transform());
            debug!("Saved camera framing for slide {}", step);
        }
        self.state.visit += 1;

        self.dispatch(step, stage, |slide, ctx| slide.on_enter(ctx));

        let slide = &self.slides[step - 1];
        let (label, hold, hooks) = (slide.label(), slide.label_hold(), slide.hooks());
        self.hooks.register(step, hooks);

        stage.overlay.show_label(Some(label));
        if let Some(hold) = hold {
            let visit = self.state.visit;
            self.timers
                .schedule(hold, ReelTimer::FadeLabel { step, visit });
        }
    }

    fn exit_slide(&mut self, step: usize, stage: &mut Stage) {
        self.hooks.deregister(step);
        self.dispatch(step, stage, |slide, ctx| slide.on_exit(ctx));
        debug!("Exited slide {}", step);
    }

    fn dispatch<F>(&mut self, step: usize, stage: &mut Stage, f: F)
    where
        F: FnOnce(&mut dyn Slide, &mut SlideContext<'_>),
    {
        assert!(
            (1..=self.slides.len()).contains(&step),
            "Invalid slide index {} (have {})",
            step,
            self.slides.len()
        );
        let slide = self.slides[step - 1].as_mut();
        let mut ctx = SlideContext::new(
            stage.scene.as_mut(),
            stage.camera.as_mut(),
            &mut self.timers,
            &mut self.rng,
            step,
            self.state.visit,
        );
        f(slide, &mut ctx);
    }

    //--- Navigation Lock --------------------------------------------------

    fn lock_navigation(&mut self, cooldown: Duration, stage: &mut Stage) {
        self.state.navigation_locked = true;
        self.state.lock_generation += 1;
        for control in [Control::Next, Control::Back] {
            stage.overlay.fade_control(control, Fade::By(-0.5), LOCK_FADE);
        }
        self.timers.schedule(
            cooldown,
            ReelTimer::UnlockNavigation {
                generation: self.state.lock_generation,
            },
        );
        debug!("Navigation locked for {:?}", cooldown);
    }

    fn refresh_controls(&self, stage: &mut Stage) {
        let step = self.state.current_step;
        let back = if step > 1 { 1.0 } else { 0.0 };
        let next = if self.state.intro_step == 0 && step < self.slides.len() {
            1.0
        } else {
            0.0
        };
        stage
            .overlay
            .fade_control(Control::Back, Fade::To(back), UNLOCK_FADE);
        stage
            .overlay
            .fade_control(Control::Next, Fade::To(next), UNLOCK_FADE);
    }

    //--- Gestures ---------------------------------------------------------

    pub fn handle_gesture(&mut self, gesture: Gesture, stage: &mut Stage) {
        match gesture {
            Gesture::Begin => self.gesture_begin(),
            Gesture::End => self.gesture_end(stage),
            Gesture::Tap(point) => {
                self.handle_tap(point, stage);
            }
            Gesture::DoubleTap(_) => self.handle_double_tap(stage),
            Gesture::Pan(point) => self.handle_pan(point, stage),
            Gesture::Tilt(offset) => self.handle_tilt(offset, stage),
        }
    }

    /// Routes a tap to exactly one of: the introduction, navigation, or
    /// the current slide.
    pub fn handle_tap(&mut self, point: Vec2, stage: &mut Stage) -> TapRoute {
        if self.state.intro_step > 0 {
            return self.advance_introduction(stage);
        }

        let control = stage.overlay.control_at(point);
        match (self.state.phase(), control) {
            (Phase::Idle, _) | (_, Some(_)) => self.navigate(control, stage),
            (Phase::Slide(step), None) => {
                self.dispatch(step, stage, |slide, ctx| slide.on_tap(point, ctx));
                TapRoute::Slide(step)
            }
            (Phase::Intro(_), None) => TapRoute::Ignored,
        }
    }

    fn navigate(&mut self, control: Option<Control>, stage: &mut Stage) -> TapRoute {
        if self.state.navigation_locked {
            debug!("Navigation locked, tap dropped");
            return TapRoute::Dropped;
        }

        let current = self.state.current_step;
        let direction = match control {
            Some(Control::Back) => Direction::Backward,
            _ => Direction::Forward,
        };
        let possible = match direction {
            Direction::Forward => current < self.slides.len(),
            Direction::Backward => current > 1,
        };
        if !possible {
            debug!("No slide {:?} of step {}", direction, current);
            return TapRoute::Ignored;
        }

        if control == Some(Control::Next) {
            stage.overlay.flash_control(Control::Next);
        }
        self.restore_camera_angle(stage);

        let cooldown = if current == 1 {
            self.settings.first_slide_cooldown
        } else {
            self.settings.cooldown
        };
        self.lock_navigation(cooldown, stage);

        match direction {
            Direction::Forward => self.advance(stage),
            Direction::Backward => self.retreat(stage),
        };
        TapRoute::Navigation(direction)
    }

    fn advance_introduction(&mut self, stage: &mut Stage) -> TapRoute {
        if self.state.navigation_locked {
            debug!("Introduction tap dropped while locked");
            return TapRoute::Dropped;
        }
        self.lock_navigation(self.settings.cooldown, stage);

        let Some(intro) = self.intro.as_mut() else {
            panic!("Introduction beat {} without an introduction", self.state.intro_step);
        };

        if self.state.intro_step < INTRO_BEATS {
            self.state.intro_step += 1;
            intro.play_beat(
                self.state.intro_step,
                stage.scene.as_mut(),
                stage.camera.as_mut(),
            );
            info!("Introduction beat {}", self.state.intro_step);
        } else {
            intro.conclude(stage.scene.as_mut(), stage.camera.as_mut());
            self.state.intro_step = 0;
            self.timers
                .schedule(self.settings.intro_transition, ReelTimer::FinishIntroduction);
            info!("Introduction finished");
        }
        TapRoute::Introduction
    }

    fn detach_introduction(&mut self, stage: &mut Stage) {
        if !std::mem::take(&mut self.intro_attached) {
            return;
        }
        if let Some(intro) = self.intro.as_mut() {
            intro.teardown(stage.scene.as_mut());
            debug!("Introduction detached");
        }
    }

    pub fn handle_double_tap(&mut self, stage: &mut Stage) {
        if self.state.intro_step == 0 {
            self.restore_camera_angle(stage);
        }
    }

    pub fn handle_pan(&mut self, point: Vec2, stage: &mut Stage) {
        if let Phase::Slide(step) = self.state.phase() {
            self.dispatch(step, stage, |slide, ctx| slide.on_pan(point, ctx));
        }
    }

    pub fn handle_tilt(&mut self, offset: Vec2, stage: &mut Stage) {
        if self.state.intro_step > 0 {
            return;
        }
        let euler = self.tilt.apply(offset);
        let transform = stage.camera.transform().with_handle_euler(euler);
        stage.camera.set_transform(transform);
    }

    pub fn gesture_begin(&mut self) {
        self.tilt.begin();
    }

    pub fn gesture_end(&mut self, stage: &mut Stage) {
        if let Phase::Slide(step) = self.state.phase() {
            self.dispatch(step, stage, |slide, ctx| slide.on_gesture_end(ctx));
        }
    }

    fn restore_camera_angle(&mut self, stage: &mut Stage) {
        self.tilt.reset();
        let level = stage.camera.transform().with_handle_euler(Vec3::ZERO);
        stage
            .camera
            .animate_to(level, self.settings.camera_reset, Easing::EaseOut);
    }

    //--- Engine Callbacks -------------------------------------------------

    pub fn handle_contact(&mut self, contact: &Contact, stage: &mut Stage) {
        for step in self.hooks.contact_observers().to_vec() {
            self.dispatch(step, stage, |slide, ctx| slide.on_contact(contact, ctx));
        }
    }

    /// Advances the virtual clock by one frame: due timers, frame hooks,
    /// then engine-side animation.
    pub fn update(&mut self, dt: Duration, stage: &mut Stage) {
        for fired in self.timers.advance(dt) {
            self.handle_timer(fired.event, stage);
        }

        for step in self.hooks.frame_observers().to_vec() {
            self.dispatch(step, stage, |slide, ctx| slide.on_frame(ctx));
        }

        stage.advance(dt);
    }

    fn handle_timer(&mut self, event: ReelTimer, stage: &mut Stage) {
        match event {
            ReelTimer::UnlockNavigation { generation } => {
                if generation == self.state.lock_generation {
                    self.state.navigation_locked = false;
                    self.refresh_controls(stage);
                    debug!("Navigation unlocked");
                }
            }
            ReelTimer::FadeLabel { step, visit } => {
                if self.is_current_visit(step, visit) {
                    stage.overlay.show_label(None);
                } else {
                    debug!("Caption fade for slide {} skipped", step);
                }
            }
            ReelTimer::FinishIntroduction => {
                self.detach_introduction(stage);
                if self.state.phase() == Phase::Idle {
                    self.advance(stage);
                }
            }
            ReelTimer::Slide { step, visit, tag } => {
                if self.is_current_visit(step, visit) {
                    self.dispatch(step, stage, |slide, ctx| slide.on_timer(tag, ctx));
                } else {
                    warn!("Dropping stale timer {} of slide {}", tag, step);
                }
            }
        }
    }

    fn is_current_visit(&self, step: usize, visit: u64) -> bool {
        self.state.phase() == Phase::Slide(step) && self.state.visit == visit
    }
}

impl std::fmt::Debug for SlideSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideSequencer")
            .field("slides", &self.slides.len())
            .field("state", &self.state)
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::core::hooks::Hooks;
    use crate::stage::{control_anchor, CameraRig, Node, NodeId, SceneHandle};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    const FRAME: Duration = Duration::from_millis(50);
    const NAMES: [&str; 5] = ["one", "two", "three", "four", "five"];

    //--- Test Doubles -----------------------------------------------------

    struct Recorder {
        name: &'static str,
        log: Log,
        hooks: Hooks,
        hold: Option<Duration>,
        timer_on_enter: Option<Duration>,
        camera_offset: Vec3,
        node: Option<NodeId>,
    }

    impl Recorder {
        fn record(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{} {}", what, self.name));
        }
    }

    impl Slide for Recorder {
        fn label(&self) -> &'static str {
            self.name
        }

        fn label_hold(&self) -> Option<Duration> {
            self.hold
        }

        fn hooks(&self) -> Hooks {
            self.hooks
        }

        fn on_enter(&mut self, ctx: &mut SlideContext) {
            self.record("enter");
            self.node = Some(ctx.scene.attach(Node::new(self.name)));
            if self.camera_offset != Vec3::ZERO {
                let moved = ctx.camera.transform().translated(self.camera_offset);
                ctx.camera
                    .animate_to(moved, Duration::from_secs(1), Easing::EaseInOut);
            }
            if let Some(delay) = self.timer_on_enter {
                ctx.schedule(delay, 7);
            }
        }

        fn on_exit(&mut self, ctx: &mut SlideContext) {
            self.record("exit");
            if let Some(node) = self.node.take() {
                ctx.scene.detach(node);
            }
        }

        fn on_tap(&mut self, _point: Vec2, _ctx: &mut SlideContext) {
            self.record("tap");
        }

        fn on_pan(&mut self, _point: Vec2, _ctx: &mut SlideContext) {
            self.record("pan");
        }

        fn on_gesture_end(&mut self, _ctx: &mut SlideContext) {
            self.record("end");
        }

        fn on_timer(&mut self, tag: u32, _ctx: &mut SlideContext) {
            self.record(&format!("timer{}", tag));
        }

        fn on_frame(&mut self, _ctx: &mut SlideContext) {
            self.record("frame");
        }

        fn on_contact(&mut self, _contact: &Contact, _ctx: &mut SlideContext) {
            self.record("contact");
        }
    }

    struct RecordingIntro {
        log: Log,
    }

    impl Introduction for RecordingIntro {
        fn setup(&mut self, _scene: &mut dyn SceneHandle, _camera: &mut dyn CameraRig) {
            self.log.lock().unwrap().push("intro setup".into());
        }

        fn play_beat(&mut self, beat: u8, _scene: &mut dyn SceneHandle, _camera: &mut dyn CameraRig) {
            self.log.lock().unwrap().push(format!("intro beat {}", beat));
        }

        fn conclude(&mut self, _scene: &mut dyn SceneHandle, _camera: &mut dyn CameraRig) {
            self.log.lock().unwrap().push("intro conclude".into());
        }

        fn teardown(&mut self, _scene: &mut dyn SceneHandle) {
            self.log.lock().unwrap().push("intro teardown".into());
        }
    }

    //--- Harness ----------------------------------------------------------

    struct Harness {
        reel: SlideSequencer,
        stage: Stage,
        log: Log,
        viewport: ViewportConfig,
    }

    impl Harness {
        fn with(skip_intro: bool, customize: impl Fn(usize, &mut Recorder)) -> Self {
            let log: Log = Arc::default();
            let slides = NAMES
                .into_iter()
                .enumerate()
                .map(|(index, name)| {
                    let mut slide = Recorder {
                        name,
                        log: log.clone(),
                        hooks: Hooks::NONE,
                        hold: Some(Duration::from_secs(2)),
                        timer_on_enter: None,
                        camera_offset: Vec3::ZERO,
                        node: None,
                    };
                    customize(index + 1, &mut slide);
                    Box::new(slide) as Box<dyn Slide>
                })
                .collect();

            let intro = Box::new(RecordingIntro { log: log.clone() });
            let settings = SequencerSettings {
                skip_intro,
                ..SequencerSettings::default()
            };
            let viewport = ViewportConfig::default();
            let mut stage = Stage::headless(&viewport);
            let mut reel = SlideSequencer::new(slides, Some(intro), settings);
            reel.start(&mut stage);

            Self {
                reel,
                stage,
                log,
                viewport,
            }
        }

        fn skipping_intro() -> Self {
            Self::with(true, |_, _| {})
        }

        /// Enters `step` through the direct API.
        fn at(step: usize) -> Self {
            let mut harness = Self::skipping_intro();
            for _ in 0..step {
                harness.advance();
            }
            harness
        }

        fn advance(&mut self) -> bool {
            self.reel.advance(&mut self.stage)
        }

        fn retreat(&mut self) -> bool {
            self.reel.retreat(&mut self.stage)
        }

        fn tap(&mut self, control: Control) -> TapRoute {
            let point = control_anchor(&self.viewport, control);
            self.reel.handle_tap(point, &mut self.stage)
        }

        fn tap_scene(&mut self) -> TapRoute {
            self.reel.handle_tap(Vec2::new(640.0, 360.0), &mut self.stage)
        }

        fn wait(&mut self, seconds: f32) {
            let frames = (seconds / FRAME.as_secs_f32()).round() as usize;
            for _ in 0..frames {
                self.reel.update(FRAME, &mut self.stage);
            }
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn clear_log(&self) {
            self.log.lock().unwrap().clear();
        }
    }

    //--- Introduction -----------------------------------------------------

    #[test]
    fn starts_at_first_intro_beat() {
        let harness = Harness::with(false, |_, _| {});
        assert_eq!(harness.reel.phase(), Phase::Intro(1));
        assert_eq!(harness.reel.current_step(), 0);
        assert_eq!(harness.log(), vec!["intro setup"]);
    }

    #[test]
    fn two_intro_taps_lead_into_first_slide() {
        let mut h = Harness::with(false, |_, _| {});

        assert_eq!(h.tap_scene(), TapRoute::Introduction);
        assert_eq!(h.reel.phase(), Phase::Intro(2));

        h.wait(1.1);
        assert_eq!(h.tap_scene(), TapRoute::Introduction);
        assert_eq!(h.reel.phase(), Phase::Idle);

        h.wait(1.1);
        assert_eq!(h.reel.phase(), Phase::Slide(1));
        assert_eq!(h.reel.current_step(), 1);
        assert_eq!(
            h.log(),
            vec![
                "intro setup",
                "intro beat 2",
                "intro conclude",
                "intro teardown",
                "enter one"
            ]
        );
    }

    #[test]
    fn teardown_between_conclusion_and_first_slide_detaches_intro() {
        let mut h = Harness::with(false, |_, _| {});
        h.tap_scene();
        h.wait(1.1);
        h.tap_scene();
        assert_eq!(h.reel.phase(), Phase::Idle);

        h.reel.teardown(&mut h.stage);
        assert_eq!(h.reel.pending_timers(), 0);
        let teardowns = h.log().iter().filter(|l| *l == "intro teardown").count();
        assert_eq!(teardowns, 1);
    }

    #[test]
    fn finished_intro_is_detached_only_once() {
        let mut h = Harness::with(false, |_, _| {});
        h.tap_scene();
        h.wait(1.1);
        h.tap_scene();
        h.wait(1.1);
        h.reel.teardown(&mut h.stage);

        let teardowns = h.log().iter().filter(|l| *l == "intro teardown").count();
        assert_eq!(teardowns, 1);
    }

    #[test]
    fn intro_tap_during_cooldown_is_dropped() {
        let mut h = Harness::with(false, |_, _| {});
        h.tap_scene();
        assert_eq!(h.tap_scene(), TapRoute::Dropped);
        assert_eq!(h.reel.phase(), Phase::Intro(2));
    }

    #[test]
    #[should_panic(expected = "Cannot navigate during introduction")]
    fn navigating_during_intro_is_fatal() {
        let mut h = Harness::with(false, |_, _| {});
        h.advance();
    }

    #[test]
    fn skipped_intro_shows_go_and_any_tap_enters_first_slide() {
        let mut h = Harness::skipping_intro();
        assert_eq!(h.reel.phase(), Phase::Idle);
        assert_eq!(h.stage.overlay.label(), Some("Go!"));

        assert_eq!(h.tap_scene(), TapRoute::Navigation(Direction::Forward));
        assert_eq!(h.reel.phase(), Phase::Slide(1));
        assert_eq!(h.stage.overlay.label(), Some("one"));
    }

    #[test]
    fn tilt_is_ignored_during_intro() {
        let mut h = Harness::with(false, |_, _| {});
        let before = h.stage.camera.transform();
        h.reel
            .handle_tilt(Vec2::new(40.0, 40.0), &mut h.stage);
        assert_eq!(h.stage.camera.transform(), before);
    }

    //--- Navigation -------------------------------------------------------

    #[test]
    fn advance_then_retreat_round_trips() {
        for n in 1..=4 {
            let mut h = Harness::at(n);
            let saved = h.reel.saved_camera_transform(n);
            assert!(saved.is_some());

            assert!(h.advance());
            assert!(h.retreat());

            assert_eq!(h.reel.phase(), Phase::Slide(n));
            assert_eq!(h.reel.saved_camera_transform(n), saved);
        }
    }

    #[test]
    fn advance_at_last_slide_changes_nothing() {
        let mut h = Harness::at(5);
        let log = h.log();
        let camera = h.stage.camera.transform();
        let nodes = h.stage.scene.node_count();
        let timers = h.reel.pending_timers();

        assert!(!h.advance());

        assert_eq!(h.reel.phase(), Phase::Slide(5));
        assert_eq!(h.log(), log);
        assert_eq!(h.stage.camera.transform(), camera);
        assert_eq!(h.stage.scene.node_count(), nodes);
        assert_eq!(h.reel.pending_timers(), timers);
    }

    #[test]
    fn retreat_at_first_slide_changes_nothing() {
        let mut h = Harness::at(1);
        let log = h.log();
        let nodes = h.stage.scene.node_count();

        assert!(!h.retreat());

        assert_eq!(h.reel.phase(), Phase::Slide(1));
        assert_eq!(h.log(), log);
        assert_eq!(h.stage.scene.node_count(), nodes);
    }

    #[test]
    fn exit_runs_once_before_enter() {
        let mut h = Harness::at(2);
        h.clear_log();
        h.advance();
        assert_eq!(h.log(), vec!["exit two", "enter three"]);

        h.clear_log();
        h.retreat();
        assert_eq!(h.log(), vec!["exit three", "enter two"]);
    }

    #[test]
    fn retreating_from_three_stops_at_one() {
        let mut h = Harness::at(3);
        assert!(h.retreat());
        assert!(h.retreat());
        assert_eq!(h.reel.phase(), Phase::Slide(1));
        assert!(!h.retreat());
        assert_eq!(h.reel.current_step(), 1);
    }

    #[test]
    fn slide_content_does_not_leak_across_transitions() {
        let mut h = Harness::skipping_intro();
        let baseline = h.stage.scene.node_count();
        h.advance();
        assert_eq!(h.stage.scene.node_count(), baseline + 1);
        for _ in 0..4 {
            h.advance();
            assert_eq!(h.stage.scene.node_count(), baseline + 1);
        }
        h.reel.teardown(&mut h.stage);
        assert_eq!(h.stage.scene.node_count(), baseline);
    }

    //--- Camera -----------------------------------------------------------

    #[test]
    fn retreat_restores_first_entry_camera_not_exit_camera() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 3 {
                slide.camera_offset = Vec3::new(0.0, 0.0, 50.0);
            }
        });
        h.advance();
        h.advance();
        let first_entry = h.stage.camera.transform();
        assert_eq!(h.reel.saved_camera_transform(2), Some(first_entry));

        // Tilt while on slide 2, so the exit framing differs.
        h.reel.gesture_begin();
        h.reel.handle_tilt(Vec2::new(60.0, 30.0), &mut h.stage);
        assert_ne!(h.stage.camera.transform(), first_entry);

        h.advance();
        h.wait(1.5);
        h.retreat();

        assert_eq!(h.reel.phase(), Phase::Slide(2));
        assert_eq!(h.stage.camera.transform(), first_entry);
        assert!(h.stage.camera.is_animating());
        h.wait(1.0);
        assert_eq!(h.stage.camera.presented(), first_entry);
    }

    #[test]
    fn double_tap_levels_the_camera() {
        let mut h = Harness::at(1);
        h.reel.handle_tilt(Vec2::new(80.0, 80.0), &mut h.stage);
        assert_ne!(h.stage.camera.transform().handle_euler(), Vec3::ZERO);

        h.reel.handle_double_tap(&mut h.stage);
        let euler = h.stage.camera.transform().handle_euler();
        assert!(euler.length() < 1e-5);
    }

    //--- Debounce ---------------------------------------------------------

    #[test]
    fn second_tap_within_cooldown_is_dropped() {
        let mut h = Harness::at(2);
        assert_eq!(h.tap(Control::Next), TapRoute::Navigation(Direction::Forward));
        assert_eq!(h.tap(Control::Next), TapRoute::Dropped);
        assert_eq!(h.reel.current_step(), 3);

        h.wait(1.1);
        assert!(!h.reel.is_navigation_locked());
        assert_eq!(h.tap(Control::Next), TapRoute::Navigation(Direction::Forward));
        assert_eq!(h.reel.current_step(), 4);
    }

    #[test]
    fn leaving_first_slide_locks_longer() {
        let mut h = Harness::at(1);
        h.tap(Control::Next);
        assert_eq!(h.reel.current_step(), 2);

        h.wait(1.5);
        assert_eq!(h.tap(Control::Back), TapRoute::Dropped);
        h.wait(1.6);
        assert_eq!(h.tap(Control::Back), TapRoute::Navigation(Direction::Backward));
        assert_eq!(h.reel.current_step(), 1);
    }

    #[test]
    fn back_on_first_slide_is_ignored_without_locking() {
        let mut h = Harness::at(1);
        assert_eq!(h.tap(Control::Back), TapRoute::Ignored);
        assert!(!h.reel.is_navigation_locked());
        assert_eq!(h.reel.current_step(), 1);
    }

    #[test]
    fn controls_follow_position_after_unlock() {
        let mut h = Harness::at(4);
        h.tap(Control::Next);
        assert!(h.stage.overlay.control_alpha(Control::Next) < 0.9);
        h.wait(1.1);
        assert_eq!(h.stage.overlay.control_alpha(Control::Back), 1.0);
        assert_eq!(h.stage.overlay.control_alpha(Control::Next), 0.0);
    }

    //--- Routing ----------------------------------------------------------

    #[test]
    fn scene_tap_reaches_current_slide_only() {
        let mut h = Harness::at(3);
        h.clear_log();
        assert_eq!(h.tap_scene(), TapRoute::Slide(3));
        assert_eq!(h.log(), vec!["tap three"]);
    }

    #[test]
    fn pan_and_gesture_end_reach_current_slide() {
        let mut h = Harness::at(2);
        h.clear_log();
        h.reel.handle_gesture(Gesture::Begin, &mut h.stage);
        h.reel
            .handle_gesture(Gesture::Pan(Vec2::new(10.0, 10.0)), &mut h.stage);
        h.reel.handle_gesture(Gesture::End, &mut h.stage);
        assert_eq!(h.log(), vec!["pan two", "end two"]);
    }

    #[test]
    fn pan_at_idle_goes_nowhere() {
        let mut h = Harness::skipping_intro();
        h.reel.handle_pan(Vec2::ZERO, &mut h.stage);
        assert!(h.log().is_empty());
    }

    //--- Labels -----------------------------------------------------------

    #[test]
    fn caption_fades_after_hold() {
        let mut h = Harness::at(1);
        assert_eq!(h.stage.overlay.label(), Some("one"));
        h.wait(2.1);
        assert_eq!(h.stage.overlay.label(), None);
    }

    #[test]
    fn stale_caption_fade_does_not_hide_newer_caption() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 2 {
                slide.hold = None;
            }
        });
        h.advance();
        h.advance();
        h.wait(2.5);
        assert_eq!(h.stage.overlay.label(), Some("two"));
    }

    #[test]
    fn caption_fade_from_earlier_visit_spares_return_visit() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 2 {
                slide.hold = Some(Duration::from_secs(4));
            }
        });
        h.advance();
        h.advance();
        h.wait(1.0);
        h.advance();
        h.wait(1.0);
        h.retreat();
        assert_eq!(h.stage.overlay.label(), Some("two"));

        h.wait(2.1);
        assert_eq!(h.stage.overlay.label(), Some("two"));
        h.wait(2.0);
        assert_eq!(h.stage.overlay.label(), None);
    }

    //--- Timers & Hooks ---------------------------------------------------

    #[test]
    fn slide_timer_is_delivered_while_current() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 1 {
                slide.timer_on_enter = Some(Duration::from_millis(500));
            }
        });
        h.advance();
        h.wait(0.6);
        assert!(h.log().contains(&"timer7 one".to_string()));
    }

    #[test]
    fn slide_timer_from_earlier_visit_is_dropped_on_return() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 2 {
                slide.timer_on_enter = Some(Duration::from_millis(1500));
            }
        });
        h.advance();
        h.advance();
        h.wait(0.5);
        h.advance();
        h.wait(0.5);
        h.retreat();
        h.clear_log();

        h.wait(0.7);
        assert!(!h.log().iter().any(|line| line.starts_with("timer")));
        h.wait(1.0);
        let delivered = h.log().iter().filter(|l| *l == "timer7 two").count();
        assert_eq!(delivered, 1);
    }

    #[test]
    fn stale_slide_timer_is_dropped() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 1 {
                slide.timer_on_enter = Some(Duration::from_millis(500));
            }
        });
        h.advance();
        h.advance();
        h.wait(0.6);
        assert!(!h.log().iter().any(|line| line.starts_with("timer")));
    }

    #[test]
    fn frame_hook_only_while_slide_is_current() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 2 {
                slide.hooks = Hooks::FRAME;
            }
        });
        h.advance();
        h.wait(0.1);
        assert!(!h.log().iter().any(|line| line.starts_with("frame")));

        h.advance();
        assert_eq!(h.reel.hooks().frame_observers(), &[2]);
        h.wait(0.1);
        assert!(h.log().contains(&"frame two".to_string()));

        h.advance();
        assert!(h.reel.hooks().is_empty());
        h.clear_log();
        h.wait(0.1);
        assert!(h.log().is_empty());
    }

    #[test]
    fn contacts_reach_registered_slide_only() {
        let mut h = Harness::with(true, |step, slide| {
            if step == 4 {
                slide.hooks = Hooks::CONTACT;
            }
        });
        let contact = Contact {
            node_a: NodeId(1),
            node_b: NodeId(2),
            point: Vec3::ZERO,
        };

        h.advance();
        h.reel.handle_contact(&contact, &mut h.stage);
        assert!(!h.log().iter().any(|line| line.starts_with("contact")));

        for _ in 0..3 {
            h.advance();
        }
        h.clear_log();
        h.reel.handle_contact(&contact, &mut h.stage);
        assert_eq!(h.log(), vec!["contact four"]);
    }
}

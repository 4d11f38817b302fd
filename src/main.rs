//=========================================================================
// Scene Reel — Headless Tour
//=========================================================================
//
// Plays the reel against the headless stage with a scripted sequence of
// clicks, a pan and an Alt-drag, then shuts it down.
//
// Usage:
//   scene_reel [config.toml]
//
// Logging defaults to `info`; override with RUST_LOG.
//
//=========================================================================

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use glam::Vec2;
use log::{error, info};

use scene_reel::config::ReelConfig;
use scene_reel::core::input::{Modifiers, PointerEvent};
use scene_reel::core::HostEvent;
use scene_reel::runtime::{RuntimeBuilder, RuntimeHandle};
use scene_reel::stage::{control_anchor, Control, Stage};

//=== Script ==============================================================

enum Step {
    Click(Vec2),
    Drag { from: Vec2, to: Vec2, alt: bool },
    Wait(f32),
}

fn script(config: &ReelConfig) -> Vec<Step> {
    let viewport = &config.viewport;
    let center = Vec2::new(viewport.width * 0.5, viewport.height * 0.5);
    let next = control_anchor(viewport, Control::Next);
    let back = control_anchor(viewport, Control::Back);
    let settle = config.navigation.first_slide_cooldown_secs + 0.5;

    let mut steps = Vec::new();
    if !config.reel.skip_intro {
        steps.extend([Step::Click(center), Step::Wait(1.5), Step::Click(center)]);
    } else {
        steps.push(Step::Click(center));
    }
    steps.extend([
        // Physics: wait for the drop, then blow the pile apart.
        Step::Wait(3.0),
        Step::Click(center),
        Step::Wait(settle),
        Step::Click(next),
        // Particles: aim the hose at the fire.
        Step::Wait(3.5),
        Step::Drag {
            from: center,
            to: Vec2::new(center.x * 0.6, center.y * 1.4),
            alt: false,
        },
        Step::Wait(3.5),
        Step::Click(next),
        // Fields: drag the field around.
        Step::Wait(1.5),
        Step::Drag {
            from: center,
            to: center + Vec2::new(200.0, 100.0),
            alt: false,
        },
        Step::Wait(1.5),
        Step::Click(next),
        Step::Wait(3.0),
        Step::Click(next),
        // Shaders: one modifier, a tilt, then walk back.
        Step::Wait(2.0),
        Step::Click(center),
        Step::Drag {
            from: center,
            to: center + Vec2::new(-80.0, 40.0),
            alt: true,
        },
        Step::Wait(1.5),
        Step::Click(back),
        Step::Wait(1.5),
        Step::Click(back),
        Step::Wait(1.0),
    ]);
    steps
}

fn play(handle: &RuntimeHandle, steps: &[Step]) {
    for step in steps {
        match *step {
            Step::Click(at) => {
                handle.send(PointerEvent::press(at));
                handle.send(PointerEvent::Up { position: at });
            }
            Step::Drag { from, to, alt } => {
                let modifiers = if alt { Modifiers::ALT } else { Modifiers::NONE };
                handle.send(PointerEvent::Down {
                    position: from,
                    click_count: 1,
                    modifiers,
                });
                for i in 1..=10 {
                    let position = from.lerp(to, i as f32 / 10.0);
                    handle.send(PointerEvent::Dragged {
                        position,
                        modifiers,
                    });
                    thread::sleep(Duration::from_millis(30));
                }
                handle.send(PointerEvent::Up { position: to });
            }
            Step::Wait(secs) => thread::sleep(Duration::from_secs_f32(secs)),
        }
    }
}

//=== Entry Point =========================================================

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match ReelConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Invalid configuration {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => ReelConfig::default(),
    };

    let steps = script(&config);
    let stage = Stage::headless(&config.viewport);
    let handle = match RuntimeBuilder::new(config).build(stage).spawn() {
        Ok(handle) => handle,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    play(&handle, &steps);
    if !handle.send(HostEvent::Shutdown) {
        error!("Core thread stopped early");
    }

    match handle.join() {
        Ok(stage) => {
            info!("Tour finished: {:?}", stage);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

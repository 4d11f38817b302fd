//=========================================================================
// Reel Runtime
//
// Main entry point for running a reel on its own logic thread.
//
// Architecture:
// ```text
//     RuntimeBuilder  ──build()──>  Runtime  ──spawn()──>  RuntimeHandle
//         │                           │                       │
//         ├─ with_tps()               └─ owns CoreLoop        ├─ sender()
//         └─ with_channel_capacity()                          └─ shutdown()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};
use log::{error, info, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::config::ReelConfig;
use crate::core::{CoreLoop, HostEvent};
use crate::slides::build_reel;
use crate::stage::Stage;

//=== RuntimeError ========================================================

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to spawn the core thread: {0}")]
    ThreadSpawn(#[source] io::Error),

    #[error("core thread panicked")]
    CoreThreadPanicked,
}

//=== RuntimeBuilder ======================================================

/// Builder for configuring and constructing a [`Runtime`].
///
/// # Default Values
///
/// Taken from the `[runtime]` section of the configuration:
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 events
///
/// # Examples
///
/// ```no_run
/// use scene_reel::config::ReelConfig;
/// use scene_reel::runtime::RuntimeBuilder;
/// use scene_reel::stage::Stage;
///
/// let config = ReelConfig::default();
/// let stage = Stage::headless(&config.viewport);
/// let handle = RuntimeBuilder::new(config)
///     .with_tps(120.0)
///     .build(stage)
///     .spawn()
///     .expect("core thread");
/// handle.shutdown().expect("clean shutdown");
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeBuilder {
    config: ReelConfig,
    tps: f64,
    channel_capacity: usize,
}

impl RuntimeBuilder {
    pub fn new(config: ReelConfig) -> Self {
        Self {
            tps: config.runtime.tps,
            channel_capacity: config.runtime.channel_capacity,
            config,
        }
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the channel capacity for host → core communication.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Builds the environment and the reel on `stage`.
    pub fn build(self, mut stage: Stage) -> Runtime {
        info!(
            "Building runtime (TPS: {}, channel: {})",
            self.tps, self.channel_capacity
        );

        let sequencer = build_reel(&mut stage, &self.config);
        let (sender, receiver) = bounded(self.channel_capacity);

        Runtime {
            core: CoreLoop::new(sequencer, stage, receiver, self.tps),
            sender,
        }
    }
}

//=== Runtime =============================================================

/// A reel ready to run, not yet on its thread.
#[derive(Debug)]
pub struct Runtime {
    core: CoreLoop,
    sender: Sender<HostEvent>,
}

impl Runtime {
    /// Channel end the host feeds events into.
    pub fn sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }

    /// Starts the logic thread.
    pub fn spawn(self) -> Result<RuntimeHandle, RuntimeError> {
        let core = self.core;
        let join = thread::Builder::new()
            .name("reel-core".into())
            .spawn(move || core.run())
            .map_err(RuntimeError::ThreadSpawn)?;

        info!("Core logic thread spawned");
        Ok(RuntimeHandle {
            sender: self.sender,
            join,
        })
    }
}

//=== RuntimeHandle =======================================================

/// Handle to a running reel.
#[derive(Debug)]
pub struct RuntimeHandle {
    sender: Sender<HostEvent>,
    join: JoinHandle<Stage>,
}

impl RuntimeHandle {
    pub fn sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }

    /// Sends `event`. Returns false once the core thread has gone away.
    pub fn send(&self, event: impl Into<HostEvent>) -> bool {
        self.sender.send(event.into()).is_ok()
    }

    /// Waits for the core thread to finish on its own.
    pub fn join(self) -> Result<Stage, RuntimeError> {
        drop(self.sender);
        match self.join.join() {
            Ok(stage) => {
                info!("Core thread terminated cleanly");
                Ok(stage)
            }
            Err(panic) => {
                error!("Core thread panicked: {:?}", panic);
                Err(RuntimeError::CoreThreadPanicked)
            }
        }
    }

    /// Asks the core thread to stop, then joins it.
    pub fn shutdown(self) -> Result<Stage, RuntimeError> {
        if self.sender.send(HostEvent::Shutdown).is_err() {
            warn!("Core thread already gone before shutdown");
        }
        self.join()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

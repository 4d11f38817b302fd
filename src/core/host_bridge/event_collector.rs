//=========================================================================
// Event Collector
//=========================================================================
//
// Host event collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<HostEvent> → collect_frame() → frame events → TickControl
//
// Bounded polling prevents starvation. Pacing is left to the core loop,
// which sleeps out the rest of each tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::HostEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Most events taken off the channel in one tick.
pub(crate) const MAX_EVENTS_PER_FRAME: usize = 100;

/// Collects host events with bounded polling.
pub(crate) struct EventCollector {
    receiver: Receiver<HostEvent>,
    events: Vec<HostEvent>,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<HostEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(16),
        }
    }

    /// Collects pending host events (bounded to prevent starvation).
    ///
    /// Events received before a shutdown in the same frame are kept, so
    /// the caller may still route them before exiting.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.events.clear();
        let mut drained = 0;

        while drained < MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(HostEvent::Shutdown) => {
                    debug!("Shutdown requested by host");
                    return TickControl::Exit;
                }
                Ok(event) => {
                    self.events.push(event);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_EVENTS_PER_FRAME {
            warn!("Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    /// Events collected this frame, in arrival order.
    #[cfg(test)]
    pub(crate) fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Takes ownership of collected events, leaving an empty vec.
    pub(crate) fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

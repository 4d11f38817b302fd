//=========================================================================
// Host Bridge
//=========================================================================
//
// Bridges the host (a rendering layer or the demo driver) with the logic
// thread. The host only ever sends `HostEvent`s; everything else lives
// on the core side.
//
// Components:
// - `interface`: the event type crossing the channel
// - `event_collector`: core-side bounded draining of that channel
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub(crate) use event_collector::EventCollector;
pub use event_collector::TickControl;
pub use interface::HostEvent;

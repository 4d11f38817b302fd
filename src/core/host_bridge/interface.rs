//=========================================================================
// Host Bridge Interface
//=========================================================================
//
// Host-to-core event types.
//
// The host is whatever owns the view: a rendering layer feeding pointer
// input and physics contacts, or the headless demo driver.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::PointerEvent;
use crate::stage::Contact;

//=== HostEvent ===========================================================

/// Events sent from the host to the logic thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer input from the view.
    Pointer(PointerEvent),

    /// Physics contact reported by the engine.
    Contact(Contact),

    /// The host is going away; end the reel.
    Shutdown,
}

impl From<PointerEvent> for HostEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<Contact> for HostEvent {
    fn from(contact: Contact) -> Self {
        Self::Contact(contact)
    }
}

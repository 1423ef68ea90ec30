//! Cross-filter messages
//!
//! Filters never touch each other's state. Everything they need to tell a
//! sibling travels as a [`CustomEvent`] through the dispatcher.

use smallvec::SmallVec;

use crate::pointer::PointerId;

/// Pointer ids carried by a delay-up message
pub type PointerIdSet = SmallVec<[PointerId; 4]>;

/// Stage of a delay-up negotiation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DelayUpMessage {
    /// Hold off treating these pointers' up as terminal
    DelayUp,
    /// The held up was claimed by the sender; never act on it
    DelayedUpConsumed,
    /// The hold is lifted; act on the up as if it just happened
    DelayedUpNotConsumed,
}

/// Asks sibling filters to hold, release or drop an up transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayUpEvent {
    pub message: DelayUpMessage,
    pub pointers: PointerIdSet,
}

impl DelayUpEvent {
    pub fn new(message: DelayUpMessage, pointers: impl IntoIterator<Item = PointerId>) -> Self {
        Self {
            message,
            pointers: pointers.into_iter().collect(),
        }
    }

    pub fn is_resolution(&self) -> bool {
        self.message != DelayUpMessage::DelayUp
    }
}

/// Every message a filter can send to its siblings
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomEvent {
    /// Delay-up negotiation
    DelayUp(DelayUpEvent),
    /// A long press fired; competing long presses should stand down
    LongPressFired,
}

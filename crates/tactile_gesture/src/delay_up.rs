//! Delay-up arbitration
//!
//! A filter that is still deciding what an up means (a double tap waiting for
//! the second tap, for example) asks its siblings to hold off treating that up
//! as terminal:
//!
//! ```text
//! sender                          receiver (tap)
//!   DelayUp {ids}          ──▶    ids blocked; a terminal up on them is held
//!   ... up delivered through the passes as usual ...
//!   DelayedUpConsumed {ids}  ──▶  held up dropped, no callback
//!   DelayedUpNotConsumed {ids} ─▶ held up evaluated now
//! ```
//!
//! [`DelayUpDispatcher`] is the sender's half, [`DelayedUps`] the receiver's.

use rustc_hash::FxHashSet;
use tactile_input::{
    CustomEvent, DelayUpEvent, DelayUpMessage, PointerId, PointerIdSet, PointerInputChange,
};

use crate::filter::FilterContext;

/// Sender side: remembers which ups it is holding and resolves them once
#[derive(Debug, Default)]
pub struct DelayUpDispatcher {
    blocked: Option<PointerIdSet>,
}

impl DelayUpDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_delaying(&self) -> bool {
        self.blocked.is_some()
    }

    /// Block the ups contained in `changes` and tell the siblings
    pub fn delay_up(&mut self, changes: &[PointerInputChange], ctx: &mut FilterContext<'_>) {
        let ids: PointerIdSet = changes
            .iter()
            .filter(|c| c.changed_to_up())
            .map(|c| c.id)
            .collect();
        if ids.is_empty() {
            return;
        }
        if self.blocked.is_some() {
            tracing::warn!("delaying new ups while earlier ones are unresolved");
        }
        tracing::trace!(?ids, "delaying up");
        ctx.dispatch_custom_event(CustomEvent::DelayUp(DelayUpEvent::new(
            DelayUpMessage::DelayUp,
            ids.iter().copied(),
        )));
        self.blocked = Some(ids);
    }

    /// Resolve the held ups. Does nothing if nothing is held.
    pub fn dispatch_delayed_up(&mut self, consumed: bool, ctx: &mut FilterContext<'_>) {
        let Some(ids) = self.blocked.take() else {
            return;
        };
        let message = if consumed {
            DelayUpMessage::DelayedUpConsumed
        } else {
            DelayUpMessage::DelayedUpNotConsumed
        };
        tracing::trace!(?ids, ?message, "resolving delayed up");
        ctx.dispatch_custom_event(CustomEvent::DelayUp(DelayUpEvent::new(message, ids)));
    }
}

/// What a delay-up message meant for the receiver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayUpOutcome {
    /// Did not concern the held up
    Ignored,
    /// The held up (or a future one) is still blocked
    Blocked,
    /// The held up was released and should be evaluated now
    Released,
    /// The held up was claimed by the sender and must be dropped
    Vetoed,
}

/// Receiver side: blocked pointers plus the terminal up being held
#[derive(Debug, Default)]
pub struct DelayedUps {
    blocked: FxHashSet<PointerId>,
    held: PointerIdSet,
}

impl DelayedUps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blocked(&self, id: PointerId) -> bool {
        self.blocked.contains(&id)
    }

    /// True if there is at least one up and every one of them is blocked
    pub fn all_blocked(&self, ups: &[PointerId]) -> bool {
        !ups.is_empty() && ups.iter().all(|id| self.blocked.contains(id))
    }

    pub fn has_blocked(&self) -> bool {
        !self.blocked.is_empty()
    }

    /// Hold a terminal up until its pointers are resolved
    pub fn hold(&mut self, ups: &[PointerId]) {
        self.held = ups.iter().copied().collect();
    }

    pub fn is_holding(&self) -> bool {
        !self.held.is_empty()
    }

    /// Apply one delay-up message
    pub fn apply(&mut self, event: &DelayUpEvent) -> DelayUpOutcome {
        if event.message == DelayUpMessage::DelayUp {
            self.blocked.extend(event.pointers.iter().copied());
            return DelayUpOutcome::Blocked;
        }

        let touches_held = event.pointers.iter().any(|id| self.held.contains(id));
        for id in &event.pointers {
            self.blocked.remove(id);
        }
        if !touches_held {
            return DelayUpOutcome::Ignored;
        }
        if event.message == DelayUpMessage::DelayedUpConsumed {
            self.held.clear();
            return DelayUpOutcome::Vetoed;
        }
        if self.held.iter().any(|id| self.blocked.contains(id)) {
            return DelayUpOutcome::Blocked;
        }
        self.held.clear();
        DelayUpOutcome::Released
    }

    pub fn clear(&mut self) {
        self.blocked.clear();
        self.held.clear();
    }
}

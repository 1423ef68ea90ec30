//! Tap recognition

use smallvec::SmallVec;
use tactile_input::{CustomEvent, IntSize, Offset, PointerEventPass, PointerId, PointerInputChange};

use crate::bounds::all_pointers_in_bounds;
use crate::delay_up::{DelayUpOutcome, DelayedUps};
use crate::filter::{FilterContext, PointerInputFilter, PositionCallback};

/// Recognizes a complete down-to-up inside the container with no claimed movement.
///
/// The tap fires when the last pointer lifts, with that pointer's final
/// position. Siblings can hold the terminal up through the delay-up protocol;
/// a held up fires when it is released and is dropped if the sender claims it.
pub struct TapFilter {
    on_tap: PositionCallback,
    consume_changes: bool,
    enabled: bool,
    primed: bool,
    down_pointers: SmallVec<[PointerId; 4]>,
    delayed: DelayedUps,
    held_position: Option<Offset>,
}

impl Default for TapFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TapFilter {
    pub fn new() -> Self {
        Self {
            on_tap: Box::new(|_| {}),
            consume_changes: true,
            enabled: true,
            primed: false,
            down_pointers: SmallVec::new(),
            delayed: DelayedUps::new(),
            held_position: None,
        }
    }

    pub fn on_tap<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Offset) + 'static,
    {
        self.on_tap = Box::new(callback);
        self
    }

    /// Whether the terminal up is consumed when the tap fires (default true)
    pub fn with_consume_changes(mut self, consume: bool) -> Self {
        self.consume_changes = consume;
        self
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    fn reset(&mut self) {
        self.primed = false;
        self.down_pointers.clear();
        self.delayed.clear();
        self.held_position = None;
    }

    fn fire(&mut self, position: Offset) {
        tracing::debug!(?position, "tap");
        (self.on_tap)(position);
    }

    /// Main pass while primed: track pointers and resolve the terminal up
    fn track(&mut self, changes: Vec<PointerInputChange>, size: IntSize) -> Vec<PointerInputChange> {
        if !all_pointers_in_bounds(&changes, size) {
            tracing::trace!("tap abandoned: pointer left bounds");
            self.reset();
            return changes;
        }

        for change in &changes {
            if change.changed_to_down_ignore_consumed() && !self.down_pointers.contains(&change.id) {
                self.down_pointers.push(change.id);
            } else if change.changed_to_up_ignore_consumed() {
                self.down_pointers.retain(|id| *id != change.id);
            }
        }
        if !self.down_pointers.is_empty() {
            return changes;
        }

        let position = changes
            .iter()
            .find(|c| c.changed_to_up_ignore_consumed())
            .map(|c| c.current.position);
        let Some(position) = position else {
            return changes;
        };
        let claimed = changes
            .iter()
            .any(|c| c.changed_to_up_ignore_consumed() && !c.changed_to_up());
        if claimed {
            tracing::trace!("tap abandoned: terminal up claimed elsewhere");
            self.reset();
            return changes;
        }

        let ids: SmallVec<[PointerId; 4]> = changes
            .iter()
            .filter(|c| c.changed_to_up())
            .map(|c| c.id)
            .collect();
        if self.delayed.all_blocked(&ids) {
            tracing::trace!(?ids, "terminal up held by delay-up");
            self.delayed.hold(&ids);
            self.held_position = Some(position);
            return changes;
        }

        self.reset();
        self.fire(position);
        if !self.consume_changes {
            return changes;
        }
        changes
            .into_iter()
            .map(|c| if c.changed_to_up() { c.consume_down_change() } else { c })
            .collect()
    }
}

impl PointerInputFilter for TapFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        if changes.is_empty() {
            return changes;
        }

        match pass {
            PointerEventPass::Main => {
                if changes.iter().all(|c| c.changed_to_down()) {
                    // A fresh gesture replaces anything left waiting on a delay-up
                    self.reset();
                    if self.enabled && all_pointers_in_bounds(&changes, size) {
                        self.primed = true;
                        self.down_pointers = changes.iter().map(|c| c.id).collect();
                    }
                    changes
                } else if self.primed {
                    self.track(changes, size)
                } else {
                    changes
                }
            }
            PointerEventPass::Final => {
                if self.primed && changes.iter().any(|c| c.any_position_change_consumed()) {
                    tracing::trace!("tap abandoned: movement consumed");
                    self.reset();
                }
                changes
            }
            PointerEventPass::Initial => changes,
        }
    }

    fn on_custom_event(&mut self, event: &CustomEvent, _ctx: &mut FilterContext<'_>) {
        let CustomEvent::DelayUp(event) = event else {
            return;
        };
        if !self.primed {
            return;
        }
        match self.delayed.apply(event) {
            DelayUpOutcome::Released => {
                let held = self.held_position.take();
                self.reset();
                if let Some(position) = held {
                    self.fire(position);
                }
            }
            DelayUpOutcome::Vetoed => {
                tracing::trace!("held tap claimed by delay-up sender");
                self.reset();
            }
            DelayUpOutcome::Blocked | DelayUpOutcome::Ignored => {}
        }
    }

    fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {
        self.reset();
    }

    fn set_enabled(&mut self, enabled: bool, _ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    fn name(&self) -> &'static str {
        "tap"
    }
}

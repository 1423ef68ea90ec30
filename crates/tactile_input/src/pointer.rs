//! Pointer changes and the pass order filters see them in
//!
//! A [`PointerInputChange`] is one pointer's state in the current batch,
//! together with its state in the previous batch and whatever portion of the
//! transition earlier filters have already claimed. Changes are `Copy` values:
//! consuming returns a new change and never mutates the input.

use std::fmt;
use std::time::Duration;

use crate::geometry::Offset;

/// Tolerance for consumption bounds checks, absorbs `f32` rounding
const CONSUMPTION_EPSILON: f32 = 1e-3;

/// Identifier of a single contact for its down-to-up lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pointer#{}", self.0)
    }
}

/// Traversal phases of a single batch, in dispatch order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerEventPass {
    /// First look at the batch, used to reserve transitions ahead of others
    Initial,
    /// Where most gestures make their decisions
    Main,
    /// Last look, sees everything the other filters consumed
    Final,
}

impl PointerEventPass {
    /// All passes in the order the dispatcher runs them
    pub const ALL: [PointerEventPass; 3] = [
        PointerEventPass::Initial,
        PointerEventPass::Main,
        PointerEventPass::Final,
    ];
}

/// Snapshot of a pointer at one point in time
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInputData {
    /// Position in the container's local coordinates
    pub position: Offset,
    /// Uptime at which the sample was taken
    pub time: Duration,
    /// Whether the contact is touching/pressed
    pub pressed: bool,
}

impl PointerInputData {
    pub const fn new(position: Offset, time: Duration, pressed: bool) -> Self {
        Self {
            position,
            time,
            pressed,
        }
    }
}

/// What earlier filters have already claimed from a change
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConsumedData {
    /// Portion of the position delta already claimed
    pub position_change: Offset,
    /// Whether the down or up transition has been claimed
    pub down_change: bool,
}

/// One pointer's state in the current batch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInputChange {
    pub id: PointerId,
    pub current: PointerInputData,
    pub previous: PointerInputData,
    pub consumed: ConsumedData,
}

impl PointerInputChange {
    pub fn new(id: PointerId, current: PointerInputData, previous: PointerInputData) -> Self {
        Self {
            id,
            current,
            previous,
            consumed: ConsumedData::default(),
        }
    }

    /// Pointer went down in this batch and nobody has claimed it yet
    pub fn changed_to_down(&self) -> bool {
        !self.consumed.down_change && self.changed_to_down_ignore_consumed()
    }

    pub fn changed_to_down_ignore_consumed(&self) -> bool {
        !self.previous.pressed && self.current.pressed
    }

    /// Pointer went up in this batch and nobody has claimed it yet
    pub fn changed_to_up(&self) -> bool {
        !self.consumed.down_change && self.changed_to_up_ignore_consumed()
    }

    pub fn changed_to_up_ignore_consumed(&self) -> bool {
        self.previous.pressed && !self.current.pressed
    }

    /// Raw position delta, regardless of consumption
    pub fn position_change_ignore_consumed(&self) -> Offset {
        self.current.position - self.previous.position
    }

    /// Position delta that has not been claimed yet
    pub fn position_change(&self) -> Offset {
        self.position_change_ignore_consumed() - self.consumed.position_change
    }

    pub fn position_changed(&self) -> bool {
        !self.position_change().is_zero()
    }

    pub fn any_position_change_consumed(&self) -> bool {
        !self.consumed.position_change.is_zero()
    }

    /// Current position with only the unclaimed part of the move applied
    pub fn unconsumed_position(&self) -> Offset {
        self.previous.position + self.position_change()
    }

    /// Claim part of the position delta.
    ///
    /// Claiming more than the raw delta on an axis, or claiming in the opposite
    /// direction, is a contract violation: it asserts in debug builds and is
    /// clamped to the available delta in release builds.
    #[must_use]
    pub fn consume_position_change(self, dx: f32, dy: f32) -> Self {
        let raw = self.position_change_ignore_consumed();
        let wanted = self.consumed.position_change + Offset::new(dx, dy);
        let clamped = Offset::new(clamp_axis(wanted.x, raw.x), clamp_axis(wanted.y, raw.y));
        debug_assert!(
            (wanted.x - clamped.x).abs() <= CONSUMPTION_EPSILON
                && (wanted.y - clamped.y).abs() <= CONSUMPTION_EPSILON,
            "{} consumed {:?} of a {:?} delta",
            self.id,
            wanted,
            raw
        );
        Self {
            consumed: ConsumedData {
                position_change: clamped,
                ..self.consumed
            },
            ..self
        }
    }

    /// Claim the down/up transition
    #[must_use]
    pub fn consume_down_change(self) -> Self {
        Self {
            consumed: ConsumedData {
                down_change: true,
                ..self.consumed
            },
            ..self
        }
    }

    /// Clamp a proposed additional consumption so it fits inside the
    /// unclaimed delta on each axis
    pub fn clamp_to_available(&self, dx: f32, dy: f32) -> Offset {
        let remaining = self.position_change();
        Offset::new(clamp_axis(dx, remaining.x), clamp_axis(dy, remaining.y))
    }
}

/// Clamp `value` into the closed range between zero and `limit`
pub(crate) fn clamp_axis(value: f32, limit: f32) -> f32 {
    if limit >= 0.0 {
        value.clamp(0.0, limit)
    } else {
        value.clamp(limit, 0.0)
    }
}

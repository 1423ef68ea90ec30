//! Helpers for driving filters in tests

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tactile_input::{
    CustomEvent, IntSize, Offset, PointerEventPass, PointerId, PointerInputChange,
    PointerInputData,
};

use crate::filter::{FilterContext, PointerInputFilter};

pub(crate) fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A pointer that just went down
pub(crate) fn down(id: u64, time_ms: u64, x: f32, y: f32) -> PointerInputChange {
    let position = Offset::new(x, y);
    PointerInputChange::new(
        PointerId(id),
        PointerInputData::new(position, ms(time_ms), true),
        PointerInputData::new(position, ms(time_ms), false),
    )
}

/// Advance a change to its next state in a new batch
pub(crate) trait ChangeExt {
    fn move_to(&self, time_ms: u64, x: f32, y: f32) -> PointerInputChange;
    fn move_by(&self, time_ms: u64, dx: f32, dy: f32) -> PointerInputChange;
    fn up(&self, time_ms: u64) -> PointerInputChange;
    fn up_at(&self, time_ms: u64, x: f32, y: f32) -> PointerInputChange;
}

impl ChangeExt for PointerInputChange {
    fn move_to(&self, time_ms: u64, x: f32, y: f32) -> PointerInputChange {
        PointerInputChange::new(
            self.id,
            PointerInputData::new(Offset::new(x, y), ms(time_ms), true),
            self.current,
        )
    }

    fn move_by(&self, time_ms: u64, dx: f32, dy: f32) -> PointerInputChange {
        let target = self.current.position + Offset::new(dx, dy);
        self.move_to(time_ms, target.x, target.y)
    }

    fn up(&self, time_ms: u64) -> PointerInputChange {
        let position = self.current.position;
        self.up_at(time_ms, position.x, position.y)
    }

    fn up_at(&self, time_ms: u64, x: f32, y: f32) -> PointerInputChange {
        PointerInputChange::new(
            self.id,
            PointerInputData::new(Offset::new(x, y), ms(time_ms), false),
            self.current,
        )
    }
}

/// Shared, clonable record of callback invocations
pub(crate) struct EventLog<T>(Rc<RefCell<Vec<T>>>);

impl<T> Clone for EventLog<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone> EventLog<T> {
    pub(crate) fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    pub(crate) fn push(&self, value: T) {
        self.0.borrow_mut().push(value);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.0.borrow().clone()
    }

    pub(crate) fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

type InputFn = Box<dyn FnMut(Vec<PointerInputChange>, PointerEventPass, IntSize) -> Vec<PointerInputChange>>;

/// Filter built from closures, stands in for sibling filters in tests
pub(crate) struct ClosureFilter {
    input: InputFn,
    events: Option<Box<dyn FnMut(&CustomEvent)>>,
}

impl ClosureFilter {
    pub(crate) fn new<F>(mut input: F) -> Self
    where
        F: FnMut(Vec<PointerInputChange>, PointerEventPass) -> Vec<PointerInputChange> + 'static,
    {
        Self::with_size(move |changes, pass, _| input(changes, pass))
    }

    pub(crate) fn with_size<F>(input: F) -> Self
    where
        F: FnMut(Vec<PointerInputChange>, PointerEventPass, IntSize) -> Vec<PointerInputChange>
            + 'static,
    {
        Self {
            input: Box::new(input),
            events: None,
        }
    }

    pub(crate) fn with_events<F>(mut self, events: F) -> Self
    where
        F: FnMut(&CustomEvent) + 'static,
    {
        self.events = Some(Box::new(events));
        self
    }

    /// Consume the given movement of every pointer during one pass
    pub(crate) fn consuming_movement(pass: PointerEventPass, dx: f32, dy: f32) -> Self {
        Self::new(move |changes, current| {
            if current != pass {
                return changes;
            }
            changes
                .into_iter()
                .map(|c| {
                    let amount = c.clamp_to_available(dx, dy);
                    c.consume_position_change(amount.x, amount.y)
                })
                .collect()
        })
    }

    /// Consume every down/up transition during one pass
    pub(crate) fn consuming_down(pass: PointerEventPass) -> Self {
        Self::new(move |changes, current| {
            if current != pass {
                return changes;
            }
            changes.into_iter().map(|c| c.consume_down_change()).collect()
        })
    }
}

impl PointerInputFilter for ClosureFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        (self.input)(changes, pass, size)
    }

    fn on_custom_event(&mut self, event: &CustomEvent, _ctx: &mut FilterContext<'_>) {
        if let Some(events) = self.events.as_mut() {
            events(event);
        }
    }

    fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {}

    fn set_enabled(&mut self, _enabled: bool, _ctx: &mut FilterContext<'_>) {}

    fn name(&self) -> &'static str {
        "closure"
    }
}

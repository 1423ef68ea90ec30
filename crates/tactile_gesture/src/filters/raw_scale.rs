//! Pinch-to-scale recognition

use tactile_input::{IntSize, PointerEventPass, PointerInputChange};

use crate::bounds::{PointerSpread, SCALE_TOLERANCE};
use crate::filter::{Callback, FilterContext, PointerInputFilter, Predicate, ScaleCallback};

/// Reports how much the spread of two or more pointers grows or shrinks.
///
/// Only pointers that were pressed in both the previous and the current batch
/// are counted. The scale callback returns the part of the factor it actually
/// used, and that part of each pointer's radial movement is consumed.
pub struct RawScaleFilter {
    on_start: Callback,
    on_scale: ScaleCallback,
    on_stop: Callback,
    on_cancel: Callback,
    can_start_scaling: Predicate,
    enabled: bool,
    active: bool,
}

impl Default for RawScaleFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RawScaleFilter {
    pub fn new() -> Self {
        Self {
            on_start: Box::new(|| {}),
            on_scale: Box::new(|factor| factor),
            on_stop: Box::new(|| {}),
            on_cancel: Box::new(|| {}),
            can_start_scaling: Box::new(|| true),
            enabled: true,
            active: false,
        }
    }

    pub fn on_start<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_start = Box::new(callback);
        self
    }

    /// Receives the scale factor since the last batch, returns the factor consumed
    pub fn on_scale<F: FnMut(f32) -> f32 + 'static>(mut self, callback: F) -> Self {
        self.on_scale = Box::new(callback);
        self
    }

    pub fn on_stop<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_stop = Box::new(callback);
        self
    }

    pub fn on_cancel<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_cancel = Box::new(callback);
        self
    }

    /// Polled before scaling starts; scaling waits while it returns false
    pub fn can_start_scaling<F: FnMut() -> bool + 'static>(mut self, predicate: F) -> Self {
        self.can_start_scaling = Box::new(predicate);
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn cancel_scale(&mut self) {
        if self.active {
            self.active = false;
            tracing::debug!("scale cancelled");
            (self.on_cancel)();
        }
    }

    fn on_main(&mut self, changes: Vec<PointerInputChange>) -> Vec<PointerInputChange> {
        let Some(spread) = PointerSpread::from_changes(&changes) else {
            if self.active {
                self.active = false;
                tracing::debug!("scale stopped");
                (self.on_stop)();
            }
            return changes;
        };

        if !spread.is_scaling() {
            return changes;
        }
        let factor = spread.scale_factor();
        if !self.active {
            if !self.enabled || !(self.can_start_scaling)() {
                return changes;
            }
            self.active = true;
            tracing::debug!("scale started");
            (self.on_start)();
        }

        let consumed_factor = (self.on_scale)(factor);
        let fraction = (consumed_factor - 1.0) / (factor - 1.0);
        if !fraction.is_finite() || fraction.abs() <= SCALE_TOLERANCE {
            return changes;
        }

        let mut index = 0;
        changes
            .into_iter()
            .map(|c| {
                if !(c.previous.pressed && c.current.pressed) {
                    return c;
                }
                let wanted = spread.radial_change(index) * fraction;
                index += 1;
                let amount = c.clamp_to_available(wanted.x, wanted.y);
                c.consume_position_change(amount.x, amount.y)
            })
            .collect()
    }
}

impl PointerInputFilter for RawScaleFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        _size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        match pass {
            PointerEventPass::Initial if self.active => changes
                .into_iter()
                .map(|c| {
                    if c.changed_to_down() || c.changed_to_up() {
                        c.consume_down_change()
                    } else {
                        c
                    }
                })
                .collect(),
            PointerEventPass::Main => self.on_main(changes),
            _ => changes,
        }
    }

    fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {
        self.cancel_scale();
    }

    fn set_enabled(&mut self, enabled: bool, _ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.cancel_scale();
        }
    }

    fn name(&self) -> &'static str {
        "raw_scale"
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::dispatcher::GestureDispatcher;
    use crate::testing::{down, ChangeExt, EventLog};
    use crate::FilterId;
    use tactile_input::Offset;

    struct Harness {
        dispatcher: GestureDispatcher,
        log: EventLog<String>,
        id: FilterId,
    }

    fn harness_with(filter: RawScaleFilter) -> Harness {
        let log = EventLog::new();
        let (start, scale, stop, cancel) = (log.clone(), log.clone(), log.clone(), log.clone());
        let filter = filter
            .on_start(move || start.push("start".to_string()))
            .on_scale(move |f| {
                scale.push(format!("scale({f})"));
                f
            })
            .on_stop(move || stop.push("stop".to_string()))
            .on_cancel(move || cancel.push("cancel".to_string()));
        let mut dispatcher = GestureDispatcher::new(IntSize::new(100, 100));
        let id = dispatcher.add_filter(Box::new(filter));
        Harness { dispatcher, log, id }
    }

    fn harness() -> Harness {
        harness_with(RawScaleFilter::new())
    }

    fn pinch_start() -> (PointerInputChange, PointerInputChange) {
        (down(0, 0, 1.0, 0.0), down(1, 0, 3.0, 0.0))
    }

    #[test]
    fn test_spreading_to_double_distance() {
        let mut h = harness();
        let (a, b) = pinch_start();
        h.dispatcher.dispatch(vec![a, b]);
        let out = h
            .dispatcher
            .dispatch(vec![a.move_to(10, 0.0, 0.0), b.move_to(10, 4.0, 0.0)]);

        assert_eq!(h.log.take(), vec!["start", "scale(2)"]);
        assert_eq!(out[0].consumed.position_change, Offset::new(-1.0, 0.0));
        assert_eq!(out[1].consumed.position_change, Offset::new(1.0, 0.0));
    }

    #[test]
    fn test_partial_consumption() {
        let mut dispatcher = GestureDispatcher::new(IntSize::new(100, 100));
        dispatcher.add_filter(Box::new(RawScaleFilter::new().on_scale(|f| 1.0 + (f - 1.0) / 2.0)));
        let (a, b) = pinch_start();
        dispatcher.dispatch(vec![a, b]);
        let out = dispatcher.dispatch(vec![a.move_to(10, 0.0, 0.0), b.move_to(10, 4.0, 0.0)]);

        assert_eq!(out[0].consumed.position_change, Offset::new(-0.5, 0.0));
        assert_eq!(out[1].consumed.position_change, Offset::new(0.5, 0.0));
    }

    #[test]
    fn test_rotation_does_not_scale() {
        let mut h = harness();
        let a = down(0, 0, 10.0, 0.0);
        let b = down(1, 0, -10.0, 0.0);
        h.dispatcher.dispatch(vec![a, b]);
        h.dispatcher
            .dispatch(vec![a.move_to(10, 0.0, 10.0), b.move_to(10, 0.0, -10.0)]);

        assert!(h.log.is_empty());
    }

    #[test]
    fn test_translation_by_fractional_offset_does_not_scale() {
        let mut h = harness();
        let a = down(0, 0, 10.3, 10.7);
        let b = down(1, 0, 20.1, 13.9);
        h.dispatcher.dispatch(vec![a, b]);
        let (a, b) = (a.move_by(10, 0.37, 0.11), b.move_by(10, 0.37, 0.11));
        h.dispatcher.dispatch(vec![a, b]);
        h.dispatcher
            .dispatch(vec![a.move_by(20, -1.9, 2.3), b.move_by(20, -1.9, 2.3)]);

        assert!(h.log.is_empty());
    }

    #[test]
    fn test_rotation_by_arbitrary_angle_does_not_scale() {
        let mut h = harness();
        let center = Offset::new(31.7, 27.3);
        let radius = 13.9_f32;
        let at = |angle: f32| center + Offset::new(angle.cos(), angle.sin()) * radius;

        let (start_a, start_b) = (at(0.3), at(0.3 + std::f32::consts::PI));
        let a = down(0, 0, start_a.x, start_a.y);
        let b = down(1, 0, start_b.x, start_b.y);
        h.dispatcher.dispatch(vec![a, b]);

        let angle = 0.3 + 37.0_f32.to_radians();
        let (end_a, end_b) = (at(angle), at(angle + std::f32::consts::PI));
        h.dispatcher
            .dispatch(vec![a.move_to(10, end_a.x, end_a.y), b.move_to(10, end_b.x, end_b.y)]);

        assert!(h.log.is_empty());
    }

    #[test]
    fn test_single_pointer_never_starts() {
        let mut h = harness();
        let a = down(0, 0, 1.0, 1.0);
        h.dispatcher.dispatch(vec![a]);
        h.dispatcher.dispatch(vec![a.move_to(10, 20.0, 20.0)]);
        assert!(h.log.is_empty());
    }

    #[test]
    fn test_stop_when_pointer_lifts() {
        let mut h = harness();
        let (a, b) = pinch_start();
        h.dispatcher.dispatch(vec![a, b]);
        let (a, b) = (a.move_to(10, 0.0, 0.0), b.move_to(10, 4.0, 0.0));
        h.dispatcher.dispatch(vec![a, b]);
        let out = h.dispatcher.dispatch(vec![a.up(20), b.move_to(20, 4.0, 0.0)]);

        assert_eq!(h.log.take(), vec!["start", "scale(2)", "stop"]);
        // Up happened while scaling, so it was claimed in the initial pass
        assert!(out[0].consumed.down_change);
        h.dispatcher.set_enabled(h.id, false).unwrap();
        assert!(h.log.is_empty());
    }

    #[test]
    fn test_can_start_scaling_gates_start() {
        let allowed = Rc::new(Cell::new(false));
        let gate = Rc::clone(&allowed);
        let mut h = harness_with(RawScaleFilter::new().can_start_scaling(move || gate.get()));
        let (a, b) = pinch_start();
        h.dispatcher.dispatch(vec![a, b]);
        let (a, b) = (a.move_to(10, 0.0, 0.0), b.move_to(10, 4.0, 0.0));
        h.dispatcher.dispatch(vec![a, b]);
        assert!(h.log.is_empty());

        allowed.set(true);
        h.dispatcher
            .dispatch(vec![a.move_to(20, -2.0, 0.0), b.move_to(20, 6.0, 0.0)]);
        assert_eq!(h.log.take(), vec!["start", "scale(2)"]);
    }

    #[test]
    fn test_cancel_while_active() {
        let mut h = harness();
        h.dispatcher.cancel();
        assert!(h.log.is_empty());

        let (a, b) = pinch_start();
        h.dispatcher.dispatch(vec![a, b]);
        h.dispatcher
            .dispatch(vec![a.move_to(10, 0.0, 0.0), b.move_to(10, 4.0, 0.0)]);
        h.log.take();
        h.dispatcher.cancel();
        h.dispatcher.cancel();
        assert_eq!(h.log.take(), vec!["cancel"]);
    }

    #[test]
    fn test_disable_while_active_cancels() {
        let mut h = harness();
        let (a, b) = pinch_start();
        h.dispatcher.dispatch(vec![a, b]);
        h.dispatcher
            .dispatch(vec![a.move_to(10, 0.0, 0.0), b.move_to(10, 4.0, 0.0)]);
        h.log.take();
        h.dispatcher.set_enabled(h.id, false).unwrap();
        assert_eq!(h.log.take(), vec!["cancel"]);
    }
}

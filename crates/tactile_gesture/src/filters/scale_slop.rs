//! Detects when a pinch has moved far enough to count as scaling

use tactile_input::{GestureConfig, IntSize, PointerEventPass, PointerInputChange};

use crate::bounds::{exceeds_slop, PointerSpread};
use crate::filter::{Callback, FilterContext, PointerInputFilter};

/// Fires once per gesture when the pointers' accumulated movement towards or
/// away from their centroid exceeds the scale slop
pub struct ScaleSlopExceededFilter {
    on_scale_slop_exceeded: Callback,
    slop: f32,
    enabled: bool,
    accumulated: f32,
    passed: bool,
}

impl Default for ScaleSlopExceededFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleSlopExceededFilter {
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::standard())
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            on_scale_slop_exceeded: Box::new(|| {}),
            slop: config.scale_slop,
            enabled: true,
            accumulated: 0.0,
            passed: false,
        }
    }

    pub fn on_scale_slop_exceeded<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_scale_slop_exceeded = Box::new(callback);
        self
    }

    pub fn with_slop(mut self, slop: f32) -> Self {
        self.slop = slop;
        self
    }

    pub fn slop(&self) -> f32 {
        self.slop
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
        self.passed = false;
    }
}

impl PointerInputFilter for ScaleSlopExceededFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        _size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        if pass != PointerEventPass::Main || changes.is_empty() {
            return changes;
        }
        if changes.iter().all(|c| !c.current.pressed) {
            self.reset();
            return changes;
        }
        if self.passed || !self.enabled {
            return changes;
        }

        if let Some(spread) = PointerSpread::from_changes(&changes) {
            self.accumulated += spread.absolute_distance_change();
            if exceeds_slop(self.accumulated, self.slop) {
                self.passed = true;
                tracing::debug!(accumulated = self.accumulated, "scale slop exceeded");
                (self.on_scale_slop_exceeded)();
            }
        }
        changes
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
        "scale_slop"
    }
}

//! Raw pointer samples and batch assembly
//!
//! Platforms report one sample per contact per frame. The [`PointerTracker`]
//! pairs each sample with the pointer's previous state and produces the batch
//! of [`PointerInputChange`]s that gesture filters consume.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::geometry::Offset;
use crate::pointer::{PointerId, PointerInputChange, PointerInputData};

/// A single raw pointer sample from the platform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Contact identifier
    pub id: PointerId,
    /// Position in the container's local coordinates
    pub position: Offset,
    /// Uptime of the sample
    pub time: Duration,
    /// Whether the contact is pressed
    pub pressed: bool,
}

impl PointerSample {
    /// A contact touching down (or staying down) at a position
    pub fn down(id: u64, x: f32, y: f32, time: Duration) -> Self {
        Self {
            id: PointerId(id),
            position: Offset::new(x, y),
            time,
            pressed: true,
        }
    }

    /// A contact lifting at a position
    pub fn up(id: u64, x: f32, y: f32, time: Duration) -> Self {
        Self {
            id: PointerId(id),
            position: Offset::new(x, y),
            time,
            pressed: false,
        }
    }

    fn data(&self) -> PointerInputData {
        PointerInputData::new(self.position, self.time, self.pressed)
    }
}

/// Tracks the last known state of every pressed pointer
///
/// A batch contains every pointer that is still pressed plus the pointers
/// that lifted in this frame. Lifted pointers are forgotten afterwards, so a
/// reused id starts a fresh gesture.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last: FxHashMap<PointerId, PointerInputData>,
    /// Pointers in the order they went down
    order: Vec<PointerId>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pointers currently pressed
    pub fn pressed_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_tracking(&self, id: PointerId) -> bool {
        self.last.contains_key(&id)
    }

    /// Forget every pointer (used when the gesture stream is cancelled)
    pub fn clear(&mut self) {
        self.last.clear();
        self.order.clear();
    }

    /// Assemble the next batch from this frame's samples.
    ///
    /// Pointers without a sample this frame are reported as stationary. A
    /// sample for an unknown id that is not pressed (hover) is ignored.
    pub fn batch(&mut self, samples: &[PointerSample]) -> Vec<PointerInputChange> {
        let mut changes: Vec<PointerInputChange> = Vec::with_capacity(self.order.len() + samples.len());

        for id in &self.order {
            let Some(previous) = self.last.get(id).copied() else {
                continue;
            };
            let current = samples
                .iter()
                .rev()
                .find(|s| s.id == *id)
                .map(PointerSample::data)
                .unwrap_or(previous);
            changes.push(PointerInputChange::new(*id, current, previous));
        }

        for sample in samples {
            if self.last.contains_key(&sample.id) || !sample.pressed {
                continue;
            }
            if changes.iter().any(|c| c.id == sample.id) {
                continue;
            }
            // First sighting: a fresh down from the same spot
            let previous = PointerInputData::new(sample.position, sample.time, false);
            changes.push(PointerInputChange::new(sample.id, sample.data(), previous));
        }

        for change in &changes {
            if change.current.pressed {
                if self.last.insert(change.id, change.current).is_none() {
                    self.order.push(change.id);
                }
            } else {
                self.last.remove(&change.id);
                self.order.retain(|id| *id != change.id);
            }
        }

        tracing::trace!(
            batch = changes.len(),
            pressed = self.order.len(),
            "assembled pointer batch"
        );

        changes
    }
}

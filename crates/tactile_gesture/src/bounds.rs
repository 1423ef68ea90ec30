//! Hit-region and slop helpers shared by the filters

use tactile_input::{IntSize, Offset, PointerInputChange};

/// Whether a local position lies inside `[0, width) x [0, height)`
pub fn is_in_bounds(position: Offset, size: IntSize) -> bool {
    size.contains(position)
}

/// Whether at least one pointer of the batch is inside the container
pub fn any_pointers_in_bounds(changes: &[PointerInputChange], size: IntSize) -> bool {
    changes
        .iter()
        .any(|c| is_in_bounds(c.current.position, size))
}

/// Whether every pointer of the batch is inside the container
pub fn all_pointers_in_bounds(changes: &[PointerInputChange], size: IntSize) -> bool {
    changes
        .iter()
        .all(|c| is_in_bounds(c.current.position, size))
}

/// Whether a magnitude has passed a slop threshold
pub fn exceeds_slop(magnitude: f32, slop: f32) -> bool {
    magnitude.abs() > slop
}

/// Average of a set of points
pub fn centroid(points: &[Offset]) -> Option<Offset> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Offset::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f32)
}

/// Mean Euclidean distance from each point to `center`
pub fn mean_distance_to(points: &[Offset], center: Offset) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| (*p - center).distance()).sum::<f32>() / points.len() as f32
}

/// Relative change of the mean spread below which a move counts as pan or rotation
pub const SCALE_TOLERANCE: f32 = 1e-4;

/// Spread of the pointers that were pressed in both the previous and the
/// current batch, measured before and after the unconsumed part of this move
#[derive(Clone, Debug, PartialEq)]
pub struct PointerSpread {
    pub previous: Vec<Offset>,
    pub current: Vec<Offset>,
    pub previous_centroid: Offset,
    pub current_centroid: Offset,
}

impl PointerSpread {
    /// Pointers pressed before and now; `None` if there are fewer than two
    pub fn from_changes(changes: &[PointerInputChange]) -> Option<Self> {
        let tracked: Vec<&PointerInputChange> = changes
            .iter()
            .filter(|c| c.previous.pressed && c.current.pressed)
            .collect();
        if tracked.len() < 2 {
            return None;
        }

        let previous: Vec<Offset> = tracked.iter().map(|c| c.previous.position).collect();
        let current: Vec<Offset> = tracked.iter().map(|c| c.unconsumed_position()).collect();
        let previous_centroid = centroid(&previous)?;
        let current_centroid = centroid(&current)?;

        Some(Self {
            previous,
            current,
            previous_centroid,
            current_centroid,
        })
    }

    pub fn previous_mean_distance(&self) -> f32 {
        mean_distance_to(&self.previous, self.previous_centroid)
    }

    pub fn current_mean_distance(&self) -> f32 {
        mean_distance_to(&self.current, self.current_centroid)
    }

    /// Ratio of current to previous mean distance; 1.0 when nothing was spread
    pub fn scale_factor(&self) -> f32 {
        let previous = self.previous_mean_distance();
        if previous == 0.0 {
            return 1.0;
        }
        self.current_mean_distance() / previous
    }

    /// Whether the spread changed by more than float noise
    pub fn is_scaling(&self) -> bool {
        (self.scale_factor() - 1.0).abs() > SCALE_TOLERANCE
    }

    /// Sum over pointers of how far each one moved towards or away from the
    /// centroid, regardless of direction
    pub fn absolute_distance_change(&self) -> f32 {
        self.previous
            .iter()
            .zip(&self.current)
            .map(|(prev, curr)| {
                ((*curr - self.current_centroid).distance()
                    - (*prev - self.previous_centroid).distance())
                .abs()
            })
            .sum()
    }

    /// Change of one pointer's vector to the centroid
    pub fn radial_change(&self, index: usize) -> Offset {
        (self.current[index] - self.current_centroid)
            - (self.previous[index] - self.previous_centroid)
    }
}

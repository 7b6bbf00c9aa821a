//! Geometric primitives for detection post-processing.
//!
//! This module provides the axis-aligned bounding box type used throughout
//! the card synthesis pipeline, along with the overlap measures the
//! pipeline is built on: intersection-over-union for duplicate removal and
//! vertical-span overlap for row grouping.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in pixel coordinates.
///
/// Invariant: `x_min < x_max` and `y_min < y_max` for every box produced
/// by the normalizer; degenerate boxes are rejected before construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl BoundingBox {
    /// Creates a bounding box from corner coordinates.
    ///
    /// # Arguments
    ///
    /// * `x_min` - The x-coordinate of the top-left corner.
    /// * `y_min` - The y-coordinate of the top-left corner.
    /// * `x_max` - The x-coordinate of the bottom-right corner.
    /// * `y_max` - The y-coordinate of the bottom-right corner.
    pub fn from_coords(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Returns the minimum x-coordinate.
    #[inline]
    pub fn x_min(&self) -> f32 {
        self.x_min
    }

    /// Returns the minimum y-coordinate.
    #[inline]
    pub fn y_min(&self) -> f32 {
        self.y_min
    }

    /// Returns the maximum x-coordinate.
    #[inline]
    pub fn x_max(&self) -> f32 {
        self.x_max
    }

    /// Returns the maximum y-coordinate.
    #[inline]
    pub fn y_max(&self) -> f32 {
        self.y_max
    }

    /// Returns the width of the box.
    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Returns the height of the box.
    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Returns the area of the box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Checks that the box has positive extent and finite coordinates.
    pub fn is_valid(&self) -> bool {
        self.x_max > self.x_min
            && self.y_max > self.y_min
            && self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
    }

    /// Returns a copy of the box widened horizontally by `pad` on each side.
    ///
    /// The left edge is clamped at zero so the box never leaves the image.
    pub fn expand_horizontal(&self, pad: f32) -> Self {
        Self {
            x_min: (self.x_min - pad).max(0.0),
            y_min: self.y_min,
            x_max: self.x_max + pad,
            y_max: self.y_max,
        }
    }

    /// Computes the area of intersection with another box.
    fn intersection_area(&self, other: &Self) -> f32 {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);

        if x_max <= x_min || y_max <= y_min {
            return 0.0;
        }

        (x_max - x_min) * (y_max - y_min)
    }

    /// Computes the intersection-over-union with another box.
    ///
    /// Returns a value in `[0, 1]`; `0.0` for disjoint boxes and for
    /// degenerate unions.
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Checks whether this box fully contains `other`.
    pub fn contains(&self, other: &Self) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Computes the vertical-span overlap with another box as a fraction
    /// of the smaller span's height.
    ///
    /// Returns `0.0` when the spans do not overlap. This is the row
    /// membership measure used by the layout synthesizer.
    pub fn vertical_overlap_ratio(&self, other: &Self) -> f32 {
        let overlap = self.y_max.min(other.y_max) - self.y_min.max(other.y_min);
        if overlap <= 0.0 {
            return 0.0;
        }

        let min_span = self.height().min(other.height());
        if min_span > 0.0 {
            overlap / min_span
        } else {
            0.0
        }
    }
}

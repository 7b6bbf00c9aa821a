//! Geometric processing utilities for the card synthesis pipeline.
//!
//! # Modules
//!
//! * `geometry` - Bounding boxes and the overlap measures used for
//!   duplicate removal and row grouping

mod geometry;

pub use geometry::*;

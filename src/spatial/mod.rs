//! Spatial indexing for picking bodies.
//!
//! Host drag and selection logic asks which body lies under the pointer or
//! inside a selection rectangle; an R-tree answers in O(log n).

mod rtree;

pub use rtree::{BodyPoint, SpatialIndex};

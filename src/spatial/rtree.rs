//! R-tree over body positions, built with the rstar crate.
//!
//! The index is a snapshot: it is bulk-loaded from the current positions and
//! must be rebuilt after bodies move.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::BodyId;

/// A body position stored in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPoint {
    pub id: BodyId,
    pub x: f64,
    pub y: f64,
}

impl RTreeObject for BodyPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for BodyPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index used to pick bodies under a pointer or inside a selection box.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<BodyPoint>,
}

impl SpatialIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Replace the contents with `points`.
    pub fn rebuild(&mut self, points: Vec<BodyPoint>) {
        self.tree = RTree::bulk_load(points);
    }

    /// Nearest body whose distance to `(x, y)` is at most `max_distance`.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<BodyId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id)
    }

    /// All bodies inside the rectangle spanned by the two corners.
    pub fn in_rect(&self, corner_a: (f64, f64), corner_b: (f64, f64)) -> Vec<BodyId> {
        let envelope = AABB::from_corners([corner_a.0, corner_a.1], [corner_b.0, corner_b.1]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(points: &[(u32, f64, f64)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(
            points
                .iter()
                .map(|&(id, x, y)| BodyPoint { id: BodyId(id), x, y })
                .collect(),
        );
        index
    }

    #[test]
    fn test_nearest_within() {
        let index = index_of(&[(0, 0.0, 0.0), (1, 10.0, 10.0)]);

        assert_eq!(index.nearest_within(0.0, 0.0, 5.0), Some(BodyId(0)));
        assert_eq!(index.nearest_within(9.0, 9.0, 5.0), Some(BodyId(1)));

        // Nothing within 1 of (5, 5)
        assert_eq!(index.nearest_within(5.0, 5.0, 1.0), None);
    }

    #[test]
    fn test_in_rect_accepts_any_corner_order() {
        let index = index_of(&[(0, 0.0, 0.0), (1, 5.0, 5.0), (2, 10.0, 10.0)]);

        let mut found = index.in_rect((6.0, 6.0), (-1.0, -1.0));
        found.sort();
        assert_eq!(found, vec![BodyId(0), BodyId(1)]);
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = index_of(&[(0, 0.0, 0.0)]);
        index.rebuild(vec![BodyPoint { id: BodyId(7), x: 1.0, y: 1.0 }]);

        assert_eq!(index.in_rect((-50.0, -50.0), (50.0, 50.0)), vec![BodyId(7)]);
        assert_eq!(index.nearest_within(0.0, 0.0, 2.0), Some(BodyId(7)));

        index.clear();
        assert!(index.in_rect((-50.0, -50.0), (50.0, 50.0)).is_empty());
        assert_eq!(index.nearest_within(0.0, 0.0, 100.0), None);
    }
}

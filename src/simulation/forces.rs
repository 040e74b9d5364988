//! Force computation.
//!
//! Every cycle recomputes the net force on each body from three sources,
//! always in this order:
//!
//! 1. **Gravity** - constant-magnitude pull toward the gravity center. This
//!    pass *sets* the force, discarding whatever the previous cycle left.
//! 2. **Repulsion** - every unordered pair of distinct bodies pushes apart with
//!    a logistic falloff `1 / (1 + exp((d / min_distance - 1) * steepness))`,
//!    about 1 well inside `min_distance`, 0.5 at it, decaying beyond.
//! 3. **Springs** - Hookean `stiffness * (rest_length - length)` along each
//!    spring. Self-loops are skipped.
//!
//! Passes 2 and 3 add equal and opposite forces to the two bodies involved.

use petgraph::stable_graph::{EdgeIndex, NodeIndex};

use crate::config::PhysicsConfig;
use crate::graph::PhysicsGraph;

/// Force parameters resolved from a [`PhysicsConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceField {
    pub gravity_strength: f64,
    pub repulsion_strength: f64,
    pub min_distance: f64,
    pub steepness: f64,
}

impl ForceField {
    /// Take the force parameters from `config`.
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            gravity_strength: config.gravity_strength,
            repulsion_strength: config.repulsion_strength,
            min_distance: config.min_distance,
            steepness: config.steepness,
        }
    }

    /// Recompute the force on every body in `graph`.
    pub fn apply(&self, graph: &mut PhysicsGraph, gravity_center: (f64, f64)) {
        self.apply_gravity(graph, gravity_center);

        let bodies: Vec<NodeIndex> = graph.node_indices().collect();
        self.apply_repulsion(graph, &bodies);

        self.apply_springs(graph);
    }

    /// Repulsion magnitude between two bodies `distance` apart.
    #[inline]
    pub fn repulsion(&self, distance: f64) -> f64 {
        let exponent = (distance / self.min_distance - 1.0) * self.steepness;
        self.repulsion_strength / (1.0 + exponent.exp())
    }

    fn apply_gravity(&self, graph: &mut PhysicsGraph, (cx, cy): (f64, f64)) {
        for body in graph.node_weights_mut() {
            let (x, y) = body.position();
            let dx = cx - x;
            let dy = cy - y;

            // No direction to pull in
            if dx == 0.0 && dy == 0.0 {
                body.set_force(0.0, 0.0);
                continue;
            }

            let angle = dy.atan2(dx);
            body.set_force(
                angle.cos() * self.gravity_strength,
                angle.sin() * self.gravity_strength,
            );
        }
    }

    fn apply_repulsion(&self, graph: &mut PhysicsGraph, bodies: &[NodeIndex]) {
        if self.repulsion_strength == 0.0 {
            return;
        }

        for (i, &a) in bodies.iter().enumerate() {
            for &b in &bodies[i + 1..] {
                let (ax, ay) = graph[a].position();
                let (bx, by) = graph[b].position();
                let dx = bx - ax;
                let dy = by - ay;

                // Coincident bodies get angle atan2(0, 0) = 0 and full strength
                let distance = dx.hypot(dy);
                let angle = dy.atan2(dx);
                let repulsion = self.repulsion(distance);

                let fx = angle.cos() * repulsion;
                let fy = angle.sin() * repulsion;
                graph[a].add_force(-fx, -fy);
                graph[b].add_force(fx, fy);
            }
        }
    }

    fn apply_springs(&self, graph: &mut PhysicsGraph) {
        let springs: Vec<EdgeIndex> = graph.edge_indices().collect();

        for edge in springs {
            let Some((from, to)) = graph.edge_endpoints(edge) else {
                continue;
            };
            if from == to {
                continue;
            }

            let (ax, ay) = graph[from].position();
            let (bx, by) = graph[to].position();
            let dx = bx - ax;
            let dy = by - ay;
            let length = dx.hypot(dy);
            let angle = dy.atan2(dx);
            let spring_force = graph[edge].force_at(length);

            let fx = angle.cos() * spring_force;
            let fy = angle.sin() * spring_force;
            graph[from].add_force(-fx, -fy);
            graph[to].add_force(fx, fy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AxisPins, Body, BodyId, Spring, SpringId};

    fn add_body(graph: &mut PhysicsGraph, id: u32, x: f64, y: f64) -> NodeIndex {
        let body = Body::new(
            BodyId::new(id),
            (x, y),
            AxisPins::new(),
            None,
            &PhysicsConfig::default(),
        )
        .unwrap();
        graph.add_node(body)
    }

    fn add_spring(graph: &mut PhysicsGraph, a: NodeIndex, b: NodeIndex, rest_length: f64) {
        let spring = Spring::new(
            SpringId::new(graph.edge_count() as u32),
            graph[a].id(),
            graph[b].id(),
            rest_length,
        )
        .unwrap();
        graph.add_edge(a, b, spring);
    }

    fn field(gravity: f64, repulsion: f64) -> ForceField {
        ForceField {
            gravity_strength: gravity,
            repulsion_strength: repulsion,
            min_distance: 100.0,
            steepness: 10.0,
        }
    }

    #[test]
    fn test_repulsion_falloff() {
        let field = field(0.0, 1.0);
        assert!((field.repulsion(100.0) - 0.5).abs() < 1e-12);
        assert!(field.repulsion(0.0) > 0.9999);
        assert!(field.repulsion(200.0) < 1e-4);
        assert!(field.repulsion(50.0) > field.repulsion(150.0));
        assert_eq!(field.repulsion(f64::MAX), 0.0);
    }

    #[test]
    fn test_gravity_sets_force() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 10.0, 0.0);
        graph[a].set_force(123.0, 456.0);

        field(0.5, 0.0).apply(&mut graph, (0.0, 0.0));

        let (fx, fy) = graph[a].force();
        assert!((fx + 0.5).abs() < 1e-12);
        assert!(fy.abs() < 1e-12);
    }

    #[test]
    fn test_gravity_at_center_is_zero() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 4.0, -2.0);

        field(1.0, 0.0).apply(&mut graph, (4.0, -2.0));
        assert_eq!(graph[a].force(), (0.0, 0.0));
    }

    #[test]
    fn test_repulsion_is_antisymmetric() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 0.0, 0.0);
        let b = add_body(&mut graph, 1, 30.0, 40.0);

        field(0.0, 1.0).apply(&mut graph, (0.0, 0.0));

        let (ax, ay) = graph[a].force();
        let (bx, by) = graph[b].force();
        assert_eq!(ax, -bx);
        assert_eq!(ay, -by);
        // A is pushed away from B
        assert!(ax < 0.0 && ay < 0.0);
    }

    #[test]
    fn test_repulsion_coincident_bodies() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 5.0, 5.0);
        let b = add_body(&mut graph, 1, 5.0, 5.0);

        let field = field(0.0, 1.0);
        field.apply(&mut graph, (0.0, 0.0));

        let (ax, ay) = graph[a].force();
        let (bx, by) = graph[b].force();
        assert!(ax.is_finite() && ay.is_finite());
        assert_eq!(ax, -bx);
        assert_eq!(ay, -by);
        assert!((bx - field.repulsion(0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_spring_at_rest_length_is_zero() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 0.0, 0.0);
        let b = add_body(&mut graph, 1, 100.0, 0.0);
        add_spring(&mut graph, a, b, 100.0);

        field(0.0, 0.0).apply(&mut graph, (0.0, 0.0));

        assert_eq!(graph[a].force().0, 0.0);
        assert_eq!(graph[b].force().0, 0.0);
    }

    #[test]
    fn test_stretched_spring_pulls_together() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 0.0, 0.0);
        let b = add_body(&mut graph, 1, 300.0, 0.0);
        add_spring(&mut graph, a, b, 100.0);

        field(0.0, 0.0).apply(&mut graph, (0.0, 0.0));

        // stiffness 0.01 * 200 stretch
        assert!((graph[a].force().0 - 2.0).abs() < 1e-12);
        assert!((graph[b].force().0 + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_compressed_spring_pushes_apart() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 0.0, 0.0);
        let b = add_body(&mut graph, 1, 0.0, 50.0);
        add_spring(&mut graph, a, b, 100.0);

        field(0.0, 0.0).apply(&mut graph, (0.0, 0.0));

        assert!(graph[a].force().1 < 0.0);
        assert!(graph[b].force().1 > 0.0);
    }

    #[test]
    fn test_self_loop_contributes_nothing() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 50.0, 20.0);
        let field = field(0.01, 1.0);

        field.apply(&mut graph, (0.0, 0.0));
        let without = graph[a].force();

        add_spring(&mut graph, a, a, 100.0);
        field.apply(&mut graph, (0.0, 0.0));
        assert_eq!(graph[a].force(), without);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut graph = PhysicsGraph::default();
        let a = add_body(&mut graph, 0, 0.0, 0.0);
        let b = add_body(&mut graph, 1, 70.0, 10.0);
        let c = add_body(&mut graph, 2, -20.0, 90.0);
        add_spring(&mut graph, a, b, 100.0);
        add_spring(&mut graph, b, c, 60.0);

        let field = field(0.01, 1.0);
        field.apply(&mut graph, (10.0, 10.0));
        let first: Vec<_> = [a, b, c].iter().map(|&n| graph[n].force()).collect();

        field.apply(&mut graph, (10.0, 10.0));
        let second: Vec<_> = [a, b, c].iter().map(|&n| graph[n].force()).collect();

        assert_eq!(first, second);
    }
}

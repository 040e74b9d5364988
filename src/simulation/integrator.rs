//! Fixed-step integration of the bodies.
//!
//! Forces must already be resolved for the current cycle; each body is then
//! advanced independently by [`Body::discrete_step`](crate::graph::Body::discrete_step).

use crate::config::{PhysicsConfig, StepScheme};
use crate::graph::PhysicsGraph;

/// Damping and step scheme, fixed when the integrator is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    pub damping: f64,
    pub scheme: StepScheme,
}

impl Integrator {
    /// Resolve damping and the step scheme from `config`.
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            damping: config.damping,
            scheme: config.step_scheme,
        }
    }

    /// Advance every body in `graph` by one step of `dt`.
    pub fn step(&self, graph: &mut PhysicsGraph, dt: f64) {
        for body in graph.node_weights_mut() {
            body.discrete_step(dt, self.damping, self.scheme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AxisPins, Body, BodyId};

    #[test]
    fn test_step_uses_accumulated_force() {
        let config = PhysicsConfig::default();
        let mut graph = PhysicsGraph::default();
        let a = graph.add_node(
            Body::new(BodyId::new(0), (0.0, 0.0), AxisPins::new(), None, &config).unwrap(),
        );
        let b = graph.add_node(
            Body::new(BodyId::new(1), (5.0, 5.0), AxisPins::from_axes(true, true), None, &config)
                .unwrap(),
        );
        graph[a].set_force(1.0, 0.0);
        graph[b].set_force(1.0, 1.0);

        Integrator::new(&config).step(&mut graph, config.time_step);

        assert!(graph[a].position().0 > 0.0);
        assert_eq!(graph[a].position().1, 0.0);
        assert_eq!(graph[b].position(), (5.0, 5.0));
    }

    #[test]
    fn test_scheme_taken_from_config() {
        let config = PhysicsConfig {
            step_scheme: StepScheme::Scaled,
            damping: 0.5,
            ..PhysicsConfig::default()
        };
        let integrator = Integrator::new(&config);
        assert_eq!(integrator.scheme, StepScheme::Scaled);
        assert_eq!(integrator.damping, 0.5);
    }
}

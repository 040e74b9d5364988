//! Convergence test for the simulation.

use crate::config::PhysicsConfig;
use crate::graph::Body;

/// Decides whether any body is still moving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityOracle {
    pub min_velocity: f64,
    pub min_force: f64,
}

impl StabilityOracle {
    /// Take the settling thresholds from `config`.
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            min_velocity: config.min_velocity,
            min_force: config.min_force,
        }
    }

    /// True if at least one body reports [`Body::is_moving`].
    pub fn any_moving<'a>(&self, bodies: impl IntoIterator<Item = &'a Body>) -> bool {
        bodies
            .into_iter()
            .any(|body| body.is_moving(self.min_velocity, self.min_force))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AxisPins, BodyId};

    fn body(force: (f64, f64), pins: AxisPins) -> Body {
        let mut body = Body::new(
            BodyId::new(0),
            (0.0, 0.0),
            pins,
            None,
            &PhysicsConfig::default(),
        )
        .unwrap();
        body.set_force(force.0, force.1);
        body
    }

    #[test]
    fn test_empty_is_stable() {
        let oracle = StabilityOracle::new(&PhysicsConfig::default());
        assert!(!oracle.any_moving(std::iter::empty()));
    }

    #[test]
    fn test_any_body_moving() {
        let oracle = StabilityOracle::new(&PhysicsConfig::default());
        let still = body((0.01, 0.01), AxisPins::new());
        let pushed = body((0.0, 0.2), AxisPins::new());

        assert!(!oracle.any_moving([&still]));
        assert!(oracle.any_moving([&still, &pushed]));
    }

    #[test]
    fn test_pinned_residual_force_is_settled() {
        let oracle = StabilityOracle::new(&PhysicsConfig::default());
        let held = body((5.0, 5.0), AxisPins::from_axes(true, true));
        assert!(!oracle.any_moving([&held]));
    }
}

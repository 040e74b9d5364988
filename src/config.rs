//! Physics configuration.
//!
//! All tunable constants live in one [`PhysicsConfig`] owned by the
//! [`Simulator`](crate::simulation::Simulator). Bodies and the cycle
//! components read it by reference; replacing it goes through
//! `Simulator::set_config` so that a mid-run change is a single explicit call.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How `dt` enters the per-body velocity/position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepScheme {
    /// `v += a / dt; x += v / dt`.
    ///
    /// The update the default constants are tuned against. A smaller `dt`
    /// produces a larger step.
    #[default]
    Inverted,
    /// `v += a * dt; x += v * dt` (semi-implicit Euler).
    Scaled,
}

/// Configuration for the force simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Constant pull toward the gravity center (default: 0.01).
    pub gravity_strength: f64,
    /// Multiplier on the pairwise repulsion (default: 1.0, 0 disables it).
    pub repulsion_strength: f64,
    /// Distance at which repulsion has fallen to half strength (default: 100).
    pub min_distance: f64,
    /// Steepness of the repulsion falloff (default: 10).
    pub steepness: f64,
    /// Velocity damping factor (default: 0.9).
    pub damping: f64,
    /// Residual force below which an axis counts as settled (default: 0.05).
    pub min_force: f64,
    /// Velocity below which an axis counts as settled (default: 0.02).
    pub min_velocity: f64,
    /// Mass of a body with no springs attached (default: 50).
    pub base_mass: f64,
    /// Extra mass per attached spring end (default: 20).
    pub per_spring_mass: f64,
    /// Rest length given to springs created without one (default: 100).
    pub spring_length: f64,
    /// Maximum cycles run by `stabilize` (default: 1000).
    pub iteration_cap: u32,
    /// Interval between ticks in seconds, used as `dt` (default: 0.05).
    pub time_step: f64,
    /// Integration scheme (default: inverted).
    pub step_scheme: StepScheme,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_strength: 0.01,
            repulsion_strength: 1.0,
            min_distance: 100.0,
            steepness: 10.0,
            damping: 0.9,
            min_force: 0.05,
            min_velocity: 0.02,
            base_mass: 50.0,
            per_spring_mass: 20.0,
            spring_length: 100.0,
            iteration_cap: 1000,
            time_step: 0.05,
            step_scheme: StepScheme::Inverted,
        }
    }
}

impl PhysicsConfig {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        non_negative("gravityStrength", self.gravity_strength)?;
        non_negative("repulsionStrength", self.repulsion_strength)?;
        positive("minDistance", self.min_distance)?;
        non_negative("steepness", self.steepness)?;
        non_negative("damping", self.damping)?;
        non_negative("minForce", self.min_force)?;
        non_negative("minVelocity", self.min_velocity)?;
        positive("baseMass", self.base_mass)?;
        non_negative("perSpringMass", self.per_spring_mass)?;
        positive("springLength", self.spring_length)?;
        positive("timeStep", self.time_step)?;
        Ok(())
    }

    /// Mass of a body with `degree` attached spring ends.
    ///
    /// `mass_weight` overrides `base_mass` for bodies created with their own weight.
    #[inline]
    pub fn mass_for(&self, mass_weight: Option<f64>, degree: usize) -> f64 {
        mass_weight.unwrap_or(self.base_mass) + self.per_spring_mass * degree as f64
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

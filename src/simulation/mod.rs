//! Force-directed layout simulation.
//!
//! One cycle is: [`ForceField`] resets and recomputes every force,
//! [`Integrator`] advances velocities and positions, and [`StabilityOracle`]
//! reports whether anything is still moving. [`Simulator`] owns the graph and
//! drives those cycles.

mod forces;
mod integrator;
mod placement;
mod simulator;
mod stability;

pub use forces::ForceField;
pub use integrator::Integrator;
pub use placement::seed_position;
pub use simulator::{NewBody, Simulator, Stabilization};
pub use stability::StabilityOracle;

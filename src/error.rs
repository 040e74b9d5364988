//! Error types for the physics core.
//!
//! Only construction and handle lookup can fail. Running cycles never
//! returns an error; non-convergence is reported through
//! [`Stabilization`](crate::simulation::Stabilization) instead.

use std::fmt;

use crate::graph::{BodyId, SpringId};

/// A handle to any graph element, used to report stale lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Body(BodyId),
    Spring(SpringId),
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Body(id) => write!(f, "{id}"),
            Handle::Spring(id) => write!(f, "{id}"),
        }
    }
}

impl From<BodyId> for Handle {
    fn from(id: BodyId) -> Self {
        Handle::Body(id)
    }
}

impl From<SpringId> for Handle {
    fn from(id: SpringId) -> Self {
        Handle::Spring(id)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("spring rest length must be positive and finite, got {0}")]
    InvalidRestLength(f64),

    #[error("body mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    #[error("body position must be finite, got ({x}, {y})")]
    InvalidPosition { x: f64, y: f64 },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("invalid physics configuration: {0}")]
    InvalidConfig(String),

    #[error("stale handle: {0} is not registered with this simulator")]
    StaleHandle(Handle),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Body type and related structures.
//!
//! A body is the physical state of a graph node:
//! - A stable unique identifier (survives graph mutations)
//! - Position (x, y), velocity (vx, vy) and accumulated force (fx, fy)
//! - Per-axis pin flags (a pinned axis is excluded from integration)
//! - Mass derived from the number of attached spring ends

use std::fmt;

use super::spring::SpringId;
use crate::config::{PhysicsConfig, StepScheme};
use crate::error::{Error, Result};

/// Stable body identifier.
///
/// Identifiers are never reused, so a handle to a removed body stays
/// detectably stale instead of aliasing a newer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Create a new BodyId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

impl From<u32> for BodyId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<BodyId> for u32 {
    #[inline]
    fn from(id: BodyId) -> Self {
        id.0
    }
}

/// Per-axis pin flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisPins {
    flags: u8,
}

impl AxisPins {
    const X: u8 = 0b0000_0001;
    const Y: u8 = 0b0000_0010;

    /// Both axes free.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Pins from per-axis flags.
    #[inline]
    pub fn from_axes(x: bool, y: bool) -> Self {
        let mut pins = Self::new();
        pins.set_x(x);
        pins.set_y(y);
        pins
    }

    /// Whether the x axis is pinned.
    #[inline]
    pub fn x(self) -> bool {
        self.flags & Self::X != 0
    }

    /// Pin or release the x axis.
    #[inline]
    pub fn set_x(&mut self, pinned: bool) {
        if pinned {
            self.flags |= Self::X;
        } else {
            self.flags &= !Self::X;
        }
    }

    /// Whether the y axis is pinned.
    #[inline]
    pub fn y(self) -> bool {
        self.flags & Self::Y != 0
    }

    /// Pin or release the y axis.
    #[inline]
    pub fn set_y(&mut self, pinned: bool) {
        if pinned {
            self.flags |= Self::Y;
        } else {
            self.flags &= !Self::Y;
        }
    }

    /// True when both axes are pinned.
    #[inline]
    pub fn is_fixed(self) -> bool {
        self.flags == Self::X | Self::Y
    }
}

/// A simulated point mass.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    fx: f64,
    fy: f64,
    pins: AxisPins,
    /// Replaces `PhysicsConfig::base_mass` for this body when set.
    mass_weight: Option<f64>,
    mass: f64,
    /// One entry per attached spring end; a self-loop appears twice.
    springs: Vec<SpringId>,
}

impl Body {
    /// Create a body at rest.
    ///
    /// Fails if the position is not finite or `mass_weight` is not positive.
    pub fn new(
        id: BodyId,
        (x, y): (f64, f64),
        pins: AxisPins,
        mass_weight: Option<f64>,
        config: &PhysicsConfig,
    ) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidPosition { x, y });
        }
        if let Some(weight) = mass_weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(Error::InvalidMass(weight));
            }
        }

        Ok(Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: 0.0,
            fy: 0.0,
            pins,
            mass_weight,
            mass: config.mass_for(mass_weight, 0),
            springs: Vec::new(),
        })
    }

    /// Get the stable identifier.
    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Move the body. Velocity is left untouched.
    #[inline]
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Current velocity.
    #[inline]
    pub fn velocity(&self) -> (f64, f64) {
        (self.vx, self.vy)
    }

    /// Net force from the last force pass.
    #[inline]
    pub fn force(&self) -> (f64, f64) {
        (self.fx, self.fy)
    }

    /// Get the pinned axes.
    #[inline]
    pub fn pins(&self) -> AxisPins {
        self.pins
    }

    /// Replace the pinned axes.
    #[inline]
    pub fn set_pins(&mut self, pins: AxisPins) {
        self.pins = pins;
    }

    /// Current mass, including the per-spring share.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Number of attached spring ends.
    #[inline]
    pub fn degree(&self) -> usize {
        self.springs.len()
    }

    /// Springs attached to this body, one entry per attached end.
    pub fn springs(&self) -> &[SpringId] {
        &self.springs
    }

    /// Register a spring end and recompute mass.
    pub fn attach_spring(&mut self, spring: SpringId, config: &PhysicsConfig) {
        self.springs.push(spring);
        self.update_mass(config);
    }

    /// Unregister one end of `spring` and recompute mass.
    ///
    /// Detaching a spring that is not attached is a no-op; returns whether
    /// an end was removed.
    pub fn detach_spring(&mut self, spring: SpringId, config: &PhysicsConfig) -> bool {
        let removed = match self.springs.iter().position(|&s| s == spring) {
            Some(index) => {
                self.springs.remove(index);
                true
            }
            None => false,
        };
        self.update_mass(config);
        removed
    }

    /// Recompute mass from the configuration and current degree.
    pub fn update_mass(&mut self, config: &PhysicsConfig) {
        self.mass = config.mass_for(self.mass_weight, self.springs.len());
    }

    /// Overwrite the accumulated force. This is the per-cycle reset point.
    #[inline]
    pub fn set_force(&mut self, fx: f64, fy: f64) {
        self.fx = fx;
        self.fy = fy;
    }

    /// Accumulate onto the current force.
    #[inline]
    pub fn add_force(&mut self, fx: f64, fy: f64) {
        self.fx += fx;
        self.fy += fy;
    }

    /// Whether this body still counts as moving.
    ///
    /// Velocity is checked on both axes regardless of pins; residual force
    /// only on unpinned axes.
    pub fn is_moving(&self, min_velocity: f64, min_force: f64) -> bool {
        self.vx.abs() > min_velocity
            || self.vy.abs() > min_velocity
            || (!self.pins.x() && self.fx.abs() > min_force)
            || (!self.pins.y() && self.fy.abs() > min_force)
    }

    /// Advance velocity and position of every unpinned axis by one step.
    pub fn discrete_step(&mut self, dt: f64, damping: f64, scheme: StepScheme) {
        if self.pins.is_fixed() {
            return;
        }
        if !self.pins.x() {
            (self.x, self.vx) = step_axis(self.x, self.vx, self.fx, self.mass, dt, damping, scheme);
        }
        if !self.pins.y() {
            (self.y, self.vy) = step_axis(self.y, self.vy, self.fy, self.mass, dt, damping, scheme);
        }
    }
}

#[inline]
fn step_axis(
    x: f64,
    v: f64,
    f: f64,
    mass: f64,
    dt: f64,
    damping: f64,
    scheme: StepScheme,
) -> (f64, f64) {
    let drag = -damping * v;
    let a = (f + drag) / mass;
    match scheme {
        StepScheme::Inverted => {
            let v = v + a / dt;
            (x + v / dt, v)
        }
        StepScheme::Scaled => {
            let v = v + a * dt;
            (x + v * dt, v)
        }
    }
}

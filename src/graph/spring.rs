//! Spring type and related structures.
//!
//! Springs connect two bodies (possibly the same body). Each spring has:
//! - A stable unique identifier
//! - The two endpoint body IDs
//! - A rest length and the stiffness derived from it

use std::fmt;

use super::body::BodyId;
use crate::error::{Error, Result};

/// Stable spring identifier.
///
/// Like [`BodyId`], identifiers are never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpringId(pub u32);

impl SpringId {
    /// Create a new SpringId from a raw u32.
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

impl fmt::Display for SpringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spring({})", self.0)
    }
}

impl From<u32> for SpringId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<SpringId> for u32 {
    #[inline]
    fn from(id: SpringId) -> Self {
        id.0
    }
}

/// An elastic connector between two bodies.
#[derive(Debug, Clone)]
pub struct Spring {
    id: SpringId,
    from: BodyId,
    to: BodyId,
    rest_length: f64,
    stiffness: f64,
}

impl Spring {
    /// Create a spring. Fails unless `rest_length` is positive and finite.
    pub fn new(id: SpringId, from: BodyId, to: BodyId, rest_length: f64) -> Result<Self> {
        check_rest_length(rest_length)?;
        Ok(Self {
            id,
            from,
            to,
            rest_length,
            stiffness: 1.0 / rest_length,
        })
    }

    /// Get the stable identifier.
    #[inline]
    pub fn id(&self) -> SpringId {
        self.id
    }

    /// The `(from, to)` endpoints in creation order.
    #[inline]
    pub fn endpoints(&self) -> (BodyId, BodyId) {
        (self.from, self.to)
    }

    /// Whether both ends sit on the same body.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Length at which the spring exerts no force.
    #[inline]
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Always `1 / rest_length`.
    #[inline]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Change the rest length, recomputing stiffness. On error nothing changes.
    pub fn set_rest_length(&mut self, rest_length: f64) -> Result<()> {
        check_rest_length(rest_length)?;
        self.rest_length = rest_length;
        self.stiffness = 1.0 / rest_length;
        Ok(())
    }

    /// Signed spring force for the current `length`.
    ///
    /// Negative when stretched past the rest length, positive when compressed.
    #[inline]
    pub fn force_at(&self, length: f64) -> f64 {
        self.stiffness * (self.rest_length - length)
    }
}

fn check_rest_length(rest_length: f64) -> Result<()> {
    if rest_length.is_finite() && rest_length > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidRestLength(rest_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_id() {
        let id = SpringId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Spring(42)");
    }

    #[test]
    fn test_stiffness_from_rest_length() {
        let spring = Spring::new(SpringId::new(0), BodyId::new(0), BodyId::new(1), 100.0).unwrap();
        assert_eq!(spring.stiffness(), 0.01);
        assert_eq!(spring.endpoints(), (BodyId::new(0), BodyId::new(1)));
        assert!(!spring.is_self_loop());
    }

    #[test]
    fn test_rejects_non_positive_rest_length() {
        for length in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = Spring::new(SpringId::new(0), BodyId::new(0), BodyId::new(1), length);
            assert!(matches!(result, Err(Error::InvalidRestLength(_))));
        }
    }

    #[test]
    fn test_set_rest_length() {
        let mut spring =
            Spring::new(SpringId::new(0), BodyId::new(0), BodyId::new(0), 100.0).unwrap();
        assert!(spring.is_self_loop());

        spring.set_rest_length(50.0).unwrap();
        assert_eq!(spring.rest_length(), 50.0);
        assert_eq!(spring.stiffness(), 0.02);

        assert!(spring.set_rest_length(0.0).is_err());
        assert_eq!(spring.rest_length(), 50.0);
        assert_eq!(spring.stiffness(), 0.02);
    }

    #[test]
    fn test_force_sign() {
        let spring = Spring::new(SpringId::new(0), BodyId::new(0), BodyId::new(1), 100.0).unwrap();
        assert_eq!(spring.force_at(100.0), 0.0);
        assert!(spring.force_at(150.0) < 0.0);
        assert!(spring.force_at(50.0) > 0.0);
    }
}

use crate::error::{Error, Result};
use glam::DVec2;

/// Lower edge of the unit square on both axes.
pub const WALL_MIN: f64 = 0.0;
/// Upper edge of the unit square on both axes.
pub const WALL_MAX: f64 = 1.0;

/// A hard disk in the unit square.
///
/// Fields:
/// - `position`: center (x, y)
/// - `velocity`: (vx, vy)
/// - `radius`: fixed at construction, in (0, 0.5]
///
/// Mass is areal: `radius²`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Center of the disk.
    pub position: DVec2,
    /// Velocity of the center.
    pub velocity: DVec2,
    radius: f64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Position is not required to lie inside the box; the next `advance` or
    /// `reflect_off_walls` pulls it back in.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is not in (0, 0.5] or any component is NaN/inf.
    pub fn new(position: DVec2, velocity: DVec2, radius: f64) -> Result<Self> {
        validate_radius(radius)?;
        if !position.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            position,
            velocity,
            radius,
        })
    }

    /// Hard-disk radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Areal mass, `radius²`.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.radius * self.radius
    }

    /// Center x coordinate.
    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Center y coordinate.
    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Velocity x component.
    #[inline]
    pub fn vel_x(&self) -> f64 {
        self.velocity.x
    }

    /// Velocity y component.
    #[inline]
    pub fn vel_y(&self) -> f64 {
        self.velocity.y
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass() * self.velocity.length_squared()
    }

    /// Linear momentum m v.
    #[inline]
    pub fn momentum(&self) -> DVec2 {
        self.velocity * self.mass()
    }

    /// Set position (validated as finite).
    pub fn set_position(&mut self, position: DVec2) -> Result<()> {
        if !position.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        self.position = position;
        Ok(())
    }

    /// Set velocity (validated as finite).
    pub fn set_velocity(&mut self, velocity: DVec2) -> Result<()> {
        if !velocity.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.velocity = velocity;
        Ok(())
    }

    /// True iff the centers are strictly closer than the sum of the radii.
    pub fn collides_with(&self, other: &Particle) -> bool {
        self.position.distance(other.position) < self.radius + other.radius
    }

    /// Clamp the disk back inside the unit square, flipping the velocity component on
    /// every axis whose wall was crossed.
    ///
    /// This is a positional correction, not a time-of-impact reflection: whatever
    /// distance the disk travelled past the wall during the step is dropped. Both axes are
    /// checked on every call, so a corner hit flips both components.
    pub fn reflect_off_walls(&mut self) {
        let lo = WALL_MIN + self.radius;
        let hi = WALL_MAX - self.radius;
        for axis in 0..2 {
            if self.position[axis] - self.radius < WALL_MIN {
                self.position[axis] = lo;
                self.velocity[axis] = -self.velocity[axis];
            }
            if self.position[axis] + self.radius > WALL_MAX {
                self.position[axis] = hi;
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }

    /// Free flight for `dt` at constant velocity (explicit Euler), then wall reflection.
    pub fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.reflect_off_walls();
    }
}

pub(crate) fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidParam("radius must be finite and > 0".into()));
    }
    if 2.0 * radius > WALL_MAX - WALL_MIN {
        return Err(Error::InvalidParam(format!(
            "radius {radius} does not fit in the unit square (must be <= 0.5)"
        )));
    }
    Ok(())
}

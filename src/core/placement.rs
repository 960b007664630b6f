//! Rejection-sampled initial placement of non-overlapping disks.

use crate::core::particle::{validate_radius, Particle, WALL_MAX, WALL_MIN};
use crate::error::{Error, Result};
use glam::DVec2;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::{debug, trace, warn};

/// Lower bound of the initial speed band.
pub const SPEED_MIN: f64 = 0.001;
/// Upper bound (exclusive) of the initial speed band.
pub const SPEED_MAX: f64 = 0.021;

/// Attempts per particle after which a warning is logged (placement keeps going).
const SLOW_PLACEMENT_ATTEMPTS: usize = 100_000;

/// Parameters for initial placement.
///
/// `max_attempts = None` means sampling for a particle never gives up. Radii with no
/// feasible non-overlapping arrangement then loop forever; callers are responsible for
/// supplying radii that pack into the unit square.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Half-open band `[min, max)` the initial speed is drawn from.
    pub speed_range: (f64, f64),
    /// Cap on trial positions per particle; exceeding it yields `Error::PlacementInfeasible`.
    pub max_attempts: Option<usize>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            speed_range: (SPEED_MIN, SPEED_MAX),
            max_attempts: None,
        }
    }
}

impl Placement {
    /// Bound the number of trial positions per particle.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    fn validate(&self) -> Result<()> {
        let (lo, hi) = self.speed_range;
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || hi <= lo {
            return Err(Error::InvalidParam(
                "speed_range must be finite with 0 <= min < max".into(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(Error::InvalidParam("max_attempts must be > 0".into()));
        }
        Ok(())
    }

    /// Place one particle per radius, in order.
    ///
    /// Each particle draws a position uniform in `[r, 1-r]²`, a speed uniform in
    /// `speed_range` and a direction uniform in `[0, 2π)`, retrying until it overlaps none
    /// of the particles already accepted. The resulting order is the particles' identity.
    pub fn place<R: Rng>(&self, radii: &[f64], rng: &mut R) -> Result<Vec<Particle>> {
        self.validate()?;
        for &r in radii {
            validate_radius(r)?;
        }

        let mut particles: Vec<Particle> = Vec::with_capacity(radii.len());
        let mut total_attempts = 0usize;
        for (index, &radius) in radii.iter().enumerate() {
            let mut attempts = 0usize;
            let candidate = loop {
                if let Some(max) = self.max_attempts {
                    if attempts >= max {
                        return Err(Error::PlacementInfeasible { index, attempts });
                    }
                }
                attempts += 1;
                if attempts == SLOW_PLACEMENT_ATTEMPTS {
                    warn!(index, attempts, "placement is struggling; radii may not pack into the box");
                }

                let candidate = self.sample(radius, rng)?;
                if particles.iter().any(|p| p.collides_with(&candidate)) {
                    trace!(index, attempts, "placement rejected: overlap");
                    continue;
                }
                break candidate;
            };
            total_attempts += attempts;
            particles.push(candidate);
        }

        debug!(count = particles.len(), total_attempts, "placed particles");
        Ok(particles)
    }

    fn sample<R: Rng>(&self, radius: f64, rng: &mut R) -> Result<Particle> {
        let lo = WALL_MIN + radius;
        let hi = WALL_MAX - radius;
        let position = DVec2::new(rng.random_range(lo..=hi), rng.random_range(lo..=hi));

        let (s_lo, s_hi) = self.speed_range;
        let speed = rng.random_range(s_lo..s_hi);
        let phi = rng.random_range(0.0..TAU);
        let velocity = DVec2::from_angle(phi) * speed;

        Particle::new(position, velocity, radius)
    }
}

use crate::core::placement::Placement;
use crate::core::Particle;
use crate::error::{Error, Result};
use crate::results::{FrameRow, ResultsSink};
use glam::DVec2;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, instrument, trace};

/// An ensemble of hard disks in the unit square, integrated with a fixed timestep.
///
/// The particle count is fixed at construction and a particle's index is its identity for
/// the whole run. Collisions are only detected at step boundaries, and overlapping pairs
/// are resolved one at a time in lexicographic index order.
#[derive(Debug, Clone)]
pub struct Simulation {
    time_now: f64,
    particles: Vec<Particle>,
}

impl Simulation {
    /// Create a simulation with one disk per entry of `radii`, placed by rejection sampling.
    ///
    /// There is no attempt cap: radii that cannot be packed without overlap make this call
    /// loop forever. Use [`Simulation::with_placement`] with `max_attempts` set to bound it.
    pub fn new(num_particles: usize, radii: &[f64], seed: Option<u64>) -> Result<Self> {
        Self::with_placement(num_particles, radii, &Placement::default(), seed)
    }

    /// Create a simulation using explicit placement parameters.
    pub fn with_placement(
        num_particles: usize,
        radii: &[f64],
        placement: &Placement,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Self::with_rng(num_particles, radii, placement, &mut rng)
    }

    /// Create a simulation drawing placement randomness from a caller-owned RNG.
    pub fn with_rng<R: Rng>(
        num_particles: usize,
        radii: &[f64],
        placement: &Placement,
        rng: &mut R,
    ) -> Result<Self> {
        if num_particles == 0 {
            return Err(Error::InvalidParam("num_particles must be > 0".into()));
        }
        if radii.len() != num_particles {
            return Err(Error::InvalidParam(format!(
                "expected {} radii, got {}",
                num_particles,
                radii.len()
            )));
        }

        let particles = placement.place(radii, rng)?;
        Ok(Self {
            time_now: 0.0,
            particles,
        })
    }

    /// Build a simulation from explicit particle states, starting at time 0.
    pub fn from_particles(particles: Vec<Particle>) -> Result<Self> {
        if particles.is_empty() {
            return Err(Error::InvalidParam("at least one particle is required".into()));
        }
        Ok(Self {
            time_now: 0.0,
            particles,
        })
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Particles in index order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view of the particles. The slice cannot grow or shrink.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Positions as a Vec of 2-vectors, in index order.
    pub fn positions(&self) -> Vec<DVec2> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Velocities as a Vec of 2-vectors, in index order.
    pub fn velocities(&self) -> Vec<DVec2> {
        self.particles.iter().map(|p| p.velocity).collect()
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total linear momentum with areal masses (diagnostic).
    pub fn momentum(&self) -> DVec2 {
        self.particles.iter().map(|p| p.momentum()).sum()
    }

    /// Detect-and-resolve pass over every pair `(i, j)`, `i < j`, in lexicographic order.
    ///
    /// Each overlapping pair is resolved as soon as it is found, so a particle's updated
    /// velocity is what later pairs in the same pass see. Returns the number of pairs
    /// resolved.
    ///
    /// On `Error::DegenerateContact` the pass stops; pairs before the failing one keep
    /// their updated velocities.
    pub fn resolve_collisions(&mut self) -> Result<usize> {
        let n = self.particles.len();
        let mut resolved = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                if self.particles[i].collides_with(&self.particles[j]) {
                    self.resolve_p2p(i, j)?;
                    resolved += 1;
                }
            }
        }
        Ok(resolved)
    }

    /// One timestep: advance every particle by `dt`, resolve collisions on the
    /// post-advance positions, then increment time.
    ///
    /// If the collision pass fails, time is still incremented so that it matches the
    /// already-advanced positions; velocities are left as the partial pass wrote them (see
    /// [`Simulation::resolve_collisions`]) and the error is returned.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidParam("dt must be finite and > 0".into()));
        }
        for p in &mut self.particles {
            p.advance(dt);
        }
        let pass = self.resolve_collisions();
        self.time_now += dt;
        let resolved = pass?;
        trace!(time = self.time_now, resolved, "step");
        Ok(())
    }

    /// Step while `time <= time_end`, emitting one frame (a row per particle, in index
    /// order) to `sink` after every step. Returns the number of steps taken.
    ///
    /// Time is accumulated as repeated `time += dt`, so the exact step count near
    /// `time_end` is subject to floating-point drift: it is about `floor(time_end/dt) + 1`
    /// when starting from 0.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `time_end` or `dt` is non-finite or non-positive, if
    ///   `dt > time_end`, or if `time_end` lies before the current time.
    /// - Any error from [`Simulation::step`] or the sink stops the run. The failing step's
    ///   frame is not emitted, but the simulation keeps that step's positions and time.
    #[instrument(skip(self, sink), fields(n = self.particles.len()))]
    pub fn run<S: ResultsSink + ?Sized>(
        &mut self,
        time_end: f64,
        dt: f64,
        sink: &mut S,
    ) -> Result<usize> {
        if !time_end.is_finite() || time_end <= 0.0 {
            return Err(Error::InvalidParam("time_end must be finite and > 0".into()));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidParam("dt must be finite and > 0".into()));
        }
        if dt > time_end {
            return Err(Error::InvalidParam(format!(
                "dt ({dt}) must not exceed time_end ({time_end})"
            )));
        }
        if time_end < self.time_now {
            return Err(Error::InvalidParam(format!(
                "time_end ({time_end}) is earlier than current time ({})",
                self.time_now
            )));
        }

        debug!(start = self.time_now, "run started");
        let mut steps = 0usize;
        while self.time_now <= time_end {
            self.step(dt)?;
            self.emit_frame(sink)?;
            steps += 1;
        }
        debug!(steps, end = self.time_now, "run finished");
        Ok(steps)
    }

    /// Send the current state to `sink` as one row per particle.
    pub fn emit_frame<S: ResultsSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        for (i, p) in self.particles.iter().enumerate() {
            sink.record(&FrameRow::from_particle(self.time_now, i, p))?;
        }
        Ok(())
    }

    // ============ Internal helpers ============

    /// Resolve the pair (i, j) in place. Both new velocities are computed before either
    /// is written back.
    fn resolve_p2p(&mut self, i: usize, j: usize) -> Result<()> {
        let (u1, u2) = elastic_velocities(&self.particles[i], &self.particles[j])
            .map_err(|e| match e {
                Error::DegenerateContact { .. } => Error::DegenerateContact { i, j },
                other => other,
            })?;
        trace!(i, j, "resolved collision");
        self.particles[i].velocity = u1;
        self.particles[j].velocity = u2;
        Ok(())
    }
}

/// Post-collision velocities of two disks under a 2D elastic collision along the line of
/// centers, with masses `radius²`.
///
/// Neither particle is modified. Errors with `Error::DegenerateContact` (indices 0 and 1)
/// if the centers coincide, and `Error::NonFinite` if the result overflows.
pub fn elastic_velocities(p1: &Particle, p2: &Particle) -> Result<(DVec2, DVec2)> {
    let dx = p1.position - p2.position;
    let d_sq = dx.length_squared();
    if d_sq == 0.0 {
        return Err(Error::DegenerateContact { i: 0, j: 1 });
    }

    let (m1, m2) = (p1.mass(), p2.mass());
    let (v1, v2) = (p1.velocity, p2.velocity);
    let m_sum = m1 + m2;

    let u1 = v1 - dx * (2.0 * m2 / m_sum * (v1 - v2).dot(dx) / d_sq);
    let u2 = v2 - (-dx) * (2.0 * m1 / m_sum * (v2 - v1).dot(-dx) / d_sq);

    if !u1.is_finite() || !u2.is_finite() {
        return Err(Error::NonFinite(
            "post-collision velocity is not finite".into(),
        ));
    }
    Ok((u1, u2))
}

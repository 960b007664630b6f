//! Scenario files: everything needed to set up and run one simulation, loaded from YAML.
//!
//! ```yaml
//! particles:
//!   count: 20
//!   radii:              # or `fixed: 0.02`, or `list: [0.01, 0.02, ...]`
//!     uniform: { min: 0.01, max: 0.03 }
//! run:
//!   t_end: 10.0
//!   dt: 0.01
//! seed: 42                # optional; omitted -> nondeterministic
//! placement:              # optional
//!   max_attempts: 100000  # optional; omitted -> retry forever
//! output: results.csv     # optional; omitted -> stdout
//! ```

use crate::core::particle::validate_radius;
use crate::core::placement::Placement;
use crate::core::Simulation;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// How per-particle radii are chosen.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RadiiConfig {
    /// Every particle gets the same radius.
    Fixed(f64),
    /// Radii drawn uniformly from `[min, max)` using the scenario RNG.
    Uniform { min: f64, max: f64 },
    /// Explicit radius per particle; length must equal `count`.
    List(Vec<f64>),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ParticlesConfig {
    pub count: usize,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub radii: RadiiConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub t_end: f64, // end time, inclusive
    pub dt: f64,    // fixed step size
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PlacementConfig {
    pub max_attempts: Option<usize>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub particles: ParticlesConfig,
    pub run: RunConfig,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the run parameters and radii before any simulation work starts.
    pub fn validate(&self) -> Result<()> {
        let RunConfig { t_end, dt } = self.run;
        if !t_end.is_finite() || t_end <= 0.0 {
            return Err(Error::InvalidParam("run.t_end must be finite and > 0".into()));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidParam("run.dt must be finite and > 0".into()));
        }
        if dt > t_end {
            return Err(Error::InvalidParam("run.dt must not exceed run.t_end".into()));
        }
        if self.particles.count == 0 {
            return Err(Error::InvalidParam("particles.count must be > 0".into()));
        }
        if self.placement.max_attempts == Some(0) {
            return Err(Error::InvalidParam("placement.max_attempts must be > 0".into()));
        }
        match &self.particles.radii {
            RadiiConfig::Fixed(radius) => validate_radius(*radius),
            RadiiConfig::Uniform { min, max } => {
                validate_radius(*min)?;
                validate_radius(*max)?;
                if max <= min {
                    return Err(Error::InvalidParam(
                        "radii.max must be greater than radii.min".into(),
                    ));
                }
                Ok(())
            }
            RadiiConfig::List(values) => {
                if values.len() != self.particles.count {
                    return Err(Error::InvalidParam(format!(
                        "radii.list has {} entries but particles.count is {}",
                        values.len(),
                        self.particles.count
                    )));
                }
                values.iter().try_for_each(|r| validate_radius(*r))
            }
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            max_attempts: self.placement.max_attempts,
            ..Placement::default()
        }
    }

    /// Radii for every particle, drawing from `rng` when the config asks for random radii.
    pub fn radii<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let n = self.particles.count;
        match &self.particles.radii {
            RadiiConfig::Fixed(radius) => vec![*radius; n],
            RadiiConfig::Uniform { min, max } => {
                (0..n).map(|_| rng.random_range(*min..*max)).collect()
            }
            RadiiConfig::List(values) => values.clone(),
        }
    }

    /// Sample radii and initial placement from one RNG seeded by `seed` (falling back to
    /// the scenario's own seed, then to entropy).
    pub fn build(&self, seed: Option<u64>) -> Result<Simulation> {
        let mut rng: StdRng = match seed.or(self.seed) {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        let radii = self.radii(&mut rng);
        Simulation::with_rng(self.particles.count, &radii, &self.placement(), &mut rng)
    }
}

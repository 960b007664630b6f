//! Hard-disk gas in the unit square.
//!
//! Disks move ballistically with a fixed timestep, are clamped and reflected at the walls,
//! and overlapping pairs are resolved as elastic collisions with areal mass `radius²`.
//! Each step's state is handed to a [`results::ResultsSink`].
//!
//! ```no_run
//! use diskgas::core::Simulation;
//! use diskgas::results::FrameRow;
//!
//! # fn main() -> diskgas::error::Result<()> {
//! let radii = vec![0.02; 20];
//! let mut sim = Simulation::new(radii.len(), &radii, Some(42))?;
//! let mut rows: Vec<FrameRow> = Vec::new();
//! sim.run(10.0, 0.01, &mut rows)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod results;

#[cfg(feature = "python")]
mod python;

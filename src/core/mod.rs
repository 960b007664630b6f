//! Physics core: disk state, initial placement and the fixed-step integration loop.

pub mod particle;
pub mod placement;
pub mod sim;

pub use particle::Particle;
pub use placement::Placement;
pub use sim::{elastic_velocities, Simulation};

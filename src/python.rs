use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{Placement, Simulation};
use crate::results::FrameRow;
use glam::DVec2;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn rows_to_array(rows: &[FrameRow]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), 7));
    for (i, row) in rows.iter().enumerate() {
        arr[[i, 0]] = row.time;
        arr[[i, 1]] = row.particle as f64;
        arr[[i, 2]] = row.radius;
        arr[[i, 3]] = row.x;
        arr[[i, 4]] = row.y;
        arr[[i, 5]] = row.vel_x;
        arr[[i, 6]] = row.vel_y;
    }
    arr
}

fn vecs_to_array(vs: &[DVec2]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((vs.len(), 2));
    for (i, v) in vs.iter().enumerate() {
        arr[[i, 0]] = v.x;
        arr[[i, 1]] = v.y;
    }
    arr
}

fn array_to_vecs(arr: &PyReadonlyArray2<'_, f64>, n: usize, what: &str) -> PyResult<Vec<DVec2>> {
    let arr = arr.as_array();
    if arr.shape() != [n, 2].as_slice() {
        return Err(py_err(format!(
            "{what} must have shape ({n}, 2), got {:?}",
            arr.shape()
        )));
    }
    let vs: Vec<DVec2> = (0..n).map(|i| DVec2::new(arr[[i, 0]], arr[[i, 1]])).collect();
    if !vs.iter().all(|v| v.is_finite()) {
        return Err(py_err(format!("{what} values must be finite")));
    }
    Ok(vs)
}

/// Python-facing wrapper around the Rust `Simulation`.
///
/// - __new__(num_particles, radii, seed=None, max_attempts=None)
/// - run(time_end, dt) -> np.ndarray, shape (M, 7): time, particle, radius, x, y, velx, vely
/// - step(dt), resolve_collisions() -> int
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2)
/// - set_positions(arr) / set_velocities(arr)
#[pyclass]
pub struct DiskSim {
    sim: Simulation,
}

#[pymethods]
impl DiskSim {
    /// Place `num_particles` disks with the given radii by rejection sampling.
    ///
    /// Without `max_attempts`, radii that cannot be packed hang the constructor.
    /// Errors: raises ValueError on invalid parameters or infeasible placement.
    #[new]
    #[pyo3(signature = (num_particles, radii, seed=None, max_attempts=None))]
    fn new(
        num_particles: usize,
        radii: Vec<f64>,
        seed: Option<u64>,
        max_attempts: Option<usize>,
    ) -> PyResult<Self> {
        let placement = Placement {
            max_attempts,
            ..Placement::default()
        };
        let sim = Simulation::with_placement(num_particles, &radii, &placement, seed)
            .map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Current simulation time.
    #[getter]
    fn time(&self) -> f64 {
        self.sim.time()
    }

    /// Run to `time_end` (releases the GIL) and return every emitted frame row.
    fn run(&mut self, py: Python<'_>, time_end: f64, dt: f64) -> PyResult<Py<PyArray2<f64>>> {
        let mut rows: Vec<FrameRow> = Vec::new();
        py.detach(|| self.sim.run(time_end, dt, &mut rows))
            .map_err(py_err)?;
        Ok(rows_to_array(&rows).into_pyarray(py).unbind())
    }

    /// Advance a single timestep without recording a frame.
    fn step(&mut self, dt: f64) -> PyResult<()> {
        self.sim.step(dt).map_err(py_err)
    }

    /// Run one detect-and-resolve pass; returns the number of pairs resolved.
    fn resolve_collisions(&mut self) -> PyResult<usize> {
        self.sim.resolve_collisions().map_err(py_err)
    }

    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    fn get_positions(&self, py: Python<'_>) -> Py<PyArray2<f64>> {
        vecs_to_array(&self.sim.positions()).into_pyarray(py).unbind()
    }

    fn get_velocities(&self, py: Python<'_>) -> Py<PyArray2<f64>> {
        vecs_to_array(&self.sim.velocities()).into_pyarray(py).unbind()
    }

    /// Set all particle positions from an (N, 2) float64 array. Values must be finite.
    fn set_positions(&mut self, positions: PyReadonlyArray2<'_, f64>) -> PyResult<()> {
        let vs = array_to_vecs(&positions, self.sim.num_particles(), "positions")?;
        for (p, v) in self.sim.particles_mut().iter_mut().zip(vs) {
            p.set_position(v).map_err(py_err)?;
        }
        Ok(())
    }

    /// Set all particle velocities from an (N, 2) float64 array. Values must be finite.
    fn set_velocities(&mut self, velocities: PyReadonlyArray2<'_, f64>) -> PyResult<()> {
        let vs = array_to_vecs(&velocities, self.sim.num_particles(), "velocities")?;
        for (p, v) in self.sim.particles_mut().iter_mut().zip(vs) {
            p.set_velocity(v).map_err(py_err)?;
        }
        Ok(())
    }
}

/// The diskgas Python module entry point.
#[pymodule]
fn diskgas(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<DiskSim>()?;
    Ok(())
}

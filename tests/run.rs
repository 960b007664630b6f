use diskgas::core::{Particle, Simulation};
use diskgas::error::{Error, Result};
use diskgas::results::{CsvSink, FrameRow, CSV_HEADER};
use glam::DVec2;

fn small_gas(seed: u64) -> Result<Simulation> {
    let radii: Vec<f64> = (0..16).map(|i| 0.015 + 0.001 * (i % 5) as f64).collect();
    Simulation::new(radii.len(), &radii, Some(seed))
}

/// Rows arrive grouped by step, in particle-index order, with non-decreasing times.
#[test]
fn frames_are_ordered() -> Result<()> {
    let mut sim = small_gas(11)?;
    let n = sim.num_particles();
    let mut rows: Vec<FrameRow> = Vec::new();
    let steps = sim.run(0.5, 0.01, &mut rows)?;
    assert_eq!(rows.len(), steps * n);

    for (k, frame) in rows.chunks(n).enumerate() {
        for (i, row) in frame.iter().enumerate() {
            assert_eq!(row.particle, i);
            assert_eq!(row.time, frame[0].time, "mixed times in frame {k}");
        }
    }
    for pair in rows.windows(2) {
        assert!(pair[1].time >= pair[0].time);
    }
    // The first frame is stamped after the first step, not at t = 0.
    assert!((rows[0].time - 0.01).abs() < 1e-15);
    Ok(())
}

/// The loop runs while time <= time_end; with exactly representable steps that is
/// time_end/dt + 1 steps.
#[test]
fn step_count_is_inclusive_of_end_time() -> Result<()> {
    let p = Particle::new(DVec2::new(0.5, 0.5), DVec2::new(0.01, 0.0), 0.1)?;
    let mut sim = Simulation::from_particles(vec![p])?;
    let mut rows: Vec<FrameRow> = Vec::new();
    let steps = sim.run(1.0, 0.25, &mut rows)?;
    assert_eq!(steps, 5);
    assert_eq!(sim.time(), 1.25);
    let times: Vec<f64> = rows.iter().map(|r| r.time).collect();
    assert_eq!(times, vec![0.25, 0.5, 0.75, 1.0, 1.25]);
    Ok(())
}

#[test]
fn identical_setups_give_identical_streams() -> Result<()> {
    let mut a = small_gas(99)?;
    let mut b = a.clone();
    let mut rows_a: Vec<FrameRow> = Vec::new();
    let mut rows_b: Vec<FrameRow> = Vec::new();
    a.run(2.0, 0.01, &mut rows_a)?;
    b.run(2.0, 0.01, &mut rows_b)?;
    assert_eq!(rows_a, rows_b);

    // Same seed, fresh construction: same placement, same stream.
    let mut c = small_gas(99)?;
    let mut rows_c: Vec<FrameRow> = Vec::new();
    c.run(2.0, 0.01, &mut rows_c)?;
    assert_eq!(rows_a, rows_c);
    Ok(())
}

#[test]
fn run_rejects_invalid_time_parameters() -> Result<()> {
    let mut sim = small_gas(1)?;
    let mut rows: Vec<FrameRow> = Vec::new();
    for (t_end, dt) in [
        (1.0, 0.0),
        (1.0, -0.1),
        (0.0, 0.1),
        (-1.0, 0.1),
        (1.0, f64::NAN),
        (f64::INFINITY, 0.1),
        (0.1, 0.5),
    ] {
        let err = sim.run(t_end, dt, &mut rows).unwrap_err();
        assert!(
            matches!(err, Error::InvalidParam(_)),
            "t_end={t_end} dt={dt}: {err}"
        );
    }
    assert!(rows.is_empty());
    assert_eq!(sim.time(), 0.0);
    Ok(())
}

#[test]
fn run_continues_from_current_time() -> Result<()> {
    let mut sim = small_gas(3)?;
    let mut rows: Vec<FrameRow> = Vec::new();
    sim.run(0.5, 0.1, &mut rows)?;
    let t_mid = sim.time();
    assert!(sim.run(0.3, 0.1, &mut rows).is_err());

    let before = rows.len();
    sim.run(1.0, 0.1, &mut rows)?;
    assert!(rows.len() > before);
    assert!(rows[before].time > t_mid);
    Ok(())
}

/// Total kinetic energy changes only through collisions, which conserve it.
#[test]
fn energy_is_conserved_over_a_run() -> Result<()> {
    let mut sim = small_gas(2718)?;
    let e0 = sim.kinetic_energy();
    let mut rows: Vec<FrameRow> = Vec::new();
    sim.run(20.0, 0.01, &mut rows)?;
    let e1 = sim.kinetic_energy();
    let rel = ((e1 - e0) / e0).abs();
    assert!(rel < 1e-9, "relative energy drift {rel} (E0={e0}, E1={e1})");
    Ok(())
}

#[test]
fn csv_output_has_one_line_per_row() -> Result<()> {
    let mut sim = small_gas(8)?;
    let mut sink = CsvSink::new(Vec::new());
    let steps = sim.run(0.1, 0.02, &mut sink)?;
    let text = String::from_utf8(sink.into_inner()).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(lines.count(), steps * sim.num_particles());
    Ok(())
}

use diskgas::core::{Particle, Simulation};
use diskgas::error::Result;
use diskgas::results::FrameRow;
use glam::DVec2;

/// A disk far outside the box is clamped onto both far walls in one call.
#[test]
fn reflect_outside_box_lands_on_far_walls() -> Result<()> {
    let mut p = Particle::new(DVec2::new(2.0, 2.0), DVec2::ZERO, 0.1)?;
    p.reflect_off_walls();
    assert_eq!(p.position, DVec2::new(0.9, 0.9));
    assert_eq!(p.velocity, DVec2::ZERO);
    Ok(())
}

/// Fast disks with large steps still never leave the box: every emitted row satisfies
/// r <= x, y <= 1 - r.
#[test]
fn containment_holds_for_every_frame() -> Result<()> {
    let radii: Vec<f64> = (0..25).map(|i| 0.01 + 0.001 * (i % 10) as f64).collect();
    let mut sim = Simulation::new(radii.len(), &radii, Some(2024))?;
    for p in sim.particles_mut() {
        // Much faster than the sampled speeds, so walls are crossed by a wide margin.
        let v = p.velocity * 40.0;
        p.set_velocity(v)?;
    }

    let mut rows: Vec<FrameRow> = Vec::new();
    sim.run(2.0, 0.05, &mut rows)?;
    assert!(!rows.is_empty());
    for row in &rows {
        let r = row.radius;
        assert!(row.x >= r && row.x <= 1.0 - r, "x out of box: {row:?}");
        assert!(row.y >= r && row.y <= 1.0 - r, "y out of box: {row:?}");
    }
    Ok(())
}

/// A lone disk bouncing between the side walls keeps its speed.
#[test]
fn wall_bounces_preserve_speed() -> Result<()> {
    let p = Particle::new(DVec2::new(0.5, 0.5), DVec2::new(0.7, -0.3), 0.05)?;
    let mut sim = Simulation::from_particles(vec![p])?;
    let speed0 = sim.particles()[0].velocity.length();
    let mut flips = 0;
    let mut last_vx = sim.particles()[0].vel_x();
    for _ in 0..500 {
        sim.step(0.01)?;
        let vx = sim.particles()[0].vel_x();
        if vx.signum() != last_vx.signum() {
            flips += 1;
        }
        last_vx = vx;
    }
    assert!(flips > 0, "disk never reached a side wall");
    let speed1 = sim.particles()[0].velocity.length();
    assert!((speed1 - speed0).abs() < 1e-12);
    Ok(())
}

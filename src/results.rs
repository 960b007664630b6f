//! Per-step result rows and the sinks that consume them.
//!
//! The simulation emits one [`FrameRow`] per particle per step, in particle-index order
//! within a step and in non-decreasing time across steps. Sinks decide what to do with
//! them: keep them in memory, or stream them out as CSV or JSON lines.

use crate::core::Particle;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// CSV header written once by [`CsvSink`].
pub const CSV_HEADER: &str = "time,particle,radius,x,y,velx,vely";

/// State of one particle at one simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRow {
    pub time: f64,
    pub particle: usize,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "velx")]
    pub vel_x: f64,
    #[serde(rename = "vely")]
    pub vel_y: f64,
}

impl FrameRow {
    pub fn from_particle(time: f64, particle: usize, p: &Particle) -> Self {
        Self {
            time,
            particle,
            radius: p.radius(),
            x: p.x(),
            y: p.y(),
            vel_x: p.vel_x(),
            vel_y: p.vel_y(),
        }
    }
}

/// Append-only consumer of frame rows.
pub trait ResultsSink {
    fn record(&mut self, row: &FrameRow) -> Result<()>;

    /// Flush any buffered output. The default does nothing.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ResultsSink for Vec<FrameRow> {
    fn record(&mut self, row: &FrameRow) -> Result<()> {
        self.push(*row);
        Ok(())
    }
}

/// Writes rows as comma-separated values, header first.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    out: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultsSink for CsvSink<W> {
    fn record(&mut self, row: &FrameRow) -> Result<()> {
        if !self.header_written {
            writeln!(self.out, "{CSV_HEADER}")?;
            self.header_written = true;
        }
        writeln!(
            self.out,
            "{},{},{},{},{},{},{}",
            row.time, row.particle, row.radius, row.x, row.y, row.vel_x, row.vel_y
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Writes one JSON object per row, newline separated.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultsSink for JsonLinesSink<W> {
    fn record(&mut self, row: &FrameRow) -> Result<()> {
        serde_json::to_writer(&mut self.out, row)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn sample_row() -> Result<FrameRow> {
        let p = Particle::new(DVec2::new(0.25, 0.5), DVec2::new(-0.5, 0.125), 0.05)?;
        Ok(FrameRow::from_particle(0.01, 3, &p))
    }

    #[test]
    fn csv_writes_header_once() -> Result<()> {
        let row = sample_row()?;
        let mut sink = CsvSink::new(Vec::new());
        sink.record(&row)?;
        sink.record(&row)?;
        sink.finish()?;
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "0.01,3,0.05,0.25,0.5,-0.5,0.125");
        assert_eq!(lines[1], lines[2]);
        Ok(())
    }

    #[test]
    fn csv_without_rows_is_empty() {
        let sink = CsvSink::new(Vec::new());
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn json_lines_use_short_velocity_names() -> Result<()> {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.record(&sample_row()?)?;
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        let v: serde_json::Value = serde_json::from_str(text.trim_end())?;
        assert_eq!(v["particle"], 3);
        assert_eq!(v["velx"], -0.5);
        assert_eq!(v["vely"], 0.125);
        assert!(text.ends_with('\n'));
        Ok(())
    }
}

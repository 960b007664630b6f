use diskgas::config::ScenarioConfig;
use diskgas::results::{CsvSink, JsonLinesSink, ResultsSink};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Csv,
    Jsonl,
}

/// Run a hard-disk gas scenario and write one row per particle per step.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scenario YAML file.
    #[arg(short, long, default_value = "scenarios/default.yaml")]
    file: PathBuf,

    /// Output path; overrides the scenario's `output`. Stdout when neither is set.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// RNG seed; overrides the scenario's `seed`.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let f = File::create(p).with_context(|| format!("creating {}", p.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let scenario = ScenarioConfig::from_path(&args.file)
        .with_context(|| format!("loading scenario {}", args.file.display()))?;

    let mut sim = scenario.build(args.seed).context("placing particles")?;
    info!(
        particles = sim.num_particles(),
        t_end = scenario.run.t_end,
        dt = scenario.run.dt,
        "scenario loaded"
    );

    let out = open_output(args.output.as_ref().or(scenario.output.as_ref()))?;
    let mut sink: Box<dyn ResultsSink> = match args.format {
        Format::Csv => Box::new(CsvSink::new(out)),
        Format::Jsonl => Box::new(JsonLinesSink::new(out)),
    };

    let steps = sim
        .run(scenario.run.t_end, scenario.run.dt, sink.as_mut())
        .context("running simulation")?;
    sink.finish()?;

    info!(steps, energy = sim.kinetic_energy(), "done");
    Ok(())
}

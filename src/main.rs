//! `torus-life` runner.
//!
//! Loads a simulation config (and an optional `<name>.seed.json` next to
//! it), advances the grid and writes newline-delimited JSON to stdout: one
//! [`GridStats`] sample per checkpoint followed by a [`RunReport`].

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use log::info;
use serde::Serialize;

use torus_life::{
    compute::{Grid, GridStats, LifeLikeRule},
    schema::{Seed, SimulationConfig},
};

const USAGE: &str = "\
usage: torus-life <config.json> [generations] [samples]
       torus-life --example

Writes one JSON stats line per sample, then a JSON run report.
generations defaults to 100, samples to 10.";

/// Summary emitted once the run finishes.
#[derive(Debug, Serialize)]
struct RunReport {
    width: usize,
    height: usize,
    rule: LifeLikeRule,
    generations: u64,
    initial: GridStats,
    final_stats: GridStats,
    elapsed_secs: f64,
    generations_per_sec: f64,
    mcells_per_sec: f64,
}

/// Parsed command line.
enum Command {
    Example,
    Run {
        config: PathBuf,
        generations: u64,
        samples: u64,
    },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args {
        [flag] if flag == "--example" => Ok(Command::Example),
        [config, rest @ ..] if rest.len() <= 2 => {
            let number = |i: usize, default: u64| match rest.get(i) {
                Some(raw) => raw.parse().map_err(|_| format!("not a number: {raw}")),
                None => Ok(default),
            };
            Ok(Command::Run {
                config: PathBuf::from(config),
                generations: number(0, 100)?,
                samples: number(1, 10)?,
            })
        }
        _ => Err(USAGE.to_string()),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|command| match command {
        Command::Example => example(),
        Command::Run {
            config,
            generations,
            samples,
        } => run(&config, generations, samples),
    });

    if let Err(message) = result {
        eprintln!("{message}");
        process::exit(1);
    }
}

fn load_seed(config_path: &Path) -> Result<Seed, String> {
    let seed_path = config_path.with_extension("seed.json");
    if !seed_path.exists() {
        info!("No {} found; using the default seed", seed_path.display());
        return Ok(Seed::default());
    }
    let raw = std::fs::read_to_string(&seed_path)
        .map_err(|e| format!("cannot read {}: {e}", seed_path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid seed {}: {e}", seed_path.display()))
}

fn emit<T: Serialize>(value: &T) -> Result<(), String> {
    let line = serde_json::to_string(value).map_err(|e| e.to_string())?;
    println!("{line}");
    Ok(())
}

fn run(config_path: &Path, generations: u64, samples: u64) -> Result<(), String> {
    let config = SimulationConfig::from_json_file(config_path)
        .map_err(|e| format!("cannot load {}: {e}", config_path.display()))?;
    let seed = load_seed(config_path)?;
    let mut grid = Grid::from_config(&config, &seed).map_err(|e| e.to_string())?;

    info!(
        "{}x{} {} for {generations} generations ({:?} dispatch)",
        config.width, config.height, config.rule, config.dispatch.schedule
    );

    let initial = grid.stats();
    emit(&initial)?;

    let interval = (generations / samples.max(1)).max(1);
    let start = Instant::now();
    let mut done = 0;
    while done < generations {
        let chunk = interval.min(generations - done);
        grid.run(chunk);
        done += chunk;
        emit(&grid.stats())?;
    }
    let elapsed = start.elapsed().as_secs_f64().max(f64::EPSILON);

    emit(&RunReport {
        width: config.width,
        height: config.height,
        rule: config.rule,
        generations,
        initial,
        final_stats: grid.stats(),
        elapsed_secs: elapsed,
        generations_per_sec: generations as f64 / elapsed,
        mcells_per_sec: generations as f64 * config.grid_size() as f64 / elapsed / 1e6,
    })
}

fn pretty<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn example() -> Result<(), String> {
    println!("# config.json");
    println!("{}", pretty(&SimulationConfig::default())?);
    println!("# config.seed.json");
    println!("{}", pretty(&Seed::default())?);
    Ok(())
}

//! Command-line interface for Lanecast
//!
//! Runs one headless scenario and prints the outcome.

use clap::Parser;
use std::path::PathBuf;

/// Lane combat ability engine: headless scenario runner
#[derive(Parser, Debug)]
#[command(name = "lanecast")]
#[command(about = "Run a headless lane combat scenario")]
#[command(version)]
pub struct Args {
    /// Scenario JSON file
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Ability catalog (overrides the scenario and the default)
    #[arg(long, value_name = "PATH")]
    pub abilities: Option<PathBuf>,

    /// Upgrade catalog (overrides the scenario and the default)
    #[arg(long, value_name = "PATH")]
    pub upgrades: Option<PathBuf>,

    /// Output path for the JSON report
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum session duration in seconds
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Print engine diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "lanecast",
            "scenario.json",
            "--seed",
            "7",
            "--max-duration",
            "60",
            "--output",
            "out.json",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.scenario, PathBuf::from("scenario.json"));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.max_duration, Some(60.0));
        assert!(args.verbose);
        assert!(args.abilities.is_none());
    }

    #[test]
    fn test_scenario_is_required() {
        assert!(Args::try_parse_from(["lanecast"]).is_err());
    }
}

//! Lanecast - headless lane combat scenario runner

use bevy::log::LogPlugin;
use bevy::prelude::*;

use lanecast::cli;
use lanecast::headless::{run_headless_scenario, HeadlessScenarioConfig};

fn main() {
    let args = cli::parse_args();

    if args.verbose {
        // Building the plugin installs the global log subscriber
        App::new().add_plugins(LogPlugin::default());
    }

    let mut config = match HeadlessScenarioConfig::load_from_file(&args.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            std::process::exit(1);
        }
    };

    // Command-line flags override the scenario file
    if args.abilities.is_some() {
        config.abilities_path = args.abilities;
    }
    if args.upgrades.is_some() {
        config.upgrades_path = args.upgrades;
    }
    if args.output.is_some() {
        config.output_path = args.output;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }

    if let Err(e) = run_headless_scenario(config) {
        eprintln!("Scenario failed: {}", e);
        std::process::exit(1);
    }
}

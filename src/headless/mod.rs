//! Headless mode for automated testing
//!
//! Runs lane scenarios without any graphical output, suitable for automated
//! testing and balance checks.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless scenario
//! cargo run --release -- assets/scenarios/lane_skirmish.json --seed 7
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "name": "Knight vs Minions",
//!   "actors": [
//!     { "faction": "Player", "actor_type": "Knight", "position": [0.0, -6.0], "abilities": ["cleave"] },
//!     { "faction": "Enemy", "actor_type": "Minion", "position": [0.0, 6.0], "abilities": ["minion_strike"] }
//!   ],
//!   "upgrades": [ { "at_secs": 5.0, "faction": "Player", "upgrade": "knight_vigor" } ],
//!   "max_duration_secs": 120
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{HeadlessScenarioConfig, ScenarioActor, TimedUpgrade};
pub use runner::{run_headless_scenario, run_scenario, ActorResult, EndReason, FactionResult, ScenarioResult};

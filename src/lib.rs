//! Lanecast - Lane Combat Ability Engine
//!
//! Data-driven ability execution and upgrade-modifier composition for a
//! real-time lane combat simulation. Actors cast abilities whose damage, healing,
//! stun duration and cooldown are composed from a base definition and the
//! faction-scoped upgrade modifiers accumulated over a session.
//!
//! This library exposes the engine for embedding (via [`plugin::LanecastPlugin`]),
//! headless runs and testing.

pub mod abilities;
pub mod actors;
pub mod cli;
pub mod combat;
pub mod constants;
pub mod economy;
pub mod error;
pub mod headless;
pub mod modifiers;
pub mod plugin;
pub mod presentation;
pub mod rng;
pub mod session;
pub mod timers;
pub mod upgrades;
pub mod utils;

// Re-export commonly used types
pub use abilities::{AbilityCatalog, AbilityDefinition, AbilityId, CastRejection};
pub use actors::{ActorId, ActorType, Faction};
pub use combat::log::{CombatLog, CombatLogEventType};
pub use error::ConfigError;
pub use headless::HeadlessScenarioConfig;
pub use modifiers::{FactionModifierRegistry, Modifier};
pub use plugin::LanecastPlugin;
pub use session::Session;
pub use upgrades::{UpgradeCatalog, UpgradeEffect, UpgradeId};

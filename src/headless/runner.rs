//! Headless scenario execution
//!
//! Runs lane scenarios without any graphical output, suitable for automated
//! testing. The app is stepped manually with a fixed timestep so a seeded run is
//! reproducible frame for frame.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::Serialize;

use crate::abilities::{AbilityCatalog, AbilityDefinition, BehaviorKind, EffectKind, SpawnOffset};
use crate::actors::{ActorId, ActorType, Combatant, Faction};
use crate::combat::log::{CombatLogEntry, CombatLogEventType};
use crate::constants::HEADLESS_TIMESTEP;
use crate::economy::EconomySink;
use crate::error::ConfigError;
use crate::modifiers::FactionModifierRegistry;
use crate::plugin::{LanecastPlugin, SessionPhase};
use crate::session::Session;
use crate::upgrades::{UpgradeCatalog, UpgradeEffect};

use super::config::HeadlessScenarioConfig;

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    CastleDestroyed,
    FactionEliminated,
    Timeout,
}

/// Statistics for a single actor after the scenario
#[derive(Debug, Clone, Serialize)]
pub struct ActorResult {
    pub id: ActorId,
    pub faction: Faction,
    pub actor_type: ActorType,
    pub max_health: f32,
    /// Health remaining at scenario end (0 if dead)
    pub final_health: f32,
    pub survived: bool,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
}

impl ActorResult {
    fn from_combatant(actor: &Combatant) -> Self {
        Self {
            id: actor.id,
            faction: actor.faction,
            actor_type: actor.actor_type,
            max_health: actor.max_health(),
            final_health: actor.current_health,
            survived: !actor.is_dead(),
            damage_dealt: actor.damage_dealt,
            damage_taken: actor.damage_taken,
            healing_done: actor.healing_done,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FactionResult {
    pub faction: Faction,
    pub gold: u32,
    pub applied_upgrades: Vec<String>,
}

/// Result of a completed headless scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    /// The winning faction, or None for a draw
    pub winner: Option<Faction>,
    pub end_reason: EndReason,
    /// Session time at the end, in seconds
    pub match_time: f32,
    pub random_seed: Option<u64>,
    pub actors: Vec<ActorResult>,
    pub factions: Vec<FactionResult>,
    pub log: Vec<CombatLogEntry>,
}

impl ScenarioResult {
    pub fn survivors(&self, faction: Faction) -> usize {
        self.actors
            .iter()
            .filter(|actor| actor.faction == faction && actor.survived)
            .count()
    }

    pub fn count_of(&self, event_type: CombatLogEventType) -> usize {
        self.log.iter().filter(|entry| entry.event_type == event_type).count()
    }

    /// Write the result as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::parse("report", e))?;
        std::fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }
}

// ============================================================================
// Scenario state
// ============================================================================

/// Resource to track headless scenario state
#[derive(Resource)]
struct ScenarioState {
    /// Upgrades not yet applied, sorted by time
    pending_upgrades: Vec<(f32, Faction, UpgradeEffect)>,
    max_duration: f32,
    outcome: Option<(Option<Faction>, EndReason)>,
}

/// Apply timed upgrades whose time has come.
fn apply_scheduled_upgrades(mut state: ResMut<ScenarioState>, mut session: ResMut<Session>) {
    let now = session.clock();
    while state
        .pending_upgrades
        .first()
        .is_some_and(|(at, _, _)| *at <= now)
    {
        let (_, faction, upgrade) = state.pending_upgrades.remove(0);
        session.apply_upgrade(faction, &upgrade);
    }
}

/// Minimal lane controller: cast whatever is ready and in reach, otherwise
/// walk toward the nearest detected enemy or down the lane.
fn drive_actors(time: Res<Time>, mut session: ResMut<Session>) {
    if session.is_paused() {
        return;
    }
    let dt = time.delta_secs();
    for id in session.roster().ids() {
        let Some(actor) = session.actor(id) else {
            continue;
        };
        if actor.is_dead() || actor.is_stunned() {
            continue;
        }
        let registry = session.registry(actor.faction);

        // Pick the first ready slot with something to hit
        let mut cast = None;
        for (slot, definition) in actor.caster.slots().iter().enumerate() {
            if !actor.caster.is_ready(slot) || actor.caster.is_locked() {
                continue;
            }
            let reach = ability_reach(definition, registry);
            let target = match definition.effect {
                EffectKind::Heal => wounded_ally(&session, actor, reach),
                EffectKind::Damage | EffectKind::Stun => session.roster().nearest_enemy(id, reach),
            };
            if let Some(target) = target {
                cast = Some((slot, target));
                break;
            }
        }

        let enemy = session.roster().nearest_enemy(id, actor.stats.detection_range);
        let lane_direction = match actor.faction {
            Faction::Player => Vec3::Z,
            Faction::Enemy => Vec3::NEG_Z,
        };
        let move_speed = actor.stats.move_speed;
        let locked = actor.caster.is_locked();
        let enemy_position = enemy.and_then(|enemy| session.actor(enemy)).map(|enemy| enemy.position);
        let cast_target_position = cast.and_then(|(_, target)| session.actor(target)).map(|target| target.position);

        if let Some((slot, _)) = cast {
            if let Some(actor) = session.roster_mut().get_mut(id) {
                if let Some(position) = cast_target_position {
                    actor.face_towards(position);
                }
            }
            // A rejected cast is logged by the session; the actor walks instead
            if session.invoke(id, slot).is_ok() {
                continue;
            }
        }
        if locked || move_speed <= 0.0 {
            continue;
        }
        if let Some(actor) = session.roster_mut().get_mut(id) {
            match enemy_position {
                Some(position) => {
                    actor.face_towards(position);
                    let facing = actor.facing;
                    actor.position += facing * move_speed * dt;
                }
                None => {
                    actor.facing = lane_direction;
                    actor.position += lane_direction * move_speed * dt;
                }
            }
        }
    }
}

/// Distance at which an ability can reach a target from its caster.
fn ability_reach(definition: &AbilityDefinition, registry: Option<&FactionModifierRegistry>) -> f32 {
    let area = definition.final_area(registry);
    let offset = match definition.spawn_offset {
        SpawnOffset::Forward { distance } => distance,
        SpawnOffset::None | SpawnOffset::Custom { .. } => 0.0,
    };
    match definition.behavior {
        BehaviorKind::Projectile | BehaviorKind::Arrow | BehaviorKind::Charge => {
            definition.final_range(registry)
        }
        BehaviorKind::AreaEffect
        | BehaviorKind::Follow
        | BehaviorKind::DelayedDamageArea
        | BehaviorKind::DebuffArea => offset + area.radius.max(area.length * 0.5),
    }
}

fn wounded_ally(session: &Session, actor: &Combatant, reach: f32) -> Option<ActorId> {
    session
        .roster()
        .iter()
        .filter(|ally| ally.is_ally_of(actor) && !ally.is_dead())
        .filter(|ally| ally.current_health < ally.max_health())
        .find(|ally| actor.planar_position().distance(ally.planar_position()) - ally.radius <= reach)
        .map(|ally| ally.id)
}

/// Check if the scenario has ended (castle destroyed, faction wiped, or timeout)
fn check_scenario_end(mut state: ResMut<ScenarioState>, session: Res<Session>) {
    if state.outcome.is_some() {
        return;
    }
    if let Some(castle) = session
        .fallen()
        .iter()
        .find(|actor| actor.actor_type == ActorType::Castle)
    {
        info!("{} destroyed at {:.1}s", castle.label(), session.clock());
        state.outcome = Some((Some(castle.faction.opponent()), EndReason::CastleDestroyed));
        return;
    }

    let player_alive = session.roster().has_living(Faction::Player);
    let enemy_alive = session.roster().has_living(Faction::Enemy);
    if !player_alive || !enemy_alive {
        let winner = match (player_alive, enemy_alive) {
            (true, false) => Some(Faction::Player),
            (false, true) => Some(Faction::Enemy),
            _ => None,
        };
        state.outcome = Some((winner, EndReason::FactionEliminated));
        return;
    }

    if session.clock() >= state.max_duration {
        info!("Scenario timed out after {:.1}s - declaring DRAW", session.clock());
        state.outcome = Some((None, EndReason::Timeout));
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Run a scenario with already-loaded catalogs.
pub fn run_scenario(
    config: &HeadlessScenarioConfig,
    abilities: &AbilityCatalog,
    upgrades: &UpgradeCatalog,
) -> Result<ScenarioResult, ConfigError> {
    config.validate()?;
    config.validate_against(abilities, upgrades)?;

    let mut pending_upgrades = Vec::new();
    for timed in &config.upgrades {
        let upgrade = upgrades
            .get(&timed.upgrade)
            .ok_or_else(|| ConfigError::UnknownUpgrade(timed.upgrade.0.clone()))?;
        pending_upgrades.push((timed.at_secs, timed.faction, upgrade.clone()));
    }
    pending_upgrades.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            HEADLESS_TIMESTEP,
        )))
        .add_plugins(LanecastPlugin {
            seed: config.random_seed,
        })
        .insert_resource(ScenarioState {
            pending_upgrades,
            max_duration: config.max_duration_secs,
            outcome: None,
        })
        .add_systems(
            Update,
            (apply_scheduled_upgrades, drive_actors)
                .chain()
                .in_set(SessionPhase::Control),
        )
        .add_systems(Update, check_scenario_end.after(SessionPhase::Simulate));

    {
        let mut session = app.world_mut().resource_mut::<Session>();
        for faction in Faction::all() {
            session.economy_mut().add_gold(*faction, config.starting_gold);
        }
        for actor in &config.actors {
            let slots = abilities.resolve_slots(&actor.abilities)?;
            let position = Vec3::new(actor.position[0], 0.0, actor.position[1]);
            session.spawn_actor(actor.faction, actor.actor_type, position, slots);
        }
    }

    info!(
        "Headless scenario '{}' setup complete: {} actors, {} timed upgrades",
        config.name,
        config.actors.len(),
        config.upgrades.len()
    );

    // One spare frame: the first update has a zero delta
    let max_frames = (config.max_duration_secs / HEADLESS_TIMESTEP).ceil() as u64 + 2;
    let mut frames = 0;
    while app.world().resource::<ScenarioState>().outcome.is_none() && frames < max_frames {
        app.update();
        frames += 1;
    }

    let (winner, end_reason) = app
        .world()
        .resource::<ScenarioState>()
        .outcome
        .unwrap_or((None, EndReason::Timeout));
    let session = app.world().resource::<Session>();
    Ok(build_result(config, session, winner, end_reason))
}

fn build_result(
    config: &HeadlessScenarioConfig,
    session: &Session,
    winner: Option<Faction>,
    end_reason: EndReason,
) -> ScenarioResult {
    let mut actors: Vec<ActorResult> = session
        .roster()
        .iter()
        .chain(session.fallen())
        .map(ActorResult::from_combatant)
        .collect();
    actors.sort_by_key(|actor| actor.id);

    let factions = Faction::all()
        .iter()
        .map(|faction| FactionResult {
            faction: *faction,
            gold: session.economy().current_gold(*faction),
            applied_upgrades: session
                .registry(*faction)
                .map(|registry| registry.applied_upgrades().map(|id| id.0.clone()).collect())
                .unwrap_or_default(),
        })
        .collect();

    ScenarioResult {
        name: config.name.clone(),
        winner,
        end_reason,
        match_time: session.clock(),
        random_seed: config.random_seed,
        actors,
        factions,
        log: session.log().entries.clone(),
    }
}

/// Load catalogs, run the scenario and write the report if an output path is set.
pub fn run_headless_scenario(config: HeadlessScenarioConfig) -> Result<ScenarioResult, ConfigError> {
    let abilities = match &config.abilities_path {
        Some(path) => AbilityCatalog::load_from_file(path)?,
        None => AbilityCatalog::load_default()?,
    };
    let upgrades = match &config.upgrades_path {
        Some(path) => UpgradeCatalog::load_from_file(path)?,
        None => UpgradeCatalog::load_default()?,
    };
    for issue in upgrades.validate(Some(&abilities)) {
        warn!("Upgrade `{}`: {}", issue.upgrade, issue.problem);
    }

    println!("Starting headless scenario '{}'...", config.name);
    println!("  Actors: {}", config.actors.len());
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let result = run_scenario(&config, &abilities, &upgrades)?;

    match result.winner {
        Some(faction) => println!("Scenario complete: {} wins ({:?})", faction.name(), result.end_reason),
        None => println!("Scenario complete: draw ({:?})", result.end_reason),
    }
    if let Some(path) = &config.output_path {
        result.write_json(path)?;
        println!("Report saved to: {}", path.display());
    }
    Ok(result)
}

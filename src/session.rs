//! Session
//!
//! The composition root of a running simulation. A session owns the faction
//! registries, the roster, the economy, live ability instances and the deferred
//! continuation scheduler, and advances all of them from a single `tick`.
//!
//! ## Tick order
//! 1. Continuations (cast lock releases)
//! 2. Actor timers (cooldowns, stuns)
//! 3. Economy income
//! 4. Ability instances
//! 5. Death sweep
//! 6. Feature-change flush
//!
//! A paused session (speed 0) runs only step 6.

use std::sync::Arc;

use bevy::prelude::*;

use crate::abilities::{
    build_instance, AbilityDefinition, AbilityId, AbilityInstance, BehaviorStatus, CastRejection,
    ImpactContext, InstanceId, Placement,
};
use crate::actors::{ActorId, ActorType, Combatant, Faction, Roster};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::SimulationSpeed;
use crate::constants::CAST_VISUAL_SECS;
use crate::economy::Economy;
use crate::modifiers::{FactionModifierRegistry, FactionRegistries, FeatureChange};
use crate::presentation::{PresentationQueue, VisualKind, VisualRequest};
use crate::rng::GameRng;
use crate::timers::{Continuation, Scheduler};
use crate::upgrades::{UpgradeContext, UpgradeEffect, UpgradeOutcome};

/// A feature flag flip in one faction, for presentation resync.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureChangedEvent {
    pub faction: Faction,
    pub change: FeatureChange,
}

/// What a successful cast produced.
#[derive(Clone, Debug, PartialEq)]
pub struct CastReport {
    pub instance: InstanceId,
    pub ability: AbilityId,
    pub placement: Placement,
    /// Cooldown the slot started with, after modifiers
    pub cooldown: f32,
}

#[derive(Resource, Debug)]
pub struct Session {
    speed: SimulationSpeed,
    /// Accumulated in f64 so long sessions keep tick-boundary precision
    clock: f64,
    registries: FactionRegistries,
    roster: Roster,
    economy: Economy,
    scheduler: Scheduler,
    instances: Vec<AbilityInstance>,
    next_instance_id: u64,
    presentation: PresentationQueue,
    log: CombatLog,
    rng: GameRng,
    fallen: Vec<Combatant>,
    feature_changes: Vec<FeatureChangedEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameRng::from_entropy())
    }
}

impl Session {
    pub fn new(rng: GameRng) -> Self {
        let mut log = CombatLog::default();
        log.log(CombatLogEventType::MatchEvent, "Session started".to_string());
        Self {
            speed: SimulationSpeed::default(),
            clock: 0.0,
            registries: FactionRegistries::with_factions(Faction::all()),
            roster: Roster::new(),
            economy: Economy::new(),
            scheduler: Scheduler::new(),
            instances: Vec::new(),
            next_instance_id: 0,
            presentation: PresentationQueue::default(),
            log,
            rng,
            fallen: Vec::new(),
            feature_changes: Vec::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(GameRng::from_seed(seed))
    }

    // ========================================================================
    // Actors
    // ========================================================================

    /// Spawn an actor with its faction's current actor-type modifiers already applied.
    pub fn spawn_actor(
        &mut self,
        faction: Faction,
        actor_type: ActorType,
        position: Vec3,
        abilities: Vec<Arc<AbilityDefinition>>,
    ) -> ActorId {
        let id = self.roster.spawn(faction, actor_type, position, abilities);
        let modifiers = self.registries.ensure(faction).actor_type_modifiers(actor_type);
        if let Some(actor) = self.roster.get_mut(id) {
            actor.recalculate_stats(&modifiers);
            debug!("Spawned {}", actor.label());
        }
        id
    }

    /// Remove an actor, cancelling its continuations and dropping the instances it owns.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Combatant> {
        let cancelled = self.scheduler.cancel_owner(id);
        let before = self.instances.len();
        self.instances.retain(|instance| instance.caster.id != id);
        let removed = self.roster.remove(id);
        if let Some(actor) = &removed {
            debug!(
                "Removed {} ({} continuations, {} instances dropped)",
                actor.label(),
                cancelled,
                before - self.instances.len()
            );
        }
        removed
    }

    // ========================================================================
    // Casting
    // ========================================================================

    /// Cast the ability in `slot`. Rejections leave every piece of state untouched.
    pub fn invoke(&mut self, actor: ActorId, slot: usize) -> Result<CastReport, CastRejection> {
        self.try_invoke(actor, slot).inspect_err(|rejection| {
            debug!("Cast of slot {} by {} rejected: {}", slot, actor, rejection);
        })
    }

    fn try_invoke(&mut self, actor: ActorId, slot: usize) -> Result<CastReport, CastRejection> {
        if self.speed.is_paused() {
            return Err(CastRejection::Paused);
        }
        let caster = self.roster.get(actor).ok_or(CastRejection::UnknownActor)?;
        if caster.is_dead() {
            return Err(CastRejection::Dead);
        }
        let definition = Arc::clone(caster.caster.check_ready(slot, caster.is_stunned())?);

        let snapshot = caster.snapshot();
        let origin = caster.position;
        let registry = self.registries.get(snapshot.faction);
        let placement = definition.spawn_placement(caster.position, caster.facing);
        let cooldown = definition.final_cooldown(registry, caster.caster.global_cooldown_multiplier);

        self.next_instance_id += 1;
        let id = InstanceId(self.next_instance_id);
        let mut instance = build_instance(
            id,
            Arc::clone(&definition),
            snapshot,
            placement,
            origin,
            registry,
        );

        if let Some(caster) = self.roster.get_mut(actor) {
            caster.caster.begin_cast(slot, cooldown);
            if definition.casting_time <= 0.0 {
                caster.caster.release_lock();
            }
        }
        if definition.casting_time > 0.0 {
            self.scheduler.schedule(
                actor,
                definition.casting_time,
                Continuation::ReleaseCastLock { slot },
            );
        }

        self.log.log_amount(
            CombatLogEventType::AbilityUsed,
            actor,
            cooldown,
            format!("{} casts {}", snapshot.label(), definition.name),
        );
        self.presentation
            .spawn_transient(VisualKind::Cast, placement.position, None, CAST_VISUAL_SECS);

        let mut impact = ImpactContext {
            now: self.clock(),
            caster: snapshot,
            registry: self.registries.get(snapshot.faction),
            roster: &mut self.roster,
            presentation: &mut self.presentation,
            log: &mut self.log,
        };
        instance.on_spawn(&mut impact);
        self.instances.push(instance);

        Ok(CastReport {
            instance: id,
            ability: definition.id.clone(),
            placement,
            cooldown,
        })
    }

    // ========================================================================
    // Upgrades
    // ========================================================================

    pub fn apply_upgrade(&mut self, faction: Faction, upgrade: &UpgradeEffect) -> UpgradeOutcome {
        let Self {
            registries,
            roster,
            economy,
            rng,
            log,
            ..
        } = self;
        let mut ctx = UpgradeContext {
            faction,
            registry: registries.ensure(faction),
            roster,
            economy,
            rng,
        };
        let outcome = upgrade.apply(&mut ctx);

        match &outcome {
            UpgradeOutcome::Skipped => {}
            UpgradeOutcome::Inert => {
                warn!("{} upgrade `{}` had no effect", faction.name(), upgrade.id);
                log.log(
                    CombatLogEventType::Upgrade,
                    format!("{} applied {} (no effect)", faction.name(), upgrade.name),
                );
            }
            UpgradeOutcome::GoldGranted { amount } => {
                log.log(
                    CombatLogEventType::Economy,
                    format!("{} gained {} gold from {}", faction.name(), amount, upgrade.name),
                );
            }
            UpgradeOutcome::Sacrificed {
                structure,
                health_lost,
                gold,
            } => {
                log.log(
                    CombatLogEventType::Economy,
                    format!(
                        "{} sacrificed {:.0} health of structure {} for {} gold",
                        faction.name(),
                        health_lost,
                        structure,
                        gold
                    ),
                );
            }
            _ => {
                log.log(
                    CombatLogEventType::Upgrade,
                    format!("{} applied {}", faction.name(), upgrade.name),
                );
            }
        }
        if outcome.was_recorded() {
            info!("{} applied upgrade `{}`", faction.name(), upgrade.id);
        }
        outcome
    }

    /// Clear both factions' registries and push identity stats to every actor.
    pub fn reset_modifiers(&mut self) {
        self.registries.reset_all();
        for actor in self.roster.iter_mut() {
            let modifiers = self
                .registries
                .get(actor.faction)
                .map(|registry| registry.actor_type_modifiers(actor.actor_type))
                .unwrap_or_default();
            actor.recalculate_stats(&modifiers);
        }
        self.log
            .log(CombatLogEventType::MatchEvent, "Modifiers reset".to_string());
        self.flush_feature_changes();
    }

    // ========================================================================
    // Tick
    // ========================================================================

    pub fn tick(&mut self, real_dt: f32) {
        let dt = self.speed.scale(real_dt);
        if dt > 0.0 {
            // Actors killed between ticks lose their pending work before anything runs
            self.sweep_dead();
            self.clock += f64::from(dt);
            self.log.match_time = self.clock();

            self.run_continuations(dt);
            for actor in self.roster.iter_mut() {
                actor.caster.tick(dt);
                actor.tick_status(dt);
            }
            self.economy.tick(dt);
            self.update_instances(dt);
            self.sweep_dead();
        }
        self.flush_feature_changes();
    }

    fn run_continuations(&mut self, dt: f32) {
        for fired in self.scheduler.advance(dt) {
            match fired.continuation {
                Continuation::ReleaseCastLock { .. } => {
                    if let Some(actor) = self.roster.get_mut(fired.owner) {
                        actor.caster.release_lock();
                    }
                }
            }
        }
    }

    fn update_instances(&mut self, dt: f32) {
        let Self {
            instances,
            roster,
            registries,
            presentation,
            log,
            clock,
            ..
        } = self;
        let now = *clock as f32;
        instances.retain_mut(|instance| {
            // Instances of casters killed earlier this tick never strike again
            let caster_alive = roster
                .get(instance.caster.id)
                .is_some_and(|caster| !caster.is_dead());
            if !caster_alive {
                return false;
            }
            let mut impact = ImpactContext {
                now,
                caster: instance.caster,
                registry: registries.get(instance.caster.faction),
                roster: &mut *roster,
                presentation: &mut *presentation,
                log: &mut *log,
            };
            instance.update(dt, &mut impact) == BehaviorStatus::Running
        });
    }

    fn sweep_dead(&mut self) {
        for id in self.roster.dead_ids() {
            if let Some(actor) = self.remove_actor(id) {
                self.log.log(
                    CombatLogEventType::Death,
                    format!("{} has died", actor.label()),
                );
                info!("{} died at {:.1}s", actor.label(), self.clock());
                self.fallen.push(actor);
            }
        }
    }

    fn flush_feature_changes(&mut self) {
        for (faction, registry) in self.registries.iter_mut() {
            for change in registry.drain_feature_changes() {
                self.log.log(
                    CombatLogEventType::FeatureChanged,
                    format!(
                        "{} {} {} {}",
                        faction.name(),
                        change.actor_type.name(),
                        change.feature.name(),
                        if change.enabled { "enabled" } else { "disabled" }
                    ),
                );
                self.feature_changes.push(FeatureChangedEvent { faction, change });
            }
        }
    }

    // ========================================================================
    // Speed
    // ========================================================================

    pub fn pause(&mut self) {
        self.speed.pause();
    }

    pub fn resume(&mut self) {
        self.speed.normal_speed();
    }

    pub fn set_speed(&mut self, multiplier: f32) {
        self.speed.set(multiplier);
    }

    pub fn is_paused(&self) -> bool {
        self.speed.is_paused()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn clock(&self) -> f32 {
        self.clock as f32
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn actor(&self, id: ActorId) -> Option<&Combatant> {
        self.roster.get(id)
    }

    pub fn registry(&self, faction: Faction) -> Option<&FactionModifierRegistry> {
        self.registries.get(faction)
    }

    pub fn registry_mut(&mut self, faction: Faction) -> &mut FactionModifierRegistry {
        self.registries.ensure(faction)
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn economy_mut(&mut self) -> &mut Economy {
        &mut self.economy
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn instances(&self) -> &[AbilityInstance] {
        &self.instances
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Actors removed by the death sweep, in death order.
    pub fn fallen(&self) -> &[Combatant] {
        &self.fallen
    }

    pub fn drain_visuals(&mut self) -> Vec<VisualRequest> {
        self.presentation.drain()
    }

    pub fn drain_feature_changes(&mut self) -> Vec<FeatureChangedEvent> {
        self.flush_feature_changes();
        std::mem::take(&mut self.feature_changes)
    }
}

//! Effect Variants
//!
//! Numeric outcome appliers. An effect decides whether a target qualifies
//! (`can_apply`) and then mutates it (`apply`), reading final magnitudes from the
//! caster faction's modifier registry on every application so upgrades bought
//! mid-flight take effect immediately.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;

use super::definition::{AbilityDefinition, EffectKind};
use crate::actors::{ActorId, ActorType, Faction, Roster};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::constants::TRANSIENT_VISUAL_SECS;
use crate::modifiers::FactionModifierRegistry;
use crate::presentation::{PresentationQueue, VisualKind};
use crate::utils::{actor_label, interval_elapsed};

/// Identity of the actor that cast an ability, captured at cast time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CasterSnapshot {
    pub id: ActorId,
    pub faction: Faction,
    pub actor_type: ActorType,
}

impl CasterSnapshot {
    pub fn label(&self) -> String {
        actor_label(self.faction, self.actor_type, self.id.0)
    }
}

/// Everything an effect may read or mutate while an instance strikes.
pub struct ImpactContext<'a> {
    /// Session clock in seconds
    pub now: f32,
    pub caster: CasterSnapshot,
    /// The caster faction's registry; `None` reads as identity modifiers
    pub registry: Option<&'a FactionModifierRegistry>,
    pub roster: &'a mut Roster,
    pub presentation: &'a mut PresentationQueue,
    pub log: &'a mut CombatLog,
}

#[derive(Clone, Debug)]
pub struct DamageEffect {
    definition: Arc<AbilityDefinition>,
}

#[derive(Clone, Debug)]
pub struct HealEffect {
    definition: Arc<AbilityDefinition>,
}

#[derive(Clone, Debug)]
pub struct StunEffect {
    definition: Arc<AbilityDefinition>,
    last_damage_at: BTreeMap<ActorId, f32>,
}

#[derive(Clone, Debug)]
pub enum Effect {
    Damage(DamageEffect),
    Heal(HealEffect),
    Stun(StunEffect),
}

impl Effect {
    pub fn new(definition: Arc<AbilityDefinition>) -> Self {
        match definition.effect {
            EffectKind::Damage => Effect::Damage(DamageEffect { definition }),
            EffectKind::Heal => Effect::Heal(HealEffect { definition }),
            EffectKind::Stun => Effect::Stun(StunEffect {
                definition,
                last_damage_at: BTreeMap::new(),
            }),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Damage(_) => EffectKind::Damage,
            Effect::Heal(_) => EffectKind::Heal,
            Effect::Stun(_) => EffectKind::Stun,
        }
    }

    pub fn definition(&self) -> &Arc<AbilityDefinition> {
        match self {
            Effect::Damage(effect) => &effect.definition,
            Effect::Heal(effect) => &effect.definition,
            Effect::Stun(effect) => &effect.definition,
        }
    }

    /// Damage and stun need a living enemy, heal a living ally. Nothing qualifies
    /// once the caster has left the roster.
    pub fn can_apply(&self, target: ActorId, ctx: &ImpactContext) -> bool {
        if !ctx.roster.contains(ctx.caster.id) {
            return false;
        }
        let Some(target) = ctx.roster.get(target) else {
            return false;
        };
        if target.is_dead() {
            return false;
        }
        if self.kind().is_harmful() {
            target.faction != ctx.caster.faction
        } else {
            target.faction == ctx.caster.faction
        }
    }

    /// Apply to one target. Returns false when the target vanished.
    pub fn apply(&mut self, target: ActorId, ctx: &mut ImpactContext) -> bool {
        match self {
            Effect::Damage(effect) => {
                let amount = effect
                    .definition
                    .final_damage(ctx.caster.actor_type, ctx.registry);
                deal_damage(&effect.definition, target, amount, ctx).is_some()
            }
            Effect::Heal(effect) => heal(&effect.definition, target, ctx),
            Effect::Stun(effect) => effect.apply(target, ctx),
        }
    }
}

impl StunEffect {
    fn apply(&mut self, target: ActorId, ctx: &mut ImpactContext) -> bool {
        let duration = self.definition.final_stun_duration(ctx.registry);
        let Some(actor) = ctx.roster.get_mut(target) else {
            return false;
        };
        actor.apply_stun(duration);
        let position = actor.position;
        let feedback = actor.shows_damage_feedback();
        let target_label = actor.label();

        ctx.log.log_amount(
            CombatLogEventType::CrowdControl,
            ctx.caster.id,
            duration,
            format!(
                "{}'s {} stuns {} for {:.1}s",
                ctx.caster.label(),
                self.definition.name,
                target_label,
                duration
            ),
        );
        if feedback {
            ctx.presentation
                .spawn_transient(VisualKind::Stun, position, Some(target), duration);
        }

        // Stun damage runs on its own clock, independent of the gate interval
        let last = self
            .last_damage_at
            .get(&target)
            .copied()
            .unwrap_or(f32::NEG_INFINITY);
        if interval_elapsed(ctx.now, last, self.definition.damage_interval) {
            let amount = self
                .definition
                .final_damage(ctx.caster.actor_type, ctx.registry);
            if amount > 0.0 {
                deal_damage(&self.definition, target, amount, ctx);
            }
            self.last_damage_at.insert(target, ctx.now);
        }
        true
    }
}

/// Remove health from a target and credit the caster. Returns the health removed.
fn deal_damage(
    definition: &AbilityDefinition,
    target: ActorId,
    amount: f32,
    ctx: &mut ImpactContext,
) -> Option<f32> {
    let actor = ctx.roster.get_mut(target)?;
    let dealt = actor.apply_damage(amount);
    let position = actor.position;
    let feedback = actor.shows_damage_feedback();
    let target_label = actor.label();
    let killed = actor.is_dead();

    if let Some(caster) = ctx.roster.get_mut(ctx.caster.id) {
        caster.damage_dealt += dealt;
    }
    ctx.log.log_amount(
        CombatLogEventType::Damage,
        ctx.caster.id,
        dealt,
        format!(
            "{}'s {} hits {} for {:.0} damage",
            ctx.caster.label(),
            definition.name,
            target_label,
            dealt
        ),
    );
    if feedback {
        ctx.presentation
            .spawn_transient(VisualKind::Hit, position, Some(target), TRANSIENT_VISUAL_SECS);
    }
    if killed {
        debug!("{} killed by {}", target_label, ctx.caster.label());
    }
    Some(dealt)
}

fn heal(definition: &AbilityDefinition, target: ActorId, ctx: &mut ImpactContext) -> bool {
    let amount = definition.final_heal(ctx.caster.actor_type, ctx.registry);
    let Some(actor) = ctx.roster.get_mut(target) else {
        return false;
    };
    let healed = actor.apply_heal(amount);
    let position = actor.position;
    let feedback = actor.shows_damage_feedback();
    let target_label = actor.label();

    if let Some(caster) = ctx.roster.get_mut(ctx.caster.id) {
        caster.healing_done += healed;
    }
    ctx.log.log_amount(
        CombatLogEventType::Healing,
        ctx.caster.id,
        healed,
        format!(
            "{}'s {} heals {} for {:.0}",
            ctx.caster.label(),
            definition.name,
            target_label,
            healed
        ),
    );
    if feedback {
        ctx.presentation
            .spawn_transient(VisualKind::Heal, position, Some(target), TRANSIENT_VISUAL_SECS);
    }
    true
}

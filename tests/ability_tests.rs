//! Integration tests for the shipped ability catalog and ability behaviors
//!
//! These tests verify that:
//! - The shipped catalog loads and every definition is sane
//! - The factory builds the behavior and effect each definition names
//! - Projectiles, arrows, areas, delayed areas, follow areas, debuff areas and
//!   charges behave as configured when cast through a session

use std::sync::Arc;

use bevy::math::Vec3;
use lanecast::abilities::{
    build_instance, AbilityCatalog, AbilityDefinition, AbilityId, BehaviorKind, CasterSnapshot,
    EffectKind, InstanceId,
};
use lanecast::actors::{ActorId, ActorType, Faction};
use lanecast::error::ConfigError;
use lanecast::modifiers::FeatureId;
use lanecast::session::Session;

const DT: f32 = 1.0 / 60.0;

fn catalog() -> AbilityCatalog {
    AbilityCatalog::load_default().expect("shipped abilities should load")
}

fn ability(catalog: &AbilityCatalog, id: &str) -> Arc<AbilityDefinition> {
    Arc::clone(
        catalog
            .get(&AbilityId::new(id))
            .unwrap_or_else(|| panic!("missing ability {}", id)),
    )
}

fn run_for(session: &mut Session, secs: f32) {
    let steps = (secs / DT).round() as usize;
    for _ in 0..steps {
        session.tick(DT);
    }
}

fn health(session: &Session, id: ActorId) -> f32 {
    session.actor(id).unwrap().current_health
}

fn minion_at(session: &mut Session, z: f32) -> ActorId {
    session.spawn_actor(Faction::Enemy, ActorType::Minion, Vec3::new(0.0, 0.0, z), Vec::new())
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_shipped_catalog_loads() {
    let catalog = catalog();
    for id in [
        "cleave",
        "shield_bash",
        "charge",
        "holy_aura",
        "arrow_shot",
        "volley",
        "fireball",
        "frost_nova",
        "mend",
        "minion_strike",
        "tower_bolt",
    ] {
        assert!(catalog.contains(&AbilityId::new(id)), "{} should be defined", id);
    }
}

#[test]
fn test_all_abilities_have_sane_values() {
    for definition in catalog().iter() {
        assert!(!definition.name.is_empty(), "{} should have a name", definition.id);
        assert!(definition.magnitude >= 0.0, "{} magnitude", definition.id);
        assert!(definition.cooldown > 0.0, "{} should have a cooldown", definition.id);
        if definition.behavior.is_travelling() {
            assert!(definition.speed > 0.0, "{} needs a speed", definition.id);
            assert!(definition.range > 0.0, "{} needs a range", definition.id);
        }
        if definition.effect == EffectKind::Stun {
            assert!(definition.stun_duration > 0.0, "{} needs a stun duration", definition.id);
        }
    }
}

#[test]
fn test_every_behavior_kind_is_shipped() {
    let catalog = catalog();
    for kind in [
        BehaviorKind::Projectile,
        BehaviorKind::Arrow,
        BehaviorKind::AreaEffect,
        BehaviorKind::Follow,
        BehaviorKind::DelayedDamageArea,
        BehaviorKind::DebuffArea,
        BehaviorKind::Charge,
    ] {
        assert!(
            catalog.iter().any(|definition| definition.behavior == kind),
            "no {} ability shipped",
            kind.name()
        );
    }
}

#[test]
fn test_unknown_slot_ability_rejected() {
    let result = catalog().resolve_slots(&[AbilityId::new("cleave"), AbilityId::new("nope")]);
    assert!(matches!(result, Err(ConfigError::UnknownAbility(_))));
}

#[test]
fn test_travelling_ability_without_speed_rejected() {
    let ron = r#"(abilities: [(id: "dud", name: "Dud", behavior: Projectile, effect: Damage, magnitude: 5.0, range: 5.0)])"#;
    assert!(matches!(
        AbilityCatalog::from_ron_str(ron),
        Err(ConfigError::InvalidAbility { .. })
    ));
}

#[test]
fn test_duplicate_ability_rejected() {
    let ron = r#"(abilities: [
        (id: "poke", name: "Poke", behavior: AreaEffect, effect: Damage, magnitude: 5.0),
        (id: "poke", name: "Poke Again", behavior: AreaEffect, effect: Damage, magnitude: 6.0),
    ])"#;
    assert!(matches!(
        AbilityCatalog::from_ron_str(ron),
        Err(ConfigError::DuplicateAbility(_))
    ));
}

// =============================================================================
// Factory
// =============================================================================

#[test]
fn test_factory_builds_configured_kinds() {
    let caster = CasterSnapshot {
        id: ActorId(1),
        faction: Faction::Player,
        actor_type: ActorType::Mage,
    };
    for definition in catalog().iter() {
        let placement = definition.spawn_placement(Vec3::ZERO, Vec3::Z);
        let instance = build_instance(
            InstanceId(1),
            Arc::clone(definition),
            caster,
            placement,
            Vec3::ZERO,
            None,
        );
        assert_eq!(instance.behavior().kind(), definition.behavior, "{}", definition.id);
        assert_eq!(instance.effect().kind(), definition.effect, "{}", definition.id);
        assert_eq!(instance.gate().interval(), definition.interval, "{}", definition.id);
    }
}

// =============================================================================
// Behaviors
// =============================================================================

#[test]
fn test_area_strikes_on_spawn() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let knight = session.spawn_actor(
        Faction::Player,
        ActorType::Knight,
        Vec3::ZERO,
        vec![ability(&catalog, "cleave")],
    );
    let minion = minion_at(&mut session, 1.5);

    session.invoke(knight, 0).unwrap();
    assert_eq!(health(&session, minion), 58.0);

    // Zero duration: gone after the next tick
    session.tick(DT);
    assert!(session.instances().is_empty());
}

#[test]
fn test_projectile_stops_at_first_hit() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let mage = session.spawn_actor(
        Faction::Player,
        ActorType::Mage,
        Vec3::ZERO,
        vec![ability(&catalog, "fireball")],
    );
    let front = minion_at(&mut session, 4.0);
    let back = minion_at(&mut session, 6.0);

    session.invoke(mage, 0).unwrap();
    run_for(&mut session, 2.0);

    assert_eq!(health(&session, front), 45.0);
    assert_eq!(health(&session, back), 80.0);
    assert!(session.instances().is_empty());
}

#[test]
fn test_arrow_pierces_only_with_feature() {
    let catalog = catalog();
    let arrow = ability(&catalog, "arrow_shot");

    for piercing in [false, true] {
        let mut session = Session::with_seed(1);
        if piercing {
            session
                .registry_mut(Faction::Player)
                .set_feature(ActorType::Archer, FeatureId::Piercing, true);
        }
        let archer = session.spawn_actor(
            Faction::Player,
            ActorType::Archer,
            Vec3::ZERO,
            vec![Arc::clone(&arrow)],
        );
        let front = minion_at(&mut session, 4.0);
        let back = minion_at(&mut session, 6.0);

        session.invoke(archer, 0).unwrap();
        run_for(&mut session, 1.0);

        assert_eq!(health(&session, front), 64.0);
        let expected_back = if piercing { 64.0 } else { 80.0 };
        assert_eq!(health(&session, back), expected_back, "piercing = {}", piercing);
    }
}

#[test]
fn test_delayed_area_strikes_once_after_arming() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let archer = session.spawn_actor(
        Faction::Player,
        ActorType::Archer,
        Vec3::ZERO,
        vec![ability(&catalog, "volley")],
    );
    let minion = minion_at(&mut session, 7.0);

    session.invoke(archer, 0).unwrap();
    run_for(&mut session, 0.5);
    assert_eq!(health(&session, minion), 80.0);

    run_for(&mut session, 1.0);
    assert_eq!(health(&session, minion), 50.0);
    assert!(session.instances().is_empty());
}

#[test]
fn test_follow_area_tracks_caster() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let knight = session.spawn_actor(
        Faction::Player,
        ActorType::Knight,
        Vec3::ZERO,
        vec![ability(&catalog, "holy_aura")],
    );
    session.invoke(knight, 0).unwrap();

    session.roster_mut().get_mut(knight).unwrap().position = Vec3::new(5.0, 0.0, 0.0);
    session.tick(DT);

    let position = session.instances()[0].behavior().position().unwrap();
    assert!(position.distance(Vec3::new(5.0, 0.0, 0.0)) < 1e-4);
}

#[test]
fn test_debuff_area_stuns_on_spawn_and_lingers() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let mage = session.spawn_actor(
        Faction::Player,
        ActorType::Mage,
        Vec3::ZERO,
        vec![ability(&catalog, "frost_nova")],
    );
    let minion = minion_at(&mut session, 2.0);

    session.invoke(mage, 0).unwrap();
    assert!(session.actor(minion).unwrap().is_stunned());
    assert_eq!(health(&session, minion), 75.0);

    run_for(&mut session, 1.0);
    assert_eq!(session.instances().len(), 1);
    assert!(session.actor(minion).unwrap().is_stunned());

    run_for(&mut session, 3.0);
    assert!(session.instances().is_empty());
}

#[test]
fn test_charge_moves_caster_and_strikes() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let knight = session.spawn_actor(
        Faction::Player,
        ActorType::Knight,
        Vec3::ZERO,
        vec![ability(&catalog, "charge")],
    );
    let minion = minion_at(&mut session, 3.0);

    session.invoke(knight, 0).unwrap();
    run_for(&mut session, 1.0);

    let position = session.actor(knight).unwrap().position;
    assert!((position.z - 6.0).abs() < 1e-3, "knight ended at {}", position);
    assert_eq!(health(&session, minion), 60.0);
    assert!(session.instances().is_empty());
}

#[test]
fn test_instances_of_dead_casters_stop() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let mage = session.spawn_actor(
        Faction::Player,
        ActorType::Mage,
        Vec3::ZERO,
        vec![ability(&catalog, "frost_nova")],
    );
    let minion = minion_at(&mut session, 2.0);
    session.invoke(mage, 0).unwrap();

    session.roster_mut().get_mut(mage).unwrap().apply_damage(1_000.0);
    session.tick(DT);

    assert!(session.instances().is_empty());
    assert!(session.actor(mage).is_none());
    assert_eq!(session.fallen().len(), 1);
    assert_eq!(health(&session, minion), 75.0);
}

#[test]
fn test_periodic_heal_lands_on_sixty_tick_boundaries() {
    let catalog = catalog();
    let mut session = Session::with_seed(1);
    let knight = session.spawn_actor(
        Faction::Player,
        ActorType::Knight,
        Vec3::ZERO,
        vec![ability(&catalog, "holy_aura")],
    );
    let archer = session.spawn_actor(
        Faction::Player,
        ActorType::Archer,
        Vec3::new(1.0, 0.0, 0.0),
        Vec::new(),
    );
    session.roster_mut().get_mut(archer).unwrap().apply_damage(100.0);
    session.invoke(knight, 0).unwrap();

    let mut heal_ticks = Vec::new();
    for tick in 1..=300 {
        let before = health(&session, archer);
        session.tick(DT);
        if health(&session, archer) > before {
            heal_ticks.push(tick);
        }
    }

    // Interval 1.0 at 60 Hz: one heal every 60 ticks, starting with the first update
    assert_eq!(heal_ticks, vec![1, 61, 121, 181, 241]);
}

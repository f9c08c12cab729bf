//! Integration tests for the combat log
//!
//! These tests verify that the CombatLog correctly:
//! - Records casts, damage, healing, crowd control and deaths from a session
//! - Filters entries by type and returns recent entries in order
//! - Totals damage by source

use std::sync::Arc;

use bevy::math::Vec3;
use lanecast::abilities::{AbilityCatalog, AbilityId};
use lanecast::actors::{ActorId, ActorType, Faction};
use lanecast::combat::log::{CombatLog, CombatLogEventType};
use lanecast::session::Session;

fn create_test_log() -> CombatLog {
    CombatLog::default()
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_empty_log_totals() {
    let log = create_test_log();
    assert_eq!(log.total_damage_by(ActorId(1)), 0.0);
    assert!(log.recent(5).is_empty());
    assert_eq!(log.count_of(CombatLogEventType::Damage), 0);
}

#[test]
fn test_total_damage_by_source() {
    let mut log = create_test_log();
    log.log_amount(CombatLogEventType::Damage, ActorId(1), 12.0, "a".to_string());
    log.log_amount(CombatLogEventType::Damage, ActorId(1), 8.0, "b".to_string());
    log.log_amount(CombatLogEventType::Damage, ActorId(2), 50.0, "c".to_string());
    log.log_amount(CombatLogEventType::Healing, ActorId(1), 30.0, "d".to_string());

    assert_eq!(log.total_damage_by(ActorId(1)), 20.0);
    assert_eq!(log.total_damage_by(ActorId(2)), 50.0);
}

#[test]
fn test_filter_and_recent() {
    let mut log = create_test_log();
    log.log(CombatLogEventType::MatchEvent, "start".to_string());
    log.log_amount(CombatLogEventType::Damage, ActorId(1), 5.0, "hit".to_string());
    log.log(CombatLogEventType::Death, "dead".to_string());

    let damage = log.filter_by_type(CombatLogEventType::Damage);
    assert_eq!(damage.len(), 1);
    assert_eq!(damage[0].amount, Some(5.0));
    assert_eq!(damage[0].source, Some(ActorId(1)));

    let recent = log.recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].message, "dead");
}

#[test]
fn test_entries_are_timestamped_with_match_time() {
    let mut log = create_test_log();
    log.match_time = 12.5;
    log.log(CombatLogEventType::MatchEvent, "later".to_string());
    assert_eq!(log.entries[0].timestamp, 12.5);
}

// =============================================================================
// Session Integration Tests
// =============================================================================

#[test]
fn test_session_logs_cast_damage_and_death() {
    let catalog = AbilityCatalog::load_default().unwrap();
    let cleave = Arc::clone(catalog.get(&AbilityId::new("cleave")).unwrap());
    let mut session = Session::with_seed(11);
    let knight = session.spawn_actor(Faction::Player, ActorType::Knight, Vec3::ZERO, vec![cleave]);
    let minion = session.spawn_actor(
        Faction::Enemy,
        ActorType::Minion,
        Vec3::new(0.0, 0.0, 1.5),
        Vec::new(),
    );
    session.roster_mut().get_mut(minion).unwrap().apply_damage(70.0);

    session.invoke(knight, 0).unwrap();
    session.tick(0.1);

    let log = session.log();
    assert_eq!(log.count_of(CombatLogEventType::AbilityUsed), 1);
    assert_eq!(log.count_of(CombatLogEventType::Damage), 1);
    assert_eq!(log.count_of(CombatLogEventType::Death), 1);
    // Only the remaining 10 health counts as dealt
    assert_eq!(log.total_damage_by(knight), 10.0);
    assert!(session.actor(minion).is_none());
}

#[test]
fn test_log_serializes_to_json() {
    let mut log = create_test_log();
    log.log_amount(CombatLogEventType::Healing, ActorId(3), 7.0, "mend".to_string());
    let json = serde_json::to_string(&log.entries).unwrap();
    assert!(json.contains("Healing"));
    assert!(json.contains("mend"));
}

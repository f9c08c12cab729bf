//! Combat logging
//!
//! Records combat events for post-match analysis. Entries are plain data and
//! serialize straight into the headless scenario report.

use serde::Serialize;

use crate::actors::ActorId;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in match time (seconds since session start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Actor that caused the event, when there is one
    pub source: Option<ActorId>,
    /// Amount of damage, healing, stun seconds or gold
    pub amount: Option<f32>,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Healing done
    Healing,
    /// Ability cast
    AbilityUsed,
    /// Stun applied
    CrowdControl,
    /// Upgrade applied to a faction
    Upgrade,
    /// Boolean feature flipped
    FeatureChanged,
    /// Gold granted or income changed
    Economy,
    /// Actor died
    Death,
    /// Session event (start, end, reset)
    MatchEvent,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current match time
    pub match_time: f32,
}

impl CombatLog {
    /// Clear the log for a new match
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, None, None, message);
    }

    /// Add an entry attributed to a source actor with a numeric amount
    pub fn log_amount(
        &mut self,
        event_type: CombatLogEventType,
        source: ActorId,
        amount: f32,
        message: String,
    ) {
        self.push(event_type, Some(source), Some(amount), message);
    }

    fn push(
        &mut self,
        event_type: CombatLogEventType,
        source: Option<ActorId>,
        amount: Option<f32>,
        message: String,
    ) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            source,
            amount,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn count_of(&self, event_type: CombatLogEventType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Total damage attributed to one actor
    pub fn total_damage_by(&self, source: ActorId) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.event_type == CombatLogEventType::Damage && e.source == Some(source))
            .filter_map(|e| e.amount)
            .sum()
    }
}

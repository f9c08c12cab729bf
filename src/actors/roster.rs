//! Actor Roster
//!
//! Ordered store of every live actor in a session. Iteration is by ascending
//! [`ActorId`], which keeps shape queries and notifications deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use smallvec::SmallVec;

use super::{ActorId, ActorType, Combatant, Faction};
use crate::abilities::{AbilityDefinition, QueryShape};
use crate::modifiers::PerTypeModifiers;

/// Inline capacity for shape query results; lanes rarely pack more actors into one area.
pub type QueryHits = SmallVec<[ActorId; 8]>;

#[derive(Clone, Debug, Default)]
pub struct Roster {
    actors: BTreeMap<ActorId, Combatant>,
    next_id: u32,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an actor with the given ability slots. Ids start at 1 and are never reused.
    pub fn spawn(
        &mut self,
        faction: Faction,
        actor_type: ActorType,
        position: Vec3,
        abilities: Vec<Arc<AbilityDefinition>>,
    ) -> ActorId {
        self.next_id += 1;
        let id = ActorId(self.next_id);
        let combatant = Combatant::new(id, faction, actor_type, position).with_abilities(abilities);
        self.actors.insert(id, combatant);
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&Combatant> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Combatant> {
        self.actors.get_mut(&id)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Combatant> {
        self.actors.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.actors.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.actors.values_mut()
    }

    /// Living actors of one type in one faction.
    pub fn alive_of_type(
        &self,
        faction: Faction,
        actor_type: ActorType,
    ) -> impl Iterator<Item = &Combatant> {
        self.actors.values().filter(move |actor| {
            actor.faction == faction && actor.actor_type == actor_type && !actor.is_dead()
        })
    }

    /// Push new actor-type modifiers to every living actor of that type and faction.
    ///
    /// Returns the number of actors recalculated.
    pub fn recalculate_type(
        &mut self,
        faction: Faction,
        actor_type: ActorType,
        modifiers: &PerTypeModifiers,
    ) -> usize {
        let mut count = 0;
        for actor in self.actors.values_mut() {
            if actor.faction == faction && actor.actor_type == actor_type && !actor.is_dead() {
                actor.recalculate_stats(modifiers);
                count += 1;
            }
        }
        count
    }

    /// Living actors whose collision circle overlaps the shape, in ascending id order.
    pub fn query(&self, shape: &QueryShape) -> QueryHits {
        self.actors
            .values()
            .filter(|actor| !actor.is_dead())
            .filter(|actor| shape.overlaps(actor.planar_position(), actor.radius))
            .map(|actor| actor.id)
            .collect()
    }

    /// Closest living enemy within `max_range` of the actor (surface to surface).
    /// Ties resolve to the lowest id.
    pub fn nearest_enemy(&self, of: ActorId, max_range: f32) -> Option<ActorId> {
        let origin = self.actors.get(&of)?;
        let mut best: Option<(f32, ActorId)> = None;
        for actor in self.actors.values() {
            if actor.is_dead() || !actor.is_enemy_of(origin) {
                continue;
            }
            let distance = origin.planar_position().distance(actor.planar_position()) - actor.radius;
            if distance > max_range {
                continue;
            }
            match best {
                Some((best_distance, _)) if best_distance <= distance => {}
                _ => best = Some((distance, actor.id)),
            }
        }
        best.map(|(_, id)| id)
    }

    /// Ids of actors whose health reached zero.
    pub fn dead_ids(&self) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|actor| actor.is_dead())
            .map(|actor| actor.id)
            .collect()
    }

    pub fn has_living(&self, faction: Faction) -> bool {
        self.actors
            .values()
            .any(|actor| actor.faction == faction && !actor.is_dead())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut roster = Roster::new();
        let a = roster.spawn(Faction::Player, ActorType::Knight, Vec3::ZERO, vec![]);
        let b = roster.spawn(Faction::Enemy, ActorType::Minion, Vec3::ZERO, vec![]);
        assert_eq!(a, ActorId(1));
        assert_eq!(b, ActorId(2));
        roster.remove(a);
        let c = roster.spawn(Faction::Player, ActorType::Mage, Vec3::ZERO, vec![]);
        assert_eq!(c, ActorId(3));
    }

    #[test]
    fn test_query_is_sorted_and_skips_dead() {
        let mut roster = Roster::new();
        let a = roster.spawn(Faction::Enemy, ActorType::Minion, Vec3::new(0.0, 0.0, 1.0), vec![]);
        let b = roster.spawn(Faction::Enemy, ActorType::Minion, Vec3::new(1.0, 0.0, 0.0), vec![]);
        let c = roster.spawn(Faction::Enemy, ActorType::Minion, Vec3::new(-1.0, 0.0, 0.0), vec![]);
        roster.get_mut(b).unwrap().apply_damage(1000.0);

        let hits = roster.query(&QueryShape::circle(Vec3::ZERO, 2.0));
        assert_eq!(hits.as_slice(), &[a, c]);
    }

    #[test]
    fn test_nearest_enemy_respects_range() {
        let mut roster = Roster::new();
        let me = roster.spawn(Faction::Player, ActorType::Archer, Vec3::ZERO, vec![]);
        let near = roster.spawn(Faction::Enemy, ActorType::Minion, Vec3::new(0.0, 0.0, 5.0), vec![]);
        roster.spawn(Faction::Enemy, ActorType::Minion, Vec3::new(0.0, 0.0, 9.0), vec![]);
        roster.spawn(Faction::Player, ActorType::Minion, Vec3::new(0.0, 0.0, 1.0), vec![]);

        assert_eq!(roster.nearest_enemy(me, 10.0), Some(near));
        assert_eq!(roster.nearest_enemy(me, 2.0), None);
    }
}

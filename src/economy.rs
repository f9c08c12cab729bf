//! Faction Economy
//!
//! Per-faction gold with passive income. Income is `BASE_GOLD_INCOME` gold per
//! second scaled by an income [`Modifier`]; fractional gold carries over between
//! ticks so slow income is never rounded away.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::Serialize;

use crate::actors::Faction;
use crate::constants::BASE_GOLD_INCOME;
use crate::modifiers::Modifier;

/// The economy surface upgrades are allowed to touch.
pub trait EconomySink {
    fn add_gold(&mut self, faction: Faction, amount: u32);
    fn current_gold(&self, faction: Faction) -> u32;
    /// Permanently raise a faction's income rate by `fraction` (0.25 = +25%).
    fn boost_income(&mut self, faction: Faction, fraction: f32);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FactionEconomy {
    pub gold: u32,
    pub income: Modifier,
    /// Fractional gold not yet credited
    #[serde(skip)]
    carry: f32,
}

impl FactionEconomy {
    pub fn income_per_second(&self) -> f32 {
        self.income.resolve(BASE_GOLD_INCOME).max(0.0)
    }
}

#[derive(Clone, Debug)]
pub struct Economy {
    factions: BTreeMap<Faction, FactionEconomy>,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            factions: Faction::all()
                .iter()
                .map(|faction| (*faction, FactionEconomy::default()))
                .collect(),
        }
    }
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faction(&self, faction: Faction) -> FactionEconomy {
        self.factions.get(&faction).copied().unwrap_or_default()
    }

    pub fn set_gold(&mut self, faction: Faction, gold: u32) {
        self.factions.entry(faction).or_default().gold = gold;
    }

    /// Credit passive income for `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for economy in self.factions.values_mut() {
            economy.carry += economy.income_per_second() * dt;
            let whole = economy.carry.floor();
            if whole >= 1.0 {
                economy.gold = economy.gold.saturating_add(whole as u32);
                economy.carry -= whole;
            }
        }
    }

    /// Spend gold if the faction can afford it.
    pub fn spend(&mut self, faction: Faction, amount: u32) -> bool {
        let economy = self.factions.entry(faction).or_default();
        if economy.gold < amount {
            return false;
        }
        economy.gold -= amount;
        true
    }

    pub fn reset(&mut self) {
        for economy in self.factions.values_mut() {
            *economy = FactionEconomy::default();
        }
    }
}

impl EconomySink for Economy {
    fn add_gold(&mut self, faction: Faction, amount: u32) {
        let economy = self.factions.entry(faction).or_default();
        economy.gold = economy.gold.saturating_add(amount);
    }

    fn current_gold(&self, faction: Faction) -> u32 {
        self.faction(faction).gold
    }

    fn boost_income(&mut self, faction: Faction, fraction: f32) {
        self.factions
            .entry(faction)
            .or_default()
            .income
            .apply_multiplicative(fraction);
        debug!(
            "{} income is now {:.2} gold/s",
            faction.name(),
            self.faction(faction).income_per_second()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_carries_fractions() {
        let mut economy = Economy::new();
        // 2 gold/s in quarter-second ticks: half a gold each
        economy.tick(0.25);
        assert_eq!(economy.current_gold(Faction::Player), 0);
        for _ in 0..7 {
            economy.tick(0.25);
        }
        assert_eq!(economy.current_gold(Faction::Player), 4);
    }

    #[test]
    fn test_boosts_stack_linearly() {
        let mut economy = Economy::new();
        economy.boost_income(Faction::Enemy, 0.25);
        economy.boost_income(Faction::Enemy, 0.25);
        let income = economy.faction(Faction::Enemy).income_per_second();
        assert!((income - BASE_GOLD_INCOME * 1.5).abs() < 1e-5);
        assert_eq!(economy.faction(Faction::Player).income_per_second(), BASE_GOLD_INCOME);
    }

    #[test]
    fn test_spend_requires_funds() {
        let mut economy = Economy::new();
        economy.add_gold(Faction::Player, 30);
        assert!(!economy.spend(Faction::Player, 31));
        assert!(economy.spend(Faction::Player, 30));
        assert_eq!(economy.current_gold(Faction::Player), 0);
    }
}

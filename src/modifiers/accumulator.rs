//! Modifier accumulators
//!
//! A [`Modifier`] is the additive + multiplicative pair that represents the
//! cumulative influence of every upgrade on one numeric channel.
//!
//! Percentage deltas stack linearly: two +10% upgrades give x1.20, not x1.21.

use serde::{Deserialize, Serialize};

/// Additive/multiplicative value container for one attribute channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Flat amount added to the base before the multiplier
    pub additive: f32,
    /// Multiplier applied after the additive term (1.0 = unchanged)
    pub multiplier: f32,
}

impl Default for Modifier {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Modifier {
    /// The zero-effect modifier: additive 0, multiplier 1.
    pub const IDENTITY: Modifier = Modifier {
        additive: 0.0,
        multiplier: 1.0,
    };

    pub fn new(additive: f32, multiplier: f32) -> Self {
        Self {
            additive,
            multiplier,
        }
    }

    pub fn apply_additive(&mut self, delta: f32) {
        self.additive += delta;
    }

    /// Add a percentage delta (0.1 = +10%) to the multiplier.
    ///
    /// The bonus part of the multiplier is summed, never compounded.
    pub fn apply_multiplicative(&mut self, delta: f32) {
        self.multiplier = 1.0 + ((self.multiplier - 1.0) + delta);
    }

    /// `(base + additive) * multiplier`
    pub fn resolve(&self, base: f32) -> f32 {
        (base + self.additive) * self.multiplier
    }

    /// Multiplier only, for pipeline stages without an additive term.
    pub fn scale(&self, value: f32) -> f32 {
        value * self.multiplier
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

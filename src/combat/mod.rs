//! Combat bookkeeping
//!
//! Simulation clock scaling and the combat log.

use bevy::prelude::*;

pub mod log;

/// Controls the speed of the combat simulation
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 0.5 = half speed, 1.0 = normal, 2.0 = double)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn set(&mut self, multiplier: f32) {
        self.multiplier = multiplier.max(0.0);
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }

    /// Simulation seconds for `real_dt` wall seconds.
    pub fn scale(&self, real_dt: f32) -> f32 {
        (real_dt * self.multiplier).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_speed_scales_to_zero() {
        let mut speed = SimulationSpeed::default();
        assert_eq!(speed.scale(0.5), 0.5);
        speed.pause();
        assert!(speed.is_paused());
        assert_eq!(speed.scale(0.5), 0.0);
        speed.set(2.0);
        assert_eq!(speed.scale(0.5), 1.0);
    }
}

/*
 * Settings Module
 *
 * Construction parameters handed to the simulation by the driver: how many
 * agents to start with, how many can ever exist, the RNG seed, the worker
 * count and the iteration budget.
 */

use crate::error::{SimulationError, SimulationResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub start_agents: usize,
    pub max_agents: usize,
    pub seed: u64,
    // 0 lets rayon pick the worker count
    pub threads: usize,
    pub iterations: u64,
    pub headless: bool,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_agents: 1024 * 1024,
            max_agents: 1024 * 1024 * 2,
            seed: 123456,
            threads: 1,
            iterations: 1000,
            headless: false,
            debug: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> SimulationResult<()> {
        if self.max_agents == 0 {
            return Err(SimulationError::ZeroCapacity);
        }
        if self.max_agents < self.start_agents {
            return Err(SimulationError::CapacityTooSmall {
                start_agents: self.start_agents,
                max_agents: self.max_agents,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_must_cover_the_starting_population() {
        let settings = Settings {
            start_agents: 10,
            max_agents: 5,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SimulationError::CapacityTooSmall { start_agents: 10, max_agents: 5 })
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let settings = Settings {
            start_agents: 0,
            max_agents: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SimulationError::ZeroCapacity)));
        assert!(Settings::default().validate().is_ok());
    }
}

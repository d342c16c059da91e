/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that holds every tuning
 * value of the simulation: map size, grid resolution, state thresholds and
 * mass costs. The engine receives it at construction and never changes it,
 * so tests can vary thresholds freely.
 */

use crate::error::{SimulationError, SimulationResult};

// How hunting agents query the spatial index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NeighborQuery {
    // Only the bucket containing the hunter
    #[default]
    SingleBucket,
    // The hunter's bucket and the 8 around it
    Neighborhood,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
    // The map spans [-map_size, map_size] on both axes
    pub map_size: f32,
    pub divisions_per_dimension: usize,
    pub hunting_mass: f32,
    pub incubating_mass: f32,
    pub splitting_mass: f32,
    pub incubate_mass_reward: f32,
    pub move_mass_cost: f32,
    pub max_eat_distance: f32,
    pub time_delta: f32,
    // Steps run per rendering-lock acquisition
    pub steps_per_batch: u64,
    // Clone offset from its parent on both axes
    pub split_offset: f32,
    pub neighbor_query: NeighborQuery,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            map_size: 1024.0,
            divisions_per_dimension: 16,
            hunting_mass: 2.0,
            incubating_mass: 1.0,
            splitting_mass: 8.0,
            incubate_mass_reward: 0.01,
            move_mass_cost: 0.02,
            max_eat_distance: 1.0,
            time_delta: 0.1,
            steps_per_batch: 128,
            split_offset: 1.0,
            neighbor_query: NeighborQuery::SingleBucket,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> SimulationResult<()> {
        if !(self.map_size.is_finite() && self.map_size > 0.0) {
            return Err(SimulationError::InvalidParams("map_size must be positive"));
        }
        if self.divisions_per_dimension == 0 {
            return Err(SimulationError::InvalidParams("divisions_per_dimension must be at least 1"));
        }
        if !(self.incubating_mass < self.hunting_mass && self.hunting_mass <= self.splitting_mass) {
            return Err(SimulationError::InvalidParams(
                "thresholds must satisfy incubating_mass < hunting_mass <= splitting_mass",
            ));
        }
        if self.incubate_mass_reward < 0.0 || self.move_mass_cost < 0.0 {
            return Err(SimulationError::InvalidParams("mass reward and cost must be nonnegative"));
        }
        if self.max_eat_distance < 0.0 {
            return Err(SimulationError::InvalidParams("max_eat_distance must be nonnegative"));
        }
        if !self.time_delta.is_finite() {
            return Err(SimulationError::InvalidParams("time_delta must be finite"));
        }
        if self.steps_per_batch == 0 {
            return Err(SimulationError::InvalidParams("steps_per_batch must be at least 1"));
        }
        Ok(())
    }

    #[inline]
    pub fn max_eat_distance_squared(&self) -> f32 {
        self.max_eat_distance * self.max_eat_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let params = SimulationParams {
            incubating_mass: 3.0,
            hunting_mass: 2.0,
            ..SimulationParams::default()
        };
        assert!(matches!(params.validate(), Err(SimulationError::InvalidParams(_))));

        let params = SimulationParams {
            splitting_mass: 1.5,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_grid_and_batches() {
        let params = SimulationParams {
            divisions_per_dimension: 0,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());

        let params = SimulationParams {
            map_size: -1.0,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());

        let params = SimulationParams {
            steps_per_batch: 0,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());
    }
}

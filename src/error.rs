/*
 * Error Module
 *
 * Errors that can stop a simulation from being built. Nothing in here is
 * ever raised by a running simulation: per-step anomalies are logged and
 * absorbed instead.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("capacity {max_agents} is smaller than the starting population {start_agents}")]
    CapacityTooSmall { start_agents: usize, max_agents: usize },

    #[error("capacity must be at least 1")]
    ZeroCapacity,

    #[error("invalid simulation parameters: {0}")]
    InvalidParams(&'static str),

    #[error("failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type SimulationResult<T> = Result<T, SimulationError>;

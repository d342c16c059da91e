/*
 * PALS - Parallel Agent Life Simulation - Module Definitions
 *
 * Agents on a square map incubate to gain mass, hunt incubating agents
 * to eat them, and split in two once heavy enough. The core
 * (agent, spatial_index, simulation) has no knowledge of the viewer;
 * app, camera, input, renderer, ui and debug only read snapshots.
 */

// Re-export key components for easier access
pub use agent::{AgentId, AgentState, Census};
pub use cli::Cli;
pub use error::{SimulationError, SimulationResult};
pub use params::{NeighborQuery, SimulationParams};
pub use settings::Settings;
pub use simulation::{Simulation, Snapshot};
pub use spatial_index::SpatialIndex;
pub use vec2::Vec2;

// Define modules
pub mod agent;
pub mod app;
pub mod camera;
pub mod cli;
pub mod debug;
pub mod error;
pub mod input;
pub mod params;
pub mod renderer;
pub mod settings;
pub mod simulation;
pub mod spatial_index;
pub mod ui;
pub mod vec2;

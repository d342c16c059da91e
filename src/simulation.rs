/*
 * Simulation Module
 *
 * This module owns the agent table and advances it step by step.
 * Each step runs three phases in strict order, each one parallel over the
 * live id range [0, last_agent_index) with a full barrier in between:
 *
 * 1. Resolve the eat claims hunters recorded during the previous step
 * 2. Update every agent's state and apply that state's action
 * 3. Apply planned movement and keep the spatial index in sync
 *
 * Cross-agent writes only happen through two compare-and-swap protocols on
 * the state field: claiming a dead slot (spawn) and claiming an incubating
 * victim (eat). Everything else an agent writes belongs to its own slot.
 */

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::agent::{AgentId, AgentState, AgentTable, Census, NEVER};
use crate::error::SimulationResult;
use crate::params::{NeighborQuery, SimulationParams};
use crate::settings::Settings;
use crate::spatial_index::SpatialIndex;
use crate::vec2::{clamp_to_map, direction, squared_distance, vec2, Vec2};

// Read-only copy of the agent arrays handed to renderers
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub positions: Vec<Vec2>,
    pub masses: Vec<f32>,
    pub states: Vec<AgentState>,
    pub step: u64,
    pub is_done: bool,
}

impl Snapshot {
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for &state in &self.states {
            census.record(state);
        }
        census
    }
}

// State transition applied at the start of an agent's update
pub fn next_state(state: AgentState, mass: f32, params: &SimulationParams) -> AgentState {
    match state {
        AgentState::Incubating if mass >= params.hunting_mass => AgentState::Hunting,
        AgentState::Hunting if mass <= params.incubating_mass => AgentState::Incubating,
        AgentState::Hunting if mass >= params.splitting_mass => AgentState::Splitting,
        AgentState::Splitting if mass >= params.hunting_mass => AgentState::Hunting,
        AgentState::Splitting => AgentState::Incubating,
        other => other,
    }
}

pub struct Simulation {
    params: SimulationParams,
    agents: AgentTable,
    spatial_index: SpatialIndex,
    // One past the greatest id ever handed to a live agent
    last_agent_index: AtomicUsize,
    steps_taken: AtomicU64,
    // Spawns dropped because no slot was free
    failed_spawns: AtomicU64,
    n_iterations: u64,
    is_done: AtomicBool,
    // Held by run() for a whole batch of steps so readers get torn-free snapshots
    rendering: Mutex<()>,
    pool: rayon::ThreadPool,
}

impl Simulation {
    pub fn new(settings: &Settings, params: SimulationParams) -> SimulationResult<Self> {
        settings.validate()?;
        params.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .thread_name(|i| format!("pals-worker-{i}"))
            .build()?;

        let simulation = Self {
            agents: AgentTable::new(settings.max_agents),
            spatial_index: SpatialIndex::new(params.map_size, params.divisions_per_dimension),
            last_agent_index: AtomicUsize::new(0),
            steps_taken: AtomicU64::new(0),
            failed_spawns: AtomicU64::new(0),
            n_iterations: settings.iterations,
            is_done: AtomicBool::new(false),
            rendering: Mutex::new(()),
            pool,
            params,
        };

        simulation.seed_agents(settings.start_agents, settings.seed);

        info!(
            start_agents = settings.start_agents,
            capacity = settings.max_agents,
            threads = simulation.pool.current_num_threads(),
            seed = settings.seed,
            "simulation created"
        );

        Ok(simulation)
    }

    // Fill the first `count` slots with incubating agents
    fn seed_agents(&self, count: usize, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);

        // Keep seeded agents a splitting-mass away from the border
        let margin = self.params.map_size - self.params.splitting_mass;
        let spread = if margin > 0.0 { margin } else { self.params.map_size };

        for id in 0..count {
            let position = vec2(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread));
            let mass = rng.gen_range(0.1..1.0);

            // The table is fresh, so slot `id` is always dead here
            if self.agents.try_claim(id, AgentState::Incubating, NEVER) {
                self.init_slot(id, position, mass);
                self.spatial_index.set(id, position);
            }
        }

        self.last_agent_index.fetch_max(count, Ordering::AcqRel);
    }

    pub fn run(&self) {
        let started = Instant::now();
        let batch = self.params.steps_per_batch;
        let delta = self.params.time_delta;

        info!(
            iterations = self.n_iterations,
            steps_per_batch = batch,
            "simulation running"
        );

        // Only lock/unlock every batch of steps to keep the lock overhead low
        let mut remaining = self.n_iterations;
        while remaining > 0 {
            let steps = remaining.min(batch);

            trace!("simulation waiting for lock");
            let guard = self.rendering.lock();
            trace!("simulation got lock");

            for _ in 0..steps {
                self.step(delta);
            }

            // Hand the lock to a waiting reader instead of re-taking it right away
            MutexGuard::unlock_fair(guard);
            trace!("simulation released lock");

            remaining -= steps;
        }

        self.is_done.store(true, Ordering::Release);

        let census = self.census();
        info!(
            steps = self.steps_taken(),
            alive = census.alive(),
            incubating = census.incubating,
            hunting = census.hunting,
            splitting = census.splitting,
            last_agent_index = self.last_agent_index(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "simulation finished"
        );
    }

    pub fn step(&self, delta: f32) {
        let step = self.steps_taken.load(Ordering::Relaxed);
        let failed_before = self.failed_spawns();

        self.pool.install(|| {
            // 1: Resolve last step's eat claims
            self.resolve_eaten();

            // 2: Update state and take the state's action
            self.update_states(step);

            // 3: Move hunters and update the spatial index
            self.update_positions(step, delta);
        });

        let failed = self.failed_spawns() - failed_before;
        if failed > 0 {
            warn!(step, failed, capacity = self.capacity(), "failed to create new agents, table is full");
        }

        self.steps_taken.fetch_add(1, Ordering::Relaxed);
    }

    // Run `f` for every id below the high-water mark, in parallel chunks.
    // Each chunk gets one scratch buffer for spatial queries.
    fn for_each_agent<F>(&self, f: F)
    where
        F: Fn(AgentId, &mut Vec<AgentId>) + Sync,
    {
        let n = self.last_agent_index();
        if n == 0 {
            return;
        }

        // Process agents in chunks to reduce the number of parallel tasks
        let chunk_size = std::cmp::max(n / rayon::current_num_threads(), 1);
        let chunk_count = (n + chunk_size - 1) / chunk_size;

        (0..chunk_count).into_par_iter().for_each(|chunk| {
            let mut nearby = Vec::new();
            let start = chunk * chunk_size;
            let end = (start + chunk_size).min(n);
            for id in start..end {
                f(id, &mut nearby);
            }
        });
    }

    fn resolve_eaten(&self) {
        self.for_each_agent(|hunter, _| {
            let Some(victim) = self.agents.eaten(hunter) else {
                return;
            };
            self.agents.set_eaten(hunter, None);

            // Only one hunter can win a given victim
            let claimed = self
                .agents
                .state_cell(victim)
                .compare_exchange(AgentState::Incubating, AgentState::Dead)
                .is_ok();

            if claimed {
                let gained = self.agents.mass(victim);
                self.agents.set_mass(hunter, self.agents.mass(hunter) + gained);
                self.agents.set_mass(victim, 0.0);
                self.spatial_index.remove(victim, self.agents.position(victim));
                trace!(hunter, victim, gained, "agent eaten");
            }
        });
    }

    fn update_states(&self, step: u64) {
        self.for_each_agent(|id, nearby| {
            let state = self.agents.state(id);
            // Agents spawned during this phase wait for the next step
            if !state.is_alive() || self.agents.born_step(id) == step {
                return;
            }

            // Change state
            let next = next_state(state, self.agents.mass(id), &self.params);
            if next != state {
                self.agents.state_cell(id).store(next);
            }

            // Take action
            match next {
                AgentState::Incubating => self.simulate_incubating(id),
                AgentState::Hunting => self.simulate_hunting(id, nearby),
                AgentState::Splitting => self.simulate_splitting(id),
                AgentState::Dead => {}
            }
        });
    }

    fn simulate_incubating(&self, id: AgentId) {
        self.agents.set_movement(id, Vec2::ZERO);
        self.agents
            .set_mass(id, self.agents.mass(id) + self.params.incubate_mass_reward);
    }

    fn simulate_hunting(&self, id: AgentId, nearby: &mut Vec<AgentId>) {
        let position = self.agents.position(id);

        match self.params.neighbor_query {
            NeighborQuery::SingleBucket => self.spatial_index.close_to_into(position, nearby),
            NeighborQuery::Neighborhood => self.spatial_index.neighborhood_into(position, nearby),
        }

        // Closest incubating agent
        let mut closest: Option<(AgentId, Vec2, f32)> = None;
        for &other in nearby.iter() {
            if other == id || self.agents.state(other) != AgentState::Incubating {
                continue;
            }
            let other_position = self.agents.position(other);
            let distance = squared_distance(position, other_position);
            if closest.map_or(true, |(_, _, best)| distance < best) {
                closest = Some((other, other_position, distance));
            }
        }

        let movement = match closest {
            None => Vec2::ZERO,
            Some((target, _, distance)) if distance <= self.params.max_eat_distance_squared() => {
                self.agents.set_eaten(id, Some(target));
                Vec2::ZERO
            }
            Some((_, target_position, _)) => direction(position, target_position),
        };

        self.agents.set_movement(id, movement);
        self.agents
            .set_mass(id, self.agents.mass(id) - self.params.move_mass_cost);
    }

    fn simulate_splitting(&self, id: AgentId) {
        let position = self.agents.position(id);
        let half = self.agents.mass(id) / 2.0;

        self.agents.set_mass(id, half);
        self.agents.set_movement(id, Vec2::ZERO);

        // Parent and clone step away from each other along the diagonal
        let offset = vec2(self.params.split_offset, self.params.split_offset);
        let parent_position = clamp_to_map(position - offset, self.params.map_size);
        let clone_position = clamp_to_map(position + offset, self.params.map_size);

        self.agents.set_position(id, parent_position);
        if !self.agents.awaits_index(id) {
            self.spatial_index.moved(id, position, parent_position);
        }

        // A full table drops the clone; the parent keeps its halved mass
        if let Some(clone) = self.spawn_agent(clone_position, half, AgentState::Splitting) {
            trace!(parent = id, clone, mass = half, "agent split");
        }
    }

    fn update_positions(&self, step: u64, delta: f32) {
        let map_size = self.params.map_size;

        self.for_each_agent(|id, _| {
            let state = self.agents.state(id);
            if !state.is_alive() || self.agents.born_step(id) == step {
                return;
            }

            let old_position = self.agents.position(id);
            let mut new_position = old_position;

            if state == AgentState::Hunting {
                let movement = self.agents.movement(id);
                new_position = clamp_to_map(old_position + movement * delta, map_size);
                self.agents.set_position(id, new_position);
            }

            if self.agents.awaits_index(id) {
                // First time this agent becomes visible to queries
                self.spatial_index.set(id, new_position);
                self.agents.set_awaiting_index(id, false);
            } else if new_position != old_position {
                self.spatial_index.moved(id, old_position, new_position);
            }
        });
    }

    // Claim the first dead slot for a new agent. Safe to call from inside a
    // phase; the agent is skipped for the rest of the current step and only
    // becomes visible to queries after its first full step.
    pub fn spawn_agent(&self, position: Vec2, mass: f32, state: AgentState) -> Option<AgentId> {
        if !state.is_alive() {
            return None;
        }

        let born = self.steps_taken.load(Ordering::Relaxed);
        let Some(id) = self.claim_free_slot(state, born) else {
            // Reported once per step by step()
            self.failed_spawns.fetch_add(1, Ordering::Relaxed);
            debug!(capacity = self.capacity(), "failed to create new agent, table is full");
            return None;
        };

        self.init_slot(id, position, mass);
        self.agents.set_awaiting_index(id, true);
        self.advance_last_agent_index(id);
        Some(id)
    }

    // Like spawn_agent, but the agent is indexed and updated right away.
    // Must not be called while a step is running.
    pub fn place_agent(&self, position: Vec2, mass: f32, state: AgentState) -> Option<AgentId> {
        if !state.is_alive() {
            return None;
        }

        let Some(id) = self.claim_free_slot(state, NEVER) else {
            warn!(capacity = self.capacity(), "failed to place agent, table is full");
            return None;
        };

        self.init_slot(id, position, mass);
        self.spatial_index.set(id, position);
        self.advance_last_agent_index(id);
        Some(id)
    }

    fn claim_free_slot(&self, state: AgentState, born: u64) -> Option<AgentId> {
        (0..self.agents.capacity()).find(|&id| self.agents.try_claim(id, state, born))
    }

    fn init_slot(&self, id: AgentId, position: Vec2, mass: f32) {
        self.agents.set_position(id, position);
        self.agents.set_movement(id, Vec2::ZERO);
        self.agents.set_mass(id, mass);
        self.agents.set_eaten(id, None);
        self.agents.set_awaiting_index(id, false);
    }

    fn advance_last_agent_index(&self, id: AgentId) {
        self.last_agent_index.fetch_max(id + 1, Ordering::AcqRel);
    }

    // Copy the live range under the rendering lock
    pub fn snapshot(&self) -> Snapshot {
        let _guard = self.rendering.lock();
        self.copy_live_range()
    }

    // None while a batch is running
    pub fn try_snapshot(&self) -> Option<Snapshot> {
        let _guard = self.rendering.try_lock()?;
        Some(self.copy_live_range())
    }

    fn copy_live_range(&self) -> Snapshot {
        let n = self.last_agent_index();

        Snapshot {
            positions: (0..n).map(|id| self.agents.position(id)).collect(),
            masses: (0..n).map(|id| self.agents.mass(id)).collect(),
            states: (0..n).map(|id| self.agents.state(id)).collect(),
            step: self.steps_taken(),
            is_done: self.is_done(),
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_index
    }

    pub fn capacity(&self) -> usize {
        self.agents.capacity()
    }

    pub fn iterations(&self) -> u64 {
        self.n_iterations
    }

    pub fn last_agent_index(&self) -> usize {
        self.last_agent_index.load(Ordering::Acquire)
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken.load(Ordering::Relaxed)
    }

    pub fn failed_spawns(&self) -> u64 {
        self.failed_spawns.load(Ordering::Relaxed)
    }

    pub fn is_done(&self) -> bool {
        self.is_done.load(Ordering::Acquire)
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn state(&self, id: AgentId) -> AgentState {
        self.agents.state(id)
    }

    pub fn position(&self, id: AgentId) -> Vec2 {
        self.agents.position(id)
    }

    pub fn movement(&self, id: AgentId) -> Vec2 {
        self.agents.movement(id)
    }

    pub fn mass(&self, id: AgentId) -> f32 {
        self.agents.mass(id)
    }

    pub fn eaten(&self, id: AgentId) -> Option<AgentId> {
        self.agents.eaten(id)
    }

    pub fn awaits_index(&self, id: AgentId) -> bool {
        self.agents.awaits_index(id)
    }

    pub fn census(&self) -> Census {
        self.agents.census(self.last_agent_index())
    }

    pub fn live_count(&self) -> usize {
        self.census().alive()
    }

    pub fn total_mass(&self) -> f32 {
        (0..self.last_agent_index())
            .filter(|&id| self.agents.state(id).is_alive())
            .map(|id| self.agents.mass(id))
            .sum()
    }
}

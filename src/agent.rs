/*
 * Agent Module
 *
 * This module defines the agent table: a fixed-capacity structure of
 * arrays indexed by dense agent ids. Every per-slot field is an atomic cell
 * so that worker threads can read other agents while their owners update
 * them, and so that lifecycle changes can be arbitrated by compare-and-swap
 * on the state field alone.
 *
 * Slots are never added or removed after construction. A dead slot is
 * simply inert until a later spawn claims it again.
 */

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use crate::vec2::{vec2, Vec2};

pub type AgentId = usize;

// Encoded "no agent" for the eaten field
pub(crate) const NO_AGENT: usize = usize::MAX;

// Born-step value for agents that were placed between steps
pub(crate) const NEVER: u64 = u64::MAX;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentState {
    Incubating = 0,
    Hunting = 1,
    Splitting = 2,
    Dead = 3,
}

impl AgentState {
    #[inline]
    fn from_u8(value: u8) -> Self {
        match value {
            0 => AgentState::Incubating,
            1 => AgentState::Hunting,
            2 => AgentState::Splitting,
            _ => AgentState::Dead,
        }
    }

    #[inline]
    pub fn is_alive(self) -> bool {
        self != AgentState::Dead
    }
}

pub struct AtomicState(AtomicU8);

impl AtomicState {
    pub fn new(state: AgentState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn load(&self) -> AgentState {
        AgentState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, state: AgentState) {
        self.0.store(state as u8, Ordering::Release);
    }

    // Succeeds for exactly one caller when several race on the same slot
    #[inline]
    pub fn compare_exchange(&self, current: AgentState, new: AgentState) -> Result<AgentState, AgentState> {
        self.0
            .compare_exchange(current as u8, new as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(AgentState::from_u8)
            .map_err(AgentState::from_u8)
    }
}

// f32 stored as its bit pattern
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

// Components are individually atomic; a reader racing a writer may see a
// mix of old x and new y, which the engine tolerates for other agents
pub struct AtomicVec2 {
    x: AtomicF32,
    y: AtomicF32,
}

impl AtomicVec2 {
    pub fn new(value: Vec2) -> Self {
        Self {
            x: AtomicF32::new(value.x),
            y: AtomicF32::new(value.y),
        }
    }

    #[inline]
    pub fn load(&self) -> Vec2 {
        vec2(self.x.load(), self.y.load())
    }

    #[inline]
    pub fn store(&self, value: Vec2) {
        self.x.store(value.x);
        self.y.store(value.y);
    }
}

// Population per state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    pub incubating: usize,
    pub hunting: usize,
    pub splitting: usize,
    pub dead: usize,
}

impl Census {
    #[inline]
    pub fn record(&mut self, state: AgentState) {
        match state {
            AgentState::Incubating => self.incubating += 1,
            AgentState::Hunting => self.hunting += 1,
            AgentState::Splitting => self.splitting += 1,
            AgentState::Dead => self.dead += 1,
        }
    }

    pub fn alive(&self) -> usize {
        self.incubating + self.hunting + self.splitting
    }
}

pub struct AgentTable {
    positions: Box<[AtomicVec2]>,
    movements: Box<[AtomicVec2]>,
    masses: Box<[AtomicF32]>,
    states: Box<[AtomicState]>,
    eaten: Box<[AtomicUsize]>,
    born_step: Box<[AtomicU64]>,
    awaiting_index: Box<[AtomicBool]>,
}

impl AgentTable {
    // Every slot starts out dead
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: (0..capacity).map(|_| AtomicVec2::new(Vec2::ZERO)).collect(),
            movements: (0..capacity).map(|_| AtomicVec2::new(Vec2::ZERO)).collect(),
            masses: (0..capacity).map(|_| AtomicF32::new(0.0)).collect(),
            states: (0..capacity).map(|_| AtomicState::new(AgentState::Dead)).collect(),
            eaten: (0..capacity).map(|_| AtomicUsize::new(NO_AGENT)).collect(),
            born_step: (0..capacity).map(|_| AtomicU64::new(NEVER)).collect(),
            awaiting_index: (0..capacity).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn state(&self, id: AgentId) -> AgentState {
        self.states[id].load()
    }

    #[inline]
    pub fn position(&self, id: AgentId) -> Vec2 {
        self.positions[id].load()
    }

    #[inline]
    pub fn movement(&self, id: AgentId) -> Vec2 {
        self.movements[id].load()
    }

    #[inline]
    pub fn mass(&self, id: AgentId) -> f32 {
        self.masses[id].load()
    }

    #[inline]
    pub fn eaten(&self, id: AgentId) -> Option<AgentId> {
        match self.eaten[id].load(Ordering::Relaxed) {
            NO_AGENT => None,
            victim => Some(victim),
        }
    }

    #[inline]
    pub fn awaits_index(&self, id: AgentId) -> bool {
        self.awaiting_index[id].load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn born_step(&self, id: AgentId) -> u64 {
        self.born_step[id].load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn state_cell(&self, id: AgentId) -> &AtomicState {
        &self.states[id]
    }

    #[inline]
    pub(crate) fn set_position(&self, id: AgentId, position: Vec2) {
        self.positions[id].store(position);
    }

    #[inline]
    pub(crate) fn set_movement(&self, id: AgentId, movement: Vec2) {
        self.movements[id].store(movement);
    }

    #[inline]
    pub(crate) fn set_mass(&self, id: AgentId, mass: f32) {
        self.masses[id].store(mass);
    }

    #[inline]
    pub(crate) fn set_eaten(&self, id: AgentId, victim: Option<AgentId>) {
        self.eaten[id].store(victim.unwrap_or(NO_AGENT), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_awaiting_index(&self, id: AgentId, awaiting: bool) {
        self.awaiting_index[id].store(awaiting, Ordering::Relaxed);
    }

    // Try to move a dead slot into `state`. The born step is stamped before
    // the swap so that any thread observing the new state also sees it.
    pub(crate) fn try_claim(&self, id: AgentId, state: AgentState, born: u64) -> bool {
        let cell = &self.states[id];
        if cell.load() != AgentState::Dead {
            return false;
        }
        self.born_step[id].store(born, Ordering::Relaxed);
        cell.compare_exchange(AgentState::Dead, state).is_ok()
    }

    pub fn census(&self, range: usize) -> Census {
        let mut census = Census::default();
        for cell in &self.states[..range.min(self.capacity())] {
            census.record(cell.load());
        }
        census
    }
}

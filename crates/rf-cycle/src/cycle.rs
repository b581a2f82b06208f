//! Cycles — the ordered queue of game cycles for one round
//!
//! A round starts with a single base game cycle. Triggers append or insert
//! new cycle families (free games, respins); retriggers extend an existing
//! family. The round is over when every entry is finished.

use serde::{Deserialize, Serialize};

use crate::error::{CycleError, CycleResult};
use crate::modifier::TriggerPosition;
use crate::stage::StageName;

/// Stable identity of a cycle family
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleId(pub String);

impl CycleId {
    /// Id used for the base game cycle of every round
    pub const BASE_GAME: &'static str = "BaseGame";

    /// Create a new cycle ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The base game cycle id
    pub fn base_game() -> Self {
        Self::new(Self::BASE_GAME)
    }

    /// Get the ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CycleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CycleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the cycle queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    /// Cycle family identity
    pub id: CycleId,
    /// Logic stage this cycle runs
    pub stage: StageName,
    /// Number of cycles awarded to this family
    pub total_cycles: u32,
    /// Number of cycles already played
    pub completed_cycles: u32,
}

impl CycleState {
    /// Create a fresh cycle family with nothing played yet
    pub fn new(id: impl Into<CycleId>, stage: impl Into<StageName>, total_cycles: u32) -> Self {
        Self {
            id: id.into(),
            stage: stage.into(),
            total_cycles,
            completed_cycles: 0,
        }
    }

    /// True exactly when every awarded cycle has been played
    pub fn is_finished(&self) -> bool {
        self.completed_cycles >= self.total_cycles
    }

    /// Cycles left to play
    pub fn remaining(&self) -> u32 {
        self.total_cycles.saturating_sub(self.completed_cycles)
    }

    /// True while playing the last allotted cycle of the family
    pub fn is_last_attempt(&self) -> bool {
        self.remaining() == 1
    }

    /// Builder: set completed count
    pub fn with_completed(mut self, completed: u32) -> Self {
        self.completed_cycles = completed;
        self
    }
}

/// Ordered queue of pending and completed cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycles {
    states: Vec<CycleState>,
}

impl Cycles {
    /// Create a queue holding a single cycle
    pub fn new(first: CycleState) -> Self {
        Self {
            states: vec![first],
        }
    }

    /// Create the queue for a new round: one base game cycle
    pub fn base_game(stage: impl Into<StageName>) -> Self {
        Self::new(CycleState::new(CycleId::base_game(), stage, 1))
    }

    /// The cycle to play next (first unfinished entry)
    pub fn current(&self) -> Option<&CycleState> {
        self.states.iter().find(|s| !s.is_finished())
    }

    fn current_index(&self) -> Option<usize> {
        self.states.iter().position(|s| !s.is_finished())
    }

    /// True when every entry is finished
    pub fn is_finished(&self) -> bool {
        self.current().is_none()
    }

    /// Latest entry of a cycle family
    pub fn get(&self, id: &CycleId) -> Option<&CycleState> {
        self.states.iter().rev().find(|s| &s.id == id)
    }

    /// All entries in queue order
    pub fn iter(&self) -> impl Iterator<Item = &CycleState> {
        self.states.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Mark one cycle of the current entry as played
    pub fn complete_current(&self) -> CycleResult<Cycles> {
        let index = self.current_index().ok_or(CycleError::NoPendingCycle)?;
        let mut states = self.states.clone();
        states[index].completed_cycles += 1;
        Ok(Self { states })
    }

    /// Insert a new entry into the pending part of the queue
    ///
    /// `Front` places it before every other pending entry; `AtEnd` after
    /// all of them.
    pub fn insert(&self, state: CycleState, position: TriggerPosition) -> Cycles {
        let mut states = self.states.clone();
        match position {
            TriggerPosition::AtEnd => states.push(state),
            TriggerPosition::Front => {
                let at = self.current_index().unwrap_or(states.len());
                states.insert(at, state);
            }
        }
        Self { states }
    }

    /// Award additional cycles to the latest entry of a family
    pub fn extend(&self, id: &CycleId, additional: u32) -> CycleResult<Cycles> {
        let index = self
            .states
            .iter()
            .rposition(|s| &s.id == id)
            .ok_or_else(|| CycleError::UnknownCycle(id.clone()))?;
        let mut states = self.states.clone();
        states[index].total_cycles = states[index].total_cycles.saturating_add(additional);
        Ok(Self { states })
    }

    /// Re-arm a family so that exactly `remaining` cycles are left
    pub fn reset_remaining(&self, id: &CycleId, remaining: u32) -> CycleResult<Cycles> {
        let index = self
            .states
            .iter()
            .rposition(|s| &s.id == id)
            .ok_or_else(|| CycleError::UnknownCycle(id.clone()))?;
        let mut states = self.states.clone();
        let state = &mut states[index];
        state.total_cycles = state.completed_cycles.saturating_add(remaining);
        Ok(Self { states })
    }
}

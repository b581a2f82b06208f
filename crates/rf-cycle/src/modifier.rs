//! Cycle modifiers — pure edits of the cycle queue
//!
//! A modifier is applied as `(Cycles, current cycle, target stage) -> Cycles`.
//! The current cycle passed in is the one that just finished playing, with its
//! completed count already advanced.

use serde::{Deserialize, Serialize};

use crate::cycle::{CycleId, CycleState, Cycles};
use crate::error::CycleResult;
use crate::stage::StageName;

/// Where a triggered cycle family enters the pending queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPosition {
    /// After every pending cycle
    #[default]
    AtEnd,
    /// Before every pending cycle
    Front,
}

/// An edit of the cycle queue requested by a stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CyclesModifier {
    /// Start a new cycle family running the target stage
    Trigger {
        cycle_id: CycleId,
        count: u32,
        #[serde(default)]
        position: TriggerPosition,
    },

    /// Award more cycles to an existing family
    Retrigger { cycle_id: CycleId, count: u32 },

    /// Re-arm the current family so `count` cycles remain (respin hit)
    RespinReset { count: u32 },
}

impl CyclesModifier {
    /// Create a trigger at the end of the queue
    pub fn trigger(cycle_id: impl Into<CycleId>, count: u32) -> Self {
        Self::Trigger {
            cycle_id: cycle_id.into(),
            count,
            position: TriggerPosition::AtEnd,
        }
    }

    /// Create a retrigger for a family
    pub fn retrigger(cycle_id: impl Into<CycleId>, count: u32) -> Self {
        Self::Retrigger {
            cycle_id: cycle_id.into(),
            count,
        }
    }

    /// Builder: set trigger position (no effect on other variants)
    pub fn at(mut self, at: TriggerPosition) -> Self {
        if let Self::Trigger { position, .. } = &mut self {
            *position = at;
        }
        self
    }

    /// Apply the modifier
    pub fn apply(
        &self,
        cycles: &Cycles,
        current: &CycleState,
        target_stage: &StageName,
    ) -> CycleResult<Cycles> {
        match self {
            Self::Trigger {
                cycle_id,
                count,
                position,
            } => {
                log::debug!(
                    "[Cycles] Trigger {} x{} -> {} ({:?})",
                    cycle_id,
                    count,
                    target_stage,
                    position
                );
                Ok(cycles.insert(
                    CycleState::new(cycle_id.clone(), target_stage.clone(), *count),
                    *position,
                ))
            }
            Self::Retrigger { cycle_id, count } => {
                log::debug!("[Cycles] Retrigger {} +{}", cycle_id, count);
                cycles.extend(cycle_id, *count)
            }
            Self::RespinReset { count } => {
                log::debug!("[Cycles] Respin reset {} to {}", current.id, count);
                cycles.reset_remaining(&current.id, *count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after_base() -> (Cycles, CycleState) {
        let cycles = Cycles::base_game("Base").complete_current().unwrap();
        let current = cycles.iter().next().unwrap().clone();
        (cycles, current)
    }

    #[test]
    fn test_trigger_inserts_family() {
        let (cycles, current) = after_base();
        let next = CyclesModifier::trigger("FreeGames", 8)
            .apply(&cycles, &current, &StageName::new("Free"))
            .unwrap();

        let state = next.current().unwrap();
        assert_eq!(state.id.as_str(), "FreeGames");
        assert_eq!(state.stage.as_str(), "Free");
        assert_eq!(state.total_cycles, 8);
    }

    #[test]
    fn test_retrigger_extends_family() {
        let cycles = Cycles::new(CycleState::new("FreeGames", "Free", 3))
            .complete_current()
            .unwrap();
        let current = cycles.current().unwrap().clone();
        let next = CyclesModifier::retrigger("FreeGames", 5)
            .apply(&cycles, &current, &StageName::new("Free"))
            .unwrap();
        assert_eq!(next.current().unwrap().total_cycles, 8);
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_respin_reset() {
        let cycles = Cycles::new(CycleState::new("Respin", "Respin", 3))
            .complete_current()
            .unwrap();
        let current = cycles.current().unwrap().clone();
        let next = CyclesModifier::RespinReset { count: 3 }
            .apply(&cycles, &current, &StageName::new("Respin"))
            .unwrap();
        assert_eq!(next.current().unwrap().remaining(), 3);
    }

    #[test]
    fn test_position_builder_only_affects_trigger() {
        let front = CyclesModifier::trigger("A", 1).at(TriggerPosition::Front);
        assert!(matches!(
            front,
            CyclesModifier::Trigger {
                position: TriggerPosition::Front,
                ..
            }
        ));
        let retrigger = CyclesModifier::retrigger("A", 1).at(TriggerPosition::Front);
        assert_eq!(retrigger, CyclesModifier::retrigger("A", 1));
    }
}

//! Prize triggers — paid prizes that start or extend cycle families

use serde::{Deserialize, Serialize};

use rf_cycle::{CycleId, CycleState, CyclesModifier, DesiredExit, TriggerPosition};

use crate::prize::CellPrizeResult;

/// `(prize, count)` → cycles of a family, leaving through `exit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTrigger {
    /// Prize name to watch for
    pub prize: String,
    /// Hit count the prize must have
    pub count: usize,
    /// Family the trigger awards
    pub cycle_id: CycleId,
    /// Cycles awarded
    pub cycles: u32,
    /// Exit name used for stage routing
    pub exit: String,
}

impl PrizeTrigger {
    /// Create a trigger entry
    pub fn new(
        prize: impl Into<String>,
        count: usize,
        cycle_id: impl Into<CycleId>,
        cycles: u32,
        exit: impl Into<String>,
    ) -> Self {
        Self {
            prize: prize.into(),
            count,
            cycle_id: cycle_id.into(),
            cycles,
            exit: exit.into(),
        }
    }

    fn matches(&self, prize: &CellPrizeResult) -> bool {
        prize.name == self.prize && prize.count == self.count
    }
}

/// Exits for every trigger entry matched by a paid prize
///
/// Inside the awarded family the entry retriggers the current cycle's
/// family; anywhere else it triggers a new family at `position`. Each entry
/// fires at most once per call. The result depends only on the arguments.
pub fn check_for_prize_triggers(
    prizes: &[CellPrizeResult],
    table: &[PrizeTrigger],
    current: &CycleState,
    position: TriggerPosition,
) -> Vec<DesiredExit> {
    table
        .iter()
        .filter(|entry| prizes.iter().any(|p| entry.matches(p)))
        .map(|entry| {
            let modifier = if current.id == entry.cycle_id {
                CyclesModifier::retrigger(current.id.clone(), entry.cycles)
            } else {
                CyclesModifier::trigger(entry.cycle_id.clone(), entry.cycles).at(position)
            };
            log::debug!("[Trigger] {} x{} -> {}", entry.prize, entry.count, entry.exit);
            DesiredExit::new(entry.exit.clone(), modifier)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::CellMask;
    use crate::prize::PrizeKind;

    fn scatter(count: usize) -> CellPrizeResult {
        CellPrizeResult {
            name: "SCAT".into(),
            count,
            value: 2,
            pattern: "Scatter".into(),
            line: None,
            winning_mask: CellMask::from_indexes(15, 0..count).unwrap(),
            kind: PrizeKind::Standard,
        }
    }

    fn table() -> Vec<PrizeTrigger> {
        vec![
            PrizeTrigger::new("SCAT", 3, "FreeGames", 8, "FreeGames"),
            PrizeTrigger::new("SCAT", 4, "FreeGames", 12, "FreeGames"),
        ]
    }

    #[test]
    fn test_trigger_from_base() {
        let base = CycleState::new(CycleId::base_game(), "Base", 1);
        let exits = check_for_prize_triggers(&[scatter(3)], &table(), &base, TriggerPosition::AtEnd);
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].name, "FreeGames");
        assert_eq!(exits[0].modifier, CyclesModifier::trigger("FreeGames", 8));
    }

    #[test]
    fn test_retrigger_inside_family() {
        let free = CycleState::new("FreeGames", "Free", 8).with_completed(3);
        let exits = check_for_prize_triggers(&[scatter(4)], &table(), &free, TriggerPosition::Front);
        assert_eq!(exits[0].modifier, CyclesModifier::retrigger("FreeGames", 12));
    }

    #[test]
    fn test_position_applies_to_triggers() {
        let base = CycleState::new(CycleId::base_game(), "Base", 1);
        let exits = check_for_prize_triggers(&[scatter(3)], &table(), &base, TriggerPosition::Front);
        assert_eq!(
            exits[0].modifier,
            CyclesModifier::trigger("FreeGames", 8).at(TriggerPosition::Front)
        );
    }

    #[test]
    fn test_pure_and_no_match() {
        let base = CycleState::new(CycleId::base_game(), "Base", 1);
        let prizes = [scatter(3), scatter(5)];
        let first = check_for_prize_triggers(&prizes, &table(), &base, TriggerPosition::AtEnd);
        let second = check_for_prize_triggers(&prizes, &table(), &base, TriggerPosition::AtEnd);
        assert_eq!(first, second);
        assert!(check_for_prize_triggers(&[scatter(2)], &table(), &base, TriggerPosition::AtEnd).is_empty());
    }
}

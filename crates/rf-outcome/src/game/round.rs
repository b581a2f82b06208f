//! Round driver — walks the cycle queue from the base game to the end

use serde::{Deserialize, Serialize};

use rf_cycle::{CycleState, Cycles, Inputs};

use crate::config::{BetContext, EngineConfig};
use crate::decision::{DecisionGenerator, DecisionTrace};
use crate::error::{OutcomeError, OutcomeResult};
use crate::metrics::MetricsSink;
use crate::prize::CellPrizeResult;

use super::logic::GameLogic;

/// One played cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    /// The cycle as it was played (before completion)
    pub cycle: CycleState,
    pub awards: Vec<CellPrizeResult>,
    pub win: i64,
}

/// Everything a round produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Played cycles in play order
    pub cycles: Vec<CycleOutcome>,
    pub total_win: i64,
    /// Decisions of the round; empty when recording is off
    pub trace: DecisionTrace,
    /// Inputs left for the next round (permanent variables)
    pub inputs: Inputs,
}

impl RoundResult {
    /// Number of cycles played
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Did anything pay?
    pub fn is_win(&self) -> bool {
        self.total_win > 0
    }

    /// Cycles played in one family
    pub fn cycles_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a CycleOutcome> + 'a {
        self.cycles.iter().filter(move |c| c.cycle.id.as_str() == id)
    }
}

/// Play one full round
///
/// Starts a queue with one base game cycle and plays the current cycle
/// until every cycle is finished. Each cycle's decisions are labelled under
/// a `"{cycle id}#{attempt}"` scope.
pub fn play_round<L: GameLogic + ?Sized>(
    logic: &L,
    inputs: &Inputs,
    bet: &BetContext,
    generator: DecisionGenerator,
    config: &EngineConfig,
    metrics: &dyn MetricsSink,
) -> OutcomeResult<RoundResult> {
    metrics.record("play_round");
    let mut generator = generator;
    let mut cycles = Cycles::base_game(logic.base_stage());
    let mut inputs = inputs.clone();
    let mut played = Vec::new();
    let mut total_win = 0i64;

    while let Some(current) = cycles.current().cloned() {
        if played.len() as u64 >= u64::from(config.max_cycles_per_round) {
            log::warn!(
                "[Round] Cycle limit {} reached in {}",
                config.max_cycles_per_round,
                current.id
            );
            return Err(OutcomeError::CycleLimitExceeded(config.max_cycles_per_round));
        }

        log::debug!(
            "[Round] {} {} ({}/{})",
            current.id,
            current.stage,
            current.completed_cycles + 1,
            current.total_cycles
        );
        metrics.record("execute_stage");

        let results = {
            let mut scoped = generator.scoped(format!("{}#{}", current.id, current.completed_cycles + 1));
            logic.execute_stage(&current, &inputs, bet, &mut scoped)?
        };
        let results = logic.modify_result_post_cycle(&current, results)?;
        let win = results.total_win()?;
        total_win = total_win
            .checked_add(win)
            .ok_or_else(|| OutcomeError::MultiplierOverflow("round total".to_string()))?;

        let completed = cycles.complete_current()?;
        let done = current.clone().with_completed(current.completed_cycles + 1);
        cycles = logic.process_triggers(&completed, &done, &results)?;
        inputs = logic.create_inputs_for_cycle(&cycles, &inputs, &results)?;

        played.push(CycleOutcome {
            cycle: current,
            awards: results.awards,
            win,
        });
    }

    log::debug!("[Round] Finished: {} cycles, win {}", played.len(), total_win);
    Ok(RoundResult {
        cycles: played,
        total_win,
        trace: generator.into_trace(),
        inputs,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use rf_cycle::{
        CycleId, CyclesModifier, DesiredExit, StageConnection, StageName, StageResult,
    };

    use super::*;
    use crate::game::StageResults;
    use crate::mask::CellMask;
    use crate::metrics::{CallMetrics, NoMetrics};
    use crate::prize::PrizeKind;

    fn award(value: i64) -> CellPrizeResult {
        CellPrizeResult {
            name: "Win".into(),
            count: 1,
            value,
            pattern: "Line1".into(),
            line: Some(0),
            winning_mask: CellMask::all_false(3),
            kind: PrizeKind::Standard,
        }
    }

    /// Base pays 5 and triggers 3 free games paying 1, 2, 3
    struct ScriptedGame {
        connections: Vec<StageConnection>,
    }

    impl ScriptedGame {
        fn new() -> Self {
            Self {
                connections: vec![StageConnection::new("Base", "Free", "FreeStage")],
            }
        }
    }

    impl GameLogic for ScriptedGame {
        fn base_stage(&self) -> StageName {
            StageName::new("Base")
        }

        fn connections(&self) -> &[StageConnection] {
            &self.connections
        }

        fn execute_stage(
            &self,
            cycle: &CycleState,
            inputs: &Inputs,
            _bet: &BetContext,
            generator: &mut DecisionGenerator,
        ) -> OutcomeResult<StageResults> {
            generator.choose_one_index(&vec![1u64, 1], || "Coin".into())?;
            if cycle.stage.as_str() == "Base" {
                return Ok(StageResults::new()
                    .with_awards([award(5)])
                    .with_exit(DesiredExit::new("Free", CyclesModifier::trigger("FreeGames", 3)))
                    .with_variable(StageResult::one_game("Seen", json!(0))));
            }
            let seen = inputs.value::<i64>("Seen").unwrap_or(-1);
            Ok(StageResults::new()
                .with_awards([award(i64::from(cycle.completed_cycles) + 1)])
                .with_variable(StageResult::one_game("Seen", json!(seen + 1))))
        }
    }

    #[test]
    fn test_round_walks_every_cycle() {
        let game = ScriptedGame::new();
        let metrics = CallMetrics::new();
        let result = play_round(
            &game,
            &Inputs::new(),
            &BetContext::default(),
            DecisionGenerator::seeded(1),
            &EngineConfig::default(),
            &metrics,
        )
        .unwrap();

        assert_eq!(result.cycle_count(), 4);
        assert_eq!(result.total_win, 5 + 1 + 2 + 3);
        assert_eq!(result.cycles_of("FreeGames").count(), 3);
        assert!(result.cycles_of("FreeGames").all(|c| c.cycle.stage.as_str() == "FreeStage"));
        assert_eq!(
            result.trace.labels(),
            vec!["BaseGame#1/Coin", "FreeGames#1/Coin", "FreeGames#2/Coin", "FreeGames#3/Coin"]
        );
        // One-game variables are gone once the round ends
        assert!(result.inputs.is_empty());
        assert_eq!(metrics.count("execute_stage"), 4);
        assert_eq!(metrics.count("play_round"), 1);
    }

    #[test]
    fn test_replay_reproduces_round() {
        let game = ScriptedGame::new();
        let first = play_round(
            &game,
            &Inputs::new(),
            &BetContext::default(),
            DecisionGenerator::seeded(9),
            &EngineConfig::default(),
            &NoMetrics,
        )
        .unwrap();
        let replayed = play_round(
            &game,
            &Inputs::new(),
            &BetContext::default(),
            DecisionGenerator::replay(&first.trace),
            &EngineConfig::default(),
            &NoMetrics,
        )
        .unwrap();
        assert_eq!(first, replayed);
    }

    /// Retriggers itself forever
    struct Runaway;

    impl GameLogic for Runaway {
        fn base_stage(&self) -> StageName {
            StageName::new("Base")
        }

        fn execute_stage(
            &self,
            cycle: &CycleState,
            _inputs: &Inputs,
            _bet: &BetContext,
            _generator: &mut DecisionGenerator,
        ) -> OutcomeResult<StageResults> {
            let modifier = if cycle.id == CycleId::base_game() {
                CyclesModifier::trigger("Loop", 1)
            } else {
                CyclesModifier::retrigger("Loop", 1)
            };
            Ok(StageResults::new().with_exit(DesiredExit::new("Loop", modifier)))
        }
    }

    #[test]
    fn test_cycle_limit_stops_runaway_rounds() {
        let result = play_round(
            &Runaway,
            &Inputs::new(),
            &BetContext::default(),
            DecisionGenerator::seeded(1),
            &EngineConfig::default().with_max_cycles(20),
            &NoMetrics,
        );
        assert_eq!(result, Err(OutcomeError::CycleLimitExceeded(20)));
    }
}

//! Stage results and the game logic hooks

use rf_cycle::{CycleState, Cycles, DesiredExit, Inputs, StageConnection, StageName, StageResult};

use crate::config::BetContext;
use crate::decision::DecisionGenerator;
use crate::error::{OutcomeError, OutcomeResult};
use crate::prize::CellPrizeResult;

/// Everything one stage execution produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageResults {
    /// Paid prizes
    pub awards: Vec<CellPrizeResult>,
    /// Exits the stage asks for
    pub exits: Vec<DesiredExit>,
    /// Variable-kind results carried into the next cycle's inputs
    pub variables: Vec<StageResult>,
}

impl StageResults {
    /// Empty results
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add awards
    pub fn with_awards(mut self, awards: impl IntoIterator<Item = CellPrizeResult>) -> Self {
        self.awards.extend(awards);
        self
    }

    /// Builder: add an exit
    pub fn with_exit(mut self, exit: DesiredExit) -> Self {
        self.exits.push(exit);
        self
    }

    /// Builder: add a variable result
    pub fn with_variable(mut self, variable: StageResult) -> Self {
        self.variables.push(variable);
        self
    }

    /// Sum of award values
    pub fn total_win(&self) -> OutcomeResult<i64> {
        self.awards.iter().try_fold(0i64, |acc, award| {
            acc.checked_add(award.value)
                .ok_or_else(|| OutcomeError::MultiplierOverflow(award.name.clone()))
        })
    }
}

/// A game title: its stages plus the hooks the round driver calls
///
/// Only `execute_stage` is required. The other hooks default to the stock
/// cycle orchestration and can be overridden per title.
pub trait GameLogic: Send + Sync {
    /// Stage the base game runs
    fn base_stage(&self) -> StageName;

    /// Stage connections for exit routing
    fn connections(&self) -> &[StageConnection] {
        &[]
    }

    /// Play one cycle of `cycle.stage`
    fn execute_stage(
        &self,
        cycle: &CycleState,
        inputs: &Inputs,
        bet: &BetContext,
        generator: &mut DecisionGenerator,
    ) -> OutcomeResult<StageResults>;

    /// Inputs for the cycle after `results`
    fn create_inputs_for_cycle(
        &self,
        cycles: &Cycles,
        inputs: &Inputs,
        results: &StageResults,
    ) -> OutcomeResult<Inputs> {
        Ok(rf_cycle::create_inputs_for_cycle(cycles, inputs, &results.variables)?)
    }

    /// Apply the stage's exits; `current` is the cycle just completed
    fn process_triggers(
        &self,
        cycles: &Cycles,
        current: &CycleState,
        results: &StageResults,
    ) -> OutcomeResult<Cycles> {
        Ok(rf_cycle::process_triggers(
            cycles,
            current,
            &results.exits,
            self.connections(),
        )?)
    }

    /// Reshape results after a cycle, before triggers are processed
    fn modify_result_post_cycle(
        &self,
        _cycle: &CycleState,
        results: StageResults,
    ) -> OutcomeResult<StageResults> {
        Ok(results)
    }
}

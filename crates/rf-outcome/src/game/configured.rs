//! ConfiguredGame — a [`GameLogic`] driven entirely by a [`Paytable`]
//!
//! Spin stages draw stops, expand and replace symbols, evaluate every prize
//! table, apply multipliers and check prize and respin triggers. Respin
//! stages spin one strip per cell and run the respin state machine.

use std::collections::BTreeMap;
use std::sync::Arc;

use rf_cycle::{
    CycleError, CycleState, CyclesModifier, DesiredExit, Inputs, StageConnection, StageName,
    StageResult, TriggerPosition,
};

use crate::cascade::{ReplacedCells, apply_replacements_to_symbol_window};
use crate::config::{BetContext, ConfigResult, GameConfig};
use crate::decision::DecisionGenerator;
use crate::error::{OutcomeError, OutcomeResult};
use crate::evaluate::{evaluate_lines, evaluate_scatters, evaluate_ways};
use crate::mask::CellMask;
use crate::multiplier::{apply_multiplier, apply_symbol_multiplier};
use crate::paytable::{Paytable, RespinSetup, StageDef, StageKind};
use crate::prize::{CellPrizeResult, LineSelection};
use crate::replacement::{ReplacementBuilder, add_dependent_replacements, add_independent_replacements};
use crate::respin::{
    RespinContext, RespinState, covered_populations, evaluate_respin, evaluate_respin_trigger,
};
use crate::strip::SharedStrip;
use crate::window::{
    SymbolWindowResult, choose_stops, create_locked_symbol_window_result, create_symbol_window_result,
};

use super::logic::{GameLogic, StageResults};
use super::trigger::check_for_prize_triggers;

/// Variable carrying the respin state between cycles
pub const RESPIN_STATE: &str = "RespinState";

/// Variable carrying the trigger window's held cells into the first respin
pub const RESPIN_HELD: &str = "RespinHeld";

/// Data-driven game
#[derive(Debug, Clone)]
pub struct ConfiguredGame {
    paytable: Paytable,
}

impl ConfiguredGame {
    /// Wrap a resolved paytable
    pub fn new(paytable: Paytable) -> Self {
        Self { paytable }
    }

    /// Resolve a game config and wrap it
    pub fn from_config(config: &GameConfig) -> ConfigResult<Self> {
        Ok(Self::new(config.resolve()?))
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    fn respin_setup(&self, stage: &StageDef) -> OutcomeResult<&RespinSetup> {
        self.paytable
            .respin
            .as_ref()
            .ok_or_else(|| OutcomeError::UnknownStage(format!("{} has no respin feature", stage.name)))
    }

    /// Stage strips with any drawn replacements compiled in
    fn stage_strips(stage: &StageDef, generator: &mut DecisionGenerator) -> OutcomeResult<Vec<SharedStrip>> {
        let Some(setup) = &stage.replacements else {
            return Ok(stage.strips.clone());
        };
        let weight = |candidate: usize| setup.weights.get(candidate).copied().unwrap_or(0);
        let mut builder = ReplacementBuilder::new(stage.strips.clone());
        if setup.dependent {
            add_dependent_replacements(
                &mut builder,
                &setup.targets,
                &setup.candidates,
                weight,
                setup.distinct,
                generator,
            )?;
        } else {
            add_independent_replacements(
                &mut builder,
                &setup.targets,
                &setup.candidates,
                |_, candidate| weight(candidate),
                setup.distinct,
                generator,
            )?;
        }
        Ok(builder.finalise().into_strips())
    }

    fn stage_multiplier(stage: &StageDef, bet: &BetContext) -> OutcomeResult<i64> {
        bet.multiplier
            .checked_mul(stage.multiplier)
            .ok_or_else(|| OutcomeError::MultiplierOverflow(stage.name.to_string()))
    }

    /// Redraw the stage's mystery symbols, recording the replaced cells
    fn reveal_mystery(
        stage: &StageDef,
        window: SymbolWindowResult,
        generator: &mut DecisionGenerator,
    ) -> OutcomeResult<(SymbolWindowResult, ReplacedCells)> {
        if stage.mystery.is_empty() {
            return Ok((window, ReplacedCells::default()));
        }
        apply_replacements_to_symbol_window(
            &window,
            &stage.mystery,
            &BTreeMap::new(),
            generator,
            ReplacedCells::default(),
        )
    }

    /// Every prize table against one window
    fn evaluate(&self, window: &SymbolWindowResult, bet: &BetContext) -> OutcomeResult<Vec<CellPrizeResult>> {
        let paytable = &self.paytable;
        let selection = match bet.line_count {
            0 => LineSelection::All,
            n => LineSelection::First(n as usize),
        };

        let mut prizes = Vec::new();
        if !paytable.line_prizes.is_empty() {
            prizes.extend(evaluate_lines(
                window,
                &paytable.lines,
                &paytable.line_prizes,
                selection,
                paytable.pay_best,
            )?);
        }
        if !paytable.ways_prizes.is_empty() {
            prizes.extend(evaluate_ways(window, &paytable.ways, &paytable.ways_prizes)?);
        }
        if !paytable.scatter_prizes.is_empty() {
            prizes.extend(evaluate_scatters(window, &paytable.scatters, &paytable.scatter_prizes)?);
        }
        Ok(prizes)
    }

    fn spin_stage(
        &self,
        stage: &StageDef,
        cycle: &CycleState,
        bet: &BetContext,
        generator: &mut DecisionGenerator,
    ) -> OutcomeResult<StageResults> {
        let paytable = &self.paytable;
        let strips = Self::stage_strips(stage, generator)?;
        let stops = choose_stops(&strips, None, generator)?;
        let mut window = create_symbol_window_result(&paytable.structure, &paytable.symbols, &strips, &stops)?;

        for &symbol in &stage.expanding {
            window = window.smash_symbol_over_population(symbol)?;
        }
        let (window, replaced) = Self::reveal_mystery(stage, window, generator)?;

        let prizes = self.evaluate(&window, bet)?;
        let exits = check_for_prize_triggers(&prizes, &paytable.triggers, cycle, TriggerPosition::AtEnd);
        let prizes = apply_symbol_multiplier(
            &prizes,
            &window,
            &paytable.symbol_multipliers,
            paytable.multiplier_usage,
            &paytable.multiplier_exclusions,
        )?;
        let prizes = apply_multiplier(&prizes, Self::stage_multiplier(stage, bet)?)?;

        log::debug!(
            "[Game] {} stops {:?}: {} prizes, {} exits",
            stage.name,
            stops,
            prizes.len(),
            exits.len()
        );

        let mut results = StageResults {
            awards: prizes,
            exits,
            variables: Vec::new(),
        };

        if let Some(setup) = &paytable.respin {
            let context = if cycle.id.as_str() == setup.config.cycle_id {
                RespinContext::Respin
            } else {
                RespinContext::Base
            };
            if let Some(trigger) = evaluate_respin_trigger(&window, &setup.config, context, &replaced)? {
                let modifier = CyclesModifier::trigger(setup.config.cycle_id.as_str(), setup.config.initial_count)
                    .at(TriggerPosition::Front);
                results = results
                    .with_exit(DesiredExit::new(setup.exit.clone(), modifier))
                    .with_variable(StageResult::one_game(RESPIN_STATE, state_value(&trigger.state)?))
                    .with_variable(StageResult::one_game(RESPIN_HELD, state_value(&trigger.held)?));
            }
        }
        Ok(results)
    }

    fn respin_stage(
        &self,
        stage: &StageDef,
        cycle: &CycleState,
        inputs: &Inputs,
        bet: &BetContext,
        generator: &mut DecisionGenerator,
    ) -> OutcomeResult<StageResults> {
        let paytable = &self.paytable;
        let setup = self.respin_setup(stage)?;
        let cell_count = paytable.cell_count();
        let state = match inputs.get(RESPIN_STATE) {
            Some(variable) => variable.decode::<RespinState>()?,
            None => RespinState::new(cell_count),
        };

        // First activation holds the trigger cells; later cycles hold the locks
        let held = match (&state.locked, inputs.get(RESPIN_HELD)) {
            (None, Some(variable)) => variable.decode::<Vec<Option<usize>>>()?,
            _ => locked_symbols(&state, cell_count),
        };
        let held_cells = CellMask::from_indexes(
            cell_count,
            held.iter().enumerate().filter(|(_, s)| s.is_some()).map(|(c, _)| c),
        )?;
        let locked = covered_populations(&setup.structure, &held_cells)?;
        let previous = SymbolWindowResult::from_cell_symbols(
            Arc::clone(&paytable.symbols),
            Arc::clone(&setup.structure),
            &held.iter().map(|s| s.unwrap_or(0)).collect::<Vec<_>>(),
        )?;
        let strips = Self::stage_strips(stage, generator)?;
        let stops = choose_stops(&strips, Some(&locked), generator)?;
        let window = create_locked_symbol_window_result(&previous, &strips, &stops, &locked)?;
        let (window, replaced) = Self::reveal_mystery(stage, window, generator)?;

        let evaluation = evaluate_respin(&window, &state, &setup.config, cycle, bet.total_bet, &replaced)?;
        let prizes = apply_multiplier(&evaluation.prizes, Self::stage_multiplier(stage, bet)?)?;

        let mut results = StageResults::new()
            .with_awards(prizes)
            .with_variable(StageResult::one_game(RESPIN_STATE, state_value(&evaluation.state)?));
        if let Some(modifier) = evaluation.modifier {
            results = results.with_exit(DesiredExit::new(setup.exit.clone(), modifier));
        }
        Ok(results)
    }
}

/// Symbol per cell as held by the locked masks
fn locked_symbols(state: &RespinState, cell_count: usize) -> Vec<Option<usize>> {
    let mut cells = vec![None; cell_count];
    for (symbol, mask) in state.locked.iter().flatten().enumerate() {
        for cell in mask.enumerate_indexes() {
            if let Some(slot) = cells.get_mut(cell) {
                *slot = Some(symbol);
            }
        }
    }
    cells
}

fn state_value<T: serde::Serialize>(value: &T) -> OutcomeResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| CycleError::Serialization(e.to_string()).into())
}

impl GameLogic for ConfiguredGame {
    fn base_stage(&self) -> StageName {
        self.paytable.base_stage.clone()
    }

    fn connections(&self) -> &[StageConnection] {
        &self.paytable.connections
    }

    fn execute_stage(
        &self,
        cycle: &CycleState,
        inputs: &Inputs,
        bet: &BetContext,
        generator: &mut DecisionGenerator,
    ) -> OutcomeResult<StageResults> {
        let stage = self.paytable.stage(&cycle.stage)?;
        match stage.kind {
            StageKind::Spin => self.spin_stage(stage, cycle, bet, generator),
            StageKind::Respin => self.respin_stage(stage, cycle, inputs, bet, generator),
        }
    }
}

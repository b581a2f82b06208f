//! Respin feature — locked cells, frames and continuation
//!
//! ## Lifecycle
//!
//! ```text
//! evaluate_respin_trigger ──► RespinState (empty) + held trigger cells
//!                                  │
//!                                  ▼
//!            evaluate_respin ◄─── each respin cycle
//!                  │
//!                  ├── hit      → RespinReset, cycle count re-armed
//!                  └── no hit on the last attempt → is_finished
//! ```
//!
//! The feature never signals its own end: once a cycle without a hit is the
//! last allotted one, the cycle queue simply runs out.
//!
//! Cells listed in a [`ReplacedCells`] record were drawn by a replacement,
//! not landed. They never trigger, hit, lock or pay.

use serde::{Deserialize, Serialize};

use rf_cycle::{CycleState, CyclesModifier};

use crate::cascade::ReplacedCells;
use crate::error::{OutcomeError, OutcomeResult};
use crate::mask::CellMask;
use crate::prize::{CellPrizeResult, MaskPrize};
use crate::window::{SymbolWindowResult, SymbolWindowStructure};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Respin feature configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespinConfig {
    /// Cycle family id of the feature
    pub cycle_id: String,
    /// Symbols that lock and pay
    pub respin_symbols: Vec<usize>,
    /// Symbol that turns its cell into a frame
    #[serde(default)]
    pub frame_symbol: Option<usize>,
    /// Payout for each respin symbol; the first prize matching a symbol wins
    pub prizes: Vec<MaskPrize>,
    /// Symbols counted by the trigger
    pub trigger_symbols: Vec<usize>,
    /// Minimum visible trigger symbols
    pub trigger_threshold: usize,
    /// Cycles awarded by the trigger
    pub initial_count: u32,
    /// Cycles left after any hit
    pub reset_count: u32,
}

impl Default for RespinConfig {
    fn default() -> Self {
        Self {
            cycle_id: "Respin".to_string(),
            respin_symbols: Vec::new(),
            frame_symbol: None,
            prizes: Vec::new(),
            trigger_symbols: Vec::new(),
            trigger_threshold: 6,
            initial_count: 3,
            reset_count: 3,
        }
    }
}

impl RespinConfig {
    /// Prize paid for a symbol
    pub fn prize_for(&self, symbol: usize) -> Option<&MaskPrize> {
        self.prizes.iter().find(|p| p.matches(symbol))
    }

    /// First trigger symbol whose prize is progressive
    pub fn progressive_trigger_symbol(&self) -> Option<usize> {
        self.trigger_symbols
            .iter()
            .copied()
            .find(|&s| self.prize_for(s).is_some_and(|p| p.kind.is_progressive()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Persistent feature state, replaced every respin cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespinState {
    /// Frame cells; only ever grows
    pub frames: CellMask,
    /// Locked cells per symbol index; `None` before the first evaluation
    pub locked: Option<Vec<CellMask>>,
}

impl RespinState {
    /// Empty state for a window of `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            frames: CellMask::all_false(cell_count),
            locked: None,
        }
    }

    /// Every locked cell
    pub fn locked_cells(&self) -> OutcomeResult<CellMask> {
        let empty = CellMask::all_false(self.frames.bit_length());
        match &self.locked {
            Some(locked) => locked.iter().try_fold(empty, |acc, mask| acc.or(mask)),
            None => Ok(empty),
        }
    }

    /// Cells locked with `symbol`
    pub fn locked_for(&self, symbol: usize) -> Option<&CellMask> {
        self.locked.as_ref()?.get(symbol)
    }

    /// Populations whose cells are all locked, as a mask over population indexes
    pub fn locked_populations(&self, structure: &SymbolWindowStructure) -> OutcomeResult<CellMask> {
        covered_populations(structure, &self.locked_cells()?)
    }

    fn lock(&self, window: &SymbolWindowResult, symbols: &[usize], excluded: &CellMask) -> OutcomeResult<Vec<CellMask>> {
        let cell_count = window.cell_count();
        let mut locked = self
            .locked
            .clone()
            .unwrap_or_else(|| vec![CellMask::all_false(cell_count); window.symbols().len()]);
        for &symbol in symbols {
            let (Some(mask), Some(slot)) = (window.symbol_mask(symbol), locked.get_mut(symbol)) else {
                continue;
            };
            *slot = slot.or(&mask.and_not(excluded)?)?;
        }
        Ok(locked)
    }
}

/// Populations whose cells all lie inside `cells`, as a mask over population indexes
pub fn covered_populations(structure: &SymbolWindowStructure, cells: &CellMask) -> OutcomeResult<CellMask> {
    let mut indexes = Vec::new();
    for (index, population) in structure.populations().iter().enumerate() {
        if !population.is_empty() && population.and_not(cells)?.is_empty() {
            indexes.push(index);
        }
    }
    CellMask::from_indexes(structure.population_count(), indexes)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of one respin cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespinEvaluation {
    /// State for the next cycle
    pub state: RespinState,
    /// Prizes paid this cycle
    pub prizes: Vec<CellPrizeResult>,
    /// A cell of interest was newly revealed
    pub hit: bool,
    /// No hit on the last allotted attempt
    pub is_finished: bool,
    /// Cycle change requested by a hit
    pub modifier: Option<CyclesModifier>,
}

/// Landed frame cells
fn frame_mask(window: &SymbolWindowResult, config: &RespinConfig, replaced: &CellMask) -> OutcomeResult<CellMask> {
    match config.frame_symbol.and_then(|s| window.symbol_mask(s)) {
        Some(mask) => mask.and_not(replaced),
        None => Ok(CellMask::all_false(window.cell_count())),
    }
}

fn cell_prize(prize: &MaskPrize, cell: usize, cell_count: usize, total_bet: i64) -> OutcomeResult<CellPrizeResult> {
    let value = if prize.scale_by_total_bet {
        prize
            .value
            .checked_mul(total_bet)
            .ok_or_else(|| OutcomeError::MultiplierOverflow(prize.name.clone()))?
    } else {
        prize.value
    };
    Ok(CellPrizeResult {
        name: prize.name.clone(),
        count: 1,
        value,
        pattern: "Respin".to_string(),
        line: None,
        winning_mask: CellMask::from_indexes(cell_count, [cell])?,
        kind: prize.kind.clone(),
    })
}

/// Evaluate one respin cycle
///
/// `cycle` is the respin cycle being played, before it is completed.
///
/// A hit is a respin symbol outside the locked cells, or a frame symbol on a
/// cell that is not yet a frame. Payment per landed respin-symbol cell:
///
/// * progressive prizes pay every cycle, locked or not
/// * cells under a frame pay
/// * other cells pay when the feature finishes
///
/// `replaced` cells are ignored.
pub fn evaluate_respin(
    window: &SymbolWindowResult,
    state: &RespinState,
    config: &RespinConfig,
    cycle: &CycleState,
    total_bet: i64,
    replaced: &ReplacedCells,
) -> OutcomeResult<RespinEvaluation> {
    let cell_count = window.cell_count();
    let replaced = replaced.all(cell_count)?;
    let respin_cells = window.union_of(&config.respin_symbols)?.and_not(&replaced)?;
    let frame_cells = frame_mask(window, config, &replaced)?;

    let new_respin = respin_cells.and_not(&state.locked_cells()?)?;
    let new_frames = frame_cells.and_not(&state.frames)?;
    let hit = !new_respin.is_empty() || !new_frames.is_empty();
    let is_finished = !hit && cycle.is_last_attempt();
    let frames = state.frames.or(&frame_cells)?;

    let mut prizes = Vec::new();
    for cell in respin_cells.enumerate_indexes() {
        let Some(prize) = window.symbol_at(cell).and_then(|s| config.prize_for(s)) else {
            continue;
        };
        if prize.kind.is_progressive() || frames.contains(cell) || is_finished {
            prizes.push(cell_prize(prize, cell, cell_count, total_bet)?);
        }
    }

    let next = RespinState {
        locked: Some(state.lock(window, &config.respin_symbols, &frames.or(&replaced)?)?),
        frames,
    };

    log::debug!(
        "[Respin] {} attempt {}/{}: hit={} finished={} paid={}",
        cycle.id,
        cycle.completed_cycles + 1,
        cycle.total_cycles,
        hit,
        is_finished,
        prizes.len()
    );

    Ok(RespinEvaluation {
        state: next,
        prizes,
        hit,
        is_finished,
        modifier: hit.then_some(CyclesModifier::RespinReset {
            count: config.reset_count,
        }),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRIGGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a trigger check runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RespinContext {
    #[default]
    Base,
    Respin,
}

/// A live respin feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespinTrigger {
    /// Visible trigger symbols
    pub count: usize,
    /// Cells showing trigger symbols
    pub cells: CellMask,
    /// Starting state, always empty
    pub state: RespinState,
    /// Landed respin and frame symbols to hold into the first respin, per cell
    pub held: Vec<Option<usize>>,
}

impl RespinTrigger {
    /// Cells held into the first respin
    pub fn held_cells(&self) -> OutcomeResult<CellMask> {
        let cells = self.held.iter().enumerate().filter(|(_, s)| s.is_some()).map(|(c, _)| c);
        CellMask::from_indexes(self.held.len(), cells)
    }
}

/// Check whether a window starts the respin feature
///
/// A config with progressive trigger symbols is rejected outside a respin
/// context, whatever the window shows. Replaced cells do not count.
pub fn evaluate_respin_trigger(
    window: &SymbolWindowResult,
    config: &RespinConfig,
    context: RespinContext,
    replaced: &ReplacedCells,
) -> OutcomeResult<Option<RespinTrigger>> {
    if context != RespinContext::Respin {
        if let Some(symbol) = config.progressive_trigger_symbol() {
            let name = window.symbols().name(symbol).unwrap_or("?");
            return Err(OutcomeError::ProgressiveOutsideRespin(name.to_string()));
        }
    }

    let cell_count = window.cell_count();
    let replaced = replaced.all(cell_count)?;
    let cells = window.union_of(&config.trigger_symbols)?.and_not(&replaced)?;
    let count = cells.true_count();
    if count < config.trigger_threshold {
        return Ok(None);
    }

    let held_cells = window
        .union_of(&config.respin_symbols)?
        .or(&frame_mask(window, config, &replaced)?)?
        .and_not(&replaced)?;
    let mut held = vec![None; cell_count];
    for cell in held_cells.enumerate_indexes() {
        held[cell] = window.symbol_at(cell);
    }
    log::debug!("[Respin] Triggered by {} symbols, {} held", count, held_cells.true_count());

    Ok(Some(RespinTrigger {
        count,
        cells,
        state: RespinState::new(cell_count),
        held,
    }))
}

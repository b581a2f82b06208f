//! Paytable — a resolved game definition with every name turned into an index

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rf_cycle::{StageConnection, StageName};

use crate::cascade::ReplacementRule;
use crate::error::{OutcomeError, OutcomeResult};
use crate::game::PrizeTrigger;
use crate::multiplier::{MultiplierUsage, SymbolMultiplier};
use crate::pattern::Patterns;
use crate::prize::MaskPrize;
use crate::replacement::ReplacementTarget;
use crate::respin::RespinConfig;
use crate::strip::SharedStrip;
use crate::symbols::SymbolList;
use crate::window::SymbolWindowStructure;

/// What a stage does with its strips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// One strip per reel, evaluated against the prize tables
    #[default]
    Spin,
    /// One strip per cell, locked cells hold between cycles
    Respin,
}

/// Drawn strip replacements applied before the stops are chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripReplacementSetup {
    pub targets: Vec<ReplacementTarget>,
    pub candidates: Vec<usize>,
    /// One weight per candidate
    pub weights: Vec<u64>,
    pub distinct: bool,
    /// One pooled draw for all targets instead of one draw per target
    pub dependent: bool,
}

/// One playable stage
#[derive(Debug, Clone)]
pub struct StageDef {
    pub name: StageName,
    pub kind: StageKind,
    pub strips: Vec<SharedStrip>,
    /// Stage win multiplier (e.g. free games x3)
    pub multiplier: i64,
    /// Symbols that expand over their whole reel
    pub expanding: Vec<usize>,
    /// Mystery replacement rules, applied after expansion
    pub mystery: Vec<ReplacementRule>,
    pub replacements: Option<StripReplacementSetup>,
}

/// Respin feature wiring
#[derive(Debug, Clone)]
pub struct RespinSetup {
    pub config: RespinConfig,
    /// Exit the trigger leaves the spin stage through
    pub exit: String,
    /// One population per cell of the main window
    pub structure: Arc<SymbolWindowStructure>,
}

/// Resolved game definition
#[derive(Debug, Clone)]
pub struct Paytable {
    pub name: String,
    pub symbols: Arc<SymbolList>,
    pub structure: Arc<SymbolWindowStructure>,
    /// Paylines, in line order
    pub lines: Patterns,
    /// Paylines plus the ways cluster derived from them
    pub ways: Patterns,
    /// Paylines plus one cluster covering the whole window
    pub scatters: Patterns,
    pub line_prizes: Vec<MaskPrize>,
    pub ways_prizes: Vec<MaskPrize>,
    pub scatter_prizes: Vec<MaskPrize>,
    /// Keep only the best prize per line
    pub pay_best: bool,
    pub base_stage: StageName,
    pub stages: Vec<StageDef>,
    pub connections: Vec<StageConnection>,
    pub triggers: Vec<PrizeTrigger>,
    pub symbol_multipliers: Vec<SymbolMultiplier>,
    pub multiplier_usage: MultiplierUsage,
    /// Prize names symbol multipliers never touch
    pub multiplier_exclusions: Vec<String>,
    pub respin: Option<RespinSetup>,
}

impl Paytable {
    /// Stage by name
    pub fn stage(&self, name: &StageName) -> OutcomeResult<&StageDef> {
        self.stages
            .iter()
            .find(|s| &s.name == name)
            .ok_or_else(|| OutcomeError::UnknownStage(name.to_string()))
    }

    /// Cells in the main window
    pub fn cell_count(&self) -> usize {
        self.structure.cell_count()
    }
}

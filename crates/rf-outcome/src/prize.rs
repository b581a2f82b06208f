//! Prize definitions and prize results

use serde::{Deserialize, Serialize};

use crate::mask::CellMask;
use crate::window::SymbolWindowResult;

/// Direction a prize is matched in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Contiguous run from the first group
    #[default]
    Left,
    /// Contiguous run from the last group
    Right,
    /// Matching groups anywhere
    Any,
    /// Left and Right
    Both,
}

/// How a prize is paid
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeKind {
    #[default]
    Standard,
    Bonus,
    /// Named progressive level (e.g. "GRAND")
    Progressive(String),
}

impl PrizeKind {
    pub fn is_progressive(&self) -> bool {
        matches!(self, Self::Progressive(_))
    }
}

/// Extra requirement on a prize's winning cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredSymbolCount {
    pub symbol: usize,
    /// Minimum number of winning cells showing `symbol`
    pub count: usize,
}

/// One paytable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskPrize {
    pub name: String,
    /// Symbols that match this prize (e.g. the paying symbol and WILD)
    pub symbols: Vec<usize>,
    /// Required run or match count
    pub count: usize,
    pub value: i64,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub required_symbol_counts: Vec<RequiredSymbolCount>,
    #[serde(default)]
    pub kind: PrizeKind,
    /// Value is per unit of total bet
    #[serde(default)]
    pub scale_by_total_bet: bool,
}

impl MaskPrize {
    /// Create a standard Left prize
    pub fn new(name: impl Into<String>, symbols: Vec<usize>, count: usize, value: i64) -> Self {
        Self {
            name: name.into(),
            symbols,
            count,
            value,
            strategy: Strategy::Left,
            required_symbol_counts: Vec::new(),
            kind: PrizeKind::Standard,
            scale_by_total_bet: false,
        }
    }

    /// Builder: set strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder: require at least `count` winning cells of `symbol`
    pub fn with_required(mut self, symbol: usize, count: usize) -> Self {
        self.required_symbol_counts
            .push(RequiredSymbolCount { symbol, count });
        self
    }

    /// Builder: set payment kind
    pub fn with_kind(mut self, kind: PrizeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: scale value by total bet
    pub fn scaled_by_total_bet(mut self) -> Self {
        self.scale_by_total_bet = true;
        self
    }

    /// Does `symbol` match this prize?
    pub fn matches(&self, symbol: usize) -> bool {
        self.symbols.contains(&symbol)
    }
}

/// Secondary check before a match is recorded
///
/// Every required symbol must show on at least its count of winning cells.
/// Symbols outside the window's list count as absent.
pub fn check_add_prize(prize: &MaskPrize, winning: &CellMask, window: &SymbolWindowResult) -> bool {
    prize.required_symbol_counts.iter().all(|required| {
        window
            .symbol_mask(required.symbol)
            .and_then(|mask| mask.and(winning).ok())
            .map(|cells| cells.true_count())
            .unwrap_or(0)
            >= required.count
    })
}

/// One evaluated win
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPrizeResult {
    pub name: String,
    pub count: usize,
    pub value: i64,
    /// Name of the pattern that produced the win
    pub pattern: String,
    /// Line slot, for line wins
    pub line: Option<usize>,
    pub winning_mask: CellMask,
    pub kind: PrizeKind,
}

impl CellPrizeResult {
    /// Winning cells, ascending
    pub fn cells(&self) -> Vec<usize> {
        self.winning_mask.enumerate_indexes().collect()
    }

    /// Copy with a new value
    pub fn with_value(&self, value: i64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

/// How many configured lines to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSelection {
    #[default]
    All,
    First(usize),
}

impl LineSelection {
    /// From a selected-lines count where -1 means every line
    pub fn from_count(count: i64) -> Self {
        if count < 0 {
            Self::All
        } else {
            Self::First(count as usize)
        }
    }

    /// Number of lines to evaluate out of `available`
    pub fn resolve(self, available: usize) -> usize {
        match self {
            Self::All => available,
            Self::First(n) => n.min(available),
        }
    }
}

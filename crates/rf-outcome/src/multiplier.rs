//! Prize multipliers
//!
//! All arithmetic is checked; overflow is a paytable error and fails the
//! evaluation with [`OutcomeError::MultiplierOverflow`].

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, OutcomeResult};
use crate::prize::CellPrizeResult;
use crate::window::SymbolWindowResult;

/// Multiply every prize by `multiplier`
pub fn apply_multiplier(prizes: &[CellPrizeResult], multiplier: i64) -> OutcomeResult<Vec<CellPrizeResult>> {
    prizes
        .iter()
        .map(|prize| {
            prize
                .value
                .checked_mul(multiplier)
                .map(|value| prize.with_value(value))
                .ok_or_else(|| OutcomeError::MultiplierOverflow(prize.name.clone()))
        })
        .collect()
}

/// How the multipliers of several symbols in one win combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierUsage {
    /// Highest multiplier present
    #[default]
    Best,
    /// Sum of multiplier × cells
    Add,
    /// Product of multiplier ^ cells
    Multiply,
}

/// Multiplier carried by a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMultiplier {
    pub symbol: usize,
    pub multiplier: i64,
}

fn activation(
    prize: &CellPrizeResult,
    window: &SymbolWindowResult,
    multipliers: &[SymbolMultiplier],
    usage: MultiplierUsage,
) -> OutcomeResult<Option<i64>> {
    let overflow = || OutcomeError::MultiplierOverflow(prize.name.clone());
    let mut total = match usage {
        MultiplierUsage::Add => 0i64,
        MultiplierUsage::Best | MultiplierUsage::Multiply => 1i64,
    };
    let mut present = false;

    for entry in multipliers {
        let Some(mask) = window.symbol_mask(entry.symbol) else {
            continue;
        };
        let cells = mask.and(&prize.winning_mask)?.true_count();
        if cells == 0 {
            continue;
        }
        present = true;
        total = match usage {
            MultiplierUsage::Best => total.max(entry.multiplier),
            MultiplierUsage::Add => entry
                .multiplier
                .checked_mul(cells as i64)
                .and_then(|m| total.checked_add(m))
                .ok_or_else(overflow)?,
            MultiplierUsage::Multiply => u32::try_from(cells)
                .ok()
                .and_then(|exp| entry.multiplier.checked_pow(exp))
                .and_then(|m| total.checked_mul(m))
                .ok_or_else(overflow)?,
        };
    }
    Ok(present.then_some(total))
}

/// Multiply prizes by the multiplier symbols inside their own winning cells
///
/// Prizes named in `excluded`, and prizes with no multiplier symbol among
/// their winning cells, pass through unchanged.
pub fn apply_symbol_multiplier(
    prizes: &[CellPrizeResult],
    window: &SymbolWindowResult,
    multipliers: &[SymbolMultiplier],
    usage: MultiplierUsage,
    excluded: &[String],
) -> OutcomeResult<Vec<CellPrizeResult>> {
    prizes
        .iter()
        .map(|prize| {
            if excluded.contains(&prize.name) {
                return Ok(prize.clone());
            }
            match activation(prize, window, multipliers, usage)? {
                Some(m) => prize
                    .value
                    .checked_mul(m)
                    .map(|value| prize.with_value(value))
                    .ok_or_else(|| OutcomeError::MultiplierOverflow(prize.name.clone())),
                None => Ok(prize.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mask::CellMask;
    use crate::prize::PrizeKind;
    use crate::symbols::SymbolList;
    use crate::window::SymbolWindowStructure;

    fn prize(name: &str, value: i64, cells: &[usize]) -> CellPrizeResult {
        CellPrizeResult {
            name: name.into(),
            count: cells.len(),
            value,
            pattern: "Line1".into(),
            line: Some(0),
            winning_mask: CellMask::from_indexes(5, cells.iter().copied()).unwrap(),
            kind: PrizeKind::Standard,
        }
    }

    /// X2 at cells 0 and 3, X3 at cell 1
    fn window() -> SymbolWindowResult {
        let symbols = Arc::new(SymbolList::new(["HP1", "X2", "X3"]));
        let structure = Arc::new(SymbolWindowStructure::rectangular(5, 1).unwrap());
        SymbolWindowResult::from_cell_names(symbols, structure, &["X2", "X3", "HP1", "X2", "HP1"]).unwrap()
    }

    fn multipliers() -> Vec<SymbolMultiplier> {
        vec![
            SymbolMultiplier { symbol: 1, multiplier: 2 },
            SymbolMultiplier { symbol: 2, multiplier: 3 },
        ]
    }

    #[test]
    fn test_apply_multiplier() {
        let scaled = apply_multiplier(&[prize("A", 10, &[0]), prize("B", 3, &[1])], 5).unwrap();
        assert_eq!(scaled[0].value, 50);
        assert_eq!(scaled[1].value, 15);
    }

    #[test]
    fn test_apply_multiplier_overflow() {
        let err = apply_multiplier(&[prize("MAX", i64::MAX, &[0])], 2).unwrap_err();
        assert_eq!(err, OutcomeError::MultiplierOverflow("MAX".into()));
    }

    #[test]
    fn test_symbol_multiplier_usages() {
        // Winning cells 0..4 hold X2 twice and X3 once
        let prizes = [prize("P", 10, &[0, 1, 2, 3])];
        let window = window();

        let best = apply_symbol_multiplier(&prizes, &window, &multipliers(), MultiplierUsage::Best, &[]).unwrap();
        assert_eq!(best[0].value, 30);

        let add = apply_symbol_multiplier(&prizes, &window, &multipliers(), MultiplierUsage::Add, &[]).unwrap();
        assert_eq!(add[0].value, 70);

        let multiply =
            apply_symbol_multiplier(&prizes, &window, &multipliers(), MultiplierUsage::Multiply, &[]).unwrap();
        assert_eq!(multiply[0].value, 120);
    }

    #[test]
    fn test_symbol_multiplier_only_inside_winning_mask() {
        let window = window();
        // Cells 2 and 4 hold no multiplier symbol
        let untouched = [prize("P", 10, &[2, 4])];
        let result =
            apply_symbol_multiplier(&untouched, &window, &multipliers(), MultiplierUsage::Add, &[]).unwrap();
        assert_eq!(result[0].value, 10);

        let excluded = [prize("SCATTER", 10, &[0, 1])];
        let result = apply_symbol_multiplier(
            &excluded,
            &window,
            &multipliers(),
            MultiplierUsage::Multiply,
            &["SCATTER".to_string()],
        )
        .unwrap();
        assert_eq!(result[0].value, 10);
    }

    #[test]
    fn test_symbol_multiplier_overflow() {
        let window = window();
        let huge = vec![SymbolMultiplier { symbol: 1, multiplier: i64::MAX }];
        let err = apply_symbol_multiplier(&[prize("P", 1, &[0, 3])], &window, &huge, MultiplierUsage::Multiply, &[])
            .unwrap_err();
        assert_eq!(err, OutcomeError::MultiplierOverflow("P".into()));
    }
}

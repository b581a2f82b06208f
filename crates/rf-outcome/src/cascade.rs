//! Replacement cascade — redraw every cell showing a replaceable symbol
//!
//! Each pass threads a [`ReplacedCells`] record forward so later passes (and
//! respin logic) can tell landed cells from replaced ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decision::DecisionGenerator;
use crate::error::{OutcomeError, OutcomeResult};
use crate::mask::CellMask;
use crate::window::SymbolWindowResult;

/// Weighted replacement symbols for one replaceable symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    /// Symbol to replace
    pub symbol: usize,
    /// Candidate replacement symbols
    pub candidates: Vec<usize>,
    /// One weight per candidate
    pub weights: Vec<u64>,
}

/// Which cells were replaced with which symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacedCells {
    by_symbol: BTreeMap<usize, CellMask>,
}

impl ReplacedCells {
    /// Cells replaced with `symbol`
    pub fn cells_for(&self, symbol: usize) -> Option<&CellMask> {
        self.by_symbol.get(&symbol)
    }

    /// Every replaced cell
    pub fn all(&self, cell_count: usize) -> OutcomeResult<CellMask> {
        self.by_symbol
            .values()
            .try_fold(CellMask::all_false(cell_count), |acc, mask| acc.or(mask))
    }

    /// Was `cell` replaced?
    pub fn contains(&self, cell: usize) -> bool {
        self.by_symbol.values().any(|m| m.contains(cell))
    }

    /// Replacement symbols in use
    pub fn symbols(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_symbol.keys().copied()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.by_symbol.values().all(CellMask::is_empty)
    }

    /// Mark `cell` as replaced with `symbol`
    pub fn record(&mut self, symbol: usize, cell: usize, cell_count: usize) -> OutcomeResult<()> {
        // A cell replaced twice only belongs to its latest symbol
        for mask in self.by_symbol.values_mut() {
            if mask.contains(cell) {
                *mask = mask.and_not(&CellMask::from_indexes(cell_count, [cell])?)?;
            }
        }
        let entry = self
            .by_symbol
            .entry(symbol)
            .or_insert_with(|| CellMask::all_false(cell_count));
        *entry = entry.with_index(cell)?;
        Ok(())
    }
}

/// Redraw the cells of every rule symbol present in the window
///
/// Each occupied cell gets one weighted draw over the rule's candidates;
/// weights are multiplied by `bet_scaling[candidate]` (1 when absent).
/// Rules apply in order, each to the window the previous one produced.
pub fn apply_replacements_to_symbol_window(
    window: &SymbolWindowResult,
    rules: &[ReplacementRule],
    bet_scaling: &BTreeMap<usize, u64>,
    generator: &mut DecisionGenerator,
    touched: ReplacedCells,
) -> OutcomeResult<(SymbolWindowResult, ReplacedCells)> {
    let cell_count = window.cell_count();
    let mut cells = window.cell_symbols();
    let mut touched = touched;
    let mut changed = false;

    for rule in rules {
        if rule.candidates.len() != rule.weights.len() {
            return Err(OutcomeError::LengthMismatch {
                left: rule.candidates.len(),
                right: rule.weights.len(),
            });
        }
        let occupied: Vec<usize> = (0..cell_count).filter(|&c| cells[c] == rule.symbol).collect();
        if occupied.is_empty() {
            continue;
        }

        let scaled = rule
            .candidates
            .iter()
            .zip(&rule.weights)
            .map(|(candidate, &weight)| {
                weight
                    .checked_mul(bet_scaling.get(candidate).copied().unwrap_or(1))
                    .ok_or(OutcomeError::WeightOverflow)
            })
            .collect::<OutcomeResult<Vec<_>>>()?;
        let total = scaled
            .iter()
            .try_fold(0u64, |acc, &w| acc.checked_add(w))
            .ok_or(OutcomeError::WeightOverflow)?;

        let name = window.symbols().name(rule.symbol).unwrap_or("?");
        for cell in occupied {
            let index = generator.choose_one_weighted(
                scaled.len(),
                |i| scaled[i],
                total,
                || format!("Replace{}Cell{}", name, cell),
            )?;
            let symbol = rule.candidates[index];
            cells[cell] = symbol;
            touched.record(symbol, cell, cell_count)?;
            changed = true;
        }
    }

    if !changed {
        return Ok((window.clone(), touched));
    }
    let next = SymbolWindowResult::from_cell_symbols(
        Arc::clone(window.symbols()),
        Arc::clone(window.structure()),
        &cells,
    )?;
    Ok((next, touched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ReplaySource;
    use crate::symbols::SymbolList;
    use crate::window::SymbolWindowStructure;

    fn window(names: &[&str]) -> SymbolWindowResult {
        let symbols = Arc::new(SymbolList::new(["MYSTERY", "HP1", "LP1", "WILD"]));
        let structure = Arc::new(SymbolWindowStructure::rectangular(2, 2).unwrap());
        SymbolWindowResult::from_cell_names(symbols, structure, names).unwrap()
    }

    fn mystery_rule() -> ReplacementRule {
        ReplacementRule {
            symbol: 0,
            candidates: vec![1, 3],
            weights: vec![1, 1],
        }
    }

    #[test]
    fn test_each_occupied_cell_draws() {
        let window = window(&["MYSTERY", "LP1", "MYSTERY", "HP1"]);
        let mut generator = DecisionGenerator::new(ReplaySource::new([0, 1]));
        let (next, touched) = apply_replacements_to_symbol_window(
            &window,
            &[mystery_rule()],
            &BTreeMap::new(),
            &mut generator,
            ReplacedCells::default(),
        )
        .unwrap();

        assert_eq!(next.cell_symbols(), vec![1, 2, 3, 1]);
        assert!(next.check_partition());
        assert_eq!(touched.cells_for(1).unwrap().enumerate_indexes().collect::<Vec<_>>(), vec![0]);
        assert_eq!(touched.cells_for(3).unwrap().enumerate_indexes().collect::<Vec<_>>(), vec![2]);
        assert_eq!(generator.trace().labels(), vec!["ReplaceMYSTERYCell0", "ReplaceMYSTERYCell2"]);
    }

    #[test]
    fn test_bet_scaling_shifts_weights() {
        let window = window(&["MYSTERY", "LP1", "LP1", "LP1"]);
        // WILD scaled to weight 9: value 1 now lands on WILD
        let scaling = BTreeMap::from([(3, 9)]);
        let mut generator = DecisionGenerator::new(ReplaySource::new([1]));
        let (next, _) = apply_replacements_to_symbol_window(
            &window,
            &[mystery_rule()],
            &scaling,
            &mut generator,
            ReplacedCells::default(),
        )
        .unwrap();
        assert_eq!(next.symbol_at(0), Some(3));
    }

    #[test]
    fn test_absent_symbol_is_untouched() {
        let window = window(&["HP1", "LP1", "LP1", "HP1"]);
        let mut generator = DecisionGenerator::seeded(5);
        let (next, touched) = apply_replacements_to_symbol_window(
            &window,
            &[mystery_rule()],
            &BTreeMap::new(),
            &mut generator,
            ReplacedCells::default(),
        )
        .unwrap();
        assert_eq!(next, window);
        assert!(touched.is_empty());
        assert!(generator.trace().is_empty());
    }

    #[test]
    fn test_touched_map_threads_across_passes() {
        let window = window(&["MYSTERY", "LP1", "LP1", "LP1"]);
        let mut generator = DecisionGenerator::new(ReplaySource::new([1, 0]));
        let (first, touched) = apply_replacements_to_symbol_window(
            &window,
            &[mystery_rule()],
            &BTreeMap::new(),
            &mut generator,
            ReplacedCells::default(),
        )
        .unwrap();
        assert_eq!(first.symbol_at(0), Some(3));

        // Second pass turns the WILD into HP1
        let wild_rule = ReplacementRule { symbol: 3, candidates: vec![1], weights: vec![1] };
        let (second, touched) =
            apply_replacements_to_symbol_window(&first, &[wild_rule], &BTreeMap::new(), &mut generator, touched)
                .unwrap();
        assert_eq!(second.symbol_at(0), Some(1));
        assert!(touched.contains(0));
        assert!(touched.cells_for(3).unwrap().is_empty());
        assert_eq!(touched.all(4).unwrap().true_count(), 1);
    }
}

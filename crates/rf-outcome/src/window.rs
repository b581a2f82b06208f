//! Symbol window — grid topology plus one cell mask per symbol
//!
//! A [`SymbolWindowStructure`] is built once per layout and shared. Each
//! evaluation produces a [`SymbolWindowResult`] whose per-symbol masks
//! partition the cells: every cell shows exactly one symbol. Structural edits
//! (smashing, symbol changes) return a new result and never patch one in
//! place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decision::{DecisionGenerator, WeightedTable};
use crate::error::{OutcomeError, OutcomeResult};
use crate::mask::CellMask;
use crate::strip::SharedStrip;
use crate::symbols::SymbolList;

// ═══════════════════════════════════════════════════════════════════════════════
// STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// One grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Population (reel) the cell belongs to
    pub population: usize,
    /// Position inside the population, top to bottom
    pub position: usize,
}

/// Static grid topology: cells and the populations that own them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolWindowStructure {
    cells: Vec<Cell>,
    populations: Vec<CellMask>,
    population_cells: Vec<Vec<usize>>,
}

impl SymbolWindowStructure {
    /// Build a structure from population masks
    ///
    /// Populations must share one bit length and cover every cell exactly
    /// once.
    pub fn from_populations(populations: Vec<CellMask>) -> OutcomeResult<Self> {
        let cell_count = populations.first().map(CellMask::bit_length).unwrap_or(0);
        let mut cells: Vec<Option<Cell>> = vec![None; cell_count];
        let mut population_cells = Vec::with_capacity(populations.len());

        for (population, mask) in populations.iter().enumerate() {
            if mask.bit_length() != cell_count {
                return Err(OutcomeError::LengthMismatch {
                    left: cell_count,
                    right: mask.bit_length(),
                });
            }
            let members: Vec<usize> = mask.enumerate_indexes().collect();
            for (position, &cell) in members.iter().enumerate() {
                if cells[cell].is_some() {
                    return Err(OutcomeError::InvalidStructure(format!(
                        "cell {} is in more than one population",
                        cell
                    )));
                }
                cells[cell] = Some(Cell {
                    population,
                    position,
                });
            }
            population_cells.push(members);
        }

        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                cell.ok_or_else(|| {
                    OutcomeError::InvalidStructure(format!("cell {} is in no population", index))
                })
            })
            .collect::<OutcomeResult<Vec<_>>>()?;

        Ok(Self {
            cells,
            populations,
            population_cells,
        })
    }

    /// Populations of the given sizes, cells numbered population by population
    pub fn from_population_sizes(sizes: &[usize]) -> OutcomeResult<Self> {
        let cell_count = sizes.iter().sum();
        let mut start = 0;
        let populations = sizes
            .iter()
            .map(|&size| {
                let mask = CellMask::from_indexes(cell_count, start..start + size);
                start += size;
                mask
            })
            .collect::<OutcomeResult<Vec<_>>>()?;
        Self::from_populations(populations)
    }

    /// `columns` reels of `rows` cells; cell index is `column * rows + row`
    pub fn rectangular(columns: usize, rows: usize) -> OutcomeResult<Self> {
        Self::from_population_sizes(&vec![rows; columns])
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells in index order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Population masks in order
    pub fn populations(&self) -> &[CellMask] {
        &self.populations
    }

    /// Number of populations
    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    /// Cell indexes of one population, top to bottom
    pub fn population_cells(&self, population: usize) -> &[usize] {
        self.population_cells
            .get(population)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cell index of a population position
    pub fn cell_index(&self, population: usize, position: usize) -> Option<usize> {
        self.population_cells.get(population)?.get(position).copied()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Which cells show which symbol, for one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolWindowResult {
    symbols: Arc<SymbolList>,
    structure: Arc<SymbolWindowStructure>,
    masks: Vec<CellMask>,
}

impl SymbolWindowResult {
    /// Build a window from one symbol index per cell
    pub fn from_cell_symbols(
        symbols: Arc<SymbolList>,
        structure: Arc<SymbolWindowStructure>,
        cell_symbols: &[usize],
    ) -> OutcomeResult<Self> {
        let cell_count = structure.cell_count();
        if cell_symbols.len() != cell_count {
            return Err(OutcomeError::LengthMismatch {
                left: cell_count,
                right: cell_symbols.len(),
            });
        }

        let mut indexes: Vec<Vec<usize>> = vec![Vec::new(); symbols.len()];
        for (cell, &symbol) in cell_symbols.iter().enumerate() {
            indexes
                .get_mut(symbol)
                .ok_or_else(|| OutcomeError::UnknownSymbol(format!("#{}", symbol)))?
                .push(cell);
        }
        let masks = indexes
            .into_iter()
            .map(|cells| CellMask::from_indexes(cell_count, cells))
            .collect::<OutcomeResult<Vec<_>>>()?;

        Ok(Self {
            symbols,
            structure,
            masks,
        })
    }

    /// Build a window from symbol names, one per cell
    pub fn from_cell_names(
        symbols: Arc<SymbolList>,
        structure: Arc<SymbolWindowStructure>,
        names: &[&str],
    ) -> OutcomeResult<Self> {
        let cell_symbols = names
            .iter()
            .map(|n| symbols.resolve(n))
            .collect::<OutcomeResult<Vec<_>>>()?;
        Self::from_cell_symbols(symbols, structure, &cell_symbols)
    }

    fn with_masks(&self, masks: Vec<CellMask>) -> Self {
        Self {
            symbols: Arc::clone(&self.symbols),
            structure: Arc::clone(&self.structure),
            masks,
        }
    }

    /// Symbol list
    pub fn symbols(&self) -> &Arc<SymbolList> {
        &self.symbols
    }

    /// Grid topology
    pub fn structure(&self) -> &Arc<SymbolWindowStructure> {
        &self.structure
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        self.structure.cell_count()
    }

    /// Cells showing `symbol`; `None` for an index outside the symbol list
    pub fn symbol_mask(&self, symbol: usize) -> Option<&CellMask> {
        self.masks.get(symbol)
    }

    /// Cells showing the named symbol
    pub fn symbol_mask_by_name(&self, name: &str) -> Option<&CellMask> {
        self.symbols.index_of(name).and_then(|s| self.symbol_mask(s))
    }

    /// All per-symbol masks in symbol order
    pub fn masks(&self) -> &[CellMask] {
        &self.masks
    }

    /// Union of the masks of several symbols; unknown symbols add nothing
    pub fn union_of(&self, symbols: &[usize]) -> OutcomeResult<CellMask> {
        symbols
            .iter()
            .filter_map(|&s| self.symbol_mask(s))
            .try_fold(CellMask::all_false(self.cell_count()), |acc, mask| acc.or(mask))
    }

    /// Symbol shown at a cell
    pub fn symbol_at(&self, cell: usize) -> Option<usize> {
        self.masks.iter().position(|m| m.contains(cell))
    }

    /// One symbol index per cell
    pub fn cell_symbols(&self) -> Vec<usize> {
        let mut cells = vec![0; self.cell_count()];
        for (symbol, mask) in self.masks.iter().enumerate() {
            for cell in mask.enumerate_indexes() {
                cells[cell] = symbol;
            }
        }
        cells
    }

    /// Do the symbol masks cover every cell exactly once?
    pub fn check_partition(&self) -> bool {
        let mut seen = vec![false; self.cell_count()];
        for mask in &self.masks {
            if mask.bit_length() != seen.len() {
                return false;
            }
            for cell in mask.enumerate_indexes() {
                if std::mem::replace(&mut seen[cell], true) {
                    return false;
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Make every population holding `symbol` show only `symbol`
    ///
    /// Returns an unchanged copy when no population holds the symbol.
    pub fn smash_symbol_over_population(&self, symbol: usize) -> OutcomeResult<SymbolWindowResult> {
        let target = self
            .symbol_mask(symbol)
            .ok_or_else(|| OutcomeError::UnknownSymbol(format!("#{}", symbol)))?;

        let mut smashed = CellMask::all_false(self.cell_count());
        for population in self.structure.populations() {
            if population.and_not_empty(target)? {
                smashed = smashed.or(population)?;
            }
        }
        if smashed.is_empty() {
            return Ok(self.clone());
        }

        log::debug!(
            "[Window] Smash {} over {} cells",
            self.symbols.name(symbol).unwrap_or("?"),
            smashed.true_count()
        );
        let masks = self
            .masks
            .iter()
            .enumerate()
            .map(|(s, mask)| {
                if s == symbol {
                    mask.or(&smashed)
                } else {
                    mask.and_not(&smashed)
                }
            })
            .collect::<OutcomeResult<Vec<_>>>()?;
        Ok(self.with_masks(masks))
    }

    /// Replace `from` with one symbol per population
    ///
    /// `replacements[p]` is the symbol the cells of population `p` showing
    /// `from` change to.
    pub fn change_symbol_index(
        &self,
        from: usize,
        replacements: &[usize],
    ) -> OutcomeResult<SymbolWindowResult> {
        let populations = self.structure.population_count();
        if replacements.len() != populations {
            return Err(OutcomeError::ReplacementCountMismatch {
                replacements: replacements.len(),
                populations,
            });
        }
        if from >= self.masks.len() {
            return Err(OutcomeError::UnknownSymbol(format!("#{}", from)));
        }
        if let Some(&bad) = replacements.iter().find(|&&s| s >= self.masks.len()) {
            return Err(OutcomeError::UnknownSymbol(format!("#{}", bad)));
        }

        let mut masks = self.masks.clone();
        for (population, &to) in self.structure.populations().iter().zip(replacements) {
            let hit = masks[from].and(population)?;
            if hit.is_empty() || to == from {
                continue;
            }
            masks[from] = masks[from].and_not(&hit)?;
            masks[to] = masks[to].or(&hit)?;
        }
        Ok(self.with_masks(masks))
    }

    /// Pick one of the schema's replacement sets and apply it
    pub fn apply_replacement_schema(
        &self,
        schema: &ReplacementSchema,
        generator: &mut DecisionGenerator,
    ) -> OutcomeResult<(SymbolWindowResult, SetChoice)> {
        let populations = self.structure.population_count();
        for set in [&schema.set1, &schema.set2] {
            if set.len() != populations {
                return Err(OutcomeError::ReplacementCountMismatch {
                    replacements: set.len(),
                    populations,
                });
            }
        }

        let name = self.symbols.name(schema.symbol).unwrap_or("?");
        let index = generator.choose_one_index(schema, || format!("{}ReplacementSet", name))?;
        let choice = if index == 0 {
            SetChoice::Set1
        } else {
            SetChoice::Set2
        };
        let window = self.change_symbol_index(schema.symbol, schema.set(choice))?;
        Ok((window, choice))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// POPULATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Choose one stop per strip
///
/// Strips whose index is set in `locked` draw nothing and get stop 0.
pub fn choose_stops(
    strips: &[SharedStrip],
    locked: Option<&CellMask>,
    generator: &mut DecisionGenerator,
) -> OutcomeResult<Vec<usize>> {
    strips
        .iter()
        .enumerate()
        .map(|(index, strip)| {
            if locked.is_some_and(|l| l.contains(index)) {
                return Ok(0);
            }
            Ok(generator.choose_one_index(strip.as_ref(), || format!("Reel{}", index))?)
        })
        .collect()
}

fn check_strips(
    structure: &SymbolWindowStructure,
    strips: &[SharedStrip],
    stops: &[usize],
) -> OutcomeResult<()> {
    if strips.len() != structure.population_count() {
        return Err(OutcomeError::StripCountMismatch {
            strips: strips.len(),
            expected: structure.population_count(),
        });
    }
    if stops.len() != strips.len() {
        return Err(OutcomeError::LengthMismatch {
            left: strips.len(),
            right: stops.len(),
        });
    }
    Ok(())
}

fn fill_population(
    structure: &SymbolWindowStructure,
    cells: &mut [usize],
    population: usize,
    strip: &SharedStrip,
    stop: usize,
) {
    for (k, &cell) in structure.population_cells(population).iter().enumerate() {
        cells[cell] = strip.symbol_index(stop + k);
    }
}

/// Populate a window: strip `p` fills population `p` from its chosen stop
///
/// The `k`-th cell of a population shows the strip symbol at `stop + k`,
/// wrapping around the strip.
pub fn create_symbol_window_result(
    structure: &Arc<SymbolWindowStructure>,
    symbols: &Arc<SymbolList>,
    strips: &[SharedStrip],
    stops: &[usize],
) -> OutcomeResult<SymbolWindowResult> {
    check_strips(structure, strips, stops)?;
    let mut cells = vec![0; structure.cell_count()];
    for (population, (strip, &stop)) in strips.iter().zip(stops).enumerate() {
        fill_population(structure, &mut cells, population, strip, stop);
    }
    SymbolWindowResult::from_cell_symbols(Arc::clone(symbols), Arc::clone(structure), &cells)
}

/// Populate a window, keeping `previous` cells for strips set in `locked`
pub fn create_locked_symbol_window_result(
    previous: &SymbolWindowResult,
    strips: &[SharedStrip],
    stops: &[usize],
    locked: &CellMask,
) -> OutcomeResult<SymbolWindowResult> {
    let structure = previous.structure();
    check_strips(structure, strips, stops)?;
    if locked.bit_length() != strips.len() {
        return Err(OutcomeError::LengthMismatch {
            left: strips.len(),
            right: locked.bit_length(),
        });
    }

    let mut cells = previous.cell_symbols();
    for (population, (strip, &stop)) in strips.iter().zip(stops).enumerate() {
        if !locked.contains(population) {
            fill_population(structure, &mut cells, population, strip, stop);
        }
    }
    SymbolWindowResult::from_cell_symbols(
        Arc::clone(previous.symbols()),
        Arc::clone(structure),
        &cells,
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPLACEMENT SCHEMA
// ═══════════════════════════════════════════════════════════════════════════════

/// Which replacement set a schema draw picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetChoice {
    Set1,
    Set2,
}

/// Two weighted per-population replacement sets for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSchema {
    /// Symbol being replaced
    pub symbol: usize,
    /// One replacement symbol per population
    pub set1: Vec<usize>,
    pub set2: Vec<usize>,
    pub set1_weight: u64,
    pub set2_weight: u64,
}

impl ReplacementSchema {
    /// Replacement set for a choice
    pub fn set(&self, choice: SetChoice) -> &[usize] {
        match choice {
            SetChoice::Set1 => &self.set1,
            SetChoice::Set2 => &self.set2,
        }
    }
}

impl WeightedTable for ReplacementSchema {
    fn item_count(&self) -> usize {
        2
    }

    fn weight(&self, index: usize) -> u64 {
        if index == 0 {
            self.set1_weight
        } else {
            self.set2_weight
        }
    }
}

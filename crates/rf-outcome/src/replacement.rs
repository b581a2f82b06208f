//! Strip replacements — redirect chosen stops to other symbols
//!
//! A [`Replacements`] value answers "which symbol does this stop show
//! instead?" without touching the strip it wraps. Wrapping a strip in a
//! [`SymbolReplacementStrip`] makes the redirection transparent to window
//! population. The [`ReplacementBuilder`] collects replacements per strip
//! and compiles them into chains on [`ReplacementBuilder::finalise`].
//!
//! ## Priority
//!
//! Inside a chain the first replacement that answers wins. The builder
//! chains in call order, so the first replacement added for a strip
//! overrides every later one.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decision::{DecisionGenerator, WeightedTable};
use crate::error::{OutcomeError, OutcomeResult};
use crate::strip::{SharedStrip, Strip};
use crate::symbols::SymbolList;

// ═══════════════════════════════════════════════════════════════════════════════
// REPLACEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Stop → replacement symbol mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Replacements {
    /// One optional symbol per stop
    Direct(Vec<Option<usize>>),
    /// Replaced stops only
    Sparse(BTreeMap<usize, usize>),
    /// Every stop showing `from` shows `to`
    Substitution { from: usize, to: usize },
    /// Ordered list; the first replacement that answers wins
    Chain(Vec<Replacements>),
}

impl Default for Replacements {
    fn default() -> Self {
        Self::Chain(Vec::new())
    }
}

impl Replacements {
    /// Replacement for a stop, or `None` when the strip symbol stands
    pub fn symbol_index(&self, strip: &dyn Strip, stop: usize) -> Option<usize> {
        if strip.is_empty() {
            return None;
        }
        let stop = stop % strip.len();
        match self {
            Self::Direct(symbols) => symbols.get(stop).copied().flatten(),
            Self::Sparse(stops) => stops.get(&stop).copied(),
            Self::Substitution { from, to } => (strip.symbol_index(stop) == *from).then_some(*to),
            Self::Chain(chain) => chain.iter().find_map(|r| r.symbol_index(strip, stop)),
        }
    }

    /// Symbol shown at a stop after replacement
    pub fn final_symbol_index(&self, strip: &dyn Strip, stop: usize) -> usize {
        self.symbol_index(strip, stop)
            .unwrap_or_else(|| strip.symbol_index(stop))
    }

    /// Stops this replacement may redirect, ascending
    pub fn covered_stops(&self, strip: &dyn Strip) -> Vec<usize> {
        let mut stops = match self {
            Self::Direct(symbols) => symbols
                .iter()
                .take(strip.len())
                .enumerate()
                .filter_map(|(stop, s)| s.map(|_| stop))
                .collect(),
            Self::Sparse(stops) => stops.keys().copied().filter(|&s| s < strip.len()).collect(),
            Self::Substitution { from, .. } => strip.symbol_positions(*from),
            Self::Chain(chain) => chain.iter().flat_map(|r| r.covered_stops(strip)).collect(),
        };
        stops.sort_unstable();
        stops.dedup();
        stops
    }

    /// Chain `lower` behind this replacement
    pub fn then(self, lower: Replacements) -> Replacements {
        match self {
            Self::Chain(mut chain) => {
                chain.push(lower);
                Self::Chain(chain)
            }
            first => Self::Chain(vec![first, lower]),
        }
    }

    /// Does this replacement never redirect anything?
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Direct(symbols) => symbols.iter().all(Option::is_none),
            Self::Sparse(stops) => stops.is_empty(),
            Self::Substitution { .. } => false,
            Self::Chain(chain) => chain.iter().all(Replacements::is_empty),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPLACEMENT STRIP
// ═══════════════════════════════════════════════════════════════════════════════

/// Lazy view of a strip with replacements applied
///
/// Weights and length are the source strip's; only symbols change.
#[derive(Debug, Clone)]
pub struct SymbolReplacementStrip {
    source: SharedStrip,
    replacements: Replacements,
}

impl SymbolReplacementStrip {
    /// Wrap a strip
    pub fn new(source: SharedStrip, replacements: Replacements) -> Self {
        Self {
            source,
            replacements,
        }
    }

    /// The wrapped strip
    pub fn source(&self) -> &SharedStrip {
        &self.source
    }

    /// The applied replacements
    pub fn replacements(&self) -> &Replacements {
        &self.replacements
    }
}

/// Wrap a strip in its replacements; strips without any stay as they are
pub fn create_strip_with_replacement(strip: SharedStrip, replacements: Replacements) -> SharedStrip {
    if replacements.is_empty() {
        strip
    } else {
        Arc::new(SymbolReplacementStrip::new(strip, replacements))
    }
}

impl WeightedTable for SymbolReplacementStrip {
    fn item_count(&self) -> usize {
        self.source.item_count()
    }

    fn weight(&self, index: usize) -> u64 {
        self.source.weight(index)
    }

    fn total_weight(&self) -> u64 {
        self.source.total_weight()
    }
}

impl Strip for SymbolReplacementStrip {
    fn len(&self) -> usize {
        self.source.len()
    }

    fn symbols(&self) -> &SymbolList {
        self.source.symbols()
    }

    fn symbol_index(&self, stop: usize) -> usize {
        self.replacements.final_symbol_index(self.source.as_ref(), stop)
    }

    /// Scans the source's own positions plus the covered stops only
    fn symbol_positions(&self, symbol: usize) -> Vec<usize> {
        let source = self.source.as_ref();
        let mut candidates = source.symbol_positions(symbol);
        candidates.extend(self.replacements.covered_stops(source));
        candidates.sort_unstable();
        candidates.dedup();
        candidates.retain(|&stop| self.symbol_index(stop) == symbol);
        candidates
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects replacements per strip
///
/// Consumed by [`finalise`](Self::finalise); the compiled strips exist only
/// on the returned [`FinalisedStrips`].
#[derive(Debug, Clone)]
pub struct ReplacementBuilder {
    strips: Vec<SharedStrip>,
    pending: Vec<Vec<Replacements>>,
}

impl ReplacementBuilder {
    /// Start a builder over a strip set
    pub fn new(strips: Vec<SharedStrip>) -> Self {
        let pending = vec![Vec::new(); strips.len()];
        Self { strips, pending }
    }

    /// Number of strips
    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    /// Source strip
    pub fn strip(&self, index: usize) -> OutcomeResult<&SharedStrip> {
        self.strips.get(index).ok_or(OutcomeError::IndexOutOfRange {
            index,
            length: self.strips.len(),
        })
    }

    /// Queue a replacement for one strip; earlier calls take priority
    pub fn add_replacement(&mut self, strip_index: usize, replacements: Replacements) -> OutcomeResult<()> {
        let length = self.pending.len();
        self.pending
            .get_mut(strip_index)
            .ok_or(OutcomeError::IndexOutOfRange {
                index: strip_index,
                length,
            })?
            .push(replacements);
        Ok(())
    }

    /// Compile the queued replacements
    pub fn finalise(self) -> FinalisedStrips {
        let replacements: Vec<Replacements> = self
            .pending
            .into_iter()
            .map(|mut pending| {
                if pending.len() == 1 {
                    pending.remove(0)
                } else {
                    Replacements::Chain(pending)
                }
            })
            .collect();
        let final_strips = self
            .strips
            .into_iter()
            .zip(&replacements)
            .map(|(strip, r)| create_strip_with_replacement(strip, r.clone()))
            .collect();

        FinalisedStrips {
            final_strips,
            replacements,
        }
    }
}

/// Strips with their compiled replacements
#[derive(Debug, Clone)]
pub struct FinalisedStrips {
    final_strips: Vec<SharedStrip>,
    replacements: Vec<Replacements>,
}

impl FinalisedStrips {
    /// Strips to populate a window from
    pub fn final_strips(&self) -> &[SharedStrip] {
        &self.final_strips
    }

    /// Compiled replacement per strip
    pub fn replacements(&self) -> &[Replacements] {
        &self.replacements
    }

    /// Take the strips
    pub fn into_strips(self) -> Vec<SharedStrip> {
        self.final_strips
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRAWN REPLACEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Stops of one strip that will show drawn symbols
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementTarget {
    pub strip_index: usize,
    pub stops: Vec<usize>,
}

fn checked_total(count: usize, weight: impl Fn(usize) -> u64) -> OutcomeResult<u64> {
    (0..count)
        .try_fold(0u64, |acc, i| acc.checked_add(weight(i)))
        .ok_or(OutcomeError::WeightOverflow)
}

fn symbol_id(strip: &SharedStrip, symbol: usize) -> String {
    strip.symbols().name(symbol).unwrap_or_default().to_string()
}

/// Draw replacement symbols for each target separately
///
/// `weight(strip_index, candidate)` weights each candidate symbol for one
/// strip. Each target gets its own draw of `stops.len()` candidates.
pub fn add_independent_replacements(
    builder: &mut ReplacementBuilder,
    targets: &[ReplacementTarget],
    candidates: &[usize],
    weight: impl Fn(usize, usize) -> u64,
    distinct: bool,
    generator: &mut DecisionGenerator,
) -> OutcomeResult<()> {
    for target in targets {
        let strip = builder.strip(target.strip_index)?.clone();
        let strip_weight = |i: usize| weight(target.strip_index, i);
        let total = checked_total(candidates.len(), strip_weight)?;

        let chosen = generator.choose_indexes(
            candidates.len(),
            target.stops.len(),
            distinct,
            strip_weight,
            total,
            |i| symbol_id(&strip, candidates[i]),
            || format!("Reel{}Replacements", target.strip_index),
        )?;

        let stops = target
            .stops
            .iter()
            .zip(chosen)
            .map(|(&stop, i)| (stop, candidates[i]))
            .collect();
        builder.add_replacement(target.strip_index, Replacements::Sparse(stops))?;
    }
    Ok(())
}

/// Draw replacement symbols for every target in one pooled draw
///
/// The drawn candidates are handed out in strip order, whatever the order of
/// `targets`: the lowest strip index takes the first `stops.len()` picks, and
/// so on.
pub fn add_dependent_replacements(
    builder: &mut ReplacementBuilder,
    targets: &[ReplacementTarget],
    candidates: &[usize],
    weight: impl Fn(usize) -> u64,
    distinct: bool,
    generator: &mut DecisionGenerator,
) -> OutcomeResult<()> {
    let mut ordered: Vec<&ReplacementTarget> = targets.iter().collect();
    ordered.sort_by_key(|t| t.strip_index);
    let Some(first) = ordered.first() else {
        return Ok(());
    };
    let needed: usize = ordered.iter().map(|t| t.stops.len()).sum();
    let first = builder.strip(first.strip_index)?.clone();
    let total = checked_total(candidates.len(), &weight)?;

    let chosen = generator.choose_indexes(
        candidates.len(),
        needed,
        distinct,
        &weight,
        total,
        |i| symbol_id(&first, candidates[i]),
        || "DependentReplacements".to_string(),
    )?;

    let mut picks = chosen.into_iter();
    for target in ordered {
        builder.strip(target.strip_index)?;
        let stops = target
            .stops
            .iter()
            .zip(picks.by_ref())
            .map(|(&stop, i)| (stop, candidates[i]))
            .collect();
        builder.add_replacement(target.strip_index, Replacements::Sparse(stops))?;
    }
    Ok(())
}

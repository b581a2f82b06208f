//! Decision Generator — replayable weighted random choices
//!
//! Every random choice the engine makes goes through a [`DecisionGenerator`].
//! Each call is tagged with a label built from the call site (`"Reel3"`)
//! and the active scopes (`"Respin/Reel3"`), and recorded in a
//! [`DecisionTrace`]. Two generators over the same source state that see the
//! same call sequence produce identical choices and identical traces, and a
//! trace can be fed back through a [`ReplaySource`] to reproduce a round.
//!
//! ## Selection
//!
//! A draw takes a uniform value `r` in `[0, total_weight)` and returns the
//! item whose cumulative weight range contains `r`. Ranges are disjoint, so
//! there are no ties. Distinct batches remove each chosen item (and its
//! weight) before the next draw.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decision errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("Decision '{label}' has zero total weight")]
    ZeroTotalWeight { label: String },

    #[error("Decision '{label}' requested {requested} distinct items but only {available} have weight")]
    NotEnoughItems {
        label: String,
        requested: usize,
        available: usize,
    },

    #[error("Decision '{label}' was given total weight {supplied} but weights sum to {actual}")]
    WeightMismatch {
        label: String,
        supplied: u64,
        actual: u64,
    },

    #[error("Replay log exhausted after {consumed} values")]
    ReplayExhausted { consumed: usize },

    #[error("Replay value {value} is not below {bound}")]
    ReplayOutOfRange { value: u64, bound: u64 },
}

/// Result type alias
pub type DecisionResult<T> = Result<T, DecisionError>;

// ═══════════════════════════════════════════════════════════════════════════════
// RANDOM SOURCES
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of uniform integers
pub trait RandomSource: Send {
    /// Uniform value in `[0, bound)`; `bound` is never zero
    fn next_below(&mut self, bound: u64) -> DecisionResult<u64>;
}

/// ChaCha8-backed source; value-stable across platforms for a given seed
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    /// Create a source from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the operating system
    pub fn from_os_rng() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_below(&mut self, bound: u64) -> DecisionResult<u64> {
        Ok(self.rng.random_range(0..bound))
    }
}

/// Source that plays back recorded values
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    values: VecDeque<u64>,
    consumed: usize,
}

impl ReplaySource {
    /// Create a replay source from raw values
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Create a replay source from a recorded trace
    pub fn from_trace(trace: &DecisionTrace) -> Self {
        Self::new(trace.draws())
    }

    /// Values not yet consumed
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ReplaySource {
    fn next_below(&mut self, bound: u64) -> DecisionResult<u64> {
        let value = self.values.pop_front().ok_or(DecisionError::ReplayExhausted {
            consumed: self.consumed,
        })?;
        self.consumed += 1;
        if value >= bound {
            return Err(DecisionError::ReplayOutOfRange { value, bound });
        }
        Ok(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WEIGHTED TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything a weighted choice can be made over
pub trait WeightedTable {
    /// Number of items
    fn item_count(&self) -> usize;

    /// Weight of one item
    fn weight(&self, index: usize) -> u64;

    /// Sum of all weights; `u64::MAX` when the sum overflows, which draws
    /// then reject as a weight mismatch
    fn total_weight(&self) -> u64 {
        (0..self.item_count())
            .try_fold(0u64, |acc, i| acc.checked_add(self.weight(i)))
            .unwrap_or(u64::MAX)
    }
}

impl WeightedTable for [u64] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn weight(&self, index: usize) -> u64 {
        self[index]
    }
}

impl WeightedTable for Vec<u64> {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn weight(&self, index: usize) -> u64 {
        self[index]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACE
// ═══════════════════════════════════════════════════════════════════════════════

/// One recorded decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Full label including scopes
    pub label: String,
    /// Raw values taken from the source
    pub draws: Vec<u64>,
    /// Chosen item indexes, in draw order
    pub chosen: Vec<usize>,
    /// Ids of the chosen items
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

/// Ordered audit trail of every decision in a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTrace {
    records: Vec<DecisionRecord>,
}

impl DecisionTrace {
    /// All records in call order
    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    /// Labels in call order
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.label.as_str()).collect()
    }

    /// Every raw source value in call order
    pub fn draws(&self) -> Vec<u64> {
        self.records
            .iter()
            .flat_map(|r| r.draws.iter().copied())
            .collect()
    }

    /// Number of decisions
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Labelled, recorded weighted choices over a random source
///
/// One generator belongs to one round; it is never shared between rounds.
pub struct DecisionGenerator {
    source: Box<dyn RandomSource>,
    trace: DecisionTrace,
    scopes: Vec<String>,
    record: bool,
}

impl DecisionGenerator {
    /// Create a generator over a source
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            trace: DecisionTrace::default(),
            scopes: Vec::new(),
            record: true,
        }
    }

    /// Create a generator over a seeded ChaCha8 source
    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededSource::new(seed))
    }

    /// Create a generator replaying a recorded trace
    pub fn replay(trace: &DecisionTrace) -> Self {
        Self::new(ReplaySource::from_trace(trace))
    }

    /// Builder: turn trace recording on or off
    pub fn with_recording(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Recorded decisions so far
    pub fn trace(&self) -> &DecisionTrace {
        &self.trace
    }

    /// Consume the generator, keeping its trace
    pub fn into_trace(self) -> DecisionTrace {
        self.trace
    }

    /// Enter a label scope; it is left when the guard drops
    pub fn scoped(&mut self, scope: impl Into<String>) -> ScopedDecisionGenerator<'_> {
        self.scopes.push(scope.into());
        ScopedDecisionGenerator { generator: self }
    }

    fn full_label(&self, label: String) -> String {
        if self.scopes.is_empty() {
            label
        } else {
            format!("{}/{}", self.scopes.join("/"), label)
        }
    }

    /// Choose one item of a weighted table
    pub fn choose_one_index<T: WeightedTable + ?Sized>(
        &mut self,
        table: &T,
        label: impl FnOnce() -> String,
    ) -> DecisionResult<usize> {
        self.choose_one_weighted(table.item_count(), |i| table.weight(i), table.total_weight(), label)
    }

    /// Choose one index in `0..item_count` weighted by `weight`
    pub fn choose_one_weighted(
        &mut self,
        item_count: usize,
        weight: impl Fn(usize) -> u64,
        total_weight: u64,
        label: impl FnOnce() -> String,
    ) -> DecisionResult<usize> {
        let chosen = self.choose_indexes(
            item_count,
            1,
            false,
            weight,
            total_weight,
            |_| String::new(),
            label,
        )?;
        Ok(chosen[0])
    }

    /// Choose `how_many` indexes in `0..item_count` weighted by `weight`
    ///
    /// With `distinct`, each chosen index is excluded from the following
    /// draws and its weight is removed from the running total. `id` names a
    /// chosen item for the trace; return an empty string to record no id.
    #[allow(clippy::too_many_arguments)]
    pub fn choose_indexes(
        &mut self,
        item_count: usize,
        how_many: usize,
        distinct: bool,
        weight: impl Fn(usize) -> u64,
        total_weight: u64,
        id: impl Fn(usize) -> String,
        label: impl FnOnce() -> String,
    ) -> DecisionResult<Vec<usize>> {
        let label = self.full_label(label());

        let actual = (0..item_count).try_fold(0u64, |acc, i| acc.checked_add(weight(i)));
        if actual != Some(total_weight) {
            return Err(DecisionError::WeightMismatch {
                label,
                supplied: total_weight,
                actual: actual.unwrap_or(u64::MAX),
            });
        }
        if distinct {
            let available = (0..item_count).filter(|&i| weight(i) > 0).count();
            if how_many > available {
                return Err(DecisionError::NotEnoughItems {
                    label,
                    requested: how_many,
                    available,
                });
            }
        }

        let mut excluded = vec![false; if distinct { item_count } else { 0 }];
        let mut remaining = total_weight;
        let mut draws = Vec::with_capacity(how_many);
        let mut chosen = Vec::with_capacity(how_many);

        for _ in 0..how_many {
            if remaining == 0 {
                return Err(DecisionError::ZeroTotalWeight { label });
            }
            let value = self.source.next_below(remaining)?;

            let mut cumulative = 0u64;
            let index = (0..item_count)
                .filter(|&i| !distinct || !excluded[i])
                .find(|&i| {
                    cumulative += weight(i);
                    value < cumulative
                })
                .ok_or_else(|| DecisionError::WeightMismatch {
                    label: label.clone(),
                    supplied: remaining,
                    actual: cumulative,
                })?;

            if distinct {
                excluded[index] = true;
                remaining -= weight(index);
            }
            draws.push(value);
            chosen.push(index);
        }

        log::trace!("[Decision] {} -> {:?}", label, chosen);

        if self.record {
            let ids = chosen
                .iter()
                .map(|&i| id(i))
                .filter(|s| !s.is_empty())
                .collect();
            self.trace.records.push(DecisionRecord {
                label,
                draws,
                chosen: chosen.clone(),
                ids,
            });
        }
        Ok(chosen)
    }
}

impl std::fmt::Debug for DecisionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionGenerator")
            .field("decisions", &self.trace.len())
            .field("scopes", &self.scopes)
            .field("record", &self.record)
            .finish()
    }
}

/// Guard for a label scope; derefs to the generator
pub struct ScopedDecisionGenerator<'a> {
    generator: &'a mut DecisionGenerator,
}

impl Deref for ScopedDecisionGenerator<'_> {
    type Target = DecisionGenerator;

    fn deref(&self) -> &DecisionGenerator {
        self.generator
    }
}

impl DerefMut for ScopedDecisionGenerator<'_> {
    fn deref_mut(&mut self) -> &mut DecisionGenerator {
        self.generator
    }
}

impl Drop for ScopedDecisionGenerator<'_> {
    fn drop(&mut self) {
        self.generator.scopes.pop();
    }
}

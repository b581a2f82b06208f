//! Reel strips — weighted sequences of symbol stops
//!
//! The engine consumes strips through the [`Strip`] trait; the loader that
//! builds them lives outside this crate. [`WeightedStrip`] is the plain
//! in-memory implementation.

use std::fmt::Debug;
use std::sync::Arc;

use crate::decision::WeightedTable;
use crate::error::{OutcomeError, OutcomeResult};
use crate::symbols::SymbolList;

/// A weighted, ordered sequence of symbol stops
///
/// Stop indexes wrap around the strip length, like a physical reel.
pub trait Strip: WeightedTable + Send + Sync + Debug {
    /// Number of stops
    fn len(&self) -> usize;

    /// Check if the strip has no stops
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbols this strip draws from
    fn symbols(&self) -> &SymbolList;

    /// Symbol index shown at a stop
    fn symbol_index(&self, stop: usize) -> usize;

    /// Symbol name shown at a stop
    fn symbol(&self, stop: usize) -> &str {
        self.symbols().name(self.symbol_index(stop)).unwrap_or("")
    }

    /// Stops that show `symbol`, ascending
    fn symbol_positions(&self, symbol: usize) -> Vec<usize>;

    /// Same stops, symbols and weights as `other`?
    fn strip_eq(&self, other: &dyn Strip) -> bool {
        self.len() == other.len()
            && self.symbols() == other.symbols()
            && self.total_weight() == other.total_weight()
            && (0..self.len()).all(|stop| {
                self.symbol_index(stop) == other.symbol_index(stop)
                    && self.weight(stop) == other.weight(stop)
            })
    }
}

/// Strips are loaded once per paytable and shared by every evaluation
pub type SharedStrip = Arc<dyn Strip>;

/// In-memory weighted strip
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedStrip {
    symbols: Arc<SymbolList>,
    stops: Vec<usize>,
    weights: Vec<u64>,
    total_weight: u64,
}

impl WeightedStrip {
    /// Create a strip from symbol indexes and per-stop weights
    pub fn new(symbols: Arc<SymbolList>, stops: Vec<usize>, weights: Vec<u64>) -> OutcomeResult<Self> {
        if stops.is_empty() {
            return Err(OutcomeError::EmptyStrip);
        }
        if stops.len() != weights.len() {
            return Err(OutcomeError::LengthMismatch {
                left: stops.len(),
                right: weights.len(),
            });
        }
        if let Some(&bad) = stops.iter().find(|&&s| s >= symbols.len()) {
            return Err(OutcomeError::UnknownSymbol(format!("#{}", bad)));
        }
        let total_weight = weights
            .iter()
            .try_fold(0u64, |acc, &w| acc.checked_add(w))
            .ok_or(OutcomeError::WeightOverflow)?;

        Ok(Self {
            symbols,
            stops,
            weights,
            total_weight,
        })
    }

    /// Create a strip where every stop has weight 1
    pub fn uniform(symbols: Arc<SymbolList>, stops: Vec<usize>) -> OutcomeResult<Self> {
        let weights = vec![1; stops.len()];
        Self::new(symbols, stops, weights)
    }

    /// Create a uniform strip from symbol names
    pub fn from_names(symbols: Arc<SymbolList>, names: &[&str]) -> OutcomeResult<Self> {
        let stops = names
            .iter()
            .map(|n| symbols.resolve(n))
            .collect::<OutcomeResult<Vec<_>>>()?;
        Self::uniform(symbols, stops)
    }

    /// Wrap into a shared strip handle
    pub fn shared(self) -> SharedStrip {
        Arc::new(self)
    }
}

impl WeightedTable for WeightedStrip {
    fn item_count(&self) -> usize {
        self.stops.len()
    }

    fn weight(&self, index: usize) -> u64 {
        self.weights[index % self.weights.len()]
    }

    fn total_weight(&self) -> u64 {
        self.total_weight
    }
}

impl Strip for WeightedStrip {
    fn len(&self) -> usize {
        self.stops.len()
    }

    fn symbols(&self) -> &SymbolList {
        &self.symbols
    }

    fn symbol_index(&self, stop: usize) -> usize {
        self.stops[stop % self.stops.len()]
    }

    fn symbol_positions(&self, symbol: usize) -> Vec<usize> {
        self.stops
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == symbol)
            .map(|(stop, _)| stop)
            .collect()
    }
}

/// A strip paired with the stops showing one queried symbol
///
/// Weighted like the underlying stops, so a draw over the list picks a stop
/// that is guaranteed to show the symbol.
#[derive(Debug, Clone)]
pub struct IndexList<'a> {
    strip: &'a dyn Strip,
    symbol: usize,
    positions: Vec<usize>,
}

impl<'a> IndexList<'a> {
    /// Collect the stops of `strip` showing `symbol`
    pub fn new(strip: &'a dyn Strip, symbol: usize) -> Self {
        Self {
            strip,
            symbol,
            positions: strip.symbol_positions(symbol),
        }
    }

    /// The queried symbol
    pub fn symbol(&self) -> usize {
        self.symbol
    }

    /// Matching stops, ascending
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Stop for the `index`-th entry of the list
    pub fn stop(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// Number of matching stops
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// No stop shows the symbol?
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The underlying strip
    pub fn strip(&self) -> &dyn Strip {
        self.strip
    }
}

impl WeightedTable for IndexList<'_> {
    fn item_count(&self) -> usize {
        self.positions.len()
    }

    fn weight(&self, index: usize) -> u64 {
        self.strip.weight(self.positions[index])
    }
}

//! Symbol list — ordered symbol names resolved to indexes once
//!
//! Evaluation works on symbol indexes only; names are looked up when a
//! paytable is loaded and when results are reported.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, OutcomeResult};

/// Ordered symbol names with a name → index table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymbolList {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl SymbolList {
    /// Create a symbol list; later duplicates of a name are ignored by lookup
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut by_name = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            by_name.entry(name.clone()).or_insert(index);
        }
        Self { names, by_name }
    }

    /// Index of a symbol name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Index of a symbol name, failing on unknown names
    pub fn resolve(&self, name: &str) -> OutcomeResult<usize> {
        self.index_of(name)
            .ok_or_else(|| OutcomeError::UnknownSymbol(name.to_string()))
    }

    /// Name of a symbol index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names in index order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl PartialEq for SymbolList {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for SymbolList {}

impl From<Vec<String>> for SymbolList {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<SymbolList> for Vec<String> {
    fn from(list: SymbolList) -> Self {
        list.names
    }
}

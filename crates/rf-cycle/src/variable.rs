//! Variables and cycle inputs
//!
//! Inputs are the typed key-value carrier threaded from one cycle to the
//! next. Each variable carries a lifespan that decides when it is dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{CycleError, CycleResult};

/// How long a variable survives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifespan {
    /// Dropped before the next cycle
    OneCycle,
    /// Kept until the round (base game and its features) ends
    OneGame,
    /// Kept across rounds
    Permanent,
}

/// A named, typed value with a lifespan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: serde_json::Value,
    pub lifespan: Lifespan,
}

impl Variable {
    /// Create a new variable
    pub fn new(name: impl Into<String>, value: serde_json::Value, lifespan: Lifespan) -> Self {
        Self {
            name: name.into(),
            value,
            lifespan,
        }
    }

    /// Create a variable from any serializable value
    pub fn from_serialize<T: Serialize>(
        name: impl Into<String>,
        value: &T,
        lifespan: Lifespan,
    ) -> CycleResult<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| CycleError::Serialization(e.to_string()))?;
        Ok(Self::new(name, value, lifespan))
    }

    /// Decode the value
    pub fn decode<T: DeserializeOwned>(&self) -> CycleResult<T> {
        serde_json::from_value(self.value.clone())
            .map_err(|e| CycleError::Serialization(format!("{}: {}", self.name, e)))
    }
}

/// Variables handed to a cycle, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    variables: BTreeMap<String, Variable>,
}

impl Inputs {
    /// Create empty inputs
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a variable
    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value, lifespan: Lifespan) -> Self {
        self.set(Variable::new(name, value, lifespan));
        self
    }

    /// Insert or replace a variable
    pub fn set(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Get a variable
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Get a decoded value, `None` if absent or of another type
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.variables
            .get(name)
            .and_then(|v| serde_json::from_value(v.value.clone()).ok())
    }

    /// Check if a variable exists
    pub fn has(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Remove a variable
    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Copy of these inputs keeping only variables that pass `keep`
    pub fn filtered(&self, keep: impl Fn(Lifespan) -> bool) -> Inputs {
        Self {
            variables: self
                .variables
                .iter()
                .filter(|(_, v)| keep(v.lifespan))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Iterate over variables in name order
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

//! Stages, exits and stage results
//!
//! A stage is one named piece of game logic (base game, free games, respin).
//! After it runs it reports the exits it wants to take and the results it
//! produced; connections map `(stage, exit)` pairs to the next stage.

use serde::{Deserialize, Serialize};

use crate::modifier::CyclesModifier;
use crate::variable::Lifespan;

/// Name of a logic stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageName(pub String);

impl StageName {
    /// Create a new stage name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configured transition `(initial_stage, exit_name) -> final_stage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConnection {
    pub initial_stage: StageName,
    pub exit_name: String,
    pub final_stage: StageName,
}

impl StageConnection {
    /// Create a new connection
    pub fn new(
        initial_stage: impl Into<StageName>,
        exit_name: impl Into<String>,
        final_stage: impl Into<StageName>,
    ) -> Self {
        Self {
            initial_stage: initial_stage.into(),
            exit_name: exit_name.into(),
            final_stage: final_stage.into(),
        }
    }

    /// Does this connection leave `stage` through `exit_name`?
    pub fn matches(&self, stage: &StageName, exit_name: &str) -> bool {
        &self.initial_stage == stage && self.exit_name == exit_name
    }
}

/// An exit a stage wants to take, with the queue edit that goes with it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesiredExit {
    pub name: String,
    pub modifier: CyclesModifier,
}

impl DesiredExit {
    pub fn new(name: impl Into<String>, modifier: CyclesModifier) -> Self {
        Self {
            name: name.into(),
            modifier,
        }
    }
}

/// Type tag of a stage result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    VariablePermanent,
    VariableOneGame,
    VariableOneCycle,
    AwardList,
    ExitList,
    ProgressiveList,
    Presentation,
}

impl ResultKind {
    /// Lifespan for variable kinds, `None` otherwise
    pub fn lifespan(&self) -> Option<Lifespan> {
        match self {
            Self::VariablePermanent => Some(Lifespan::Permanent),
            Self::VariableOneGame => Some(Lifespan::OneGame),
            Self::VariableOneCycle => Some(Lifespan::OneCycle),
            _ => None,
        }
    }

    /// Is this one of the variable kinds?
    pub fn is_variable(&self) -> bool {
        self.lifespan().is_some()
    }
}

/// A named value produced by a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub kind: ResultKind,
    pub value: serde_json::Value,
}

impl StageResult {
    /// Create a new stage result
    pub fn new(name: impl Into<String>, kind: ResultKind, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }

    /// Create a permanent variable result
    pub fn permanent(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(name, ResultKind::VariablePermanent, value)
    }

    /// Create a one-game variable result
    pub fn one_game(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(name, ResultKind::VariableOneGame, value)
    }

    /// Create a one-cycle variable result
    pub fn one_cycle(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(name, ResultKind::VariableOneCycle, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_matches() {
        let connection = StageConnection::new("Base", "FreeGames", "Free");
        assert!(connection.matches(&StageName::new("Base"), "FreeGames"));
        assert!(!connection.matches(&StageName::new("Free"), "FreeGames"));
        assert!(!connection.matches(&StageName::new("Base"), "Respin"));
    }

    #[test]
    fn test_result_kind_lifespan() {
        assert_eq!(ResultKind::VariablePermanent.lifespan(), Some(Lifespan::Permanent));
        assert_eq!(ResultKind::VariableOneCycle.lifespan(), Some(Lifespan::OneCycle));
        assert!(!ResultKind::AwardList.is_variable());
        assert!(!ResultKind::Presentation.is_variable());
    }

    #[test]
    fn test_modifier_serde_shape() {
        let exit = DesiredExit::new("FreeGames", CyclesModifier::trigger("FreeGames", 10));
        let value = serde_json::to_value(&exit).unwrap();
        assert_eq!(value["modifier"]["type"], json!("trigger"));
        assert_eq!(value["modifier"]["position"], json!("at_end"));

        let back: DesiredExit = serde_json::from_value(value).unwrap();
        assert_eq!(back, exit);
    }
}

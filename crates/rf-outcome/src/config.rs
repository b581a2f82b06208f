//! Engine and game configuration
//!
//! [`EngineConfig`] tunes the round driver. [`GameConfig`] is the
//! name-based game definition read from JSON or YAML; [`GameConfig::resolve`]
//! checks it once and turns it into a [`Paytable`].

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rf_cycle::{StageConnection, StageName};

use crate::cascade::ReplacementRule;
use crate::decision::{DecisionGenerator, SeededSource};
use crate::error::OutcomeError;
use crate::game::PrizeTrigger;
use crate::mask::CellMask;
use crate::multiplier::{MultiplierUsage, SymbolMultiplier};
use crate::paytable::{Paytable, RespinSetup, StageDef, StageKind, StripReplacementSetup};
use crate::pattern::{Pattern, Patterns};
use crate::prize::{MaskPrize, PrizeKind, Strategy};
use crate::replacement::ReplacementTarget;
use crate::respin::RespinConfig;
use crate::strip::{SharedStrip, WeightedStrip};
use crate::symbols::SymbolList;
use crate::window::SymbolWindowStructure;

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Round driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard stop for runaway retrigger chains
    pub max_cycles_per_round: u32,

    /// Keep the decision trace of every round
    pub record_decisions: bool,

    /// Base seed; round `n` uses `seed + n` (None = OS entropy)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cycles_per_round: 1000,
            record_decisions: true,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Config for long batch simulations: no trace recording
    pub fn simulation() -> Self {
        Self {
            record_decisions: false,
            ..Default::default()
        }
    }

    /// Config for replayable audit runs
    pub fn audit() -> Self {
        Self {
            record_decisions: true,
            max_cycles_per_round: 10_000,
            ..Default::default()
        }
    }

    /// Builder: set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set cycle limit
    pub fn with_max_cycles(mut self, max: u32) -> Self {
        self.max_cycles_per_round = max;
        self
    }

    /// Builder: trace recording on or off
    pub fn with_recording(mut self, record: bool) -> Self {
        self.record_decisions = record;
        self
    }

    /// Generator for round number `round`
    pub fn generator(&self, round: u64) -> DecisionGenerator {
        let generator = match self.seed {
            Some(seed) => DecisionGenerator::seeded(seed.wrapping_add(round)),
            None => DecisionGenerator::new(SeededSource::from_os_rng()),
        };
        generator.with_recording(self.record_decisions)
    }
}

/// Bet numbers, passed through to prize scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetContext {
    /// Total stake of the round, in credits
    pub total_bet: i64,
    /// Selected lines; 0 plays every configured line
    pub line_count: u32,
    /// Bet multiplier applied to every win
    pub multiplier: i64,
}

impl Default for BetContext {
    fn default() -> Self {
        Self {
            total_bet: 1,
            line_count: 0,
            multiplier: 1,
        }
    }
}

impl BetContext {
    /// Bet over every line
    pub fn new(total_bet: i64) -> Self {
        Self {
            total_bet,
            ..Default::default()
        }
    }

    /// Builder: play only the first `count` lines
    pub fn with_lines(mut self, count: u32) -> Self {
        self.line_count = count;
        self
    }

    /// Builder: set bet multiplier
    pub fn with_multiplier(mut self, multiplier: i64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Game configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Outcome error: {0}")]
    Outcome(#[from] OutcomeError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ═══════════════════════════════════════════════════════════════════════════════
// GAME CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Rectangular grid; cell index is `reel * rows + row`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub reels: usize,
    pub rows: usize,
}

/// Extra symbol requirement of a prize, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredConfig {
    pub symbol: String,
    pub count: usize,
}

/// Paytable entry, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeConfig {
    pub name: String,
    pub symbols: Vec<String>,
    pub count: usize,
    pub value: i64,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub required: Vec<RequiredConfig>,
    #[serde(default)]
    pub kind: PrizeKind,
    #[serde(default)]
    pub scale_by_total_bet: bool,
}

/// Prize tables per evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTables {
    #[serde(default)]
    pub lines: Vec<PrizeConfig>,
    #[serde(default)]
    pub ways: Vec<PrizeConfig>,
    #[serde(default)]
    pub scatters: Vec<PrizeConfig>,
}

/// Mystery symbol rule, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryConfig {
    pub symbol: String,
    pub candidates: Vec<String>,
    pub weights: Vec<u64>,
}

/// Drawn strip replacements, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripReplacementConfig {
    pub targets: Vec<ReplacementTarget>,
    pub candidates: Vec<String>,
    pub weights: Vec<u64>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub dependent: bool,
}

fn default_multiplier() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

/// Stage definition, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,
    #[serde(default)]
    pub kind: StageKind,
    /// Symbol names per strip
    pub strips: Vec<Vec<String>>,
    /// Per-stop weights per strip; uniform when absent
    #[serde(default)]
    pub weights: Option<Vec<Vec<u64>>>,
    #[serde(default = "default_multiplier")]
    pub multiplier: i64,
    #[serde(default)]
    pub expanding: Vec<String>,
    #[serde(default)]
    pub mystery: Vec<MysteryConfig>,
    #[serde(default)]
    pub replacements: Option<StripReplacementConfig>,
}

/// Exit routing, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub from: String,
    pub exit: String,
    pub to: String,
}

/// Multiplier symbol, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMultiplierConfig {
    pub symbol: String,
    pub multiplier: i64,
}

fn default_respin_id() -> String {
    "Respin".to_string()
}

/// Respin feature, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespinSetupConfig {
    #[serde(default = "default_respin_id")]
    pub cycle_id: String,
    #[serde(default = "default_respin_id")]
    pub exit: String,
    pub respin_symbols: Vec<String>,
    #[serde(default)]
    pub frame_symbol: Option<String>,
    pub prizes: Vec<PrizeConfig>,
    pub trigger_symbols: Vec<String>,
    pub trigger_threshold: usize,
    pub initial_count: u32,
    pub reset_count: u32,
}

/// Complete game definition as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub name: String,
    pub symbols: Vec<String>,
    pub grid: GridConfig,
    /// Row per reel for each payline; straight rows when empty
    #[serde(default)]
    pub lines: Vec<Vec<usize>>,
    #[serde(default = "default_true")]
    pub pay_best: bool,
    #[serde(default)]
    pub prizes: PrizeTables,
    pub base_stage: String,
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
    #[serde(default)]
    pub triggers: Vec<PrizeTrigger>,
    #[serde(default)]
    pub symbol_multipliers: Vec<SymbolMultiplierConfig>,
    #[serde(default)]
    pub multiplier_usage: MultiplierUsage,
    #[serde(default)]
    pub multiplier_exclusions: Vec<String>,
    #[serde(default)]
    pub respin: Option<RespinSetupConfig>,
}

impl GameConfig {
    /// Parse from JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load from a file; `.yaml`/`.yml` parse as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every name and build the paytable
    pub fn resolve(&self) -> ConfigResult<Paytable> {
        let resolver = Resolver::new(self)?;
        let paytable = resolver.paytable(self)?;
        log::debug!(
            "[Config] Resolved '{}': {} symbols, {} cells, {} lines, {} stages",
            paytable.name,
            paytable.symbols.len(),
            paytable.cell_count(),
            paytable.lines.lines().len(),
            paytable.stages.len()
        );
        Ok(paytable)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

struct Resolver {
    symbols: Arc<SymbolList>,
    structure: Arc<SymbolWindowStructure>,
    grid: GridConfig,
}

impl Resolver {
    fn new(config: &GameConfig) -> ConfigResult<Self> {
        let GridConfig { reels, rows } = config.grid;
        if reels == 0 || rows == 0 {
            return Err(ConfigError::InvalidGrid(format!("{}x{}", reels, rows)));
        }
        Ok(Self {
            symbols: Arc::new(SymbolList::new(config.symbols.iter().cloned())),
            structure: Arc::new(SymbolWindowStructure::rectangular(reels, rows)?),
            grid: config.grid,
        })
    }

    fn symbol(&self, name: &str) -> ConfigResult<usize> {
        self.symbols
            .index_of(name)
            .ok_or_else(|| ConfigError::UnknownSymbol(name.to_string()))
    }

    fn symbol_list(&self, names: &[String]) -> ConfigResult<Vec<usize>> {
        names.iter().map(|n| self.symbol(n)).collect()
    }

    fn prize(&self, config: &PrizeConfig) -> ConfigResult<MaskPrize> {
        let mut prize = MaskPrize::new(
            config.name.clone(),
            self.symbol_list(&config.symbols)?,
            config.count,
            config.value,
        )
        .with_strategy(config.strategy)
        .with_kind(config.kind.clone());
        for required in &config.required {
            prize = prize.with_required(self.symbol(&required.symbol)?, required.count);
        }
        if config.scale_by_total_bet {
            prize = prize.scaled_by_total_bet();
        }
        Ok(prize)
    }

    fn prizes(&self, configs: &[PrizeConfig]) -> ConfigResult<Vec<MaskPrize>> {
        configs.iter().map(|p| self.prize(p)).collect()
    }

    fn lines(&self, lines: &[Vec<usize>]) -> ConfigResult<Vec<Pattern>> {
        let GridConfig { reels, rows } = self.grid;
        let cell_count = self.structure.cell_count();
        let straight: Vec<Vec<usize>>;
        let lines = if lines.is_empty() {
            straight = (0..rows).map(|row| vec![row; reels]).collect();
            &straight
        } else {
            lines
        };

        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if line.len() != reels || line.iter().any(|&row| row >= rows) {
                    return Err(ConfigError::InvalidGrid(format!(
                        "line {} does not fit {}x{}",
                        index + 1,
                        reels,
                        rows
                    )));
                }
                let cells: Vec<usize> = line
                    .iter()
                    .enumerate()
                    .map(|(reel, &row)| reel * rows + row)
                    .collect();
                Ok(Pattern::line(format!("Line{}", index + 1), cell_count, &cells)?)
            })
            .collect()
    }

    fn strips(&self, stage: &StageConfig, expected: usize) -> ConfigResult<Vec<SharedStrip>> {
        if stage.strips.len() != expected {
            return Err(OutcomeError::StripCountMismatch {
                strips: stage.strips.len(),
                expected,
            }
            .into());
        }
        stage
            .strips
            .iter()
            .enumerate()
            .map(|(index, names)| {
                let stops = self.symbol_list(names)?;
                let strip = match stage.weights.as_ref().and_then(|w| w.get(index)) {
                    Some(weights) => WeightedStrip::new(Arc::clone(&self.symbols), stops, weights.clone())?,
                    None => WeightedStrip::uniform(Arc::clone(&self.symbols), stops)?,
                };
                Ok(strip.shared())
            })
            .collect()
    }

    fn stage(&self, stage: &StageConfig) -> ConfigResult<StageDef> {
        let expected = match stage.kind {
            StageKind::Spin => self.structure.population_count(),
            StageKind::Respin => self.structure.cell_count(),
        };
        let mystery = stage
            .mystery
            .iter()
            .map(|m| {
                Ok(ReplacementRule {
                    symbol: self.symbol(&m.symbol)?,
                    candidates: self.symbol_list(&m.candidates)?,
                    weights: m.weights.clone(),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        let replacements = stage
            .replacements
            .as_ref()
            .map(|r| {
                if r.weights.len() != r.candidates.len() {
                    return Err(ConfigError::Outcome(OutcomeError::LengthMismatch {
                        left: r.candidates.len(),
                        right: r.weights.len(),
                    }));
                }
                Ok(StripReplacementSetup {
                    targets: r.targets.clone(),
                    candidates: self.symbol_list(&r.candidates)?,
                    weights: r.weights.clone(),
                    distinct: r.distinct,
                    dependent: r.dependent,
                })
            })
            .transpose()?;

        Ok(StageDef {
            name: StageName::new(stage.name.clone()),
            kind: stage.kind,
            strips: self.strips(stage, expected)?,
            multiplier: stage.multiplier,
            expanding: self.symbol_list(&stage.expanding)?,
            mystery,
            replacements,
        })
    }

    fn respin(&self, config: &RespinSetupConfig) -> ConfigResult<RespinSetup> {
        let frame_symbol = config
            .frame_symbol
            .as_deref()
            .map(|name| self.symbol(name))
            .transpose()?;
        let sizes = vec![1; self.structure.cell_count()];
        let respin = RespinConfig {
            cycle_id: config.cycle_id.clone(),
            respin_symbols: self.symbol_list(&config.respin_symbols)?,
            frame_symbol,
            prizes: self.prizes(&config.prizes)?,
            trigger_symbols: self.symbol_list(&config.trigger_symbols)?,
            trigger_threshold: config.trigger_threshold,
            initial_count: config.initial_count,
            reset_count: config.reset_count,
        };
        // Triggers are checked in spin stages, never inside the respin feature
        if let Some(symbol) = respin.progressive_trigger_symbol() {
            let name = self.symbols.name(symbol).unwrap_or("?").to_string();
            return Err(OutcomeError::ProgressiveOutsideRespin(name).into());
        }
        Ok(RespinSetup {
            config: respin,
            exit: config.exit.clone(),
            structure: Arc::new(SymbolWindowStructure::from_population_sizes(&sizes)?),
        })
    }

    fn paytable(&self, config: &GameConfig) -> ConfigResult<Paytable> {
        let stages = config
            .stages
            .iter()
            .map(|s| self.stage(s))
            .collect::<ConfigResult<Vec<_>>>()?;
        let known = |name: &str| stages.iter().any(|s| s.name.as_str() == name);

        if !known(&config.base_stage) {
            return Err(ConfigError::UnknownStage(config.base_stage.clone()));
        }
        if let Some(bad) = config
            .connections
            .iter()
            .flat_map(|c| [&c.from, &c.to])
            .find(|name| !known(name))
        {
            return Err(ConfigError::UnknownStage(bad.clone()));
        }
        let connections = config
            .connections
            .iter()
            .map(|c| StageConnection::new(c.from.as_str(), c.exit.clone(), c.to.as_str()))
            .collect();

        let symbol_multipliers = config
            .symbol_multipliers
            .iter()
            .map(|m| {
                Ok(SymbolMultiplier {
                    symbol: self.symbol(&m.symbol)?,
                    multiplier: m.multiplier,
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        let lines = self.lines(&config.lines)?;
        let cell_count = self.structure.cell_count();
        let whole = Pattern::new("Scatter", cell_count, vec![CellMask::all_true(cell_count)])?;

        Ok(Paytable {
            name: config.name.clone(),
            symbols: Arc::clone(&self.symbols),
            structure: Arc::clone(&self.structure),
            ways: Patterns::with_auto_clusters(lines.clone())?,
            scatters: Patterns::with_clusters(lines.clone(), vec![whole])?,
            lines: Patterns::new(lines)?,
            line_prizes: self.prizes(&config.prizes.lines)?,
            ways_prizes: self.prizes(&config.prizes.ways)?,
            scatter_prizes: self.prizes(&config.prizes.scatters)?,
            pay_best: config.pay_best,
            base_stage: StageName::new(config.base_stage.clone()),
            stages,
            connections,
            triggers: config.triggers.clone(),
            symbol_multipliers,
            multiplier_usage: config.multiplier_usage,
            multiplier_exclusions: config.multiplier_exclusions.clone(),
            respin: config.respin.as_ref().map(|r| self.respin(r)).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = r#"{
        "name": "Test",
        "symbols": ["WILD", "HP1", "LP1", "SCAT"],
        "grid": { "reels": 3, "rows": 3 },
        "lines": [[1, 1, 1], [0, 0, 0], [2, 2, 2], [0, 1, 2]],
        "prizes": {
            "lines": [{ "name": "HP1x3", "symbols": ["HP1", "WILD"], "count": 3, "value": 10 }],
            "scatters": [{ "name": "SCATx3", "symbols": ["SCAT"], "count": 3, "value": 2 }]
        },
        "base_stage": "Base",
        "stages": [
            { "name": "Base", "strips": [["HP1", "LP1", "SCAT"], ["HP1", "WILD", "LP1"], ["LP1", "HP1", "SCAT"]] },
            { "name": "Free", "strips": [["HP1", "LP1"], ["HP1", "WILD"], ["LP1", "HP1"]], "multiplier": 2 }
        ],
        "connections": [{ "from": "Base", "exit": "FreeGames", "to": "Free" }],
        "triggers": [{ "prize": "SCATx3", "count": 3, "cycle_id": "FreeGames", "cycles": 5, "exit": "FreeGames" }]
    }"#;

    #[test]
    fn test_engine_presets() {
        let config = EngineConfig::default();
        assert_eq!(config.max_cycles_per_round, 1000);
        assert!(config.record_decisions);
        assert!(!EngineConfig::simulation().record_decisions);

        let config = EngineConfig::audit().with_seed(7).with_max_cycles(50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_cycles_per_round, 50);
    }

    #[test]
    fn test_seeded_generators_follow_round() {
        let config = EngineConfig::default().with_seed(100);
        let mut a = config.generator(3);
        let mut b = DecisionGenerator::seeded(103);
        let weights = vec![1u64; 1000];
        for _ in 0..10 {
            assert_eq!(
                a.choose_one_index(&weights, || "X".into()).unwrap(),
                b.choose_one_index(&weights, || "X".into()).unwrap()
            );
        }
    }

    #[test]
    fn test_resolve_json() {
        let config = GameConfig::from_json(GAME).unwrap();
        let paytable = config.resolve().unwrap();

        assert_eq!(paytable.cell_count(), 9);
        assert_eq!(paytable.lines.lines().len(), 4);
        assert!(paytable.ways.has_clusters());
        assert_eq!(paytable.line_prizes[0].symbols, vec![1, 0]);
        assert_eq!(paytable.stage(&StageName::new("Free")).unwrap().multiplier, 2);
        assert!(paytable.stage(&StageName::new("Missing")).is_err());
        // Line 4 is the diagonal: reel 0 row 0, reel 1 row 1, reel 2 row 2
        let diagonal: Vec<usize> = paytable.lines.lines()[3].mask().enumerate_indexes().collect();
        assert_eq!(diagonal, vec![0, 4, 8]);
    }

    #[test]
    fn test_json_yaml_agree() {
        let config = GameConfig::from_json(GAME).unwrap();
        let yaml = serde_yml::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_names_fail() {
        let mut config = GameConfig::from_json(GAME).unwrap();
        config.prizes.lines[0].symbols.push("NOPE".into());
        assert!(matches!(config.resolve(), Err(ConfigError::UnknownSymbol(name)) if name == "NOPE"));

        let mut config = GameConfig::from_json(GAME).unwrap();
        config.connections[0].to = "Bonus".into();
        assert!(matches!(config.resolve(), Err(ConfigError::UnknownStage(name)) if name == "Bonus"));
    }

    #[test]
    fn test_bad_grid_and_strips() {
        let mut config = GameConfig::from_json(GAME).unwrap();
        config.lines.push(vec![0, 3, 0]);
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidGrid(_))));

        let mut config = GameConfig::from_json(GAME).unwrap();
        config.stages[0].strips.pop();
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::Outcome(OutcomeError::StripCountMismatch { strips: 2, expected: 3 }))
        ));
    }

    #[test]
    fn test_progressive_trigger_symbol_rejected_at_resolve() {
        let progressive = |name: &str, kind: PrizeKind| PrizeConfig {
            name: name.to_string(),
            symbols: vec![name.to_string()],
            count: 1,
            value: 100,
            strategy: Strategy::default(),
            required: Vec::new(),
            kind,
            scale_by_total_bet: false,
        };
        let mut config = GameConfig::from_json(GAME).unwrap();
        config.respin = Some(RespinSetupConfig {
            cycle_id: "Respin".into(),
            exit: "Respin".into(),
            respin_symbols: vec!["HP1".into(), "SCAT".into()],
            frame_symbol: None,
            prizes: vec![
                progressive("HP1", PrizeKind::Standard),
                progressive("SCAT", PrizeKind::Progressive("GRAND".into())),
            ],
            trigger_symbols: vec!["HP1".into()],
            trigger_threshold: 3,
            initial_count: 3,
            reset_count: 3,
        });
        assert!(config.resolve().unwrap().respin.is_some());

        // SCAT pays as a progressive, so it may not start the feature
        if let Some(respin) = config.respin.as_mut() {
            respin.trigger_symbols.push("SCAT".into());
        }
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::Outcome(OutcomeError::ProgressiveOutsideRespin(name))) if name == "SCAT"
        ));
    }

    #[test]
    fn test_default_lines_are_rows() {
        let mut config = GameConfig::from_json(GAME).unwrap();
        config.lines.clear();
        let paytable = config.resolve().unwrap();
        let top: Vec<usize> = paytable.lines.lines()[0].mask().enumerate_indexes().collect();
        assert_eq!(top, vec![0, 3, 6]);
    }
}

use ddz_bot::policy::{HeuristicPolicy, Policy, SolverPolicy};
use ddz_core::game::serialization::PlaySnapshot;
use ddz_core::model::combo::Combo;
use ddz_core::model::deck::Deck;
use ddz_core::model::hand::Hand;
use ddz_core::model::side::Side;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_MAX_TURNS: usize = 128;
const DEFAULT_DEAL_CARDS: usize = 6;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    #[serde(default)]
    pub positions: Vec<PositionConfig>,
    #[serde(default)]
    pub deals: Option<DealConfig>,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        if self.positions.is_empty() && self.deals.is_none() {
            return Err(ValidationError::InvalidField {
                field: "positions".to_string(),
                message: "at least one position or a deals block must be specified".to_string(),
            });
        }
        validate_position_names(&self.positions)?;
        for position in &self.positions {
            position.resolve()?;
        }
        if let Some(deals) = self.deals.as_ref() {
            deals.validate()?;
        }
        self.limits.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    /// Fixed positions in file order, followed by the seeded random deals.
    pub fn resolved_positions(&self) -> Result<Vec<ResolvedPosition>, ValidationError> {
        let mut resolved = self
            .positions
            .iter()
            .map(PositionConfig::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(deals) = self.deals.as_ref() {
            resolved.extend(deals.resolve()?);
        }
        Ok(resolved)
    }
}

/// A hand-written endgame position.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PositionConfig {
    pub name: String,
    pub landlord: String,
    pub peasant: String,
    #[serde(default = "default_first")]
    pub first: Side,
    /// Play the side on move has to beat, made by the other side.
    #[serde(default)]
    pub last_play: Option<PlaySnapshot>,
    #[serde(default)]
    pub expect: Option<Side>,
}

impl PositionConfig {
    fn resolve(&self) -> Result<ResolvedPosition, ValidationError> {
        let field = |suffix: &str| format!("positions[{}].{suffix}", self.name);
        let landlord = parse_hand(&self.landlord, field("landlord"))?;
        let peasant = parse_hand(&self.peasant, field("peasant"))?;
        landlord
            .combined(&peasant)
            .map_err(|err| ValidationError::InvalidField {
                field: field("peasant"),
                message: format!("hands cannot come from one deck: {err}"),
            })?;
        if landlord.is_empty() || peasant.is_empty() {
            return Err(ValidationError::InvalidField {
                field: field("landlord"),
                message: "both hands must hold at least one card".to_string(),
            });
        }
        let last_play = self
            .last_play
            .as_ref()
            .map(|snapshot| {
                snapshot
                    .restore()
                    .map_err(|err| ValidationError::InvalidField {
                        field: field("last_play"),
                        message: err.to_string(),
                    })
            })
            .transpose()?;

        Ok(ResolvedPosition {
            name: self.name.clone(),
            landlord,
            peasant,
            first: self.first,
            last_play,
            expect: self.expect,
            deal_seed: None,
        })
    }
}

fn default_first() -> Side {
    Side::Landlord
}

/// Random endgame sampling block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    pub seed: Option<u64>,
    pub count: usize,
    #[serde(default = "default_deal_cards")]
    pub landlord_cards: usize,
    #[serde(default = "default_deal_cards")]
    pub peasant_cards: usize,
    #[serde(default = "default_first")]
    pub first: Side,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            seed: None,
            count: 1,
            landlord_cards: DEFAULT_DEAL_CARDS,
            peasant_cards: DEFAULT_DEAL_CARDS,
            first: default_first(),
        }
    }
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.count".to_string(),
                message: "number of deals must be greater than zero".to_string(),
            });
        }

        for (label, cards) in [
            ("deals.landlord_cards", self.landlord_cards),
            ("deals.peasant_cards", self.peasant_cards),
        ] {
            if cards == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "hand size must be greater than zero".to_string(),
                });
            }
        }

        if self.landlord_cards + self.peasant_cards > Deck::SIZE {
            return Err(ValidationError::InvalidField {
                field: "deals".to_string(),
                message: format!("hands exceed the {}-card deck", Deck::SIZE),
            });
        }

        Ok(())
    }

    fn resolve(&self) -> Result<Vec<ResolvedPosition>, ValidationError> {
        let mut rng = StdRng::seed_from_u64(self.seed.unwrap_or(0));
        let mut positions = Vec::with_capacity(self.count);
        for index in 0..self.count {
            let deal_seed = rng.next_u64();
            let [landlord, peasant] = Deck::shuffled_with_seed(deal_seed)
                .deal(self.landlord_cards, self.peasant_cards)
                .ok_or_else(|| ValidationError::InvalidField {
                    field: "deals".to_string(),
                    message: "deck too small for the requested hands".to_string(),
                })?;
            positions.push(ResolvedPosition {
                name: format!("deal_{index:04}"),
                landlord,
                peasant,
                first: self.first,
                last_play: None,
                expect: None,
                deal_seed: Some(deal_seed),
            });
        }
        Ok(positions)
    }
}

fn default_deal_cards() -> usize {
    DEFAULT_DEAL_CARDS
}

/// Policy used by each side.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentsConfig {
    #[serde(default = "default_agent")]
    pub landlord: AgentKind,
    #[serde(default = "default_agent")]
    pub peasant: AgentKind,
    /// Opponent hand size at or below which heuristic agents spend bombs.
    #[serde(default)]
    pub bomb_threshold: Option<usize>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            landlord: default_agent(),
            peasant: default_agent(),
            bomb_threshold: None,
        }
    }
}

impl AgentsConfig {
    pub fn for_side(&self, side: Side) -> AgentKind {
        match side {
            Side::Landlord => self.landlord,
            Side::Peasant => self.peasant,
        }
    }

    pub fn spawn_policy(&self, side: Side) -> Box<dyn Policy> {
        match (self.for_side(side), self.bomb_threshold) {
            (AgentKind::Solver, _) => Box::new(SolverPolicy::new()),
            (AgentKind::Heuristic, None) => Box::new(HeuristicPolicy::new()),
            (AgentKind::Heuristic, Some(threshold)) => {
                Box::new(HeuristicPolicy::with_bomb_threshold(threshold))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Solver,
    Heuristic,
}

impl AgentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentKind::Solver => "solver",
            AgentKind::Heuristic => "heuristic",
        }
    }
}

fn default_agent() -> AgentKind {
    AgentKind::Solver
}

/// Turn cap applied by the driver; the search itself has no budget.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_turns == 0 {
            return Err(ValidationError::InvalidField {
                field: "limits.max_turns".to_string(),
                message: "turn limit must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_position_names(positions: &[PositionConfig]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for position in positions {
        if position.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "positions.name".to_string(),
                message: "position name must not be empty".to_string(),
            });
        }

        if !position.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("positions[{}].name", position.name),
                message: "position name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(position.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "positions".to_string(),
                message: format!("position name '{}' defined more than once", position.name),
            });
        }
    }
    Ok(())
}

fn parse_hand(text: &str, field: String) -> Result<Hand, ValidationError> {
    Hand::parse(text).map_err(|err| ValidationError::InvalidField {
        field,
        message: err.to_string(),
    })
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// A position ready to play: parsed hands and the constraining play, if any.
#[derive(Debug, Clone)]
pub struct ResolvedPosition {
    pub name: String,
    pub landlord: Hand,
    pub peasant: Hand,
    pub first: Side,
    pub last_play: Option<Combo>,
    pub expect: Option<Side>,
    pub deal_seed: Option<u64>,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddz_bot::policy::PolicyContext;
    use ddz_core::model::combo::ComboKind;
    use ddz_core::rules::read_as;

    const BASIC_YAML: &str = r#"
run_id: "endgame_smoke"
positions:
  - name: "rocket_finish"
    landlord: "33XD"
    peasant: "2222"
    expect: "landlord"
  - name: "answer_pair"
    landlord: "KK5"
    peasant: "3A"
    first: "landlord"
    last_play:
      cards: "99"
      kind: "pair"
deals:
  seed: 7
  count: 3
agents:
  landlord: "solver"
  peasant: "heuristic"
outputs:
  jsonl: "bench/out/{run_id}/games.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.limits.max_turns, DEFAULT_MAX_TURNS);
        assert_eq!(cfg.agents.for_side(Side::Peasant), AgentKind::Heuristic);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/endgame_smoke/games.jsonl")
        );
    }

    #[test]
    fn bomb_threshold_reaches_heuristic_agents() {
        let yaml = r#"
run_id: "bomb_threshold"
positions:
  - name: "hold_or_bomb"
    landlord: "3333K"
    peasant: "34567"
agents:
  landlord: "heuristic"
  bomb_threshold: 5
outputs:
  jsonl: "games.jsonl"
  summary_md: "summary.md"
"#;
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.agents.bomb_threshold, Some(5));
        assert_eq!(cfg.agents.spawn_policy(Side::Peasant).name(), "solver");

        let hand = Hand::parse("3333K").expect("hand");
        let opponent = Hand::parse("34567").expect("hand");
        let ace = read_as(&Hand::parse("A").expect("hand").ranks(), ComboKind::Single).expect("ace");
        let ctx = PolicyContext {
            side: Side::Landlord,
            hand: &hand,
            opponent: &opponent,
            last_play: Some(&ace),
        };
        let mut policy = cfg.agents.spawn_policy(Side::Landlord);
        assert_eq!(policy.name(), "heuristic");
        assert_eq!(policy.choose_play(&ctx).map(|c| c.label()), Some("3333".to_string()));

        cfg.agents.bomb_threshold = None;
        let mut policy = cfg.agents.spawn_policy(Side::Landlord);
        assert_eq!(policy.choose_play(&ctx), None);
    }

    #[test]
    fn resolves_fixed_positions_then_deals() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse");
        cfg.validate().expect("valid");
        let positions = cfg.resolved_positions().expect("positions resolve");
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[0].name, "rocket_finish");
        assert_eq!(positions[0].expect, Some(Side::Landlord));
        let last = positions[1].last_play.as_ref().expect("last play");
        assert_eq!(last.kind(), ComboKind::Pair);
        assert_eq!(positions[2].name, "deal_0000");
        assert_eq!(positions[2].landlord.len(), DEFAULT_DEAL_CARDS);
        assert!(positions[2].deal_seed.is_some());

        let again = cfg.resolved_positions().expect("positions resolve");
        assert_eq!(again[4].landlord, positions[4].landlord);
        assert_eq!(again[4].deal_seed, positions[4].deal_seed);
    }

    #[test]
    fn rejects_unknown_card_symbols() {
        let yaml = BASIC_YAML.replace("\"33XD\"", "\"33ZD\"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("bad hand");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "positions[rocket_finish].landlord"
        ));
    }

    #[test]
    fn rejects_hands_beyond_one_deck() {
        let yaml = BASIC_YAML.replace("\"3A\"", "\"3AKK\"").replace("\"KK5\"", "\"KKK5\"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("five kings");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "positions[answer_pair].peasant"
        ));
    }

    #[test]
    fn rejects_mismatched_last_play() {
        let yaml = BASIC_YAML.replace("cards: \"99\"", "cards: \"98\"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("98 is not a pair");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "positions[answer_pair].last_play"
        ));
    }

    #[test]
    fn rejects_duplicate_positions() {
        let yaml = BASIC_YAML.replace("answer_pair", "rocket_finish");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate names");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "positions"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("endgame_smoke", "endgame smoke");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_oversized_deals() {
        let yaml = BASIC_YAML.replace("count: 3", "count: 3\n  landlord_cards: 30\n  peasant_cards: 30");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("too many cards");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "deals"
        ));
    }

    #[test]
    fn requires_some_position_source() {
        let yaml = r#"
run_id: "empty"
outputs:
  jsonl: "out.jsonl"
  summary_md: "out.md"
"#;
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(yaml).expect("parse");
        let err = cfg.validate().expect_err("nothing to play");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "positions"
        ));
    }
}

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ddz_bot::policy::{Policy, PolicyContext};
use ddz_bot::solver::best_strategy;
use ddz_core::game::endgame::{Endgame, PlayError};
use ddz_core::model::combo::{Combo, ComboKind};
use ddz_core::model::side::Side;
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{BenchmarkConfig, ResolvedOutputs, ResolvedPosition, ValidationError};
use crate::report::{ReportError, SummaryReport};

/// Plays every configured position to completion and records the results.
pub struct EndgameRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    positions: Vec<ResolvedPosition>,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub landlord_wins: usize,
    pub peasant_wins: usize,
    pub truncated: usize,
    pub prediction_matches: usize,
    pub expectation_failures: Vec<String>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl EndgameRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let positions = config.resolved_positions()?;
        Ok(Self {
            config,
            outputs,
            positions,
        })
    }

    pub fn positions(&self) -> &[ResolvedPosition] {
        &self.positions
    }

    /// Execute every position, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut report = SummaryReport::new(&self.config);

        for (index, position) in self.positions.iter().enumerate() {
            let outcome = self.play_position(position)?;
            write_game_row(&mut writer, &self.config, index, position, &outcome)?;
            report.record(position, &outcome);
        }
        writer.flush()?;

        report.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: report.games(),
            rows_written: self.positions.len(),
            landlord_wins: report.wins(Side::Landlord),
            peasant_wins: report.wins(Side::Peasant),
            truncated: report.truncated(),
            prediction_matches: report.prediction_matches(),
            expectation_failures: report.expectation_failures().to_vec(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    /// Solves the root once for the prediction, then lets the configured
    /// policies play it out under the turn cap.
    pub fn play_position(&self, position: &ResolvedPosition) -> Result<GameOutcome, RunnerError> {
        let first = position.first;
        let (mover, opponent) = match first {
            Side::Landlord => (&position.landlord, &position.peasant),
            Side::Peasant => (&position.peasant, &position.landlord),
        };
        let root = best_strategy(mover, opponent, position.last_play.as_ref());
        let predicted = if root.is_win() {
            first
        } else {
            first.other()
        };

        let mut game = Endgame::with_last_play(
            position.landlord,
            position.peasant,
            first,
            position.last_play.clone(),
        );
        let agents = &self.config.agents;
        let mut seats = Side::BOTH.map(|side| SeatState::new(agents.spawn_policy(side)));

        while !game.is_finished() && game.history().len() < self.config.limits.max_turns {
            let side = game.to_move();
            let seat = &mut seats[side.index()];
            let started = Instant::now();
            let choice = seat
                .policy
                .choose_play(&PolicyContext::from_endgame(&game));
            let elapsed_ms = seat.metrics.record(started.elapsed());
            log_turn(&position.name, side, seat.policy.name(), choice.as_ref(), elapsed_ms);

            game.apply(choice.as_ref())
                .map_err(|source| RunnerError::Play {
                    position: position.name.clone(),
                    side,
                    source,
                })?;
        }

        let turns = game
            .history()
            .iter()
            .map(|turn| TurnRow {
                side: turn.side,
                play: turn.play.as_ref().map(Combo::label),
                kind: turn.play.as_ref().map(Combo::kind),
            })
            .collect();
        let [landlord_seat, peasant_seat] = seats;

        Ok(GameOutcome {
            predicted,
            root_value: root.value,
            root_play: root.play.as_ref().map(Combo::label),
            root_nodes: root.stats.nodes,
            winner: game.winner(),
            turns,
            landlord_metrics: landlord_seat.metrics.finalize(),
            peasant_metrics: peasant_seat.metrics.finalize(),
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    index: usize,
    position: &ResolvedPosition,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id: config.run_id.clone(),
        game_id: format!("G{index:05}"),
        position: position.name.clone(),
        deal_seed: position.deal_seed,
        landlord: position.landlord.to_string(),
        peasant: position.peasant.to_string(),
        first: position.first,
        last_play: position.last_play.as_ref().map(Combo::label),
        landlord_agent: config.agents.landlord.as_str(),
        peasant_agent: config.agents.peasant.as_str(),
        predicted_winner: outcome.predicted,
        root_value: outcome.root_value,
        root_play: outcome.root_play.clone(),
        root_nodes: outcome.root_nodes,
        winner: outcome.winner,
        truncated: outcome.winner.is_none(),
        matches_prediction: outcome.matches_prediction(),
        expected_winner: position.expect,
        expectation_met: position.expect.map(|side| outcome.winner == Some(side)),
        turns: outcome.turns.clone(),
        landlord_ms_per_decision: outcome.landlord_metrics.avg_ms_per_decision,
        peasant_ms_per_decision: outcome.peasant_metrics.avg_ms_per_decision,
        landlord_total_ms: outcome.landlord_metrics.total_ms,
        peasant_total_ms: outcome.peasant_metrics.total_ms,
        decisions: outcome.landlord_metrics.decisions + outcome.peasant_metrics.decisions,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn log_turn(position: &str, side: Side, agent: &str, chosen: Option<&Combo>, elapsed_ms: f64) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let choice = chosen.map(Combo::label).unwrap_or_else(|| "pass".to_string());
    event!(
        target: "ddz_bench::play",
        Level::INFO,
        position,
        side = %side,
        agent,
        chosen = %choice,
        elapsed_ms,
    );
}

struct SeatState {
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

impl SeatState {
    fn new(policy: Box<dyn Policy>) -> Self {
        Self {
            policy,
            metrics: DecisionMetrics::default(),
        }
    }
}

/// Result of one played position.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub predicted: Side,
    pub root_value: u8,
    pub root_play: Option<String>,
    pub root_nodes: u64,
    /// `None` when the turn cap stopped the game.
    pub winner: Option<Side>,
    pub turns: Vec<TurnRow>,
    pub landlord_metrics: DecisionSummary,
    pub peasant_metrics: DecisionSummary,
}

impl GameOutcome {
    pub fn matches_prediction(&self) -> bool {
        self.winner == Some(self.predicted)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRow {
    pub side: Side,
    pub play: Option<String>,
    pub kind: Option<ComboKind>,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    position: String,
    deal_seed: Option<u64>,
    landlord: String,
    peasant: String,
    first: Side,
    last_play: Option<String>,
    landlord_agent: &'static str,
    peasant_agent: &'static str,
    predicted_winner: Side,
    root_value: u8,
    root_play: Option<String>,
    root_nodes: u64,
    winner: Option<Side>,
    truncated: bool,
    matches_prediction: bool,
    expected_winner: Option<Side>,
    expectation_met: Option<bool>,
    turns: Vec<TurnRow>,
    landlord_ms_per_decision: f64,
    peasant_ms_per_decision: f64,
    landlord_total_ms: f64,
    peasant_total_ms: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Config(#[from] ValidationError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("{side} made an illegal play in position '{position}': {source}")]
    Play {
        position: String,
        side: Side,
        #[source]
        source: PlayError,
    },
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

#[cfg(test)]
mod tests {
    use super::EndgameRunner;
    use crate::config::{AgentKind, BenchmarkConfig};
    use ddz_core::model::side::Side;

    fn config(agents: &str, max_turns: usize) -> BenchmarkConfig {
        let yaml = format!(
            r#"
run_id: "runner_unit"
positions:
  - name: "rocket_finish"
    landlord: "33XD"
    peasant: "2222"
  - name: "peasant_leads"
    landlord: "KK"
    peasant: "3"
    first: "peasant"
agents:
{agents}
limits:
  max_turns: {max_turns}
outputs:
  jsonl: "unused.jsonl"
  summary_md: "unused.md"
"#
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        cfg
    }

    #[test]
    fn solver_outcomes_match_the_prediction() {
        let cfg = config("  landlord: \"solver\"\n  peasant: \"solver\"", 64);
        let outputs = cfg.resolved_outputs();
        let runner = EndgameRunner::new(cfg, outputs).expect("runner");

        let rocket = runner.play_position(&runner.positions()[0]).expect("play");
        assert_eq!(rocket.predicted, Side::Landlord);
        assert_eq!(rocket.winner, Some(Side::Landlord));
        assert_eq!(rocket.turns[0].play.as_deref(), Some("XD"));
        assert!(rocket.matches_prediction());
        assert_eq!(rocket.landlord_metrics.decisions, 1);
        assert_eq!(
            rocket.landlord_metrics.total_ms,
            rocket.landlord_metrics.avg_ms_per_decision
        );

        let short = runner.play_position(&runner.positions()[1]).expect("play");
        assert_eq!(short.predicted, Side::Peasant);
        assert_eq!(short.winner, Some(Side::Peasant));
        assert_eq!(short.turns.len(), 1);
    }

    #[test]
    fn turn_cap_leaves_the_game_unfinished() {
        let cfg = config("  landlord: \"heuristic\"\n  peasant: \"heuristic\"", 1);
        assert_eq!(cfg.agents.landlord, AgentKind::Heuristic);
        let outputs = cfg.resolved_outputs();
        let runner = EndgameRunner::new(cfg, outputs).expect("runner");
        let outcome = runner.play_position(&runner.positions()[0]).expect("play");
        assert_eq!(outcome.turns.len(), 1);
        assert_eq!(outcome.winner, None);
        assert!(!outcome.matches_prediction());
    }
}

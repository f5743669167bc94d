use std::fs;
use std::path::Path;

use ddz_core::model::side::Side;
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig, ResolvedPosition};
use crate::runner::GameOutcome;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

struct GameLine {
    name: String,
    first: Side,
    predicted: Side,
    winner: Option<Side>,
    turns: usize,
    root_nodes: u64,
    landlord_ms: f64,
    peasant_ms: f64,
}

/// Aggregates played positions into the markdown summary.
pub struct SummaryReport {
    run_id: String,
    landlord_agent: AgentKind,
    peasant_agent: AgentKind,
    games: Vec<GameLine>,
    expectation_failures: Vec<String>,
}

impl SummaryReport {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            run_id: config.run_id.clone(),
            landlord_agent: config.agents.landlord,
            peasant_agent: config.agents.peasant,
            games: Vec::new(),
            expectation_failures: Vec::new(),
        }
    }

    pub fn record(&mut self, position: &ResolvedPosition, outcome: &GameOutcome) {
        if let Some(expected) = position.expect {
            if outcome.winner != Some(expected) {
                self.expectation_failures.push(position.name.clone());
            }
        }
        self.games.push(GameLine {
            name: position.name.clone(),
            first: position.first,
            predicted: outcome.predicted,
            winner: outcome.winner,
            turns: outcome.turns.len(),
            root_nodes: outcome.root_nodes,
            landlord_ms: outcome.landlord_metrics.avg_ms_per_decision,
            peasant_ms: outcome.peasant_metrics.avg_ms_per_decision,
        });
    }

    pub fn games(&self) -> usize {
        self.games.len()
    }

    pub fn wins(&self, side: Side) -> usize {
        self.games
            .iter()
            .filter(|game| game.winner == Some(side))
            .count()
    }

    pub fn truncated(&self) -> usize {
        self.games.iter().filter(|game| game.winner.is_none()).count()
    }

    pub fn prediction_matches(&self) -> usize {
        self.games
            .iter()
            .filter(|game| game.winner == Some(game.predicted))
            .count()
    }

    pub fn expectation_failures(&self) -> &[String] {
        &self.expectation_failures
    }

    pub fn render(&self) -> String {
        let mut rows = String::new();
        rows.push_str(&format!("# Endgame Summary: {}\n\n", self.run_id));
        rows.push_str(&format!(
            "Agents: landlord = {}, peasant = {}\n\n",
            self.landlord_agent.as_str(),
            self.peasant_agent.as_str()
        ));
        rows.push_str(&format!(
            "Games: {} | Landlord wins: {} | Peasant wins: {} | Unfinished: {} | Matched prediction: {}\n\n",
            self.games(),
            self.wins(Side::Landlord),
            self.wins(Side::Peasant),
            self.truncated(),
            self.prediction_matches(),
        ));
        if !self.expectation_failures.is_empty() {
            rows.push_str(&format!(
                "Expectation failures: {}\n\n",
                self.expectation_failures.join(", ")
            ));
        }

        rows.push_str("| Position | First | Predicted | Winner | Turns | Root nodes | Landlord ms/decision | Peasant ms/decision |\n");
        rows.push_str("|----------|-------|-----------|--------|-------|------------|----------------------|---------------------|\n");
        for game in &self.games {
            rows.push_str(&format!(
                "| {name} | {first} | {predicted} | {winner} | {turns} | {nodes} | {landlord:.2} | {peasant:.2} |\n",
                name = game.name,
                first = game.first,
                predicted = game.predicted,
                winner = game.winner.map(Side::as_str).unwrap_or("-"),
                turns = game.turns,
                nodes = game.root_nodes,
                landlord = game.landlord_ms,
                peasant = game.peasant_ms,
            ));
        }
        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        fs::write(path.as_ref(), self.render()).map_err(|e| ReportError::Io {
            context: "writing summary markdown",
            source: e,
        })
    }
}

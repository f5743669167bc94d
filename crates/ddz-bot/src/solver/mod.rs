//! Exact two-hand endgame search.
//!
//! The root side is the maximiser: a value of [`WIN`] means it empties its
//! hand first under best play from both sides.

mod ordering;
mod search;
mod table;

pub use ordering::{order_candidates, ordered_responses};
pub use search::Role;
pub use table::{StateKey, TranspositionTable};

use ddz_core::model::combo::Combo;
use ddz_core::model::hand::Hand;
use search::Search;
use std::time::{Duration, Instant};
use tracing::{Level, event};

pub const WIN: u8 = 100;
pub const LOSS: u8 = 0;

const ROOT_ALPHA: i16 = -1;
const ROOT_BETA: i16 = 101;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub nodes: u64,
    pub table_entries: usize,
    pub table_hits: u64,
    pub elapsed: Duration,
}

/// Answer to a root query. `play` is `None` when passing is best, or when
/// either hand is already empty.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub play: Option<Combo>,
    pub value: u8,
    pub stats: SolverStats,
}

impl Strategy {
    pub fn is_win(&self) -> bool {
        self.value == WIN
    }
}

/// Owns the transposition table for one query at a time.
#[derive(Debug, Default)]
pub struct Solver {
    table: TranspositionTable,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best play for `mover` against `opponent`, where `last` is the play
    /// `mover` has to beat. The table is cleared first, so repeated queries
    /// never see each other's entries.
    pub fn best_strategy(&mut self, mover: &Hand, opponent: &Hand, last: Option<&Combo>) -> Strategy {
        let started = Instant::now();
        self.table.clear();

        let mut search = Search::new(&mut self.table);
        let (play, value) = choose_root(&mut search, mover, opponent, last);
        let nodes = search.nodes();

        let stats = SolverStats {
            nodes,
            table_entries: self.table.len(),
            table_hits: self.table.hits(),
            elapsed: started.elapsed(),
        };
        log_root_decision(mover, opponent, last, play.as_ref(), value, &stats);
        Strategy { play, value, stats }
    }
}

/// One-off query with its own table.
pub fn best_strategy(mover: &Hand, opponent: &Hand, last: Option<&Combo>) -> Strategy {
    Solver::new().best_strategy(mover, opponent, last)
}

/// Candidates run in `ordered_responses` order, so among several winning
/// plays the first one found there is returned, not the first generated.
fn choose_root(
    search: &mut Search<'_>,
    mover: &Hand,
    opponent: &Hand,
    last: Option<&Combo>,
) -> (Option<Combo>, u8) {
    if mover.is_empty() {
        return (None, WIN);
    }
    if opponent.is_empty() {
        return (None, LOSS);
    }

    let mut best: Option<(Option<Combo>, u8)> = None;
    for combo in ordered_responses(mover, last) {
        let Ok(rest) = mover.without(combo.cards()) else {
            continue;
        };
        let value = search.evaluate(rest, *opponent, Role::Min, Some(&combo), ROOT_ALPHA, ROOT_BETA);
        if value == WIN {
            return (Some(combo), WIN);
        }
        if best.as_ref().is_none_or(|(_, seen)| value > *seen) {
            best = Some((Some(combo), value));
        }
    }

    if last.is_some() {
        let value = search.evaluate(*mover, *opponent, Role::Min, None, ROOT_ALPHA, ROOT_BETA);
        if best.as_ref().is_none_or(|(_, seen)| value >= *seen) {
            best = Some((None, value));
        }
    }

    best.unwrap_or((None, LOSS))
}

fn log_root_decision(
    mover: &Hand,
    opponent: &Hand,
    last: Option<&Combo>,
    play: Option<&Combo>,
    value: u8,
    stats: &SolverStats,
) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let last_label = last.map(Combo::label).unwrap_or_else(|| "-".to_string());
    let choice = play.map(Combo::label).unwrap_or_else(|| "pass".to_string());

    event!(
        target: "ddz_bot::solver",
        Level::DEBUG,
        mover = %mover,
        opponent = %opponent,
        last = %last_label,
        chosen = %choice,
        value,
        nodes = stats.nodes,
        table_entries = stats.table_entries,
        table_hits = stats.table_hits,
        elapsed_us = stats.elapsed.as_micros() as u64,
    );
}

#[cfg(test)]
mod tests {
    use super::{LOSS, Solver, WIN, best_strategy};
    use ddz_core::model::combo::ComboKind;
    use ddz_core::model::hand::Hand;
    use ddz_core::rules::read_as;

    fn hand(text: &str) -> Hand {
        Hand::parse(text).unwrap()
    }

    #[test]
    fn empty_mover_has_already_won() {
        let strategy = best_strategy(&Hand::new(), &hand("3"), None);
        assert_eq!(strategy.value, WIN);
        assert!(strategy.is_win());
        assert!(strategy.play.is_none());
        assert_eq!(strategy.stats.nodes, 0);

        let strategy = best_strategy(&hand("3"), &Hand::new(), None);
        assert_eq!(strategy.value, LOSS);
        assert!(!strategy.is_win());
    }

    #[test]
    fn forced_pass_when_nothing_beats() {
        let last = read_as(&hand("2").ranks(), ComboKind::Single).unwrap();
        let strategy = best_strategy(&hand("3"), &hand("4"), Some(&last));
        assert!(strategy.play.is_none());
        assert_eq!(strategy.value, LOSS);
    }

    #[test]
    fn table_is_fresh_per_query() {
        let mut solver = Solver::new();
        let first = solver.best_strategy(&hand("3456"), &hand("789"), None);
        let second = solver.best_strategy(&hand("3456"), &hand("789"), None);
        assert_eq!(first.value, second.value);
        assert_eq!(first.stats.nodes, second.stats.nodes);
        assert_eq!(first.stats.table_hits, second.stats.table_hits);
    }
}

use std::fmt;

use ddz_bot::policy::{Policy, PolicyContext, SolverPolicy};
use ddz_bot::solver::{SolverStats, WIN, best_strategy};
use ddz_core::game::endgame::{Endgame, PlayError, Turn};
use ddz_core::model::combo::Combo;
use ddz_core::model::hand::{Hand, HandError};
use ddz_core::model::side::Side;
use ddz_core::rules::classify;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid {field} hand: {source}")]
    Hand {
        field: &'static str,
        #[source]
        source: HandError,
    },
    #[error("hands cannot come from one deck: {0}")]
    Deck(HandError),
    #[error("'{0}' is not a single combination")]
    NotACombination(String),
    #[error("optimal line broke down: {0}")]
    Play(#[from] PlayError),
}

/// Verdict for one position plus the line both sides play under the solver.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub landlord: Hand,
    pub peasant: Hand,
    pub first: Side,
    pub last_play: Option<Combo>,
    pub value: u8,
    pub stats: SolverStats,
    pub line: Vec<Turn>,
    pub winner: Option<Side>,
}

impl SolveReport {
    /// The side the root search says wins.
    pub fn predicted_winner(&self) -> Side {
        if self.value == WIN {
            self.first
        } else {
            self.first.other()
        }
    }
}

/// Reads the constraining play from text such as `"3334"`.
pub fn parse_last_play(text: &str) -> Result<Combo, SolveError> {
    let cards = Hand::parse(text)
        .map_err(|source| SolveError::Hand {
            field: "last",
            source,
        })?
        .ranks();
    classify(&cards).ok_or_else(|| SolveError::NotACombination(text.trim().to_string()))
}

pub fn solve_text(
    landlord: &str,
    peasant: &str,
    last: Option<&str>,
    first: Side,
    max_turns: usize,
) -> Result<SolveReport, SolveError> {
    let landlord = Hand::parse(landlord).map_err(|source| SolveError::Hand {
        field: "landlord",
        source,
    })?;
    let peasant = Hand::parse(peasant).map_err(|source| SolveError::Hand {
        field: "peasant",
        source,
    })?;
    landlord.combined(&peasant).map_err(SolveError::Deck)?;
    let last_play = last.map(parse_last_play).transpose()?;
    solve_position(landlord, peasant, first, last_play, max_turns)
}

/// Solves the root, then replays the solver against itself for at most
/// `max_turns` turns to show the line.
pub fn solve_position(
    landlord: Hand,
    peasant: Hand,
    first: Side,
    last_play: Option<Combo>,
    max_turns: usize,
) -> Result<SolveReport, SolveError> {
    let (mover, opponent) = match first {
        Side::Landlord => (&landlord, &peasant),
        Side::Peasant => (&peasant, &landlord),
    };
    let root = best_strategy(mover, opponent, last_play.as_ref());

    let mut game = Endgame::with_last_play(landlord, peasant, first, last_play.clone());
    let mut policies = [SolverPolicy::new(), SolverPolicy::new()];
    while !game.is_finished() && game.history().len() < max_turns {
        let side = game.to_move();
        let choice = policies[side.index()].choose_play(&PolicyContext::from_endgame(&game));
        game.apply(choice.as_ref())?;
    }

    Ok(SolveReport {
        landlord,
        peasant,
        first,
        last_play,
        value: root.value,
        stats: root.stats,
        line: game.history().to_vec(),
        winner: game.winner(),
    })
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Landlord: {}", self.landlord)?;
        writeln!(f, "Peasant:  {}", self.peasant)?;
        if let Some(last) = self.last_play.as_ref() {
            writeln!(f, "To beat:  {} ({})", last, last.kind())?;
        }
        writeln!(
            f,
            "{} to move: {} wins (value {}, {} nodes, {} table entries, {:.2} ms)",
            self.first,
            self.predicted_winner(),
            self.value,
            self.stats.nodes,
            self.stats.table_entries,
            self.stats.elapsed.as_secs_f64() * 1000.0
        )?;
        writeln!(f, "Optimal line:")?;
        for (index, turn) in self.line.iter().enumerate() {
            match turn.play.as_ref() {
                Some(play) => writeln!(
                    f,
                    "  {:>2}. {} plays {} ({})",
                    index + 1,
                    turn.side,
                    play,
                    play.kind()
                )?,
                None => writeln!(f, "  {:>2}. {} passes", index + 1, turn.side)?,
            }
        }
        match self.winner {
            Some(winner) => writeln!(f, "Winner: {winner}"),
            None => writeln!(f, "Winner: undecided after {} turns", self.line.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SolveError, parse_last_play, solve_text};
    use ddz_core::model::combo::ComboKind;
    use ddz_core::model::side::Side;

    #[test]
    fn rocket_line_is_printed_in_order() {
        let report = solve_text("33XD", "2222", None, Side::Landlord, 64).expect("solve");
        assert_eq!(report.predicted_winner(), Side::Landlord);
        assert_eq!(report.winner, Some(Side::Landlord));
        let text = report.to_string();
        assert!(text.contains("landlord to move: landlord wins (value 100"));
        assert!(text.contains(" 1. landlord plays XD (rocket)"));
        assert!(text.contains(" 2. peasant passes"));
        assert!(text.contains("Winner: landlord"));
    }

    #[test]
    fn last_play_is_classified() {
        let last = parse_last_play("3334").expect("combo");
        assert_eq!(last.kind(), ComboKind::TripleWithSingle);
        assert!(matches!(
            parse_last_play("34"),
            Err(SolveError::NotACombination(text)) if text == "34"
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            solve_text("3Z", "4", None, Side::Landlord, 8),
            Err(SolveError::Hand { field: "landlord", .. })
        ));
        assert!(matches!(
            solve_text("DD", "4", None, Side::Landlord, 8),
            Err(SolveError::Hand { field: "landlord", .. })
        ));
        assert!(matches!(
            solve_text("D", "D", None, Side::Landlord, 8),
            Err(SolveError::Deck(_))
        ));
    }
}

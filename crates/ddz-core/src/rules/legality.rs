use crate::model::combo::{Combo, ComboKind};
use crate::model::hand::Hand;
use crate::rules::generate::generate_moves;

/// Whether `candidate` may be played on top of `last`.
///
/// Nothing beats the rocket. A bomb beats every non-bomb and any lower bomb.
/// Otherwise the kind and sequence length must match and the primary rank
/// must be strictly higher.
pub fn beats(candidate: &Combo, last: &Combo) -> bool {
    match (candidate.kind(), last.kind()) {
        (_, ComboKind::Rocket) => false,
        (ComboKind::Rocket, _) => true,
        (ComboKind::Bomb, ComboKind::Bomb) => candidate.rank() > last.rank(),
        (ComboKind::Bomb, _) => true,
        (kind, last_kind) => {
            kind == last_kind
                && candidate.length() == last.length()
                && candidate.rank() > last.rank()
        }
    }
}

/// Moves from `hand` that may follow `last`; every move when leading.
pub fn legal_responses(hand: &Hand, last: Option<&Combo>) -> Vec<Combo> {
    let moves = generate_moves(hand);
    match last {
        None => moves,
        Some(last) => moves.into_iter().filter(|m| beats(m, last)).collect(),
    }
}

/// Whether `play` is one of the readings `hand` could legally put down.
pub fn is_legal(hand: &Hand, play: &Combo, last: Option<&Combo>) -> bool {
    legal_responses(hand, last)
        .iter()
        .any(|candidate| candidate.same_reading(play))
}

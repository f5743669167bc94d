use crate::model::combo::{Combo, ComboKind};
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::rules::generate::generate_moves;
use std::cmp::Reverse;

/// Reads a card set as a single combination, if it forms one.
///
/// When several readings fit, the earliest [`ComboKind`] wins and, within a
/// kind, the highest primary rank.
pub fn classify(cards: &[Rank]) -> Option<Combo> {
    let hand = Hand::from_ranks(cards.iter().copied()).ok()?;
    if hand.is_empty() {
        return None;
    }
    generate_moves(&hand)
        .into_iter()
        .filter(|m| m.card_count() == hand.len())
        .min_by_key(|m| (m.kind(), Reverse(m.rank())))
}

/// Reads a card set as a combination of the given kind, preferring the
/// highest primary rank when the wings allow two readings.
pub fn read_as(cards: &[Rank], kind: ComboKind) -> Option<Combo> {
    let hand = Hand::from_ranks(cards.iter().copied()).ok()?;
    generate_moves(&hand)
        .into_iter()
        .filter(|m| m.kind() == kind && m.card_count() == hand.len())
        .max_by_key(Combo::rank)
}

//! Enumeration of every combination a hand can form on its own.

use crate::model::combo::{Combo, ComboKind};
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use std::ops::RangeInclusive;

const STRAIGHT_LENGTHS: RangeInclusive<usize> = 5..=12;
const PAIR_SEQUENCE_LENGTHS: RangeInclusive<usize> = 3..=10;
const PLANE_LENGTHS: RangeInclusive<usize> = 2..=6;

/// Every combination `hand` can play, before any beat rule is applied.
///
/// Output order is deterministic: rocket, bombs, per-rank singles/pairs/
/// triples with their kickers, quads with attachments, straights, pair
/// sequences, then planes with their wings. Kickers and wings are drawn from
/// the hand minus the body and are enumerated by rank, so two cards of the
/// same rank never yield duplicate attachments.
pub fn generate_moves(hand: &Hand) -> Vec<Combo> {
    let mut moves = Vec::new();
    push_rocket(hand, &mut moves);
    push_bombs(hand, &mut moves);
    push_sets(hand, &mut moves);
    push_quads(hand, &mut moves);
    push_chains(hand, ComboKind::Straight, 1, STRAIGHT_LENGTHS, &mut moves);
    push_chains(
        hand,
        ComboKind::PairSequence,
        2,
        PAIR_SEQUENCE_LENGTHS,
        &mut moves,
    );
    push_planes(hand, &mut moves);
    moves
}

fn push_rocket(hand: &Hand, moves: &mut Vec<Combo>) {
    if hand.count(Rank::SmallJoker) > 0 && hand.count(Rank::BigJoker) > 0 {
        moves.push(Combo::new(
            vec![Rank::SmallJoker, Rank::BigJoker],
            ComboKind::Rocket,
            Rank::BigJoker,
            0,
        ));
    }
}

fn push_bombs(hand: &Hand, moves: &mut Vec<Combo>) {
    for (rank, count) in hand.distinct() {
        if count == 4 {
            moves.push(Combo::new(vec![rank; 4], ComboKind::Bomb, rank, 0));
        }
    }
}

fn push_sets(hand: &Hand, moves: &mut Vec<Combo>) {
    for (rank, count) in hand.distinct() {
        moves.push(Combo::new(vec![rank], ComboKind::Single, rank, 0));
        if count >= 2 {
            moves.push(Combo::new(vec![rank; 2], ComboKind::Pair, rank, 0));
        }
        if count < 3 {
            continue;
        }
        moves.push(Combo::new(vec![rank; 3], ComboKind::Triple, rank, 0));
        for (kicker, _) in hand.distinct().filter(|&(k, _)| k != rank) {
            moves.push(Combo::new(
                vec![rank, rank, rank, kicker],
                ComboKind::TripleWithSingle,
                rank,
                0,
            ));
        }
        for (kicker, _) in hand.distinct().filter(|&(k, c)| k != rank && c >= 2) {
            moves.push(Combo::new(
                vec![rank, rank, rank, kicker, kicker],
                ComboKind::TripleWithPair,
                rank,
                0,
            ));
        }
    }
}

fn push_quads(hand: &Hand, moves: &mut Vec<Combo>) {
    for (rank, count) in hand.distinct() {
        if count != 4 {
            continue;
        }
        let body = [rank; 4];
        let Ok(rest) = hand.without(&body) else {
            continue;
        };
        for singles in choose_cards(&rest, 2) {
            let mut cards = body.to_vec();
            cards.extend(singles);
            moves.push(Combo::new(cards, ComboKind::QuadWithSingles, rank, 0));
        }
        let pair_ranks: Vec<Rank> = rest
            .distinct()
            .filter(|&(_, c)| c >= 2)
            .map(|(r, _)| r)
            .collect();
        for pairs in choose_ranks(&pair_ranks, 2) {
            let mut cards = body.to_vec();
            for pair in pairs {
                cards.extend([pair, pair]);
            }
            moves.push(Combo::new(cards, ComboKind::QuadWithPairs, rank, 0));
        }
    }
}

fn push_chains(
    hand: &Hand,
    kind: ComboKind,
    width: u8,
    lengths: RangeInclusive<usize>,
    moves: &mut Vec<Combo>,
) {
    for length in lengths {
        for run in runs(hand, width, length) {
            let cards = spread(&run, width);
            moves.push(Combo::new(cards, kind, run[0], length as u8));
        }
    }
}

fn push_planes(hand: &Hand, moves: &mut Vec<Combo>) {
    for length in PLANE_LENGTHS {
        for run in runs(hand, 3, length) {
            let body = spread(&run, 3);
            let low = run[0];
            let units = length as u8;
            moves.push(Combo::new(body.clone(), ComboKind::Plane, low, units));

            let Ok(rest) = hand.without(&body) else {
                continue;
            };
            for wings in choose_cards(&rest, length) {
                let mut cards = body.clone();
                cards.extend(wings);
                moves.push(Combo::new(cards, ComboKind::PlaneWithSingles, low, units));
            }
            let pair_ranks: Vec<Rank> = rest
                .distinct()
                .filter(|&(_, c)| c >= 2)
                .map(|(r, _)| r)
                .collect();
            for wings in choose_ranks(&pair_ranks, length) {
                let mut cards = body.clone();
                for wing in wings {
                    cards.extend([wing, wing]);
                }
                moves.push(Combo::new(cards, ComboKind::PlaneWithPairs, low, units));
            }
        }
    }
}

/// Runs of `length` consecutive chaining ranks each held at least `width`
/// times, lowest start first.
fn runs(hand: &Hand, width: u8, length: usize) -> Vec<Vec<Rank>> {
    let chaining: Vec<Rank> = Rank::ORDERED
        .iter()
        .copied()
        .filter(|rank| rank.chains())
        .collect();
    if length == 0 || length > chaining.len() {
        return Vec::new();
    }
    chaining
        .windows(length)
        .filter(|window| window.iter().all(|&rank| hand.count(rank) >= width))
        .map(<[Rank]>::to_vec)
        .collect()
}

fn spread(run: &[Rank], width: u8) -> Vec<Rank> {
    run.iter()
        .flat_map(|&rank| std::iter::repeat_n(rank, usize::from(width)))
        .collect()
}

/// Every sub-multiset of `hand` with `size` cards, by rank identity.
fn choose_cards(hand: &Hand, size: usize) -> Vec<Vec<Rank>> {
    let available: Vec<(Rank, u8)> = hand.distinct().collect();
    let mut out = Vec::new();
    let mut picked = Vec::with_capacity(size);
    choose_cards_from(&available, size, &mut picked, &mut out);
    out
}

fn choose_cards_from(
    available: &[(Rank, u8)],
    remaining: usize,
    picked: &mut Vec<Rank>,
    out: &mut Vec<Vec<Rank>>,
) {
    if remaining == 0 {
        out.push(picked.clone());
        return;
    }
    let Some((&(rank, count), tail)) = available.split_first() else {
        return;
    };
    let most = usize::from(count).min(remaining);
    for take in (0..=most).rev() {
        picked.extend(std::iter::repeat_n(rank, take));
        choose_cards_from(tail, remaining - take, picked, out);
        picked.truncate(picked.len() - take);
    }
}

/// Every `size`-subset of distinct `ranks`, in lexicographic order.
fn choose_ranks(ranks: &[Rank], size: usize) -> Vec<Vec<Rank>> {
    let mut out = Vec::new();
    let mut picked = Vec::with_capacity(size);
    choose_ranks_from(ranks, size, &mut picked, &mut out);
    out
}

fn choose_ranks_from(
    ranks: &[Rank],
    remaining: usize,
    picked: &mut Vec<Rank>,
    out: &mut Vec<Vec<Rank>>,
) {
    if remaining == 0 {
        out.push(picked.clone());
        return;
    }
    if ranks.len() < remaining {
        return;
    }
    for (i, &rank) in ranks.iter().enumerate() {
        picked.push(rank);
        choose_ranks_from(&ranks[i + 1..], remaining - 1, picked, out);
        picked.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::{choose_cards, choose_ranks, generate_moves};
    use crate::model::combo::ComboKind;
    use crate::model::hand::Hand;
    use crate::model::rank::Rank;

    fn hand(text: &str) -> Hand {
        Hand::parse(text).unwrap()
    }

    fn labels_of(text: &str, kind: ComboKind) -> Vec<String> {
        generate_moves(&hand(text))
            .into_iter()
            .filter(|m| m.kind() == kind)
            .map(|m| m.label())
            .collect()
    }

    #[test]
    fn singles_pairs_and_triples() {
        let moves = generate_moves(&hand("3334"));
        assert_eq!(labels_of("3334", ComboKind::Single), ["3", "4"]);
        assert_eq!(labels_of("3334", ComboKind::Pair), ["33"]);
        assert_eq!(labels_of("3334", ComboKind::Triple), ["333"]);
        assert_eq!(labels_of("3334", ComboKind::TripleWithSingle), ["3334"]);
        assert!(labels_of("3334", ComboKind::TripleWithPair).is_empty());
        assert_eq!(moves.len(), 5);
    }

    #[test]
    fn triple_kickers_never_reuse_the_triple_rank() {
        assert_eq!(
            labels_of("33335", ComboKind::TripleWithSingle),
            ["3335"]
        );
        assert_eq!(labels_of("333555", ComboKind::TripleWithPair), ["33355", "33555"]);
    }

    #[test]
    fn rocket_needs_both_jokers() {
        assert_eq!(labels_of("XD", ComboKind::Rocket), ["XD"]);
        assert!(labels_of("X2", ComboKind::Rocket).is_empty());
    }

    #[test]
    fn quad_attachments_are_enumerated_by_rank() {
        assert_eq!(
            labels_of("7777889", ComboKind::QuadWithSingles),
            ["777788", "777789"]
        );
        assert_eq!(
            labels_of("77778899", ComboKind::QuadWithPairs),
            ["77778899"]
        );
        assert_eq!(labels_of("7777", ComboKind::Bomb), ["7777"]);
        assert!(labels_of("7777", ComboKind::QuadWithSingles).is_empty());
    }

    #[test]
    fn straights_cover_every_window() {
        let straights = labels_of("3456789", ComboKind::Straight);
        assert_eq!(
            straights,
            ["34567", "45678", "56789", "345678", "456789", "3456789"]
        );
        assert!(labels_of("TJQKA2", ComboKind::Straight).contains(&"TJQKA".to_string()));
        assert_eq!(labels_of("JQKA2X", ComboKind::Straight).len(), 0);
    }

    #[test]
    fn two_never_extends_a_straight() {
        assert_eq!(labels_of("345672", ComboKind::Straight), ["34567"]);
    }

    #[test]
    fn pair_sequences_need_three_pairs() {
        assert_eq!(labels_of("334455", ComboKind::PairSequence), ["334455"]);
        assert!(labels_of("3344", ComboKind::PairSequence).is_empty());
        assert!(labels_of("KKAA22", ComboKind::PairSequence).is_empty());
    }

    #[test]
    fn planes_carry_single_and_pair_wings() {
        let text = "33344456";
        assert_eq!(labels_of(text, ComboKind::Plane), ["333444"]);
        assert_eq!(labels_of(text, ComboKind::PlaneWithSingles), ["33344456"]);
        assert!(labels_of(text, ComboKind::PlaneWithPairs).is_empty());

        let paired = "3334445566";
        assert_eq!(
            labels_of(paired, ComboKind::PlaneWithPairs),
            ["3334445566"]
        );
        assert_eq!(
            labels_of(paired, ComboKind::PlaneWithSingles),
            ["33344455", "33344456", "33344466"]
        );
    }

    #[test]
    fn plane_of_twos_is_not_a_sequence() {
        assert!(labels_of("AAA222", ComboKind::Plane).is_empty());
        assert_eq!(labels_of("KKKAAA", ComboKind::Plane), ["KKKAAA"]);
    }

    #[test]
    fn sequence_metadata() {
        let moves = generate_moves(&hand("3334445566"));
        let plane = moves
            .iter()
            .find(|m| m.kind() == ComboKind::PlaneWithPairs)
            .unwrap();
        assert_eq!(plane.rank(), Rank::Three);
        assert_eq!(plane.length(), 2);
        let triple = moves.iter().find(|m| m.kind() == ComboKind::Triple).unwrap();
        assert_eq!(triple.length(), 0);
    }

    #[test]
    fn empty_hand_generates_nothing() {
        assert!(generate_moves(&Hand::new()).is_empty());
    }

    #[test]
    fn choose_cards_deduplicates_same_rank() {
        let picks = choose_cards(&hand("5556"), 2);
        assert_eq!(
            picks,
            vec![vec![Rank::Five, Rank::Five], vec![Rank::Five, Rank::Six]]
        );
        assert!(choose_cards(&hand("5"), 2).is_empty());
    }

    #[test]
    fn choose_ranks_is_lexicographic() {
        let ranks = [Rank::Three, Rank::Four, Rank::Five];
        assert_eq!(choose_ranks(&ranks, 2).len(), 3);
        assert_eq!(choose_ranks(&ranks, 2)[0], vec![Rank::Three, Rank::Four]);
        assert!(choose_ranks(&ranks, 4).is_empty());
    }
}

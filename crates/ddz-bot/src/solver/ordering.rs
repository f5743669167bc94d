use ddz_core::model::combo::{Combo, ComboKind};
use ddz_core::model::hand::Hand;
use ddz_core::rules::legal_responses;
use std::cmp::Reverse;

/// Rocket first, then bombs, then by descending primary rank. The sort is
/// stable, so equal keys keep generation order.
pub fn order_candidates(candidates: &mut [Combo]) {
    candidates.sort_by_key(|combo| {
        Reverse((
            combo.kind() == ComboKind::Rocket,
            combo.kind() == ComboKind::Bomb,
            combo.rank(),
        ))
    });
}

pub fn ordered_responses(hand: &Hand, last: Option<&Combo>) -> Vec<Combo> {
    let mut candidates = legal_responses(hand, last);
    order_candidates(&mut candidates);
    candidates
}

#[cfg(test)]
mod tests {
    use super::ordered_responses;
    use ddz_core::model::hand::Hand;

    #[test]
    fn rocket_then_bombs_then_high_ranks() {
        let hand = Hand::parse("3333XD9").unwrap();
        let labels: Vec<String> = ordered_responses(&hand, None)
            .iter()
            .map(|c| c.label())
            .collect();
        assert_eq!(labels[0], "XD");
        assert_eq!(labels[1], "3333");
        assert_eq!(labels[2], "D");
        assert_eq!(labels[3], "X");
        assert_eq!(labels[4], "9");
        assert_eq!(labels[5], "3");
        assert_eq!(labels.last().map(String::as_str), Some("3333XD"));
    }
}

use super::ordering::ordered_responses;
use super::table::{StateKey, TranspositionTable};
use super::{LOSS, WIN};
use ddz_core::model::combo::Combo;
use ddz_core::model::hand::Hand;

/// Which hand is on move. `Max` is the side the root query scores for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Max,
    Min,
}

/// Alpha-beta over {LOSS, WIN} with exact memoisation.
pub(crate) struct Search<'t> {
    table: &'t mut TranspositionTable,
    nodes: u64,
}

impl<'t> Search<'t> {
    pub(crate) fn new(table: &'t mut TranspositionTable) -> Self {
        Self { table, nodes: 0 }
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    pub(crate) fn evaluate(
        &mut self,
        max_hand: Hand,
        min_hand: Hand,
        turn: Role,
        last: Option<&Combo>,
        alpha: i16,
        beta: i16,
    ) -> u8 {
        self.nodes += 1;
        if max_hand.is_empty() {
            return WIN;
        }
        if min_hand.is_empty() {
            return LOSS;
        }

        // Values are exact: alpha stays in {-1, 0} and beta in {100, 101},
        // so no cutoff fires before a decisive short-circuit.
        let key = StateKey::new(&max_hand, &min_hand, turn, last);
        if let Some(value) = self.table.get(&key) {
            return value;
        }

        let value = match turn {
            Role::Max => self.maximize(max_hand, min_hand, last, alpha, beta),
            Role::Min => self.minimize(max_hand, min_hand, last, alpha, beta),
        };
        self.table.insert(key, value);
        value
    }

    fn maximize(
        &mut self,
        max_hand: Hand,
        min_hand: Hand,
        last: Option<&Combo>,
        mut alpha: i16,
        beta: i16,
    ) -> u8 {
        let mut best = LOSS;
        for combo in ordered_responses(&max_hand, last) {
            let Ok(rest) = max_hand.without(combo.cards()) else {
                continue;
            };
            let value = self.evaluate(rest, min_hand, Role::Min, Some(&combo), alpha, beta);
            if value == WIN {
                return WIN;
            }
            best = best.max(value);
            alpha = alpha.max(i16::from(best));
            if beta <= alpha {
                break;
            }
        }
        if last.is_some() {
            let value = self.evaluate(max_hand, min_hand, Role::Min, None, alpha, beta);
            best = best.max(value);
        }
        best
    }

    fn minimize(
        &mut self,
        max_hand: Hand,
        min_hand: Hand,
        last: Option<&Combo>,
        alpha: i16,
        mut beta: i16,
    ) -> u8 {
        let mut best = WIN;
        for combo in ordered_responses(&min_hand, last) {
            let Ok(rest) = min_hand.without(combo.cards()) else {
                continue;
            };
            let value = self.evaluate(max_hand, rest, Role::Max, Some(&combo), alpha, beta);
            if value == LOSS {
                return LOSS;
            }
            best = best.min(value);
            beta = beta.min(i16::from(best));
            if beta <= alpha {
                break;
            }
        }
        if last.is_some() {
            let value = self.evaluate(max_hand, min_hand, Role::Max, None, alpha, beta);
            best = best.min(value);
        }
        best
    }
}

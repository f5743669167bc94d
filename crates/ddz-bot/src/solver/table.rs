use super::search::Role;
use ddz_core::model::combo::{Combo, ComboKind};
use ddz_core::model::hand::Hand;
use ddz_core::model::rank::Rank;
use std::collections::HashMap;

/// Normalised search state. Hands are rank-count profiles so card order
/// never splits an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    max_hand: Hand,
    min_hand: Hand,
    turn: Role,
    last: Option<LastPlayKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LastPlayKey {
    counts: [u8; Rank::COUNT],
    kind: ComboKind,
    rank: Rank,
}

impl LastPlayKey {
    fn of(combo: &Combo) -> Self {
        let mut counts = [0u8; Rank::COUNT];
        for rank in combo.cards() {
            counts[rank.index()] += 1;
        }
        Self {
            counts,
            kind: combo.kind(),
            rank: combo.rank(),
        }
    }
}

impl StateKey {
    pub fn new(max_hand: &Hand, min_hand: &Hand, turn: Role, last: Option<&Combo>) -> Self {
        Self {
            max_hand: *max_hand,
            min_hand: *min_hand,
            turn,
            last: last.map(LastPlayKey::of),
        }
    }
}

/// Exact values keyed by state. Entries are valid under any alpha-beta
/// window because the value domain is {0, 100} and the search only stops
/// early on a decisive value.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<StateKey, u8>,
    hits: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &StateKey) -> Option<u8> {
        let value = self.entries.get(key).copied();
        if value.is_some() {
            self.hits += 1;
        }
        value
    }

    pub fn insert(&mut self, key: StateKey, value: u8) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }
}

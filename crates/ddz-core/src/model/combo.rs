use crate::model::rank::Rank;
use core::fmt;
use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

/// The closed set of playable combination shapes.
///
/// Declaration order doubles as the tie-break when one card set can be read
/// as several shapes (see [`classify`](crate::rules::classify())).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboKind {
    Rocket,
    Bomb,
    Single,
    Pair,
    Triple,
    TripleWithSingle,
    TripleWithPair,
    Straight,
    PairSequence,
    Plane,
    PlaneWithSingles,
    PlaneWithPairs,
    QuadWithSingles,
    QuadWithPairs,
}

impl ComboKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ComboKind::Rocket => "rocket",
            ComboKind::Bomb => "bomb",
            ComboKind::Single => "single",
            ComboKind::Pair => "pair",
            ComboKind::Triple => "triple",
            ComboKind::TripleWithSingle => "triple+single",
            ComboKind::TripleWithPair => "triple+pair",
            ComboKind::Straight => "straight",
            ComboKind::PairSequence => "pair_sequence",
            ComboKind::Plane => "plane",
            ComboKind::PlaneWithSingles => "plane+singles",
            ComboKind::PlaneWithPairs => "plane+pairs",
            ComboKind::QuadWithSingles => "quad+two_singles",
            ComboKind::QuadWithPairs => "quad+two_pairs",
        }
    }

    /// Bombs and the rocket may answer any other kind.
    pub const fn is_bomb_like(self) -> bool {
        matches!(self, ComboKind::Rocket | ComboKind::Bomb)
    }

    /// Kinds whose `length` counts consecutive units.
    pub const fn is_sequence(self) -> bool {
        matches!(
            self,
            ComboKind::Straight
                | ComboKind::PairSequence
                | ComboKind::Plane
                | ComboKind::PlaneWithSingles
                | ComboKind::PlaneWithPairs
        )
    }
}

impl fmt::Display for ComboKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playable combination taken from a hand.
///
/// Two combos are equal when they consume the same cards as the same kind;
/// `rank` and `length` follow from those for every shape the generator emits
/// except a plane whose wings form a further triple, which is emitted once
/// per reading.
#[derive(Debug, Clone, Eq)]
pub struct Combo {
    cards: Vec<Rank>,
    kind: ComboKind,
    rank: Rank,
    length: u8,
}

impl Combo {
    pub(crate) fn new(mut cards: Vec<Rank>, kind: ComboKind, rank: Rank, length: u8) -> Self {
        cards.sort_unstable();
        Self {
            cards,
            kind,
            rank,
            length,
        }
    }

    /// Consumed cards, ascending.
    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    pub fn kind(&self) -> ComboKind {
        self.kind
    }

    /// Rank compared between combos of the same kind: the rank of the
    /// single/pair/triple/quad body, or the lowest rank of a sequence.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Consecutive units for sequence kinds, 0 otherwise.
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn label(&self) -> String {
        self.cards.iter().map(|rank| rank.symbol()).collect()
    }

    /// Full identity including the primary rank, for callers that must tell
    /// apart the two readings of an ambiguous plane.
    pub fn same_reading(&self, other: &Combo) -> bool {
        self == other && self.rank == other.rank && self.length == other.length
    }
}

impl PartialEq for Combo {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.cards == other.cards
    }
}

impl Hash for Combo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cards.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

use crate::model::rank::Rank;
use core::fmt;
use std::str::FromStr;

/// A multiset of ranks. Suits play no part in legality, so a hand only
/// tracks how many cards of each rank it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hand {
    counts: [u8; Rank::COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandError {
    UnknownSymbol(char),
    TooMany { rank: Rank, count: u8 },
    Missing(Rank),
}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandError::UnknownSymbol(symbol) => write!(f, "unknown card symbol '{symbol}'"),
            HandError::TooMany { rank, count } => write!(
                f,
                "{count} cards of rank {rank} exceed the deck limit of {}",
                rank.max_copies()
            ),
            HandError::Missing(rank) => write!(f, "hand holds no more cards of rank {rank}"),
        }
    }
}

impl std::error::Error for HandError {}

impl Hand {
    pub const fn new() -> Self {
        Self {
            counts: [0; Rank::COUNT],
        }
    }

    pub fn from_ranks<I>(ranks: I) -> Result<Self, HandError>
    where
        I: IntoIterator<Item = Rank>,
    {
        let mut hand = Self::new();
        for rank in ranks {
            hand.insert(rank)?;
        }
        Ok(hand)
    }

    /// Parse symbol notation such as `"33 34 xD"`. Whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, HandError> {
        let mut hand = Self::new();
        for symbol in text.chars().filter(|c| !c.is_whitespace()) {
            let rank = Rank::from_symbol(symbol).ok_or(HandError::UnknownSymbol(symbol))?;
            hand.insert(rank)?;
        }
        Ok(hand)
    }

    pub fn count(&self, rank: Rank) -> u8 {
        self.counts[rank.index()]
    }

    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| usize::from(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Whether `ranks` is a sub-multiset of this hand.
    pub fn contains_all(&self, ranks: &[Rank]) -> bool {
        self.without(ranks).is_ok()
    }

    /// Returns a new hand with `ranks` taken out; `self` is left as is.
    pub fn without(&self, ranks: &[Rank]) -> Result<Self, HandError> {
        let mut rest = *self;
        for &rank in ranks {
            let slot = &mut rest.counts[rank.index()];
            if *slot == 0 {
                return Err(HandError::Missing(rank));
            }
            *slot -= 1;
        }
        Ok(rest)
    }

    /// Union of two hands, checked against the limits of a single deck.
    pub fn combined(&self, other: &Hand) -> Result<Self, HandError> {
        let mut merged = *self;
        for (rank, count) in other.distinct() {
            for _ in 0..count {
                merged.insert(rank)?;
            }
        }
        Ok(merged)
    }

    /// Present ranks in ascending order with their counts.
    pub fn distinct(&self) -> impl Iterator<Item = (Rank, u8)> + '_ {
        Rank::ORDERED
            .iter()
            .copied()
            .map(|rank| (rank, self.count(rank)))
            .filter(|&(_, count)| count > 0)
    }

    /// Every card as a rank, ascending.
    pub fn ranks(&self) -> Vec<Rank> {
        let mut ranks = Vec::with_capacity(self.len());
        for (rank, count) in self.distinct() {
            ranks.extend(std::iter::repeat_n(rank, usize::from(count)));
        }
        ranks
    }

    fn insert(&mut self, rank: Rank) -> Result<(), HandError> {
        let slot = &mut self.counts[rank.index()];
        if *slot >= rank.max_copies() {
            return Err(HandError::TooMany {
                rank,
                count: *slot + 1,
            });
        }
        *slot += 1;
        Ok(())
    }
}

impl FromStr for Hand {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hand::parse(s)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in self.ranks() {
            write!(f, "{rank}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Hand, HandError};
    use crate::model::rank::Rank;

    #[test]
    fn parse_ignores_whitespace_and_case() {
        let hand = Hand::parse(" 3 3 t x D ").unwrap();
        assert_eq!(hand.len(), 5);
        assert_eq!(hand.count(Rank::Three), 2);
        assert_eq!(hand.count(Rank::Ten), 1);
        assert_eq!(hand.count(Rank::SmallJoker), 1);
        assert_eq!(hand.count(Rank::BigJoker), 1);
    }

    #[test]
    fn display_roundtrips_in_ascending_order() {
        let hand: Hand = "2AKQJT98765433DX".parse().unwrap();
        assert_eq!(hand.to_string(), "33456789TJQKA2XD");
        assert_eq!(Hand::parse(&hand.to_string()).unwrap(), hand);
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert_eq!(Hand::parse("33Z"), Err(HandError::UnknownSymbol('Z')));
        assert_eq!(Hand::parse("10"), Err(HandError::UnknownSymbol('1')));
    }

    #[test]
    fn rejects_counts_beyond_deck_limits() {
        assert_eq!(
            Hand::parse("33333"),
            Err(HandError::TooMany {
                rank: Rank::Three,
                count: 5
            })
        );
        assert_eq!(
            Hand::parse("XX"),
            Err(HandError::TooMany {
                rank: Rank::SmallJoker,
                count: 2
            })
        );
    }

    #[test]
    fn without_leaves_original_untouched() {
        let hand = Hand::parse("3334").unwrap();
        let rest = hand.without(&[Rank::Three, Rank::Four]).unwrap();
        assert_eq!(rest.to_string(), "33");
        assert_eq!(hand.to_string(), "3334");
        assert_eq!(
            hand.without(&[Rank::Five]),
            Err(HandError::Missing(Rank::Five))
        );
        assert!(!hand.contains_all(&[Rank::Four, Rank::Four]));
        assert!(hand.contains_all(&[Rank::Three, Rank::Three, Rank::Three]));
    }

    #[test]
    fn combined_respects_a_single_deck() {
        let a = Hand::parse("333X").unwrap();
        let b = Hand::parse("3D").unwrap();
        assert_eq!(a.combined(&b).unwrap().to_string(), "3333XD");
        assert!(a.combined(&Hand::parse("33").unwrap()).is_err());
        assert!(a.combined(&Hand::parse("X").unwrap()).is_err());
    }

    #[test]
    fn empty_hand() {
        let hand = Hand::new();
        assert!(hand.is_empty());
        assert_eq!(hand.len(), 0);
        assert!(hand.ranks().is_empty());
        assert_eq!(Hand::parse("  ").unwrap(), hand);
    }
}

use crate::model::hand::Hand;
use crate::model::rank::Rank;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// The 54-card deck, tracked by rank only.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Rank>,
}

impl Deck {
    pub const SIZE: usize = 54;

    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(Self::SIZE);
        for rank in Rank::ORDERED.iter().copied() {
            cards.extend(std::iter::repeat_n(rank, usize::from(rank.max_copies())));
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    /// Deals `landlord` cards then `peasant` cards from the top of the deck.
    /// Returns `None` when the deck is too small.
    pub fn deal(&self, landlord: usize, peasant: usize) -> Option<[Hand; 2]> {
        let total = landlord.checked_add(peasant)?;
        if total > self.cards.len() {
            return None;
        }
        let (first, rest) = self.cards.split_at(landlord);
        let landlord_hand = Hand::from_ranks(first.iter().copied()).ok()?;
        let peasant_hand = Hand::from_ranks(rest[..peasant].iter().copied()).ok()?;
        Some([landlord_hand, peasant_hand])
    }
}

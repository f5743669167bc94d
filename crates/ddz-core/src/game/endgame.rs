use crate::model::combo::Combo;
use crate::model::hand::{Hand, HandError};
use crate::model::side::Side;
use crate::rules::legality::{is_legal, legal_responses};
use std::fmt;

/// One entry in the play log; `play` is `None` for a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub side: Side,
    pub play: Option<Combo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    GameOver,
    IllegalPlay(String),
    CannotPassWhenLeading,
    Cards(HandError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::GameOver => write!(f, "the endgame is already decided"),
            PlayError::IllegalPlay(label) => write!(f, "{label} is not a legal play here"),
            PlayError::CannotPassWhenLeading => write!(f, "cannot pass while leading"),
            PlayError::Cards(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {}

impl From<HandError> for PlayError {
    fn from(err: HandError) -> Self {
        PlayError::Cards(err)
    }
}

/// A two-hand endgame between the landlord and the combined peasants.
///
/// `last_play` is the combination the mover must beat; it resets to `None`
/// after a pass, which hands the lead to the passing side's opponent.
#[derive(Debug, Clone)]
pub struct Endgame {
    hands: [Hand; 2],
    to_move: Side,
    last_play: Option<Combo>,
    history: Vec<Turn>,
}

impl Endgame {
    pub fn new(landlord: Hand, peasant: Hand, first: Side) -> Self {
        Self::with_last_play(landlord, peasant, first, None)
    }

    /// Starts mid-trick: `last_play` was put down by the side not on move.
    pub fn with_last_play(
        landlord: Hand,
        peasant: Hand,
        to_move: Side,
        last_play: Option<Combo>,
    ) -> Self {
        Self {
            hands: [landlord, peasant],
            to_move,
            last_play,
            history: Vec::new(),
        }
    }

    pub fn hand(&self, side: Side) -> &Hand {
        &self.hands[side.index()]
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn last_play(&self) -> Option<&Combo> {
        self.last_play.as_ref()
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// The side that emptied its hand first, if any.
    pub fn winner(&self) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.hands[side.index()].is_empty())
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }

    pub fn can_pass(&self) -> bool {
        !self.is_finished() && self.last_play.is_some()
    }

    /// Combinations the side on move may put down.
    pub fn legal_plays(&self) -> Vec<Combo> {
        if self.is_finished() {
            return Vec::new();
        }
        legal_responses(self.hand(self.to_move), self.last_play.as_ref())
    }

    pub fn play(&mut self, combo: &Combo) -> Result<(), PlayError> {
        if self.is_finished() {
            return Err(PlayError::GameOver);
        }
        let side = self.to_move;
        let hand = self.hands[side.index()];
        if !is_legal(&hand, combo, self.last_play.as_ref()) {
            return Err(PlayError::IllegalPlay(combo.label()));
        }
        self.hands[side.index()] = hand.without(combo.cards())?;
        self.last_play = Some(combo.clone());
        self.history.push(Turn {
            side,
            play: Some(combo.clone()),
        });
        self.to_move = side.other();
        Ok(())
    }

    pub fn pass(&mut self) -> Result<(), PlayError> {
        if self.is_finished() {
            return Err(PlayError::GameOver);
        }
        if self.last_play.is_none() {
            return Err(PlayError::CannotPassWhenLeading);
        }
        self.history.push(Turn {
            side: self.to_move,
            play: None,
        });
        self.last_play = None;
        self.to_move = self.to_move.other();
        Ok(())
    }

    pub fn apply(&mut self, play: Option<&Combo>) -> Result<(), PlayError> {
        match play {
            Some(combo) => self.play(combo),
            None => self.pass(),
        }
    }
}

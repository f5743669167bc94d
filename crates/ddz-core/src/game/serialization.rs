use super::endgame::Endgame;
use crate::model::combo::{Combo, ComboKind};
use crate::model::hand::{Hand, HandError};
use crate::model::side::Side;
use crate::rules::classify::read_as;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A serialisable position: both hands, the side on move and the combination
/// it must beat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub landlord: String,
    pub peasant: String,
    pub to_move: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_play: Option<PlaySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaySnapshot {
    pub cards: String,
    pub kind: ComboKind,
}

#[derive(Debug)]
pub enum SnapshotError {
    Cards(HandError),
    NotACombination { cards: String, kind: ComboKind },
    Json(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Cards(err) => write!(f, "{err}"),
            SnapshotError::NotACombination { cards, kind } => {
                write!(f, "{cards} cannot be read as a {kind}")
            }
            SnapshotError::Json(err) => write!(f, "invalid snapshot json: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<HandError> for SnapshotError {
    fn from(err: HandError) -> Self {
        SnapshotError::Cards(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Json(err)
    }
}

impl PlaySnapshot {
    pub fn capture(combo: &Combo) -> Self {
        Self {
            cards: combo.label(),
            kind: combo.kind(),
        }
    }

    pub fn restore(&self) -> Result<Combo, SnapshotError> {
        let ranks = Hand::parse(&self.cards)?.ranks();
        read_as(&ranks, self.kind).ok_or_else(|| SnapshotError::NotACombination {
            cards: self.cards.clone(),
            kind: self.kind,
        })
    }
}

impl PositionSnapshot {
    pub fn capture(game: &Endgame) -> Self {
        PositionSnapshot {
            landlord: game.hand(Side::Landlord).to_string(),
            peasant: game.hand(Side::Peasant).to_string(),
            to_move: game.to_move(),
            last_play: game.last_play().map(PlaySnapshot::capture),
        }
    }

    pub fn restore(&self) -> Result<Endgame, SnapshotError> {
        let landlord = Hand::parse(&self.landlord)?;
        let peasant = Hand::parse(&self.peasant)?;
        let last_play = self.last_play.as_ref().map(PlaySnapshot::restore).transpose()?;
        Ok(Endgame::with_last_play(
            landlord,
            peasant,
            self.to_move,
            last_play,
        ))
    }

    pub fn to_json(game: &Endgame) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(game))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{PlaySnapshot, PositionSnapshot, SnapshotError};
    use crate::game::endgame::Endgame;
    use crate::model::combo::ComboKind;
    use crate::model::hand::Hand;
    use crate::model::side::Side;

    #[test]
    fn snapshot_serializes_to_json() {
        let game = Endgame::new(
            Hand::parse("33XD").unwrap(),
            Hand::parse("2A").unwrap(),
            Side::Peasant,
        );
        let json = PositionSnapshot::to_json(&game).unwrap();
        assert!(json.contains("\"landlord\": \"33XD\""));
        assert!(json.contains("\"to_move\": \"peasant\""));
        assert!(!json.contains("last_play"));
    }

    #[test]
    fn snapshot_roundtrip_keeps_last_play() {
        let mut game = Endgame::new(
            Hand::parse("3334").unwrap(),
            Hand::parse("5552").unwrap(),
            Side::Landlord,
        );
        let play = game
            .legal_plays()
            .into_iter()
            .find(|c| c.kind() == ComboKind::TripleWithSingle)
            .unwrap();
        game.play(&play).unwrap();

        let json = PositionSnapshot::to_json(&game).unwrap();
        let restored = PositionSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored.to_move(), Side::Peasant);
        assert!(restored.last_play().unwrap().same_reading(&play));
        assert_eq!(restored.hand(Side::Peasant), game.hand(Side::Peasant));
        assert!(restored.history().is_empty());
    }

    #[test]
    fn rejects_cards_that_do_not_form_the_kind() {
        let snapshot = PlaySnapshot {
            cards: "34".into(),
            kind: ComboKind::Pair,
        };
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::NotACombination { .. })
        ));
        assert!(matches!(
            PositionSnapshot::from_json("{"),
            Err(SnapshotError::Json(_))
        ));
    }
}

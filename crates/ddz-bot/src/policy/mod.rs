mod heuristic;
mod solver;

pub use heuristic::HeuristicPolicy;
pub use solver::SolverPolicy;

use ddz_core::game::endgame::Endgame;
use ddz_core::model::combo::Combo;
use ddz_core::model::hand::Hand;
use ddz_core::model::side::Side;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub side: Side,
    pub hand: &'a Hand,
    pub opponent: &'a Hand,
    pub last_play: Option<&'a Combo>,
}

impl<'a> PolicyContext<'a> {
    /// View of `game` from the side on move.
    pub fn from_endgame(game: &'a Endgame) -> Self {
        let side = game.to_move();
        Self {
            side,
            hand: game.hand(side),
            opponent: game.hand(side.other()),
            last_play: game.last_play(),
        }
    }

    pub fn can_pass(&self) -> bool {
        self.last_play.is_some()
    }
}

/// Chooses the play for the side on move. `None` means pass and must only be
/// returned when [`PolicyContext::can_pass`] holds.
pub trait Policy: Send {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Combo>;

    fn name(&self) -> &'static str;
}

use super::{Policy, PolicyContext};
use crate::solver::{Solver, Strategy};
use ddz_core::model::combo::Combo;

/// Plays the exact solver's choice every turn.
#[derive(Debug, Default)]
pub struct SolverPolicy {
    solver: Solver,
    last: Option<Strategy>,
}

impl SolverPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The strategy behind the most recent decision.
    pub fn last_strategy(&self) -> Option<&Strategy> {
        self.last.as_ref()
    }
}

impl Policy for SolverPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Combo> {
        let strategy = self
            .solver
            .best_strategy(ctx.hand, ctx.opponent, ctx.last_play);
        let play = strategy.play.clone();
        self.last = Some(strategy);
        play
    }

    fn name(&self) -> &'static str {
        "solver"
    }
}

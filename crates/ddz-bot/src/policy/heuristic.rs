use super::{Policy, PolicyContext};
use ddz_core::model::combo::{Combo, ComboKind};
use ddz_core::rules::legal_responses;
use std::cmp::Reverse;
use tracing::{Level, event};

/// Opponent hand size at or below which a bomb or the rocket is spent on a
/// response.
const BOMB_THRESHOLD: usize = 4;

/// Deterministic greedy play for benchmarking the solver against.
#[derive(Debug)]
pub struct HeuristicPolicy {
    bomb_threshold: usize,
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self {
            bomb_threshold: BOMB_THRESHOLD,
        }
    }

    pub fn with_bomb_threshold(bomb_threshold: usize) -> Self {
        Self { bomb_threshold }
    }

    fn decide(&self, ctx: &PolicyContext, legal: &[Combo]) -> (Option<Combo>, &'static str) {
        let hand_size = ctx.hand.len();
        if let Some(finisher) = legal.iter().find(|c| c.card_count() == hand_size) {
            return (Some(finisher.clone()), "finish");
        }

        let (plain, bombs): (Vec<&Combo>, Vec<&Combo>) =
            legal.iter().partition(|c| !c.kind().is_bomb_like());

        if !ctx.can_pass() {
            let pool = if plain.is_empty() { &bombs } else { &plain };
            let lead = pool
                .iter()
                .min_by_key(|c| (Reverse(c.card_count()), c.rank()))
                .map(|c| (*c).clone());
            return (lead, "lead_longest");
        }

        if let Some(cheapest) = plain.iter().min_by_key(|c| (c.rank(), c.card_count())) {
            return (Some((*cheapest).clone()), "cheapest_beat");
        }
        if ctx.opponent.len() <= self.bomb_threshold {
            let bomb = bombs
                .iter()
                .min_by_key(|c| (c.kind() == ComboKind::Rocket, c.rank()))
                .map(|c| (*c).clone());
            if bomb.is_some() {
                return (bomb, "bomb_to_stop");
            }
        }
        (None, "pass")
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for HeuristicPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Combo> {
        let legal = legal_responses(ctx.hand, ctx.last_play);
        let (choice, reason) = self.decide(ctx, &legal);
        log_play_decision(ctx, &legal, choice.as_ref(), reason);
        choice
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

fn log_play_decision(ctx: &PolicyContext, legal: &[Combo], chosen: Option<&Combo>, reason: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let choice = chosen.map(Combo::label).unwrap_or_else(|| "pass".to_string());
    let legal_preview = if legal.len() <= 6 {
        legal
            .iter()
            .map(Combo::label)
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} moves", legal.len())
    };

    event!(
        target: "ddz_bot::policy",
        Level::INFO,
        side = %ctx.side,
        hand_size = ctx.hand.len(),
        opponent_size = ctx.opponent.len(),
        legal_count = legal.len(),
        legal_moves = %legal_preview,
        chosen = %choice,
        reason,
    );
}

//! Evaluator trait for position and step scoring.
//!
//! The search never looks at evaluation weights; it only asks for a gold
//! win probability when a playout stops without a winner, and for step
//! scores when playouts use knowledge.

use games_arimaa::bitboard::Squares;
use games_arimaa::{rank_of, Piece, Player, Position, Step};

/// Trait for position evaluators. Both methods must leave the position
/// untouched.
pub trait Evaluator: Send + Sync {
    /// Probability in `[0, 1]` that gold wins from `position`.
    fn score_position(&self, position: &Position) -> f32;

    /// Heuristic desirability of `step` for the player making it. Only the
    /// ordering between candidates matters.
    fn score_step(&self, position: &Position, step: &Step) -> f32;
}

/// Evaluator without an opinion. Useful for testing the search.
#[derive(Debug, Clone, Default)]
pub struct NeutralEvaluator;

impl NeutralEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for NeutralEvaluator {
    fn score_position(&self, _position: &Position) -> f32 {
        0.5
    }

    fn score_step(&self, _position: &Position, _step: &Step) -> f32 {
        0.0
    }
}

/// Material count plus rabbit advancement, squashed through a logistic.
#[derive(Debug, Clone)]
pub struct MaterialEvaluator {
    /// Indexed by piece kind; slot 0 is unused.
    pub piece_values: [f32; 7],
    /// Bonus per rank a rabbit has advanced from its own back rank.
    pub rabbit_advance: f32,
    /// Material difference that moves the estimate from 0.5 to about 0.73.
    pub scale: f32,
    /// Penalty applied to passing in step scores.
    pub pass_penalty: f32,
}

impl Default for MaterialEvaluator {
    fn default() -> Self {
        Self {
            piece_values: [0.0, 1.0, 1.5, 2.0, 3.0, 5.0, 8.0],
            rabbit_advance: 0.15,
            scale: 4.0,
            pass_penalty: 0.5,
        }
    }
}

impl MaterialEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gold's advantage in material units.
    pub fn balance(&self, position: &Position) -> f32 {
        let mut balance = 0.0;
        for player in Player::BOTH {
            let sign = match player {
                Player::Gold => 1.0,
                Player::Silver => -1.0,
            };
            for piece in Piece::ALL {
                let count = position.pieces(player, piece).count_ones() as f32;
                balance += sign * count * self.piece_values[piece.index()];
            }
            let advanced: u32 = Squares(position.pieces(player, Piece::Rabbit))
                .map(|sq| match player {
                    Player::Gold => rank_of(sq) as u32,
                    Player::Silver => 7 - rank_of(sq) as u32,
                })
                .sum();
            balance += sign * advanced as f32 * self.rabbit_advance;
        }
        balance
    }
}

impl Evaluator for MaterialEvaluator {
    fn score_position(&self, position: &Position) -> f32 {
        if let Some(winner) = position.winner() {
            return match winner {
                Player::Gold => 1.0,
                Player::Silver => 0.0,
            };
        }
        1.0 / (1.0 + (-self.balance(position) / self.scale).exp())
    }

    fn score_step(&self, position: &Position, step: &Step) -> f32 {
        if !step.moves_piece() {
            return if step.is_pass() { -self.pass_penalty } else { 0.0 };
        }
        let mut after = *position;
        after.apply_step(step);
        let gain = self.balance(&after) - self.balance(position);
        match step.player() {
            Player::Gold => gain,
            Player::Silver => -gain,
        }
    }
}

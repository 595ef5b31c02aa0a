//! Bounded random playouts from a scratch position.

use games_arimaa::{Position, Step};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::UctConfig;
use crate::evaluator::Evaluator;

/// How a playout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoutStatus {
    /// The game was decided on the board.
    Finished,
    /// The playout ran past twice the configured maximum length.
    TooLong,
    /// The evaluate-early length was reached without a winner.
    Evaluate,
}

/// Plays whole turns on a position it borrows mutably until the game is
/// decided or a length limit is hit.
pub struct Playout<'a, E: Evaluator + ?Sized> {
    position: &'a mut Position,
    evaluator: &'a E,
    config: &'a UctConfig,
    turns: u32,
}

impl<'a, E: Evaluator + ?Sized> Playout<'a, E> {
    pub fn new(position: &'a mut Position, evaluator: &'a E, config: &'a UctConfig) -> Self {
        Self {
            position,
            evaluator,
            config,
            turns: 0,
        }
    }

    /// Turns played so far.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlayoutStatus {
        loop {
            self.play_turn(rng);
            self.turns += 1;

            if self.position.is_game_over() {
                return PlayoutStatus::Finished;
            }
            if self.turns > 2 * self.config.max_playout_length {
                return PlayoutStatus::TooLong;
            }
            if self.config.eval_after_length > 0 && self.turns > self.config.eval_after_length {
                return PlayoutStatus::Evaluate;
            }
        }
    }

    /// Commit steps until the side to move hands the turn over. A side
    /// without any legal step loses on the spot.
    fn play_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        loop {
            let side = self.position.side_to_move();
            let steps = self.position.legal_steps(side);
            let step = match self.choose_step(&steps, rng) {
                Some(step) => step,
                None => {
                    self.position.mark_immobilized();
                    Step::NoStep(side)
                }
            };
            if self.position.commit_step(&step) {
                return;
            }
        }
    }

    fn choose_step<R: Rng + ?Sized>(&self, steps: &[Step], rng: &mut R) -> Option<Step> {
        if steps.is_empty() {
            return None;
        }
        if !self.config.knowledge_in_playout {
            return steps.choose(rng).copied();
        }
        Some(self.tournament(steps, rng))
    }

    /// Keep the best-scored of a few random candidates. A tournament size
    /// of 0 scores each candidate with probability 1/2 instead. Falls back
    /// to the last step when nothing was scored.
    fn tournament<R: Rng + ?Sized>(&self, steps: &[Step], rng: &mut R) -> Step {
        let mut best = steps.len() - 1;
        let mut best_score = f32::NEG_INFINITY;
        let mut consider = |i: usize| {
            let score = self.evaluator.score_step(self.position, &steps[i]);
            if score > best_score {
                best_score = score;
                best = i;
            }
        };

        let size = self.config.knowledge_tournament_size as usize;
        if size == 0 {
            for i in 0..steps.len() {
                if rng.gen_bool(0.5) {
                    consider(i);
                }
            }
        } else {
            for _ in 0..size.min(steps.len() / 2) {
                consider(rng.gen_range(0..steps.len()));
            }
        }
        steps[best]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{MaterialEvaluator, NeutralEvaluator};
    use games_arimaa::{Piece, Player};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_playout_stops_early_for_evaluation() {
        let config = UctConfig::for_testing().with_playout_lengths(50, 3);
        let evaluator = NeutralEvaluator::new();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut pos = Position::standard();

        let mut playout = Playout::new(&mut pos, &evaluator, &config);
        let status = playout.run(&mut rng);
        let turns = playout.turns();
        if status == PlayoutStatus::Evaluate {
            assert_eq!(turns, 4);
        } else {
            assert_eq!(status, PlayoutStatus::Finished);
            assert!(turns <= 4);
        }
        assert_eq!(pos.step_count(), 0);
    }

    #[test]
    fn test_playout_too_long() {
        let config = UctConfig::for_testing().with_playout_lengths(2, 0);
        let evaluator = NeutralEvaluator::new();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        // lone elephants can shuffle forever
        let mut pos = Position::new();
        pos.place_piece(0, Player::Gold, Piece::Rabbit);
        pos.place_piece(1, Player::Gold, Piece::Elephant);
        pos.place_piece(63, Player::Silver, Piece::Rabbit);
        pos.place_piece(62, Player::Silver, Piece::Elephant);
        let mut pos = Position::from_compact(&pos.to_compact()).unwrap();

        let mut playout = Playout::new(&mut pos, &evaluator, &config);
        let status = playout.run(&mut rng);
        if status == PlayoutStatus::TooLong {
            assert_eq!(playout.turns(), 5);
        } else {
            assert_eq!(status, PlayoutStatus::Finished);
        }
    }

    #[test]
    fn test_immobilized_side_loses() {
        // silver's only rabbit is frozen and boxed in by gold
        let mut pos = Position::new();
        pos.place_piece(63, Player::Silver, Piece::Rabbit); // h8
        pos.place_piece(62, Player::Gold, Piece::Elephant); // g8
        pos.place_piece(55, Player::Gold, Piece::Camel); // h7
        pos.place_piece(0, Player::Gold, Piece::Rabbit);
        let mut pos = Position::from_compact(&format!("s{}", &pos.to_compact()[1..])).unwrap();
        assert!(pos.legal_steps(Player::Silver).is_empty());

        let config = UctConfig::for_testing();
        let evaluator = NeutralEvaluator::new();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let status = Playout::new(&mut pos, &evaluator, &config).run(&mut rng);
        assert_eq!(status, PlayoutStatus::Finished);
        assert_eq!(pos.winner(), Some(Player::Gold));
    }

    #[test]
    fn test_tournament_picks_capture() {
        let mut pos = Position::new();
        pos.place_piece(20, Player::Gold, Piece::Elephant); // e3
        pos.place_piece(19, Player::Silver, Piece::Cat); // d3
        pos.place_piece(8, Player::Gold, Piece::Rabbit);
        pos.place_piece(63, Player::Silver, Piece::Rabbit);
        let pos = Position::from_compact(&pos.to_compact()).unwrap();

        let mut scratch = pos;
        let config = UctConfig::for_testing().with_knowledge(true, 0);
        let evaluator = MaterialEvaluator::new();
        let playout = Playout::new(&mut scratch, &evaluator, &config);
        let steps = pos.legal_steps(Player::Gold);
        let capture = Step::Push {
            mover: games_arimaa::PieceMove::new(Player::Gold, Piece::Elephant, 20, 19),
            victim: games_arimaa::PieceMove::new(Player::Silver, Piece::Cat, 19, 18),
        };
        assert!(steps.contains(&capture));

        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut picked = 0;
        for _ in 0..50 {
            if playout.tournament(&steps, &mut rng) == capture {
                picked += 1;
            }
        }
        // scored in about half the rounds, and best whenever scored
        assert!(picked > 10);
    }
}

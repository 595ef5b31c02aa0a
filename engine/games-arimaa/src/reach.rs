//! Bounded reachability search and goal detection.

use crate::bitboard::{circle, distance, goal_rank, sphere, Squares};
use crate::piece::{Piece, Player, Square};
use crate::position::Position;
use crate::step::Step;

impl Position {
    /// Can the piece on `from` reach `to` within `budget` step-counts,
    /// with friendly pieces allowed to clear the way?
    ///
    /// Returns the first sequence found. The search is a depth-first walk
    /// over hypothetical boards; friendly pieces are tried in rings of
    /// growing distance from `from`.
    pub fn reachability(&self, from: Square, to: Square, budget: u32) -> Option<Vec<Step>> {
        let player = self.player_at(from)?;
        let mut path = Vec::new();
        self.reach_from(from, to, player, budget as i32, 0, &mut path)
            .map(|_| path)
    }

    fn reach_from(
        &self,
        from: Square,
        to: Square,
        player: Player,
        limit: i32,
        used: i32,
        path: &mut Vec<Step>,
    ) -> Option<i32> {
        if from == to {
            return Some(used);
        }

        let reserve = limit - used - distance(from, to) as i32;
        let mut pseudo_reserve = reserve;
        if let Some(owner) = self.player_at(to) {
            pseudo_reserve -= 1;
            if owner != player {
                pseudo_reserve -= 1;
            }
        }
        if pseudo_reserve < 0 || self.player_at(from) != Some(player) {
            return None;
        }

        let ring_limit = reserve + 3;
        for radius in 0..=ring_limit {
            let ring = self.occupied(player) & circle(from, radius as u32);
            for sq in Squares(ring) {
                for step in self.steps_for_piece(sq) {
                    let Some(mover) = step.mover() else {
                        continue;
                    };
                    let next_from = if mover.from == from { mover.to } else { from };
                    // helpers may only move while there is slack
                    if next_from == from && reserve == 0 {
                        continue;
                    }
                    let mut next = *self;
                    next.apply_step(&step);
                    next.add_steps_used(step.count());
                    if let Some(total) =
                        next.reach_from(next_from, to, player, limit, used + step.count() as i32, path)
                    {
                        path.insert(0, step);
                        return Some(total);
                    }
                }
            }
        }
        None
    }

    /// Steps within `budget` that put one of `player`'s rabbits on its
    /// goal rank. Smaller budgets are tried first, so the sequence found
    /// is as short as possible.
    pub fn goal_check(&self, player: Player, budget: u32) -> Option<Vec<Step>> {
        let rabbits = self.pieces(player, Piece::Rabbit);
        for limit in 1..=budget {
            for from in Squares(rabbits) {
                let goals = goal_rank(player) & sphere(from, limit);
                for to in Squares(goals) {
                    match self.reachability(from, to, limit) {
                        Some(path) if !path.is_empty() => return Some(path),
                        _ => {}
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(pieces: &[(Square, Player, Piece)]) -> Position {
        let mut pos = Position::new();
        for &(sq, player, piece) in pieces {
            pos.place_piece(sq, player, piece);
        }
        pos.set_move_count(2);
        pos
    }

    #[test]
    fn test_direct_run() {
        // gold rabbit a5 runs to a8
        let pos = board(&[
            (32, Player::Gold, Piece::Rabbit),
            (63, Player::Silver, Piece::Rabbit),
        ]);
        let path = pos.reachability(32, 56, 4).unwrap();
        assert_eq!(path.len(), 3);
        assert!(pos.reachability(32, 56, 2).is_none());
    }

    #[test]
    fn test_friend_clears_the_way() {
        // gold rabbit a6, gold cat a7 blocks; cat steps aside then rabbit runs
        let pos = board(&[
            (40, Player::Gold, Piece::Rabbit),
            (48, Player::Gold, Piece::Cat),
            (63, Player::Silver, Piece::Rabbit),
        ]);
        // the rabbit's own detour needs four steps, so three forces the cat
        let path = pos.reachability(40, 56, 3).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0].mover().map(|m| m.piece), Some(Piece::Cat));
        let mut replay = pos;
        for step in &path {
            replay.apply_step(step);
        }
        assert_eq!(replay.piece_at(56), Some((Player::Gold, Piece::Rabbit)));
    }

    #[test]
    fn test_goal_check() {
        let pos = board(&[
            (49, Player::Gold, Piece::Rabbit), // b7
            (63, Player::Silver, Piece::Rabbit),
        ]);
        let path = pos.goal_check(Player::Gold, 4).unwrap();
        assert_eq!(path, vec![Step::single(Player::Gold, Piece::Rabbit, 49, 57)]);
        assert!(pos.goal_check(Player::Silver, 4).is_none());
    }

    #[test]
    fn test_frozen_rabbit_cannot_reach() {
        // silver elephant b6 freezes the lone gold rabbit b7
        let pos = board(&[
            (49, Player::Gold, Piece::Rabbit),
            (41, Player::Silver, Piece::Elephant),
            (63, Player::Silver, Piece::Rabbit),
        ]);
        assert!(pos.goal_check(Player::Gold, 1).is_none());
    }
}

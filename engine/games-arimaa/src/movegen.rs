//! Step generation: frozen pieces, push/pull victims, and setup placements.

use crate::bitboard::{bit, home_ranks, neighbors, step_targets, Bitboard, Squares};
use crate::piece::{Piece, Player, Square};
use crate::position::Position;
use crate::step::{PieceMove, Step};

impl Position {
    /// Pieces of `player` that are not frozen.
    ///
    /// A piece is frozen when a stronger enemy piece is adjacent and no
    /// friendly piece is. Sweeping kinds from weakest to strongest, the
    /// "stronger enemies" mask shrinks one kind at a time.
    pub fn movable(&self, player: Player) -> Bitboard {
        let opp = player.opponent();
        let support = neighbors(self.occupied(player));
        let mut stronger = self.occupied(opp);
        let mut movable = 0;
        for piece in Piece::ALL {
            movable |= self.pieces(player, piece);
            stronger ^= self.pieces(opp, piece);
            movable &= support | !neighbors(stronger);
        }
        movable
    }

    /// For each kind, the enemy pieces strictly weaker than it.
    pub fn weaker_than(&self, player: Player) -> [Bitboard; 7] {
        let opp = player.opponent();
        let mut weaker = [0; 7];
        for pair in Piece::ALL.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            weaker[upper.index()] = weaker[lower.index()] | self.pieces(opp, lower);
        }
        weaker
    }

    /// Every legal step for `player` in the current turn.
    ///
    /// On move 1, while `player` still holds pieces in reserve, this is
    /// every (reserve kind, empty home square) placement. Otherwise: plain steps, pushes and pulls while fewer than
    /// three steps are used, and a pass once at least one step is used.
    pub fn legal_steps(&self, player: Player) -> Vec<Step> {
        if self.move_count() == 1 && self.reserve(player).iter().any(|&n| n > 0) {
            return self.placements(player);
        }

        let mut steps = Vec::with_capacity(64);
        let weaker = self.weaker_than(player);
        for sq in Squares(self.movable(player)) {
            self.push_piece_steps(sq, player, &weaker, &mut steps);
        }
        if self.step_count() >= 1 {
            steps.push(Step::Pass(player));
        }
        steps
    }

    /// Steps for the single piece on `sq`, empty if it is frozen or absent.
    pub fn steps_for_piece(&self, sq: Square) -> Vec<Step> {
        let mut steps = Vec::new();
        if let Some(player) = self.player_at(sq) {
            if self.movable(player) & bit(sq) != 0 {
                let weaker = self.weaker_than(player);
                self.push_piece_steps(sq, player, &weaker, &mut steps);
            }
        }
        steps
    }

    fn push_piece_steps(
        &self,
        from: Square,
        player: Player,
        weaker: &[Bitboard; 7],
        out: &mut Vec<Step>,
    ) {
        let Some((_, piece)) = self.piece_at(from) else {
            return;
        };
        let empty = self.empty();
        let is_rabbit = piece == Piece::Rabbit;

        for to in Squares(step_targets(player, is_rabbit, from) & empty) {
            out.push(Step::single(player, piece, from, to));
        }

        if is_rabbit || self.step_count() >= 3 {
            return;
        }

        let opp = player.opponent();
        let around = neighbors(bit(from));
        for victim_from in Squares(around & weaker[piece.index()]) {
            let Some((_, victim_piece)) = self.piece_at(victim_from) else {
                continue;
            };
            for to in Squares(around & empty) {
                out.push(Step::Pull {
                    mover: PieceMove::new(player, piece, from, to),
                    victim: PieceMove::new(opp, victim_piece, victim_from, from),
                });
            }
            for victim_to in Squares(neighbors(bit(victim_from)) & empty) {
                out.push(Step::Push {
                    mover: PieceMove::new(player, piece, from, victim_from),
                    victim: PieceMove::new(opp, victim_piece, victim_from, victim_to),
                });
            }
        }
    }

    fn placements(&self, player: Player) -> Vec<Step> {
        let reserve = self.reserve(player);
        let squares = home_ranks(player) & self.empty();
        let mut steps = Vec::new();
        for piece in Piece::ALL {
            if reserve[piece.index()] == 0 {
                continue;
            }
            for square in Squares(squares) {
                steps.push(Step::Place {
                    square,
                    piece,
                    player,
                });
            }
        }
        steps
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
    fn test_frozen_piece_has_no_steps() {
        // gold cat d4 next to silver dog d5, no support
        let pos = board(&[
            (27, Player::Gold, Piece::Cat),
            (35, Player::Silver, Piece::Dog),
        ]);
        assert_eq!(pos.movable(Player::Gold) & bit(27), 0);
        assert!(pos.legal_steps(Player::Gold).is_empty());

        // a friendly neighbour unfreezes it
        let pos = board(&[
            (27, Player::Gold, Piece::Cat),
            (26, Player::Gold, Piece::Rabbit),
            (35, Player::Silver, Piece::Dog),
        ]);
        assert_ne!(pos.movable(Player::Gold) & bit(27), 0);
    }

    #[test]
    fn test_equal_strength_does_not_freeze_or_push() {
        let pos = board(&[
            (27, Player::Gold, Piece::Dog),
            (35, Player::Silver, Piece::Dog),
        ]);
        assert_ne!(pos.movable(Player::Gold) & bit(27), 0);
        let steps = pos.legal_steps(Player::Gold);
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| !s.is_push_pull()));
    }

    #[test]
    fn test_push_and_pull_generation() {
        // lone gold elephant d4, silver cat d5
        let pos = board(&[
            (27, Player::Gold, Piece::Elephant),
            (35, Player::Silver, Piece::Cat),
        ]);
        let steps = pos.legal_steps(Player::Gold);
        let singles = steps.iter().filter(|s| matches!(s, Step::Single(_))).count();
        let pulls = steps.iter().filter(|s| matches!(s, Step::Pull { .. })).count();
        let pushes = steps.iter().filter(|s| matches!(s, Step::Push { .. })).count();
        assert_eq!(singles, 3);
        assert_eq!(pulls, 3);
        assert_eq!(pushes, 3);
        assert!(!steps.iter().any(|s| s.is_pass()));
    }

    #[test]
    fn test_no_push_with_three_steps_used() {
        let mut pos = board(&[
            (27, Player::Gold, Piece::Elephant),
            (35, Player::Silver, Piece::Cat),
        ]);
        pos.add_steps_used(3);
        let steps = pos.legal_steps(Player::Gold);
        assert!(steps.iter().all(|s| !s.is_push_pull()));
        assert!(steps.iter().any(|s| s.is_pass()));
    }

    #[test]
    fn test_rabbits_do_not_step_back_or_push() {
        let pos = board(&[
            (27, Player::Gold, Piece::Rabbit),
            (35, Player::Silver, Piece::Rabbit),
            (28, Player::Gold, Piece::Cat),
        ]);
        let rabbit_steps = pos.steps_for_piece(27);
        // north and east are blocked, south is backwards
        assert_eq!(rabbit_steps, vec![Step::single(Player::Gold, Piece::Rabbit, 27, 26)]);
    }

    #[test]
    fn test_setup_placements() {
        let pos = Position::from_compact(&format!("g [{}]", ".".repeat(64))).unwrap();
        assert_eq!(pos.move_count(), 1);
        let steps = pos.legal_steps(Player::Gold);
        assert_eq!(steps.len(), 16 * 6);
        let squares = steps.iter().fold(0u64, |acc, s| match s {
            Step::Place { square, .. } => acc | bit(*square),
            _ => panic!("unexpected step {s:?}"),
        });
        assert_eq!(squares, home_ranks(Player::Gold));
    }

    #[test]
    fn test_placements_continue_after_first_piece() {
        let mut pos = Position::new();
        let first = Step::Place {
            square: 0,
            piece: Piece::Rabbit,
            player: Player::Gold,
        };
        assert!(!pos.commit_step(&first));
        assert_eq!(pos.side_to_move(), Player::Gold);

        let steps = pos.legal_steps(Player::Gold);
        assert!(steps.iter().all(|s| matches!(s, Step::Place { .. })));
        // a1 is taken, every kind still has a piece left
        assert_eq!(steps.len(), 15 * 6);
        assert!(!steps.contains(&first));
    }

    #[test]
    fn test_exhausted_kind_is_not_offered() {
        let mut pos = Position::new();
        pos.commit_step(&Step::Place {
            square: 12,
            piece: Piece::Elephant,
            player: Player::Gold,
        });
        let steps = pos.legal_steps(Player::Gold);
        assert_eq!(steps.len(), 15 * 5);
        assert!(steps.iter().all(|s| !matches!(
            s,
            Step::Place {
                piece: Piece::Elephant,
                ..
            }
        )));
    }
}

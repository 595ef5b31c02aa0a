//! The bit-parallel board and its turn bookkeeping.

use std::fmt;
use std::str::FromStr;

use crate::bitboard::{bit, goal_rank, neighbors, Bitboard, Squares, TRAPS};
use crate::piece::{square_at, square_name, Piece, Player, Square};
use crate::step::{PieceMove, Step};
use crate::zobrist;
use crate::PositionError;

/// A piece that died in a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrapKill {
    pub player: Player,
    pub piece: Piece,
    pub square: Square,
}

impl TrapKill {
    /// Notation token such as `Cc3x`.
    pub fn token(&self) -> String {
        format!("{}{}x", self.piece.letter(self.player), square_name(self.square))
    }
}

/// Kills caused by each relocation of a step, in notation order.
pub type StepKills = [Option<TrapKill>; 2];

/// Complete game position.
///
/// A small `Copy` value; hypothetical lines are explored on explicit copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// `[player][kind]`; kind 0 is the player's occupancy.
    bitboards: [[Bitboard; 7]; 2],
    to_move: Player,
    step_count: u8,
    move_count: u32,
    signature: u64,
    pre_turn_signature: u64,
    winner: Option<Player>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

const GOLD_BACK_RANK: [Piece; 8] = [
    Piece::Horse,
    Piece::Dog,
    Piece::Cat,
    Piece::Camel,
    Piece::Elephant,
    Piece::Cat,
    Piece::Dog,
    Piece::Horse,
];

const SILVER_BACK_RANK: [Piece; 8] = [
    Piece::Horse,
    Piece::Dog,
    Piece::Cat,
    Piece::Elephant,
    Piece::Camel,
    Piece::Cat,
    Piece::Dog,
    Piece::Horse,
];

impl Position {
    /// Empty board, gold to play its setup.
    pub fn new() -> Self {
        Self {
            bitboards: [[0; 7]; 2],
            to_move: Player::Gold,
            step_count: 0,
            move_count: 1,
            signature: 0,
            pre_turn_signature: 0,
            winner: None,
        }
    }

    /// Both sides set up with the engine's default arrangement, gold to move
    /// on move 2.
    pub fn standard() -> Self {
        let mut pos = Self::new();
        for file in 0..8u8 {
            pos.place_piece(square_at(file, 0), Player::Gold, Piece::Rabbit);
            pos.place_piece(square_at(file, 1), Player::Gold, GOLD_BACK_RANK[file as usize]);
            pos.place_piece(square_at(file, 7), Player::Silver, Piece::Rabbit);
            pos.place_piece(
                square_at(file, 6),
                Player::Silver,
                SILVER_BACK_RANK[file as usize],
            );
        }
        pos.move_count = 2;
        pos.pre_turn_signature = pos.signature;
        pos
    }

    #[inline]
    pub fn side_to_move(&self) -> Player {
        self.to_move
    }

    /// Steps already used in the current turn (0 to 3).
    #[inline]
    pub fn step_count(&self) -> u8 {
        self.step_count
    }

    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    #[inline]
    pub fn signature(&self) -> u64 {
        self.signature
    }

    /// Signature at the start of the current turn.
    #[inline]
    pub fn pre_turn_signature(&self) -> u64 {
        self.pre_turn_signature
    }

    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    #[inline]
    pub fn occupied(&self, player: Player) -> Bitboard {
        self.bitboards[player.index()][0]
    }

    #[inline]
    pub fn all_occupied(&self) -> Bitboard {
        self.bitboards[0][0] | self.bitboards[1][0]
    }

    #[inline]
    pub fn empty(&self) -> Bitboard {
        !self.all_occupied()
    }

    #[inline]
    pub fn pieces(&self, player: Player, piece: Piece) -> Bitboard {
        self.bitboards[player.index()][piece.index()]
    }

    /// Owner of the piece on `sq`, if any.
    pub fn player_at(&self, sq: Square) -> Option<Player> {
        let b = bit(sq);
        Player::BOTH.into_iter().find(|p| self.occupied(*p) & b != 0)
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Player, Piece)> {
        let player = self.player_at(sq)?;
        let b = bit(sq);
        Piece::ALL
            .into_iter()
            .find(|piece| self.pieces(player, *piece) & b != 0)
            .map(|piece| (player, piece))
    }

    /// Put a piece on an empty square.
    ///
    /// # Panics
    /// If the square is already occupied.
    pub fn place_piece(&mut self, sq: Square, player: Player, piece: Piece) {
        assert!(
            self.all_occupied() & bit(sq) == 0,
            "place_piece: {} is occupied",
            square_name(sq)
        );
        let b = bit(sq);
        let boards = &mut self.bitboards[player.index()];
        boards[0] |= b;
        boards[piece.index()] |= b;
        self.signature ^= zobrist::key(player, piece, sq);
    }

    /// Remove `player`'s piece from `sq`, looking up its kind.
    ///
    /// # Panics
    /// If `player` has no piece on the square.
    pub fn remove_piece(&mut self, sq: Square, player: Player) -> Piece {
        let b = bit(sq);
        let piece = Piece::ALL
            .into_iter()
            .find(|piece| self.pieces(player, *piece) & b != 0)
            .unwrap_or_else(|| {
                panic!("remove_piece: no {player:?} piece on {}", square_name(sq))
            });
        self.remove_piece_kind(sq, player, piece);
        piece
    }

    /// Remove a piece whose kind is already known.
    ///
    /// # Panics
    /// If that piece is not on the square.
    pub fn remove_piece_kind(&mut self, sq: Square, player: Player, piece: Piece) {
        let b = bit(sq);
        assert!(
            self.pieces(player, piece) & b != 0,
            "remove_piece_kind: no {:?} {:?} on {}",
            player,
            piece,
            square_name(sq)
        );
        let boards = &mut self.bitboards[player.index()];
        boards[0] &= !b;
        boards[piece.index()] &= !b;
        self.signature ^= zobrist::key(player, piece, sq);
    }

    /// Signature recomputed from the piece masks alone.
    pub fn compute_signature(&self) -> u64 {
        let mut sig = 0;
        for player in Player::BOTH {
            for piece in Piece::ALL {
                for sq in Squares(self.pieces(player, piece)) {
                    sig ^= zobrist::key(player, piece, sq);
                }
            }
        }
        sig
    }

    /// Move one piece and resolve the traps it affects.
    fn relocate(&mut self, m: &PieceMove) -> Option<TrapKill> {
        self.remove_piece_kind(m.from, m.player, m.piece);
        self.place_piece(m.to, m.player, m.piece);
        self.resolve_traps()
    }

    /// Remove every trapped piece left without a friendly neighbour.
    fn resolve_traps(&mut self) -> Option<TrapKill> {
        let mut kill = None;
        for player in Player::BOTH {
            let occ = self.occupied(player);
            let doomed = TRAPS & occ & !neighbors(occ);
            for sq in Squares(doomed) {
                let piece = self.remove_piece(sq, player);
                kill = Some(TrapKill {
                    player,
                    piece,
                    square: sq,
                });
            }
        }
        kill
    }

    /// Play the board effect of a step: relocations, trap deaths and
    /// placements. Turn bookkeeping is left to [`Position::commit_step`].
    pub fn apply_step(&mut self, step: &Step) -> StepKills {
        let mut kills = [None, None];
        match *step {
            Step::Place {
                square,
                piece,
                player,
            } => self.place_piece(square, player, piece),
            _ => {
                for (slot, m) in step.sub_moves().iter().enumerate() {
                    if let Some(m) = m {
                        kills[slot] = self.relocate(m);
                    }
                }
            }
        }
        kills
    }

    /// Apply `step` and advance the turn bookkeeping.
    ///
    /// Returns `true` when the step finished the turn: after four
    /// step-counts, a pass, a no-step, or the last setup placement.
    pub fn commit_step(&mut self, step: &Step) -> bool {
        match *step {
            Step::NoStep(_) => {
                self.finish_turn(true);
                true
            }
            Step::Pass(_) => {
                self.step_count += 1;
                self.finish_turn(true);
                true
            }
            Step::Place { player, .. } => {
                self.apply_step(step);
                if self.reserve(player).iter().all(|&n| n == 0) {
                    self.finish_turn(false);
                    true
                } else {
                    false
                }
            }
            _ => {
                self.apply_step(step);
                self.step_count += step.count();
                if self.step_count >= 4 {
                    self.finish_turn(true);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Hand the move to the opponent.
    pub(crate) fn finish_turn(&mut self, check_winner: bool) {
        if check_winner && self.winner.is_none() {
            self.update_winner();
        }
        if self.to_move == Player::Silver {
            self.move_count += 1;
        }
        self.to_move = self.to_move.opponent();
        self.step_count = 0;
        self.pre_turn_signature = self.signature;
    }

    /// Decide the game at the end of the side to move's turn. Goals are
    /// checked before eliminations, the mover's before the opponent's.
    fn update_winner(&mut self) {
        let me = self.to_move;
        let opp = me.opponent();
        let my_rabbits = self.pieces(me, Piece::Rabbit);
        let opp_rabbits = self.pieces(opp, Piece::Rabbit);

        self.winner = if my_rabbits & goal_rank(me) != 0 {
            Some(me)
        } else if opp_rabbits & goal_rank(opp) != 0 {
            Some(opp)
        } else if opp_rabbits == 0 {
            Some(me)
        } else if my_rabbits == 0 {
            Some(opp)
        } else {
            None
        };
    }

    /// The side to move cannot act; its opponent wins.
    pub fn mark_immobilized(&mut self) {
        self.winner = Some(self.to_move.opponent());
    }

    /// True on move 1 while the side to move has not placed its pieces.
    pub fn is_setup_phase(&self) -> bool {
        self.move_count == 1 && self.occupied(self.to_move) == 0
    }

    /// Pieces of each kind `player` still has to place, indexed by kind.
    pub fn reserve(&self, player: Player) -> [u32; 7] {
        let mut left = [0u32; 7];
        for piece in Piece::ALL {
            left[piece.index()] = piece
                .initial_count()
                .saturating_sub(self.pieces(player, piece).count_ones());
        }
        left
    }

    /// Signature the position would have after `step`.
    pub fn signature_after(&self, step: &Step) -> u64 {
        let mut scratch = *self;
        scratch.apply_step(step);
        scratch.signature
    }

    /// Side to move once `step` is committed.
    pub fn player_after_step(&self, step: &Step) -> Player {
        if self.ends_turn(step) {
            self.to_move.opponent()
        } else {
            self.to_move
        }
    }

    /// Whether committing `step` would finish the current turn.
    pub fn ends_turn(&self, step: &Step) -> bool {
        match step {
            Step::NoStep(_) | Step::Pass(_) => true,
            Step::Place { .. } => false,
            _ => self.step_count + step.count() >= 4,
        }
    }

    pub(crate) fn add_steps_used(&mut self, n: u8) {
        self.step_count += n;
    }

    pub(crate) fn set_move_count(&mut self, n: u32) {
        self.move_count = n;
    }

    /// Parse the compact `<side> [<64 squares>]` format, rank 8 first.
    pub fn from_compact(s: &str) -> Result<Self, PositionError> {
        let s = s.trim();
        let side_char = s
            .chars()
            .next()
            .ok_or_else(|| PositionError::InvalidCompact("empty string".into()))?;
        let to_move =
            Player::from_side_char(side_char).ok_or(PositionError::InvalidSide(side_char))?;

        let open = s
            .find('[')
            .ok_or_else(|| PositionError::InvalidCompact("missing '['".into()))?;
        let close = s
            .rfind(']')
            .filter(|&c| c > open)
            .ok_or_else(|| PositionError::InvalidCompact("missing ']'".into()))?;
        let board: Vec<char> = s[open + 1..close].chars().collect();
        if board.len() != 64 {
            return Err(PositionError::InvalidCompact(format!(
                "expected 64 squares, found {}",
                board.len()
            )));
        }

        let mut pos = Self::new();
        for (i, &c) in board.iter().enumerate() {
            if matches!(c, ' ' | '.' | 'x' | 'X') {
                continue;
            }
            let (player, piece) = Piece::from_letter(c).ok_or(PositionError::InvalidPiece(c))?;
            let sq = square_at((i % 8) as u8, 7 - (i / 8) as u8);
            pos.place_piece(sq, player, piece);
        }

        pos.to_move = to_move;
        if pos.occupied(Player::Gold) != 0 && pos.occupied(Player::Silver) != 0 {
            pos.move_count = 2;
        }
        pos.pre_turn_signature = pos.signature;
        Ok(pos)
    }

    /// Inverse of [`Position::from_compact`].
    pub fn to_compact(&self) -> String {
        let mut out = String::with_capacity(68);
        out.push(self.to_move.side_char());
        out.push_str(" [");
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                out.push(self.square_char(square_at(file, rank)));
            }
        }
        out.push(']');
        out
    }

    fn square_char(&self, sq: Square) -> char {
        match self.piece_at(sq) {
            Some((player, piece)) => piece.letter(player),
            None if TRAPS & bit(sq) != 0 => 'X',
            None => '.',
        }
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_compact(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{}", self.move_count, self.to_move.side_char())?;
        writeln!(f, " +-----------------+")?;
        for rank in (0..8u8).rev() {
            write!(f, "{}|", rank + 1)?;
            for file in 0..8u8 {
                let sq = square_at(file, rank);
                let c = match self.square_char(sq) {
                    '.' => ' ',
                    'X' => 'x',
                    c => c,
                };
                write!(f, " {c}")?;
            }
            writeln!(f, " |")?;
        }
        writeln!(f, " +-----------------+")?;
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove_keep_signature() {
        let mut pos = Position::new();
        pos.place_piece(12, Player::Gold, Piece::Elephant);
        pos.place_piece(52, Player::Silver, Piece::Camel);
        assert_eq!(pos.signature(), pos.compute_signature());
        assert_eq!(pos.piece_at(12), Some((Player::Gold, Piece::Elephant)));

        assert_eq!(pos.remove_piece(52, Player::Silver), Piece::Camel);
        assert_eq!(pos.signature(), pos.compute_signature());
        pos.remove_piece_kind(12, Player::Gold, Piece::Elephant);
        assert_eq!(pos.signature(), 0);
        assert_eq!(pos.all_occupied(), 0);
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn test_place_on_occupied_square_panics() {
        let mut pos = Position::new();
        pos.place_piece(0, Player::Gold, Piece::Rabbit);
        pos.place_piece(0, Player::Silver, Piece::Rabbit);
    }

    #[test]
    fn test_standard_position() {
        let pos = Position::standard();
        assert_eq!(pos.occupied(Player::Gold).count_ones(), 16);
        assert_eq!(pos.occupied(Player::Silver).count_ones(), 16);
        assert_eq!(pos.piece_at(12), Some((Player::Gold, Piece::Elephant)));
        assert_eq!(pos.piece_at(51), Some((Player::Silver, Piece::Elephant)));
        assert_eq!(pos.move_count(), 2);
        assert!(!pos.is_setup_phase());
        assert_eq!(pos.reserve(Player::Gold), [0; 7]);
    }

    #[test]
    fn test_compact_round_trip() {
        let pos = Position::standard();
        let compact = pos.to_compact();
        assert!(compact.starts_with("g ["));
        assert_eq!(&compact[3..11], "rrrrrrrr");
        let back = Position::from_compact(&compact).unwrap();
        assert_eq!(back, pos);
    }

    #[test]
    fn test_compact_errors() {
        assert!(matches!(
            Position::from_compact("q [....]"),
            Err(PositionError::InvalidSide('q'))
        ));
        assert!(matches!(
            Position::from_compact("g [....]"),
            Err(PositionError::InvalidCompact(_))
        ));
        let bad = format!("g [{}Z]", ".".repeat(63));
        assert!(matches!(
            Position::from_compact(&bad),
            Err(PositionError::InvalidPiece('Z'))
        ));
    }

    #[test]
    fn test_commit_counts_steps_and_flips_side() {
        let mut pos = Position::standard();
        let before = pos.signature();
        assert!(!pos.commit_step(&Step::single(Player::Gold, Piece::Elephant, 12, 20)));
        assert_eq!(pos.step_count(), 1);
        assert_eq!(pos.pre_turn_signature(), before);
        assert!(pos.commit_step(&Step::Pass(Player::Gold)));
        assert_eq!(pos.step_count(), 0);
        assert_eq!(pos.side_to_move(), Player::Silver);
        assert_eq!(pos.move_count(), 2);
        assert_eq!(pos.pre_turn_signature(), pos.signature());

        assert!(pos.commit_step(&Step::Pass(Player::Silver)));
        assert_eq!(pos.move_count(), 3);
        assert_eq!(pos.side_to_move(), Player::Gold);
    }

    #[test]
    fn test_rabbit_on_goal_wins() {
        let mut pos = Position::new();
        pos.place_piece(48, Player::Gold, Piece::Rabbit); // a7
        pos.place_piece(55, Player::Silver, Piece::Rabbit); // h7
        pos.set_move_count(5);
        pos.commit_step(&Step::single(Player::Gold, Piece::Rabbit, 48, 56));
        assert!(pos.commit_step(&Step::Pass(Player::Gold)));
        assert_eq!(pos.winner(), Some(Player::Gold));
    }

    #[test]
    fn test_opponent_without_rabbits_loses() {
        let mut pos = Position::new();
        pos.place_piece(12, Player::Gold, Piece::Elephant);
        pos.place_piece(8, Player::Gold, Piece::Rabbit);
        pos.place_piece(40, Player::Silver, Piece::Dog);
        pos.set_move_count(5);
        pos.commit_step(&Step::single(Player::Gold, Piece::Elephant, 12, 20));
        assert!(pos.commit_step(&Step::Pass(Player::Gold)));
        assert_eq!(pos.winner(), Some(Player::Gold));
    }
}

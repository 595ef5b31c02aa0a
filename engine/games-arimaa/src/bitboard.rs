//! 64-bit board masks and the precomputed tables built on them.
//!
//! Bit `i` stands for square `i` (a1 = bit 0, h8 = bit 63). All tables are
//! built once on first use and never mutated afterwards.

use once_cell::sync::Lazy;

use crate::piece::{file_of, rank_of, Player, Square, NUM_SQUARES};

pub type Bitboard = u64;

pub const EMPTY: Bitboard = 0;
pub const FILE_A: Bitboard = 0x0101_0101_0101_0101;
pub const FILE_H: Bitboard = 0x8080_8080_8080_8080;
pub const NOT_FILE_A: Bitboard = !FILE_A;
pub const NOT_FILE_H: Bitboard = !FILE_H;
pub const RANK_1: Bitboard = 0x0000_0000_0000_00ff;
pub const RANK_2: Bitboard = 0x0000_0000_0000_ff00;
pub const RANK_7: Bitboard = 0x00ff_0000_0000_0000;
pub const RANK_8: Bitboard = 0xff00_0000_0000_0000;

/// c3, f3, c6 and f6.
pub const TRAPS: Bitboard = (1 << 18) | (1 << 21) | (1 << 42) | (1 << 45);

#[inline]
pub fn bit(sq: Square) -> Bitboard {
    1u64 << sq
}

#[inline]
pub fn is_trap(sq: Square) -> bool {
    TRAPS & bit(sq) != 0
}

/// Every square orthogonally adjacent to some square of `b`.
#[inline]
pub fn neighbors(b: Bitboard) -> Bitboard {
    ((b & NOT_FILE_H) << 1) | ((b & NOT_FILE_A) >> 1) | (b << 8) | (b >> 8)
}

/// Rank a player's rabbits must reach to win.
#[inline]
pub fn goal_rank(player: Player) -> Bitboard {
    match player {
        Player::Gold => RANK_8,
        Player::Silver => RANK_1,
    }
}

/// The two ranks a player fills during setup.
#[inline]
pub fn home_ranks(player: Player) -> Bitboard {
    match player {
        Player::Gold => RANK_1 | RANK_2,
        Player::Silver => RANK_7 | RANK_8,
    }
}

/// Manhattan distance between two squares.
#[inline]
pub fn distance(a: Square, b: Square) -> u32 {
    (file_of(a) as i32 - file_of(b) as i32).unsigned_abs()
        + (rank_of(a) as i32 - rank_of(b) as i32).unsigned_abs()
}

struct Tables {
    /// `[player][rabbit?][square]` -> squares reachable by one plain step.
    step_targets: [[[Bitboard; NUM_SQUARES]; 2]; 2],
    /// `[square][radius]` -> squares at exactly that distance.
    circles: Vec<[Bitboard; 15]>,
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    let mut step_targets = [[[0u64; NUM_SQUARES]; 2]; 2];
    let mut circles = vec![[0u64; 15]; NUM_SQUARES];

    for sq in 0..NUM_SQUARES as Square {
        let all = neighbors(bit(sq));
        for player in Player::BOTH {
            let backward = match player {
                Player::Gold => bit(sq) >> 8,
                Player::Silver => bit(sq) << 8,
            };
            step_targets[player.index()][0][sq as usize] = all;
            step_targets[player.index()][1][sq as usize] = all & !backward;
        }
        for other in 0..NUM_SQUARES as Square {
            circles[sq as usize][distance(sq, other) as usize] |= bit(other);
        }
    }

    Tables {
        step_targets,
        circles,
    }
});

/// Squares a piece on `sq` may step to, ignoring occupancy.
/// Rabbits never step backwards.
#[inline]
pub fn step_targets(player: Player, rabbit: bool, sq: Square) -> Bitboard {
    TABLES.step_targets[player.index()][rabbit as usize][sq as usize]
}

/// Squares at exactly `radius` from `center`.
pub fn circle(center: Square, radius: u32) -> Bitboard {
    TABLES.circles[center as usize]
        .get(radius as usize)
        .copied()
        .unwrap_or(EMPTY)
}

/// Squares within `radius` of `center`, center included.
pub fn sphere(center: Square, radius: u32) -> Bitboard {
    TABLES.circles[center as usize]
        .iter()
        .take(radius as usize + 1)
        .fold(EMPTY, |acc, ring| acc | ring)
}

/// Iterator over the set squares of a bitboard, lowest first.
#[derive(Debug, Clone, Copy)]
pub struct Squares(pub Bitboard);

impl Iterator for Squares {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let sq = self.0.trailing_zeros() as Square;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

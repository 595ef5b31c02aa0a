//! Players, piece kinds, squares and directions.

use crate::PositionError;

/// Board square index, `rank * 8 + file` with a1 = 0 and h8 = 63.
pub type Square = u8;

pub const NUM_SQUARES: usize = 64;

/// One of the two sides. Gold moves first and is written in uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    Gold = 0,
    Silver = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::Gold, Player::Silver];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Gold => Player::Silver,
            Player::Silver => Player::Gold,
        }
    }

    /// Side character used in compact position strings and move numbers.
    pub fn side_char(self) -> char {
        match self {
            Player::Gold => 'g',
            Player::Silver => 's',
        }
    }

    /// Accepts both the `g`/`s` and the older `w`/`b` spellings.
    pub fn from_side_char(c: char) -> Option<Player> {
        match c {
            'g' | 'w' | 'G' | 'W' => Some(Player::Gold),
            's' | 'b' | 'S' | 'B' => Some(Player::Silver),
            _ => None,
        }
    }
}

/// Piece kinds ordered by strength. The discriminant doubles as the
/// bitboard index; index 0 is reserved for the per-player occupancy mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Piece {
    Rabbit = 1,
    Cat = 2,
    Dog = 3,
    Horse = 4,
    Camel = 5,
    Elephant = 6,
}

const PIECE_LETTERS: &[u8; 6] = b"RCDHME";

impl Piece {
    /// Weakest first.
    pub const ALL: [Piece; 6] = [
        Piece::Rabbit,
        Piece::Cat,
        Piece::Dog,
        Piece::Horse,
        Piece::Camel,
        Piece::Elephant,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Piece> {
        Piece::ALL.get(index.wrapping_sub(1)).copied()
    }

    /// Number of pieces of this kind each player starts with.
    pub fn initial_count(self) -> u32 {
        match self {
            Piece::Rabbit => 8,
            Piece::Cat | Piece::Dog | Piece::Horse => 2,
            Piece::Camel | Piece::Elephant => 1,
        }
    }

    pub fn letter(self, player: Player) -> char {
        let c = PIECE_LETTERS[self.index() - 1] as char;
        match player {
            Player::Gold => c,
            Player::Silver => c.to_ascii_lowercase(),
        }
    }

    /// Parse a piece letter; the case tells the owner.
    pub fn from_letter(c: char) -> Option<(Player, Piece)> {
        let upper = c.to_ascii_uppercase() as u8;
        let pos = PIECE_LETTERS.iter().position(|&l| l == upper)?;
        let player = if c.is_ascii_uppercase() {
            Player::Gold
        } else {
            Player::Silver
        };
        Some((player, Piece::ALL[pos]))
    }
}

/// The four cardinal directions, seen from gold's side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn offset(self) -> i8 {
        match self {
            Direction::North => 8,
            Direction::South => -8,
            Direction::East => 1,
            Direction::West => -1,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::South => 's',
            Direction::East => 'e',
            Direction::West => 'w',
        }
    }

    pub fn from_letter(c: char) -> Option<Direction> {
        match c {
            'n' => Some(Direction::North),
            's' => Some(Direction::South),
            'e' => Some(Direction::East),
            'w' => Some(Direction::West),
            _ => None,
        }
    }

    /// Direction leading from `from` to the adjacent square `to`.
    pub fn between(from: Square, to: Square) -> Option<Direction> {
        match to as i16 - from as i16 {
            8 => Some(Direction::North),
            -8 => Some(Direction::South),
            1 if file_of(from) < 7 => Some(Direction::East),
            -1 if file_of(from) > 0 => Some(Direction::West),
            _ => None,
        }
    }

    /// Square one step away, or `None` when it falls off the board.
    pub fn apply(self, sq: Square) -> Option<Square> {
        match self {
            Direction::North if rank_of(sq) < 7 => Some(sq + 8),
            Direction::South if rank_of(sq) > 0 => Some(sq - 8),
            Direction::East if file_of(sq) < 7 => Some(sq + 1),
            Direction::West if file_of(sq) > 0 => Some(sq - 1),
            _ => None,
        }
    }
}

#[inline]
pub fn file_of(sq: Square) -> u8 {
    sq & 7
}

#[inline]
pub fn rank_of(sq: Square) -> u8 {
    sq >> 3
}

#[inline]
pub fn square_at(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

/// Algebraic name of a square, e.g. `c3`.
pub fn square_name(sq: Square) -> String {
    let file = (b'a' + file_of(sq)) as char;
    let rank = (b'1' + rank_of(sq)) as char;
    format!("{file}{rank}")
}

/// Parse an algebraic square name such as `e2`.
pub fn parse_square(s: &str) -> Result<Square, PositionError> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(PositionError::InvalidSquare(s.to_string()));
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(PositionError::InvalidSquare(s.to_string()));
    }
    Ok(square_at(file - b'a', rank - b'1'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_letters() {
        assert_eq!(Piece::Elephant.letter(Player::Gold), 'E');
        assert_eq!(Piece::Camel.letter(Player::Silver), 'm');
        assert_eq!(Piece::from_letter('h'), Some((Player::Silver, Piece::Horse)));
        assert_eq!(Piece::from_letter('R'), Some((Player::Gold, Piece::Rabbit)));
        assert_eq!(Piece::from_letter('x'), None);
    }

    #[test]
    fn test_piece_index_round_trip() {
        for piece in Piece::ALL {
            assert_eq!(Piece::from_index(piece.index()), Some(piece));
        }
        assert_eq!(Piece::from_index(0), None);
        assert_eq!(Piece::from_index(7), None);
    }

    #[test]
    fn test_square_names() {
        assert_eq!(square_name(0), "a1");
        assert_eq!(square_name(63), "h8");
        assert_eq!(parse_square("c3").unwrap(), 18);
        assert!(parse_square("i1").is_err());
        assert!(parse_square("a9").is_err());
    }

    #[test]
    fn test_direction_edges() {
        assert_eq!(Direction::West.apply(8), None);
        assert_eq!(Direction::East.apply(7), None);
        assert_eq!(Direction::North.apply(0), Some(8));
        assert_eq!(Direction::between(7, 8), None);
        assert_eq!(Direction::between(9, 8), Some(Direction::West));
    }
}

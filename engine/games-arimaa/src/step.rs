//! Steps (the atomic actions of a turn) and moves (a whole turn).

use std::fmt;
use std::str::FromStr;

use crate::notation;
use crate::piece::{square_name, Direction, Piece, Player, Square};
use crate::PositionError;

/// One piece travelling to an adjacent square.
///
/// Field order matters: the derived ordering compares origin, target,
/// piece kind and owner in that sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub player: Player,
}

impl PieceMove {
    pub fn new(player: Player, piece: Piece, from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            piece,
            player,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        Direction::between(self.from, self.to)
    }

    /// Notation token such as `Ee2n`.
    pub fn token(&self) -> String {
        let dir = self.direction().map_or('?', Direction::letter);
        format!(
            "{}{}{}",
            self.piece.letter(self.player),
            square_name(self.from),
            dir
        )
    }
}

/// A single atomic action inside a turn.
///
/// The derived `Ord` is a plain total order used for deduplication:
/// variant first, then the mover's fields, then the displaced piece's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Ends the turn without doing anything; used when a side is stuck.
    NoStep(Player),
    /// Ends the turn early. Legal once at least one step has been played.
    Pass(Player),
    Single(PieceMove),
    /// `mover` takes the square the weaker `victim` is pushed away from.
    Push { mover: PieceMove, victim: PieceMove },
    /// `victim` follows `mover` into the square it vacated.
    Pull { mover: PieceMove, victim: PieceMove },
    /// Setup-phase placement of a piece from the reserve.
    Place {
        square: Square,
        piece: Piece,
        player: Player,
    },
}

impl Step {
    pub fn single(player: Player, piece: Piece, from: Square, to: Square) -> Self {
        Step::Single(PieceMove::new(player, piece, from, to))
    }

    pub fn player(&self) -> Player {
        match *self {
            Step::NoStep(p) | Step::Pass(p) => p,
            Step::Single(m) => m.player,
            Step::Push { mover, .. } | Step::Pull { mover, .. } => mover.player,
            Step::Place { player, .. } => player,
        }
    }

    /// Number of steps this action uses out of the four per turn.
    pub fn count(&self) -> u8 {
        match self {
            Step::Single(_) => 1,
            Step::Push { .. } | Step::Pull { .. } => 2,
            _ => 0,
        }
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Step::Pass(_))
    }

    #[inline]
    pub fn is_push_pull(&self) -> bool {
        matches!(self, Step::Push { .. } | Step::Pull { .. })
    }

    /// True for every step that relocates at least one piece.
    #[inline]
    pub fn moves_piece(&self) -> bool {
        matches!(
            self,
            Step::Single(_) | Step::Push { .. } | Step::Pull { .. }
        )
    }

    pub fn mover(&self) -> Option<PieceMove> {
        match *self {
            Step::Single(m) => Some(m),
            Step::Push { mover, .. } | Step::Pull { mover, .. } => Some(mover),
            _ => None,
        }
    }

    pub fn victim(&self) -> Option<PieceMove> {
        match *self {
            Step::Push { victim, .. } | Step::Pull { victim, .. } => Some(victim),
            _ => None,
        }
    }

    /// Relocations in the order they are written and resolved.
    /// A push displaces the victim first, a pull moves the mover first.
    pub fn sub_moves(&self) -> [Option<PieceMove>; 2] {
        match *self {
            Step::Single(m) => [Some(m), None],
            Step::Push { mover, victim } => [Some(victim), Some(mover)],
            Step::Pull { mover, victim } => [Some(mover), Some(victim)],
            _ => [None, None],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::NoStep(_) => write!(f, "-"),
            Step::Pass(_) => write!(f, "pass"),
            Step::Place {
                square,
                piece,
                player,
            } => write!(f, "{}{}", piece.letter(*player), square_name(*square)),
            _ => {
                let tokens: Vec<String> =
                    self.sub_moves().iter().flatten().map(PieceMove::token).collect();
                write!(f, "{}", tokens.join(" "))
            }
        }
    }
}

/// The steps making up one player's turn.
///
/// A regular move holds at most four step-counts worth of steps; an
/// opening move holds up to sixteen placements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Move {
    steps: Vec<Step>,
}

impl Move {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_opening(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| matches!(s, Step::Place { .. }))
    }

    /// Steps used out of the four per turn.
    pub fn step_count(&self) -> u32 {
        self.steps.iter().map(|s| s.count() as u32).sum()
    }
}

impl FromStr for Move {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        notation::parse_move(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self
            .steps
            .iter()
            .filter(|s| !matches!(s, Step::Pass(_) | Step::NoStep(_)))
            .map(Step::to_string)
            .collect();
        write!(f, "{}", tokens.join(" "))
    }
}

impl From<Vec<Step>> for Move {
    fn from(steps: Vec<Step>) -> Self {
        Self::from_steps(steps)
    }
}

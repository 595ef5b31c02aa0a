//! Arimaa position model for the UCT engine.
//!
//! This crate owns everything about the board itself: bitboards and
//! Zobrist signatures, step generation with freezing and push/pull rules,
//! trap resolution, win detection, repetition filtering, move notation and
//! the bounded reachability search used for goal detection.
//!
//! # Usage
//!
//! ```rust
//! use games_arimaa::{Game, Player, Position};
//!
//! let mut game = Game::from_position(Position::standard());
//! game.play_notation("Ee2n Ee3n").unwrap();
//! assert_eq!(game.position().side_to_move(), Player::Silver);
//! ```

pub mod bitboard;
mod error;
mod game;
mod movegen;
pub mod notation;
mod piece;
mod position;
mod reach;
mod repetition;
mod step;
mod zobrist;

pub use bitboard::Bitboard;
pub use error::PositionError;
pub use game::Game;
pub use notation::{parse_move, parse_token, render_move};
pub use piece::{
    file_of, parse_square, rank_of, square_at, square_name, Direction, Piece, Player, Square,
    NUM_SQUARES,
};
pub use position::{Position, StepKills, TrapKill};
pub use repetition::RepetitionTracker;
pub use step::{Move, PieceMove, Step};

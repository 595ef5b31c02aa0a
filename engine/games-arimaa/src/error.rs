//! Errors for malformed external input.

use thiserror::Error;

/// Failure to read a position, square or move from text, or to apply a
/// move that does not fit the board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("Invalid compact position: {0}")]
    InvalidCompact(String),

    #[error("Invalid side character '{0}'")]
    InvalidSide(char),

    #[error("Invalid piece letter '{0}'")]
    InvalidPiece(char),

    #[error("Invalid square '{0}'")]
    InvalidSquare(String),

    #[error("Invalid step token '{0}'")]
    InvalidToken(String),

    #[error("Illegal step {step}: {reason}")]
    IllegalStep { step: String, reason: String },

    #[error("Move contains no steps")]
    EmptyMove,
}

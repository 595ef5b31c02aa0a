//! A game in progress: the current position, its repetition history and
//! the record of moves played so far.

use tracing::debug;

use crate::notation::{parse_move, render_move};
use crate::position::Position;
use crate::repetition::RepetitionTracker;
use crate::step::{Move, Step};
use crate::PositionError;

#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    repetitions: RepetitionTracker,
    /// Rendered moves, each prefixed with its move number and side.
    record: Vec<String>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Empty board, gold to set up.
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    pub fn from_position(position: Position) -> Self {
        Self::with_history(position, RepetitionTracker::DEFAULT_CAPACITY)
    }

    pub fn with_history(position: Position, capacity: usize) -> Self {
        let mut repetitions = RepetitionTracker::with_capacity(capacity);
        repetitions.record_position(&position);
        Self {
            position,
            repetitions,
            record: Vec::new(),
        }
    }

    /// Replay a record of moves, one per entry, from an empty board.
    pub fn from_record<S: AsRef<str>>(moves: &[S]) -> Result<Self, PositionError> {
        let mut game = Self::new();
        for text in moves {
            game.play_notation(text.as_ref())?;
        }
        Ok(game)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn repetitions(&self) -> &RepetitionTracker {
        &self.repetitions
    }

    pub fn record(&self) -> &[String] {
        &self.record
    }

    pub fn is_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// Play a move for the side to move and log it in the record.
    ///
    /// An illegal move leaves the game unchanged.
    pub fn play(&mut self, mv: &Move) -> Result<(), PositionError> {
        let before = self.position;
        let mut after = before;
        let played = after.apply_move(mv)?;
        let text = render_move(&before, &played);
        self.position = after;
        self.repetitions.record_position(&self.position);
        let entry = format!(
            "{}{} {}",
            before.move_count(),
            before.side_to_move().side_char(),
            text
        );
        debug!(
            signature = self.position.signature(),
            winner = ?self.position.winner(),
            "played {}", entry
        );
        self.record.push(entry);
        Ok(())
    }

    pub fn play_notation(&mut self, text: &str) -> Result<(), PositionError> {
        self.play(&parse_move(text)?)
    }

    /// Play a step sequence as produced by a search, such as a goal path.
    pub fn play_steps(&mut self, steps: &[Step]) -> Result<(), PositionError> {
        self.play(&Move::from_steps(steps.to_vec()))
    }
}

//! Move notation: parsing tokens, rendering moves with trap kills, and
//! playing a parsed move onto a position.
//!
//! A token is `<piece><square>` for a setup placement, `<piece><square><dir>`
//! for a step and `<piece><square>x` for a capture. Captures are derived from
//! the board, so they are skipped when reading and regenerated when writing.

use crate::bitboard::{bit, home_ranks};
use crate::piece::{parse_square, Direction, Piece};
use crate::position::Position;
use crate::step::{Move, PieceMove, Step};
use crate::PositionError;

/// Parse one token. Capture tokens yield `Ok(None)`.
pub fn parse_token(token: &str) -> Result<Option<Step>, PositionError> {
    let invalid = || PositionError::InvalidToken(token.to_string());
    if !token.is_ascii() || !(3..=4).contains(&token.len()) {
        return Err(invalid());
    }

    let letter = token.chars().next().ok_or_else(invalid)?;
    let (player, piece) = Piece::from_letter(letter).ok_or_else(invalid)?;
    let square = parse_square(&token[1..3]).map_err(|_| invalid())?;

    if token.len() == 3 {
        return Ok(Some(Step::Place {
            square,
            piece,
            player,
        }));
    }

    let last = token[3..].chars().next().ok_or_else(invalid)?;
    if last == 'x' {
        return Ok(None);
    }
    let to = Direction::from_letter(last)
        .and_then(|dir| dir.apply(square))
        .ok_or_else(invalid)?;
    Ok(Some(Step::single(player, piece, square, to)))
}

fn is_move_number(token: &str) -> bool {
    let mut chars = token.chars();
    let side = chars.next_back();
    let digits = chars.as_str();
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && side.is_some_and(|c| c.is_ascii_alphabetic())
}

/// Parse a whitespace-separated move such as `2g Ee2n Ee3n` or an opening
/// move `Ra1 Rb1 ...`. A leading move number and `pass` tokens are ignored.
///
/// Pushes and pulls come back as two single steps; [`Position::apply_move`]
/// pairs them up against the board.
pub fn parse_move(text: &str) -> Result<Move, PositionError> {
    let mut mv = Move::new();
    for (i, token) in text.split_whitespace().enumerate() {
        if (i == 0 && is_move_number(token)) || token == "pass" {
            continue;
        }
        if let Some(step) = parse_token(token)? {
            mv.push(step);
        }
    }
    Ok(mv)
}

/// Render `steps` as played from `position`, inserting a capture token after
/// each relocation that kills a piece. Passes are not written.
///
/// `steps` must already be legal from `position`; use the list returned by
/// [`Position::apply_move`] for moves that came from outside.
pub fn render_move(position: &Position, steps: &[Step]) -> String {
    let mut scratch = *position;
    let mut tokens = Vec::new();
    for step in steps {
        match step {
            Step::Pass(_) | Step::NoStep(_) => {}
            Step::Place { .. } => {
                scratch.apply_step(step);
                tokens.push(step.to_string());
            }
            _ => {
                let kills = scratch.apply_step(step);
                for (m, kill) in step.sub_moves().iter().zip(kills.iter()) {
                    if let Some(m) = m {
                        tokens.push(m.token());
                    }
                    if let Some(kill) = kill {
                        tokens.push(kill.token());
                    }
                }
            }
        }
    }
    tokens.join(" ")
}

impl Position {
    /// Play a whole move for the side to move and hand the turn over.
    ///
    /// The move is checked on a scratch copy first; on error `self` is left
    /// untouched. Returns the steps as played: tokens paired into pushes
    /// and pulls, with the closing pass if one was needed.
    pub fn apply_move(&mut self, mv: &Move) -> Result<Vec<Step>, PositionError> {
        if mv.is_empty() {
            return Err(PositionError::EmptyMove);
        }
        let mut scratch = *self;
        let played = if mv.is_opening() {
            scratch.apply_placements(mv.steps())?;
            mv.steps().to_vec()
        } else {
            let mut steps = scratch.pair_steps(mv.steps())?;
            for (i, step) in steps.iter().enumerate() {
                scratch.play_checked(step)?;
                if scratch.step_count() == 0 && i + 1 < steps.len() {
                    return Err(illegal(&steps[i + 1], "the turn is already over"));
                }
            }
            if scratch.step_count() > 0 {
                let pass = Step::Pass(scratch.side_to_move());
                scratch.commit_step(&pass);
                steps.push(pass);
            }
            steps
        };
        *self = scratch;
        Ok(played)
    }

    fn apply_placements(&mut self, steps: &[Step]) -> Result<(), PositionError> {
        if !self.is_setup_phase() {
            return Err(illegal(&steps[0], "placements are only legal during setup"));
        }
        let side = self.side_to_move();
        for (i, step) in steps.iter().enumerate() {
            let Step::Place {
                square,
                piece,
                player,
            } = *step
            else {
                return Err(illegal(step, "opening moves only place pieces"));
            };
            let free = home_ranks(side) & self.empty() & bit(square) != 0;
            if player != side || !free || self.reserve(side)[piece.index()] == 0 {
                return Err(illegal(step, "not a free home square or piece in reserve"));
            }
            if self.commit_step(step) {
                if let Some(extra) = steps.get(i + 1) {
                    return Err(illegal(extra, "the turn is already over"));
                }
                return Ok(());
            }
        }
        self.finish_turn(false);
        Ok(())
    }

    fn play_checked(&mut self, step: &Step) -> Result<(), PositionError> {
        if self.is_game_over() {
            return Err(illegal(step, "the game is over"));
        }
        let legal = self.legal_steps(self.side_to_move());
        let allowed = match step {
            Step::NoStep(_) => legal.is_empty(),
            _ => legal.contains(step),
        };
        if !allowed {
            return Err(illegal(step, "not legal in this position"));
        }
        if matches!(step, Step::NoStep(_)) {
            self.mark_immobilized();
        }
        self.commit_step(step);
        Ok(())
    }

    /// Group single-piece tokens into the steps they form: an enemy
    /// relocation followed by the mover filling its square is a push, a
    /// mover followed by an enemy filling the vacated square is a pull.
    /// Steps that are already whole pass through.
    fn pair_steps(&self, tokens: &[Step]) -> Result<Vec<Step>, PositionError> {
        let side = self.side_to_move();
        let mut steps = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let m = match tokens[i] {
                Step::Single(m) => m,
                Step::Place { .. } => {
                    return Err(illegal(&tokens[i], "placement outside the opening"));
                }
                other => {
                    steps.push(other);
                    i += 1;
                    continue;
                }
            };
            let next = match tokens.get(i + 1) {
                Some(Step::Single(n)) => Some(*n),
                _ => None,
            };

            if m.player != side {
                match next {
                    Some(mover) if mover.player == side && mover.to == m.from => {
                        steps.push(Step::Push { mover, victim: m });
                        i += 2;
                    }
                    _ => return Err(illegal(&tokens[i], "enemy piece moved without a push")),
                }
            } else {
                match next {
                    Some(victim) if is_pull_victim(&m, &victim) => {
                        steps.push(Step::Pull { mover: m, victim });
                        i += 2;
                    }
                    _ => {
                        steps.push(tokens[i]);
                        i += 1;
                    }
                }
            }
        }
        Ok(steps)
    }
}

fn is_pull_victim(mover: &PieceMove, candidate: &PieceMove) -> bool {
    candidate.player != mover.player && candidate.to == mover.from
}

fn illegal(step: &Step, reason: &str) -> PositionError {
    PositionError::IllegalStep {
        step: step.to_string(),
        reason: reason.to_string(),
    }
}

//! Position repetition history and the repetition filter on candidate steps.

use std::collections::{HashMap, VecDeque};

use crate::piece::Player;
use crate::position::Position;
use crate::step::Step;

/// Bounded history of `(signature, side to move)` pairs reached at turn
/// boundaries. The oldest entries are forgotten once the capacity is hit.
#[derive(Debug, Clone)]
pub struct RepetitionTracker {
    history: VecDeque<(u64, Player)>,
    counts: HashMap<(u64, Player), u32>,
    capacity: usize,
}

impl Default for RepetitionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RepetitionTracker {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            counts: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, signature: u64, to_move: Player) {
        if self.history.len() == self.capacity {
            if let Some(old) = self.history.pop_front() {
                if let Some(n) = self.counts.get_mut(&old) {
                    *n -= 1;
                    if *n == 0 {
                        self.counts.remove(&old);
                    }
                }
            }
        }
        self.history.push_back((signature, to_move));
        *self.counts.entry((signature, to_move)).or_insert(0) += 1;
    }

    /// Record the turn boundary `position` is sitting on.
    pub fn record_position(&mut self, position: &Position) {
        self.record(position.signature(), position.side_to_move());
    }

    pub fn occurrences(&self, signature: u64, to_move: Player) -> u32 {
        self.counts.get(&(signature, to_move)).copied().unwrap_or(0)
    }

    /// Reaching this pair again would be its third occurrence.
    pub fn is_third_repetition(&self, signature: u64, to_move: Player) -> bool {
        self.occurrences(signature, to_move) >= 2
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.counts.clear();
    }
}

impl Position {
    /// Drop candidate steps that undo the turn so far, or that end the turn
    /// on a third repetition for the opponent.
    ///
    /// Both checks run independently on scratch copies. If nothing
    /// survives, the pass is kept when it was a candidate; otherwise the
    /// list is left as it was.
    pub fn filter_repetitions(&self, steps: &mut Vec<Step>, tracker: &RepetitionTracker) {
        let keep: Vec<bool> = steps
            .iter()
            .map(|step| self.is_repetition_safe(step, tracker))
            .collect();

        if keep.iter().any(|&k| k) {
            let mut flags = keep.into_iter();
            steps.retain(|_| flags.next().unwrap_or(true));
        } else if let Some(pass) = steps.iter().copied().find(Step::is_pass) {
            steps.clear();
            steps.push(pass);
        }
    }

    /// Whether `step` is neither a virtual pass nor a turn-ending third
    /// repetition.
    pub fn is_repetition_safe(&self, step: &Step, tracker: &RepetitionTracker) -> bool {
        if !step.moves_piece() && !step.is_pass() {
            return true;
        }
        let after = self.signature_after(step);
        if after == self.pre_turn_signature() {
            return false;
        }
        !(self.ends_turn(step)
            && tracker.is_third_repetition(after, self.side_to_move().opponent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    #[test]
    fn test_tracker_counts() {
        let mut tracker = RepetitionTracker::new();
        tracker.record(42, Player::Gold);
        assert!(!tracker.is_third_repetition(42, Player::Gold));
        tracker.record(42, Player::Gold);
        assert!(tracker.is_third_repetition(42, Player::Gold));
        assert!(!tracker.is_third_repetition(42, Player::Silver));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_tracker_forgets_oldest() {
        let mut tracker = RepetitionTracker::with_capacity(2);
        tracker.record(1, Player::Gold);
        tracker.record(1, Player::Gold);
        tracker.record(2, Player::Gold);
        assert_eq!(tracker.occurrences(1, Player::Gold), 1);
        tracker.record(3, Player::Gold);
        assert_eq!(tracker.occurrences(1, Player::Gold), 0);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_virtual_pass_removed() {
        let mut pos = Position::standard();
        pos.commit_step(&Step::single(Player::Gold, Piece::Elephant, 12, 20));
        let mut steps = pos.legal_steps(Player::Gold);
        let back = Step::single(Player::Gold, Piece::Elephant, 20, 12);
        assert!(steps.contains(&back));

        pos.filter_repetitions(&mut steps, &RepetitionTracker::new());
        assert!(!steps.contains(&back));
        assert!(steps.iter().any(Step::is_pass));
    }

    #[test]
    fn test_third_repetition_removed_only_when_turn_ends() {
        let mut pos = Position::standard();
        let step = Step::single(Player::Gold, Piece::Elephant, 12, 20);
        pos.commit_step(&step);
        let pass = Step::Pass(Player::Gold);

        let mut tracker = RepetitionTracker::new();
        tracker.record(pos.signature(), Player::Silver);
        tracker.record(pos.signature(), Player::Silver);

        let mut steps = pos.legal_steps(Player::Gold);
        let before = steps.len();
        pos.filter_repetitions(&mut steps, &tracker);
        assert!(!steps.contains(&pass));
        // the step back is a virtual pass; everything else survives
        assert_eq!(steps.len(), before - 2);
    }

    #[test]
    fn test_pass_kept_when_nothing_else_survives() {
        let mut pos = Position::new();
        pos.place_piece(0, Player::Gold, Piece::Rabbit);
        pos.place_piece(1, Player::Gold, Piece::Rabbit);
        pos.place_piece(63, Player::Silver, Piece::Rabbit);
        pos.set_move_count(2);
        // every turn-ending candidate leads to an already twice-seen position
        let mut scratch = pos;
        scratch.add_steps_used(3);
        let mut tracker = RepetitionTracker::new();
        let steps = scratch.legal_steps(Player::Gold);
        for step in &steps {
            let sig = scratch.signature_after(step);
            tracker.record(sig, Player::Silver);
            tracker.record(sig, Player::Silver);
        }
        let mut filtered = steps.clone();
        scratch.filter_repetitions(&mut filtered, &tracker);
        assert_eq!(filtered, vec![Step::Pass(Player::Gold)]);
    }
}

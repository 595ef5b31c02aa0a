//! UCT search implementation.
//!
//! One playout:
//! 1. Selection: descend by UCB1, committing each step on a scratch copy
//! 2. Expansion: a mature leaf gets one child per filtered legal step
//! 3. Rollout: an immature leaf is played out at random
//! 4. Backpropagation: the sample is folded into every node on the path
//!
//! A step that ends the game backpropagates its result directly. A mature
//! leaf whose steps were all filtered away is removed from the tree.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use games_arimaa::{render_move, Player, Position, PositionError, RepetitionTracker, Step};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::UctConfig;
use crate::evaluator::Evaluator;
use crate::node::NodeId;
use crate::playout::{Playout, PlayoutStatus};
use crate::time::{TimeError, TimeManager};
use crate::tree::UctTree;
use crate::tt::TranspositionTable;

/// Errors that can occur during UCT search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Position(#[from] PositionError),
}

/// Cooperative stop flag shared between a running search and its owner.
///
/// The search checks it between playouts only.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Counters for one search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub playouts: u64,
    /// Playouts that ended without backpropagating anything.
    pub discarded: u64,
    pub elapsed: Duration,
    /// Live nodes in the tree, the root included.
    pub nodes: usize,
    /// Nodes that were given children.
    pub expanded: u64,
    /// Candidate steps dropped because the transposition table already
    /// held their position.
    pub pruned: u64,
}

impl SearchStats {
    pub fn playouts_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.playouts as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "UCT:")?;
        writeln!(f, "  {} playouts", self.playouts)?;
        writeln!(f, "  {:.3} seconds", self.elapsed.as_secs_f64())?;
        writeln!(f, "  {:.0} playouts per second", self.playouts_per_second())?;
        writeln!(f, "  {} nodes in the tree", self.nodes)?;
        writeln!(f, "  {} nodes expanded", self.expanded)?;
        writeln!(f, "  {} nodes pruned", self.pruned)?;
        write!(f, "  {} playouts discarded", self.discarded)
    }
}

/// A complete move chosen for the side to move.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMove {
    /// Steps in play order, ending with a pass if the turn was cut short.
    pub steps: Vec<Step>,
    /// Space-separated tokens with trap kills interleaved.
    pub notation: String,
    /// Signature of the position after the move.
    pub signature: u64,
    /// Side to move after the move.
    pub side_to_move: Player,
    /// Visits of the first step's node; 0 when the move was not searched.
    pub visits: u32,
    /// Gold's mean outcome through the first step.
    pub value: f32,
}

impl BestMove {
    /// Build from steps played out on a scratch copy of `position`.
    pub fn from_steps(position: &Position, steps: Vec<Step>) -> Self {
        let mut after = *position;
        for step in &steps {
            after.commit_step(step);
        }
        Self {
            notation: render_move(position, &steps),
            signature: after.signature(),
            side_to_move: after.side_to_move(),
            steps,
            visits: 0,
            value: 0.0,
        }
    }
}

/// UCT search state.
pub struct UctSearch<'a, E: Evaluator + ?Sized> {
    position: &'a Position,
    repetitions: &'a RepetitionTracker,
    evaluator: &'a E,
    config: UctConfig,
    tree: UctTree,
    tt: TranspositionTable,
    stop: StopHandle,
    stats: SearchStats,
}

impl<'a, E: Evaluator + ?Sized> UctSearch<'a, E> {
    /// Create a search for the side to move in `position` and expand the
    /// root.
    pub fn new(
        position: &'a Position,
        repetitions: &'a RepetitionTracker,
        evaluator: &'a E,
        config: UctConfig,
    ) -> Result<Self, SearchError> {
        if position.is_game_over() {
            return Err(SearchError::InvalidState("game is already over".into()));
        }
        if position.is_setup_phase() {
            return Err(SearchError::InvalidState(
                "setup phase is not searched".into(),
            ));
        }

        let mut search = Self {
            position,
            repetitions,
            evaluator,
            config,
            tree: UctTree::new(position.side_to_move()),
            tt: TranspositionTable::new(),
            stop: StopHandle::new(),
            stats: SearchStats::default(),
        };

        let root = search.tree.root();
        let steps = search.candidate_steps(position);
        if steps.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        search.expand(root, position, &steps);
        Ok(search)
    }

    /// Share an existing stop flag instead of the search's own.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn tree(&self) -> &UctTree {
        &self.tree
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            nodes: self.tree.len(),
            ..self.stats.clone()
        }
    }

    /// Run exactly `n` playouts, ignoring the clock and the stop flag.
    pub fn run_playouts<R: Rng + ?Sized>(&mut self, n: u64, rng: &mut R) {
        let start = Instant::now();
        for _ in 0..n {
            self.playout(rng);
        }
        self.stats.elapsed += start.elapsed();
    }

    /// Run playouts until the clock runs out or a stop is requested. At
    /// least one playout is always run.
    pub fn run_until_budget_or_stop<R: Rng + ?Sized>(
        &mut self,
        time: &mut TimeManager,
        rng: &mut R,
    ) {
        time.start_clock();
        loop {
            self.playout(rng);
            if time.time_up() || self.stop.is_stop_requested() {
                break;
            }
        }
        self.stats.elapsed += time.elapsed();

        let stats = self.stats();
        debug!(
            playouts = stats.playouts,
            nodes = stats.nodes,
            expanded = stats.expanded,
            pruned = stats.pruned,
            discarded = stats.discarded,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            stopped = self.stop.is_stop_requested(),
            "search finished"
        );
    }

    /// Legal steps for the side to move with repetitions and known
    /// positions filtered out.
    fn candidate_steps(&mut self, board: &Position) -> Vec<Step> {
        let mut steps = board.legal_steps(board.side_to_move());
        board.filter_repetitions(&mut steps, self.repetitions);

        let before = steps.len();
        steps.retain(|step| {
            !self
                .tt
                .contains(board.signature_after(step), board.player_after_step(step))
        });
        self.stats.pruned += (before - steps.len()) as u64;
        steps
    }

    fn expand(&mut self, node: NodeId, board: &Position, steps: &[Step]) {
        let children = self.tree.expand(node, steps);
        for (step, &child) in steps.iter().zip(&children) {
            self.tt.insert(
                board.signature_after(step),
                board.player_after_step(step),
                child,
            );
        }
        self.stats.expanded += 1;
        trace!(node = node.0, children = children.len(), "expanded");
    }

    /// One descent from the root on a fresh copy of the position.
    pub fn playout<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.stats.playouts += 1;
        let mut board = *self.position;
        let mut node = self.tree.root();
        let mut path = vec![node];

        loop {
            if !self.tree.get(node).has_children() {
                if !self.tree.get(node).is_mature(self.config.mature_level) {
                    self.rollout(&mut board, &path, rng);
                    return;
                }

                if board.step_count() == 0 && board.legal_steps(board.side_to_move()).is_empty() {
                    board.mark_immobilized();
                    self.backpropagate_winner(&board, &path);
                    return;
                }

                let steps = self.candidate_steps(&board);
                if steps.is_empty() {
                    let freed = self.tree.remove_node_cascade(node);
                    trace!(node = node.0, freed, "no steps left, node removed");
                    self.stats.discarded += 1;
                    return;
                }
                self.expand(node, &board, &steps);
                continue;
            }

            let Some(child) = self.tree.select_child(node, self.config.explore_rate) else {
                self.stats.discarded += 1;
                return;
            };
            path.push(child);
            node = child;

            let step = self.tree.get(child).step;
            if board.commit_step(&step) && board.is_game_over() {
                self.backpropagate_winner(&board, &path);
                return;
            }
        }
    }

    fn rollout<R: Rng + ?Sized>(&mut self, board: &mut Position, path: &[NodeId], rng: &mut R) {
        let status = Playout::new(board, self.evaluator, &self.config).run(rng);
        if status == PlayoutStatus::TooLong && self.config.ignore_long_playouts {
            self.stats.discarded += 1;
            return;
        }
        let sample = self.decide_sample(board, rng);
        self.tree.backpropagate(path, sample);
    }

    fn backpropagate_winner(&mut self, board: &Position, path: &[NodeId]) {
        let sample = match board.winner() {
            Some(Player::Gold) => 1.0,
            Some(Player::Silver) => -1.0,
            None => 0.0,
        };
        self.tree.backpropagate(path, sample);
    }

    /// +1 for a gold win, -1 for silver. Without a winner, a coin biased by
    /// the evaluator's estimate decides.
    fn decide_sample<R: Rng + ?Sized>(&self, board: &Position, rng: &mut R) -> f32 {
        match board.winner() {
            Some(Player::Gold) => 1.0,
            Some(Player::Silver) => -1.0,
            None => {
                let gold = self.evaluator.score_position(board);
                if rng.gen::<f32>() < gold {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// Follow the most visited children through the side to move's turn.
    ///
    /// The walk stops at an unvisited child. A turn cut short that way is
    /// finished with a pass, unless passing would repeat the pre-turn
    /// position or hand the opponent a third repetition; then the turn is
    /// extended with repetition-safe steps, tree children first, until a
    /// pass is allowed or the turn ends.
    pub fn best_move(&self) -> Result<BestMove, SearchError> {
        let to_move = self.position.side_to_move();
        let mut board = *self.position;
        let mut steps = Vec::with_capacity(4);
        let mut node = self.tree.root();
        let mut first = None;
        let mut turn_over = false;

        while let Some(child) = self.tree.most_visited_child(node) {
            let child_node = self.tree.get(child);
            if child_node.visits == 0 || child_node.step.player() != to_move {
                break;
            }
            first.get_or_insert(child);
            steps.push(child_node.step);
            node = child;
            if board.commit_step(&child_node.step) {
                turn_over = true;
                break;
            }
        }

        let first = first.ok_or_else(|| SearchError::InvalidState("root has no visits".into()))?;
        let pass = Step::Pass(to_move);
        let mut in_tree = true;
        while !turn_over {
            if board.is_repetition_safe(&pass, self.repetitions) {
                steps.push(pass);
                break;
            }
            let mut candidates = board.legal_steps(to_move);
            board.filter_repetitions(&mut candidates, self.repetitions);
            candidates.retain(|step| !step.is_pass());

            let from_tree = if in_tree {
                self.tree
                    .get(node)
                    .children
                    .iter()
                    .copied()
                    .filter(|&c| candidates.contains(&self.tree.get(c).step))
                    .max_by_key(|&c| self.tree.get(c).visits)
            } else {
                None
            };
            let step = match from_tree {
                Some(child) => {
                    node = child;
                    self.tree.get(child).step
                }
                None => {
                    in_tree = false;
                    match candidates.first() {
                        Some(&step) => step,
                        None => {
                            // every continuation repeats; the pass is forced
                            steps.push(pass);
                            break;
                        }
                    }
                }
            };
            debug!(step = %step, "pass would repeat, extending the turn");
            steps.push(step);
            turn_over = board.commit_step(&step);
        }

        let first = self.tree.get(first);
        Ok(BestMove {
            visits: first.visits,
            value: first.value,
            ..BestMove::from_steps(self.position, steps)
        })
    }
}

//! UCT (Monte Carlo tree search with UCB1) for Arimaa.
//!
//! The tree is built one step per level, so a whole turn spans up to four
//! levels before the node type flips.
//!
//! # Overview
//!
//! Each playout copies the game position and:
//!
//! 1. **Selection**: descends with UCB1, signing each child's value by the
//!    player who owns its step
//! 2. **Expansion**: gives a mature leaf one child per legal step, minus
//!    repetitions and positions already in the tree
//! 3. **Rollout**: plays an immature leaf out at random, optionally biased
//!    by the evaluator's step scores, and turns the result into a +1/-1
//!    sample
//! 4. **Backpropagation**: folds the sample into every node on the path
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use games_arimaa::{Game, Position};
//! use mcts::{Engine, MaterialEvaluator, UctConfig};
//!
//! let mut game = Game::from_position(Position::standard());
//! let mut engine = Engine::new(UctConfig::default(), Arc::new(MaterialEvaluator::new()));
//! engine.configure_time_control("tcmove", 2.0).unwrap();
//!
//! let best = engine.search(game.position(), game.repetitions()).unwrap();
//! game.play_notation(&best.notation).unwrap();
//! println!("{}", engine.last_stats().unwrap());
//! ```

mod config;
mod engine;
mod evaluator;
mod node;
mod playout;
mod search;
mod time;
mod tree;
mod tt;

pub use config::UctConfig;
pub use engine::{initial_setup, Engine, GOLD_SETUP, SILVER_SETUP};
pub use evaluator::{Evaluator, MaterialEvaluator, NeutralEvaluator};
pub use node::{NodeId, NodeType, UctNode};
pub use playout::{Playout, PlayoutStatus};
pub use search::{BestMove, SearchError, SearchStats, StopHandle, UctSearch};
pub use time::{TimeControl, TimeError, TimeManager};
pub use tree::{TreeStats, UctTree};
pub use tt::TranspositionTable;

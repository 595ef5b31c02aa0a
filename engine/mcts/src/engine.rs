//! Engine facade: owns the clock, the stop flag and the random source, and
//! picks a move for any position a session hands it.

use std::sync::Arc;

use games_arimaa::{parse_move, Player, Position, RepetitionTracker, Step};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::config::UctConfig;
use crate::evaluator::Evaluator;
use crate::search::{BestMove, SearchError, SearchStats, StopHandle, UctSearch};
use crate::time::TimeManager;

/// Fixed setup for each side.
pub const GOLD_SETUP: &str = "Ra1 Rb1 Rc1 Rd1 Re1 Rf1 Rg1 Rh1 Ha2 Db2 Cc2 Md2 Ee2 Cf2 Dg2 Hh2";
pub const SILVER_SETUP: &str = "ra8 rb8 rc8 rd8 re8 rf8 rg8 rh8 ha7 db7 cc7 ed7 me7 cf7 dg7 hh7";

pub fn initial_setup(player: Player) -> &'static str {
    match player {
        Player::Gold => GOLD_SETUP,
        Player::Silver => SILVER_SETUP,
    }
}

pub struct Engine {
    config: UctConfig,
    evaluator: Arc<dyn Evaluator>,
    time: TimeManager,
    stop: StopHandle,
    rng: ChaCha20Rng,
    last_stats: Option<SearchStats>,
}

impl Engine {
    /// A seed of 0 in `config` draws the random source from entropy.
    pub fn new(config: UctConfig, evaluator: Arc<dyn Evaluator>) -> Self {
        let rng = match config.seed {
            0 => ChaCha20Rng::from_entropy(),
            seed => ChaCha20Rng::seed_from_u64(seed),
        };
        Self {
            config,
            evaluator,
            time: TimeManager::new(),
            stop: StopHandle::new(),
            rng,
            last_stats: None,
        }
    }

    pub fn with_time_manager(mut self, time: TimeManager) -> Self {
        self.time = time;
        self
    }

    pub fn config(&self) -> &UctConfig {
        &self.config
    }

    pub fn time_manager(&self) -> &TimeManager {
        &self.time
    }

    pub fn time_manager_mut(&mut self) -> &mut TimeManager {
        &mut self.time
    }

    /// Set a time control by its textual name, e.g. `tcmove`.
    pub fn configure_time_control(&mut self, name: &str, value: f64) -> Result<(), SearchError> {
        self.time.set_by_name(name, value)?;
        Ok(())
    }

    /// A handle another thread can use to cut the current search short.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Statistics of the last call to [`Engine::search`]; `None` when that
    /// call answered without searching.
    pub fn last_stats(&self) -> Option<&SearchStats> {
        self.last_stats.as_ref()
    }

    /// Choose a move for the side to move.
    ///
    /// The setup phase is answered with the fixed setup and an available
    /// goal is played without searching. Otherwise the tree is searched
    /// until the clock or a stop request ends it. A stop requested before
    /// the call is cleared.
    pub fn search(
        &mut self,
        position: &Position,
        repetitions: &RepetitionTracker,
    ) -> Result<BestMove, SearchError> {
        self.last_stats = None;
        if position.is_game_over() {
            return Err(SearchError::InvalidState("game is already over".into()));
        }
        let to_move = position.side_to_move();

        if position.is_setup_phase() {
            let mv = parse_move(initial_setup(to_move))?;
            let mut after = *position;
            after.apply_move(&mv)?;
            return Ok(BestMove {
                steps: mv.steps().to_vec(),
                notation: initial_setup(to_move).to_string(),
                signature: after.signature(),
                side_to_move: after.side_to_move(),
                visits: 0,
                value: 0.0,
            });
        }

        let budget = 4 - u32::from(position.step_count());
        if let Some(mut steps) = position.goal_check(to_move, budget) {
            let mut scratch = *position;
            let turn_over = steps.iter().fold(false, |_, step| scratch.commit_step(step));
            if !turn_over {
                steps.push(Step::Pass(to_move));
            }
            let best = BestMove::from_steps(position, steps);
            info!(side = %to_move.side_char(), notation = %best.notation, "goal in reach");
            return Ok(best);
        }

        self.stop.reset();
        let mut search = UctSearch::new(
            position,
            repetitions,
            self.evaluator.as_ref(),
            self.config.clone(),
        )?
        .with_stop_handle(self.stop.clone());
        search.run_until_budget_or_stop(&mut self.time, &mut self.rng);

        let best = search.best_move()?;
        let stats = search.stats();
        debug!(
            side = %to_move.side_char(),
            notation = %best.notation,
            visits = best.visits,
            value = best.value,
            "best move"
        );
        self.last_stats = Some(stats);
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{MaterialEvaluator, NeutralEvaluator};
    use games_arimaa::{Game, Piece};

    fn quick_engine() -> Engine {
        let config = UctConfig::for_testing();
        Engine::new(config, Arc::new(NeutralEvaluator::new()))
            .with_time_manager(TimeManager::from_config(0.05, 0.0, 0.0, 0.0))
    }

    #[test]
    fn test_setup_phase_uses_fixed_setup() {
        let mut engine = quick_engine();
        let mut game = Game::new();

        let gold = engine.search(game.position(), game.repetitions()).unwrap();
        assert_eq!(gold.notation, GOLD_SETUP);
        assert_eq!(gold.side_to_move, Player::Silver);
        game.play_notation(&gold.notation).unwrap();

        let silver = engine.search(game.position(), game.repetitions()).unwrap();
        assert_eq!(silver.notation, SILVER_SETUP);
        game.play_notation(&silver.notation).unwrap();

        assert_eq!(game.position().signature(), Position::standard().signature());
        assert!(engine.last_stats().is_none());
    }

    #[test]
    fn test_goal_is_played_without_search() {
        let mut pos = Position::new();
        pos.place_piece(49, Player::Gold, Piece::Rabbit); // b7
        pos.place_piece(63, Player::Silver, Piece::Rabbit);
        let pos = Position::from_compact(&pos.to_compact()).unwrap();

        let mut engine = quick_engine();
        let best = engine
            .search(&pos, &RepetitionTracker::new())
            .unwrap();
        assert_eq!(best.notation, "Rb7n");
        assert_eq!(best.steps.last(), Some(&Step::Pass(Player::Gold)));
        assert!(engine.last_stats().is_none());

        let mut after = pos;
        for step in &best.steps {
            after.commit_step(step);
        }
        assert_eq!(after.winner(), Some(Player::Gold));
    }

    #[test]
    fn test_search_returns_playable_move() {
        let mut engine = Engine::new(
            UctConfig::for_testing(),
            Arc::new(MaterialEvaluator::new()),
        )
        .with_time_manager(TimeManager::from_config(0.05, 0.0, 0.0, 0.0));
        let mut game = Game::from_position(Position::standard());

        for _ in 0..2 {
            let best = engine.search(game.position(), game.repetitions()).unwrap();
            game.play_notation(&best.notation).unwrap();
            assert_eq!(game.position().signature(), best.signature);
            assert_eq!(game.position().side_to_move(), best.side_to_move);
        }
        let stats = engine.last_stats().unwrap();
        assert!(stats.playouts >= 1);
        assert!(stats.nodes > 1);
    }

    #[test]
    fn test_configure_time_control() {
        let mut engine = quick_engine();
        engine.configure_time_control("tcmove", 7.0).unwrap();
        assert_eq!(
            engine.time_manager().get(crate::time::TimeControl::Move),
            7.0
        );
        assert!(matches!(
            engine.configure_time_control("tcnothing", 1.0),
            Err(SearchError::Time(_))
        ));
    }

    #[test]
    fn test_stale_stop_request_is_cleared() {
        let mut engine = quick_engine();
        engine.request_stop();
        let pos = Position::standard();
        engine.search(&pos, &RepetitionTracker::new()).unwrap();
        assert!(engine.last_stats().unwrap().playouts >= 1);
    }
}

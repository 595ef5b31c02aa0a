//! UCT search configuration parameters.

/// Configuration for the UCT search.
#[derive(Debug, Clone)]
pub struct UctConfig {
    /// Exploration constant in the UCB1 bonus
    /// `sqrt(explore_rate * ln(parent visits) / visits)`.
    pub explore_rate: f32,

    /// A node is expanded once its visit count exceeds this level; below it
    /// the search falls back to a random playout.
    pub mature_level: u32,

    /// Playouts longer than twice this many turns are abandoned.
    pub max_playout_length: u32,

    /// Stop a playout after this many turns and let the evaluator decide.
    /// 0 disables early evaluation.
    pub eval_after_length: u32,

    /// Bias playout steps with the evaluator's step scores.
    pub knowledge_in_playout: bool,

    /// Candidates sampled per playout step when knowledge is on.
    /// 0 means "score every candidate with probability 1/2".
    pub knowledge_tournament_size: u32,

    /// Do not backpropagate playouts that were abandoned as too long.
    pub ignore_long_playouts: bool,

    /// Capacity of the repetition history kept by a game session.
    pub repetition_history: usize,

    /// RNG seed for searches. 0 seeds from entropy.
    pub seed: u64,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            explore_rate: 0.2,
            mature_level: 20,
            max_playout_length: 100,
            eval_after_length: 8,
            knowledge_in_playout: true,
            knowledge_tournament_size: 3,
            ignore_long_playouts: false,
            repetition_history: 1024,
            seed: 0,
        }
    }
}

impl UctConfig {
    /// Short playouts without knowledge and a fixed seed.
    pub fn for_testing() -> Self {
        Self {
            mature_level: 5,
            max_playout_length: 20,
            eval_after_length: 4,
            knowledge_in_playout: false,
            seed: 42,
            ..Self::default()
        }
    }

    pub fn with_explore_rate(mut self, rate: f32) -> Self {
        self.explore_rate = rate;
        self
    }

    pub fn with_mature_level(mut self, level: u32) -> Self {
        self.mature_level = level;
        self
    }

    pub fn with_playout_lengths(mut self, max: u32, eval_after: u32) -> Self {
        self.max_playout_length = max;
        self.eval_after_length = eval_after;
        self
    }

    pub fn with_knowledge(mut self, enabled: bool, tournament_size: u32) -> Self {
        self.knowledge_in_playout = enabled;
        self.knowledge_tournament_size = tournament_size;
        self
    }

    pub fn with_ignore_long_playouts(mut self, ignore: bool) -> Self {
        self.ignore_long_playouts = ignore;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations to run per `get_action_prob` call.
    pub num_simulations: u32,

    /// Exploration weight in the selection bound
    /// `Q[a] + alpha * sqrt(sum N) / (1 + N[a])`.
    /// Higher values spread visits more evenly across actions.
    pub alpha: f32,

    /// Temperature for the root distribution.
    /// 1.0 = proportional to visit counts
    /// 0.0 = one-hot on the most-visited action
    pub temperature: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 25,
            alpha: 0.1,
            temperature: 1.0,
        }
    }
}

impl MctsConfig {
    /// Create config for self-play (visit-proportional distribution).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Create config for evaluation/inference (greedy selection).
    pub fn for_evaluation() -> Self {
        Self {
            num_simulations: 100,
            alpha: 0.1,
            temperature: 0.0,
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            alpha: 1.0,
            temperature: 0.0,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set the exploration weight.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    /// Whether the temperature selects the argmax instead of sampling.
    #[inline]
    pub fn is_greedy(&self) -> bool {
        self.temperature < 1e-6
    }
}

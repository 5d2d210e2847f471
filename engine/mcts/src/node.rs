//! Per-state search statistics.
//!
//! Every visited state owns one `NodeStats` holding, per action, the visit
//! count `N`, the running-mean backed-up value `Q` and the prior `P` the
//! predictor returned when the state was first expanded.

/// Visit/value statistics for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStats {
    /// Visit count per action.
    pub n: Vec<u32>,

    /// Mean backed-up value per action, from the mover's perspective.
    pub q: Vec<f32>,

    /// Prior from the predictor. Stored for inspection; selection does not
    /// weight the exploration term by it.
    pub p: Vec<f32>,
}

impl NodeStats {
    /// Fresh statistics: every `N` and `Q` starts at zero.
    pub fn new(prior: Vec<f32>) -> Self {
        let size = prior.len();
        Self {
            n: vec![0; size],
            q: vec![0.0; size],
            p: prior,
        }
    }

    /// Number of actions tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.n.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }

    /// Sum of visit counts over all actions.
    #[inline]
    pub fn total_visits(&self) -> u32 {
        self.n.iter().sum()
    }

    /// Selection bound `Q[a] + alpha * sqrt(sum N) / (1 + N[a])`.
    ///
    /// Takes a pre-computed `sqrt(sum N)` so a scan over actions computes it
    /// once.
    #[inline]
    pub fn ucb_score(&self, action: usize, total_visits_sqrt: f32, alpha: f32) -> f32 {
        self.q[action] + alpha * total_visits_sqrt / (1.0 + self.n[action] as f32)
    }

    /// Fold one backed-up value into the running mean for `action`.
    #[inline]
    pub fn update(&mut self, action: usize, value: f32) {
        let visits = self.n[action] as f32;
        self.q[action] = (self.q[action] * visits + value) / (visits + 1.0);
        self.n[action] += 1;
    }

    /// Most visited action, first one on ties. `None` if nothing was visited.
    pub fn most_visited(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (action, &visits) in self.n.iter().enumerate() {
            if visits > 0 && best.map_or(true, |(_, b)| visits > b) {
                best = Some((action, visits));
            }
        }
        best.map(|(action, _)| action)
    }
}

//! Statistics table keyed by state identity.
//!
//! Positions reached through different move orders share one entry, so the
//! search graph is a DAG rather than a tree. Entries are created on first
//! visit, updated by backup and only dropped by `clear`.

use std::collections::HashMap;

use engine_core::StateKey;

use crate::node::NodeStats;

/// Map from state identity to its search statistics.
#[derive(Debug, Default, Clone)]
pub struct StatsTable {
    nodes: HashMap<StateKey, NodeStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &StateKey) -> Option<&NodeStats> {
        self.nodes.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &StateKey) -> Option<&mut NodeStats> {
        self.nodes.get_mut(key)
    }

    #[inline]
    pub fn contains(&self, key: &StateKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Store statistics for a newly expanded state. An existing entry is
    /// kept and `false` is returned.
    pub fn insert(&mut self, key: StateKey, stats: NodeStats) -> bool {
        match self.nodes.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(stats);
                true
            }
        }
    }

    /// Number of expanded states.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Visit distribution at `key` over the full action space.
    ///
    /// `prob[a]` is proportional to `N[a]^(1/temperature)` over the `legal`
    /// actions. A temperature below `1e-6` puts all mass on the most visited
    /// legal action (first in `legal` order on ties). When no legal action has
    /// been visited the mass is spread uniformly over `legal`.
    ///
    /// Returns `None` if `key` was never expanded or `legal` is empty.
    pub fn visit_policy(
        &self,
        key: &StateKey,
        legal: &[usize],
        action_size: usize,
        temperature: f32,
    ) -> Option<Vec<f32>> {
        let node = self.get(key)?;
        if legal.is_empty() {
            return None;
        }

        let mut policy = vec![0.0; action_size];
        let max_visits = legal.iter().map(|&a| node.n[a]).max().unwrap_or(0);

        if max_visits == 0 {
            let prob = 1.0 / legal.len() as f32;
            for &a in legal {
                policy[a] = prob;
            }
            return Some(policy);
        }

        if temperature < 1e-6 {
            // Only legal actions are ever visited
            if let Some(best) = node.most_visited() {
                policy[best] = 1.0;
            }
            return Some(policy);
        }

        // Scale by the max count before exponentiating so small temperatures
        // cannot overflow.
        let exponent = 1.0 / temperature as f64;
        let weights: Vec<f64> = legal
            .iter()
            .map(|&a| (node.n[a] as f64 / max_visits as f64).powf(exponent))
            .collect();
        let total: f64 = weights.iter().sum();
        for (&a, w) in legal.iter().zip(weights) {
            policy[a] = (w / total) as f32;
        }

        Some(policy)
    }

    /// Get statistics about the table for debugging.
    pub fn stats(&self) -> TableStats {
        let visits = self.nodes.values().map(NodeStats::total_visits);
        TableStats {
            states: self.nodes.len(),
            total_visits: visits.clone().map(u64::from).sum(),
            max_state_visits: visits.max().unwrap_or(0),
        }
    }
}

/// Statistics about a stats table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    pub states: usize,
    pub total_visits: u64,
    pub max_state_visits: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{Board, Player};

    fn key(cells: Vec<i8>) -> StateKey {
        StateKey::new(&Board::from_cells(1, cells.len(), cells).unwrap(), Player::One)
    }

    fn table_with_visits(visits: Vec<u32>) -> (StatsTable, StateKey) {
        let mut table = StatsTable::new();
        let k = key(vec![0; visits.len()]);
        let mut stats = NodeStats::new(vec![0.0; visits.len()]);
        stats.n = visits;
        table.insert(k.clone(), stats);
        (table, k)
    }

    #[test]
    fn test_insert_keeps_existing_entry() {
        let mut table = StatsTable::new();
        let k = key(vec![0, 0]);

        assert!(table.insert(k.clone(), NodeStats::new(vec![0.5, 0.5])));
        table.get_mut(&k).unwrap().update(0, 1.0);
        assert!(!table.insert(k.clone(), NodeStats::new(vec![0.5, 0.5])));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&k).unwrap().n[0], 1);
    }

    #[test]
    fn test_clear() {
        let (mut table, k) = table_with_visits(vec![1, 2]);
        assert!(table.contains(&k));
        table.clear();
        assert!(table.is_empty());
        assert!(table.get(&k).is_none());
    }

    #[test]
    fn test_visit_policy_proportional() {
        let (table, k) = table_with_visits(vec![30, 70, 0]);

        let policy = table.visit_policy(&k, &[0, 1, 2], 3, 1.0).unwrap();
        assert!((policy[0] - 0.3).abs() < 1e-6);
        assert!((policy[1] - 0.7).abs() < 1e-6);
        assert!(policy[2].abs() < 1e-6);
    }

    #[test]
    fn test_visit_policy_sharpened() {
        let (table, k) = table_with_visits(vec![10, 20]);

        // tau = 0.5 squares the counts: 100 : 400
        let policy = table.visit_policy(&k, &[0, 1], 2, 0.5).unwrap();
        assert!((policy[0] - 0.2).abs() < 1e-6);
        assert!((policy[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_visit_policy_greedy_first_max() {
        let (table, k) = table_with_visits(vec![5, 9, 9, 1]);

        let policy = table.visit_policy(&k, &[0, 1, 2, 3], 4, 0.0).unwrap();
        assert_eq!(policy, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_visit_policy_tiny_temperature_does_not_overflow() {
        let (table, k) = table_with_visits(vec![400, 399]);

        let policy = table.visit_policy(&k, &[0, 1], 2, 1e-4).unwrap();
        assert!(policy.iter().all(|p| p.is_finite()));
        let sum: f32 = policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(policy[0] > 0.99);
    }

    #[test]
    fn test_visit_policy_unvisited_is_uniform_over_legal() {
        let (table, k) = table_with_visits(vec![0, 0, 0, 0]);

        let policy = table.visit_policy(&k, &[1, 3], 4, 1.0).unwrap();
        assert_eq!(policy, vec![0.0, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_visit_policy_missing_or_no_legal() {
        let (table, k) = table_with_visits(vec![1, 1]);
        assert!(table.visit_policy(&k, &[], 2, 1.0).is_none());
        assert!(table.visit_policy(&key(vec![1, 0]), &[1], 2, 1.0).is_none());
    }

    #[test]
    fn test_table_stats() {
        let (mut table, _) = table_with_visits(vec![3, 4]);
        let mut other = NodeStats::new(vec![0.5, 0.5]);
        other.n = vec![1, 0];
        table.insert(key(vec![1, 0]), other);

        let stats = table.stats();
        assert_eq!(stats.states, 2);
        assert_eq!(stats.total_visits, 8);
        assert_eq!(stats.max_state_visits, 7);
    }
}

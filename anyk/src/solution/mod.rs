//! Solutions and the partial solutions enumerators grow them from.

use crate::cost::Cost;
use crate::graph::{DecisionId, DpGraph, NodeId};

mod prefix;
mod subtree;
mod suffix;

pub(crate) use prefix::Prefix;
pub(crate) use subtree::{SubtreeCollection, SubtreeSolution};
pub(crate) use suffix::Suffix;

/// A complete solution: one decision per stage, stage 1 first.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    cost: Cost,
    decisions: Vec<DecisionId>,
}

impl Solution {
    /// `estimate` is the cost the enumerator expects, it is checked against the exact sum of the
    /// decision costs in debug builds.
    pub(crate) fn new<P>(graph: &DpGraph<P>, decisions: Vec<DecisionId>, estimate: Cost) -> Self {
        let cost = decisions.iter().map(|d| graph[*d].cost()).sum::<Cost>();
        debug_assert!(
            cost.approx_eq(estimate),
            "solution cost {} differs from estimate {}",
            cost,
            estimate
        );
        Self { cost, decisions }
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn decisions(&self) -> &[DecisionId] {
        &self.decisions
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// The node each decision leads to, in stage order.
    pub fn nodes<'g, P>(&'g self, graph: &'g DpGraph<P>) -> impl Iterator<Item = NodeId> + 'g {
        self.decisions.iter().map(move |d| graph[*d].target())
    }

    /// Payloads of the chosen nodes in stage order. Nodes without payload are skipped.
    pub fn to_ordered_tuples<'g, P>(&self, graph: &'g DpGraph<P>) -> Vec<&'g P> {
        self.decisions
            .iter()
            .filter_map(|d| graph.payload(graph[*d].target()))
            .collect()
    }
}

use std::collections::HashMap;

use rand::rngs::StdRng;

use crate::graph::DecisionId;
use crate::strategy::{RankedDecision, SuccessorOrder, Successors};

/// Sorts the whole set up front, each decision's successor is the next one in sorted order.
pub(crate) struct EagerOrder {
    sorted: Vec<DecisionId>,
    rank: HashMap<DecisionId, usize>,
}

impl EagerOrder {
    pub fn new(mut items: Vec<RankedDecision>) -> Self {
        items.sort_unstable();
        let sorted = items.into_iter().map(|item| item.id).collect::<Vec<_>>();
        let rank = sorted
            .iter()
            .enumerate()
            .map(|(rank, id)| (*id, rank))
            .collect();
        Self { sorted, rank }
    }
}

impl SuccessorOrder for EagerOrder {
    fn best(&self) -> Option<DecisionId> {
        self.sorted.first().copied()
    }

    fn successors_of(&mut self, decision: DecisionId, _rng: &mut StdRng) -> Successors {
        self.rank
            .get(&decision)
            .and_then(|rank| self.sorted.get(rank + 1))
            .copied()
            .into_iter()
            .collect()
    }
}

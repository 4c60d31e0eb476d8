use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rand::rngs::StdRng;

use crate::graph::DecisionId;
use crate::strategy::{RankedDecision, SuccessorOrder, Successors};

/// Heapifies the set and pops one more decision per request.
///
/// Requests must come in ranked order, which Lawler partitioning guarantees: the successor of a
/// decision is only asked for after that decision itself was handed out.
pub(crate) struct LazyOrder {
    heap: BinaryHeap<Reverse<RankedDecision>>,
    best: Option<DecisionId>,
}

impl LazyOrder {
    pub fn new(items: Vec<RankedDecision>) -> Self {
        let mut heap = items.into_iter().map(Reverse).collect::<BinaryHeap<_>>();
        let best = heap.pop().map(|Reverse(item)| item.id);
        Self { heap, best }
    }
}

impl SuccessorOrder for LazyOrder {
    fn best(&self) -> Option<DecisionId> {
        self.best
    }

    fn successors_of(&mut self, _decision: DecisionId, _rng: &mut StdRng) -> Successors {
        self.heap
            .pop()
            .map(|Reverse(item)| item.id)
            .into_iter()
            .collect()
    }
}

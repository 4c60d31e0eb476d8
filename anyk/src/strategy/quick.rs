use rand::rngs::StdRng;
use rand::Rng;

use crate::graph::DecisionId;
use crate::strategy::{RankedDecision, SuccessorOrder, Successors};

/// Incremental quicksort: each request extracts the next smallest decision, partitioning only
/// as much of the set as needed.
pub(crate) struct QuickOrder {
    items: Vec<RankedDecision>,
    /// Pivot positions still to be refined, the bottom one is always `items.len()`.
    pivots: Vec<usize>,
    next_idx: usize,
    best: Option<DecisionId>,
}

impl QuickOrder {
    pub fn new(items: Vec<RankedDecision>, rng: &mut StdRng) -> Self {
        let len = items.len();
        let mut order = Self {
            items,
            pivots: vec![len],
            next_idx: 0,
            best: None,
        };
        order.best = order.next_smallest(rng);
        order
    }

    fn next_smallest(&mut self, rng: &mut StdRng) -> Option<DecisionId> {
        if self.next_idx >= self.items.len() {
            return None;
        }
        loop {
            let top = *self.pivots.last()?;
            if top == self.next_idx {
                break;
            }
            let pivot = rng.random_range(self.next_idx..top);
            let placed = partition(&mut self.items, pivot, self.next_idx, top - 1);
            self.pivots.push(placed);
        }
        self.pivots.pop();
        let next = self.items[self.next_idx].id;
        self.next_idx += 1;
        Some(next)
    }
}

/// Lomuto partition of `items[low..=high]` around `items[pivot]`. Returns where the pivot ends
/// up.
fn partition(items: &mut [RankedDecision], pivot: usize, low: usize, high: usize) -> usize {
    items.swap(pivot, high);
    let pivot_value = items[high];
    let mut store = low;
    for i in low..high {
        if items[i] <= pivot_value {
            items.swap(i, store);
            store += 1;
        }
    }
    items.swap(store, high);
    store
}

impl SuccessorOrder for QuickOrder {
    fn best(&self) -> Option<DecisionId> {
        self.best
    }

    fn successors_of(&mut self, _decision: DecisionId, rng: &mut StdRng) -> Successors {
        self.next_smallest(rng).into_iter().collect()
    }
}

use std::collections::HashMap;

use rand::rngs::StdRng;

use crate::graph::DecisionId;
use crate::strategy::{RankedDecision, SuccessorOrder, Successors};

/// Arranges the set as a binary min-heap, the successors of a decision are its heap children.
pub(crate) struct Take2Order {
    best: Option<DecisionId>,
    children: HashMap<DecisionId, Successors>,
}

impl Take2Order {
    pub fn new(mut items: Vec<RankedDecision>) -> Self {
        heapify(&mut items);
        let mut children: HashMap<DecisionId, Successors> = HashMap::new();
        for i in 1..items.len() {
            children
                .entry(items[(i - 1) / 2].id)
                .or_default()
                .push(items[i].id);
        }
        Self {
            best: items.first().map(|item| item.id),
            children,
        }
    }
}

fn heapify(items: &mut [RankedDecision]) {
    for i in (0..items.len() / 2).rev() {
        sift_down(items, i);
    }
}

fn sift_down(items: &mut [RankedDecision], mut i: usize) {
    loop {
        let left = 2 * i + 1;
        let right = left + 1;
        let mut smallest = i;
        if left < items.len() && items[left] < items[smallest] {
            smallest = left;
        }
        if right < items.len() && items[right] < items[smallest] {
            smallest = right;
        }
        if smallest == i {
            return;
        }
        items.swap(i, smallest);
        i = smallest;
    }
}

impl SuccessorOrder for Take2Order {
    fn best(&self) -> Option<DecisionId> {
        self.best
    }

    fn successors_of(&mut self, decision: DecisionId, _rng: &mut StdRng) -> Successors {
        self.children.remove(&decision).unwrap_or_default()
    }
}

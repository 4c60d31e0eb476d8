use rand::rngs::StdRng;

use crate::graph::DecisionId;
use crate::strategy::{RankedDecision, SuccessorOrder, Successors};

/// The best decision has every other decision as successor, all others have none.
pub(crate) struct AllOrder {
    best: Option<DecisionId>,
    rest: Successors,
}

impl AllOrder {
    pub fn new(items: Vec<RankedDecision>) -> Self {
        let best = items.iter().min().map(|item| item.id);
        let rest = items
            .into_iter()
            .map(|item| item.id)
            .filter(|id| Some(*id) != best)
            .collect();
        Self { best, rest }
    }
}

impl SuccessorOrder for AllOrder {
    fn best(&self) -> Option<DecisionId> {
        self.best
    }

    fn successors_of(&mut self, decision: DecisionId, _rng: &mut StdRng) -> Successors {
        if Some(decision) == self.best {
            std::mem::take(&mut self.rest)
        } else {
            Successors::new()
        }
    }
}

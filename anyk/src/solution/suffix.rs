use std::rc::Rc;

use crate::cost::Cost;
use crate::graph::{DecisionId, DpGraph};

/// The tail of a solution, from some stage to the last one.
#[derive(Debug)]
pub(crate) struct Suffix {
    decision: DecisionId,
    rest: Option<Rc<Suffix>>,
    cost: Cost,
}

impl Suffix {
    pub fn last<P>(graph: &DpGraph<P>, decision: DecisionId) -> Rc<Self> {
        Rc::new(Self {
            decision,
            rest: None,
            cost: graph[decision].cost(),
        })
    }

    /// Puts `decision` in front of this suffix.
    pub fn prepend<P>(self: &Rc<Self>, graph: &DpGraph<P>, decision: DecisionId) -> Rc<Self> {
        Rc::new(Self {
            decision,
            rest: Some(self.clone()),
            cost: graph[decision].cost() + self.cost,
        })
    }

    pub fn decision(&self) -> DecisionId {
        self.decision
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Decisions in stage order.
    pub fn decisions(&self) -> impl Iterator<Item = DecisionId> + '_ {
        std::iter::successors(Some(self), |s| s.rest.as_deref()).map(|s| s.decision)
    }
}

use std::rc::Rc;

use crate::cost::Cost;
use crate::graph::{DecisionId, DpGraph, NodeId};

/// A partial solution covering stages `1..=len`, stored as a persistent list so that prefixes
/// sharing their first stages share memory.
#[derive(Debug)]
pub(crate) struct Prefix {
    decision: DecisionId,
    shorter: Option<Rc<Prefix>>,
    len: usize,
    /// Sum of the decision costs.
    cost: Cost,
    /// Cost of the best full solution that starts with this prefix.
    future: Cost,
}

impl Prefix {
    pub fn first<P>(graph: &DpGraph<P>, decision: DecisionId) -> Rc<Self> {
        let cost = graph[decision].cost();
        Rc::new(Self {
            decision,
            shorter: None,
            len: 1,
            cost,
            future: graph.achievable_cost(decision),
        })
    }

    /// Appends a decision. The best reachable cost is carried over unchanged, which is exact
    /// when `decision` is the best of its set.
    pub fn extend<P>(self: &Rc<Self>, graph: &DpGraph<P>, decision: DecisionId) -> Rc<Self> {
        Rc::new(Self {
            decision,
            shorter: Some(self.clone()),
            len: self.len + 1,
            cost: self.cost + graph[decision].cost(),
            future: self.future,
        })
    }

    /// Same prefix with the last decision replaced by `alternative` from the same set.
    pub fn successor<P>(&self, graph: &DpGraph<P>, alternative: DecisionId) -> Rc<Self> {
        debug_assert_eq!(graph[alternative].set(), graph[self.decision].set());
        match &self.shorter {
            None => Self::first(graph, alternative),
            Some(shorter) => Rc::new(Self {
                decision: alternative,
                shorter: Some(shorter.clone()),
                len: self.len,
                cost: shorter.cost + graph[alternative].cost(),
                future: self.future - graph.achievable_cost(self.decision)
                    + graph.achievable_cost(alternative),
            }),
        }
    }

    pub fn decision(&self) -> DecisionId {
        self.decision
    }

    pub fn shorter(&self) -> Option<&Rc<Prefix>> {
        self.shorter.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn future(&self) -> Cost {
        self.future
    }

    /// Decisions in stage order.
    pub fn decisions(&self) -> Vec<DecisionId> {
        let mut decisions = Vec::with_capacity(self.len);
        let mut current = Some(self);
        while let Some(prefix) = current {
            decisions.push(prefix.decision);
            current = prefix.shorter.as_deref();
        }
        decisions.reverse();
        decisions
    }

    /// Nodes reached at each stage, in stage order.
    pub fn nodes<P>(&self, graph: &DpGraph<P>) -> Vec<NodeId> {
        self.decisions()
            .into_iter()
            .map(|d| graph[d].target())
            .collect()
    }
}

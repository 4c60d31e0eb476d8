use std::cell::RefCell;
use std::rc::Rc;

use crate::cost::Cost;
use crate::graph::{DecisionId, DpGraph};

/// Memoized answer to "which subtree solution ranks right after this one".
#[derive(Debug)]
enum Next {
    Pending,
    Resolved(Option<Rc<SubtreeSolution>>),
}

/// A solution of the subproblem rooted at the target of `decision`.
///
/// Until it is expanded, only the first few branches of the target are fixed in `subtrees` and
/// the cost of the remaining branches is their optimum.
#[derive(Debug)]
pub(crate) struct SubtreeSolution {
    decision: DecisionId,
    /// `None` iff the target is terminal.
    subtrees: RefCell<Option<Rc<SubtreeCollection>>>,
    cost: Cost,
    /// First branch whose subtree may still be replaced when producing successors. Fixed at
    /// creation, `None` for leaves.
    last_sidetrack: Option<usize>,
    next: RefCell<Next>,
}

impl SubtreeSolution {
    pub fn leaf<P>(graph: &DpGraph<P>, decision: DecisionId) -> Rc<Self> {
        Rc::new(Self {
            decision,
            subtrees: RefCell::new(None),
            cost: graph[decision].cost(),
            last_sidetrack: None,
            next: RefCell::new(Next::Pending),
        })
    }

    /// `remaining` is the optimal cost of the target's branches not covered by `subtrees`.
    pub fn new<P>(
        graph: &DpGraph<P>,
        decision: DecisionId,
        subtrees: Rc<SubtreeCollection>,
        remaining: Cost,
    ) -> Rc<Self> {
        Rc::new(Self {
            decision,
            cost: graph[decision].cost() + subtrees.cost() + remaining,
            last_sidetrack: Some(subtrees.len() - 1),
            subtrees: RefCell::new(Some(subtrees)),
            next: RefCell::new(Next::Pending),
        })
    }

    pub fn decision(&self) -> DecisionId {
        self.decision
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn last_sidetrack(&self) -> Option<usize> {
        self.last_sidetrack
    }

    pub fn subtrees(&self) -> Option<Rc<SubtreeCollection>> {
        self.subtrees.borrow().clone()
    }

    pub fn set_subtrees(&self, subtrees: Rc<SubtreeCollection>) {
        *self.subtrees.borrow_mut() = Some(subtrees);
    }

    /// `None` while the next solution has not been computed.
    pub fn resolved_next(&self) -> Option<Option<Rc<SubtreeSolution>>> {
        match &*self.next.borrow() {
            Next::Pending => None,
            Next::Resolved(next) => Some(next.clone()),
        }
    }

    pub fn resolve(&self, next: Option<Rc<SubtreeSolution>>) {
        *self.next.borrow_mut() = Next::Resolved(next);
    }

    /// Subtree solutions below the target, in branch order.
    pub fn children(&self) -> Vec<Rc<SubtreeSolution>> {
        self.subtrees()
            .map(|collection| collection.solutions())
            .unwrap_or_default()
    }
}

/// Subtree solutions of the first `size` branches of a node, stored as a persistent list so
/// that successors share their unchanged branches.
#[derive(Debug)]
pub(crate) struct SubtreeCollection {
    prefix: Option<Rc<SubtreeCollection>>,
    last: Rc<SubtreeSolution>,
    cost: Cost,
    size: usize,
}

impl SubtreeCollection {
    pub fn single(first: Rc<SubtreeSolution>) -> Rc<Self> {
        Rc::new(Self {
            prefix: None,
            cost: first.cost(),
            last: first,
            size: 1,
        })
    }

    pub fn push(self: &Rc<Self>, next: Rc<SubtreeSolution>) -> Rc<Self> {
        Rc::new(Self {
            prefix: Some(self.clone()),
            cost: self.cost + next.cost(),
            last: next,
            size: self.size + 1,
        })
    }

    /// Same collection with the last subtree swapped for `replacement`.
    pub fn with_last(&self, replacement: Rc<SubtreeSolution>) -> Rc<Self> {
        let prefix_cost = self
            .prefix
            .as_ref()
            .map(|prefix| prefix.cost)
            .unwrap_or_default();
        Rc::new(Self {
            prefix: self.prefix.clone(),
            cost: prefix_cost + replacement.cost(),
            last: replacement,
            size: self.size,
        })
    }

    pub fn prefix(&self) -> Option<&Rc<SubtreeCollection>> {
        self.prefix.as_ref()
    }

    pub fn last(&self) -> &Rc<SubtreeSolution> {
        &self.last
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn solutions(&self) -> Vec<Rc<SubtreeSolution>> {
        let mut solutions = Vec::with_capacity(self.size);
        let mut current = Some(self);
        while let Some(collection) = current {
            solutions.push(collection.last.clone());
            current = collection.prefix.as_deref();
        }
        solutions.reverse();
        solutions
    }
}

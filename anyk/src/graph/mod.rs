//! The DP state-space graph.
//!
//! Nodes, decision sets and decisions live in arenas owned by [`DpGraph`] and are addressed by
//! copyable handles. A node refers to its decision sets by handle, so several parents may point
//! at the same [`DecisionSet`] and an edit made through one of them is seen by all.

use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Index;

use anyhow::{bail, ensure};
use smallvec::SmallVec;

use crate::cost::{Cost, INF};
use crate::error::{AnyKResult, GraphError};

mod bottom_up;
mod explain;
mod layout;
mod visit;

pub use explain::*;
pub use layout::*;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Ord, PartialOrd)]
pub struct NodeId(pub usize);

#[derive(Hash, Eq, PartialEq, Clone, Copy, Ord, PartialOrd)]
pub struct DecisionSetId(pub usize);

/// Handle of a decision. Handles are assigned in creation order, which makes them usable as the
/// deterministic tie-break between decisions of equal cost.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Ord, PartialOrd)]
pub struct DecisionId(pub usize);

impl Debug for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl Debug for DecisionSetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl Display for DecisionSetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl Debug for DecisionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

impl Display for DecisionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// A vertex of the DP graph.
#[derive(Debug, Clone)]
pub struct StateNode {
    /// Optimal achievable cost from this node, `INF` until the bottom-up pass ran.
    opt_cost: Cost,
    terminal: bool,
    /// One decision set per branch. Path problems have a single branch, tree problems one per
    /// child stage. Terminal nodes have none.
    branches: SmallVec<[DecisionSetId; 2]>,
}

impl StateNode {
    pub fn opt_cost(&self) -> Cost {
        self.opt_cost
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn branches(&self) -> &[DecisionSetId] {
        &self.branches
    }

    pub fn branch(&self, idx: usize) -> Option<DecisionSetId> {
        self.branches.get(idx).copied()
    }
}

/// All decisions leaving a node through one branch.
#[derive(Debug, Clone, Default)]
pub struct DecisionSet {
    decisions: Vec<DecisionId>,
    best: Option<DecisionId>,
    solved: bool,
}

impl DecisionSet {
    pub fn decisions(&self) -> &[DecisionId] {
        &self.decisions
    }

    /// Decision with the lowest achievable cost, set by the bottom-up pass.
    pub fn best_decision(&self) -> Option<DecisionId> {
        self.best
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// A weighted edge between two states.
#[derive(Debug, Clone)]
pub struct Decision {
    cost: Cost,
    target: NodeId,
    set: DecisionSetId,
    /// Index of this decision inside its set.
    position: usize,
}

impl Decision {
    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn set(&self) -> DecisionSetId {
        self.set
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// A DP (or T-DP) problem instance.
///
/// `P` is the problem specific payload attached to nodes, e.g. the tuple a join state stands
/// for. The synthetic start node carries no payload.
#[derive(Debug, Clone)]
pub struct DpGraph<P = ()> {
    nodes: Vec<StateNode>,
    payloads: Vec<Option<P>>,
    sets: Vec<DecisionSet>,
    decisions: Vec<Decision>,
    start: NodeId,
    layout: StageLayout,
    solved: bool,
}

impl<P> DpGraph<P> {
    /// Creates a graph that only holds the start node, with a single empty branch.
    pub fn new(layout: StageLayout) -> Self {
        let mut graph = Self {
            nodes: vec![],
            payloads: vec![],
            sets: vec![],
            decisions: vec![],
            start: NodeId(0),
            layout,
            solved: false,
        };
        graph.start = graph.push_node(None, false, 1);
        graph
    }

    /// Adds a non-terminal node with `branches` fresh, empty decision sets.
    pub fn add_node(&mut self, payload: P, branches: usize) -> NodeId {
        self.push_node(Some(payload), false, branches)
    }

    pub fn add_terminal(&mut self, payload: P) -> NodeId {
        self.push_node(Some(payload), true, 0)
    }

    fn push_node(&mut self, payload: Option<P>, terminal: bool, branches: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        let branches = (0..branches)
            .map(|_| {
                self.sets.push(DecisionSet::default());
                DecisionSetId(self.sets.len() - 1)
            })
            .collect();
        self.nodes.push(StateNode {
            opt_cost: INF,
            terminal,
            branches,
        });
        self.payloads.push(payload);
        self.solved = false;
        id
    }

    /// Appends a decision `from -> target` to the given branch of `from`.
    ///
    /// If the branch is shared with other nodes, they all see the new decision.
    pub fn add_decision<C: Into<Cost>>(
        &mut self,
        from: NodeId,
        branch: usize,
        target: NodeId,
        cost: C,
    ) -> AnyKResult<DecisionId> {
        self.check_node(target)?;
        let set = self.branch_of(from, branch)?;
        let id = DecisionId(self.decisions.len());
        let position = self.sets[set.0].decisions.len();
        self.decisions.push(Decision {
            cost: cost.into(),
            target,
            set,
            position,
        });
        self.sets[set.0].decisions.push(id);
        self.solved = false;
        Ok(id)
    }

    /// Makes branch `branch` of `node` refer to the decision set of the same branch of `other`.
    pub fn share_decisions(&mut self, node: NodeId, branch: usize, other: NodeId) -> AnyKResult<()> {
        self.branch_of(node, branch)?;
        let shared = self.branch_of(other, branch)?;
        self.nodes[node.0].branches[branch] = shared;
        self.solved = false;
        Ok(())
    }

    /// Changes the cost of a decision. Every node sharing its set is affected, and any previous
    /// bottom-up result is invalidated.
    pub fn set_decision_cost<C: Into<Cost>>(&mut self, decision: DecisionId, cost: C) -> AnyKResult<()> {
        match self.decisions.get_mut(decision.0) {
            Some(d) => d.cost = cost.into(),
            None => bail!(GraphError::UnknownDecision(decision)),
        }
        self.solved = false;
        Ok(())
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The only decision set of the start node.
    pub fn start_set(&self) -> DecisionSetId {
        self.nodes[self.start.0].branches[0]
    }

    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    pub fn payload(&self, node: NodeId) -> Option<&P> {
        self.payloads.get(node.0).and_then(Option::as_ref)
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn ensure_solved(&self) -> AnyKResult<()> {
        ensure!(self.solved, GraphError::NotSolved);
        Ok(())
    }

    /// Optimal cost of the whole instance, `INF` if no solution exists or it was not computed.
    pub fn opt_cost(&self) -> Cost {
        self.nodes[self.start.0].opt_cost
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn decision_count(&self) -> usize {
        self.decisions.len()
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    pub fn branch_of(&self, node: NodeId, branch: usize) -> AnyKResult<DecisionSetId> {
        let n = self.check_node(node)?;
        match n.branch(branch) {
            Some(set) => Ok(set),
            None => bail!(GraphError::BranchOutOfRange {
                node,
                branch,
                branches: n.branches.len(),
            }),
        }
    }

    fn check_node(&self, node: NodeId) -> AnyKResult<&StateNode> {
        match self.nodes.get(node.0) {
            Some(n) => Ok(n),
            None => bail!(GraphError::UnknownNode(node)),
        }
    }

    /// Immediate cost plus the optimal cost of the target.
    pub fn achievable_cost(&self, decision: DecisionId) -> Cost {
        let d = &self[decision];
        d.cost + self[d.target].opt_cost
    }

    /// Orders decisions by achievable cost, ties broken by handle.
    pub fn cmp_decisions(&self, a: DecisionId, b: DecisionId) -> Ordering {
        self.achievable_cost(a)
            .total_cmp(&self.achievable_cost(b))
            .then_with(|| a.cmp(&b))
    }

    /// Best decision of a set that lies on a finite-cost path.
    ///
    /// # Panics
    ///
    /// If the set has no best decision, meaning the bottom-up pass did not run or the set is
    /// empty. Enumerators only ask for sets below nodes of finite optimal cost, and those always
    /// have one.
    pub fn best_decision(&self, set: DecisionSetId) -> DecisionId {
        match self[set].best {
            Some(d) => d,
            None => panic!("decision set {set} has no best decision"),
        }
    }

    /// Next decision after `decision` in its set's list order.
    pub fn next_in_list(&self, decision: DecisionId) -> Option<DecisionId> {
        let d = &self[decision];
        self[d.set].decisions.get(d.position + 1).copied()
    }

    /// Target nodes of every decision leaving `node`, over all branches.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self[node]
            .branches
            .iter()
            .flat_map(move |set| self[*set].decisions.iter())
            .map(move |d| self[*d].target)
    }
}

impl<P> Index<NodeId> for DpGraph<P> {
    type Output = StateNode;

    fn index(&self, index: NodeId) -> &StateNode {
        &self.nodes[index.0]
    }
}

impl<P> Index<DecisionSetId> for DpGraph<P> {
    type Output = DecisionSet;

    fn index(&self, index: DecisionSetId) -> &DecisionSet {
        &self.sets[index.0]
    }
}

impl<P> Index<DecisionId> for DpGraph<P> {
    type Output = Decision;

    fn index(&self, index: DecisionId) -> &Decision {
        &self.decisions[index.0]
    }
}

//! Successor orders over decision sets.
//!
//! Lawler partitioning only needs to know, for a decision, which decisions of the same set come
//! "next". Each [`SuccessorKind`] answers that question with a different partial order, trading
//! set up cost against the number of successors handed out per request. Orders are built per
//! decision set on first use (or all at once, see [`PartialOrders::initialize_data_structures`])
//! and asked at most once per decision.

use std::cmp::Ordering;

use enum_dispatch::enum_dispatch;
use log::info;
use petgraph::visit::Dfs;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

use crate::config::SuccessorKind;
use crate::cost::Cost;
use crate::graph::{DecisionId, DecisionSetId, DpGraph};

mod all;
mod eager;
mod lazy;
mod quick;
mod take2;

use all::AllOrder;
use eager::EagerOrder;
use lazy::LazyOrder;
use quick::QuickOrder;
use take2::Take2Order;

pub type Successors = SmallVec<[DecisionId; 2]>;

/// A decision with the key it is ranked by inside its set.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RankedDecision {
    pub cost: Cost,
    pub id: DecisionId,
}

impl PartialEq for RankedDecision {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedDecision {}

impl PartialOrd for RankedDecision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedDecision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[enum_dispatch]
pub(crate) enum SetOrder {
    EagerOrder,
    LazyOrder,
    QuickOrder,
    AllOrder,
    Take2Order,
}

#[enum_dispatch(SetOrder)]
pub(crate) trait SuccessorOrder {
    /// The decision this order ranks first.
    fn best(&self) -> Option<DecisionId>;

    /// Successors of `decision`. Asked at most once per decision.
    fn successors_of(&mut self, decision: DecisionId, rng: &mut StdRng) -> Successors;
}

impl SetOrder {
    fn build(kind: SuccessorKind, items: Vec<RankedDecision>, rng: &mut StdRng) -> Self {
        match kind {
            SuccessorKind::Eager => EagerOrder::new(items).into(),
            SuccessorKind::Lazy => LazyOrder::new(items).into(),
            SuccessorKind::Quick => QuickOrder::new(items, rng).into(),
            SuccessorKind::All => AllOrder::new(items).into(),
            SuccessorKind::Take2 => Take2Order::new(items).into(),
        }
    }
}

/// Successor orders of every decision set of one graph, owned by an enumerator.
pub struct PartialOrders {
    kind: SuccessorKind,
    orders: Vec<Option<SetOrder>>,
    cache: Vec<Option<Successors>>,
    rng: StdRng,
}

impl PartialOrders {
    pub fn new<P>(graph: &DpGraph<P>, kind: SuccessorKind, seed: u64) -> Self {
        Self {
            kind,
            orders: std::iter::repeat_with(|| None)
                .take(graph.set_count())
                .collect(),
            cache: vec![None; graph.decision_count()],
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn kind(&self) -> SuccessorKind {
        self.kind
    }

    pub fn is_initialized(&self, set: DecisionSetId) -> bool {
        self.orders[set.0].is_some()
    }

    /// Builds the order of `set` from the achievable costs of its decisions.
    pub fn initialize_partial_order<P>(&mut self, graph: &DpGraph<P>, set: DecisionSetId) {
        if self.is_initialized(set) {
            return;
        }
        let items = graph[set]
            .decisions()
            .iter()
            .map(|d| RankedDecision {
                cost: graph.achievable_cost(*d),
                id: *d,
            })
            .collect::<Vec<_>>();
        let order = SetOrder::build(self.kind, items, &mut self.rng);
        debug_assert_eq!(
            order.best(),
            graph[set].best_decision(),
            "{} order disagrees with the bottom-up best of {}",
            self.kind,
            set
        );
        self.orders[set.0] = Some(order);
    }

    /// Builds the order of every set reachable from the start node. Returns how many were built.
    pub fn initialize_data_structures<P>(&mut self, graph: &DpGraph<P>) -> usize {
        let mut built = 0;
        let mut dfs = Dfs::new(graph, graph.start());
        while let Some(node) = dfs.next(graph) {
            for set in graph[node].branches() {
                if !self.is_initialized(*set) {
                    self.initialize_partial_order(graph, *set);
                    built += 1;
                }
            }
        }
        info!("Initialized {} {} successor orders", built, self.kind);
        built
    }

    /// Successors of `decision` within its set.
    ///
    /// The answer is computed once and then served from a cache, so asking again is cheap and
    /// returns the same decisions.
    pub fn get_successors<P>(&mut self, graph: &DpGraph<P>, decision: DecisionId) -> Successors {
        if let Some(successors) = &self.cache[decision.0] {
            return successors.clone();
        }
        let set = graph[decision].set();
        self.initialize_partial_order(graph, set);
        let successors = match self.orders[set.0].as_mut() {
            Some(order) => order.successors_of(decision, &mut self.rng),
            None => Successors::new(),
        };
        self.cache[decision.0] = Some(successors.clone());
        successors
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use strum::IntoEnumIterator;

    use super::*;
    use crate::graph::StageLayout;

    /// A start node with one terminal decision per cost.
    fn flat_graph(costs: &[f64]) -> DpGraph<usize> {
        let mut graph = DpGraph::new(StageLayout::Chain);
        for (idx, cost) in costs.iter().enumerate() {
            let t = graph.add_terminal(idx);
            graph.add_decision(graph.start(), 0, t, *cost).unwrap();
        }
        graph.bottom_up();
        graph
    }

    /// Walks the successor relation from the best decision and returns the visit order.
    fn reachable_in_order(orders: &mut PartialOrders, graph: &DpGraph<usize>) -> Vec<DecisionId> {
        let mut seen = vec![graph.best_decision(graph.start_set())];
        let mut frontier = seen.clone();
        while let Some(d) = frontier.pop() {
            for succ in orders.get_successors(graph, d) {
                seen.push(succ);
                frontier.push(succ);
            }
        }
        seen
    }

    #[test]
    fn test_every_order_is_a_spanning_tree() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let n = rng.random_range(1..40);
            let costs = (0..n)
                .map(|_| rng.random_range(0..10) as f64)
                .collect::<Vec<_>>();
            let graph = flat_graph(&costs);
            for kind in SuccessorKind::iter() {
                let mut orders = PartialOrders::new(&graph, kind, 3);
                let seen = reachable_in_order(&mut orders, &graph);
                let distinct = seen.iter().collect::<HashSet<_>>();
                assert_eq!(seen.len(), n, "{kind} lost or repeated decisions");
                assert_eq!(distinct.len(), n);

                // Every successor ranks after the decision it follows.
                for d in graph[graph.start_set()].decisions() {
                    for succ in orders.get_successors(&graph, *d) {
                        assert_ne!(
                            graph.cmp_decisions(*d, succ),
                            Ordering::Greater,
                            "{kind}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_successor_shapes() {
        let graph = flat_graph(&[4.0, 1.0, 3.0, 2.0, 5.0]);
        let d = |i: usize| DecisionId(i);

        let mut eager = PartialOrders::new(&graph, SuccessorKind::Eager, 0);
        assert_eq!(eager.get_successors(&graph, d(1)).as_slice(), &[d(3)]);
        assert_eq!(eager.get_successors(&graph, d(2)).as_slice(), &[d(0)]);
        assert!(eager.get_successors(&graph, d(4)).is_empty());

        let mut all = PartialOrders::new(&graph, SuccessorKind::All, 0);
        assert_eq!(all.get_successors(&graph, d(1)).len(), 4);
        assert!(all.get_successors(&graph, d(0)).is_empty());

        let mut take2 = PartialOrders::new(&graph, SuccessorKind::Take2, 0);
        let children = take2.get_successors(&graph, d(1));
        assert!(children.len() <= 2 && !children.is_empty());

        let mut lazy = PartialOrders::new(&graph, SuccessorKind::Lazy, 0);
        assert_eq!(lazy.get_successors(&graph, d(1)).as_slice(), &[d(3)]);
        // Asking twice serves the cached answer.
        assert_eq!(lazy.get_successors(&graph, d(1)).as_slice(), &[d(3)]);
        assert_eq!(lazy.get_successors(&graph, d(3)).as_slice(), &[d(2)]);
    }

    #[test]
    fn test_quick_sorts_with_ties() {
        let costs = [2.0, 2.0, 1.0, 2.0, 0.0, 1.0];
        let graph = flat_graph(&costs);
        let mut quick = PartialOrders::new(&graph, SuccessorKind::Quick, 42);
        let order = reachable_in_order(&mut quick, &graph);
        let ranks = order
            .iter()
            .map(|d| (graph.achievable_cost(*d).value() as i64, d.0))
            .collect::<Vec<_>>();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_initialize_data_structures() {
        let graph = flat_graph(&[1.0, 2.0]);
        let mut orders = PartialOrders::new(&graph, SuccessorKind::Eager, 0);
        assert!(!orders.is_initialized(graph.start_set()));
        assert_eq!(orders.initialize_data_structures(&graph), 1);
        assert!(orders.is_initialized(graph.start_set()));
        assert_eq!(orders.initialize_data_structures(&graph), 0);
    }
}

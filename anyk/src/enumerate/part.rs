use std::rc::Rc;

use log::trace;

use crate::config::EnumerationConfig;
use crate::enumerate::cursor::expand_optimally;
use crate::enumerate::AnyKIterator;
use crate::error::AnyKResult;
use crate::graph::DpGraph;
use crate::queue::CandidateQueue;
use crate::solution::{Prefix, Solution};
use crate::strategy::PartialOrders;

/// Lawler partitioning.
///
/// Every candidate is a prefix whose last decision was swapped for a successor. A popped
/// candidate is completed with best decisions, and after it was returned its successors are
/// generated for every stage from its own sidetrack to the end.
///
/// Each returned solution adds at most one candidate per stage to the queue, so the queue grows
/// by O(stages) entries per solution. That growth is expected and bounded by the number of
/// solutions returned so far.
pub struct Part<'a, P> {
    graph: &'a DpGraph<P>,
    orders: PartialOrders,
    candidates: CandidateQueue<Rc<Prefix>>,
    latest: Option<Rc<Prefix>>,
    latest_sidetrack: usize,
}

impl<'a, P> Part<'a, P> {
    pub fn new(graph: &'a DpGraph<P>, config: &EnumerationConfig) -> AnyKResult<Self> {
        graph.ensure_solved()?;
        let mut orders = PartialOrders::new(graph, config.successors, config.seed);
        if !config.lazy_init {
            orders.initialize_data_structures(graph);
        }
        let mut part = Self {
            graph,
            orders,
            candidates: CandidateQueue::new(config.queue),
            latest: None,
            latest_sidetrack: 0,
        };
        if graph.opt_cost().is_finite() {
            let best = graph.best_decision(graph.start_set());
            part.push_candidate(Prefix::first(graph, best));
        }
        Ok(part)
    }

    fn push_candidate(&mut self, prefix: Rc<Prefix>) {
        if prefix.future().is_finite() {
            self.candidates.push(prefix.future(), prefix);
        }
    }

    /// Successors of the latest solution at stages `latest_sidetrack..`.
    fn partition(&mut self, latest: Rc<Prefix>) {
        let mut current = Some(latest);
        while let Some(prefix) = current {
            if prefix.len() < self.latest_sidetrack {
                break;
            }
            for successor in self.orders.get_successors(self.graph, prefix.decision()) {
                self.push_candidate(prefix.successor(self.graph, successor));
            }
            current = prefix.shorter().cloned();
        }
    }
}

impl<'a, P> AnyKIterator for Part<'a, P> {
    fn get_next(&mut self) -> Option<Solution> {
        if let Some(latest) = self.latest.take() {
            self.partition(latest);
        }
        trace!("{} candidates queued", self.candidates.len());
        let popped = self.candidates.pop()?;
        self.latest_sidetrack = popped.len();
        let full = expand_optimally(self.graph, popped);
        let solution = Solution::new(self.graph, full.decisions(), full.future());
        self.latest = Some(full);
        Some(solution)
    }
}

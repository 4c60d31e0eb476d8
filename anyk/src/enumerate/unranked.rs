use std::collections::VecDeque;
use std::rc::Rc;

use crate::enumerate::cursor::expand_first;
use crate::enumerate::AnyKIterator;
use crate::graph::DpGraph;
use crate::solution::{Prefix, Solution};

/// Enumerates every solution exactly once, in no particular order.
///
/// Runs the same partitioning as [`crate::enumerate::Part`] but completes prefixes with the
/// first listed decision, takes successors in list order and serves candidates first in first
/// out. No bottom-up pass is needed.
pub struct Unranked<'a, P> {
    graph: &'a DpGraph<P>,
    candidates: VecDeque<Rc<Prefix>>,
    latest: Option<Rc<Prefix>>,
    latest_sidetrack: usize,
}

impl<'a, P> Unranked<'a, P> {
    pub fn new(graph: &'a DpGraph<P>) -> Self {
        let candidates = graph[graph.start_set()]
            .decisions()
            .first()
            .map(|first| Prefix::first(graph, *first))
            .into_iter()
            .collect();
        Self {
            graph,
            candidates,
            latest: None,
            latest_sidetrack: 0,
        }
    }

    fn partition(&mut self, latest: Rc<Prefix>) {
        let mut current = Some(latest);
        while let Some(prefix) = current {
            if prefix.len() < self.latest_sidetrack {
                break;
            }
            if let Some(next) = self.graph.next_in_list(prefix.decision()) {
                self.candidates
                    .push_back(prefix.successor(self.graph, next));
            }
            current = prefix.shorter().cloned();
        }
    }
}

impl<'a, P> AnyKIterator for Unranked<'a, P> {
    fn get_next(&mut self) -> Option<Solution> {
        loop {
            if let Some(latest) = self.latest.take() {
                self.partition(latest);
            }
            let popped = self.candidates.pop_front()?;
            self.latest_sidetrack = popped.len();
            let (prefix, complete) = expand_first(self.graph, popped);
            self.latest = Some(prefix.clone());
            // A dead end still has to be partitioned, its alternatives may complete.
            if complete {
                return Some(Solution::new(self.graph, prefix.decisions(), prefix.cost()));
            }
        }
    }
}

use std::rc::Rc;

use log::trace;

use crate::config::EnumerationConfig;
use crate::cost::Cost;
use crate::enumerate::cursor::{expand_optimally, Cursor};
use crate::enumerate::AnyKIterator;
use crate::error::AnyKResult;
use crate::graph::{DecisionSetId, DpGraph};
use crate::queue::CandidateQueue;
use crate::solution::{Prefix, Solution, Suffix};
use crate::strategy::PartialOrders;

/// A prefix that reached a decision set whose suffixes are already being ranked, paired with
/// the suffix at `rank` in that set's list.
struct Follower {
    prefix: Rc<Prefix>,
    suffix: Rc<Suffix>,
    rank: usize,
}

impl Follower {
    fn cost(&self) -> Cost {
        self.prefix.cost() + self.suffix.cost()
    }
}

enum Candidate {
    Prefix(Rc<Prefix>),
    Follower(Follower),
}

/// Follower waiting for the suffix at `rank` to be found.
struct Subscriber {
    prefix: Rc<Prefix>,
    rank: usize,
}

/// Ranked suffixes of one decision set, found by the first prefix that reached it.
#[derive(Default)]
struct SuffixMemo {
    sorted: Vec<Rc<Suffix>>,
    subscribers: Vec<Subscriber>,
}

/// Lawler partitioning that shares work between prefixes.
///
/// The suffixes below an independent stage only depend on the decision set of that stage. The
/// first prefix to reach a set ranks its suffixes as usual and records them in order; every
/// later prefix reaching the same set walks that list instead of partitioning again.
///
/// As with [`Part`](super::Part), the candidate queue gains O(stages) entries per returned
/// solution. The recorded suffix lists grow with the suffixes found and are kept for the life of
/// the enumerator.
pub struct PartPlus<'a, P> {
    graph: &'a DpGraph<P>,
    orders: PartialOrders,
    candidates: CandidateQueue<Candidate>,
    memos: Vec<Option<SuffixMemo>>,
    returned: usize,
}

impl<'a, P> PartPlus<'a, P> {
    pub fn new(graph: &'a DpGraph<P>, config: &EnumerationConfig) -> AnyKResult<Self> {
        graph.ensure_solved()?;
        let mut orders = PartialOrders::new(graph, config.successors, config.seed);
        if !config.lazy_init {
            orders.initialize_data_structures(graph);
        }
        let mut candidates = CandidateQueue::new(config.queue);
        if graph.opt_cost().is_finite() {
            let first = Prefix::first(graph, graph.best_decision(graph.start_set()));
            candidates.push(first.future(), Candidate::Prefix(first));
        }
        Ok(Self {
            graph,
            orders,
            candidates,
            memos: std::iter::repeat_with(|| None)
                .take(graph.set_count())
                .collect(),
            returned: 0,
        })
    }

    /// Pops one candidate and returns the solution it stands for.
    fn step(&mut self) -> Option<Solution> {
        match self.candidates.pop()? {
            Candidate::Prefix(prefix) => Some(self.advance_prefix(prefix)),
            Candidate::Follower(follower) => Some(self.advance_follower(follower)),
        }
    }

    fn advance_prefix(&mut self, popped: Rc<Prefix>) -> Solution {
        self.push_successors(&popped);
        let mut cursor = Cursor::at(self.graph, &popped);
        let mut prefix = popped;
        let mut reused: Option<(Solution, Rc<Suffix>)> = None;

        while let Some(set) = cursor.next_set(self.graph, prefix.len()) {
            let ranked_first = self.memos[set.0]
                .as_ref()
                .and_then(|memo| memo.sorted.first().cloned());
            if let Some(first) = ranked_first {
                let follower = Follower {
                    prefix: prefix.clone(),
                    suffix: first.clone(),
                    rank: 0,
                };
                self.follow(&follower, set);
                reused = Some((self.solution_of(&follower), first));
                break;
            }
            let best = self.graph.best_decision(set);
            cursor.advance(self.graph, best);
            prefix = prefix.extend(self.graph, best);
            self.push_successors(&prefix);
        }

        let (solution, suffix) = match reused {
            Some((solution, cached)) => (solution, cached.prepend(self.graph, prefix.decision())),
            None => (
                Solution::new(self.graph, prefix.decisions(), prefix.future()),
                Suffix::last(self.graph, prefix.decision()),
            ),
        };
        self.record_along(&prefix, suffix);
        solution
    }

    fn advance_follower(&mut self, follower: Follower) -> Solution {
        let set = self.graph[follower.suffix.decision()].set();
        self.follow(&follower, set);
        let solution = self.solution_of(&follower);
        let suffix = follower
            .suffix
            .prepend(self.graph, follower.prefix.decision());
        self.record_along(&follower.prefix, suffix);
        solution
    }

    fn solution_of(&self, follower: &Follower) -> Solution {
        let decisions = follower
            .prefix
            .decisions()
            .into_iter()
            .chain(follower.suffix.decisions())
            .collect();
        Solution::new(self.graph, decisions, follower.cost())
    }

    fn push_successors(&mut self, prefix: &Rc<Prefix>) {
        for successor in self.orders.get_successors(self.graph, prefix.decision()) {
            let candidate = prefix.successor(self.graph, successor);
            if candidate.future().is_finite() {
                self.candidates
                    .push(candidate.future(), Candidate::Prefix(candidate));
            }
        }
    }

    /// Queues the follower of the next rank, or waits for that suffix to be found.
    fn follow(&mut self, follower: &Follower, set: DecisionSetId) {
        let memo = self.memos[set.0].get_or_insert_with(SuffixMemo::default);
        let rank = follower.rank + 1;
        match memo.sorted.get(rank) {
            Some(suffix) => {
                let next = Follower {
                    prefix: follower.prefix.clone(),
                    suffix: suffix.clone(),
                    rank,
                };
                self.candidates.push(next.cost(), Candidate::Follower(next));
            }
            None => {
                trace!("Follower waits for suffix {} of {}", rank, set);
                memo.subscribers.push(Subscriber {
                    prefix: follower.prefix.clone(),
                    rank,
                });
            }
        }
    }

    /// Walks `prefix` back to the start, recording the growing suffix at every independent
    /// stage. `suffix` starts with the last decision of `prefix`.
    fn record_along(&mut self, prefix: &Rc<Prefix>, mut suffix: Rc<Suffix>) {
        let mut set = self.graph[prefix.decision()].set();
        let mut current = prefix.shorter().cloned();
        while let Some(shorter) = current {
            if self.graph.layout().is_independent(shorter.len() + 1) {
                self.record_suffix(set, suffix.clone());
            }
            set = self.graph[shorter.decision()].set();
            suffix = suffix.prepend(self.graph, shorter.decision());
            current = shorter.shorter().cloned();
        }
    }

    fn record_suffix(&mut self, set: DecisionSetId, suffix: Rc<Suffix>) {
        let memo = self.memos[set.0].get_or_insert_with(SuffixMemo::default);
        debug_assert!(
            memo.sorted
                .last()
                .map_or(true, |last| last.cost().approx_le(suffix.cost())),
            "suffixes of {} recorded out of order",
            set
        );
        debug_assert!(
            !memo.sorted.iter().any(|s| Rc::ptr_eq(s, &suffix)),
            "suffix recorded twice for {}",
            set
        );
        memo.sorted.push(suffix.clone());
        let rank = memo.sorted.len() - 1;
        trace!("Recorded suffix {} of {} at cost {}", rank, set, suffix.cost());

        for subscriber in memo.subscribers.drain(..) {
            debug_assert_eq!(subscriber.rank, rank);
            let follower = Follower {
                prefix: subscriber.prefix,
                suffix: suffix.clone(),
                rank,
            };
            self.candidates
                .push(follower.cost(), Candidate::Follower(follower));
        }
    }
}

impl<'a, P> AnyKIterator for PartPlus<'a, P> {
    fn get_next(&mut self) -> Option<Solution> {
        self.returned += 1;
        match self.returned {
            1 => {
                if !self.graph.opt_cost().is_finite() {
                    return None;
                }
                let best = self.graph.best_decision(self.graph.start_set());
                let full = expand_optimally(self.graph, Prefix::first(self.graph, best));
                Some(Solution::new(self.graph, full.decisions(), full.future()))
            }
            // The first pop reproduces the optimum that was already returned.
            2 => {
                self.step()?;
                self.step()
            }
            _ => self.step(),
        }
    }
}

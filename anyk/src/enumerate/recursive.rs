use std::rc::Rc;

use crate::config::{EnumerationConfig, QueueKind};
use crate::cost::{Cost, ZERO};
use crate::enumerate::AnyKIterator;
use crate::error::AnyKResult;
use crate::graph::{DecisionId, DecisionSetId, DpGraph, NodeId, StageLayout};
use crate::queue::CandidateQueue;
use crate::solution::{Solution, SubtreeCollection, SubtreeSolution};

enum Progress {
    NotStarted,
    Running(Rc<SubtreeSolution>),
    Exhausted,
}

/// Recursive enumeration.
///
/// Every decision set keeps a queue of subtree solutions. The successor of a subtree solution
/// replaces one of its branch subtrees by that subtree's own successor, so the k-th solution of
/// a set is built from lower ranked solutions of the sets below it, each computed once and
/// shared by every parent.
pub struct Recursive<'a, P> {
    graph: &'a DpGraph<P>,
    queue_kind: QueueKind,
    queues: Vec<Option<CandidateQueue<Rc<SubtreeSolution>>>>,
    best_subtrees: Vec<Option<Rc<SubtreeSolution>>>,
    /// Per node, the optimal cost of branches `k..` at index `k`.
    remaining_costs: Vec<Option<Vec<Cost>>>,
    progress: Progress,
}

impl<'a, P> Recursive<'a, P> {
    pub fn new(graph: &'a DpGraph<P>, config: &EnumerationConfig) -> AnyKResult<Self> {
        graph.ensure_solved()?;
        Ok(Self {
            graph,
            queue_kind: config.queue,
            queues: std::iter::repeat_with(|| None)
                .take(graph.set_count())
                .collect(),
            best_subtrees: vec![None; graph.set_count()],
            remaining_costs: vec![None; graph.node_count()],
            progress: Progress::NotStarted,
        })
    }

    fn remaining_cost(&mut self, node: NodeId, fixed: usize) -> Cost {
        let graph = self.graph;
        let table = self.remaining_costs[node.0].get_or_insert_with(|| {
            let branches = graph[node].branches();
            let mut table = vec![ZERO; branches.len() + 1];
            for (idx, set) in branches.iter().enumerate().rev() {
                table[idx] = table[idx + 1] + graph.achievable_cost(graph.best_decision(*set));
            }
            table
        });
        table[fixed]
    }

    /// The best solution of the subproblem below branch `branch` of `node`, fully expanded.
    fn best_subtree(&mut self, node: NodeId, branch: usize) -> Rc<SubtreeSolution> {
        let set = self.graph[node].branches()[branch];
        if let Some(best) = &self.best_subtrees[set.0] {
            return best.clone();
        }
        self.initialize_queue(set);
        let best = match self.queues[set.0].as_ref().and_then(|q| q.peek().cloned()) {
            Some(best) => best,
            None => panic!("decision set {set} below a finite cost node has no candidate"),
        };
        self.expand(&best);
        self.best_subtrees[set.0] = Some(best.clone());
        best
    }

    /// A solution for `decision` that fixes only the first branch below it.
    fn fresh_subtree(&mut self, decision: DecisionId) -> Rc<SubtreeSolution> {
        let target = self.graph[decision].target();
        if self.graph[target].branches().is_empty() {
            return SubtreeSolution::leaf(self.graph, decision);
        }
        let first = self.best_subtree(target, 0);
        let remaining = self.remaining_cost(target, 1);
        SubtreeSolution::new(
            self.graph,
            decision,
            SubtreeCollection::single(first),
            remaining,
        )
    }

    fn initialize_queue(&mut self, set: DecisionSetId) {
        if self.queues[set.0].is_some() {
            return;
        }
        let graph = self.graph;
        let mut queue = CandidateQueue::new(self.queue_kind);
        for decision in graph[set].decisions() {
            if !graph.achievable_cost(*decision).is_finite() {
                continue;
            }
            let candidate = self.fresh_subtree(*decision);
            queue.push(candidate.cost(), candidate);
        }
        self.queues[set.0] = Some(queue);
    }

    /// Fixes the best subtree of every branch not covered yet.
    fn expand(&mut self, solution: &Rc<SubtreeSolution>) {
        let mut subtrees = match solution.subtrees() {
            Some(subtrees) => subtrees,
            None => return,
        };
        let target = self.graph[solution.decision()].target();
        let branches = self.graph[target].branches().len();
        if subtrees.len() == branches {
            return;
        }
        while subtrees.len() < branches {
            subtrees = subtrees.push(self.best_subtree(target, subtrees.len()));
        }
        solution.set_subtrees(subtrees);
    }

    /// Solution ranked right after `current` among the solutions of its decision set.
    fn find_next(&mut self, current: &Rc<SubtreeSolution>) -> Option<Rc<SubtreeSolution>> {
        if let Some(next) = current.resolved_next() {
            return next;
        }
        let graph = self.graph;
        let decision = current.decision();
        let set = graph[decision].set();
        self.initialize_queue(set);

        let popped = self.queues[set.0].as_mut().and_then(CandidateQueue::pop);
        match popped {
            Some(popped) => debug_assert!(
                Rc::ptr_eq(&popped, current),
                "{} is not the head of the queue of {}",
                decision,
                set
            ),
            None => {
                current.resolve(None);
                return None;
            }
        }

        if let Some(first) = current.last_sidetrack() {
            let target = graph[decision].target();
            let branches = graph[target].branches().len();
            let mut subtrees = current.subtrees();
            for replaced in (first..branches).rev() {
                let collection = match subtrees {
                    Some(collection) => collection,
                    None => break,
                };
                if let Some(replacement) = self.find_next(collection.last()) {
                    let remaining = self.remaining_cost(target, replaced + 1);
                    let successor = SubtreeSolution::new(
                        graph,
                        decision,
                        collection.with_last(replacement),
                        remaining,
                    );
                    if let Some(queue) = self.queues[set.0].as_mut() {
                        queue.push(successor.cost(), successor);
                    }
                }
                subtrees = collection.prefix().cloned();
            }
        }

        let next = self.queues[set.0].as_ref().and_then(|q| q.peek().cloned());
        if let Some(next) = &next {
            self.expand(next);
        }
        current.resolve(next.clone());
        next
    }

    /// Flattens a solution of the start set into stage order.
    fn materialize(&self, root: &Rc<SubtreeSolution>) -> Solution {
        let decisions = match self.graph.layout() {
            StageLayout::Chain => {
                std::iter::successors(Some(root.clone()), |s| s.children().into_iter().next())
                    .map(|s| s.decision())
                    .collect()
            }
            StageLayout::Tree(tree) => {
                let mut decisions = vec![None; tree.stage_count() - 1];
                let mut stack = vec![(root.clone(), 1)];
                while let Some((solution, stage)) = stack.pop() {
                    decisions[stage - 1] = Some(solution.decision());
                    for (child, child_stage) in
                        solution.children().into_iter().zip(tree.children(stage))
                    {
                        stack.push((child, *child_stage));
                    }
                }
                decisions.into_iter().flatten().collect()
            }
        };
        Solution::new(self.graph, decisions, root.cost())
    }
}

impl<'a, P> AnyKIterator for Recursive<'a, P> {
    fn get_next(&mut self) -> Option<Solution> {
        let next = match std::mem::replace(&mut self.progress, Progress::Exhausted) {
            Progress::NotStarted if self.graph.opt_cost().is_finite() => {
                Some(self.best_subtree(self.graph.start(), 0))
            }
            Progress::NotStarted | Progress::Exhausted => None,
            Progress::Running(latest) => self.find_next(&latest),
        }?;
        self.progress = Progress::Running(next.clone());
        Some(self.materialize(&next))
    }
}

use log::debug;

use crate::config::{EnumerationConfig, QueueKind};
use crate::enumerate::AnyK;
use crate::error::AnyKResult;
use crate::graph::DpGraph;
use crate::queue::CandidateQueue;
use crate::solution::Solution;

/// Ranked merge of several enumerators, one per member problem of a union.
///
/// The head of every member waits in a queue. The member whose head was returned last is pulled
/// again on the next call only, so no member runs more than one solution ahead. Solutions are
/// tagged with the index of their member because decisions only mean something in the member's
/// own graph. The merge is ranked when every member is.
pub struct Union<I> {
    members: Vec<I>,
    heads: CandidateQueue<(usize, Solution)>,
    last: Option<usize>,
}

impl<I: Iterator<Item = Solution>> Union<I> {
    pub fn new(mut members: Vec<I>, queue: QueueKind) -> Self {
        let mut heads = CandidateQueue::new(queue);
        for (idx, member) in members.iter_mut().enumerate() {
            if let Some(solution) = member.next() {
                heads.push(solution.cost(), (idx, solution));
            }
        }
        debug!(
            "Union of {} members, {} with solutions",
            members.len(),
            heads.len()
        );
        Self {
            members,
            heads,
            last: None,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// The next solution and the index of the member it came from.
    pub fn get_next(&mut self) -> Option<(usize, Solution)> {
        if let Some(idx) = self.last.take() {
            if let Some(solution) = self.members[idx].next() {
                self.heads.push(solution.cost(), (idx, solution));
            }
        }
        let (idx, solution) = self.heads.pop()?;
        self.last = Some(idx);
        Some((idx, solution))
    }
}

impl<'a, P> Union<AnyK<'a, P>> {
    /// One enumerator per graph, all built from `config`.
    pub fn over(graphs: &'a [DpGraph<P>], config: &EnumerationConfig) -> AnyKResult<Self> {
        let members = graphs
            .iter()
            .map(|graph| AnyK::new(graph, config))
            .collect::<AnyKResult<Vec<_>>>()?;
        Ok(Self::new(members, config.queue))
    }
}

impl<I: Iterator<Item = Solution>> Iterator for Union<I> {
    type Item = (usize, Solution);

    fn next(&mut self) -> Option<(usize, Solution)> {
        self.get_next()
    }
}

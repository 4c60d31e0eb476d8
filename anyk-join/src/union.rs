//! Ranked answers to a union of join queries.

use std::collections::HashSet;

use anyhow::ensure;
use anyk::{AnyK, Cost, DpGraph, EnumerationConfig, Union};
use log::trace;

use crate::relation::Tuple;
use crate::AnyKResult;

/// One answer of a union, with the index of the query that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionAnswer<'a> {
    pub query: usize,
    pub cost: Cost,
    pub tuples: Vec<&'a Tuple>,
}

impl<'a> UnionAnswer<'a> {
    /// Values of all tuples, in stage order.
    pub fn values(&self) -> Vec<i64> {
        self.tuples
            .iter()
            .flat_map(|t| t.values().iter().copied())
            .collect()
    }
}

/// Merges the ranked answers of several built and solved join graphs.
///
/// Answers are compared by their values, not by relation names, so queries over differently
/// named copies of the same data overlap. An answer equal in values and cost to one already
/// returned is skipped.
pub struct UnionAnswers<'a> {
    graphs: &'a [DpGraph<Tuple>],
    union: Union<AnyK<'a, Tuple>>,
    seen: HashSet<Vec<i64>>,
    seen_cost: Option<Cost>,
    skipped: usize,
}

impl<'a> UnionAnswers<'a> {
    pub fn new(graphs: &'a [DpGraph<Tuple>], config: &EnumerationConfig) -> AnyKResult<Self> {
        ensure!(
            config.algorithm.is_ranked(),
            "union of answers needs a ranked algorithm, got {}",
            config.algorithm
        );
        Ok(Self {
            graphs,
            union: Union::over(graphs, config)?,
            seen: HashSet::new(),
            seen_cost: None,
            skipped: 0,
        })
    }

    /// Duplicates dropped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for UnionAnswers<'a> {
    type Item = UnionAnswer<'a>;

    fn next(&mut self) -> Option<UnionAnswer<'a>> {
        // Duplicates share their cost, so only answers of the current cost are remembered.
        while let Some((query, solution)) = self.union.next() {
            let graphs = self.graphs;
            let answer = UnionAnswer {
                query,
                cost: solution.cost(),
                tuples: solution.to_ordered_tuples(&graphs[query]),
            };
            if !self.seen_cost.is_some_and(|c| c.approx_eq(answer.cost)) {
                self.seen.clear();
                self.seen_cost = Some(answer.cost);
            }
            if self.seen.insert(answer.values()) {
                return Some(answer);
            }
            trace!("Skipped duplicate answer from query {} with cost {}", query, answer.cost);
            self.skipped += 1;
        }
        None
    }
}

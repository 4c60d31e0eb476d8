use std::rc::Rc;

use log::debug;

use crate::enumerate::cursor::Cursor;
use crate::enumerate::AnyKIterator;
use crate::graph::DpGraph;
use crate::solution::{Prefix, Solution};

/// Materializes every solution with a depth-first walk, optionally sorting them by cost.
pub struct Batch {
    solutions: std::vec::IntoIter<Solution>,
}

impl Batch {
    pub fn new<P>(graph: &DpGraph<P>) -> Self {
        Self {
            solutions: find_all(graph).into_iter(),
        }
    }

    /// Like [`Batch::new`], solutions sorted by cost. Equal costs are ordered by their decisions.
    pub fn sorted<P>(graph: &DpGraph<P>) -> Self {
        let mut solutions = find_all(graph);
        solutions.sort_by(|a, b| {
            a.cost()
                .total_cmp(&b.cost())
                .then_with(|| a.decisions().cmp(b.decisions()))
        });
        Self {
            solutions: solutions.into_iter(),
        }
    }

    /// Solutions not yet returned.
    pub fn remaining(&self) -> usize {
        self.solutions.len()
    }
}

fn find_all<P>(graph: &DpGraph<P>) -> Vec<Solution> {
    let mut solutions = vec![];
    let mut stack = graph[graph.start_set()]
        .decisions()
        .iter()
        .rev()
        .map(|d| Prefix::first(graph, *d))
        .collect::<Vec<Rc<Prefix>>>();

    while let Some(prefix) = stack.pop() {
        let cursor = Cursor::at(graph, &prefix);
        match cursor.next_set(graph, prefix.len()) {
            None => {
                let cost = prefix.cost();
                solutions.push(Solution::new(graph, prefix.decisions(), cost));
            }
            Some(set) => {
                for d in graph[set].decisions().iter().rev() {
                    stack.push(prefix.extend(graph, *d));
                }
            }
        }
    }
    debug!("Batch enumeration materialized {} solutions", solutions.len());
    solutions
}

impl AnyKIterator for Batch {
    fn get_next(&mut self) -> Option<Solution> {
        self.solutions.next()
    }
}

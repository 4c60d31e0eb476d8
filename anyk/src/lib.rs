//! ## Background
//!
//! Many optimization problems are solved by dynamic programming over a graph of states: every
//! solution is a path (or, for tree-shaped problems, a tree) of decisions from a start state, and
//! its cost is the sum of the costs of its decisions. The classic bottom-up pass finds the best
//! solution. Ranked enumeration, also called any-k, goes further and returns every solution in
//! order of increasing cost, one at a time, so that the top-k can be consumed without paying for
//! the rest. Ranked answers to joins over weighted relations are the motivating example: the join
//! is compiled into such a graph, with one stage per relation.
//!
//! Two families of algorithms are implemented. Partitioning [1] splits the solution space around
//! every returned solution and keeps one best candidate per partition in a priority queue; how
//! the alternatives of a decision are ordered is pluggable, and incremental quicksort [3] is one
//! of the choices. Recursive enumeration [2] ranks the solutions of every subproblem and builds
//! the k-th solution of a state from lower ranked solutions of the states below it.
//!
//! ## Design
//!
//! * [`graph`] The DP graph, its stage layout and the bottom-up pass.
//! * [`strategy`] Successor orders used by partitioning.
//! * [`enumerate`] The enumerators and the [`enumerate::AnyK`] factory.
//! * [`solution`] Solutions returned to callers.
//! * [`config`] Algorithm selection.
//!
//! ## Reference
//!
//! 1. Lawler, E.L., 1972. A procedure for computing the k best solutions to discrete
//! optimization problems and its application to the shortest path problem. Management science,
//! 18(7), pp.401-405.
//! 2. Tziavelis, N., Ajwani, D., Gatterbauer, W., Riedewald, M. and Yang, X., 2020. Optimal
//! algorithms for ranked enumeration of answers to full conjunctive queries. Proceedings of the
//! VLDB Endowment, 13(9), pp.1582-1597.
//! 3. Paredes, R. and Navarro, G., 2006. Optimal incremental sorting. In Proceedings of the
//! Workshop on Algorithm Engineering and Experiments (pp. 171-182).

#[macro_use]
extern crate prettytable;
#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod cost;
pub mod enumerate;
pub mod error;
pub mod graph;
mod queue;
pub mod solution;
pub mod strategy;

#[cfg(test)]
mod test_utils;

pub use config::{Algorithm, EnumerationConfig, QueueKind, SuccessorKind};
pub use cost::Cost;
pub use enumerate::{AnyK, AnyKIterator, Union};
pub use graph::{DecisionId, DecisionSetId, DpGraph, NodeId, StageLayout, StageTree};
pub use solution::Solution;

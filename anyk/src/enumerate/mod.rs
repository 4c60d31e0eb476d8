//! Any-k enumerators.
//!
//! * [`Part`] Lawler partitioning with a pluggable successor order.
//! * [`PartPlus`] Lawler partitioning that reuses ranked suffixes.
//! * [`Recursive`] Recursive enumeration over subtree solutions.
//! * [`Unranked`] Every solution once, in no particular order.
//! * [`Batch`] Materialize everything, optionally sorted.
//! * [`Union`] Ranked merge of the enumerators of several graphs.
//!
//! [`AnyK`] picks one of them from an [`EnumerationConfig`].

use log::{debug, info};

use crate::config::{Algorithm, EnumerationConfig};
use crate::error::AnyKResult;
use crate::graph::DpGraph;
use crate::solution::Solution;

mod batch;
mod cursor;
mod part;
mod part_plus;
mod recursive;
mod union;
mod unranked;

pub use batch::Batch;
pub use part::Part;
pub use part_plus::PartPlus;
pub use recursive::Recursive;
pub use union::Union;
pub use unranked::Unranked;

pub trait AnyKIterator {
    /// The next solution, `None` once every solution was returned. Exhaustion is final.
    fn get_next(&mut self) -> Option<Solution>;
}

macro_rules! impl_iterator {
    ($($enumerator: ident),*) => {
        $(
            impl<'a, P> Iterator for $enumerator<'a, P> {
                type Item = Solution;

                fn next(&mut self) -> Option<Solution> {
                    self.get_next()
                }
            }
        )*
    };
}

impl_iterator!(Part, PartPlus, Recursive, Unranked);

impl Iterator for Batch {
    type Item = Solution;

    fn next(&mut self) -> Option<Solution> {
        self.get_next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for Batch {}

pub enum AnyK<'a, P> {
    Part(Part<'a, P>),
    PartPlus(PartPlus<'a, P>),
    Recursive(Recursive<'a, P>),
    Unranked(Unranked<'a, P>),
    Batch(Batch),
}

impl<'a, P> AnyK<'a, P> {
    /// Creates the enumerator named by `config`.
    ///
    /// Ranked algorithms other than batch sorting require [`DpGraph::bottom_up`] to have run on
    /// the current costs.
    pub fn new(graph: &'a DpGraph<P>, config: &EnumerationConfig) -> AnyKResult<Self> {
        info!(
            "Enumerating with {} ({} successors, {} queue)",
            config.algorithm, config.successors, config.queue
        );
        if config.algorithm.needs_optimum() {
            graph.ensure_solved()?;
        }
        let enumerator = match config.algorithm {
            Algorithm::Part => AnyK::Part(Part::new(graph, config)?),
            Algorithm::PartPlus => AnyK::PartPlus(PartPlus::new(graph, config)?),
            Algorithm::Recursive => AnyK::Recursive(Recursive::new(graph, config)?),
            Algorithm::Unranked => AnyK::Unranked(Unranked::new(graph)),
            Algorithm::Batch => AnyK::Batch(Batch::new(graph)),
            Algorithm::BatchSorting => AnyK::Batch(Batch::sorted(graph)),
        };
        debug!("Enumerator ready");
        Ok(enumerator)
    }
}

impl<'a, P> AnyKIterator for AnyK<'a, P> {
    fn get_next(&mut self) -> Option<Solution> {
        let solution = match self {
            AnyK::Part(e) => e.get_next(),
            AnyK::PartPlus(e) => e.get_next(),
            AnyK::Recursive(e) => e.get_next(),
            AnyK::Unranked(e) => e.get_next(),
            AnyK::Batch(e) => e.get_next(),
        };
        if let Some(s) = &solution {
            debug!("Solution returned with cost {}", s.cost());
        }
        solution
    }
}

impl<'a, P> Iterator for AnyK<'a, P> {
    type Item = Solution;

    fn next(&mut self) -> Option<Solution> {
        self.get_next()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;

    use super::*;
    use crate::cost::Cost;
    use crate::error::GraphError;
    use crate::graph::{DecisionId, StageLayout, StageTree};
    use crate::test_utils::{all_configs, init_logger, random_chain, random_tree};

    fn check_against_batch(graph: &DpGraph<usize>) {
        let expected = Batch::sorted(graph).collect::<Vec<_>>();
        let expected_costs = expected.iter().map(|s| s.cost()).collect::<Vec<_>>();
        let expected_set = expected
            .iter()
            .map(|s| s.decisions().to_vec())
            .collect::<HashSet<_>>();
        assert_eq!(expected.len() as u128, graph.count_solutions().unwrap());

        for config in all_configs() {
            let solutions = AnyK::new(graph, &config).unwrap().collect::<Vec<_>>();
            let decisions = solutions
                .iter()
                .map(|s| s.decisions().to_vec())
                .collect::<HashSet<_>>();
            assert_eq!(decisions.len(), solutions.len(), "{config:?} repeated a solution");
            assert_eq!(decisions, expected_set, "{config:?}");

            let mut costs = solutions.iter().map(|s| s.cost()).collect::<Vec<_>>();
            if config.algorithm.is_ranked() {
                assert_eq!(costs, expected_costs, "{config:?}");
            } else {
                costs.sort_by(Cost::total_cmp);
                assert_eq!(costs, expected_costs, "{config:?}");
            }
        }
    }

    #[test]
    fn test_random_chains() {
        init_logger();
        for seed in 0..12 {
            let mut graph = random_chain(seed, 4, 3);
            graph.bottom_up();
            check_against_batch(&graph);
        }
    }

    #[test]
    fn test_random_trees() {
        init_logger();
        let shapes: [&[usize]; 5] = [
            &[0, 1, 2],
            &[0, 1, 1],
            &[0, 1, 1, 1],
            &[0, 1, 1, 2, 3],
            &[0, 1, 2, 2, 1],
        ];
        for (seed, parents) in (0..6).cartesian_product(shapes.iter()) {
            let mut graph = random_tree(seed, parents, 3);
            graph.bottom_up();
            check_against_batch(&graph);
        }
    }

    #[test]
    fn test_first_solution_is_optimal() {
        let mut graph = random_chain(99, 5, 4);
        let opt = graph.bottom_up();
        for config in all_configs()
            .into_iter()
            .filter(|c| c.algorithm.is_ranked())
        {
            let first = AnyK::new(&graph, &config).unwrap().next().unwrap();
            assert_eq!(first.cost(), opt, "{config:?}");
        }
    }

    #[test]
    fn test_exhaustion_is_final() {
        let mut graph = random_chain(5, 3, 2);
        graph.bottom_up();
        let total = graph.count_solutions().unwrap() as usize;
        for config in all_configs() {
            let mut anyk = AnyK::new(&graph, &config).unwrap();
            for _ in 0..total {
                assert!(anyk.get_next().is_some(), "{config:?}");
            }
            for _ in 0..3 {
                assert!(anyk.get_next().is_none(), "{config:?}");
            }
        }
    }

    #[test]
    fn test_ranked_requires_bottom_up() {
        let graph = random_chain(1, 3, 2);
        for algorithm in [Algorithm::Part, Algorithm::PartPlus, Algorithm::Recursive] {
            let err = AnyK::new(&graph, &EnumerationConfig::new(algorithm))
                .err()
                .unwrap();
            assert_eq!(err.downcast_ref::<GraphError>(), Some(&GraphError::NotSolved));
        }
        assert_eq!(
            AnyK::new(&graph, &EnumerationConfig::new(Algorithm::Unranked))
                .unwrap()
                .count() as u128,
            graph.count_solutions().unwrap()
        );
    }

    #[test]
    fn test_no_solutions() {
        let mut graph = DpGraph::<usize>::new(StageLayout::Chain);
        let dead = graph.add_node(0, 1);
        graph.add_decision(graph.start(), 0, dead, 1.0).unwrap();
        graph.bottom_up();
        for config in all_configs() {
            assert_eq!(AnyK::new(&graph, &config).unwrap().count(), 0, "{config:?}");
        }

        let mut empty = DpGraph::<usize>::new(StageLayout::Chain);
        empty.bottom_up();
        for config in all_configs() {
            assert!(AnyK::new(&empty, &config).unwrap().next().is_none());
        }
    }

    #[test]
    fn test_dead_ends_are_skipped() {
        // start -> {a: 1, b: 2}, a -> dead end, b -> t: 1
        let mut graph = DpGraph::<usize>::new(StageLayout::Chain);
        let a = graph.add_node(0, 1);
        let b = graph.add_node(1, 1);
        let t = graph.add_terminal(2);
        let start = graph.start();
        graph.add_decision(start, 0, a, 1.0).unwrap();
        let db = graph.add_decision(start, 0, b, 2.0).unwrap();
        let dbt = graph.add_decision(b, 0, t, 1.0).unwrap();
        graph.bottom_up();

        for config in all_configs() {
            let solutions = AnyK::new(&graph, &config).unwrap().collect::<Vec<_>>();
            assert_eq!(solutions.len(), 1, "{config:?}");
            assert_eq!(solutions[0].decisions(), &[db, dbt]);
            assert_eq!(solutions[0].cost(), Cost::from(3.0));
        }
    }

    #[test]
    fn test_variable_length_chain() {
        // start -> t1: 5, start -> a: 1, a -> t2: 1
        let mut graph = DpGraph::<usize>::new(StageLayout::Chain);
        let t1 = graph.add_terminal(0);
        let a = graph.add_node(1, 1);
        let t2 = graph.add_terminal(2);
        let start = graph.start();
        graph.add_decision(start, 0, t1, 5.0).unwrap();
        graph.add_decision(start, 0, a, 1.0).unwrap();
        graph.add_decision(a, 0, t2, 1.0).unwrap();
        graph.bottom_up();

        for config in all_configs()
            .into_iter()
            .filter(|c| c.algorithm.is_ranked())
        {
            let solutions = AnyK::new(&graph, &config).unwrap().collect::<Vec<_>>();
            assert_eq!(
                solutions.iter().map(|s| s.len()).collect::<Vec<_>>(),
                vec![2, 1],
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_shared_sets_follow_edits() {
        // Two stage-1 nodes share their set: editing it moves both of them.
        let mut graph = DpGraph::<usize>::new(StageLayout::Tree(StageTree::path(2).unwrap()));
        let a = graph.add_node(0, 1);
        let b = graph.add_node(1, 1);
        let t = graph.add_terminal(2);
        let u = graph.add_terminal(3);
        let start = graph.start();
        graph.add_decision(start, 0, a, 1.0).unwrap();
        graph.add_decision(start, 0, b, 2.0).unwrap();
        graph.add_decision(a, 0, t, 1.0).unwrap();
        let au = graph.add_decision(a, 0, u, 2.0).unwrap();
        graph.share_decisions(b, 0, a).unwrap();
        graph.bottom_up();

        let before = AnyK::new(&graph, &EnumerationConfig::new(Algorithm::Recursive))
            .unwrap()
            .map(|s| s.cost().value())
            .collect::<Vec<_>>();
        assert_eq!(before, vec![2.0, 3.0, 3.0, 4.0]);

        graph.set_decision_cost(au, 0.0).unwrap();
        graph.bottom_up();
        let after = AnyK::new(&graph, &EnumerationConfig::new(Algorithm::PartPlus))
            .unwrap()
            .map(|s| s.cost().value())
            .collect::<Vec<_>>();
        assert_eq!(after, vec![1.0, 2.0, 2.0, 3.0]);
        assert_eq!(graph[graph[DecisionId(3)].set()].len(), 2);
    }
}

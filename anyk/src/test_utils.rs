use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;

use crate::config::{Algorithm, EnumerationConfig, QueueKind, SuccessorKind};
use crate::graph::{DpGraph, NodeId, StageLayout, StageTree};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every algorithm with every successor order and queue it can use.
pub(crate) fn all_configs() -> Vec<EnumerationConfig> {
    let mut configs = vec![];
    for algorithm in Algorithm::iter() {
        let kinds = if algorithm.uses_successors() {
            SuccessorKind::iter().collect::<Vec<_>>()
        } else {
            vec![SuccessorKind::Lazy]
        };
        for kind in kinds {
            for queue in QueueKind::iter() {
                for lazy_init in [true, false] {
                    configs.push(
                        EnumerationConfig::new(algorithm)
                            .with_successors(kind)
                            .with_queue(queue)
                            .with_lazy_init(lazy_init)
                            .with_seed(17),
                    );
                }
            }
        }
    }
    configs
}

/// A non-empty random subset of `nodes`.
fn pick(rng: &mut StdRng, nodes: &[NodeId]) -> Vec<NodeId> {
    let count = rng.random_range(1..=nodes.len());
    let mut picked = nodes.to_vec();
    picked.shuffle(rng);
    picked.truncate(count);
    picked.sort();
    picked
}

/// Small integer costs, so that ties are common and sums are exact.
fn cost(rng: &mut StdRng) -> f64 {
    rng.random_range(0..5) as f64
}

/// A chain of `stages` layers of `width` nodes. Some nodes end the chain early and some share
/// their decision set with a neighbour. Every reachable node has a solution.
pub(crate) fn random_chain(seed: u64, stages: usize, width: usize) -> DpGraph<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = DpGraph::new(StageLayout::Chain);
    let mut layers: Vec<Vec<NodeId>> = vec![];
    let mut label = 0;
    for stage in 1..=stages {
        let layer = (0..width)
            .map(|_| {
                label += 1;
                let early_end = stage > 1 && rng.random_ratio(1, 6);
                if stage == stages || early_end {
                    graph.add_terminal(label)
                } else {
                    graph.add_node(label, 1)
                }
            })
            .collect();
        layers.push(layer);
    }

    let start = graph.start();
    for target in pick(&mut rng, &layers[0]) {
        graph.add_decision(start, 0, target, cost(&mut rng)).unwrap();
    }
    for stage in 0..stages - 1 {
        let mut owner: Option<NodeId> = None;
        for node in layers[stage].clone() {
            if graph[node].is_terminal() {
                continue;
            }
            match owner {
                Some(other) if rng.random_ratio(1, 4) => {
                    graph.share_decisions(node, 0, other).unwrap();
                }
                _ => {
                    for target in pick(&mut rng, &layers[stage + 1]) {
                        graph.add_decision(node, 0, target, cost(&mut rng)).unwrap();
                    }
                    owner = Some(node);
                }
            }
        }
    }
    graph
}

/// A tree-shaped instance over the stage tree given by `parents`, `width` nodes per stage.
pub(crate) fn random_tree(seed: u64, parents: &[usize], width: usize) -> DpGraph<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let tree = StageTree::new(parents).unwrap();
    let mut graph = DpGraph::new(StageLayout::Tree(tree.clone()));
    let mut layers: Vec<Vec<NodeId>> = vec![vec![graph.start()]];
    let mut label = 0;
    for stage in 1..tree.stage_count() {
        let branches = tree.children(stage).len();
        let layer = (0..width)
            .map(|_| {
                label += 1;
                if branches == 0 {
                    graph.add_terminal(label)
                } else {
                    graph.add_node(label, branches)
                }
            })
            .collect();
        layers.push(layer);
    }

    for stage in 0..tree.stage_count() {
        for (branch, child) in tree.children(stage).iter().enumerate() {
            let mut owner: Option<NodeId> = None;
            for node in layers[stage].clone() {
                match owner {
                    Some(other) if rng.random_ratio(1, 4) => {
                        graph.share_decisions(node, branch, other).unwrap();
                    }
                    _ => {
                        for target in pick(&mut rng, &layers[*child]) {
                            graph
                                .add_decision(node, branch, target, cost(&mut rng))
                                .unwrap();
                        }
                        owner = Some(node);
                    }
                }
            }
        }
    }
    graph
}

use crate::utils::{all_configs, init_logger, TestCaseRunner};
use anyk::{AnyK, Cost, DecisionId, DpGraph, EnumerationConfig, NodeId};
use anyk_join::{StarEquijoinQuery, Tuple};
use maplit::hashmap;
use std::collections::HashMap;
use std::path::PathBuf;

mod utils;

#[test]
fn test_tree_queries() {
    init_logger();
    let runner = TestCaseRunner {
        paths: vec![
            PathBuf::from("resources/tree.yaml"),
            PathBuf::from("resources/star.yaml"),
        ],
        configs: all_configs(),
    };

    runner.run();
}

fn find_child(graph: &DpGraph<Tuple>, node: NodeId, branch: usize, label: &str) -> DecisionId {
    let set = graph.branch_of(node, branch).unwrap();
    graph[set]
        .decisions()
        .iter()
        .copied()
        .find(|d| graph.payload(graph[*d].target()).unwrap().to_string() == label)
        .unwrap()
}

fn costs(graph: &DpGraph<Tuple>) -> Vec<f64> {
    AnyK::new(graph, &EnumerationConfig::from_name("Take2Plus").unwrap())
        .unwrap()
        .map(|s| s.cost().value())
        .collect()
}

#[test]
fn test_best_star_answer() {
    let mut graph = StarEquijoinQuery::example().build().unwrap();
    graph.bottom_up();

    let best = AnyK::new(&graph, &EnumerationConfig::default())
        .unwrap()
        .next()
        .unwrap();
    let by_relation = best
        .to_ordered_tuples(&graph)
        .into_iter()
        .map(|t| (t.relation().to_string(), t.to_string()))
        .collect::<HashMap<_, _>>();
    assert_eq!(
        by_relation,
        hashmap! {
            "R1".to_string() => "R1(4, 5, 6)".to_string(),
            "R2".to_string() => "R2(4, 2)".to_string(),
            "R3".to_string() => "R3(5, 1)".to_string(),
            "R4".to_string() => "R4(6, 2)".to_string(),
        }
    );
}

#[test]
fn test_shared_set_edit() {
    init_logger();
    let mut graph = StarEquijoinQuery::example().build().unwrap();
    graph.bottom_up();

    let start = graph.start();
    let center = graph[find_child(&graph, start, 0, "R1(4, 5, 6)")].target();
    let other = graph[find_child(&graph, start, 0, "R1(4, 0, 0)")].target();
    assert_eq!(graph[center].branch(0), graph[other].branch(0));

    let edited = find_child(&graph, other, 0, "R2(4, 2)");
    graph.set_decision_cost(edited, 1000.0).unwrap();
    assert!(graph.ensure_solved().is_err());

    graph.bottom_up();
    assert_eq!(graph[center].opt_cost(), Cost::from(102.0));
    assert_eq!(
        costs(&graph),
        vec![20.0, 21.0, 30.0, 31.0, 103.0, 200.0, 1003.0, 1100.0]
    );
}

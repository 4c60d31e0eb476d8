use std::rc::Rc;

use crate::graph::{DecisionId, DecisionSetId, DpGraph, NodeId, StageLayout, StageTree};
use crate::solution::Prefix;

/// Knows where the decision for the next stage of a growing prefix comes from.
pub(crate) enum Cursor<'a> {
    /// The node reached last.
    Chain(NodeId),
    /// Every node reached so far, in stage order.
    Tree {
        tree: &'a StageTree,
        nodes: Vec<NodeId>,
    },
}

impl<'a> Cursor<'a> {
    pub fn at<P>(graph: &'a DpGraph<P>, prefix: &Prefix) -> Self {
        match graph.layout() {
            StageLayout::Chain => Cursor::Chain(graph[prefix.decision()].target()),
            StageLayout::Tree(tree) => Cursor::Tree {
                tree,
                nodes: prefix.nodes(graph),
            },
        }
    }

    /// Decision set of stage `len + 1`, `None` once the prefix is complete.
    pub fn next_set<P>(&self, graph: &DpGraph<P>, len: usize) -> Option<DecisionSetId> {
        match self {
            Cursor::Chain(node) => {
                let node = &graph[*node];
                if node.is_terminal() {
                    None
                } else {
                    node.branch(0)
                }
            }
            Cursor::Tree { tree, nodes } => {
                let stage = len + 1;
                if stage >= tree.stage_count() {
                    return None;
                }
                let parent = match tree.parent_stage(stage) {
                    0 => graph.start(),
                    p => nodes[p - 1],
                };
                graph[parent].branch(tree.branch_index(stage))
            }
        }
    }

    pub fn advance<P>(&mut self, graph: &DpGraph<P>, decision: DecisionId) {
        match self {
            Cursor::Chain(node) => *node = graph[decision].target(),
            Cursor::Tree { nodes, .. } => nodes.push(graph[decision].target()),
        }
    }
}

/// Completes `prefix` with the best decision of every remaining stage.
pub(crate) fn expand_optimally<P>(graph: &DpGraph<P>, prefix: Rc<Prefix>) -> Rc<Prefix> {
    let mut cursor = Cursor::at(graph, &prefix);
    let mut current = prefix;
    while let Some(set) = cursor.next_set(graph, current.len()) {
        let best = graph.best_decision(set);
        cursor.advance(graph, best);
        current = current.extend(graph, best);
    }
    current
}

/// Completes `prefix` with the first listed decision of every remaining stage. The flag is
/// `false` if an empty decision set stopped the walk early.
pub(crate) fn expand_first<P>(graph: &DpGraph<P>, prefix: Rc<Prefix>) -> (Rc<Prefix>, bool) {
    let mut cursor = Cursor::at(graph, &prefix);
    let mut current = prefix;
    while let Some(set) = cursor.next_set(graph, current.len()) {
        match graph[set].decisions().first() {
            Some(first) => {
                cursor.advance(graph, *first);
                current = current.extend(graph, *first);
            }
            None => return (current, false),
        }
    }
    (current, true)
}

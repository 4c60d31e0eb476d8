use std::collections::HashSet;

use petgraph::visit::{DfsPostOrder, GraphBase, IntoNeighbors, Visitable};

use crate::graph::{DecisionId, DpGraph, NodeId};

impl<P> GraphBase for DpGraph<P> {
    type EdgeId = DecisionId;
    type NodeId = NodeId;
}

impl<P> Visitable for DpGraph<P> {
    type Map = HashSet<NodeId>;

    fn visit_map(&self) -> Self::Map {
        HashSet::with_capacity(self.node_count())
    }

    fn reset_map(&self, map: &mut Self::Map) {
        map.clear();
    }
}

impl<'a, P> IntoNeighbors for &'a DpGraph<P> {
    type Neighbors = std::vec::IntoIter<NodeId>;

    fn neighbors(self, a: NodeId) -> Self::Neighbors {
        self.children(a).collect::<Vec<_>>().into_iter()
    }
}

impl<P> DpGraph<P> {
    /// Nodes reachable from the start node, every node after all of its children.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut dfs = DfsPostOrder::new(self, self.start());
        let mut order = Vec::with_capacity(self.node_count());
        while let Some(node) = dfs.next(self) {
            order.push(node);
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{DpGraph, StageLayout};

    #[test]
    fn test_postorder_visits_shared_children_once() {
        let mut graph = DpGraph::<u32>::new(StageLayout::Chain);
        let a = graph.add_node(1, 1);
        let b = graph.add_node(2, 1);
        let t = graph.add_terminal(3);
        let _unreachable = graph.add_terminal(4);
        let start = graph.start();
        graph.add_decision(start, 0, a, 1.0).unwrap();
        graph.add_decision(start, 0, b, 1.0).unwrap();
        graph.add_decision(a, 0, t, 1.0).unwrap();
        graph.share_decisions(b, 0, a).unwrap();

        let order = graph.postorder();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], t);
        assert_eq!(*order.last().unwrap(), start);
    }
}

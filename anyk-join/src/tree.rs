use std::collections::{HashMap, VecDeque};

use anyhow::ensure;
use anyk::{Cost, DpGraph, NodeId, StageLayout, StageTree};
use log::{debug, info};

use crate::error::JoinError;
use crate::path::{relation, JoinCondition};
use crate::relation::{JoinKey, Relation, Tuple};
use crate::AnyKResult;

/// Join of a relation with its parent in the join tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeJoin {
    pub parent: usize,
    pub condition: JoinCondition,
}

/// Relations arranged in a rooted tree, each equi-joined with its parent.
///
/// Relations are numbered in the order they were added and the root is relation 0. Stages of
/// the built graph follow a breadth-first walk of the tree instead, see
/// [`TreeEquijoinQuery::stage_order`].
#[derive(Debug, Clone)]
pub struct TreeEquijoinQuery {
    relations: Vec<Relation>,
    joins: Vec<TreeJoin>,
}

impl TreeEquijoinQuery {
    pub fn new(root: Relation) -> Self {
        Self {
            relations: vec![root],
            joins: vec![],
        }
    }

    /// Adds `relation` as a child of relation `parent`, joining `parent_attrs` with `child_attrs`.
    pub fn join(
        mut self,
        parent: usize,
        relation: Relation,
        parent_attrs: &[usize],
        child_attrs: &[usize],
    ) -> AnyKResult<Self> {
        let Some(parent_relation) = self.relations.get(parent) else {
            return Err(JoinError::InvalidShape(format!(
                "parent {parent} of {} does not exist",
                relation.name()
            ))
            .into());
        };
        ensure!(
            parent_attrs.len() == child_attrs.len(),
            JoinError::InvalidShape(format!(
                "join of {} lists {} parent and {} child attributes",
                relation.name(),
                parent_attrs.len(),
                child_attrs.len()
            ))
        );
        parent_relation.check_attributes(parent_attrs)?;
        relation.check_attributes(child_attrs)?;

        self.joins.push(TreeJoin {
            parent,
            condition: JoinCondition::new(parent_attrs.to_vec(), child_attrs.to_vec()),
        });
        self.relations.push(relation);
        Ok(self)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Join of relation `idx` with its parent, `None` for the root.
    pub fn join_of(&self, idx: usize) -> Option<&TreeJoin> {
        idx.checked_sub(1).and_then(|j| self.joins.get(j))
    }

    /// Relation indices in breadth-first order, children in the order they were added.
    /// Relation `stage_order()[s - 1]` makes up stage `s`.
    pub fn stage_order(&self) -> Vec<usize> {
        let mut children = vec![vec![]; self.relations.len()];
        for (idx, join) in self.joins.iter().enumerate() {
            children[join.parent].push(idx + 1);
        }
        let mut order = Vec::with_capacity(self.relations.len());
        let mut queue = VecDeque::from([0]);
        while let Some(relation) = queue.pop_front() {
            order.push(relation);
            queue.extend(children[relation].iter().copied());
        }
        order
    }

    pub fn stage_tree(&self) -> AnyKResult<StageTree> {
        let order = self.stage_order();
        let mut stage_of = vec![0; self.relations.len()];
        for (idx, relation) in order.iter().enumerate() {
            stage_of[*relation] = idx + 1;
        }
        let parents = order
            .iter()
            .map(|r| self.join_of(*r).map_or(0, |j| stage_of[j.parent]))
            .collect::<Vec<_>>();
        StageTree::new(&parents)
    }

    /// Builds the DP graph over [`TreeEquijoinQuery::stage_tree`].
    ///
    /// A node gets one branch per child relation. Tuples whose join key for a branch is equal
    /// share that branch's decision set. Tuples missing a partner in any child relation are left
    /// out.
    pub fn build(&self) -> AnyKResult<DpGraph<Tuple>> {
        let order = self.stage_order();
        let tree = self.stage_tree()?;
        // Join of the relation at a non-root stage with its parent.
        let join_at = |stage: usize| &self.joins[order[stage - 1] - 1].condition;
        let mut graph = DpGraph::new(StageLayout::Tree(tree.clone()));
        let mut survivors: Vec<Vec<(NodeId, &Tuple)>> = vec![vec![]; tree.stage_count()];

        for stage in (1..tree.stage_count()).rev() {
            let children = tree.children(stage);
            let relation = &self.relations[order[stage - 1]];

            let partners = children
                .iter()
                .map(|child| {
                    let attrs = &join_at(*child).right;
                    let mut by_key: HashMap<JoinKey, Vec<(NodeId, Cost)>> = HashMap::new();
                    for (node, tuple) in &survivors[*child] {
                        by_key
                            .entry(tuple.key(attrs))
                            .or_default()
                            .push((*node, tuple.cost()));
                    }
                    by_key
                })
                .collect::<Vec<_>>();
            let mut owners: Vec<HashMap<JoinKey, NodeId>> = vec![HashMap::new(); children.len()];

            let mut kept = vec![];
            for tuple in relation.tuples() {
                if children.is_empty() {
                    kept.push((graph.add_terminal(tuple.clone()), tuple));
                    continue;
                }
                let node = graph.add_node(tuple.clone(), children.len());
                let mut complete = true;
                for (branch, child) in children.iter().enumerate() {
                    let key = tuple.key(&join_at(*child).left);
                    match owners[branch].get(&key) {
                        Some(owner) => graph.share_decisions(node, branch, *owner)?,
                        None => {
                            for (target, cost) in partners[branch].get(&key).into_iter().flatten() {
                                graph.add_decision(node, branch, *target, *cost)?;
                            }
                            owners[branch].insert(key, node);
                        }
                    }
                    complete &= !graph[graph.branch_of(node, branch)?].is_empty();
                }
                if complete {
                    kept.push((node, tuple));
                }
            }
            debug!(
                "Stage {stage} ({}): {} of {} tuples joined",
                relation.name(),
                kept.len(),
                relation.tuples().len()
            );
            survivors[stage] = kept;
        }

        let start = graph.start();
        for (node, tuple) in &survivors[1] {
            graph.add_decision(start, 0, *node, tuple.cost())?;
        }
        info!(
            "Built tree DP for {} relations: {} nodes, {} decisions",
            self.relations.len(),
            graph.node_count(),
            graph.decision_count()
        );
        Ok(graph)
    }
}

/// A center relation joined with satellites. Satellite `i` joins center attribute `i` with its own
/// first attribute.
#[derive(Debug, Clone)]
pub struct StarEquijoinQuery {
    center: Relation,
    satellites: Vec<Relation>,
}

impl StarEquijoinQuery {
    pub fn new(center: Relation) -> Self {
        Self {
            center,
            satellites: vec![],
        }
    }

    pub fn with_satellite(mut self, satellite: Relation) -> Self {
        self.satellites.push(satellite);
        self
    }

    pub fn center(&self) -> &Relation {
        &self.center
    }

    pub fn satellites(&self) -> &[Relation] {
        &self.satellites
    }

    pub fn to_tree(&self) -> AnyKResult<TreeEquijoinQuery> {
        ensure!(
            self.center.arity() >= self.satellites.len(),
            JoinError::InvalidShape(format!(
                "center {} has {} attributes for {} satellites",
                self.center.name(),
                self.center.arity(),
                self.satellites.len()
            ))
        );
        let mut tree = TreeEquijoinQuery::new(self.center.clone());
        for (idx, satellite) in self.satellites.iter().enumerate() {
            tree = tree.join(0, satellite.clone(), &[idx], &[0])?;
        }
        Ok(tree)
    }

    pub fn build(&self) -> AnyKResult<DpGraph<Tuple>> {
        self.to_tree()?.build()
    }

    /// A center with three satellites. Two center tuples have no full match.
    ///
    /// Ranked answers: 4, 20, 21, 30, 31, 101, 103 and 200.
    pub fn example() -> Self {
        let r1 = relation(
            "R1",
            &["A1", "A2", "A3"],
            &[
                (&[1, 2, 3], 10.0),
                (&[7, 8, 9], 5.0),
                (&[4, 0, 0], 100.0),
                (&[4, 5, 6], 1.0),
            ],
        );
        let r2 = relation(
            "R2",
            &["A1", "B2"],
            &[(&[1, 1], 10.0), (&[4, 2], 1.0), (&[7, 3], 2.0), (&[4, 0], 100.0)],
        );
        let r3 = relation(
            "R3",
            &["A2", "B3"],
            &[(&[5, 1], 1.0), (&[8, 2], 3.0), (&[8, 3], 4.0), (&[0, 0], 0.0)],
        );
        let r4 = relation(
            "R4",
            &["A3", "B4"],
            &[(&[9, 1], 10.0), (&[6, 2], 1.0), (&[9, 3], 20.0), (&[0, 0], 0.0)],
        );
        Self::new(r1)
            .with_satellite(r2)
            .with_satellite(r3)
            .with_satellite(r4)
    }
}

#[cfg(test)]
mod tests {
    use anyk::{AnyK, EnumerationConfig};

    use super::*;
    use crate::path::PathEquijoinQuery;

    #[test]
    fn test_star_example() {
        let mut graph = StarEquijoinQuery::example().build().unwrap();
        assert_eq!(graph.bottom_up(), Cost::from(4.0));
        assert_eq!(graph.count_solutions().unwrap(), 8);

        let costs = AnyK::new(&graph, &EnumerationConfig::default())
            .unwrap()
            .map(|s| s.cost().value())
            .collect::<Vec<_>>();
        assert_eq!(costs, vec![4.0, 20.0, 21.0, 30.0, 31.0, 101.0, 103.0, 200.0]);
    }

    #[test]
    fn test_star_needs_enough_center_attributes() {
        let center = relation("R", &["A"], &[]);
        let query = StarEquijoinQuery::new(center)
            .with_satellite(relation("S", &["A"], &[]))
            .with_satellite(relation("T", &["A"], &[]));
        let err = query.to_tree().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JoinError>(),
            Some(JoinError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_stage_tree() {
        let query = TreeEquijoinQuery::new(relation("R1", &["A", "B"], &[]))
            .join(0, relation("R2", &["A", "C"], &[]), &[0], &[0])
            .unwrap()
            .join(0, relation("R3", &["B"], &[]), &[1], &[0])
            .unwrap()
            .join(1, relation("R4", &["C"], &[]), &[1], &[0])
            .unwrap();
        let tree = query.stage_tree().unwrap();
        assert_eq!(query.stage_order(), vec![0, 1, 2, 3]);
        assert_eq!(tree.children(1), &[2, 3]);
        assert_eq!(tree.children(2), &[4]);
        assert_eq!(query.join_of(3).map(|j| j.parent), Some(1));
        assert!(query.join_of(0).is_none());

        assert!(query
            .clone()
            .join(7, relation("R5", &["A"], &[]), &[0], &[0])
            .is_err());
    }

    #[test]
    fn test_stages_are_breadth_first() {
        let query = TreeEquijoinQuery::new(relation("R1", &["A", "B"], &[(&[1, 2], 1.0)]))
            .join(0, relation("R2", &["A", "C"], &[(&[1, 3], 1.0)]), &[0], &[0])
            .unwrap()
            .join(1, relation("R3", &["C"], &[(&[3], 1.0)]), &[1], &[0])
            .unwrap()
            .join(0, relation("R4", &["B"], &[(&[2], 1.0)]), &[1], &[0])
            .unwrap();
        assert_eq!(query.stage_order(), vec![0, 1, 3, 2]);
        let tree = query.stage_tree().unwrap();
        assert_eq!(tree.children(1), &[2, 3]);
        assert_eq!(tree.children(2), &[4]);

        let mut graph = query.build().unwrap();
        assert_eq!(graph.bottom_up(), Cost::from(4.0));
        let answer = AnyK::new(&graph, &EnumerationConfig::default())
            .unwrap()
            .next()
            .unwrap()
            .to_ordered_tuples(&graph)
            .into_iter()
            .map(|t| t.relation().to_string())
            .collect::<Vec<_>>();
        assert_eq!(answer, vec!["R1", "R2", "R4", "R3"]);
    }

    #[test]
    fn test_path_as_tree_matches_path() {
        let path = PathEquijoinQuery::example();
        let mut chain = path.build().unwrap();
        let mut tree = path.to_tree().unwrap().build().unwrap();
        assert_eq!(chain.bottom_up(), tree.bottom_up());
        assert_eq!(
            chain.count_solutions().unwrap(),
            tree.count_solutions().unwrap()
        );

        let costs = |graph: &DpGraph<Tuple>| {
            AnyK::new(graph, &EnumerationConfig::default())
                .unwrap()
                .map(|s| s.cost().value())
                .collect::<Vec<_>>()
        };
        assert_eq!(costs(&chain), vec![20.0, 40.0, 50.0]);
        assert_eq!(costs(&tree), vec![20.0, 40.0, 50.0]);
    }
}

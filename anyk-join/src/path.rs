use std::collections::{HashMap, HashSet};

use anyhow::ensure;
use anyk::{Cost, DpGraph, NodeId, StageLayout};
use derive_more::Constructor;
use log::info;

use crate::error::JoinError;
use crate::relation::{JoinKey, Relation, Tuple};
use crate::tree::TreeEquijoinQuery;
use crate::AnyKResult;

/// Attributes of the left and right relation that must be equal.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct JoinCondition {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// A chain of relations, each equi-joined with the next one.
#[derive(Debug, Clone)]
pub struct PathEquijoinQuery {
    relations: Vec<Relation>,
    conditions: Vec<JoinCondition>,
}

impl PathEquijoinQuery {
    pub fn new(first: Relation) -> Self {
        Self {
            relations: vec![first],
            conditions: vec![],
        }
    }

    /// Appends `relation`, joining `left` of the current last relation with its `right`.
    pub fn join(mut self, relation: Relation, left: &[usize], right: &[usize]) -> AnyKResult<Self> {
        ensure!(
            left.len() == right.len(),
            JoinError::InvalidShape(format!(
                "join of {} lists {} left and {} right attributes",
                relation.name(),
                left.len(),
                right.len()
            ))
        );
        if let Some(last) = self.relations.last() {
            last.check_attributes(left)?;
        }
        relation.check_attributes(right)?;
        self.conditions
            .push(JoinCondition::new(left.to_vec(), right.to_vec()));
        self.relations.push(relation);
        Ok(self)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn conditions(&self) -> &[JoinCondition] {
        &self.conditions
    }

    /// Whether the query has at least one answer, found with a semi-join pass from the last
    /// relation to the first.
    pub fn is_satisfiable(&self) -> bool {
        let Some(last) = self.relations.last() else {
            return false;
        };
        let mut reachable = last.tuples().iter().collect::<Vec<_>>();
        for idx in (0..self.conditions.len()).rev() {
            let condition = &self.conditions[idx];
            let keys = reachable
                .iter()
                .map(|t| t.key(&condition.right))
                .collect::<HashSet<_>>();
            reachable = self.relations[idx]
                .tuples()
                .iter()
                .filter(|t| keys.contains(&t.key(&condition.left)))
                .collect();
            if reachable.is_empty() {
                return false;
            }
        }
        !reachable.is_empty()
    }

    /// Builds the DP graph, one stage per relation.
    ///
    /// Tuples with no joining partner are left out. Tuples of a relation with the same join key
    /// share one decision set. A decision costs the tuple it leads to.
    pub fn build(&self) -> AnyKResult<DpGraph<Tuple>> {
        let mut graph = DpGraph::new(StageLayout::Chain);
        let Some(last) = self.relations.last() else {
            return Ok(graph);
        };
        let mut stage = last
            .tuples()
            .iter()
            .map(|t| (graph.add_terminal(t.clone()), t))
            .collect::<Vec<_>>();

        for idx in (0..self.conditions.len()).rev() {
            let condition = &self.conditions[idx];
            let mut right: HashMap<JoinKey, Vec<(NodeId, Cost)>> = HashMap::new();
            for (node, tuple) in &stage {
                right
                    .entry(tuple.key(&condition.right))
                    .or_default()
                    .push((*node, tuple.cost()));
            }

            let mut owners: HashMap<JoinKey, NodeId> = HashMap::new();
            let mut next_stage = vec![];
            for tuple in self.relations[idx].tuples() {
                let key = tuple.key(&condition.left);
                let node = graph.add_node(tuple.clone(), 1);
                match owners.get(&key) {
                    Some(owner) => graph.share_decisions(node, 0, *owner)?,
                    None => {
                        for (child, cost) in right.get(&key).into_iter().flatten() {
                            graph.add_decision(node, 0, *child, *cost)?;
                        }
                        owners.insert(key, node);
                    }
                }
                if !graph[graph.branch_of(node, 0)?].is_empty() {
                    next_stage.push((node, tuple));
                }
            }
            stage = next_stage;
        }

        let start = graph.start();
        for (node, tuple) in &stage {
            graph.add_decision(start, 0, *node, tuple.cost())?;
        }
        info!(
            "Built path DP for {} relations: {} nodes, {} decisions",
            self.relations.len(),
            graph.node_count(),
            graph.decision_count()
        );
        Ok(graph)
    }

    /// The same query as a tree whose stages form a path.
    pub fn to_tree(&self) -> AnyKResult<TreeEquijoinQuery> {
        let mut relations = self.relations.iter();
        let Some(first) = relations.next() else {
            return Err(JoinError::InvalidShape("empty path query".to_string()).into());
        };
        let mut tree = TreeEquijoinQuery::new(first.clone());
        for (idx, (relation, condition)) in relations.zip(&self.conditions).enumerate() {
            tree = tree.join(idx, relation.clone(), &condition.left, &condition.right)?;
        }
        Ok(tree)
    }

    /// Four relations joined on single attributes, except the last join which uses two.
    ///
    /// Ranked answers: 20, 40 and 50.
    pub fn example() -> Self {
        let r1 = relation("R1", &["A1", "A2", "A3"], &[(&[1, 1, 1], 10.0), (&[2, 2, 2], 1.0), (&[3, 3, 3], 5.0)]);
        let r2 = relation("R2", &["A3", "A4"], &[(&[1, 5], 10.0), (&[3, 2], 5.0)]);
        let r3 = relation(
            "R3",
            &["A4", "A5", "A6", "A7"],
            &[(&[2, 1, 3, 1], 5.0), (&[2, 2, 3, 1], 35.0), (&[5, 5, 3, 2], 10.0)],
        );
        let r4 = relation("R4", &["A6", "A7"], &[(&[3, 1], 5.0), (&[3, 2], 10.0), (&[7, 7], 1.0)]);

        Self {
            relations: vec![r1, r2, r3, r4],
            conditions: vec![
                JoinCondition::new(vec![2], vec![0]),
                JoinCondition::new(vec![1], vec![0]),
                JoinCondition::new(vec![2, 3], vec![0, 1]),
            ],
        }
    }
}

/// A relation from literal rows. Only used for the built-in examples, whose arities are fixed.
pub(crate) fn relation(name: &str, attributes: &[&str], rows: &[(&[i64], f64)]) -> Relation {
    let mut relation = Relation::new(name, attributes);
    for (values, cost) in rows {
        if let Err(e) = relation.insert(values, *cost) {
            panic!("malformed example relation {name}: {e}");
        }
    }
    relation
}

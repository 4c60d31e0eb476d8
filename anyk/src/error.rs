use thiserror::Error;

use crate::graph::{DecisionId, NodeId};

pub type AnyKResult<T> = anyhow::Result<T>;

/// Contract violations detected while building or preparing a DP graph.
///
/// Exhaustion of an enumerator is never reported through this type, it is the `None` returned
/// by `get_next`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("decision {0} does not exist")]
    UnknownDecision(DecisionId),
    #[error("node {node} has {branches} branches, branch {branch} requested")]
    BranchOutOfRange {
        node: NodeId,
        branch: usize,
        branches: usize,
    },
    #[error("bottom-up pass has not been run on this graph")]
    NotSolved,
    #[error("invalid stage tree: {0}")]
    InvalidStageTree(String),
    #[error("solution count overflows u128")]
    CountOverflow,
}

use anyhow::bail;
use enum_as_inner::EnumAsInner;

use crate::error::{AnyKResult, GraphError};

/// How the stages of a solution hang together.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum StageLayout {
    /// Every non-terminal node has one branch and a solution ends at a terminal node.
    Chain,
    /// Stages form a rooted tree, each node has one branch per child stage.
    Tree(StageTree),
}

impl StageLayout {
    /// Whether the decisions after position `stage` only depend on the node reached at `stage`.
    pub fn is_independent(&self, stage: usize) -> bool {
        match self {
            StageLayout::Chain => true,
            StageLayout::Tree(tree) => tree.is_independent(stage),
        }
    }
}

/// Stage tree of a tree-shaped problem, stages numbered in a breadth-first order.
///
/// Stage 0 is the synthetic start stage and has exactly one child, stage 1. Every other stage has
/// a parent with a smaller number. A node at stage `p` keeps its branches in the order of `p`'s
/// child stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTree {
    parents: Vec<usize>,
    branch_index: Vec<usize>,
    children: Vec<Vec<usize>>,
    independent: Vec<bool>,
}

impl StageTree {
    /// Builds a stage tree from the parent of every stage `1..=parents.len()`, in stage order.
    pub fn new(parents: &[usize]) -> AnyKResult<Self> {
        if parents.is_empty() {
            bail!(GraphError::InvalidStageTree("no stages".to_string()));
        }
        if parents[0] != 0 {
            bail!(GraphError::InvalidStageTree(format!(
                "stage 1 must hang off the start stage, found parent {}",
                parents[0]
            )));
        }

        let stages = parents.len() + 1;
        let mut all_parents = Vec::with_capacity(stages);
        all_parents.push(0);
        let mut branch_index = vec![0; stages];
        let mut children = vec![vec![]; stages];

        for (idx, parent) in parents.iter().copied().enumerate() {
            let stage = idx + 1;
            if stage > 1 && (parent == 0 || parent >= stage) {
                bail!(GraphError::InvalidStageTree(format!(
                    "stage {stage} has parent {parent}, expected one in 1..{stage}"
                )));
            }
            branch_index[stage] = children[parent].len();
            children[parent].push(stage);
            all_parents.push(parent);
        }

        // Stage s is independent if no later stage hangs off a stage before s.
        let mut independent = vec![true; stages];
        let mut min_later_parent = usize::MAX;
        for stage in (1..stages).rev() {
            independent[stage] = min_later_parent >= stage;
            min_later_parent = min_later_parent.min(all_parents[stage]);
        }

        Ok(Self {
            parents: all_parents,
            branch_index,
            children,
            independent,
        })
    }

    /// A path of `len` stages, each one the child of the previous.
    pub fn path(len: usize) -> AnyKResult<Self> {
        let parents = (0..len).collect::<Vec<_>>();
        Self::new(&parents)
    }

    /// A root stage with `satellites` children.
    pub fn star(satellites: usize) -> AnyKResult<Self> {
        let parents = std::iter::once(0)
            .chain(std::iter::repeat(1).take(satellites))
            .collect::<Vec<_>>();
        Self::new(&parents)
    }

    /// Number of stages, including the start stage.
    pub fn stage_count(&self) -> usize {
        self.parents.len()
    }

    pub fn parent_stage(&self, stage: usize) -> usize {
        self.parents[stage]
    }

    /// Branch of the parent's nodes that leads into `stage`.
    pub fn branch_index(&self, stage: usize) -> usize {
        self.branch_index[stage]
    }

    pub fn children(&self, stage: usize) -> &[usize] {
        &self.children[stage]
    }

    pub fn is_independent(&self, stage: usize) -> bool {
        self.independent.get(stage).copied().unwrap_or(false)
    }
}

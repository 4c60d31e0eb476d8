//! Enumeration settings: which algorithm runs, how successors are ordered and which priority
//! queue backs the candidates.

use std::collections::HashMap;

use anyhow::anyhow;
use enumset::{enum_set, EnumSet, EnumSetType};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::AnyKResult;

#[derive(EnumSetType, Debug, Hash, AsRefStr, Display, EnumString, EnumIter)]
pub enum Algorithm {
    /// Lawler style partitioning over the solution space.
    Part,
    /// Partitioning that reuses the ranked suffixes found below independent stages.
    PartPlus,
    /// Recursive enumeration over subtree solutions.
    Recursive,
    /// Every solution, in no particular order.
    Unranked,
    /// Materializes every solution up front.
    Batch,
    /// Materializes every solution up front and sorts them.
    BatchSorting,
}

/// Algorithms that need the optimal costs of the bottom-up pass.
const NEEDS_OPTIMUM: EnumSet<Algorithm> =
    enum_set!(Algorithm::Part | Algorithm::PartPlus | Algorithm::Recursive);

const RANKED: EnumSet<Algorithm> = enum_set!(
    Algorithm::Part | Algorithm::PartPlus | Algorithm::Recursive | Algorithm::BatchSorting
);

impl Algorithm {
    pub fn needs_optimum(self) -> bool {
        NEEDS_OPTIMUM.contains(self)
    }

    /// Whether solutions come out in nondecreasing cost order.
    pub fn is_ranked(self) -> bool {
        RANKED.contains(self)
    }

    /// Whether the algorithm consults a [`SuccessorKind`].
    pub fn uses_successors(self) -> bool {
        matches!(self, Algorithm::Part | Algorithm::PartPlus)
    }
}

/// Partial order kept over each decision set to produce Lawler successors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
pub enum SuccessorKind {
    /// Fully sorted on first use.
    Eager,
    /// A binary heap, popped one decision per request.
    Lazy,
    /// Incremental quicksort.
    Quick,
    /// The best decision has every other decision as successor.
    All,
    /// Heap order, every decision has at most two successors.
    Take2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
pub enum QueueKind {
    Binary,
    Pairing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumerationConfig {
    pub algorithm: Algorithm,
    pub successors: SuccessorKind,
    pub queue: QueueKind,
    /// Build successor orders on first use instead of for every set up front.
    pub lazy_init: bool,
    /// Seed of the pivot choices made by [`SuccessorKind::Quick`].
    pub seed: u64,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Part,
            successors: SuccessorKind::Lazy,
            queue: QueueKind::Binary,
            lazy_init: true,
            seed: 0,
        }
    }
}

lazy_static! {
    static ref NAMED_CONFIGS: HashMap<String, (Algorithm, SuccessorKind)> = {
        let mut configs = HashMap::new();
        for kind in SuccessorKind::iter() {
            configs.insert(kind.to_string(), (Algorithm::Part, kind));
            configs.insert(format!("{}Plus", kind), (Algorithm::PartPlus, kind));
        }
        for algorithm in [
            Algorithm::Recursive,
            Algorithm::Unranked,
            Algorithm::Batch,
            Algorithm::BatchSorting,
        ] {
            configs.insert(algorithm.to_string(), (algorithm, SuccessorKind::Lazy));
        }
        configs
    };
}

impl EnumerationConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Looks up a configuration by its short name, e.g. `"Take2"` (Part with Take2 successors),
    /// `"QuickPlus"` (PartPlus with Quick successors) or `"Recursive"`.
    pub fn from_name(name: &str) -> AnyKResult<Self> {
        let (algorithm, successors) = NAMED_CONFIGS
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Unknown enumeration algorithm: {}", name))?;
        Ok(Self::new(algorithm).with_successors(successors))
    }

    /// Every name accepted by [`EnumerationConfig::from_name`].
    pub fn names() -> Vec<String> {
        let mut names = NAMED_CONFIGS.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn with_successors(mut self, successors: SuccessorKind) -> Self {
        self.successors = successors;
        self
    }

    pub fn with_queue(mut self, queue: QueueKind) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

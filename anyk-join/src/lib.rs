//! Ranked answers to acyclic equi-joins over weighted relations.
//!
//! Every tuple carries a cost and the cost of a join answer is the sum of the costs of its
//! tuples. A query is compiled into a [`DpGraph`](anyk::DpGraph) with one stage per relation,
//! after which any enumerator of [`anyk`] returns the answers, cheapest first.
//!
//! * [`PathEquijoinQuery`] relations joined in a chain, compiled into a chain graph.
//! * [`TreeEquijoinQuery`] relations joined along a rooted tree.
//! * [`StarEquijoinQuery`] a center relation joined with satellites.
//! * [`UnionAnswers`] ranked answers of several queries at once, without duplicates.

pub mod error;
pub mod path;
pub mod relation;
pub mod tree;
pub mod union;

pub use anyk::error::AnyKResult;
pub use error::JoinError;
pub use path::{JoinCondition, PathEquijoinQuery};
pub use relation::{JoinKey, Relation, Tuple};
pub use tree::{StarEquijoinQuery, TreeEquijoinQuery, TreeJoin};
pub use union::{UnionAnswer, UnionAnswers};

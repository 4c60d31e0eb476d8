use thiserror::Error;

/// Problems with the shape of a join query, raised before any graph is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JoinError {
    #[error("relation {relation} has {expected} attributes, tuple has {found}")]
    ArityMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },
    #[error("relation {relation} has no attribute {attribute}")]
    UnknownAttribute { relation: String, attribute: String },
    #[error("attribute index {index} out of range for relation {relation}")]
    AttributeOutOfRange { relation: String, index: usize },
    #[error("invalid query shape: {0}")]
    InvalidShape(String),
}

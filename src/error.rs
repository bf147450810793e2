//! Error types for stemma.

use thiserror::Error;

/// Result type for stemma operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stemma operations.
///
/// Variants fall into three groups:
///
/// - contract violations ([`InvalidRange`](Error::InvalidRange),
///   [`InvalidSpans`](Error::InvalidSpans), [`DuplicateNode`](Error::DuplicateNode),
///   [`DuplicateSubGraph`](Error::DuplicateSubGraph), [`StoreMismatch`](Error::StoreMismatch),
///   [`SharedGraph`](Error::SharedGraph)) indicate a bug in the caller; they are
///   deterministic and retrying never helps,
/// - [`ConflictingOperation`](Error::ConflictingOperation) signals a genuine
///   data-model violation: two operations claiming authorship of one data item,
/// - not-found lookups ([`NotTraced`](Error::NotTraced),
///   [`NodeNotFound`](Error::NodeNotFound), [`SubGraphNotFound`](Error::SubGraphNotFound))
///   are catchable and distinguish "never recorded" from every other failure.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A range or offset argument violates the call contract.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A span sequence does not describe the text it was given with.
    #[error("invalid spans: {0}")]
    InvalidSpans(String),

    /// Provenance was already recorded for this data item.
    #[error("provenance of data item {uid} was already added")]
    DuplicateNode {
        /// Id of the data item.
        uid: String,
    },

    /// A sub-graph was already attached under this operation.
    #[error("operation {operation_uid} already owns a sub-graph")]
    DuplicateSubGraph {
        /// Id of the composite operation.
        operation_uid: String,
    },

    /// Two different operations claim authorship of the same data item.
    #[error("data item {uid} was derived by operation {recorded}, but operation {claimed} claims it")]
    ConflictingOperation {
        /// Id of the contested data item.
        uid: String,
        /// Operation already recorded for the item.
        recorded: String,
        /// Operation claiming the item now.
        claimed: String,
    },

    /// The sub-tracer does not share the parent tracer's store.
    #[error("sub-tracer must share the parent tracer's store")]
    StoreMismatch,

    /// The sub-tracer wraps the parent tracer's own graph.
    #[error("sub-tracer must not share the parent tracer's graph")]
    SharedGraph,

    /// No provenance was recorded for the requested data item.
    #[error(
        "no provenance info available for data item {uid}; make sure the id is valid and \
         provenance tracking was enabled for the operation that generated it"
    )]
    NotTraced {
        /// Id of the data item.
        uid: String,
    },

    /// Graph-level lookup of a node that was never added.
    #[error("no node for data item {uid}")]
    NodeNotFound {
        /// Id of the data item.
        uid: String,
    },

    /// Graph-level lookup of a sub-graph that was never attached.
    #[error("no sub-graph for operation {operation_uid}")]
    SubGraphNotFound {
        /// Id of the composite operation.
        operation_uid: String,
    },

    /// The lineage graph references an id missing from the store.
    #[error("id {uid} is referenced by the lineage graph but missing from the store")]
    MissingItem {
        /// The dangling id.
        uid: String,
    },
}

impl Error {
    /// Create an invalid range error.
    #[must_use]
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create an invalid spans error.
    #[must_use]
    pub fn invalid_spans(msg: impl Into<String>) -> Self {
        Self::InvalidSpans(msg.into())
    }

    /// Create a duplicate node error.
    #[must_use]
    pub fn duplicate_node(uid: impl Into<String>) -> Self {
        Self::DuplicateNode { uid: uid.into() }
    }

    /// Create a duplicate sub-graph error.
    #[must_use]
    pub fn duplicate_sub_graph(operation_uid: impl Into<String>) -> Self {
        Self::DuplicateSubGraph {
            operation_uid: operation_uid.into(),
        }
    }

    /// Create a conflicting operation error.
    #[must_use]
    pub fn conflicting_operation(uid: &str, recorded: Option<&str>, claimed: &str) -> Self {
        Self::ConflictingOperation {
            uid: uid.to_string(),
            recorded: recorded.unwrap_or("<none>").to_string(),
            claimed: claimed.to_string(),
        }
    }

    /// Create a not-traced error.
    #[must_use]
    pub fn not_traced(uid: impl Into<String>) -> Self {
        Self::NotTraced { uid: uid.into() }
    }

    /// Create a node not found error.
    #[must_use]
    pub fn node_not_found(uid: impl Into<String>) -> Self {
        Self::NodeNotFound { uid: uid.into() }
    }

    /// Create a sub-graph not found error.
    #[must_use]
    pub fn sub_graph_not_found(operation_uid: impl Into<String>) -> Self {
        Self::SubGraphNotFound {
            operation_uid: operation_uid.into(),
        }
    }

    /// Create a missing item error.
    #[must_use]
    pub fn missing_item(uid: impl Into<String>) -> Self {
        Self::MissingItem { uid: uid.into() }
    }
}

//! Provenance lineage for annotation pipelines.
//!
//! Every data item an operation produces (an annotation, an attribute, a
//! segment) can be reported to a [`ProvTracer`] together with the operation
//! that produced it and the items it consumed. The tracer builds an
//! append-only lineage graph over a store of the actual objects, so that
//! downstream tooling can answer "which operation created this item, from
//! what, and what was later derived from it".
//!
//! Composite operations (pipelines) run their inner operations against a
//! private sub-tracer sharing the same [`ProvStore`], then collapse it into
//! the parent with [`ProvTracer::add_prov_from_sub_tracer`]: the parent graph
//! records a single edge from the pipeline's true external inputs to each
//! output, while the full inner derivation stays navigable as a nested
//! sub-tracer, to arbitrary depth.

mod graph;
mod store;
mod tracer;

pub use graph::{ProvGraph, ProvNode};
pub use store::{generate_uid, DataItem, OperationDescription, ProvStore};
pub use tracer::{Prov, ProvTracer};

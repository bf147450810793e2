//! # stemma
//!
//! Span tracking and provenance lineage for text annotation pipelines.
//!
//! Two tightly coupled primitives that every higher-level annotation
//! operation builds on:
//!
//! - a **span algebra** ([`span`]): rewrite text (replace, remove, extract,
//!   insert, move) while continuously tracking how every byte of the new
//!   text maps back to the original source,
//! - a **lineage engine** ([`prov`]): record, for every derived data item,
//!   which operation produced it and from which inputs, with recursive
//!   composition for pipelines made of sub-operations.
//!
//! Together they make transformations reproducible and auditable: any
//! annotation can be traced back to raw input offsets and to the causal
//! chain of operations that derived it. The crate does not interpret
//! annotation semantics, run models or touch files; entity extractors,
//! normalizers and converters are consumers of this core.
//!
//! ## Rewriting text without losing the source
//!
//! ```
//! use stemma::{normalize_spans, replace, SimpleSpan, Span};
//!
//! let text = "Hello, my name is John Doe.";
//! let spans = vec![Span::simple(0, 27)];
//!
//! // redact the name
//! let (text, spans) = replace(text, &spans, &[(18, 26)], &["[NAME]"])?;
//! assert_eq!(text, "Hello, my name is [NAME].");
//!
//! // the synthetic bytes still know where they came from
//! assert_eq!(
//!     spans,
//!     vec![
//!         Span::simple(0, 18),
//!         Span::composite(6, vec![SimpleSpan::new(18, 26)]),
//!         Span::simple(26, 27),
//!     ]
//! );
//! assert_eq!(normalize_spans(&spans[1..2]), vec![SimpleSpan::new(18, 26)]);
//! # Ok::<(), stemma::Error>(())
//! ```
//!
//! ## Tracing lineage
//!
//! Operations report every item they create to a [`ProvTracer`]; composite
//! operations run their inner steps against a private tracer sharing the
//! same store, then collapse it into the parent. See the [`prov`] module
//! docs for the full picture.
//!
//! ## Scope
//!
//! Single-threaded and synchronous by design: every call is a direct
//! in-memory computation, writers are serialized by the caller, and shared
//! state is reference-counted, not locked. Persistence, wire formats and
//! CLIs live in consumer crates.

pub mod error;
pub mod prov;
pub mod span;

pub use error::{Error, Result};
pub use prov::{
    generate_uid, DataItem, OperationDescription, Prov, ProvGraph, ProvNode, ProvStore, ProvTracer,
};
pub use span::{
    bridge_gaps, concatenate, extract, insert, move_range, normalize_spans, remove, replace,
    CompositeSpan, SimpleSpan, Span,
};

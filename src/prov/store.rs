//! Shared store of traced data items and operation descriptions.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything with a stable unique identity that lineage can be recorded for.
///
/// Implemented by consumers for their annotations, attributes, segments and
/// whatever else flows through a pipeline. The core never looks past the id.
pub trait DataItem: fmt::Debug {
    /// Stable unique id of this item.
    fn uid(&self) -> &str;
}

/// Generate a fresh unique id for a data item or operation.
#[must_use]
pub fn generate_uid() -> String {
    Uuid::new_v4().to_string()
}

/// Description of an operation, for later inspection of lineage records.
///
/// Carries an id, a human-readable name and an arbitrary configuration map;
/// none of it is interpreted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescription {
    /// Stable unique id of the operation.
    pub uid: String,
    /// Human-readable operation name (e.g. the implementing type).
    pub name: String,
    /// Configuration the operation ran with.
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

impl OperationDescription {
    /// Create a description with a generated uid and no configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uid: generate_uid(),
            name: name.into(),
            config: HashMap::new(),
        }
    }

    /// Override the generated uid (for deterministic callers).
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Add a configuration entry.
    #[must_use]
    pub fn with_config_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Identity map from uid to the actual data item or operation description.
///
/// One store is created per top-level [`ProvTracer`](crate::ProvTracer) and
/// shared by reference with every sub-tracer, so an id resolves to the same
/// object anywhere in the hierarchy. Writes are insert-if-absent only; the
/// first object stored under an id wins.
#[derive(Debug, Default)]
pub struct ProvStore {
    data_items: HashMap<String, Rc<dyn DataItem>>,
    op_descs: HashMap<String, Rc<OperationDescription>>,
}

impl ProvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a data item under its uid, keeping any existing entry.
    pub fn store_data_item(&mut self, data_item: Rc<dyn DataItem>) {
        self.data_items
            .entry(data_item.uid().to_string())
            .or_insert(data_item);
    }

    /// Look up a data item by uid.
    #[must_use]
    pub fn get_data_item(&self, uid: &str) -> Option<Rc<dyn DataItem>> {
        self.data_items.get(uid).cloned()
    }

    /// Store an operation description under its uid, keeping any existing entry.
    pub fn store_op_desc(&mut self, op_desc: Rc<OperationDescription>) {
        self.op_descs.entry(op_desc.uid.clone()).or_insert(op_desc);
    }

    /// Look up an operation description by uid.
    #[must_use]
    pub fn get_op_desc(&self, uid: &str) -> Option<Rc<OperationDescription>> {
        self.op_descs.get(uid).cloned()
    }

    /// Number of stored data items.
    #[must_use]
    pub fn data_item_count(&self) -> usize {
        self.data_items.len()
    }

    /// Number of stored operation descriptions.
    #[must_use]
    pub fn op_desc_count(&self) -> usize {
        self.op_descs.len()
    }

    /// Check if nothing was stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data_items.is_empty() && self.op_descs.is_empty()
    }
}

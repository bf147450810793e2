//! Lineage graph: an append-only DAG of data item derivations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node in the lineage graph, keyed by data item id.
///
/// `operation_id` is `None` for externally-provided source items.
/// `derived_ids` is the reverse edge set, maintained incrementally by
/// [`ProvGraph::add_node`] and never supplied directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvNode {
    /// Id of the data item this node describes.
    pub data_item_id: String,
    /// Id of the operation that created the item, if known.
    pub operation_id: Option<String>,
    /// Ids of the items the operation consumed, in order.
    pub source_ids: Vec<String>,
    /// Ids of items later derived from this one.
    pub derived_ids: Vec<String>,
}

/// Append-only DAG of [`ProvNode`]s plus named sub-graphs.
///
/// Nodes are added exactly once and never mutated afterwards, except for the
/// incremental `derived_ids` back-references: adding a node appends its id to
/// the `derived_ids` of every source that already has a node. Source ids that
/// were never added (external items, or items living in a sub-graph) are
/// simply not back-linked; only forward `source_ids` are guaranteed.
///
/// A sub-graph is keyed by the id of the composite operation whose collapsed
/// nodes in this graph it details; an operation id owns at most one.
/// Insertion order of nodes and sub-graphs is preserved for enumeration.
#[derive(Debug, Default)]
pub struct ProvGraph {
    nodes: HashMap<String, ProvNode>,
    node_order: Vec<String>,
    sub_graphs: HashMap<String, Rc<RefCell<ProvGraph>>>,
    sub_graph_order: Vec<String>,
}

impl ProvGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node for `data_item_id`.
    ///
    /// Appends `data_item_id` to the `derived_ids` of every source id that
    /// already has a node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] if the id already has a node; a node
    /// is added exactly once.
    pub fn add_node(
        &mut self,
        data_item_id: impl Into<String>,
        operation_id: Option<String>,
        source_ids: Vec<String>,
    ) -> Result<()> {
        let data_item_id = data_item_id.into();
        if self.nodes.contains_key(&data_item_id) {
            return Err(Error::duplicate_node(data_item_id));
        }
        for source_id in &source_ids {
            if let Some(source_node) = self.nodes.get_mut(source_id) {
                source_node.derived_ids.push(data_item_id.clone());
            }
        }
        self.node_order.push(data_item_id.clone());
        self.nodes.insert(
            data_item_id.clone(),
            ProvNode {
                data_item_id,
                operation_id,
                source_ids,
                derived_ids: Vec::new(),
            },
        );
        Ok(())
    }

    /// Check if a node exists for `data_item_id`.
    #[must_use]
    pub fn has_node(&self, data_item_id: &str) -> bool {
        self.nodes.contains_key(data_item_id)
    }

    /// Get the node for `data_item_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the id has no node.
    pub fn get_node(&self, data_item_id: &str) -> Result<&ProvNode> {
        self.nodes
            .get(data_item_id)
            .ok_or_else(|| Error::node_not_found(data_item_id))
    }

    /// Snapshot of all top-level nodes, in insertion order.
    ///
    /// Sub-graph contents are not included.
    #[must_use]
    pub fn get_nodes(&self) -> Vec<ProvNode> {
        self.node_order
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect()
    }

    /// Attach a sub-graph under the id of the composite operation owning it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSubGraph`] if the operation already owns one.
    pub fn add_sub_graph(
        &mut self,
        operation_id: impl Into<String>,
        sub_graph: Rc<RefCell<ProvGraph>>,
    ) -> Result<()> {
        let operation_id = operation_id.into();
        if self.sub_graphs.contains_key(&operation_id) {
            return Err(Error::duplicate_sub_graph(operation_id));
        }
        self.sub_graph_order.push(operation_id.clone());
        self.sub_graphs.insert(operation_id, sub_graph);
        Ok(())
    }

    /// Check if a sub-graph exists for `operation_id`.
    #[must_use]
    pub fn has_sub_graph(&self, operation_id: &str) -> bool {
        self.sub_graphs.contains_key(operation_id)
    }

    /// Get the sub-graph owned by `operation_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubGraphNotFound`] if the operation owns none.
    pub fn get_sub_graph(&self, operation_id: &str) -> Result<Rc<RefCell<ProvGraph>>> {
        self.sub_graphs
            .get(operation_id)
            .cloned()
            .ok_or_else(|| Error::sub_graph_not_found(operation_id))
    }

    /// All direct sub-graphs, in insertion order. Not recursive.
    #[must_use]
    pub fn get_sub_graphs(&self) -> Vec<Rc<RefCell<ProvGraph>>> {
        self.sub_graph_order
            .iter()
            .filter_map(|id| self.sub_graphs.get(id).cloned())
            .collect()
    }

    /// Number of top-level nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of direct sub-graphs.
    #[must_use]
    pub fn sub_graph_count(&self) -> usize {
        self.sub_graphs.len()
    }

    /// Check if the graph holds no nodes and no sub-graphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.sub_graphs.is_empty()
    }
}

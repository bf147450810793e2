//! Provenance tracing façade.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::prov::graph::{ProvGraph, ProvNode};
use crate::prov::store::{DataItem, OperationDescription, ProvStore};

/// Provenance information for a specific data item.
///
/// A materialized view joining a lineage node against the store: the item
/// itself, the operation that created it (absent for externally-provided
/// source items), the items the operation consumed, and the items other
/// operations later derived from this one.
#[derive(Debug, Clone)]
pub struct Prov {
    /// The data item the record is about.
    pub data_item: Rc<dyn DataItem>,
    /// Description of the operation that created the item, if any.
    pub op_desc: Option<Rc<OperationDescription>>,
    /// Items the operation consumed to create the item.
    pub source_data_items: Vec<Rc<dyn DataItem>>,
    /// Items later derived from this one.
    pub derived_data_items: Vec<Rc<dyn DataItem>>,
}

/// Provenance tracing component.
///
/// A `ProvTracer` gathers lineage for all data generated during a pipeline
/// run. For each data item it can tell the operation that created it, the
/// items that were used to create it, and reciprocally the items that were
/// derived from it (cf. [`Prov`]).
///
/// Operations report each item they create through [`add_prov`](Self::add_prov).
/// Users wanting lineage instantiate one tracer and hand it to every
/// operation involved; once the run is over, [`get_prov`](Self::get_prov) and
/// [`get_provs`](Self::get_provs) answer queries.
///
/// Composite operations relying on inner operations (pipelines) should not
/// call `add_prov` themselves. Instead they run their inner operations
/// against a private tracer sharing the same store (see
/// [`with_store`](Self::with_store) and [`store`](Self::store)), then call
/// [`add_prov_from_sub_tracer`](Self::add_prov_from_sub_tracer) to fold the
/// result into the tracer they were given. The inner lineage stays navigable
/// through [`get_sub_prov_tracer`](Self::get_sub_prov_tracer), recursively:
/// inner operations can themselves be composite, giving a tree of nested
/// tracers.
///
/// A tracer only ever grows. Nothing is removed or mutated after being
/// added; it is an audit log, not a cache. Writers must be serialized by the
/// caller; there is no internal locking.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use stemma::{DataItem, OperationDescription, ProvTracer};
///
/// #[derive(Debug)]
/// struct Segment {
///     uid: String,
/// }
///
/// impl DataItem for Segment {
///     fn uid(&self) -> &str {
///         &self.uid
///     }
/// }
///
/// let mut tracer = ProvTracer::new();
/// let input: Rc<dyn DataItem> = Rc::new(Segment { uid: "seg-1".into() });
/// let output: Rc<dyn DataItem> = Rc::new(Segment { uid: "seg-2".into() });
/// let op = Rc::new(OperationDescription::new("redactor"));
///
/// tracer.add_prov(Rc::clone(&output), Rc::clone(&op), &[Rc::clone(&input)])?;
///
/// let prov = tracer.get_prov("seg-2")?;
/// assert_eq!(prov.op_desc.as_ref().map(|op| op.name.as_str()), Some("redactor"));
/// assert_eq!(prov.source_data_items[0].uid(), "seg-1");
/// # Ok::<(), stemma::Error>(())
/// ```
#[derive(Debug)]
pub struct ProvTracer {
    store: Rc<RefCell<ProvStore>>,
    graph: Rc<RefCell<ProvGraph>>,
}

impl Default for ProvTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvTracer {
    /// Create a tracer with its own empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Rc::new(RefCell::new(ProvStore::new())))
    }

    /// Create a tracer over an existing store.
    ///
    /// This is how a composite operation builds its private inner tracer:
    /// pass the parent's [`store`](Self::store) so every id resolves to the
    /// same object across the hierarchy.
    #[must_use]
    pub fn with_store(store: Rc<RefCell<ProvStore>>) -> Self {
        Self {
            store,
            graph: Rc::new(RefCell::new(ProvGraph::new())),
        }
    }

    /// Handle on the store shared across this tracer hierarchy.
    #[must_use]
    pub fn store(&self) -> Rc<RefCell<ProvStore>> {
        Rc::clone(&self.store)
    }

    /// Record that `op_desc` produced `data_item` from `source_data_items`.
    ///
    /// The item, the operation and every source item are stored
    /// (insert-if-absent), and a lineage node links the item to its sources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] if provenance for the item's id was
    /// already added.
    pub fn add_prov(
        &mut self,
        data_item: Rc<dyn DataItem>,
        op_desc: Rc<OperationDescription>,
        source_data_items: &[Rc<dyn DataItem>],
    ) -> Result<()> {
        let uid = data_item.uid().to_string();
        if self.graph.borrow().has_node(&uid) {
            return Err(Error::duplicate_node(uid));
        }

        {
            let mut store = self.store.borrow_mut();
            store.store_data_item(Rc::clone(&data_item));
            store.store_op_desc(Rc::clone(&op_desc));
            for source in source_data_items {
                store.store_data_item(Rc::clone(source));
            }
        }

        let source_ids = source_data_items
            .iter()
            .map(|source| source.uid().to_string())
            .collect();
        self.graph
            .borrow_mut()
            .add_node(uid, Some(op_desc.uid.clone()), source_ids)
    }

    /// Fold a finished composite operation's sub-tracer into this tracer.
    ///
    /// `data_items` are the outputs the composite operation exposes, not its
    /// internal intermediates. The sub-tracer's graph is attached under
    /// `op_desc.uid`, and for each output a single collapsed node is added
    /// whose sources are the true external inputs of the sub-pipeline: the
    /// sub-graph is walked backward breadth-first from the output, and every
    /// reached id that was not derived inside the sub-pipeline (its node has
    /// no operation id, or it has no node at all) becomes a source.
    ///
    /// Outputs already known to this tracer are accepted silently when their
    /// recorded operation is `op_desc` (an attribute copied from one
    /// annotation to another gets re-reported); anything else is a
    /// consistency error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreMismatch`] if the sub-tracer does not share this
    /// tracer's store, [`Error::SharedGraph`] if it wraps this tracer's own
    /// graph, [`Error::DuplicateSubGraph`] if `op_desc` already owns a
    /// sub-graph here, [`Error::NotTraced`] if an output was never traced in
    /// the sub-tracer, and [`Error::ConflictingOperation`] if an output is
    /// already claimed by a different operation.
    pub fn add_prov_from_sub_tracer(
        &mut self,
        data_items: &[Rc<dyn DataItem>],
        op_desc: Rc<OperationDescription>,
        sub_tracer: &ProvTracer,
    ) -> Result<()> {
        if !Rc::ptr_eq(&self.store, &sub_tracer.store) {
            return Err(Error::StoreMismatch);
        }
        if Rc::ptr_eq(&self.graph, &sub_tracer.graph) {
            return Err(Error::SharedGraph);
        }

        self.store.borrow_mut().store_op_desc(Rc::clone(&op_desc));
        self.graph
            .borrow_mut()
            .add_sub_graph(op_desc.uid.clone(), Rc::clone(&sub_tracer.graph))?;

        log::debug!(
            "collapsing {} data item(s) from sub-tracer of operation {}",
            data_items.len(),
            op_desc.uid
        );

        let sub_graph = sub_tracer.graph.borrow();
        for data_item in data_items {
            let uid = data_item.uid();
            {
                let graph = self.graph.borrow();
                if graph.has_node(uid) {
                    // can happen with attributes copied from one annotation
                    // to another, as long as the operation agrees
                    let node = graph.get_node(uid)?;
                    if node.operation_id.as_deref() != Some(op_desc.uid.as_str()) {
                        return Err(Error::conflicting_operation(
                            uid,
                            node.operation_id.as_deref(),
                            &op_desc.uid,
                        ));
                    }
                    log::debug!("data item {uid} already collapsed for operation {}", op_desc.uid);
                    continue;
                }
            }
            let source_ids = collect_external_sources(&sub_graph, uid)?;
            self.graph
                .borrow_mut()
                .add_node(uid, Some(op_desc.uid.clone()), source_ids)?;
        }
        Ok(())
    }

    /// Check if lineage can be retrieved for `data_item_id`.
    ///
    /// Returns `false` when the item is only known to a sub-tracer.
    #[must_use]
    pub fn has_prov(&self, data_item_id: &str) -> bool {
        self.graph.borrow().has_node(data_item_id)
    }

    /// Lineage record for `data_item_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotTraced`] if the id is unknown to this tracer:
    /// either invalid, or produced by an operation that was not given the
    /// tracer.
    pub fn get_prov(&self, data_item_id: &str) -> Result<Prov> {
        let node = match self.graph.borrow().get_node(data_item_id) {
            Ok(node) => node.clone(),
            Err(_) => return Err(Error::not_traced(data_item_id)),
        };
        self.build_prov(&node)
    }

    /// Lineage records for every item known to this tracer, in the order
    /// they were added. Sub-tracer contents are not included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingItem`] if the graph references an id the
    /// shared store cannot resolve.
    pub fn get_provs(&self) -> Result<Vec<Prov>> {
        let nodes = self.graph.borrow().get_nodes();
        nodes.iter().map(|node| self.build_prov(node)).collect()
    }

    /// Check for a direct sub-tracer under a composite operation's id.
    ///
    /// Returns `false` for sub-tracers deeper in the hierarchy.
    #[must_use]
    pub fn has_sub_prov_tracer(&self, operation_id: &str) -> bool {
        self.graph.borrow().has_sub_graph(operation_id)
    }

    /// View tracer over the sub-graph recorded for a composite operation.
    ///
    /// The view shares this tracer's store and can be navigated further with
    /// the same methods, to arbitrary depth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubGraphNotFound`] if the operation owns no
    /// sub-graph here.
    pub fn get_sub_prov_tracer(&self, operation_id: &str) -> Result<ProvTracer> {
        let sub_graph = self.graph.borrow().get_sub_graph(operation_id)?;
        Ok(Self {
            store: Rc::clone(&self.store),
            graph: sub_graph,
        })
    }

    /// View tracers over all direct sub-graphs, in the order they were
    /// attached.
    #[must_use]
    pub fn get_sub_prov_tracers(&self) -> Vec<ProvTracer> {
        self.graph
            .borrow()
            .get_sub_graphs()
            .into_iter()
            .map(|graph| Self {
                store: Rc::clone(&self.store),
                graph,
            })
            .collect()
    }

    fn build_prov(&self, node: &ProvNode) -> Result<Prov> {
        let store = self.store.borrow();
        let data_item = store
            .get_data_item(&node.data_item_id)
            .ok_or_else(|| Error::missing_item(&node.data_item_id))?;
        let op_desc = match &node.operation_id {
            Some(operation_id) => Some(
                store
                    .get_op_desc(operation_id)
                    .ok_or_else(|| Error::missing_item(operation_id))?,
            ),
            None => None,
        };
        let source_data_items = node
            .source_ids
            .iter()
            .map(|uid| store.get_data_item(uid).ok_or_else(|| Error::missing_item(uid)))
            .collect::<Result<Vec<_>>>()?;
        let derived_data_items = node
            .derived_ids
            .iter()
            .map(|uid| store.get_data_item(uid).ok_or_else(|| Error::missing_item(uid)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Prov {
            data_item,
            op_desc,
            source_data_items,
            derived_data_items,
        })
    }
}

/// External inputs feeding `data_item_id` inside a sub-pipeline's graph.
///
/// Walks `source_ids` backward breadth-first. Ids derived inside the
/// sub-pipeline are traversed through; ids that were external inputs (node
/// without an operation id, or no node at all) are collected. This is how a
/// multi-hop internal derivation collapses to a single edge in the parent.
fn collect_external_sources(sub_graph: &ProvGraph, data_item_id: &str) -> Result<Vec<String>> {
    if !sub_graph.has_node(data_item_id) {
        return Err(Error::not_traced(data_item_id));
    }
    let mut external = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::from([data_item_id.to_string()]);
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if sub_graph.has_node(&id) {
            let node = sub_graph.get_node(&id)?;
            if node.operation_id.is_none() {
                external.push(id);
            }
            queue.extend(
                node.source_ids
                    .iter()
                    .filter(|source| !seen.contains(source.as_str()))
                    .cloned(),
            );
        } else {
            external.push(id);
        }
    }
    Ok(external)
}

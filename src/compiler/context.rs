//! Per-build compilation state for named component schemas.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::validator::{CompiledNode, ComponentSet};

/// Mutable slot table threaded through one registry build.
///
/// Every name declared under `components.schemas` gets a slot up front,
/// in declaration order. A slot is in exactly one of three states: not
/// started (empty, unmarked), building (marked, still empty), or done
/// (filled exactly once, immutable afterwards). A reference to a slot
/// that is building compiles to a deferred `Component` node instead of
/// re-entering the compiler, which is what lets self- and mutually-
/// referential schemas terminate.
///
/// The state is owned by a single build call and frozen into a
/// [`ComponentSet`] at the end; two builds can never share one.
#[derive(Debug)]
pub(crate) struct BuildState<'doc> {
    names: HashMap<String, usize>,
    raws: Vec<&'doc Value>,
    nodes: Vec<Option<CompiledNode>>,
    building: Vec<bool>,
}

impl<'doc> BuildState<'doc> {
    /// Allocate one slot per declared component, in declaration order.
    pub(crate) fn new(declared: &'doc Map<String, Value>) -> Self {
        let mut names = HashMap::with_capacity(declared.len());
        let mut raws = Vec::with_capacity(declared.len());
        for (index, (name, raw)) in declared.iter().enumerate() {
            names.insert(name.clone(), index);
            raws.push(raw);
        }
        let count = raws.len();
        BuildState {
            names,
            raws,
            nodes: vec![None; count],
            building: vec![false; count],
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.raws.len()
    }

    /// True once the slot has been entered (building) or finished (done).
    pub(crate) fn started(&self, slot: usize) -> bool {
        self.building[slot] || self.nodes[slot].is_some()
    }

    pub(crate) fn begin(&mut self, slot: usize) {
        self.building[slot] = true;
    }

    /// The raw schema behind a slot. The reference is tied to the
    /// document, not to this table, so compilation can hold it while
    /// mutating the table.
    pub(crate) fn raw(&self, slot: usize) -> &'doc Value {
        self.raws[slot]
    }

    /// Record the finished node. Written exactly once per slot.
    pub(crate) fn finish(&mut self, slot: usize, node: CompiledNode) {
        self.nodes[slot] = Some(node);
        self.building[slot] = false;
    }

    /// Freeze into the immutable table every validator of this build
    /// shares. The eager component pass fills all slots before this runs.
    pub(crate) fn into_component_set(self) -> ComponentSet {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| node.unwrap_or(CompiledNode::Any))
            .collect();
        ComponentSet::new(self.names, nodes)
    }
}

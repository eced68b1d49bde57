//! Model nodes and the table that owns them.
//!
//! Nodes live in a single table keyed by [`ModelPath`]. Parent and child
//! links are paths, not pointers, so the table is the only owner and every
//! cross-node reference is a key lookup.
//!
//! # Locking
//!
//! - The table lock is only held to look up or insert cells. While holding
//!   it, a parent's data lock may be taken to link a new child. No code
//!   takes the table lock while holding a node lock.
//! - Each cell has a transition lock serializing state changes of that node,
//!   taken before the data lock. It is held for the duration of one rule
//!   action and never while realizing inputs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::descriptor::RuleDescriptor;
use crate::error::ModelError;
use crate::path::ModelPath;
use crate::rule::ModelRule;
use crate::state::LifecycleState;
use crate::value::{Value, ValueType};


/// One addressable model element.
#[derive(Debug)]
pub(crate) struct Node {
	pub(crate) path: ModelPath,
	pub(crate) state: LifecycleState,
	pub(crate) value: Option<Value>,
	pub(crate) value_type: Option<ValueType>,
	/// Back-pointer by key; the parent owns this node's path in its children.
	pub(crate) parent: Option<ModelPath>,
	pub(crate) children: BTreeSet<ModelPath>,
	/// Single writer per target state.
	pub(crate) rules: BTreeMap<LifecycleState, Arc<ModelRule>>,
	/// Subject of a rule or seeded, as opposed to an implicit placeholder.
	pub(crate) registered: bool,
	/// Descriptor of the seed that pre-realized this node.
	pub(crate) seeded_by: Option<RuleDescriptor>,
	/// Transition whose rule failed, and the failure it produced.
	pub(crate) failure: Option<(LifecycleState, ModelError)>,
}

impl Node {
	fn placeholder(path: ModelPath) -> Self {
		let parent = path.parent().filter(|p| !p.is_root());
		Self {
			path,
			state: LifecycleState::Known,
			value: None,
			value_type: None,
			parent,
			children: BTreeSet::new(),
			rules: BTreeMap::new(),
			registered: false,
			seeded_by: None,
			failure: None,
		}
	}

	/// Returns true if a request for this path is meaningful.
	pub(crate) fn is_addressable(&self) -> bool {
		self.registered || !self.children.is_empty()
	}

	pub(crate) fn info(&self) -> NodeInfo {
		NodeInfo {
			path: self.path.clone(),
			state: self.state,
			value_type: self.value_type,
			parent: self.parent.clone(),
			children: self.children.iter().cloned().collect(),
			bound_states: self.rules.keys().copied().collect(),
			registered: self.registered,
		}
	}
}

/// Lock pair guarding one node.
#[derive(Debug)]
pub(crate) struct NodeCell {
	pub(crate) transition: Mutex<()>,
	pub(crate) data: RwLock<Node>,
}

impl NodeCell {
	fn new(node: Node) -> Self {
		Self {
			transition: Mutex::new(()),
			data: RwLock::new(node),
		}
	}

	pub(crate) fn state(&self) -> LifecycleState {
		self.data.read().state
	}
}

/// Read-only description of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
	pub path: ModelPath,
	pub state: LifecycleState,
	pub value_type: Option<ValueType>,
	pub parent: Option<ModelPath>,
	pub children: Vec<ModelPath>,
	/// States that have a rule bound.
	pub bound_states: Vec<LifecycleState>,
	/// Subject of a rule or seeded, rather than only referenced.
	pub registered: bool,
}

/// Path-keyed node storage.
#[derive(Debug, Default)]
pub(crate) struct NodeTable {
	cells: RwLock<FxHashMap<ModelPath, Arc<NodeCell>>>,
}

impl NodeTable {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Looks up an existing node.
	pub(crate) fn get(&self, path: &ModelPath) -> Option<Arc<NodeCell>> {
		self.cells.read().get(path).cloned()
	}

	/// Returns the node at `path`, creating a placeholder in the
	/// [`LifecycleState::Known`] state and any missing ancestors.
	pub(crate) fn node(&self, path: &ModelPath) -> Arc<NodeCell> {
		if let Some(cell) = self.get(path) {
			return cell;
		}

		let mut cells = self.cells.write();
		if let Some(cell) = cells.get(path) {
			return cell.clone();
		}

		let cell = Arc::new(NodeCell::new(Node::placeholder(path.clone())));
		cells.insert(path.clone(), cell.clone());
		tracing::trace!(path = %path, "model.node.placeholder");

		let mut child = path.clone();
		for ancestor in path.ancestors() {
			let (parent_cell, existed) = match cells.get(&ancestor) {
				Some(existing) => (existing.clone(), true),
				None => {
					let created = Arc::new(NodeCell::new(Node::placeholder(ancestor.clone())));
					cells.insert(ancestor.clone(), created.clone());
					tracing::trace!(path = %ancestor, "model.node.placeholder");
					(created, false)
				}
			};
			parent_cell.data.write().children.insert(child);
			if existed {
				// Everything above an existing node is already linked.
				break;
			}
			child = ancestor;
		}

		cell
	}

	pub(crate) fn len(&self) -> usize {
		self.cells.read().len()
	}

	/// All paths, sorted.
	pub(crate) fn paths(&self) -> Vec<ModelPath> {
		let mut paths: Vec<_> = self.cells.read().keys().cloned().collect();
		paths.sort();
		paths
	}
}

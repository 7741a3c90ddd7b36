//! NodeStore - Canonical storage of the node forest
//!
//! The store owns every [`Node`] keyed by id together with an ordered children
//! index. All structural operations keep three properties:
//!
//! - **Single parent**: a node appears in exactly one sibling list (or the root set)
//! - **Acyclic**: a node can never be moved under itself or one of its descendants
//! - **Dense order**: after every operation each sibling list carries `order`
//!   values `0..n-1`, ties resolved by previous relative position
//!
//! The store is synchronous and cheap to clone. Callers that need atomicity (the
//! mutation pipeline) clone it, mutate the clone and swap it in on success.
//!
//! # Examples
//!
//! ```rust
//! use viewtree_core::db::NodeStore;
//! use viewtree_core::models::{ContainerConfig, MarkdownConfig, NodeConfig};
//!
//! let mut store = NodeStore::new();
//! let root = store
//!     .create_node(None, NodeConfig::Container(ContainerConfig::default()), None)
//!     .unwrap();
//! let child = store
//!     .create_node(
//!         Some(&root.id),
//!         NodeConfig::Markdown(MarkdownConfig { content: "# Hi".into() }),
//!         None,
//!     )
//!     .unwrap();
//!
//! assert_eq!(store.child_ids(root.id.as_str()), &[child.id.clone()]);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use super::error::TreeError;
use crate::models::{Node, NodeConfig, NodeId, ValidationError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStore {
    nodes: BTreeMap<NodeId, Node>,
    children: HashMap<NodeId, Vec<NodeId>>,
    roots: BTreeSet<NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted nodes
    ///
    /// Siblings are ordered by `(order, input position)` and re-densified. Parent
    /// pointers are taken as-is: dangling parents and parent cycles are kept so the
    /// integrity report can surface them, but such nodes are unreachable from any
    /// root.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::Integrity` if two records share an id.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, TreeError> {
        let mut store = NodeStore::new();
        let mut groups: HashMap<NodeId, Vec<(u32, usize, NodeId)>> = HashMap::new();

        for (position, mut node) in nodes.into_iter().enumerate() {
            if store.nodes.contains_key(&node.id) {
                return Err(TreeError::integrity(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
            match &node.parent_id {
                Some(parent) => groups.entry(parent.clone()).or_default().push((
                    node.order,
                    position,
                    node.id.clone(),
                )),
                None => {
                    node.order = 0;
                    store.roots.insert(node.id.clone());
                }
            }
            store.nodes.insert(node.id.clone(), node);
        }

        for (parent, mut group) in groups {
            group.sort_by_key(|(order, position, _)| (*order, *position));
            let ids: Vec<NodeId> = group.into_iter().map(|(_, _, id)| id).collect();
            store.children.insert(parent.clone(), ids);
            store.reindex(&parent);
        }

        debug!("Rebuilt node store with {} nodes", store.nodes.len());
        Ok(store)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes sorted by id
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Root nodes sorted by id
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Ordered child ids of a node (empty for leaves and unknown ids)
    pub fn child_ids(&self, id: &str) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ordered children of an existing node
    pub fn get_children(&self, id: &str) -> Result<Vec<&Node>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::node_not_found(id));
        }
        Ok(self
            .child_ids(id)
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .collect())
    }

    /// Pre-order descendants of a node, excluding the node itself
    pub fn descendants(&self, id: &str) -> Result<Vec<NodeId>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::node_not_found(id));
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<&NodeId> = self.child_ids(id).iter().rev().collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current.clone());
            stack.extend(self.child_ids(current.as_str()).iter().rev());
        }
        Ok(out)
    }

    /// Levels between a node and its forest root (roots sit at depth 0)
    ///
    /// `None` for unknown ids and for nodes whose parent chain dangles or loops.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let mut node = self.nodes.get(id)?;
        for depth in 0..=self.nodes.len() {
            match &node.parent_id {
                None => return Some(depth),
                Some(parent) => node = self.nodes.get(parent)?,
            }
        }
        None
    }

    /// Levels below a node; 0 for leaves and unknown ids
    pub fn height(&self, id: &str) -> usize {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut level: Vec<&NodeId> = self.child_ids(id).iter().collect();
        let mut height = 0;
        loop {
            level.retain(|child| seen.insert(*child));
            if level.is_empty() {
                return height;
            }
            height += 1;
            level = level
                .iter()
                .flat_map(|child| self.child_ids(child.as_str()))
                .collect();
        }
    }

    /// Whether `candidate` lies strictly below `ancestor`
    ///
    /// Walks the candidate's parent chain, bounded by the store size so corrupted
    /// parent pointers cannot loop forever.
    pub fn is_descendant(&self, ancestor: &str, candidate: &str) -> bool {
        let mut current = self.nodes.get(candidate).and_then(|n| n.parent_id.as_ref());
        for _ in 0..self.nodes.len() {
            match current {
                Some(parent) if parent.as_str() == ancestor => return true,
                Some(parent) => {
                    current = self.nodes.get(parent).and_then(|n| n.parent_id.as_ref());
                }
                None => return false,
            }
        }
        false
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a node with a fresh id
    ///
    /// `index` positions the node among its new siblings; `None` or any value past
    /// the end appends.
    pub fn create_node(
        &mut self,
        parent_id: Option<&NodeId>,
        config: NodeConfig,
        index: Option<usize>,
    ) -> Result<Node, TreeError> {
        self.insert_node(NodeId::generate(), parent_id.cloned(), config, index)
    }

    /// Create a node under a caller-chosen id
    ///
    /// # Errors
    ///
    /// - `ValidationError::DuplicateId` if the id is taken
    /// - `ValidationError::InvalidConfig` if the config fails validation
    /// - `InvalidParent` if the parent is missing or does not accept children
    pub fn insert_node(
        &mut self,
        id: NodeId,
        parent_id: Option<NodeId>,
        config: NodeConfig,
        index: Option<usize>,
    ) -> Result<Node, TreeError> {
        if self.contains(id.as_str()) {
            return Err(ValidationError::DuplicateId(id.to_string()).into());
        }
        config.validate()?;

        if let Some(parent) = &parent_id {
            self.check_parent(parent)?;
        }

        let node = Node::new(id.clone(), parent_id.clone(), config);
        self.nodes.insert(id.clone(), node);
        self.attach(&id, parent_id.as_ref(), index);

        debug!("Created node {} under {:?}", id, parent_id);
        self.nodes
            .get(&id)
            .cloned()
            .ok_or_else(|| TreeError::node_not_found(id.as_str()))
    }

    /// Apply a shallow config patch; the node type is immutable
    pub fn update_config(&mut self, id: &str, patch: &Value) -> Result<Node, TreeError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::node_not_found(id))?;
        node.config = node.config.merge_patch(patch)?;
        Ok(node.clone())
    }

    /// Replace a node's config wholesale, keeping its type
    pub fn replace_config(&mut self, id: &str, config: NodeConfig) -> Result<Node, TreeError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::node_not_found(id))?;
        if node.kind() != config.kind() {
            return Err(ValidationError::TypeChange {
                from: node.kind(),
                to: config.kind(),
            }
            .into());
        }
        config.validate()?;
        node.config = config;
        Ok(node.clone())
    }

    /// Move a node under a new parent (or to the root set when `None`)
    ///
    /// The node is detached first, so for moves within the same parent `index`
    /// addresses the list without the node in it.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node does not exist
    /// - `CycleDetected` if the new parent is the node itself or a descendant
    /// - `InvalidParent` if the new parent is missing or does not accept children
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent_id: Option<&NodeId>,
        index: Option<usize>,
    ) -> Result<Node, TreeError> {
        let old_parent = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::node_not_found(id))?
            .parent_id
            .clone();

        if let Some(parent) = new_parent_id {
            if parent.as_str() == id || self.is_descendant(id, parent.as_str()) {
                return Err(TreeError::cycle_detected(id, parent.as_str()));
            }
            self.check_parent(parent)?;
        }

        let node_id = NodeId::from(id);
        self.detach(&node_id, old_parent.as_ref());
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = new_parent_id.cloned();
        }
        self.attach(&node_id, new_parent_id, index);

        debug!(
            "Moved node {} from {:?} to {:?}",
            id, old_parent, new_parent_id
        );
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::node_not_found(id))
    }

    /// Delete a node, returning the removed ids in pre-order
    ///
    /// With `cascade` the whole subtree goes; without it a node that still has
    /// children is rejected.
    pub fn delete_node(&mut self, id: &str, cascade: bool) -> Result<Vec<NodeId>, TreeError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::node_not_found(id))?
            .parent_id
            .clone();

        if !cascade && !self.child_ids(id).is_empty() {
            return Err(ValidationError::HasChildren(id.to_string()).into());
        }

        let mut removed = vec![NodeId::from(id)];
        removed.extend(self.descendants(id)?);

        self.detach(&removed[0], parent.as_ref());
        for node_id in &removed {
            self.nodes.remove(node_id);
            self.children.remove(node_id);
            self.roots.remove(node_id);
        }

        debug!("Deleted {} nodes rooted at {}", removed.len(), id);
        Ok(removed)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_parent(&self, parent_id: &NodeId) -> Result<(), TreeError> {
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| TreeError::invalid_parent(parent_id.as_str(), "parent does not exist"))?;
        if !parent.kind().accepts_children() {
            return Err(TreeError::invalid_parent(
                parent_id.as_str(),
                format!("{} nodes cannot have children", parent.kind()),
            ));
        }
        Ok(())
    }

    fn attach(&mut self, id: &NodeId, parent_id: Option<&NodeId>, index: Option<usize>) {
        match parent_id {
            Some(parent) => {
                let siblings = self.children.entry(parent.clone()).or_default();
                let at = index.unwrap_or(siblings.len()).min(siblings.len());
                siblings.insert(at, id.clone());
                self.reindex(parent);
            }
            None => {
                self.roots.insert(id.clone());
                if let Some(node) = self.nodes.get_mut(id) {
                    node.order = 0;
                }
            }
        }
    }

    fn detach(&mut self, id: &NodeId, parent_id: Option<&NodeId>) {
        match parent_id {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(parent) {
                    siblings.retain(|sibling| sibling != id);
                    if siblings.is_empty() {
                        self.children.remove(parent);
                    }
                }
                self.reindex(parent);
            }
            None => {
                self.roots.remove(id);
            }
        }
    }

    fn reindex(&mut self, parent_id: &NodeId) {
        let Some(siblings) = self.children.get(parent_id) else {
            return;
        };
        for (rank, child) in siblings.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(child) {
                node.order = rank as u32;
            }
        }
    }
}

#[cfg(test)]
#[path = "node_store_test.rs"]
mod node_store_test;

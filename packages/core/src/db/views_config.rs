//! ViewsConfig - views bound to the node forest
//!
//! `ViewsConfig` is the unit the mutation pipeline snapshots, validates against
//! and persists. It wraps the [`NodeStore`] with the view-level rules:
//!
//! - view paths are unique and normalized
//! - a root node backs at most one view, and a view root cannot be moved
//! - deleting a view leaves its nodes in place (reported as an orphaned subtree)
//! - `default_home_path`, when set, names an existing view
//! - no mutation nests a node deeper than `max_depth` below its root

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use super::error::TreeError;
use super::integrity::IntegrityIssue;
use super::node_store::NodeStore;
use crate::config::DEFAULT_MAX_RESOLUTION_DEPTH;
use crate::models::{
    normalize_path, validate_path, NewView, Node, NodeConfig, NodeId, NodeKind, ValidationError,
    View, ViewPatch, ViewsDocument, VIEWS_DOCUMENT_VERSION,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewsConfig {
    nodes: NodeStore,
    views: BTreeMap<String, View>,
    default_home_path: Option<String>,
    max_depth: usize,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            nodes: NodeStore::default(),
            views: BTreeMap::new(),
            default_home_path: None,
            max_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl ViewsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit node depth below a root; the resolver expands to the same limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Rebuild from a persisted document
    ///
    /// Structural problems that the integrity report can describe are kept;
    /// only ambiguities that cannot be represented (duplicate ids or paths) fail.
    pub fn from_document(doc: ViewsDocument) -> Result<Self, TreeError> {
        if doc.version != VIEWS_DOCUMENT_VERSION {
            warn!(
                "Loading views document version {} (expected {})",
                doc.version, VIEWS_DOCUMENT_VERSION
            );
        }

        let nodes = NodeStore::from_nodes(doc.nodes)?;
        let mut views = BTreeMap::new();
        for mut view in doc.views {
            view.path = normalize_path(&view.path);
            if views.contains_key(&view.path) {
                return Err(TreeError::integrity(format!(
                    "duplicate view path '{}'",
                    view.path
                )));
            }
            views.insert(view.path.clone(), view);
        }

        let default_home_path = match doc.default_home_path.map(|p| normalize_path(&p)) {
            Some(path) if views.contains_key(&path) => Some(path),
            Some(path) => {
                warn!("Dropping default home path '{}': no such view", path);
                None
            }
            None => None,
        };

        Ok(Self {
            nodes,
            views,
            default_home_path,
            max_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        })
    }

    /// Persistable form; nodes sorted by id, views by path
    pub fn to_document(&self) -> ViewsDocument {
        ViewsDocument {
            version: VIEWS_DOCUMENT_VERSION,
            views: self.views.values().cloned().collect(),
            nodes: self.nodes.iter().cloned().collect(),
            default_home_path: self.default_home_path.clone(),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get_node(id)
    }

    /// Exact lookup after normalization
    pub fn view(&self, path: &str) -> Option<&View> {
        self.views.get(&normalize_path(path))
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    /// All view paths, sorted
    pub fn view_paths(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    /// The view whose root is `node_id`, if any
    pub fn view_for_root(&self, node_id: &str) -> Option<&View> {
        self.views
            .values()
            .find(|view| view.root_node_id.as_str() == node_id)
    }

    pub fn default_home_path(&self) -> Option<&str> {
        self.default_home_path.as_deref()
    }

    // ========================================================================
    // Node mutations
    // ========================================================================

    /// Create a node under an existing parent
    pub fn create_node(
        &mut self,
        id: NodeId,
        parent_id: &NodeId,
        config: NodeConfig,
        index: Option<usize>,
    ) -> Result<Node, TreeError> {
        self.check_depth(id.as_str(), parent_id, 0)?;
        self.nodes
            .insert_node(id, Some(parent_id.clone()), config, index)
    }

    pub fn update_config(&mut self, id: &str, patch: &Value) -> Result<Node, TreeError> {
        self.nodes.update_config(id, patch)
    }

    /// Move a node under a new parent; view roots stay where they are
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent_id: &NodeId,
        index: Option<usize>,
    ) -> Result<Node, TreeError> {
        if let Some(view) = self.view_for_root(id) {
            return Err(ValidationError::ViewRootNotMovable {
                node_id: id.to_string(),
                path: view.path.clone(),
            }
            .into());
        }
        let forms_cycle =
            new_parent_id.as_str() == id || self.nodes.is_descendant(id, new_parent_id.as_str());
        if self.nodes.contains(id) && !forms_cycle {
            self.check_depth(id, new_parent_id, self.nodes.height(id))?;
        }
        self.nodes.move_node(id, Some(new_parent_id), index)
    }

    /// Reject placing a node whose subtree is `height` levels tall under `parent_id`
    /// when its deepest node would land past `max_depth`
    fn check_depth(&self, id: &str, parent_id: &NodeId, height: usize) -> Result<(), TreeError> {
        let Some(parent_depth) = self.nodes.depth(parent_id.as_str()) else {
            return Ok(());
        };
        if parent_depth + 1 + height > self.max_depth {
            return Err(ValidationError::DepthExceeded {
                node_id: id.to_string(),
                parent_id: parent_id.to_string(),
                max_depth: self.max_depth,
            }
            .into());
        }
        Ok(())
    }

    /// Delete a node (and with `cascade` its subtree)
    ///
    /// Deleting a view's root is allowed; the view then fails to resolve until it
    /// is deleted or recreated.
    pub fn delete_node(&mut self, id: &str, cascade: bool) -> Result<Vec<NodeId>, TreeError> {
        let removed = self.nodes.delete_node(id, cascade)?;
        if let Some(view) = self.view_for_root(id) {
            warn!(
                "Deleted root node {} of view '{}'; the view is now orphaned",
                id, view.path
            );
        }
        Ok(removed)
    }

    // ========================================================================
    // View mutations
    // ========================================================================

    /// Register a view
    ///
    /// Binds `new.root_node_id` when given, otherwise creates a root node under
    /// `fresh_root_id`. Returns the view and the created root, if any.
    pub fn create_view(
        &mut self,
        new: NewView,
        fresh_root_id: NodeId,
    ) -> Result<(View, Option<Node>), TreeError> {
        let path = validate_path(&new.path)?;
        if self.views.contains_key(&path) {
            return Err(ValidationError::DuplicatePath(path).into());
        }
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title".to_string()).into());
        }

        let (root_node_id, created_root) = match new.root_node_id {
            Some(root_id) => {
                let root = self
                    .nodes
                    .get_node(root_id.as_str())
                    .ok_or_else(|| TreeError::node_not_found(root_id.as_str()))?;
                if !root.is_root() {
                    return Err(ValidationError::NotARoot(root_id.to_string()).into());
                }
                if let Some(bound) = self.view_for_root(root_id.as_str()) {
                    return Err(ValidationError::RootAlreadyBound {
                        node_id: root_id.to_string(),
                        path: bound.path.clone(),
                    }
                    .into());
                }
                (root_id, None)
            }
            None => {
                let kind = new.root_type.unwrap_or(NodeKind::Container);
                let config = NodeConfig::from_value(kind, new.root_config.unwrap_or(Value::Null))?;
                let root = self.nodes.insert_node(fresh_root_id, None, config, None)?;
                (root.id.clone(), Some(root))
            }
        };

        let view = View {
            path: path.clone(),
            root_node_id,
            browser_title: new
                .browser_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| title.clone()),
            title,
            description: new.description.filter(|d| !d.trim().is_empty()),
        };
        self.views.insert(path, view.clone());

        debug!("Created view {} -> {}", view.path, view.root_node_id);
        Ok((view, created_root))
    }

    /// Update a view's metadata and optionally rename its path
    pub fn update_view(&mut self, path: &str, patch: ViewPatch) -> Result<View, TreeError> {
        let current_path = normalize_path(path);
        let mut view = self
            .views
            .get(&current_path)
            .cloned()
            .ok_or_else(|| TreeError::view_not_found(current_path.as_str()))?;

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::MissingField("title".to_string()).into());
            }
            view.title = title;
        }
        if let Some(browser_title) = patch.browser_title {
            let browser_title = browser_title.trim().to_string();
            view.browser_title = if browser_title.is_empty() {
                view.title.clone()
            } else {
                browser_title
            };
        }
        if let Some(description) = patch.description {
            view.description = Some(description).filter(|d| !d.trim().is_empty());
        }

        if let Some(requested) = patch.path {
            let new_path = validate_path(&requested)?;
            if new_path != current_path {
                if self.views.contains_key(&new_path) {
                    return Err(ValidationError::DuplicatePath(new_path).into());
                }
                self.views.remove(&current_path);
                if self.default_home_path.as_deref() == Some(current_path.as_str()) {
                    self.default_home_path = Some(new_path.clone());
                }
                view.path = new_path;
            }
        }

        self.views.insert(view.path.clone(), view.clone());
        Ok(view)
    }

    /// Remove a view; its nodes stay in the forest
    pub fn delete_view(&mut self, path: &str) -> Result<View, TreeError> {
        let path = normalize_path(path);
        let view = self
            .views
            .remove(&path)
            .ok_or_else(|| TreeError::view_not_found(path.as_str()))?;

        if self.default_home_path.as_deref() == Some(path.as_str()) {
            self.default_home_path = self.views.keys().next().cloned();
            debug!(
                "Default home moved from {} to {:?}",
                path, self.default_home_path
            );
        }
        Ok(view)
    }

    pub fn set_default_home(&mut self, path: &str) -> Result<String, TreeError> {
        let path = normalize_path(path);
        if !self.views.contains_key(&path) {
            return Err(TreeError::view_not_found(path.as_str()));
        }
        self.default_home_path = Some(path.clone());
        Ok(path)
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Describe every structural problem in the configuration
    pub fn integrity_report(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let mut paths_by_root: BTreeMap<&NodeId, Vec<String>> = BTreeMap::new();
        for view in self.views.values() {
            paths_by_root
                .entry(&view.root_node_id)
                .or_default()
                .push(view.path.clone());

            match self.nodes.get_node(view.root_node_id.as_str()) {
                None => issues.push(IntegrityIssue::MissingViewRoot {
                    path: view.path.clone(),
                    root_node_id: view.root_node_id.clone(),
                }),
                Some(root) => {
                    if let Some(parent_id) = &root.parent_id {
                        issues.push(IntegrityIssue::ViewRootHasParent {
                            path: view.path.clone(),
                            root_node_id: view.root_node_id.clone(),
                            parent_id: parent_id.clone(),
                        });
                    }
                }
            }
        }
        for (root_node_id, paths) in &paths_by_root {
            if paths.len() > 1 {
                issues.push(IntegrityIssue::SharedRoot {
                    root_node_id: (*root_node_id).clone(),
                    paths: paths.clone(),
                });
            }
        }

        let mut reachable: HashSet<NodeId> = HashSet::new();
        let mark_subtree = |start: &NodeId, reachable: &mut HashSet<NodeId>| {
            reachable.insert(start.clone());
            if let Ok(descendants) = self.nodes.descendants(start.as_str()) {
                reachable.extend(descendants);
            }
        };

        for root in self.nodes.roots() {
            mark_subtree(&root.id, &mut reachable);
            if !paths_by_root.contains_key(&root.id) {
                issues.push(IntegrityIssue::OrphanedSubtree {
                    root_node_id: root.id.clone(),
                    size: 1 + self.nodes.descendants(root.id.as_str()).map_or(0, |d| d.len()),
                });
            }
        }

        let mut orders_by_parent: HashMap<&NodeId, Vec<u32>> = HashMap::new();
        for node in self.nodes.iter() {
            let Some(parent_id) = &node.parent_id else {
                continue;
            };
            orders_by_parent.entry(parent_id).or_default().push(node.order);
            if !self.nodes.contains(parent_id.as_str()) {
                issues.push(IntegrityIssue::DanglingParent {
                    node_id: node.id.clone(),
                    parent_id: parent_id.clone(),
                });
                mark_subtree(&node.id, &mut reachable);
            }
        }

        for node in self.nodes.iter() {
            if !reachable.contains(&node.id) {
                issues.push(IntegrityIssue::Cycle {
                    node_id: node.id.clone(),
                });
            }
        }

        let mut non_dense: Vec<&NodeId> = orders_by_parent
            .into_iter()
            .filter_map(|(parent_id, mut orders)| {
                orders.sort_unstable();
                let dense = orders.iter().enumerate().all(|(i, o)| *o as usize == i);
                (!dense).then_some(parent_id)
            })
            .collect();
        non_dense.sort();
        issues.extend(non_dense.into_iter().map(|parent_id| IntegrityIssue::NonDenseOrder {
            parent_id: parent_id.clone(),
        }));

        issues
    }
}

#[cfg(test)]
#[path = "views_config_test.rs"]
mod views_config_test;

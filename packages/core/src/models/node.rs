//! Training Hierarchy Data Structures
//!
//! This module defines the `TrainingNode` tree that backs the progress wheel:
//! a Why/How/What hierarchy of training goals where only leaf nodes accumulate
//! logged volume.
//!
//! # Architecture
//!
//! - **Immutable snapshots**: every mutation rebuilds the path from the root
//!   to the changed node and returns a fresh tree. Derived views (color index,
//!   radial layout, trends) always read a single consistent version.
//! - **Forgiving operations**: mutations that reference a missing node id
//!   return the tree unchanged instead of failing, matching the UI contract.
//! - **Leaf-only accumulation**: container values are never rolled up from
//!   children; a node's `value` reflects direct log deltas only.
//!
//! # Examples
//!
//! ```rust
//! use golden_circle_core::models::TrainingNode;
//!
//! let root = TrainingNode::root("Training Universe");
//! let tree = root.with_child_added(TrainingNode::ROOT_ID);
//! assert_eq!(tree.node_count(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Theme color tokens for the training wheel.
pub mod colors {
    pub const PUSH_SKILL: &str = "#FF3D77"; // Pink
    pub const PUSH_STRENGTH: &str = "#FF0000"; // Red
    pub const MOBILITY: &str = "#FFA500"; // Orange
    pub const ACTIVITY: &str = "#7CFC00"; // Green
    pub const PULL: &str = "#3D99FF"; // Blue
    pub const LEGS: &str = "#ADD8E6"; // Light Blue
}

/// A single node in the Why/How/What training hierarchy.
///
/// # Fields
///
/// - `id`: Unique, stable identifier (`"root"` for the root sentinel)
/// - `name`: Display name
/// - `color`: Theme color token (hex string)
/// - `value`: Accumulated volume from logged workouts (leaves only)
/// - `level`: Depth in the tree (0 = root, 1 = Why, 2 = How, 3 = What)
/// - `children`: `None` marks a pure leaf; `Some(vec![])` is a container
///   still waiting for its first child
/// - `description`: Optional free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingNode {
    pub id: String,

    pub name: String,

    pub color: String,

    /// Volume accumulated from log deltas. Containers leave this unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    pub level: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TrainingNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update applied by [`TrainingNode::with_node_updated`].
///
/// Only the renameable surface of a node is updatable in place; structural
/// fields (level, children) change through the dedicated tree operations.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl TrainingNode {
    /// Reserved identifier of the single root node.
    pub const ROOT_ID: &'static str = "root";

    /// Neutral color carried by the root; children of the root do not
    /// inherit it.
    pub const ROOT_COLOR: &'static str = "#FFFFFF";

    /// Accent color given to children added directly under the root.
    pub const ACCENT_COLOR: &'static str = "#FF3D77";

    /// Default display name for a freshly added child.
    pub const DEFAULT_CHILD_NAME: &'static str = "New Activity";

    /// Deepest level at which the add affordance still appears. Nodes at
    /// this level are pure leaves ("What" nodes).
    pub const MAX_EDITABLE_LEVEL: u32 = 3;

    /// Create the level-0 root sentinel with the neutral color.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: Self::ROOT_ID.to_string(),
            name: name.into(),
            color: Self::ROOT_COLOR.to_string(),
            value: None,
            level: 0,
            children: Some(Vec::new()),
            description: None,
        }
    }

    /// A node is a leaf when it has no children collection or an empty one.
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().is_none_or(|c| c.is_empty())
    }

    /// Depth-first pre-order lookup by id.
    pub fn find(&self, id: &str) -> Option<&TrainingNode> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .as_ref()?
            .iter()
            .find_map(|child| child.find(id))
    }

    /// Display name for an id, if the node exists anywhere in the tree.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.find(id).map(|node| node.name.as_str())
    }

    /// Total number of nodes in the tree (this node included).
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(TrainingNode::node_count)
            .sum::<usize>()
    }

    /// All leaf nodes in pre-order, root excluded.
    pub fn leaves(&self) -> Vec<&TrainingNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TrainingNode>) {
        if self.is_leaf() {
            if self.id != Self::ROOT_ID {
                out.push(self);
            }
            return;
        }
        for child in self.children.iter().flatten() {
            child.collect_leaves(out);
        }
    }

    /// Ids of the node with `id` and all of its descendants. Empty when the
    /// id is not present.
    pub fn subtree_ids(&self, id: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        if let Some(node) = self.find(id) {
            node.collect_ids(&mut out);
        }
        out
    }

    fn collect_ids(&self, out: &mut HashSet<String>) {
        out.insert(self.id.clone());
        for child in self.children.iter().flatten() {
            child.collect_ids(out);
        }
    }

    /// The level-1 ancestor ("category") whose subtree contains `id`.
    ///
    /// Returns the category node itself when `id` names a category.
    pub fn category_of(&self, id: &str) -> Option<&TrainingNode> {
        self.children
            .iter()
            .flatten()
            .find(|category| category.find(id).is_some())
    }

    /// Flat id -> color lookup over the whole tree, recomputed by dependent
    /// views whenever the tree changes.
    pub fn color_index(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        self.collect_colors(&mut map);
        map
    }

    fn collect_colors(&self, map: &mut HashMap<String, String>) {
        map.insert(self.id.clone(), self.color.clone());
        for child in self.children.iter().flatten() {
            child.collect_colors(map);
        }
    }

    /// Append a new default-named child under `parent_id`.
    ///
    /// The child inherits the parent's color unless the parent carries the
    /// neutral root color, in which case it gets the accent color. Children
    /// of parents below level 2 are containers (empty children collection);
    /// deeper children are pure leaves. A missing parent id leaves the tree
    /// unchanged.
    pub fn with_child_added(&self, parent_id: &str) -> TrainingNode {
        let mut tree = self.clone();
        tree.append_child(parent_id);
        tree
    }

    fn append_child(&mut self, parent_id: &str) -> bool {
        if self.id == parent_id {
            let color = if self.color == Self::ROOT_COLOR {
                Self::ACCENT_COLOR.to_string()
            } else {
                self.color.clone()
            };
            let child = TrainingNode {
                id: Uuid::new_v4().to_string(),
                name: Self::DEFAULT_CHILD_NAME.to_string(),
                color,
                value: Some(0.0),
                level: self.level + 1,
                children: if self.level < 2 { Some(Vec::new()) } else { None },
                description: None,
            };
            self.children.get_or_insert_with(Vec::new).push(child);
            return true;
        }
        for child in self.children.iter_mut().flatten() {
            if child.append_child(parent_id) {
                return true;
            }
        }
        false
    }

    /// Apply a field-level update to the matching node. Missing id leaves
    /// the tree unchanged.
    pub fn with_node_updated(&self, id: &str, update: &NodeUpdate) -> TrainingNode {
        let mut tree = self.clone();
        tree.apply_update(id, update);
        tree
    }

    fn apply_update(&mut self, id: &str, update: &NodeUpdate) -> bool {
        if self.id == id {
            if let Some(name) = &update.name {
                self.name = name.clone();
            }
            if let Some(color) = &update.color {
                self.color = color.clone();
            }
            return true;
        }
        for child in self.children.iter_mut().flatten() {
            if child.apply_update(id, update) {
                return true;
            }
        }
        false
    }

    /// Remove the matching node and its entire subtree.
    ///
    /// Returns `None` when `id` names this node itself. The root is not
    /// special-cased here; callers must never pass the root id.
    pub fn with_subtree_removed(&self, id: &str) -> Option<TrainingNode> {
        if self.id == id {
            return None;
        }
        let mut tree = self.clone();
        tree.remove_subtree(id);
        Some(tree)
    }

    fn remove_subtree(&mut self, id: &str) {
        if let Some(children) = &mut self.children {
            children.retain(|child| child.id != id);
            for child in children.iter_mut() {
                child.remove_subtree(id);
            }
        }
    }

    /// Add `delta` (positive or negative) to the matching node's value,
    /// clamped so the stored value never drops below zero. Missing id leaves
    /// the tree unchanged.
    pub fn with_value_delta(&self, id: &str, delta: f64) -> TrainingNode {
        let mut tree = self.clone();
        tree.apply_value_delta(id, delta);
        tree
    }

    fn apply_value_delta(&mut self, id: &str, delta: f64) -> bool {
        if self.id == id {
            let next = self.value.unwrap_or(0.0) + delta;
            self.value = Some(next.max(0.0));
            return true;
        }
        for child in self.children.iter_mut().flatten() {
            if child.apply_value_delta(id, delta) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TrainingNode {
        TrainingNode {
            id: "root".to_string(),
            name: "Training Universe".to_string(),
            color: TrainingNode::ROOT_COLOR.to_string(),
            value: None,
            level: 0,
            children: Some(vec![TrainingNode {
                id: "why-strong".to_string(),
                name: "BE STRONG".to_string(),
                color: "#cbd5e1".to_string(),
                value: None,
                level: 1,
                children: Some(vec![TrainingNode {
                    id: "how-push".to_string(),
                    name: "Pushing Strength".to_string(),
                    color: colors::PUSH_STRENGTH.to_string(),
                    value: None,
                    level: 2,
                    children: Some(vec![TrainingNode {
                        id: "what-hspu".to_string(),
                        name: "HSPU".to_string(),
                        color: colors::PUSH_STRENGTH.to_string(),
                        value: Some(10.0),
                        level: 3,
                        children: None,
                        description: None,
                    }]),
                    description: None,
                }]),
                description: None,
            }]),
            description: None,
        }
    }

    #[test]
    fn add_child_grows_tree_by_one_at_next_level() {
        let tree = sample_tree();
        let before = tree.node_count();

        let updated = tree.with_child_added("how-push");
        assert_eq!(updated.node_count(), before + 1);

        let parent = updated.find("how-push").unwrap();
        let added = parent.children.as_ref().unwrap().last().unwrap();
        assert_eq!(added.level, 3);
        assert_eq!(added.name, TrainingNode::DEFAULT_CHILD_NAME);
        assert_eq!(added.value, Some(0.0));
        // Level-3 children are pure leaves, no children collection at all.
        assert!(added.children.is_none());
    }

    #[test]
    fn add_child_under_container_level_creates_container() {
        let tree = sample_tree().with_child_added("why-strong");
        let parent = tree.find("why-strong").unwrap();
        let added = parent.children.as_ref().unwrap().last().unwrap();
        assert_eq!(added.level, 2);
        assert_eq!(added.children, Some(Vec::new()));
        assert_eq!(added.color, "#cbd5e1");
    }

    #[test]
    fn add_child_under_root_uses_accent_color() {
        let tree = sample_tree().with_child_added(TrainingNode::ROOT_ID);
        let root_children = tree.children.as_ref().unwrap();
        let added = root_children.last().unwrap();
        assert_eq!(added.color, TrainingNode::ACCENT_COLOR);
        assert_eq!(added.level, 1);
    }

    #[test]
    fn add_child_missing_parent_is_noop() {
        let tree = sample_tree();
        let updated = tree.with_child_added("nope");
        assert_eq!(updated, tree);
    }

    #[test]
    fn update_node_renames_and_recolors() {
        let update = NodeUpdate {
            name: Some("Pressing".to_string()),
            color: Some("#123456".to_string()),
        };
        let tree = sample_tree().with_node_updated("how-push", &update);
        let node = tree.find("how-push").unwrap();
        assert_eq!(node.name, "Pressing");
        assert_eq!(node.color, "#123456");
    }

    #[test]
    fn update_missing_node_is_noop() {
        let tree = sample_tree();
        let update = NodeUpdate {
            name: Some("x".to_string()),
            color: None,
        };
        assert_eq!(tree.with_node_updated("nope", &update), tree);
    }

    #[test]
    fn delete_removes_whole_subtree() {
        let tree = sample_tree().with_subtree_removed("how-push").unwrap();
        assert!(tree.find("how-push").is_none());
        assert!(tree.find("what-hspu").is_none());
        assert!(tree.find("why-strong").is_some());
    }

    #[test]
    fn delete_missing_id_is_idempotent() {
        let tree = sample_tree();
        assert_eq!(tree.with_subtree_removed("nope").unwrap(), tree);
    }

    #[test]
    fn delete_self_returns_none() {
        assert!(sample_tree().with_subtree_removed("root").is_none());
    }

    #[test]
    fn value_deltas_compose_and_clamp_at_zero() {
        let tree = sample_tree()
            .with_value_delta("what-hspu", 5.0)
            .with_value_delta("what-hspu", -100.0);
        assert_eq!(tree.find("what-hspu").unwrap().value, Some(0.0));

        let tree = sample_tree()
            .with_value_delta("what-hspu", 2.5)
            .with_value_delta("what-hspu", 1.5);
        assert_eq!(tree.find("what-hspu").unwrap().value, Some(14.0));
    }

    #[test]
    fn value_delta_missing_id_is_noop() {
        let tree = sample_tree();
        assert_eq!(tree.with_value_delta("nope", 3.0), tree);
    }

    #[test]
    fn color_index_covers_every_node() {
        let index = sample_tree().color_index();
        assert_eq!(index.len(), 4);
        assert_eq!(
            index.get("what-hspu").map(String::as_str),
            Some(colors::PUSH_STRENGTH)
        );
    }

    #[test]
    fn category_of_walks_up_to_level_one() {
        let tree = sample_tree();
        assert_eq!(tree.category_of("what-hspu").unwrap().id, "why-strong");
        assert_eq!(tree.category_of("why-strong").unwrap().id, "why-strong");
        assert!(tree.category_of("nope").is_none());
    }

    #[test]
    fn leaves_skip_containers() {
        let tree = sample_tree();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].id, "what-hspu");
    }
}

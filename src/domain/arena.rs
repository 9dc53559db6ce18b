use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{EntityNode, Level};

/// Data payload for tree nodes representing entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Display name, also the value children store in `parent`
    pub name: String,
    /// Depth of the record, 1 for the company
    pub level: Level,
    /// Position in the source array for this level
    pub index: usize,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Entity data for this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for the company
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Arena-based tree structure for one entity forest.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal, children left to right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Names of all leaf nodes (nodes with no children), left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }

    /// First node in pre-order with this level and name.
    pub fn find(&self, level: Level, name: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.data.level == level && node.data.name == name)
            .map(|(idx, _)| idx)
    }

    /// Names from the root down to `idx`, inclusive.
    pub fn path_to(&self, idx: Index) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(node) = current.and_then(|i| self.get_node(i)) {
            path.push(node.data.name.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Nested, owned view of the tree for presentation.
    pub fn to_entity_node(&self) -> Option<EntityNode> {
        self.root.and_then(|root| self.nested(root))
    }

    fn nested(&self, idx: Index) -> Option<EntityNode> {
        let node = self.get_node(idx)?;
        let mut out = EntityNode::new(node.data.name.clone(), node.data.level, node.data.index);
        out.children = node
            .children
            .iter()
            .filter_map(|&child| self.nested(child))
            .collect();
        Some(out)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

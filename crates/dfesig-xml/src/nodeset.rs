#![forbid(unsafe_code)]

//! NodeSet type for XML canonicalization and transforms.
//!
//! A `NodeSet` is the XPath-style set of document nodes a reference selects.
//! Nodes are identified by their roxmltree `NodeId`, which is stable across
//! re-parses of the same text.

use roxmltree::{Node, NodeId};
use std::collections::HashSet;

/// A set of XML document nodes identified by `NodeId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: HashSet<NodeId>,
}

impl NodeSet {
    /// Create a node set containing every node of the document.
    pub fn all(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_with_comments(doc.root())
    }

    /// Create a node set containing every node except comments.
    pub fn all_without_comments(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_without_comments(doc.root())
    }

    /// Create a node set for the subtree rooted at `root` (without comments).
    ///
    /// This is what a same-document `#id` reference selects.
    pub fn tree_without_comments(root: Node<'_, '_>) -> Self {
        let mut nodes = HashSet::new();
        collect_subtree(root, &mut nodes, false);
        Self { nodes }
    }

    /// Create a node set for the subtree rooted at `root` (with comments).
    pub fn tree_with_comments(root: Node<'_, '_>) -> Self {
        let mut nodes = HashSet::new();
        collect_subtree(root, &mut nodes, true);
        Self { nodes }
    }

    /// Check if a node is in this set.
    pub fn contains(&self, node: &Node<'_, '_>) -> bool {
        self.nodes.contains(&node.id())
    }

    /// Remove `node` and all of its descendants. Returns how many nodes
    /// were actually removed.
    pub fn remove_subtree(&mut self, node: Node<'_, '_>) -> usize {
        node.descendants()
            .filter(|n| self.nodes.remove(&n.id()))
            .count()
    }
}

fn collect_subtree(root: Node<'_, '_>, set: &mut HashSet<NodeId>, include_comments: bool) {
    for node in root.descendants() {
        if include_comments || !node.is_comment() {
            set.insert(node.id());
        }
    }
}

//! Capability set selector matching needs from a tree
//!
//! [`super::ElementRef`] never looks at node payloads for structure or
//! attributes; it calls the methods below. [`Tree`] implements the trait with
//! [`NodeId`] handles.

use std::borrow::Cow;

use crate::node::{NodeId, NodeKind, Tree};

/// Read-only view of a tree as seen by selector matching
///
/// Implementors provide the structural queries; the search helpers
/// (`find_one`, `find_all`, `exists_one`, `remove_subsets`) are provided in
/// terms of them. Search helpers walk in depth-first pre-order and only hand
/// element nodes to the test.
pub trait SelectorAdapter {
    /// Node handle
    type Node: Copy + Eq;

    /// Whether the node is an element (fragments included)
    fn is_tag(&self, node: Self::Node) -> bool;

    /// Tag name; empty for fragments and non-elements
    fn get_name(&self, node: Self::Node) -> &str;

    /// Value of an attribute, if present
    fn get_attribute_value(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Whether the attribute is present
    fn has_attrib(&self, node: Self::Node, name: &str) -> bool {
        self.get_attribute_value(node, name).is_some()
    }

    /// Children; empty for nodes that cannot have any
    fn get_children(&self, node: Self::Node) -> &[Self::Node];

    /// Parent; `None` for the root
    fn get_parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// The node and its siblings, in document order
    fn get_siblings(&self, node: Self::Node) -> Cow<'_, [Self::Node]>;

    /// Concatenated text content of the subtree
    fn get_text(&self, node: Self::Node) -> String;

    /// Whether any element in the forest, or below one, passes `test`
    ///
    /// Only descends into elements.
    fn exists_one(&self, test: &mut dyn FnMut(Self::Node) -> bool, nodes: &[Self::Node]) -> bool {
        let mut stack: Vec<Self::Node> = nodes.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if !self.is_tag(node) {
                continue;
            }
            if test(node) {
                return true;
            }
            stack.extend(self.get_children(node).iter().rev().copied());
        }
        false
    }

    /// First element in pre-order that passes `test`
    fn find_one(
        &self,
        test: &mut dyn FnMut(Self::Node) -> bool,
        nodes: &[Self::Node],
    ) -> Option<Self::Node> {
        let mut stack: Vec<Self::Node> = nodes.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.is_tag(node) && test(node) {
                return Some(node);
            }
            stack.extend(self.get_children(node).iter().rev().copied());
        }
        None
    }

    /// Every element in pre-order that passes `test`
    ///
    /// Matched elements are still descended into.
    fn find_all(
        &self,
        test: &mut dyn FnMut(Self::Node) -> bool,
        nodes: &[Self::Node],
    ) -> Vec<Self::Node> {
        let mut found = Vec::new();
        let mut stack: Vec<Self::Node> = nodes.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.is_tag(node) && test(node) {
                found.push(node);
            }
            stack.extend(self.get_children(node).iter().rev().copied());
        }
        found
    }

    /// Drop repeated nodes and nodes whose ancestor is also in the list
    ///
    /// The first occurrence of each surviving node keeps its position.
    fn remove_subsets(&self, nodes: &[Self::Node]) -> Vec<Self::Node> {
        let mut kept = Vec::with_capacity(nodes.len());
        for (index, &node) in nodes.iter().enumerate() {
            if nodes[..index].contains(&node) {
                continue;
            }
            let mut ancestor = self.get_parent(node);
            let mut covered = false;
            while let Some(current) = ancestor {
                if nodes.contains(&current) {
                    covered = true;
                    break;
                }
                ancestor = self.get_parent(current);
            }
            if !covered {
                kept.push(node);
            }
        }
        kept
    }
}

impl SelectorAdapter for Tree {
    type Node = NodeId;

    fn is_tag(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    fn get_name(&self, node: NodeId) -> &str {
        self.element(node)
            .and_then(|element| element.tag_name())
            .unwrap_or("")
    }

    fn get_attribute_value(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|element| element.attributes.get(name))
            .map(String::as_str)
    }

    fn has_attrib(&self, node: NodeId, name: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.attributes.contains_key(name))
    }

    fn get_children(&self, node: NodeId) -> &[NodeId] {
        self.children(node)
    }

    fn get_parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn get_siblings(&self, node: NodeId) -> Cow<'_, [NodeId]> {
        match self.parent(node) {
            Some(parent) => Cow::Borrowed(self.children(parent)),
            None => Cow::Owned(vec![node]),
        }
    }

    fn get_text(&self, node: NodeId) -> String {
        let mut text = String::new();
        collect_text(self, node, &mut text);
        text
    }
}

fn collect_text(tree: &Tree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        Some(NodeKind::Element(element)) if element.tag_name() == Some("br") => out.push('\n'),
        Some(NodeKind::Element(_)) | Some(NodeKind::Document) => {
            for &child in tree.children(node) {
                collect_text(tree, child, out);
            }
        }
        Some(NodeKind::Text(value)) => out.push_str(value),
        Some(NodeKind::Comment(_)) | Some(NodeKind::Doctype(_)) | None => {}
    }
}

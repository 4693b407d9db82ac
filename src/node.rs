//! Arena-backed markup tree
//!
//! Every node lives in a single `Vec` owned by [`Tree`] and is addressed by a
//! [`NodeId`]. Children are owned by their parent's `children` list; the
//! `parent` field is a plain handle used for upward queries (ancestor walks,
//! sibling lookup), so the parent/child cycle never turns into a reference
//! cycle.
//!
//! # Node kinds
//!
//! [`NodeKind`] is a closed sum type:
//!
//! - `Document`: the root, always stored at [`NodeId::ROOT`]
//! - `Element`: a tag or a [`ElementName::Fragment`] marker, with ordered
//!   attributes and an optional out-of-band render function
//! - `Text`, `Comment`, `Doctype`: literal payloads
//!
//! # Lifetime of nodes
//!
//! Nodes are only appended to the arena. Detaching a node makes it
//! unreachable from the Document, which is what "removed" means for a tree;
//! the slot itself is kept until the whole tree is dropped.
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::node::{Attributes, Tree};
//!
//! let mut tree = Tree::new();
//! let heading = tree.create_element("h1", Attributes::new());
//! let text = tree.create_text("Hello");
//! tree.append_child(heading, text);
//! tree.append_child(tree.root(), heading);
//!
//! assert_eq!(tree.parent(text), Some(heading));
//! assert_eq!(tree.children(tree.root()), &[heading]);
//! ```

use indexmap::IndexMap;
use std::fmt;

use crate::render::RenderFn;

/// Ordered attribute map; iteration follows insertion order
pub type Attributes = IndexMap<String, String>;

/// Handle of a node inside a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The Document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Source span of a node, kept for diagnostics only
///
/// The tokenizer reports line numbers, so `start` and `end` are 1-based line
/// numbers. Nodes built programmatically carry the default (0, 0) span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    /// Line the construct starts on
    pub start: u64,
    /// Line the construct ends on
    pub end: u64,
}

impl Location {
    /// Span covering a single line
    pub fn line(line: u64) -> Self {
        Self {
            start: line,
            end: line,
        }
    }
}

/// Discriminant of a node, mirroring the variants of [`NodeKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Root of a tree
    Document = 0,
    /// Tag or fragment
    Element = 1,
    /// Character data
    Text = 2,
    /// `<!--…-->`
    Comment = 3,
    /// `<!DOCTYPE …>`
    Doctype = 4,
}

/// Name of an element: a tag, or the fragment marker that renders only its children
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementName {
    /// Ordinary tag name
    Tag(String),
    /// Transparent wrapper; the tag is elided on output
    Fragment,
}

impl ElementName {
    /// Tag name, or `None` for a fragment
    pub fn as_tag(&self) -> Option<&str> {
        match self {
            ElementName::Tag(name) => Some(name),
            ElementName::Fragment => None,
        }
    }

    /// Whether this is the fragment marker
    pub fn is_fragment(&self) -> bool {
        matches!(self, ElementName::Fragment)
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementName::Tag(name) => f.write_str(name),
            ElementName::Fragment => f.write_str("#fragment"),
        }
    }
}

impl From<&str> for ElementName {
    fn from(name: &str) -> Self {
        ElementName::Tag(name.to_string())
    }
}

impl From<String> for ElementName {
    fn from(name: String) -> Self {
        ElementName::Tag(name)
    }
}

/// Element payload
///
/// The render function is stored next to the attributes rather than among
/// them, so it never shows up when attributes are iterated or compared.
#[derive(Clone)]
pub struct ElementData {
    /// Tag name or fragment marker
    pub name: ElementName,
    /// Attributes in source order
    pub attributes: Attributes,
    render: Option<RenderFn>,
}

impl ElementData {
    /// Create element data without a render function
    pub fn new(name: impl Into<ElementName>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            attributes,
            render: None,
        }
    }

    /// Tag name, or `None` for a fragment
    pub fn tag_name(&self) -> Option<&str> {
        self.name.as_tag()
    }

    /// Custom render function attached to this element, if any
    pub fn render_fn(&self) -> Option<&RenderFn> {
        self.render.as_ref()
    }

    /// Attach a render function, replacing any previous one
    pub fn set_render_fn(&mut self, render: RenderFn) {
        self.render = Some(render);
    }

    /// Remove the render function, returning it
    pub fn clear_render_fn(&mut self) -> Option<RenderFn> {
        self.render.take()
    }
}

impl fmt::Debug for ElementData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementData")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("has_render_fn", &self.render.is_some())
            .finish()
    }
}

/// Kind-specific payload of a node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Root of the tree
    Document,
    /// Tag or fragment
    Element(ElementData),
    /// Character data, emitted verbatim
    Text(String),
    /// Comment payload without the `<!--`/`-->` delimiters
    Comment(String),
    /// Doctype payload without the `<`/`>` delimiters
    Doctype(String),
}

impl NodeKind {
    /// Discriminant of this kind
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Doctype(_) => NodeType::Doctype,
        }
    }
}

/// A single node slot in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Kind-specific payload
    pub kind: NodeKind,
    /// Source span
    pub location: Location,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, location: Location) -> Self {
        Self {
            kind,
            location,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent handle, `None` for the Document and for detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Discriminant of this node
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Element payload if this node is an element
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }
}

/// Arena-based markup tree rooted at a Document node
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only the Document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, Location::default())],
        }
    }

    /// Root Document handle
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its handle
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable node by its handle
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of allocated nodes, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the Document occupies the first slot
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Payload of a node
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Children of a node; empty for leaves and unknown handles
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Position of a node among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Element payload if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element payload if the node is an element
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Value of a Text, Comment or Doctype node
    pub fn literal_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(value) | NodeKind::Comment(value) | NodeKind::Doctype(value) => {
                Some(value)
            }
            NodeKind::Document | NodeKind::Element(_) => None,
        }
    }

    /// Iterate over the ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over the descendants of a node in depth-first pre-order,
    /// excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Allocate a detached node
    pub fn create(&mut self, kind: NodeKind, location: Location) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, location));
        id
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, name: impl Into<ElementName>, attributes: Attributes) -> NodeId {
        self.create(
            NodeKind::Element(ElementData::new(name, attributes)),
            Location::default(),
        )
    }

    /// Allocate a detached fragment element
    pub fn create_fragment(&mut self) -> NodeId {
        self.create_element(ElementName::Fragment, Attributes::new())
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(value.into()), Location::default())
    }

    /// Allocate a detached comment node
    pub fn create_comment(&mut self, value: impl Into<String>) -> NodeId {
        self.create(NodeKind::Comment(value.into()), Location::default())
    }

    /// Allocate a detached doctype node
    pub fn create_doctype(&mut self, value: impl Into<String>) -> NodeId {
        self.create(NodeKind::Doctype(value.into()), Location::default())
    }

    /// Append `child` as the last child of `parent`
    ///
    /// The child is detached from its previous parent first. Cycles are not
    /// checked: appending an ancestor under its own descendant corrupts the
    /// tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Insert `child` at `index` among the children of `parent`
    ///
    /// `index` is clamped to the number of children. The child is detached
    /// from its previous parent first, and the index refers to the children
    /// list after that detach.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || child == NodeId::ROOT {
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Remove a node from its parent's children
    ///
    /// Returns the index it occupied. The subtree stays intact and can be
    /// re-attached elsewhere.
    pub fn detach(&mut self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id);
        if let Some(index) = index {
            self.nodes[parent.0].children.remove(index);
        }
        self.nodes[id.0].parent = None;
        index
    }

    /// Replace a node by its own children, in place
    ///
    /// The promoted children take the node's position and are re-parented to
    /// the node's parent. The node itself ends up detached and childless.
    /// Returns `false` when the node has no parent.
    pub fn unwrap_node(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(index) = self.detach(id) else {
            return false;
        };
        let promoted = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &promoted {
            self.nodes[child.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        siblings.splice(index..index, promoted);
        true
    }

    /// Attach a render function to an element
    ///
    /// Returns `false` if the node is not an element.
    pub fn set_render_fn(&mut self, id: NodeId, render: RenderFn) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.set_render_fn(render);
                true
            }
            None => false,
        }
    }

    /// Remove the render function from an element
    pub fn clear_render_fn(&mut self, id: NodeId) -> Option<RenderFn> {
        self.element_mut(id).and_then(ElementData::clear_render_fn)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

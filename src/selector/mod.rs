//! CSS selector queries over a [`Tree`]
//!
//! The free functions take a selector string and compile it on every call.
//! Use [`Selector::parse`] to compile once and query many times. Parsing and
//! matching are done by servo's `selectors` crate, so any standard selector
//! works, `:nth-child(2n of .x)` and `:has(> img)` included.
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::parser::parse;
//! use markup_rewriter::selector::{query_selector, query_selector_all};
//!
//! let tree = parse("<div><h1>Hello world</h1><p class=\"a\">x</p><p>y</p></div>");
//! let heading = query_selector(&tree, tree.root(), "h1").unwrap();
//! assert!(heading.is_some());
//!
//! let paragraphs = query_selector_all(&tree, tree.root(), "div > p").unwrap();
//! assert_eq!(paragraphs.len(), 2);
//!
//! let second = query_selector_all(&tree, tree.root(), "p:nth-child(3)").unwrap();
//! assert_eq!(second.len(), 1);
//! ```

pub mod adapter;
pub mod element;

use std::fmt;
use std::str::FromStr;

use crate::error::RewriteError;
use crate::node::{NodeId, Tree};

pub use adapter::SelectorAdapter;
pub use element::ElementRef;
use element::{SelectorList, matches_list, parse_selector_list};

type Result<T> = std::result::Result<T, RewriteError>;

/// A compiled selector list
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList,
}

impl Selector {
    /// Compile a selector
    ///
    /// # Errors
    ///
    /// [`RewriteError::InvalidSelector`] on syntax errors, state
    /// pseudo-classes (`:hover`) and pseudo-elements.
    pub fn parse(source: &str) -> Result<Self> {
        let list = parse_selector_list(source)?;
        tracing::trace!(selector = source, "compiled selector");
        Ok(Self {
            source: source.to_string(),
            list,
        })
    }

    /// Source text the selector was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether a node of `tree` matches; never true for non-elements
    pub fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        ElementRef::new(tree, node).is_some_and(|element| matches_list(&self.list, &element))
    }

    /// First matching descendant of `node`, in pre-order
    pub fn select_one(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        tree.find_one(&mut |candidate| self.matches(tree, candidate), tree.children(node))
    }

    /// Every matching descendant of `node`, in pre-order
    pub fn select_all(&self, tree: &Tree, node: NodeId) -> Vec<NodeId> {
        tree.find_all(&mut |candidate| self.matches(tree, candidate), tree.children(node))
    }

    /// Every match within a forest: the given nodes and their descendants
    ///
    /// The forest is normalized first, so nested or repeated context nodes
    /// never yield duplicate results.
    pub fn select_all_in(&self, tree: &Tree, nodes: &[NodeId]) -> Vec<NodeId> {
        let roots = tree.remove_subsets(nodes);
        tree.find_all(&mut |candidate| self.matches(tree, candidate), &roots)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Selector {}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = RewriteError;

    fn from_str(source: &str) -> Result<Self> {
        Selector::parse(source)
    }
}

/// Whether `node` matches `selector`
pub fn matches(tree: &Tree, node: NodeId, selector: &str) -> Result<bool> {
    Ok(Selector::parse(selector)?.matches(tree, node))
}

/// First descendant of `node` matching `selector`, depth-first
///
/// The node itself is not a candidate.
pub fn query_selector(tree: &Tree, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
    Ok(Selector::parse(selector)?.select_one(tree, node))
}

/// All descendants of `node` matching `selector`, in document order
pub fn query_selector_all(tree: &Tree, node: NodeId, selector: &str) -> Result<Vec<NodeId>> {
    Ok(Selector::parse(selector)?.select_all(tree, node))
}

/// All matches within a forest of context nodes, context nodes included
pub fn query_selector_all_in(tree: &Tree, nodes: &[NodeId], selector: &str) -> Result<Vec<NodeId>> {
    Ok(Selector::parse(selector)?.select_all_in(tree, nodes))
}

//! Binding to servo's `selectors` matching engine
//!
//! `selectors` parses and matches standard CSS; this module supplies the
//! pieces it asks for: a [`SelectorImpl`](parser::SelectorImpl) with plain
//! string atoms, a [`Parser`](parser::Parser) that enables `:is()`,
//! `:where()`, `:has()` and `:nth-child(… of S)`, and [`ElementRef`], an
//! implementation of [`selectors::Element`] that only navigates through
//! [`SelectorAdapter`].

use std::fmt;

use cssparser::ToCss;
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{self, ElementSelectorFlags, MatchingContext};
use selectors::parser::{self, ParseRelative, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};

use crate::error::RewriteError;
use crate::node::{Node, NodeId, NodeKind, Tree};

use super::adapter::SelectorAdapter;

/// Compiled selector list
pub(crate) type SelectorList = parser::SelectorList<MarkupSelectors>;

/// Type bundle handed to `selectors`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupSelectors;

impl parser::SelectorImpl for MarkupSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssName;
    type LocalName = CssName;
    type NamespacePrefix = CssName;
    type NamespaceUrl = CssName;
    type BorrowedNamespaceUrl = CssName;
    type BorrowedLocalName = CssName;
    type NonTSPseudoClass = NonTsPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Identifier atom: names, ids, classes, namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssName(pub String);

impl From<&str> for CssName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl ToCss for CssName {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssName {
    // FNV-1a; only feeds the ancestor bloom filter, which is not used here.
    fn precomputed_hash(&self) -> u32 {
        self.0.bytes().fold(0x811c_9dc5, |hash: u32, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
        })
    }
}

/// Attribute value operand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssString(pub String);

impl From<&str> for CssString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// No state pseudo-classes (`:hover`, `:checked`, …) exist for static markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonTsPseudoClass {}

impl parser::NonTSPseudoClass for NonTsPseudoClass {
    type Impl = MarkupSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for NonTsPseudoClass {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

/// Pseudo-elements are never parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl parser::PseudoElement for PseudoElement {
    type Impl = MarkupSelectors;
}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

struct SelectorParser;

impl<'i> parser::Parser<'i> for SelectorParser {
    type Impl = MarkupSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_nth_child_of(&self) -> bool {
        true
    }

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_has(&self) -> bool {
        true
    }
}

/// Compile a selector list
pub(crate) fn parse_selector_list(source: &str) -> Result<SelectorList, RewriteError> {
    let mut input = cssparser::ParserInput::new(source);
    let mut css = cssparser::Parser::new(&mut input);
    parser::SelectorList::parse(&SelectorParser, &mut css, ParseRelative::No).map_err(|err| {
        RewriteError::InvalidSelector(format!(
            "{:?} at line {}, column {}: {:?}",
            source, err.location.line, err.location.column, err.kind
        ))
    })
}

/// Whether any selector of the list matches `element`
pub(crate) fn matches_list(list: &SelectorList, element: &ElementRef<'_>) -> bool {
    let mut caches = matching::SelectorCaches::default();
    let mut context = MatchingContext::new(
        matching::MatchingMode::Normal,
        None,
        &mut caches,
        matching::QuirksMode::NoQuirks,
        matching::NeedsSelectorFlags::No,
        matching::MatchingForInvalidation::No,
    );
    list.slice()
        .iter()
        .any(|selector| matching::matches_selector(selector, 0, None, element, &mut context))
}

/// An element node of a [`Tree`] as seen by `selectors`
///
/// Fragments count as elements with an empty name, so they never match a
/// type selector but do act as parents and siblings.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    tree: &'a Tree,
    id: NodeId,
    node: &'a Node,
}

impl<'a> ElementRef<'a> {
    /// Wrap `id` if it is an element of `tree`
    pub fn new(tree: &'a Tree, id: NodeId) -> Option<Self> {
        let node = tree.get(id)?;
        tree.is_tag(id).then_some(Self { tree, id, node })
    }

    /// Handle of the wrapped node
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'a str {
        self.tree.get_name(self.id)
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tree.get_attribute_value(self.id, name)
    }

    /// Element siblings before (`before == true`) or after the node, nearest first
    fn sibling_element(&self, before: bool) -> Option<Self> {
        let parent = self.tree.get_parent(self.id)?;
        let siblings = self.tree.get_children(parent);
        let index = siblings.iter().position(|&sibling| sibling == self.id)?;
        if before {
            siblings[..index]
                .iter()
                .rev()
                .find_map(|&sibling| Self::new(self.tree, sibling))
        } else {
            siblings[index + 1..]
                .iter()
                .find_map(|&sibling| Self::new(self.tree, sibling))
        }
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl Element for ElementRef<'_> {
    type Impl = MarkupSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        self.tree
            .get_parent(self.id)
            .and_then(|parent| Self::new(self.tree, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(true)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(false)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.tree
            .get_children(self.id)
            .iter()
            .find_map(|&child| Self::new(self.tree, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssName) -> bool {
        self.name().eq_ignore_ascii_case(&local_name.0)
    }

    fn has_namespace(&self, ns: &CssName) -> bool {
        ns.0.is_empty()
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.name().eq_ignore_ascii_case(other.name())
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssName>,
        local_name: &CssName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns
            && !url.0.is_empty()
        {
            return false;
        }
        self.attribute(&local_name.0)
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTsPseudoClass,
        _context: &mut MatchingContext<'_, MarkupSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, MarkupSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssName, case_sensitivity: CaseSensitivity) -> bool {
        self.attribute("id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssName, case_sensitivity: CaseSensitivity) -> bool {
        self.attribute("class").is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
        })
    }

    fn has_custom_state(&self, _name: &CssName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssName) -> Option<CssName> {
        None
    }

    fn is_part(&self, _name: &CssName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self
            .tree
            .get_children(self.id)
            .iter()
            .any(|&child| match self.tree.kind(child) {
                Some(NodeKind::Element(_)) => true,
                Some(NodeKind::Text(text)) => !text.is_empty(),
                _ => false,
            })
    }

    fn is_root(&self) -> bool {
        self.tree
            .get_parent(self.id)
            .is_some_and(|parent| matches!(self.tree.kind(parent), Some(NodeKind::Document)))
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

//! Element and attribute sanitization
//!
//! The sanitizer decides one [`SanitizeAction`] per element:
//!
//! - **Allow**: keep the element, filtering its attributes
//! - **Block**: remove the element but keep its children in its place
//! - **Drop**: remove the element together with everything inside it
//!
//! # Decision order
//!
//! The first rule that applies wins:
//!
//! 1. fragments are always allowed
//! 2. names listed in `allow_elements` are allowed
//! 3. names listed in `block_elements` are blocked
//! 4. names listed in `drop_elements` are dropped (`script` is listed
//!    implicitly unless `allow_elements` names it)
//! 5. components are dropped unless `allow_components` is set
//! 6. custom elements are dropped unless `allow_custom_elements` is set
//! 7. with a non-empty `allow_elements`, everything else is dropped
//! 8. otherwise the element is allowed
//!
//! # Element kinds
//!
//! A name containing `-` is a custom element (`<my-card>`). A name starting
//! with an uppercase ASCII letter, `_` or `$`, or containing `.`, is a
//! component (`<Title>`, `<ui.Card>`). Tag names read by the parser are
//! lower-cased, so component names only survive on trees built in code or
//! renamed by [`swap`](super::swap).
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::transform::transform_sync;
//! use markup_rewriter::transformers::{SanitizeOptions, sanitize};
//!
//! let options = SanitizeOptions {
//!     block_elements: vec!["div".to_string()],
//!     ..SanitizeOptions::default()
//! };
//! let html = transform_sync(
//!     "<div><b>kept</b><script>alert(1)</script></div>",
//!     &[sanitize(options)],
//! )
//! .unwrap();
//! assert_eq!(html, "<b>kept</b>");
//! ```

use indexmap::IndexMap;

use crate::node::{Attributes, ElementData, ElementName, NodeId, NodeKind, Tree};
use crate::transform::Transformer;
use crate::walk::walk_sync;

/// Elements dropped unless explicitly allowed
const IMPLICIT_DROP_ELEMENTS: &[&str] = &["script"];

/// Wildcard entry in attribute rules, matching every tag
const ANY_TAG: &str = "*";

/// Sanitizer configuration
///
/// Attribute rules map an attribute name to the tag names it applies to;
/// `"*"` applies to every tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct SanitizeOptions {
    /// Elements to keep; when non-empty, every other element is dropped
    pub allow_elements: Vec<String>,
    /// Elements to remove while keeping their children
    pub block_elements: Vec<String>,
    /// Elements to remove together with their children
    pub drop_elements: Vec<String>,
    /// Attributes kept on the listed tags even when a drop rule matches
    pub allow_attributes: IndexMap<String, Vec<String>>,
    /// Attributes removed from the listed tags
    pub drop_attributes: IndexMap<String, Vec<String>>,
    /// Subject components to the rules above instead of dropping them
    pub allow_components: bool,
    /// Subject custom elements to the rules above instead of dropping them
    pub allow_custom_elements: bool,
    /// Keep comments. Accepted for configuration compatibility; comments
    /// are currently never removed.
    pub allow_comments: bool,
}

/// How an element name is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain element, including fragments
    Element,
    /// Component name such as `Title` or `ui.Card`
    Component,
    /// Custom element name such as `my-card`
    CustomElement,
}

impl ElementKind {
    /// Classify an element name
    ///
    /// ```rust
    /// use markup_rewriter::node::ElementName;
    /// use markup_rewriter::transformers::sanitize::ElementKind;
    ///
    /// assert_eq!(ElementKind::of(&ElementName::from("my-card")), ElementKind::CustomElement);
    /// assert_eq!(ElementKind::of(&ElementName::from("Title")), ElementKind::Component);
    /// assert_eq!(ElementKind::of(&ElementName::Fragment), ElementKind::Element);
    /// ```
    pub fn of(name: &ElementName) -> Self {
        let Some(name) = name.as_tag() else {
            return ElementKind::Element;
        };
        if name.contains('-') {
            return ElementKind::CustomElement;
        }
        let component_start = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c == '_' || c == '$');
        if component_start || name.contains('.') {
            ElementKind::Component
        } else {
            ElementKind::Element
        }
    }
}

/// Action to take on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Keep the element; only its attributes are filtered
    Allow,
    /// Remove the element, promoting its children into its place
    Block,
    /// Remove the element and all its children
    Drop,
}

/// Sanitizer with resolved options
#[derive(Debug, Clone)]
pub struct Sanitizer {
    options: SanitizeOptions,
}

impl Sanitizer {
    /// Resolve options into a sanitizer
    ///
    /// `script` joins the drop list unless `allow_elements` names it.
    pub fn new(mut options: SanitizeOptions) -> Self {
        for &implicit in IMPLICIT_DROP_ELEMENTS {
            let allowed = options.allow_elements.iter().any(|name| name == implicit);
            let listed = options.drop_elements.iter().any(|name| name == implicit);
            if !allowed && !listed {
                options.drop_elements.insert(0, implicit.to_string());
            }
        }
        Self { options }
    }

    /// Resolved options
    pub fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    /// Decide what happens to an element
    ///
    /// # Examples
    ///
    /// ```
    /// use markup_rewriter::node::ElementName;
    /// use markup_rewriter::transformers::sanitize::{SanitizeAction, Sanitizer};
    /// use markup_rewriter::transformers::SanitizeOptions;
    ///
    /// let sanitizer = Sanitizer::new(SanitizeOptions::default());
    /// assert_eq!(sanitizer.check_element(&ElementName::from("script")), SanitizeAction::Drop);
    /// assert_eq!(sanitizer.check_element(&ElementName::from("div")), SanitizeAction::Allow);
    /// ```
    pub fn check_element(&self, name: &ElementName) -> SanitizeAction {
        let Some(tag) = name.as_tag() else {
            return SanitizeAction::Allow;
        };
        let options = &self.options;
        if contains(&options.allow_elements, tag) {
            return SanitizeAction::Allow;
        }
        if contains(&options.block_elements, tag) {
            return SanitizeAction::Block;
        }
        if contains(&options.drop_elements, tag) {
            return SanitizeAction::Drop;
        }
        match ElementKind::of(name) {
            ElementKind::Component if !options.allow_components => return SanitizeAction::Drop,
            ElementKind::CustomElement if !options.allow_custom_elements => {
                return SanitizeAction::Drop;
            }
            _ => {}
        }
        if options.allow_elements.is_empty() {
            SanitizeAction::Allow
        } else {
            SanitizeAction::Drop
        }
    }

    /// Whether an allow rule protects `attribute` on `tag`
    pub fn is_attribute_allowed(&self, attribute: &str, tag: &str) -> bool {
        rule_matches(&self.options.allow_attributes, attribute, tag)
    }

    /// Whether a drop rule removes `attribute` from `tag`
    ///
    /// Allow rules take precedence.
    pub fn is_attribute_dropped(&self, attribute: &str, tag: &str) -> bool {
        !self.is_attribute_allowed(attribute, tag)
            && rule_matches(&self.options.drop_attributes, attribute, tag)
    }

    /// Filtered copy of an element's attributes
    ///
    /// Fragments lose every attribute.
    pub fn sanitize_attributes(&self, element: &ElementData) -> Attributes {
        let Some(tag) = element.tag_name() else {
            return Attributes::new();
        };
        element
            .attributes
            .iter()
            .filter(|(name, _)| !self.is_attribute_dropped(name, tag))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Sanitize every element reachable from the Document
    ///
    /// Actions are decided in a first pass and applied in document order in a
    /// second one. Each removal looks up the element's parent at that time,
    /// so a blocked ancestor does not hide a dropped descendant.
    pub fn sanitize_tree(&self, tree: &mut Tree) {
        let mut pending: Vec<(NodeId, SanitizeAction)> = Vec::new();
        walk_sync(tree, tree.root(), |tree, visit| {
            if let Some(NodeKind::Element(element)) = tree.kind(visit.node) {
                pending.push((visit.node, self.check_element(&element.name)));
            }
        });

        let (mut dropped, mut blocked) = (0usize, 0usize);
        for (node, action) in pending {
            match action {
                SanitizeAction::Drop => {
                    tree.detach(node);
                    dropped += 1;
                }
                SanitizeAction::Block => {
                    tree.unwrap_node(node);
                    blocked += 1;
                }
                SanitizeAction::Allow => {
                    let filtered = tree.element(node).map(|element| self.sanitize_attributes(element));
                    if let (Some(filtered), Some(element)) = (filtered, tree.element_mut(node)) {
                        element.attributes = filtered;
                    }
                }
            }
        }
        tracing::debug!(dropped, blocked, "sanitized tree");
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizeOptions::default())
    }
}

fn contains(list: &[String], name: &str) -> bool {
    list.iter().any(|entry| entry == name)
}

fn rule_matches(rules: &IndexMap<String, Vec<String>>, attribute: &str, tag: &str) -> bool {
    rules
        .get(attribute)
        .is_some_and(|tags| tags.iter().any(|t| t == tag || t == ANY_TAG))
}

/// Build a synchronous transformer that sanitizes the tree
pub fn sanitize(options: SanitizeOptions) -> Transformer {
    let sanitizer = Sanitizer::new(options);
    Transformer::sync(move |mut tree| {
        sanitizer.sanitize_tree(&mut tree);
        Ok(tree)
    })
}

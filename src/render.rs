//! Rendering engine - serializes a tree back to markup text
//!
//! Two entry points share one set of serialization rules:
//!
//! - [`render_sync`] / [`render_nodes_sync`] never suspend. A render function
//!   that returns [`RenderOutput::Pending`] makes them fail with
//!   [`RewriteError::BlockingSuspension`].
//! - [`render`] / [`render_nodes`] return a future. Pending render functions
//!   are awaited, and sibling nodes are rendered concurrently, joined back in
//!   document order.
//!
//! On trees without suspending render functions both paths produce identical
//! output.
//!
//! # Serialization rules
//!
//! | Node | Output |
//! |------|--------|
//! | Document | children, concatenated |
//! | Text | value, verbatim |
//! | Comment | `<!--value-->` |
//! | Doctype | `<value>` |
//! | Element with render function | whatever the function returns |
//! | Fragment | children only |
//! | Element in SVG scope, no children | `<name attrs />` |
//! | Void element | `<name attrs>` |
//! | Any other element | `<name attrs>children</name>` |
//!
//! Attribute values are written verbatim between double quotes. Text nodes are
//! not escaped either: they hold markup-safe text. The parser re-escapes the
//! character data the tokenizer decoded (see [`escape_attribute_value`] and
//! [`escape_html`]), and trees built in code must store escaped text.
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::parser::parse;
//! use markup_rewriter::render::render_sync;
//!
//! let tree = parse("<svg><path d=\"0 0 0\" /></svg><br>");
//! let html = render_sync(&tree, tree.root()).unwrap();
//! assert_eq!(html, "<svg><path d=\"0 0 0\" /></svg><br>");
//! ```

use futures::future::{FutureExt, LocalBoxFuture, try_join_all};
use std::fmt;
use std::rc::Rc;

use crate::error::RewriteError;
use crate::node::{Attributes, ElementData, NodeId, NodeKind, Tree};

type Result<T> = std::result::Result<T, RewriteError>;

/// Elements that never have a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Whether a tag name is in the void element set
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Escape `&`, `<` and `>` for inclusion in markup
///
/// Quotes are left alone; the output is meant for text content, not
/// attribute values.
///
/// # Examples
///
/// ```rust
/// use markup_rewriter::render::escape_html;
///
/// assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape `&` and `"` so a value can sit between double quotes
///
/// # Examples
///
/// ```rust
/// use markup_rewriter::render::escape_attribute_value;
///
/// assert_eq!(escape_attribute_value("\"a\" & b"), "&quot;a&quot; &amp; b");
/// ```
pub fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Serialize attributes as ` name="value"` pairs in insertion order
pub fn serialize_attributes(attributes: &Attributes) -> String {
    let mut out = String::new();
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out
}

/// What a [`SafeHtml`] value holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeHtmlKind {
    /// Markup content
    Html,
    /// Serialized attribute pairs, ready to be spliced into a start tag
    Attributes,
}

/// Text already known to be safe markup; emitted without escaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml {
    value: String,
    kind: SafeHtmlKind,
}

impl SafeHtml {
    /// Mark a string as safe markup
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: SafeHtmlKind::Html,
        }
    }

    /// Mark a string as a serialized attribute fragment
    pub fn attributes(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: SafeHtmlKind::Attributes,
        }
    }

    /// Whether this value is an attribute fragment
    pub fn is_attributes(&self) -> bool {
        self.kind == SafeHtmlKind::Attributes
    }

    /// Kind of content held
    pub fn kind(&self) -> SafeHtmlKind {
        self.kind
    }

    /// Borrow the markup
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Take the markup
    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Result of a render function: plain text is escaped, safe markup is not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Plain text, escaped on output
    Text(String),
    /// Safe markup, emitted verbatim
    Html(SafeHtml),
}

impl Markup {
    /// Final markup string
    pub fn into_html(self) -> String {
        match self {
            Markup::Text(text) => escape_html(&text),
            Markup::Html(html) => html.into_string(),
        }
    }
}

impl From<SafeHtml> for Markup {
    fn from(html: SafeHtml) -> Self {
        Markup::Html(html)
    }
}

impl From<String> for Markup {
    fn from(text: String) -> Self {
        Markup::Text(text)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Markup::Text(text.to_string())
    }
}

/// Output of a render function: available now, or after awaiting
pub enum RenderOutput<'a> {
    /// Markup produced synchronously
    Ready(Markup),
    /// Markup that needs to be awaited; strict rendering rejects it
    Pending(LocalBoxFuture<'a, Result<Markup>>),
}

impl<'a> RenderOutput<'a> {
    /// Wrap markup produced synchronously
    pub fn ready(markup: impl Into<Markup>) -> Self {
        RenderOutput::Ready(markup.into())
    }

    /// Wrap a future producing markup
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Markup>> + 'a,
    {
        RenderOutput::Pending(future.boxed_local())
    }

    /// Whether the output needs awaiting
    pub fn is_pending(&self) -> bool {
        matches!(self, RenderOutput::Pending(_))
    }
}

impl fmt::Debug for RenderOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderOutput::Ready(markup) => f.debug_tuple("Ready").field(markup).finish(),
            RenderOutput::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl From<Markup> for RenderOutput<'_> {
    fn from(markup: Markup) -> Self {
        RenderOutput::Ready(markup)
    }
}

impl From<SafeHtml> for RenderOutput<'_> {
    fn from(html: SafeHtml) -> Self {
        RenderOutput::Ready(Markup::Html(html))
    }
}

impl From<String> for RenderOutput<'_> {
    fn from(text: String) -> Self {
        RenderOutput::Ready(Markup::Text(text))
    }
}

impl From<&str> for RenderOutput<'_> {
    fn from(text: &str) -> Self {
        RenderOutput::Ready(Markup::Text(text.to_string()))
    }
}

/// Children of an element, as handed to its render function
#[derive(Debug, Clone, Copy)]
pub struct Children<'a> {
    tree: &'a Tree,
    ids: &'a [NodeId],
}

impl<'a> Children<'a> {
    /// View over a list of nodes in a tree
    pub fn new(tree: &'a Tree, ids: &'a [NodeId]) -> Self {
        Self { tree, ids }
    }

    /// Tree the children live in
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Child handles in document order
    pub fn ids(&self) -> &'a [NodeId] {
        self.ids
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no children
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Render the children without suspending
    pub fn render_sync(&self) -> Result<String> {
        render_nodes_sync(self.tree, self.ids)
    }

    /// Render the children, awaiting pending render functions
    pub fn render(self) -> LocalBoxFuture<'a, Result<String>> {
        render_nodes(self.tree, self.ids)
    }
}

/// Custom rendering for an element
///
/// Implemented for every closure of the shape
/// `Fn(&Attributes, Children) -> Result<RenderOutput>`.
pub trait Render {
    /// Produce the markup for an element from its attributes and children
    fn render<'a>(
        &'a self,
        attributes: &'a Attributes,
        children: Children<'a>,
    ) -> Result<RenderOutput<'a>>;
}

impl<F> Render for F
where
    F: for<'a> Fn(&'a Attributes, Children<'a>) -> Result<RenderOutput<'a>>,
{
    fn render<'a>(
        &'a self,
        attributes: &'a Attributes,
        children: Children<'a>,
    ) -> Result<RenderOutput<'a>> {
        self(attributes, children)
    }
}

/// Shared handle to a render function attached to an element
///
/// Cloning is cheap; the same function can be installed on any number of
/// elements.
#[derive(Clone)]
pub struct RenderFn(Rc<dyn Render>);

impl RenderFn {
    /// Wrap a closure
    ///
    /// # Examples
    ///
    /// ```rust
    /// use markup_rewriter::render::{RenderFn, RenderOutput, SafeHtml};
    ///
    /// let title = RenderFn::new(|_attrs, children| {
    ///     let inner = children.render_sync()?;
    ///     Ok(RenderOutput::ready(SafeHtml::new(format!("<h1>{}</h1>", inner))))
    /// });
    /// # let _ = title;
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Attributes, Children<'a>) -> Result<RenderOutput<'a>> + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wrap any [`Render`] implementation
    pub fn from_render(render: impl Render + 'static) -> Self {
        Self(Rc::new(render))
    }

    /// Invoke the function
    pub fn call<'a>(
        &'a self,
        attributes: &'a Attributes,
        children: Children<'a>,
    ) -> Result<RenderOutput<'a>> {
        self.0.render(attributes, children)
    }

    /// Whether two handles point at the same function
    pub fn ptr_eq(&self, other: &RenderFn) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RenderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderFn(..)")
    }
}

/// Whether an empty element renders as `<name />`
///
/// Only elements named `svg` or nested inside one qualify.
fn can_self_close(tree: &Tree, id: NodeId, element: &ElementData) -> bool {
    if !tree.children(id).is_empty() {
        return false;
    }
    if element.tag_name() == Some("svg") {
        return true;
    }
    tree.ancestors(id)
        .any(|ancestor| tree.element(ancestor).and_then(ElementData::tag_name) == Some("svg"))
}

fn suspension_error(element: &ElementData) -> RewriteError {
    RewriteError::BlockingSuspension(format!(
        "render function on <{}> returned a pending result",
        element.name
    ))
}

/// Wrap already-rendered children in the element's tags
fn write_element(tree: &Tree, id: NodeId, element: &ElementData, children: &str, out: &mut String) {
    let Some(name) = element.tag_name() else {
        out.push_str(children);
        return;
    };
    let attributes = serialize_attributes(&element.attributes);
    if can_self_close(tree, id, element) {
        out.push('<');
        out.push_str(name);
        out.push_str(&attributes);
        out.push_str(" />");
    } else if is_void_element(name) {
        out.push('<');
        out.push_str(name);
        out.push_str(&attributes);
        out.push('>');
    } else {
        out.push('<');
        out.push_str(name);
        out.push_str(&attributes);
        out.push('>');
        out.push_str(children);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn write_node_sync(tree: &Tree, id: NodeId, out: &mut String) -> Result<()> {
    let Some(node) = tree.get(id) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Document => {
            for &child in node.children() {
                write_node_sync(tree, child, out)?;
            }
        }
        NodeKind::Text(value) => out.push_str(value),
        NodeKind::Comment(value) => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        NodeKind::Doctype(value) => {
            out.push('<');
            out.push_str(value);
            out.push('>');
        }
        NodeKind::Element(element) => {
            if let Some(render_fn) = element.render_fn() {
                let children = Children::new(tree, node.children());
                match render_fn.call(&element.attributes, children)? {
                    RenderOutput::Ready(markup) => out.push_str(&markup.into_html()),
                    RenderOutput::Pending(_) => return Err(suspension_error(element)),
                }
            } else {
                let mut inner = String::new();
                for &child in node.children() {
                    write_node_sync(tree, child, &mut inner)?;
                }
                write_element(tree, id, element, &inner, out);
            }
        }
    }
    Ok(())
}

/// Render a node without suspending
///
/// # Errors
///
/// - [`RewriteError::BlockingSuspension`] if any render function in the
///   subtree returns a pending result
/// - any error returned by a render function
pub fn render_sync(tree: &Tree, node: NodeId) -> Result<String> {
    let mut out = String::new();
    write_node_sync(tree, node, &mut out)?;
    Ok(out)
}

/// Render a list of nodes without suspending and concatenate the results
pub fn render_nodes_sync(tree: &Tree, nodes: &[NodeId]) -> Result<String> {
    let mut out = String::new();
    for &node in nodes {
        write_node_sync(tree, node, &mut out)?;
    }
    Ok(out)
}

/// Render a node, awaiting pending render functions
///
/// Children of every node are rendered concurrently and joined in document
/// order.
pub fn render(tree: &Tree, node: NodeId) -> LocalBoxFuture<'_, Result<String>> {
    async move {
        let Some(entry) = tree.get(node) else {
            return Ok(String::new());
        };
        match &entry.kind {
            NodeKind::Document => render_nodes(tree, entry.children()).await,
            NodeKind::Text(value) => Ok(value.clone()),
            NodeKind::Comment(value) => Ok(format!("<!--{}-->", value)),
            NodeKind::Doctype(value) => Ok(format!("<{}>", value)),
            NodeKind::Element(element) => {
                if let Some(render_fn) = element.render_fn() {
                    let children = Children::new(tree, entry.children());
                    let markup = match render_fn.call(&element.attributes, children)? {
                        RenderOutput::Ready(markup) => markup,
                        RenderOutput::Pending(future) => future.await?,
                    };
                    Ok(markup.into_html())
                } else {
                    let inner = render_nodes(tree, entry.children()).await?;
                    let mut out = String::new();
                    write_element(tree, node, element, &inner, &mut out);
                    Ok(out)
                }
            }
        }
    }
    .boxed_local()
}

/// Render a list of nodes concurrently and concatenate the results in order
pub fn render_nodes<'a>(tree: &'a Tree, nodes: &'a [NodeId]) -> LocalBoxFuture<'a, Result<String>> {
    let parts: Vec<_> = nodes.iter().map(|&node| render(tree, node)).collect();
    async move { Ok(try_join_all(parts).await?.concat()) }.boxed_local()
}

impl Tree {
    /// Render the whole document without suspending
    pub fn render_sync(&self) -> Result<String> {
        render_sync(self, self.root())
    }

    /// Render the whole document, awaiting pending render functions
    pub fn render(&self) -> LocalBoxFuture<'_, Result<String>> {
        render(self, self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn element(tree: &mut Tree, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attributes: Attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let id = tree.create_element(name, attributes);
        tree.append_child(parent, id);
        id
    }

    fn text(tree: &mut Tree, parent: NodeId, value: &str) -> NodeId {
        let id = tree.create_text(value);
        tree.append_child(parent, id);
        id
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=\"x\"&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(escape_attribute_value("<a title=\"x\">"), "<a title=&quot;x&quot;>");
    }

    #[test]
    fn test_element_with_attributes_in_order() {
        let mut tree = Tree::new();
        let a = element(&mut tree, NodeId::ROOT, "a", &[("href", "/x"), ("class", "link")]);
        text(&mut tree, a, "go");
        assert_eq!(tree.render_sync().unwrap(), "<a href=\"/x\" class=\"link\">go</a>");
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let mut tree = Tree::new();
        element(&mut tree, NodeId::ROOT, "img", &[("src", "a.png")]);
        assert_eq!(tree.render_sync().unwrap(), "<img src=\"a.png\">");
    }

    #[test]
    fn test_svg_scope_self_closes() {
        let mut tree = Tree::new();
        let svg = element(&mut tree, NodeId::ROOT, "svg", &[]);
        element(&mut tree, svg, "path", &[("d", "0 0 0")]);
        element(&mut tree, NodeId::ROOT, "path", &[("d", "0 0 0")]);
        assert_eq!(
            tree.render_sync().unwrap(),
            "<svg><path d=\"0 0 0\" /></svg><path d=\"0 0 0\"></path>"
        );
    }

    #[test]
    fn test_empty_svg_self_closes() {
        let mut tree = Tree::new();
        element(&mut tree, NodeId::ROOT, "svg", &[]);
        assert_eq!(tree.render_sync().unwrap(), "<svg />");
    }

    #[test]
    fn test_comment_and_doctype() {
        let mut tree = Tree::new();
        let doctype = tree.create_doctype("!DOCTYPE html");
        tree.append_child(NodeId::ROOT, doctype);
        let comment = tree.create_comment(" note ");
        tree.append_child(NodeId::ROOT, comment);
        assert_eq!(tree.render_sync().unwrap(), "<!DOCTYPE html><!-- note -->");
    }

    #[test]
    fn test_fragment_renders_children_only() {
        let mut tree = Tree::new();
        let fragment = tree.create_fragment();
        tree.append_child(NodeId::ROOT, fragment);
        text(&mut tree, fragment, "a");
        element(&mut tree, fragment, "br", &[]);
        assert_eq!(tree.render_sync().unwrap(), "a<br>");
    }

    #[test]
    fn test_render_fn_text_is_escaped() {
        let mut tree = Tree::new();
        let div = element(&mut tree, NodeId::ROOT, "div", &[]);
        tree.set_render_fn(div, RenderFn::new(|_, _| Ok(RenderOutput::ready("<b>"))));
        assert_eq!(tree.render_sync().unwrap(), "&lt;b&gt;");
    }

    #[test]
    fn test_render_fn_receives_attributes_and_children() {
        let mut tree = Tree::new();
        let title = element(&mut tree, NodeId::ROOT, "title", &[("id", "t")]);
        text(&mut tree, title, "Hello");
        tree.set_render_fn(
            title,
            RenderFn::new(|attrs, children| {
                let inner = children.render_sync()?;
                let id = attrs.get("id").cloned().unwrap_or_default();
                Ok(SafeHtml::new(format!("<h1 id=\"{}\">{}</h1>", id, inner)).into())
            }),
        );
        assert_eq!(tree.render_sync().unwrap(), "<h1 id=\"t\">Hello</h1>");
    }

    #[test]
    fn test_pending_render_fn_fails_sync_and_succeeds_async() {
        let mut tree = Tree::new();
        let slot = element(&mut tree, NodeId::ROOT, "slot", &[]);
        text(&mut tree, slot, "inner");
        tree.set_render_fn(
            slot,
            RenderFn::new(|_, children| {
                Ok(RenderOutput::pending(async move {
                    let inner = children.render().await?;
                    Ok::<_, RewriteError>(Markup::Html(SafeHtml::new(format!("<p>{}</p>", inner))))
                }))
            }),
        );

        let err = tree.render_sync().unwrap_err();
        assert_eq!(err.code(), 2);
        assert_eq!(block_on(tree.render()).unwrap(), "<p>inner</p>");
    }

    #[test]
    fn test_siblings_finishing_out_of_order_join_in_document_order() {
        use futures::channel::oneshot;
        use std::cell::RefCell;

        let (sender, receiver) = oneshot::channel::<String>();
        let receiver = RefCell::new(Some(receiver));
        let sender = RefCell::new(Some(sender));
        let finished = Rc::new(RefCell::new(Vec::new()));

        let mut tree = Tree::new();
        let first = element(&mut tree, NodeId::ROOT, "first-slot", &[]);
        let second = element(&mut tree, NodeId::ROOT, "second-slot", &[]);

        let first_finished = Rc::clone(&finished);
        tree.set_render_fn(
            first,
            RenderFn::new(move |_, _| {
                let receiver = receiver.borrow_mut().take();
                let finished = Rc::clone(&first_finished);
                Ok(RenderOutput::pending(async move {
                    let value = match receiver {
                        Some(receiver) => receiver.await.map_err(RewriteError::custom)?,
                        None => String::new(),
                    };
                    finished.borrow_mut().push("first");
                    Ok::<_, RewriteError>(Markup::Html(SafeHtml::new(format!("<b>{}</b>", value))))
                }))
            }),
        );
        let second_finished = Rc::clone(&finished);
        tree.set_render_fn(
            second,
            RenderFn::new(move |_, _| {
                let sender = sender.borrow_mut().take();
                let finished = Rc::clone(&second_finished);
                Ok(RenderOutput::pending(async move {
                    if let Some(sender) = sender {
                        sender.send("from second".to_string()).map_err(RewriteError::custom)?;
                    }
                    finished.borrow_mut().push("second");
                    Ok::<_, RewriteError>(Markup::Html(SafeHtml::new("<i>second</i>")))
                }))
            }),
        );

        assert_eq!(block_on(tree.render()).unwrap(), "<b>from second</b><i>second</i>");
        assert_eq!(*finished.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn test_render_fn_error_propagates() {
        let mut tree = Tree::new();
        let div = element(&mut tree, NodeId::ROOT, "div", &[]);
        tree.set_render_fn(div, RenderFn::new(|_, _| Err(RewriteError::custom("nope"))));
        assert_eq!(tree.render_sync(), Err(RewriteError::Custom("nope".to_string())));
        assert_eq!(block_on(tree.render()), Err(RewriteError::Custom("nope".to_string())));
    }

    #[test]
    fn test_sync_and_async_agree() {
        let mut tree = Tree::new();
        let ul = element(&mut tree, NodeId::ROOT, "ul", &[("class", "x")]);
        for item in ["one", "two", "three"] {
            let li = element(&mut tree, ul, "li", &[]);
            text(&mut tree, li, item);
        }
        element(&mut tree, NodeId::ROOT, "hr", &[]);
        let sync = tree.render_sync().unwrap();
        let asynchronous = block_on(tree.render()).unwrap();
        assert_eq!(sync, asynchronous);
        assert_eq!(
            sync,
            "<ul class=\"x\"><li>one</li><li>two</li><li>three</li></ul><hr>"
        );
    }

    #[test]
    fn test_render_nodes_concatenates() {
        let mut tree = Tree::new();
        let a = text(&mut tree, NodeId::ROOT, "a");
        let b = element(&mut tree, NodeId::ROOT, "b", &[]);
        assert_eq!(render_nodes_sync(&tree, &[b, a]).unwrap(), "<b></b>a");
        assert_eq!(block_on(render_nodes(&tree, &[b, a])).unwrap(), "<b></b>a");
    }
}

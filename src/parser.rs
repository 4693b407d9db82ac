//! Markup parsing on top of the html5ever tokenizer
//!
//! Parsing is split in two layers:
//!
//! - [`TreeBuilder`] consumes parse events (`open_tag`, `text`, `comment`,
//!   `processing_instruction`, `close_tag`) and keeps an explicit stack of
//!   open elements to assign parents. It knows nothing about HTML.
//! - [`parse`] drives html5ever's tokenizer (not its tree builder) and turns
//!   tokens into events, adding the few HTML rules needed for a faithful tree:
//!   void elements, implied end tags, raw text elements and self-closing tags
//!   in SVG/MathML.
//!
//! The tree is *not* normalized the way a browser would: no `<html>`,
//! `<head>` or `<body>` are synthesized, unknown and custom tags are kept
//! as-is, and stray end tags are dropped.
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::parser::parse;
//!
//! // Well-formed markup round-trips
//! let tree = parse("<h1>Hello world!</h1>");
//! assert_eq!(tree.render_sync().unwrap(), "<h1>Hello world!</h1>");
//!
//! // Missing end tags are closed at end of input
//! let tree = parse("<ul><li>one<li>two</ul>");
//! assert_eq!(tree.render_sync().unwrap(), "<ul><li>one</li><li>two</li></ul>");
//! ```
//!
//! # Locations
//!
//! html5ever reports the line a token ends on, so node [`Location`]s are line
//! spans: `start` is the line of the opening token, `end` the line of the
//! closing one.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Doctype, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts, TokenizerResult,
};
use std::cell::RefCell;

use crate::charset::decode_to_utf8;
use crate::error::RewriteError;
use crate::node::{Attributes, Location, NodeId, NodeKind, Tree};
use crate::render::{escape_attribute_value, escape_html, is_void_element};

/// Elements whose start closes an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div", "dl",
    "dd", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section",
    "summary", "table", "ul",
];

/// Elements that stop the search for an element to close implicitly
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
    "svg", "math",
];

const LIST_BOUNDARIES: &[&str] = &["ul", "ol", "menu"];
const TABLE_SECTION_BOUNDARIES: &[&str] = &["table", "thead", "tbody", "tfoot"];
const ROW_BOUNDARIES: &[&str] = &["tr", "table"];

/// Tree construction from parse events
///
/// Every event attaches its node to the current open element, or to the
/// Document when nothing is open. `close_tag` pops one element; a close with
/// nothing open is a no-op that leaves the Document current.
///
/// # Examples
///
/// ```rust
/// use markup_rewriter::node::{Attributes, Location};
/// use markup_rewriter::parser::TreeBuilder;
///
/// let mut builder = TreeBuilder::new();
/// builder.processing_instruction("!doctype", "!DOCTYPE html", Location::default());
/// builder.open_tag("p", Attributes::new(), Location::line(1));
/// builder.text("hi", Location::line(1));
/// builder.close_tag(Location::line(1));
///
/// let tree = builder.finish();
/// assert_eq!(tree.render_sync().unwrap(), "<!DOCTYPE html><p>hi</p>");
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Tree,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    /// Start with an empty Document
    pub fn new() -> Self {
        Self::default()
    }

    /// Node new children are attached to
    pub fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Open elements, outermost first
    pub fn open_elements(&self) -> &[NodeId] {
        &self.open
    }

    /// Tree built so far
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    fn attach(&mut self, kind: NodeKind, location: Location) -> NodeId {
        let id = self.tree.create(kind, location);
        let parent = self.current();
        self.tree.append_child(parent, id);
        id
    }

    /// Attach an element and make it current
    pub fn open_tag(&mut self, name: &str, attributes: Attributes, location: Location) -> NodeId {
        let id = self.tree.create_element(name, attributes);
        if let Some(node) = self.tree.get_mut(id) {
            node.location = location;
        }
        let parent = self.current();
        self.tree.append_child(parent, id);
        self.open.push(id);
        id
    }

    /// Attach a text node
    pub fn text(&mut self, content: &str, location: Location) -> NodeId {
        self.attach(NodeKind::Text(content.to_string()), location)
    }

    /// Attach a comment node
    pub fn comment(&mut self, content: &str, location: Location) -> NodeId {
        self.attach(NodeKind::Comment(content.to_string()), location)
    }

    /// Attach a doctype when `name` is `!doctype` (any case); ignore anything else
    pub fn processing_instruction(
        &mut self,
        name: &str,
        data: &str,
        location: Location,
    ) -> Option<NodeId> {
        if !name.eq_ignore_ascii_case("!doctype") {
            return None;
        }
        Some(self.attach(NodeKind::Doctype(data.to_string()), location))
    }

    /// Close the current element
    ///
    /// Returns the closed element, or `None` if only the Document was open.
    pub fn close_tag(&mut self, location: Location) -> Option<NodeId> {
        let closed = self.open.pop()?;
        if let Some(node) = self.tree.get_mut(closed) {
            node.location.end = location.end;
        }
        Some(closed)
    }

    /// Take the finished tree; elements still open stay where they are
    pub fn finish(self) -> Tree {
        self.tree
    }
}

/// Tokenizer state shared with the html5ever sink
#[derive(Default)]
struct SinkState {
    builder: TreeBuilder,
    text: String,
    text_start: u64,
    text_end: u64,
    /// Inside a raw text element, where the tokenizer decodes nothing
    raw_text: bool,
}

impl SinkState {
    fn open_names(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.builder
            .open_elements()
            .iter()
            .map(|&id| {
                self.builder
                    .tree()
                    .element(id)
                    .and_then(|element| element.tag_name())
                    .unwrap_or("")
            })
    }

    fn in_foreign_content(&self) -> bool {
        self.open_names().any(|name| name == "svg" || name == "math")
    }

    /// Buffer character data
    ///
    /// Outside raw text the tokenizer has already decoded character
    /// references, so the data is escaped again before it is stored.
    fn push_text(&mut self, text: &str, line: u64) {
        if self.text.is_empty() {
            self.text_start = line;
        }
        if self.raw_text {
            self.text.push_str(text);
        } else {
            self.text.push_str(&escape_html(text));
        }
        self.text_end = line;
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        self.builder.text(
            &text,
            Location {
                start: self.text_start,
                end: self.text_end,
            },
        );
    }

    /// Pop open elements through the nearest one named in `targets`
    ///
    /// The search stops without closing anything at a `boundaries` element.
    fn close_through(&mut self, targets: &[&str], boundaries: &[&str], line: u64) -> bool {
        let mut depth = None;
        for (position, name) in self.open_names().enumerate().rev() {
            if targets.contains(&name) {
                depth = Some(position);
                break;
            }
            if boundaries.contains(&name) {
                break;
            }
        }
        let Some(depth) = depth else {
            return false;
        };
        while self.builder.open_elements().len() > depth {
            self.builder.close_tag(Location::line(line));
        }
        true
    }

    fn close_implied(&mut self, name: &str, line: u64) {
        if CLOSES_PARAGRAPH.contains(&name) {
            self.close_through(&["p"], SCOPE_BOUNDARIES, line);
        }
        match name {
            "li" => {
                self.close_through(&["li"], LIST_BOUNDARIES, line);
            }
            "dt" | "dd" => {
                self.close_through(&["dt", "dd"], &["dl"], line);
            }
            "option" => {
                self.close_through(&["option"], &["select", "optgroup", "datalist"], line);
            }
            "optgroup" => {
                self.close_through(&["option", "optgroup"], &["select"], line);
            }
            "tr" => {
                self.close_through(&["tr"], TABLE_SECTION_BOUNDARIES, line);
            }
            "td" | "th" => {
                self.close_through(&["td", "th"], ROW_BOUNDARIES, line);
            }
            "thead" | "tbody" | "tfoot" => {
                self.close_through(&["thead", "tbody", "tfoot"], &["table"], line);
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag, line: u64) -> TokenSinkResult<()> {
        let name: &str = &tag.name;
        let foreign = self.in_foreign_content();
        if !foreign {
            self.close_implied(name, line);
        }

        let attributes: Attributes = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), escape_attribute_value(&attr.value)))
            .collect();
        self.builder.open_tag(name, attributes, Location::line(line));

        let foreign = foreign || name == "svg" || name == "math";
        if is_void_element(name) || (tag.self_closing && foreign) {
            self.builder.close_tag(Location::line(line));
            return TokenSinkResult::Continue;
        }
        if foreign {
            return TokenSinkResult::Continue;
        }

        let result = match name {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        };
        // RCDATA still decodes references, so only these stay verbatim.
        self.raw_text = matches!(
            result,
            TokenSinkResult::RawData(RawKind::ScriptData | RawKind::Rawtext) | TokenSinkResult::Plaintext
        );
        result
    }

    fn end_tag(&mut self, name: &str, line: u64) {
        if !self.close_through(&[name], &[], line) {
            tracing::trace!(line, tag = name, "ignoring unmatched end tag");
        }
    }
}

fn doctype_text(doctype: &Doctype) -> String {
    let mut text = String::from("!DOCTYPE");
    if let Some(name) = &doctype.name {
        text.push(' ');
        text.push_str(name);
    }
    if let Some(public_id) = &doctype.public_id {
        text.push_str(" PUBLIC \"");
        text.push_str(public_id);
        text.push('"');
    }
    if let Some(system_id) = &doctype.system_id {
        if doctype.public_id.is_none() {
            text.push_str(" SYSTEM");
        }
        text.push_str(" \"");
        text.push_str(system_id);
        text.push('"');
    }
    text
}

/// html5ever token sink feeding a [`TreeBuilder`]
struct EventSink {
    state: RefCell<SinkState>,
}

impl EventSink {
    fn new() -> Self {
        Self {
            state: RefCell::new(SinkState::default()),
        }
    }

    fn take_tree(&self) -> Tree {
        let mut state = self.state.borrow_mut();
        state.flush_text();
        std::mem::take(&mut state.builder).finish()
    }
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        let mut state = self.state.borrow_mut();
        match token {
            Token::CharacterTokens(text) => state.push_text(&text, line_number),
            Token::NullCharacterToken => {}
            Token::TagToken(tag) => {
                state.flush_text();
                state.raw_text = false;
                match tag.kind {
                    TagKind::StartTag => return state.start_tag(tag, line_number),
                    TagKind::EndTag => state.end_tag(&tag.name, line_number),
                }
            }
            Token::CommentToken(comment) => {
                state.flush_text();
                state.builder.comment(&comment, Location::line(line_number));
            }
            Token::DoctypeToken(doctype) => {
                state.flush_text();
                state.builder.processing_instruction(
                    "!doctype",
                    &doctype_text(&doctype),
                    Location::line(line_number),
                );
            }
            Token::EOFToken => state.flush_text(),
            Token::ParseError(error) => {
                tracing::trace!(line = line_number, error = %error, "tokenizer parse error");
            }
        }
        TokenSinkResult::Continue
    }
}

/// Parse markup text into a tree
///
/// Parsing never fails: malformed markup is repaired or dropped.
pub fn parse(markup: &str) -> Tree {
    let tokenizer = Tokenizer::new(EventSink::new(), TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));
    while let TokenizerResult::Script(()) = tokenizer.feed(&input) {}
    tokenizer.end();

    let tree = tokenizer.sink.take_tree();
    tracing::debug!(bytes = markup.len(), nodes = tree.len(), "parsed markup");
    tree
}

/// Decode a byte payload and parse it
///
/// The charset comes from `content_type`, then from a `<meta>` declaration,
/// else UTF-8. See [`crate::charset`].
///
/// # Errors
///
/// [`RewriteError::EncodingError`] if the charset is unsupported or the
/// bytes are invalid for it.
///
/// # Examples
///
/// ```rust
/// use markup_rewriter::parser::parse_bytes;
///
/// let tree = parse_bytes(b"<p>Caf\xE9</p>", Some("text/html; charset=ISO-8859-1")).unwrap();
/// assert_eq!(tree.render_sync().unwrap(), "<p>Café</p>");
/// ```
pub fn parse_bytes(html: &[u8], content_type: Option<&str>) -> Result<Tree, RewriteError> {
    let text = decode_to_utf8(html, content_type)?;
    Ok(parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;
    use proptest::prelude::*;

    fn round_trip(markup: &str) -> String {
        parse(markup).render_sync().expect("parsed trees render")
    }

    // ============================================================================
    // TreeBuilder
    // ============================================================================

    #[test]
    fn test_builder_assigns_parents_from_stack() {
        let mut builder = TreeBuilder::new();
        let div = builder.open_tag("div", Attributes::new(), Location::line(1));
        let text = builder.text("x", Location::line(1));
        builder.close_tag(Location::line(2));
        let after = builder.comment("c", Location::line(3));

        let tree = builder.finish();
        assert_eq!(tree.parent(text), Some(div));
        assert_eq!(tree.parent(after), Some(NodeId::ROOT));
        assert_eq!(tree.get(div).unwrap().location, Location { start: 1, end: 2 });
    }

    #[test]
    fn test_builder_unmatched_close_stays_at_document() {
        let mut builder = TreeBuilder::new();
        assert_eq!(builder.close_tag(Location::default()), None);
        let text = builder.text("x", Location::default());
        assert_eq!(builder.current(), NodeId::ROOT);
        assert_eq!(builder.tree().parent(text), Some(NodeId::ROOT));
    }

    #[test]
    fn test_builder_ignores_other_processing_instructions() {
        let mut builder = TreeBuilder::new();
        assert!(builder.processing_instruction("?xml", "?xml version=\"1.0\"", Location::default()).is_none());
        assert!(builder.processing_instruction("!DOCTYPE", "!DOCTYPE html", Location::default()).is_some());
        assert_eq!(builder.tree().children(NodeId::ROOT).len(), 1);
    }

    // ============================================================================
    // Tokenizer binding
    // ============================================================================

    #[test]
    fn test_round_trip_basics() {
        for markup in [
            "<h1>Hello world!</h1>",
            "<custom-element>Hello world!</custom-element>",
            "<!-- Hello world! -->",
            "Hello world!",
            "<!DOCTYPE html>",
            "<div class=\"a\" id=\"b\"><p>one</p><p>two</p></div>",
        ] {
            assert_eq!(round_trip(markup), markup);
        }
    }

    #[test]
    fn test_text_runs_are_merged() {
        let tree = parse("a &amp; b");
        assert_eq!(tree.children(NodeId::ROOT).len(), 1);
        assert_eq!(tree.literal_value(tree.children(NodeId::ROOT)[0]), Some("a &amp; b"));
    }

    #[test]
    fn test_character_references_stay_escaped() {
        assert_eq!(round_trip("<p>a &amp; b</p>"), "<p>a &amp; b</p>");
        assert_eq!(
            round_trip("<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
        assert_eq!(round_trip("<p title=\"&quot;x\">y</p>"), "<p title=\"&quot;x\">y</p>");
        assert_eq!(round_trip("<a href=\"?a=1&amp;b=2\">y</a>"), "<a href=\"?a=1&amp;b=2\">y</a>");
        // Named references are normalized to characters, markup stays inert
        assert_eq!(round_trip("<p>&copy;&#60;</p>"), "<p>\u{a9}&lt;</p>");
    }

    #[test]
    fn test_raw_text_is_kept_verbatim() {
        assert_eq!(
            round_trip("<script>if (a < b && c) {}</script>"),
            "<script>if (a < b && c) {}</script>"
        );
        assert_eq!(round_trip("<style>a > b {}</style>"), "<style>a > b {}</style>");
        assert_eq!(round_trip("<title>a &amp; b</title>"), "<title>a &amp; b</title>");
        assert_eq!(round_trip("<svg><script>&lt;x&gt;</script></svg>"), "<svg><script>&lt;x&gt;</script></svg>");
    }

    #[test]
    fn test_void_elements_close_immediately() {
        assert_eq!(round_trip("<p>a<br>b<img src=\"x.png\">c</p>"), "<p>a<br>b<img src=\"x.png\">c</p>");
        assert_eq!(round_trip("<br/>x"), "<br>x");
    }

    #[test]
    fn test_self_closing_only_in_svg() {
        assert_eq!(
            round_trip("<svg><path d=\"0 0 0\" /></svg>"),
            "<svg><path d=\"0 0 0\" /></svg>"
        );
        assert_eq!(round_trip("<path d=\"0 0 0\" />"), "<path d=\"0 0 0\"></path>");
    }

    #[test]
    fn test_implied_end_tags() {
        assert_eq!(round_trip("<ul><li>a<li>b</ul>"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(round_trip("<p>a<div>b</div>"), "<p>a</p><div>b</div>");
        assert_eq!(round_trip("<dl><dt>a<dd>b</dl>"), "<dl><dt>a</dt><dd>b</dd></dl>");
        assert_eq!(
            round_trip("<table><tr><td>a<td>b<tr><td>c</table>"),
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>"
        );
        assert_eq!(
            round_trip("<select><option>a<option>b</select>"),
            "<select><option>a</option><option>b</option></select>"
        );
    }

    #[test]
    fn test_nested_lists_keep_outer_item_open() {
        assert_eq!(
            round_trip("<ul><li>a<ul><li>b</ul><li>c</ul>"),
            "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"
        );
    }

    #[test]
    fn test_end_tag_closes_through_match() {
        assert_eq!(round_trip("<b><i>text</b></i>"), "<b><i>text</i></b>");
        assert_eq!(round_trip("<div>x</span></div>"), "<div>x</div>");
    }

    #[test]
    fn test_raw_text_elements() {
        assert_eq!(
            round_trip("<script>if (a < b && c) { x(\"</p>\") }</script>"),
            "<script>if (a < b && c) { x(\"</p>\") }</script>"
        );
        assert_eq!(
            round_trip("<style>p > a { color: red }</style>"),
            "<style>p > a { color: red }</style>"
        );
        let tree = parse("<title>a <b> c</title>");
        let title = tree.children(NodeId::ROOT)[0];
        assert_eq!(tree.children(title).len(), 1);
        assert_eq!(tree.literal_value(tree.children(title)[0]), Some("a <b> c"));
    }

    #[test]
    fn test_doctype_text() {
        assert_eq!(round_trip("<!doctype html>"), "<!DOCTYPE html>");
        assert_eq!(
            round_trip("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">"),
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">"
        );
        let tree = parse("<!DOCTYPE html>");
        let doctype = tree.children(NodeId::ROOT)[0];
        assert_eq!(tree.get(doctype).map(|n| n.node_type()), Some(NodeType::Doctype));
    }

    #[test]
    fn test_names_are_lower_cased() {
        let tree = parse("<Title DATA-X=\"1\">Hello</Title>");
        let title = tree.children(NodeId::ROOT)[0];
        let element = tree.element(title).unwrap();
        assert_eq!(element.tag_name(), Some("title"));
        assert_eq!(element.attributes.get("data-x").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_locations_are_line_spans() {
        let tree = parse("<div>\none\n</div>");
        let div = tree.children(NodeId::ROOT)[0];
        let location = tree.get(div).unwrap().location;
        assert_eq!(location.start, 1);
        assert_eq!(location.end, 3);
    }

    #[test]
    fn test_empty_input() {
        let tree = parse("");
        assert!(tree.children(NodeId::ROOT).is_empty());
        assert_eq!(tree.render_sync().unwrap(), "");
    }

    // ============================================================================
    // Byte input
    // ============================================================================

    #[test]
    fn test_parse_bytes_transcodes() {
        let tree = parse_bytes(b"<p>Price \x80 10</p>", Some("text/html; charset=windows-1252")).unwrap();
        assert_eq!(tree.render_sync().unwrap(), "<p>Price € 10</p>");

        let tree = parse_bytes(b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>", None).unwrap();
        assert_eq!(tree.render_sync().unwrap(), "<meta charset=\"ISO-8859-1\"><p>Café</p>");
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let err = parse_bytes(b"\xFF\xFE<p>x</p>", None).unwrap_err();
        assert!(matches!(err, RewriteError::EncodingError(_)));
    }

    // ============================================================================
    // Property-Based Tests
    // ============================================================================

    proptest! {
        #[test]
        fn prop_arbitrary_input_never_panics(markup in "\\PC{0,200}") {
            let tree = parse(&markup);
            prop_assert!(tree.render_sync().is_ok());
        }

        #[test]
        fn prop_malformed_markup_parses(
            tag in prop::sample::select(vec!["div", "p", "span", "h1", "ul", "li", "table", "tr", "td"]),
            content in "[a-zA-Z0-9 ]{0,60}",
            close_tag in any::<bool>(),
            add_invalid_nesting in any::<bool>(),
        ) {
            let mut markup = format!("<{}>{}", tag, content);
            if close_tag {
                markup.push_str(&format!("</{}>", tag));
            }
            if add_invalid_nesting {
                markup.push_str("<p><div>Invalid nesting</div></p>");
            }
            let rendered = parse(&markup).render_sync().unwrap();
            prop_assert!(rendered.contains(content.as_str()));
        }

        #[test]
        fn prop_well_formed_nesting_round_trips(
            depth in 1usize..20,
            tag in prop::sample::select(vec!["div", "span", "section", "custom-el", "em"]),
            content in "[a-zA-Z0-9 ]{1,20}",
        ) {
            let markup = format!("{}{}{}", format!("<{}>", tag).repeat(depth), content, format!("</{}>", tag).repeat(depth));
            prop_assert_eq!(round_trip(&markup), markup);
        }
    }
}

//! Markup templating with per-hole escaping
//!
//! A [`Template`] alternates literal markup with interpolated values. Literals
//! are trusted and copied as-is; each hole is handled by the kind of value it
//! holds:
//!
//! | Value | Output |
//! |-------|--------|
//! | [`Children`] or a single node | rendered synchronously |
//! | anything after a `...` marker | attribute spread (see below) |
//! | attribute fragment ([`SafeHtml::attributes`]) | verbatim |
//! | [`SafeHtml`] | verbatim |
//! | string | escaped with [`escape_html`] |
//! | number, `true` | stringified, unescaped |
//! | `false`, `None` | nothing |
//!
//! # Attribute spread
//!
//! When the literal right before a hole ends with `...`, that marker and the
//! whitespace before it are removed and the hole must hold attributes: a map
//! is written as ` name="value"` pairs, an attribute fragment is inserted
//! as-is and an empty value writes nothing.
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::html::Template;
//! use markup_rewriter::node::Attributes;
//!
//! let mut props = Attributes::new();
//! props.insert("id".to_string(), "main".to_string());
//!
//! let html = Template::new()
//!     .text("<h1 class=\"ultra\" ...")
//!     .value(&props)
//!     .text(">")
//!     .value("Fish & Chips")
//!     .text("</h1>")
//!     .render()
//!     .unwrap();
//! assert_eq!(html.as_str(), "<h1 class=\"ultra\" id=\"main\">Fish &amp; Chips</h1>");
//! ```

use std::borrow::Cow;

use crate::error::RewriteError;
use crate::node::{Attributes, NodeId, Tree};
use crate::render::{Children, SafeHtml, escape_html, render_sync, serialize_attributes};

type Result<T> = std::result::Result<T, RewriteError>;

const SPREAD_MARKER: &str = "...";

/// A value placed into a template hole
#[derive(Debug, Clone)]
pub enum Interpolation<'a> {
    /// Nodes of a tree, rendered on use
    Nodes(Children<'a>),
    /// A single node of a tree, rendered on use
    Node(&'a Tree, NodeId),
    /// Attribute map, serialized as ` name="value"` pairs
    Attributes(Cow<'a, Attributes>),
    /// Safe markup or an attribute fragment
    Safe(SafeHtml),
    /// Plain text, escaped
    Text(Cow<'a, str>),
    /// Stringified scalar, unescaped
    Value(String),
    /// Writes nothing
    Empty,
}

impl<'a> From<Children<'a>> for Interpolation<'a> {
    fn from(children: Children<'a>) -> Self {
        Interpolation::Nodes(children)
    }
}

impl<'a> From<(&'a Tree, NodeId)> for Interpolation<'a> {
    fn from((tree, node): (&'a Tree, NodeId)) -> Self {
        Interpolation::Node(tree, node)
    }
}

impl<'a> From<&'a Attributes> for Interpolation<'a> {
    fn from(attributes: &'a Attributes) -> Self {
        Interpolation::Attributes(Cow::Borrowed(attributes))
    }
}

impl From<Attributes> for Interpolation<'_> {
    fn from(attributes: Attributes) -> Self {
        Interpolation::Attributes(Cow::Owned(attributes))
    }
}

impl From<SafeHtml> for Interpolation<'_> {
    fn from(html: SafeHtml) -> Self {
        Interpolation::Safe(html)
    }
}

impl<'a> From<&'a str> for Interpolation<'a> {
    fn from(text: &'a str) -> Self {
        Interpolation::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Interpolation<'_> {
    fn from(text: String) -> Self {
        Interpolation::Text(Cow::Owned(text))
    }
}

impl From<bool> for Interpolation<'_> {
    fn from(flag: bool) -> Self {
        if flag {
            Interpolation::Value("true".to_string())
        } else {
            Interpolation::Empty
        }
    }
}

impl<'a, T> From<Option<T>> for Interpolation<'a>
where
    T: Into<Interpolation<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Interpolation::Empty, Into::into)
    }
}

macro_rules! scalar_interpolation {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Interpolation<'_> {
                fn from(value: $ty) -> Self {
                    Interpolation::Value(value.to_string())
                }
            }
        )*
    };
}

scalar_interpolation!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[derive(Debug, Clone)]
enum Segment<'a> {
    Literal(Cow<'a, str>),
    Hole(Interpolation<'a>),
}

/// Builder for a markup template
#[derive(Debug, Clone, Default)]
pub struct Template<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Template<'a> {
    /// Empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from literal parts and the values between them
    ///
    /// # Errors
    ///
    /// [`RewriteError::InvalidArgument`] unless there is exactly one more
    /// literal than values.
    pub fn from_parts(literals: &[&'a str], values: Vec<Interpolation<'a>>) -> Result<Self> {
        if literals.len() != values.len() + 1 {
            return Err(RewriteError::InvalidArgument(format!(
                "template has {} literals for {} values",
                literals.len(),
                values.len()
            )));
        }
        let mut template = Template::new();
        let mut values = values.into_iter();
        for (index, literal) in literals.iter().enumerate() {
            if index > 0
                && let Some(value) = values.next()
            {
                template = template.value(value);
            }
            template = template.text(*literal);
        }
        Ok(template)
    }

    /// Append trusted literal markup
    pub fn text(mut self, literal: impl Into<Cow<'a, str>>) -> Self {
        self.segments.push(Segment::Literal(literal.into()));
        self
    }

    /// Append a hole
    pub fn value(mut self, value: impl Into<Interpolation<'a>>) -> Self {
        self.segments.push(Segment::Hole(value.into()));
        self
    }

    /// Produce the markup
    ///
    /// # Errors
    ///
    /// - [`RewriteError::InvalidArgument`] when a spread hole holds something
    ///   other than attributes
    /// - [`RewriteError::BlockingSuspension`] when interpolated nodes carry a
    ///   suspending render function
    pub fn render(&self) -> Result<SafeHtml> {
        let mut out = String::new();
        let mut previous_literal: Option<&str> = None;

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    out.push_str(literal);
                    previous_literal = Some(literal.as_ref());
                }
                Segment::Hole(value) => {
                    let spread = previous_literal.is_some_and(|l| l.ends_with(SPREAD_MARKER));
                    previous_literal = None;
                    write_hole(&mut out, value, spread)?;
                }
            }
        }

        Ok(SafeHtml::new(out))
    }
}

fn write_hole(out: &mut String, value: &Interpolation<'_>, spread: bool) -> Result<()> {
    match value {
        Interpolation::Nodes(children) => {
            out.push_str(&children.render_sync()?);
            return Ok(());
        }
        Interpolation::Node(tree, node) => {
            out.push_str(&render_sync(tree, *node)?);
            return Ok(());
        }
        _ => {}
    }

    if spread {
        out.truncate(out.len() - SPREAD_MARKER.len());
        let kept = out.trim_end().len();
        out.truncate(kept);
        return match value {
            Interpolation::Attributes(attributes) => {
                out.push_str(&serialize_attributes(attributes));
                Ok(())
            }
            Interpolation::Safe(html) if html.is_attributes() => {
                out.push_str(html.as_str());
                Ok(())
            }
            Interpolation::Empty => Ok(()),
            other => Err(RewriteError::InvalidArgument(format!(
                "attribute spread expects attributes, got {}",
                describe(other)
            ))),
        };
    }

    match value {
        Interpolation::Safe(html) => out.push_str(html.as_str()),
        Interpolation::Text(text) => out.push_str(&escape_html(text)),
        Interpolation::Value(value) => out.push_str(value),
        Interpolation::Attributes(attributes) => out.push_str(&serialize_attributes(attributes)),
        Interpolation::Empty | Interpolation::Nodes(_) | Interpolation::Node(..) => {}
    }
    Ok(())
}

fn describe(value: &Interpolation<'_>) -> &'static str {
    match value {
        Interpolation::Nodes(_) | Interpolation::Node(..) => "nodes",
        Interpolation::Attributes(_) => "attributes",
        Interpolation::Safe(_) => "markup",
        Interpolation::Text(_) => "text",
        Interpolation::Value(_) => "a scalar",
        Interpolation::Empty => "nothing",
    }
}

/// Render a template from literal parts and values in one call
///
/// ```rust
/// use markup_rewriter::html::html;
///
/// let out = html(&["<p>", " items</p>"], vec![0_u32.into()]).unwrap();
/// assert_eq!(out.as_str(), "<p>0 items</p>");
/// ```
pub fn html<'a>(literals: &[&'a str], values: Vec<Interpolation<'a>>) -> Result<SafeHtml> {
    Template::from_parts(literals, values)?.render()
}

//! Selector-driven element replacement
//!
//! Each entry maps a selector to a [`Replacement`]. A tag replacement renames
//! every match and keeps its attributes and children; a render replacement
//! attaches a [`RenderFn`] that takes over the element's output.
//!
//! Entries are applied in insertion order against the tree as left by the
//! previous entry, so renaming `h1` to `Title` and then attaching a render
//! function to `Title` composes.
//!
//! ```rust
//! use markup_rewriter::html::Template;
//! use markup_rewriter::render::{RenderFn, RenderOutput};
//! use markup_rewriter::transform::transform_sync;
//! use markup_rewriter::transformers::{SwapComponents, swap};
//!
//! let components = SwapComponents::new()
//!     .with("h1", "Title")
//!     .with(
//!         "Title",
//!         RenderFn::new(|_, children| {
//!             let html = Template::new().text("<span>").value(children).text("</span>").render()?;
//!             Ok(RenderOutput::from(html))
//!         }),
//!     );
//!
//! let out = transform_sync("<h1>Hello world!</h1>", &[swap(components)]).unwrap();
//! assert_eq!(out, "<span>Hello world!</span>");
//! ```

use indexmap::IndexMap;

use crate::error::RewriteError;
use crate::node::{Attributes, ElementName, Tree};
use crate::render::{Children, RenderFn, RenderOutput};
use crate::selector::Selector;
use crate::transform::Transformer;

/// What a matched element is swapped for
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Rename the element; any render function is removed
    Tag(String),
    /// Render the element with this function
    Render(RenderFn),
}

impl Replacement {
    /// Render replacement from a closure
    pub fn render<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Attributes, Children<'a>) -> Result<RenderOutput<'a>, RewriteError>
            + 'static,
    {
        Replacement::Render(RenderFn::new(f))
    }
}

impl From<&str> for Replacement {
    fn from(tag: &str) -> Self {
        Replacement::Tag(tag.to_string())
    }
}

impl From<String> for Replacement {
    fn from(tag: String) -> Self {
        Replacement::Tag(tag)
    }
}

impl From<RenderFn> for Replacement {
    fn from(render: RenderFn) -> Self {
        Replacement::Render(render)
    }
}

/// Ordered selector to replacement map
#[derive(Debug, Clone, Default)]
pub struct SwapComponents(IndexMap<String, Replacement>);

impl SwapComponents {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, selector: impl Into<String>, replacement: impl Into<Replacement>) -> Self {
        self.insert(selector, replacement);
        self
    }

    /// Add an entry; re-inserting a selector keeps its original position
    pub fn insert(&mut self, selector: impl Into<String>, replacement: impl Into<Replacement>) {
        self.0.insert(selector.into(), replacement.into());
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in application order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Replacement)> {
        self.0.iter().map(|(selector, replacement)| (selector.as_str(), replacement))
    }
}

impl<S, R> FromIterator<(S, R)> for SwapComponents
where
    S: Into<String>,
    R: Into<Replacement>,
{
    fn from_iter<I: IntoIterator<Item = (S, R)>>(iter: I) -> Self {
        let mut components = SwapComponents::new();
        for (selector, replacement) in iter {
            components.insert(selector, replacement);
        }
        components
    }
}

/// Apply every entry to `tree`, in order
///
/// # Errors
///
/// [`RewriteError::InvalidSelector`] if a selector does not compile. Entries
/// before the faulty one have already been applied.
pub fn apply_swap(tree: &mut Tree, components: &SwapComponents) -> Result<(), RewriteError> {
    for (source, replacement) in components.iter() {
        let selector = Selector::parse(source)?;
        let matches = selector.select_all(tree, tree.root());
        tracing::debug!(selector = source, matches = matches.len(), "swapping elements");

        for node in matches {
            let Some(element) = tree.element_mut(node) else {
                continue;
            };
            match replacement {
                Replacement::Tag(tag) => {
                    element.name = ElementName::Tag(tag.clone());
                    element.clear_render_fn();
                }
                Replacement::Render(render) => element.set_render_fn(render.clone()),
            }
        }
    }
    Ok(())
}

/// Build a synchronous transformer that applies `components`
pub fn swap(components: SwapComponents) -> Transformer {
    Transformer::sync(move |mut tree| {
        apply_swap(&mut tree, &components)?;
        Ok(tree)
    })
}

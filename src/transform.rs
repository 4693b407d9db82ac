//! Ordered transformer pipeline
//!
//! A [`Transformer`] takes ownership of a tree and hands back the rewritten
//! tree. [`transform`] parses the input (unless it already is a tree), runs
//! every transformer in order and renders the result; [`apply`] stops before
//! rendering.
//!
//! # Examples
//!
//! ```rust
//! use markup_rewriter::node::NodeKind;
//! use markup_rewriter::transform::{Transformer, transform_sync};
//! use markup_rewriter::transformers::{SanitizeOptions, sanitize};
//!
//! let drop_comments = Transformer::sync(|mut tree| {
//!     let root = tree.root();
//!     let comments: Vec<_> = tree
//!         .descendants(root)
//!         .filter(|&id| matches!(tree.kind(id), Some(NodeKind::Comment(_))))
//!         .collect();
//!     for id in comments {
//!         tree.detach(id);
//!     }
//!     Ok(tree)
//! });
//!
//! let output = transform_sync(
//!     "<p>ok</p><!-- note --><script>alert(1)</script>",
//!     &[sanitize(SanitizeOptions::default()), drop_comments],
//! )
//! .unwrap();
//! assert_eq!(output, "<p>ok</p>");
//! ```

use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;

use crate::error::RewriteError;
use crate::node::Tree;
use crate::parser::parse;

type Result<T> = std::result::Result<T, RewriteError>;

/// Future returned by an asynchronous transformer
pub type TransformFuture = LocalBoxFuture<'static, Result<Tree>>;

/// A single pipeline step
pub enum Transformer {
    /// Rewrites the tree synchronously
    Sync(Box<dyn Fn(Tree) -> Result<Tree>>),
    /// Rewrites the tree after awaiting; rejected by the synchronous pipeline
    Async(Box<dyn Fn(Tree) -> TransformFuture>),
}

impl Transformer {
    /// Wrap a synchronous rewrite
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Tree) -> Result<Tree> + 'static,
    {
        Transformer::Sync(Box::new(f))
    }

    /// Wrap an asynchronous rewrite
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Tree) -> Fut + 'static,
        Fut: Future<Output = Result<Tree>> + 'static,
    {
        Transformer::Async(Box::new(move |tree| f(tree).boxed_local()))
    }

    /// Whether running this step needs awaiting
    pub fn is_async(&self) -> bool {
        matches!(self, Transformer::Async(_))
    }

    /// Run the step, awaiting if needed
    pub async fn run(&self, tree: Tree) -> Result<Tree> {
        match self {
            Transformer::Sync(f) => f(tree),
            Transformer::Async(f) => f(tree).await,
        }
    }

    /// Run the step without suspending
    ///
    /// # Errors
    ///
    /// [`RewriteError::BlockingSuspension`] for an asynchronous step.
    pub fn run_sync(&self, tree: Tree) -> Result<Tree> {
        match self {
            Transformer::Sync(f) => f(tree),
            Transformer::Async(_) => Err(RewriteError::BlockingSuspension(
                "asynchronous transformer in a synchronous pipeline".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformer::Sync(_) => f.write_str("Transformer::Sync(..)"),
            Transformer::Async(_) => f.write_str("Transformer::Async(..)"),
        }
    }
}

/// Pipeline input: markup to parse, or a tree built elsewhere
#[derive(Debug)]
pub enum Input<'a> {
    /// Markup text, parsed before the first step
    Markup(&'a str),
    /// Existing tree, used as-is
    Tree(Tree),
}

impl Input<'_> {
    /// Resolve to a tree
    pub fn into_tree(self) -> Tree {
        match self {
            Input::Markup(markup) => parse(markup),
            Input::Tree(tree) => tree,
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(markup: &'a str) -> Self {
        Input::Markup(markup)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(markup: &'a String) -> Self {
        Input::Markup(markup)
    }
}

impl From<Tree> for Input<'_> {
    fn from(tree: Tree) -> Self {
        Input::Tree(tree)
    }
}

/// Run transformers in order, awaiting asynchronous ones
pub async fn apply<'a>(input: impl Into<Input<'a>>, transformers: &[Transformer]) -> Result<Tree> {
    let mut tree = input.into().into_tree();
    for (step, transformer) in transformers.iter().enumerate() {
        tracing::debug!(step, is_async = transformer.is_async(), "running transformer");
        tree = transformer.run(tree).await?;
    }
    Ok(tree)
}

/// Run transformers in order without suspending
///
/// # Errors
///
/// [`RewriteError::BlockingSuspension`] if any transformer is asynchronous.
/// The check happens before any step runs.
pub fn apply_sync<'a>(input: impl Into<Input<'a>>, transformers: &[Transformer]) -> Result<Tree> {
    if let Some(step) = transformers.iter().position(Transformer::is_async) {
        return Err(RewriteError::BlockingSuspension(format!(
            "transformer {} is asynchronous",
            step
        )));
    }
    let mut tree = input.into().into_tree();
    for (step, transformer) in transformers.iter().enumerate() {
        tracing::debug!(step, "running transformer");
        tree = transformer.run_sync(tree)?;
    }
    Ok(tree)
}

/// Parse, transform and render, awaiting where needed
pub async fn transform<'a>(
    input: impl Into<Input<'a>>,
    transformers: &[Transformer],
) -> Result<String> {
    let tree = apply(input, transformers).await?;
    tree.render().await
}

/// Parse, transform and render without suspending
///
/// # Errors
///
/// [`RewriteError::BlockingSuspension`] on an asynchronous transformer or a
/// render function returning a pending result.
pub fn transform_sync<'a>(input: impl Into<Input<'a>>, transformers: &[Transformer]) -> Result<String> {
    apply_sync(input, transformers)?.render_sync()
}

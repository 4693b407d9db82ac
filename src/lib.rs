//! Markup Rewriter - in-memory markup trees with a transform pipeline
//!
//! Markup is parsed once into an arena-backed tree, rewritten by an ordered
//! list of transformers and serialized back to text, without a browser DOM.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `node`: tree model with parent links
//! - `parser`: tree construction from html5ever tokenizer events
//! - `charset`: byte input decoding
//! - `walk`: depth-first visitors, sync and async
//! - `selector`: CSS selector queries through an adapter trait
//! - `render`: serialization with render functions and escaping
//! - `html`: templating helper producing safe markup
//! - `transform`: the transformer pipeline
//! - `transformers`: built-in `sanitize` and `swap` transformers
//!
//! # Example
//!
//! ```rust
//! use markup_rewriter::{SanitizeOptions, SwapComponents, sanitize, swap, transform_sync};
//!
//! let output = transform_sync(
//!     "<h1 onclick=\"x()\">Hi</h1><script>alert(1)</script>",
//!     &[
//!         sanitize(SanitizeOptions::default()),
//!         swap(SwapComponents::new().with("h1", "h2")),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(output, "<h2 onclick=\"x()\">Hi</h2>");
//! ```
//!
//! # Concurrency
//!
//! Futures returned by the async entry points are `!Send`: render functions
//! are shared through `Rc` and a tree has a single owner. Drive them on a
//! single-threaded executor.

// Module declarations
pub mod charset;
pub mod error;
pub mod html;
pub mod node;
pub mod parser;
pub mod render;
pub mod selector;
pub mod transform;
pub mod transformers;
pub mod walk;

// Re-export main types for convenience
pub use error::RewriteError;
pub use html::{Interpolation, Template, html};
pub use node::{Attributes, ElementName, NodeId, NodeKind, NodeType, Tree};
pub use parser::{parse, parse_bytes};
pub use render::{Children, Markup, RenderFn, RenderOutput, SafeHtml, escape_html, render, render_sync};
pub use selector::{Selector, matches, query_selector, query_selector_all};
pub use transform::{Input, Transformer, apply, apply_sync, transform, transform_sync};
pub use transformers::{Replacement, SanitizeOptions, SwapComponents, sanitize, swap};
pub use walk::{Visit, walk, walk_sync};

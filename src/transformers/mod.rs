//! Built-in transformers
//!
//! - [`sanitize`]: drop, block or allow elements and filter attributes
//! - [`swap`]: rename elements or attach render functions by selector

pub mod sanitize;
pub mod swap;

pub use sanitize::{SanitizeOptions, sanitize};
pub use swap::{Replacement, SwapComponents, swap};

//! Error types for parse, render and transform operations

use std::fmt;

/// Errors that can occur while building, querying, rendering or transforming a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// A caller handed an operation a value of the wrong shape
    InvalidArgument(String),
    /// A strict (synchronous) entry point met a value that needs to be awaited
    BlockingSuspension(String),
    /// A selector string could not be parsed
    InvalidSelector(String),
    /// Character encoding error while decoding byte input
    EncodingError(String),
    /// Failure raised by user-supplied render functions or transformers
    Custom(String),
}

impl RewriteError {
    /// Get numeric error code
    pub fn code(&self) -> u32 {
        match self {
            RewriteError::InvalidArgument(_) => 1,
            RewriteError::BlockingSuspension(_) => 2,
            RewriteError::InvalidSelector(_) => 3,
            RewriteError::EncodingError(_) => 4,
            RewriteError::Custom(_) => 99,
        }
    }

    /// Build a [`RewriteError::Custom`] from any displayable value
    pub fn custom(message: impl fmt::Display) -> Self {
        RewriteError::Custom(message.to_string())
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            RewriteError::BlockingSuspension(msg) => {
                write!(f, "Cannot block on asynchronous work: {}", msg)
            }
            RewriteError::InvalidSelector(msg) => write!(f, "Invalid selector: {}", msg),
            RewriteError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            RewriteError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RewriteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            RewriteError::InvalidArgument(String::new()),
            RewriteError::BlockingSuspension(String::new()),
            RewriteError::InvalidSelector(String::new()),
            RewriteError::EncodingError(String::new()),
            RewriteError::Custom(String::new()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(RewriteError::code).collect();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_includes_context() {
        let err = RewriteError::BlockingSuspension("render function on <Title>".to_string());
        assert_eq!(
            err.to_string(),
            "Cannot block on asynchronous work: render function on <Title>"
        );
        assert_eq!(RewriteError::custom("boom").to_string(), "boom");
    }
}

//! Error types for function extraction

use std::path::PathBuf;

/// Errors raised while locating or slicing a function
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Source file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No top-level definition with this name
    #[error("function '{function}' not found in '{path}'")]
    NotFound {
        /// Requested function name
        function: String,
        /// File that was searched
        path: PathBuf,
    },

    /// The definition was found but its source text could not be recovered
    #[error("function '{function}' could not be extracted")]
    ExtractionFailed {
        /// Requested function name
        function: String,
    },

    /// Grammar could not be loaded or the parser produced no tree
    #[error("parser error: {0}")]
    Parser(String),
}

impl ExtractError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create not-found error
    pub fn not_found(function: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            function: function.into(),
            path: path.into(),
        }
    }

    /// Create extraction failure
    pub fn extraction_failed(function: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            function: function.into(),
        }
    }

    /// Check if the function simply does not exist in the file
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_function_and_file() {
        let err = ExtractError::not_found("add", "example_code/code.py");
        assert_eq!(
            err.to_string(),
            "function 'add' not found in 'example_code/code.py'"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn extraction_failed_display() {
        let err = ExtractError::extraction_failed("broken");
        assert_eq!(err.to_string(), "function 'broken' could not be extracted");
        assert!(!err.is_not_found());
    }
}

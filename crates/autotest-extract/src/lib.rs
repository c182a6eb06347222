//! autotest source extraction
//!
//! Locates a named top-level function in a Python source file and produces a
//! [`FunctionDescriptor`]: the verbatim definition, a normalized signature and
//! the cleaned docstring.
//!
//! # Resolution
//!
//! Only direct children of the module are considered. When a name is defined
//! more than once, the **last** definition in document order wins, the same
//! way a later `def` rebinds the name at import time.
//!
//! ```text
//! file → tree-sitter-python → top-level defs → last match → FunctionDescriptor
//! ```
//!
//! # Example
//!
//! ```rust
//! use autotest_extract::extract_from_source;
//!
//! let source = "def add(a: int, b: int) -> int:\n    \"\"\"Adds.\"\"\"\n    return a + b\n";
//! let descriptor = extract_from_source(source, "add").unwrap();
//!
//! assert_eq!(descriptor.signature, "def add(a: int, b: int):");
//! assert_eq!(descriptor.docstring.as_deref(), Some("Adds."));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod descriptor;
pub mod docstring;
pub mod error;
pub mod extractor;
pub mod signature;

// Re-exports for convenience
pub use descriptor::FunctionDescriptor;
pub use error::ExtractError;
pub use extractor::{extract, extract_from_source, list_functions, FunctionDef, ParsedSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

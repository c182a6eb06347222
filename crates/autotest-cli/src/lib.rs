//! autotest command-line support
//!
//! Argument definitions, logging setup and test-file persistence for the
//! `autotest` binary.

#![allow(missing_docs)]

pub mod cli;
pub mod logging;
pub mod output;

pub use cli::{command, GenerateArgs};
pub use output::{save_test_file, test_file_path};

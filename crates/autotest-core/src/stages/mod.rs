//! Stage functions
//!
//! Each stage reads one [`PipelineState`](crate::PipelineState) snapshot and
//! returns the next one. Stages never see each other; ordering lives in
//! [`crate::graph`].

mod analyze;
mod finalize;
mod generate;
mod plan;
mod prepare;

pub use analyze::analyze;
pub use finalize::finalize;
pub use generate::generate_single_test;
pub use plan::{normalize_plan, plan};
pub use prepare::{module_path, prepare_iteration, seed_imports};

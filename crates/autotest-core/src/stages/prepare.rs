use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::{PendingQueue, PipelineState};
use std::path::{Component, Path};

/// Flatten the plan into the pending queue and seed the test module
///
/// # Errors
/// [`PipelineError::MissingField`] if Plan has not run.
pub fn prepare_iteration(state: &PipelineState) -> Result<PipelineState, PipelineError> {
    tracing::info!("Preparing generation loop for '{}'", state.function_name());

    let suite = state
        .test_plan()
        .ok_or_else(|| PipelineError::missing(Node::PrepareIteration, "test_plan"))?;

    let queue: PendingQueue = suite.iter().cloned().collect();
    if queue.is_empty() {
        tracing::warn!("Test plan is empty, no tests will be generated");
    }

    let module = module_path(state.file_path());
    let seed = seed_imports(&module, state.function_name());
    tracing::debug!("Seeded imports from module '{}'", module);

    Ok(state.clone().with_queue(queue, seed))
}

/// Dotted import path of a source file
///
/// `./pkg/code.py` becomes `pkg.code`. Only a trailing `.py` is dropped.
#[must_use]
pub fn module_path(file_path: &Path) -> String {
    let parts: Vec<String> = file_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();

    let mut dotted = parts.join(".");
    if let Some(stripped) = dotted.strip_suffix(".py") {
        dotted.truncate(stripped.len());
    }
    dotted
}

/// Import block every generated module starts with
#[must_use]
pub fn seed_imports(module: &str, function_name: &str) -> String {
    format!("import pytest\nfrom {module} import {function_name}\n")
}

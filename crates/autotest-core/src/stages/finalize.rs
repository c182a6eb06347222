use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::PipelineState;

/// Publish the accumulated buffer as the generated module
///
/// # Errors
/// [`PipelineError::MissingField`] if PrepareIteration has not run.
pub fn finalize(state: &PipelineState) -> Result<PipelineState, PipelineError> {
    let code = state
        .accumulated_code()
        .ok_or_else(|| PipelineError::missing(Node::Finalize, "accumulated_code"))?;

    tracing::info!(
        "Finalizing test module for '{}' ({} bytes)",
        state.function_name(),
        code.len()
    );
    let code = code.to_string();
    Ok(state.clone().with_output(code))
}

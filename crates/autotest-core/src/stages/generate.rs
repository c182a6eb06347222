use crate::error::PipelineError;
use crate::generation::{TestWriter, WriteRequest};
use crate::graph::Node;
use crate::model::TestInputs;
use crate::state::PipelineState;

/// Generate code for the case at the front of the queue
///
/// Pops exactly one case. The buffer gets a blank-line separator, the trimmed
/// test code and a trailing newline.
///
/// # Errors
/// [`PipelineError::EmptyQueue`] when nothing is pending,
/// [`PipelineError::UnresolvedInputs`] for a case that skipped normalization,
/// [`PipelineError::GenerationFailed`] if the writer fails.
pub async fn generate_single_test(
    state: &PipelineState,
    writer: &dyn TestWriter,
) -> Result<PipelineState, PipelineError> {
    let stage = Node::GenerateSingleTest;

    let mut queue = state
        .pending_test_cases()
        .cloned()
        .ok_or_else(|| PipelineError::missing(stage, "pending_test_cases"))?;
    let descriptor = state
        .analysis()
        .ok_or_else(|| PipelineError::missing(stage, "analysis"))?;
    let buffer = state
        .accumulated_code()
        .ok_or_else(|| PipelineError::missing(stage, "accumulated_code"))?;

    let case = queue.pop_front().ok_or(PipelineError::EmptyQueue)?;
    tracing::info!(
        "Generating test for '{}' ({} remaining)",
        case.description,
        queue.len()
    );

    if matches!(case.inputs, TestInputs::Pending(_)) {
        return Err(PipelineError::UnresolvedInputs {
            description: case.description,
        });
    }

    let case_json = case.to_pretty_json()?;
    let request = WriteRequest {
        function_name: state.function_name().to_string(),
        test_case_json: case_json.clone(),
        analysis: serde_json::to_string(descriptor)?,
    };
    tracing::debug!("Test case payload: {}", case_json);

    let code = writer.write_test(request).await.map_err(|e| {
        tracing::error!("Test generation failed for '{}': {}", case.description, e);
        PipelineError::generation(stage, e)
    })?;

    let mut accumulated = String::with_capacity(buffer.len() + code.len() + 3);
    accumulated.push_str(buffer);
    accumulated.push_str("\n\n");
    accumulated.push_str(code.trim());
    accumulated.push('\n');

    Ok(state
        .clone()
        .with_generated_case(queue, accumulated, case_json))
}

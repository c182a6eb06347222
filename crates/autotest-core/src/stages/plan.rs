use crate::error::PipelineError;
use crate::generation::{PlanRequest, TestPlanner};
use crate::graph::Node;
use crate::model::{InputsNormalization, TestSuite};
use crate::state::PipelineState;

/// Ask the planner for a test suite and normalize its inputs
///
/// # Errors
/// [`PipelineError::MissingField`] if Analyze has not run, or
/// [`PipelineError::GenerationFailed`] if the planner fails.
pub async fn plan(
    state: &PipelineState,
    planner: &dyn TestPlanner,
) -> Result<PipelineState, PipelineError> {
    tracing::info!("Planning tests for '{}'", state.function_name());

    let code = state
        .function_code()
        .ok_or_else(|| PipelineError::missing(Node::Plan, "function_code"))?;
    let descriptor = state
        .analysis()
        .ok_or_else(|| PipelineError::missing(Node::Plan, "analysis"))?;

    let request = PlanRequest::from_descriptor(code, descriptor)?;
    tracing::debug!("Planner analysis: {}", request.analysis);

    let mut suite = planner.plan(request).await.map_err(|e| {
        tracing::error!("Test planning failed: {}", e);
        PipelineError::generation(Node::Plan, e)
    })?;

    normalize_plan(&mut suite);
    tracing::info!(
        "Planned {} cases ({} happy path, {} edge, {} error)",
        suite.len(),
        suite.happy_path_cases.len(),
        suite.edge_cases.len(),
        suite.error_conditions.len()
    );

    Ok(state.clone().with_test_plan(suite))
}

/// Parse serialized inputs of every case in place
///
/// Malformed inputs are logged and replaced by the unresolved marker; the
/// case stays in the plan. Returns how many cases were marked unresolved.
pub fn normalize_plan(suite: &mut TestSuite) -> usize {
    let mut malformed = 0;
    for case in suite.iter_mut() {
        match case.normalize_inputs() {
            InputsNormalization::Parsed | InputsNormalization::Unchanged => {}
            InputsNormalization::Malformed(err) => {
                malformed += 1;
                tracing::warn!("Test case '{}': {}", case.description, err);
            }
            InputsNormalization::Unrecognized => {
                tracing::warn!(
                    "Test case '{}' has inputs of unexpected shape, leaving as-is",
                    case.description
                );
            }
        }
    }
    malformed
}
